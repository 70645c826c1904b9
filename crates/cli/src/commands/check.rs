use std::path::Path;
use std::process;

use super::{diagnostics_json, load_model, summary_line};
use crate::OutputFormat;

pub(crate) fn cmd_check(
    file: &Path,
    source_id: Option<String>,
    output: OutputFormat,
    quiet: bool,
) {
    let model = load_model(file, source_id, output, quiet);

    match output {
        OutputFormat::Text => {
            for d in &model.diagnostics {
                println!("{}", d);
            }
            if !quiet {
                println!("{}", summary_line(&model));
            }
        }
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&diagnostics_json(&model)).unwrap_or_default()
            );
        }
    }

    if model.has_errors() {
        process::exit(1);
    }
}
