use std::path::Path;
use std::process;

use wiregen_core::{pass5_serialize, Severity};

use super::{diagnostics_json, load_model, summary_line};
use crate::{report_error, OutputFormat};

pub(crate) fn cmd_compile(
    file: &Path,
    out: Option<&Path>,
    source_id: Option<String>,
    output: OutputFormat,
    quiet: bool,
) {
    let model = load_model(file, source_id, output, quiet);

    if !model.is_generatable() {
        match output {
            OutputFormat::Text => {
                if !quiet {
                    for d in &model.diagnostics {
                        eprintln!("{}", d);
                    }
                    eprintln!("{}", summary_line(&model));
                }
            }
            OutputFormat::Json => {
                eprintln!(
                    "{}",
                    serde_json::to_string_pretty(&diagnostics_json(&model)).unwrap_or_default()
                );
            }
        }
        process::exit(1);
    }

    if !quiet {
        for d in model
            .diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
        {
            eprintln!("{}", d);
        }
    }

    let pretty = match serde_json::to_string_pretty(&pass5_serialize::serialize(&model)) {
        Ok(s) => s,
        Err(e) => {
            report_error(&format!("serialization error: {}", e), output, quiet);
            process::exit(1);
        }
    };

    match out {
        None => println!("{}", pretty),
        Some(path) => {
            if let Err(e) = std::fs::write(path, format!("{}\n", pretty)) {
                let msg = format!("error writing '{}': {}", path.display(), e);
                report_error(&msg, output, quiet);
                process::exit(1);
            }
            if !quiet {
                match output {
                    OutputFormat::Text => println!("wrote {}", path.display()),
                    OutputFormat::Json => println!(
                        "{}",
                        serde_json::json!({ "written": path.display().to_string() })
                    ),
                }
            }
        }
    }
}
