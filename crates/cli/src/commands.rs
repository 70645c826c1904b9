pub(crate) mod check;
pub(crate) mod codes;
pub(crate) mod compile;
pub(crate) mod test;
pub(crate) mod validate;

use std::path::Path;
use std::process;

use wiregen_core::{compile_source, CompileOptions, FileSystemProvider, Model};

use crate::{report_error, OutputFormat};

/// Compile `file` from disk, exiting with status 1 when it cannot be read.
///
/// Problems inside the document come back as diagnostics on the model.
pub(crate) fn load_model(
    file: &Path,
    source_id: Option<String>,
    output: OutputFormat,
    quiet: bool,
) -> Model {
    let options = CompileOptions {
        source_id,
        ..CompileOptions::default()
    };
    match compile_source(&FileSystemProvider, file, &options) {
        Ok(model) => model,
        Err(e) => {
            report_error(&format!("error: {}", e), output, quiet);
            process::exit(1);
        }
    }
}

/// The diagnostics object printed by `check` and by a failed `compile`.
pub(crate) fn diagnostics_json(model: &Model) -> serde_json::Value {
    let mut report = serde_json::to_value(model.summary()).unwrap_or_default();
    report["diagnostics"] =
        wiregen_core::pass5_serialize::serialize_diagnostics(&model.diagnostics);
    report
}

pub(crate) fn summary_line(model: &Model) -> String {
    let summary = model.summary();
    format!(
        "{} error(s), {} warning(s), {} info(s)",
        summary.errors, summary.warnings, summary.infos
    )
}
