use wiregen_core::DiagnosticCode;

use crate::OutputFormat;

pub(crate) fn cmd_codes(output: OutputFormat) {
    match output {
        OutputFormat::Text => {
            for code in DiagnosticCode::ALL {
                println!("{:<40} {}", code.as_str(), code.severity());
            }
        }
        OutputFormat::Json => {
            let codes: Vec<serde_json::Value> = DiagnosticCode::ALL
                .iter()
                .map(|code| {
                    serde_json::json!({
                        "code": code.as_str(),
                        "severity": code.severity().as_str(),
                    })
                })
                .collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&codes).unwrap_or_default()
            );
        }
    }
}
