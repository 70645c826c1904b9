mod commands;
mod runner;
mod tap;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::prelude::*;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Dependency-wiring specification compiler.
#[derive(Parser)]
#[command(
    name = "wiregen",
    version,
    about = "Dependency-wiring specification compiler"
)]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Source identifier used in diagnostic locations and provenance
    /// (defaults to the file path)
    #[arg(long, global = true)]
    source_id: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a wiring document and report its diagnostics
    Check {
        /// Path to the .yaml, .yml or .json wiring document
        file: PathBuf,
    },

    /// Compile a wiring document to interchange JSON
    Compile {
        /// Path to the .yaml, .yml or .json wiring document
        file: PathBuf,
        /// Write the interchange JSON here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Validate interchange JSON against the wiring model schema
    Validate {
        /// Path to the interchange JSON file
        model: PathBuf,
    },

    /// Run the conformance test suite
    Test {
        /// Path to the conformance suite directory
        #[arg(default_value = "conformance")]
        suite_dir: PathBuf,
    },

    /// List every diagnostic code with its severity
    Codes,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { file } => {
            commands::check::cmd_check(&file, cli.source_id, cli.output, cli.quiet)
        }
        Commands::Compile { file, out } => commands::compile::cmd_compile(
            &file,
            out.as_deref(),
            cli.source_id,
            cli.output,
            cli.quiet,
        ),
        Commands::Validate { model } => {
            commands::validate::cmd_validate(&model, cli.output, cli.quiet)
        }
        Commands::Test { suite_dir } => commands::test::cmd_test(&suite_dir, cli.quiet),
        Commands::Codes => commands::codes::cmd_codes(cli.output),
    }
}

/// Logs go to stderr so stdout stays machine-readable. The filter is read
/// from `WIREGEN_LOG`.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("WIREGEN_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
