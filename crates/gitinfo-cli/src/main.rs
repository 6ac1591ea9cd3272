//! # gitinfo CLI entry point
//!
//! Parses arguments, installs logging and runs the validate command.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use gitinfo_cli::validate::{run_validate, ValidateArgs};

/// Validate .gitinfo repository metadata (JSON with comments).
#[derive(Parser, Debug)]
#[command(name = "gitinfo", version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging. Repeat for more (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(flatten)]
    validate: ValidateArgs,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(files = cli.validate.files.len(), "gitinfo starting");

    match run_validate(&cli.validate) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
