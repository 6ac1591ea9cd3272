//! # Validate Command
//!
//! Checks one or more `.gitinfo` files and reports the outcome of each.
//!
//! ## Exit Codes
//!
//! `0` when every file parsed and validated with no violations, `1`
//! otherwise. A schema that fails to load is an `Err`, which the binary
//! also turns into `1`.
//!
//! ## Icon Data URIs
//!
//! The schema's `uri` format only admits `http`/`https`, but inline images
//! (`data:image/...`) are a documented choice for `icon`. Unless
//! `--strict-icon` is given, an `invalid URI` violation at `.icon` for such
//! a value is dropped from the report.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use gitinfo_core::load_document;
use gitinfo_schema::format::is_data_image_uri;
use gitinfo_schema::{Schema, ValidationError, ViolationKind};

use crate::report::{write_json, FileReport};

/// Default file checked when none is given.
pub const DEFAULT_FILE: &str = ".gitinfo";

/// Report format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// `OK:`/`FAIL:`/`ERROR:` lines.
    #[default]
    Text,
    /// A JSON array with one object per file.
    Json,
}

/// Arguments for the `gitinfo` command.
#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// Files to check.
    #[arg(value_name = "FILES", default_value = DEFAULT_FILE)]
    pub files: Vec<PathBuf>,

    /// Schema document to validate against instead of the bundled one.
    #[arg(long, value_name = "PATH", env = "GITINFO_SCHEMA")]
    pub schema: Option<PathBuf>,

    /// Report format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Treat `data:image/...` icons as invalid URIs like any other value.
    #[arg(long)]
    pub strict_icon: bool,
}

/// Run the command, writing the report to stdout.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_validate_to(args, &mut out)
}

/// Run the command, writing the report to `out`.
pub fn run_validate_to(args: &ValidateArgs, out: &mut dyn Write) -> Result<u8> {
    let schema = load_schema(args.schema.as_deref())?;

    let reports: Vec<FileReport> = args
        .files
        .iter()
        .map(|file| check_file(&schema, file, args.strict_icon))
        .collect();

    match args.format {
        OutputFormat::Text => {
            for report in &reports {
                report.write_text(out).context("failed to write report")?;
            }
        }
        OutputFormat::Json => write_json(&reports, out).context("failed to write report")?,
    }

    let failed = reports.iter().filter(|r| !r.valid).count();
    tracing::info!(files = reports.len(), failed, "validation finished");

    Ok(if failed == 0 { 0 } else { 1 })
}

fn load_schema(path: Option<&Path>) -> Result<Schema> {
    match path {
        Some(path) => {
            tracing::debug!(schema = %path.display(), "loading schema from file");
            Schema::from_path(path)
                .with_context(|| format!("failed to load schema {}", path.display()))
        }
        None => Schema::bundled().context("failed to load bundled schema"),
    }
}

/// Parse and validate one file. Never fails: problems end up in the report.
pub fn check_file(schema: &Schema, file: &Path, strict_icon: bool) -> FileReport {
    let name = file.display().to_string();

    if !file.exists() {
        tracing::debug!(file = %name, "file not found");
        return FileReport::failed(&name, format!("file not found: {name}"));
    }

    let document = match load_document(file) {
        Ok(document) => document,
        Err(e) => {
            tracing::debug!(origin = e.origin(), error = %e, "document did not parse");
            return FileReport::failed(&name, e.to_string());
        }
    };

    let mut violations = schema.validate(&document);
    if !strict_icon {
        violations.retain(|v| !is_icon_data_uri(v));
    }
    tracing::debug!(file = %name, violations = violations.len(), "validated");
    FileReport::checked(name, violations)
}

fn is_icon_data_uri(violation: &ValidationError) -> bool {
    matches!(
        &violation.kind,
        ViolationKind::InvalidUri(value) if violation.path == ".icon" && is_data_image_uri(value)
    )
}
