//! # Per-File Reports
//!
//! One [`FileReport`] per checked file, rendered either as text lines or as
//! a JSON array.

use std::io::{self, Write};

use serde::Serialize;

use gitinfo_schema::ValidationError;

/// One violation as it appears in a JSON report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportedError {
    /// Dotted/bracketed path, empty for the document root.
    pub path: String,
    pub message: String,
}

impl From<&ValidationError> for ReportedError {
    fn from(err: &ValidationError) -> Self {
        Self {
            path: err.path.clone(),
            message: err.message(),
        }
    }
}

/// Outcome of checking one file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub file: String,
    pub valid: bool,
    pub errors: Vec<ReportedError>,
    /// Set when the file could not be read or parsed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip)]
    violations: Vec<ValidationError>,
}

impl FileReport {
    /// Report for a file that parsed; valid iff `violations` is empty.
    pub fn checked(file: impl Into<String>, violations: Vec<ValidationError>) -> Self {
        Self {
            file: file.into(),
            valid: violations.is_empty(),
            errors: violations.iter().map(ReportedError::from).collect(),
            error: None,
            violations,
        }
    }

    /// Report for a file that never reached validation.
    pub fn failed(file: impl Into<String>, diagnostic: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            valid: false,
            errors: Vec::new(),
            error: Some(diagnostic.into()),
            violations: Vec::new(),
        }
    }

    /// Text form: `ERROR: ...`, or `OK:`/`FAIL:` followed by one indented
    /// line per violation.
    pub fn write_text(&self, out: &mut dyn Write) -> io::Result<()> {
        if let Some(diagnostic) = &self.error {
            return writeln!(out, "ERROR: {diagnostic}");
        }
        if self.valid {
            return writeln!(out, "OK: {}", self.file);
        }
        writeln!(out, "FAIL: {}", self.file)?;
        for violation in &self.violations {
            writeln!(out, "  - {violation}")?;
        }
        Ok(())
    }
}

/// Write all reports as one pretty-printed JSON array.
pub fn write_json(reports: &[FileReport], out: &mut dyn Write) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, reports)?;
    writeln!(out)
}
