//! # Document Parsing
//!
//! Produces the value tree the validator walks. `.gitinfo` files go through
//! the normalizer first; schema documents are plain JSON and are parsed
//! as-is with [`parse_json`].
//!
//! Line and column numbers in a [`ParseFailure::InvalidJson`] refer to the
//! normalized text. Line comments keep their newline, so lines only drift
//! when a block comment spans several of them.

use std::path::Path;

use serde_json::Value;

use crate::error::ParseFailure;
use crate::jsonc::normalize;

/// Parse strict JSON text. `origin` names the input in diagnostics.
pub fn parse_json(text: &str, origin: &str) -> Result<Value, ParseFailure> {
    serde_json::from_str(text).map_err(|e| ParseFailure::InvalidJson {
        origin: origin.to_string(),
        line: e.line(),
        column: e.column(),
        message: e.to_string(),
    })
}

/// Normalize JSONC text and parse the result.
pub fn parse_document(text: &str, origin: &str) -> Result<Value, ParseFailure> {
    parse_json(&normalize(text), origin)
}

/// Read a JSONC document from disk and parse it.
///
/// # Errors
///
/// [`ParseFailure::Unreadable`] if the file cannot be read as UTF-8 text,
/// [`ParseFailure::InvalidJson`] if the normalized text does not parse.
pub fn load_document(path: &Path) -> Result<Value, ParseFailure> {
    let text = std::fs::read_to_string(path).map_err(|source| ParseFailure::Unreadable {
        path: path.display().to_string(),
        source,
    })?;
    tracing::debug!(path = %path.display(), bytes = text.len(), "read document");
    parse_document(&text, &path.display().to_string())
}
