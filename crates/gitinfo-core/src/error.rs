//! # Error Types
//!
//! Fatal input errors. A [`ParseFailure`] means the input could not be turned
//! into a value tree at all, which callers must keep apart from "parsed fine
//! but does not conform to the schema".

use thiserror::Error;

/// The document or schema could not be read or is not valid JSON.
#[derive(Error, Debug)]
pub enum ParseFailure {
    /// The file could not be read from disk.
    #[error("failed to read {path}: {source}")]
    Unreadable {
        /// Path of the file that could not be read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The text is not valid JSON after normalization.
    #[error("{origin} is not valid JSON: {message}")]
    InvalidJson {
        /// Where the text came from (a path or a fixed label).
        origin: String,
        /// 1-based line reported by the parser.
        line: usize,
        /// 1-based column reported by the parser.
        column: usize,
        /// Parser diagnostic.
        message: String,
    },
}

impl ParseFailure {
    /// Name of the input that failed, as given by the caller.
    pub fn origin(&self) -> &str {
        match self {
            Self::Unreadable { path, .. } => path,
            Self::InvalidJson { origin, .. } => origin,
        }
    }
}
