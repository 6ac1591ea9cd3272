//! # gitinfo-core: Document Normalization and Parsing
//!
//! The leaf crate of the workspace. It turns a `.gitinfo` file, written in
//! JSON with comments and trailing commas, into a strict JSON value tree.
//! Schema handling and validation live in `gitinfo-schema`; everything that
//! touches the terminal lives in `gitinfo-cli`.
//!
//! ## Pipeline
//!
//! 1. [`jsonc::normalize`] strips `//` and `/* */` comments, then removes
//!    trailing commas before `}` and `]`. Both passes track string literals,
//!    so comment markers or `,}` sequences inside strings survive untouched.
//! 2. [`document::parse_document`] feeds the normalized text to `serde_json`.
//!    Objects keep their insertion order (`preserve_order`), which is what
//!    makes downstream error ordering deterministic.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `gitinfo-*` crates.
//! - The normalizer never fails; malformed input surfaces later as a
//!   [`ParseFailure`] from the JSON parser.
//! - No `.unwrap()` outside tests.

pub mod document;
pub mod error;
pub mod jsonc;

pub use document::{load_document, parse_document, parse_json};
pub use error::ParseFailure;
pub use jsonc::normalize;
