//! # String Formats
//!
//! The `uri` and `email` checks. These are structural only: nothing here
//! resolves a host or contacts a server.
//!
//! `uri` accepts absolute `http`/`https` URLs and nothing else. Other ports
//! of the validator disagreed on this (some let `data:` URIs through
//! everywhere); this is the single rule. The data-URI exception for the
//! `icon` field is applied by the CLI, using [`is_data_image_uri`].

use std::sync::OnceLock;

use regex::Regex;
use url::Url;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

/// Whether `s` is an absolute URL with scheme `http` or `https`.
///
/// Whitespace and control characters anywhere in `s` reject it. The URL
/// parser would otherwise trim or drop them.
pub fn is_valid_uri(s: &str) -> bool {
    if s.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return false;
    }
    match Url::parse(s) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

/// Whether `s` has the shape `local@domain.tld`.
///
/// Exactly one `@`, no whitespace, a non-empty local part, and a domain
/// with a `.` that is neither its first nor its last character.
pub fn is_valid_email(s: &str) -> bool {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(EMAIL_PATTERN).ok())
        .as_ref()
        .is_some_and(|re| re.is_match(s))
}

/// Whether `s` is an inline image (`data:image/...`).
pub fn is_data_image_uri(s: &str) -> bool {
    s.starts_with("data:image/")
}
