//! # Structural Validation
//!
//! Walks a parsed document and a [`SchemaNode`] tree in lockstep and collects
//! every violation. Nothing here fails: a mismatch becomes a
//! [`ValidationError`] and the walk continues with the next sibling.
//!
//! ## Rules
//!
//! - A value of the wrong type yields one error and its subtree is skipped.
//! - Unknown keys are reported (in document order) only when
//!   `additionalProperties` is false; declared members are then checked in
//!   schema order. Absent members are fine.
//! - Array elements are checked by index, then `minItems`, then `maxItems`.
//! - String checks run in the order `minLength`, `format`, `pattern`, and
//!   all of them run.
//!
//! Every node is visited once, so the cost is linear in the document size.
//!
//! ## Paths
//!
//! Members extend the path with `.key`, elements with `[i]`. The root path
//! is the empty string and renders as `root`.

use std::collections::HashSet;
use std::fmt;

use serde_json::Value;
use thiserror::Error;

use crate::format::{is_valid_email, is_valid_uri};
use crate::node::{ArraySchema, ObjectSchema, SchemaNode, StringFormat, StringSchema};

/// What went wrong at a given path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    /// The value is not of the schema's type.
    #[error("expected {expected}")]
    WrongType {
        /// `object`, `array`, or `string`.
        expected: &'static str,
    },

    /// A key not declared by a closed object schema.
    #[error("unknown property \"{0}\"")]
    UnknownProperty(String),

    #[error("expected at least {min} items")]
    TooFewItems { min: u64, actual: usize },

    #[error("expected at most {max} items")]
    TooManyItems { max: u64, actual: usize },

    #[error("string too short (min {min})")]
    TooShort { min: u64, actual: usize },

    /// The string is not an absolute `http`/`https` URL.
    #[error("invalid URI \"{0}\"")]
    InvalidUri(String),

    #[error("invalid email \"{0}\"")]
    InvalidEmail(String),

    /// The `pattern` does not occur in the string.
    #[error("does not match pattern {pattern}")]
    PatternMismatch {
        /// Pattern source text.
        pattern: String,
    },
}

/// A single schema violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted/bracketed path, empty for the document root.
    pub path: String,
    pub kind: ViolationKind,
}

impl ValidationError {
    fn new(path: &str, kind: ViolationKind) -> Self {
        Self {
            path: path.to_string(),
            kind,
        }
    }

    /// The path as shown to users: `root` for the document root.
    pub fn location(&self) -> &str {
        if self.path.is_empty() {
            "root"
        } else {
            &self.path
        }
    }

    /// The human-readable message, without the location.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location(), self.kind)
    }
}

/// Validate `value` against `schema`, starting at `path`.
///
/// Pass `""` for a whole document. Errors come back in traversal order and
/// are never deduplicated.
pub fn validate(value: &Value, schema: &SchemaNode, path: &str) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    validate_into(&mut errors, value, schema, path);
    errors
}

fn validate_into(errors: &mut Vec<ValidationError>, value: &Value, schema: &SchemaNode, path: &str) {
    match schema {
        SchemaNode::Object(object) => validate_object(errors, value, object, path),
        SchemaNode::Array(array) => validate_array(errors, value, array, path),
        SchemaNode::String(string) => validate_string(errors, value, string, path),
    }
}

fn wrong_type(errors: &mut Vec<ValidationError>, path: &str, expected: &'static str) {
    errors.push(ValidationError::new(
        path,
        ViolationKind::WrongType { expected },
    ));
}

fn validate_object(
    errors: &mut Vec<ValidationError>,
    value: &Value,
    schema: &ObjectSchema,
    path: &str,
) {
    let Value::Object(members) = value else {
        wrong_type(errors, path, "object");
        return;
    };

    if !schema.additional_properties {
        let declared: HashSet<&str> = schema
            .properties
            .iter()
            .map(|(key, _)| key.as_str())
            .collect();
        for key in members.keys() {
            if !declared.contains(key.as_str()) {
                errors.push(ValidationError::new(
                    path,
                    ViolationKind::UnknownProperty(key.clone()),
                ));
            }
        }
    }

    for (key, member_schema) in &schema.properties {
        if let Some(member) = members.get(key) {
            validate_into(errors, member, member_schema, &format!("{path}.{key}"));
        }
    }
}

fn validate_array(
    errors: &mut Vec<ValidationError>,
    value: &Value,
    schema: &ArraySchema,
    path: &str,
) {
    let Value::Array(elements) = value else {
        wrong_type(errors, path, "array");
        return;
    };

    if let Some(items) = &schema.items {
        for (i, element) in elements.iter().enumerate() {
            if let Some(element_schema) = items.schema_for(i) {
                validate_into(errors, element, element_schema, &format!("{path}[{i}]"));
            }
        }
    }

    let actual = elements.len();
    if let Some(min) = schema.min_items {
        if (actual as u64) < min {
            errors.push(ValidationError::new(
                path,
                ViolationKind::TooFewItems { min, actual },
            ));
        }
    }
    if let Some(max) = schema.max_items {
        if (actual as u64) > max {
            errors.push(ValidationError::new(
                path,
                ViolationKind::TooManyItems { max, actual },
            ));
        }
    }
}

fn validate_string(
    errors: &mut Vec<ValidationError>,
    value: &Value,
    schema: &StringSchema,
    path: &str,
) {
    let Value::String(s) = value else {
        wrong_type(errors, path, "string");
        return;
    };

    if let Some(min) = schema.min_length {
        let actual = s.chars().count();
        if (actual as u64) < min {
            errors.push(ValidationError::new(
                path,
                ViolationKind::TooShort { min, actual },
            ));
        }
    }

    match schema.format {
        Some(StringFormat::Uri) if !is_valid_uri(s) => {
            errors.push(ValidationError::new(path, ViolationKind::InvalidUri(s.clone())));
        }
        Some(StringFormat::Email) if !is_valid_email(s) => {
            errors.push(ValidationError::new(path, ViolationKind::InvalidEmail(s.clone())));
        }
        _ => {}
    }

    if let Some(pattern) = &schema.pattern {
        if !pattern.is_match(s) {
            errors.push(ValidationError::new(
                path,
                ViolationKind::PatternMismatch {
                    pattern: pattern.as_str().to_string(),
                },
            ));
        }
    }
}
