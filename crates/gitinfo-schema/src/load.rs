//! # Schema Loading
//!
//! Turns a schema document into a [`SchemaNode`] tree. This runs once per
//! process, before any document is validated.
//!
//! ## Steps
//!
//! 1. The document is checked against `schemas/vocabulary.schema.json` with
//!    the `jsonschema` crate. Every violation is collected, so a broken
//!    schema is reported in one go.
//! 2. Nodes are converted bottom-up. Conversion rejects what the
//!    meta-schema cannot express: keywords that do not belong to the node's
//!    type, `minItems > maxItems`, and patterns that do not compile.
//!
//! Annotation keywords (`$schema`, `$id`, `$comment`, `title`,
//! `description`, `examples`, `default`) are accepted and ignored.

use std::path::Path;

use gitinfo_core::{parse_json, ParseFailure};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::node::{
    ArrayItemsSpec, ArraySchema, ObjectSchema, Pattern, SchemaNode, StringFormat, StringSchema,
};
use crate::validate::{validate, ValidationError};

/// The bundled `.gitinfo` schema.
pub const GITINFO_SCHEMA: &str = include_str!("../../../schemas/gitinfo.schema.json");

/// Meta-schema describing the supported vocabulary.
pub const VOCABULARY_SCHEMA: &str = include_str!("../../../schemas/vocabulary.schema.json");

const ANNOTATIONS: &[&str] = &[
    "$schema",
    "$id",
    "$comment",
    "title",
    "description",
    "examples",
    "default",
];

const OBJECT_KEYWORDS: &[&str] = &["properties", "additionalProperties"];
const ARRAY_KEYWORDS: &[&str] = &["items", "minItems", "maxItems"];
const STRING_KEYWORDS: &[&str] = &["minLength", "format", "pattern"];

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// A vocabulary violation found by the meta-schema check.
#[derive(Debug, Clone)]
pub struct VocabularyViolation {
    /// JSON Pointer into the schema document.
    pub pointer: String,
    /// Diagnostic from the meta-schema validator.
    pub message: String,
}

impl std::fmt::Display for VocabularyViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pointer = if self.pointer.is_empty() { "/" } else { &self.pointer };
        write!(f, "{pointer}: {}", self.message)
    }
}

/// Errors returned while loading a schema document.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The schema could not be read or is not valid JSON.
    #[error(transparent)]
    Parse(#[from] ParseFailure),

    /// The schema uses vocabulary outside the supported subset.
    #[error("schema uses unsupported vocabulary ({count} violation(s)): {}", join(violations))]
    Vocabulary {
        /// Number of violations found.
        count: usize,
        /// Individual violations in meta-schema order.
        violations: Vec<VocabularyViolation>,
    },

    /// A keyword that does not apply to the node's type.
    #[error("{pointer}: keyword \"{keyword}\" does not apply to type \"{node_type}\"")]
    MisplacedKeyword {
        /// JSON Pointer to the offending node.
        pointer: String,
        /// The keyword.
        keyword: String,
        /// The node's declared type.
        node_type: String,
    },

    /// A `pattern` that is not a valid regular expression.
    #[error("{pointer}: invalid pattern {pattern}: {reason}")]
    InvalidPattern {
        /// JSON Pointer to the offending node.
        pointer: String,
        /// Pattern source text.
        pattern: String,
        /// Compiler diagnostic.
        reason: String,
    },

    /// `minItems` greater than `maxItems`.
    #[error("{pointer}: minItems {min} exceeds maxItems {max}")]
    InvalidBounds {
        /// JSON Pointer to the offending node.
        pointer: String,
        min: u64,
        max: u64,
    },

    /// The node does not have the shape the meta-schema promises.
    #[error("{pointer}: malformed schema node: {reason}")]
    Malformed {
        /// JSON Pointer to the offending node.
        pointer: String,
        /// What was expected.
        reason: String,
    },

    /// The bundled meta-schema could not be compiled.
    #[error("vocabulary meta-schema unusable: {0}")]
    MetaSchema(String),
}

fn join(violations: &[VocabularyViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// A loaded schema: the root of an immutable [`SchemaNode`] tree.
#[derive(Debug, Clone)]
pub struct Schema {
    root: SchemaNode,
}

impl Schema {
    /// The bundled `.gitinfo` schema.
    pub fn bundled() -> Result<Self, SchemaError> {
        Self::from_json_str(GITINFO_SCHEMA, "bundled gitinfo.schema.json")
    }

    /// Read and load a schema document from disk.
    pub fn from_path(path: &Path) -> Result<Self, SchemaError> {
        let text = std::fs::read_to_string(path).map_err(|source| ParseFailure::Unreadable {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text, &path.display().to_string())
    }

    /// Load a schema from strict JSON text. `origin` names it in diagnostics.
    pub fn from_json_str(text: &str, origin: &str) -> Result<Self, SchemaError> {
        let value = parse_json(text, origin)?;
        let schema = Self::from_value(&value)?;
        tracing::debug!(
            origin,
            root_type = schema.root.type_name(),
            "loaded schema"
        );
        Ok(schema)
    }

    /// Load a schema from an already parsed document.
    ///
    /// # Errors
    ///
    /// [`SchemaError::Vocabulary`] when the document fails the meta-schema,
    /// otherwise the first conversion error encountered.
    pub fn from_value(value: &Value) -> Result<Self, SchemaError> {
        check_vocabulary(value)?;
        let root = convert(value, "")?;
        Ok(Self { root })
    }

    /// The root node.
    pub fn root(&self) -> &SchemaNode {
        &self.root
    }

    /// Validate a whole document from the root.
    pub fn validate(&self, document: &Value) -> Vec<ValidationError> {
        validate(document, &self.root, "")
    }
}

fn check_vocabulary(value: &Value) -> Result<(), SchemaError> {
    let meta: Value = serde_json::from_str(VOCABULARY_SCHEMA)
        .map_err(|e| SchemaError::MetaSchema(e.to_string()))?;
    let mut opts = jsonschema::options();
    opts.with_draft(jsonschema::Draft::Draft202012);
    let validator = opts
        .build(&meta)
        .map_err(|e| SchemaError::MetaSchema(e.to_string()))?;

    let violations: Vec<VocabularyViolation> = validator
        .iter_errors(value)
        .map(|err| VocabularyViolation {
            pointer: err.instance_path.to_string(),
            message: err.to_string(),
        })
        .collect();

    if violations.is_empty() {
        Ok(())
    } else {
        tracing::debug!(count = violations.len(), "schema failed vocabulary check");
        Err(SchemaError::Vocabulary {
            count: violations.len(),
            violations,
        })
    }
}

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

fn malformed(pointer: &str, reason: &str) -> SchemaError {
    SchemaError::Malformed {
        pointer: pointer_or_root(pointer),
        reason: reason.to_string(),
    }
}

fn pointer_or_root(pointer: &str) -> String {
    if pointer.is_empty() {
        "/".to_string()
    } else {
        pointer.to_string()
    }
}

/// Escape a key for use as a JSON Pointer segment.
fn escape_segment(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

fn convert(value: &Value, pointer: &str) -> Result<SchemaNode, SchemaError> {
    let node = value
        .as_object()
        .ok_or_else(|| malformed(pointer, "expected an object"))?;
    let node_type = node
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed(pointer, "missing \"type\""))?;

    let allowed = match node_type {
        "object" => OBJECT_KEYWORDS,
        "array" => ARRAY_KEYWORDS,
        "string" => STRING_KEYWORDS,
        other => return Err(malformed(pointer, &format!("unsupported type \"{other}\""))),
    };
    let misplaced = node.keys().find(|keyword| {
        let keyword = keyword.as_str();
        keyword != "type" && !ANNOTATIONS.contains(&keyword) && !allowed.contains(&keyword)
    });
    if let Some(keyword) = misplaced {
        return Err(SchemaError::MisplacedKeyword {
            pointer: pointer_or_root(pointer),
            keyword: keyword.clone(),
            node_type: node_type.to_string(),
        });
    }

    match node_type {
        "object" => convert_object(node, pointer).map(SchemaNode::Object),
        "array" => convert_array(node, pointer).map(SchemaNode::Array),
        _ => convert_string(node, pointer).map(SchemaNode::String),
    }
}

fn convert_object(node: &Map<String, Value>, pointer: &str) -> Result<ObjectSchema, SchemaError> {
    let mut schema = ObjectSchema::default();

    if let Some(flag) = node.get("additionalProperties") {
        schema.additional_properties = flag
            .as_bool()
            .ok_or_else(|| malformed(pointer, "\"additionalProperties\" must be a boolean"))?;
    }

    if let Some(properties) = node.get("properties") {
        let properties = properties
            .as_object()
            .ok_or_else(|| malformed(pointer, "\"properties\" must be an object"))?;
        for (key, member) in properties {
            let child = format!("{pointer}/properties/{}", escape_segment(key));
            schema.properties.push((key.clone(), convert(member, &child)?));
        }
    }

    Ok(schema)
}

fn convert_array(node: &Map<String, Value>, pointer: &str) -> Result<ArraySchema, SchemaError> {
    let items = match node.get("items") {
        None => None,
        Some(Value::Array(positional)) => Some(ArrayItemsSpec::Positional(
            positional
                .iter()
                .enumerate()
                .map(|(i, item)| convert(item, &format!("{pointer}/items/{i}")))
                .collect::<Result<_, _>>()?,
        )),
        Some(uniform) => Some(ArrayItemsSpec::Uniform(Box::new(convert(
            uniform,
            &format!("{pointer}/items"),
        )?))),
    };

    let min_items = count(node, "minItems", pointer)?;
    let max_items = count(node, "maxItems", pointer)?;
    if let (Some(min), Some(max)) = (min_items, max_items) {
        if min > max {
            return Err(SchemaError::InvalidBounds {
                pointer: pointer_or_root(pointer),
                min,
                max,
            });
        }
    }

    Ok(ArraySchema {
        items,
        min_items,
        max_items,
    })
}

fn convert_string(node: &Map<String, Value>, pointer: &str) -> Result<StringSchema, SchemaError> {
    let min_length = count(node, "minLength", pointer)?;

    let format = match node.get("format") {
        None => None,
        Some(value) => {
            let keyword = value
                .as_str()
                .ok_or_else(|| malformed(pointer, "\"format\" must be a string"))?;
            Some(StringFormat::from_keyword(keyword).ok_or_else(|| {
                malformed(pointer, &format!("unsupported format \"{keyword}\""))
            })?)
        }
    };

    let pattern = match node.get("pattern") {
        None => None,
        Some(value) => {
            let source = value
                .as_str()
                .ok_or_else(|| malformed(pointer, "\"pattern\" must be a string"))?;
            Some(Pattern::new(source).map_err(|e| SchemaError::InvalidPattern {
                pointer: pointer_or_root(pointer),
                pattern: source.to_string(),
                reason: e.to_string(),
            })?)
        }
    };

    Ok(StringSchema {
        min_length,
        format,
        pattern,
    })
}

/// A non-negative integer keyword. Integral floats such as `2.0` count as
/// integers, matching the meta-schema's `"type": "integer"`.
fn count(node: &Map<String, Value>, keyword: &str, pointer: &str) -> Result<Option<u64>, SchemaError> {
    let Some(value) = node.get(keyword) else {
        return Ok(None);
    };
    value
        .as_u64()
        .or_else(|| {
            value
                .as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f < u64::MAX as f64)
                .map(|f| f as u64)
        })
        .map(Some)
        .ok_or_else(|| malformed(pointer, &format!("\"{keyword}\" must be a non-negative integer")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn load(value: Value) -> Result<Schema, SchemaError> {
        Schema::from_value(&value)
    }

    fn member<'a>(object: &'a ObjectSchema, name: &str) -> Option<&'a SchemaNode> {
        object
            .properties
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, node)| node)
    }

    // ── Bundled schema ───────────────────────────────────────────────

    #[test]
    fn bundled_schema_loads() {
        let schema = Schema::bundled().unwrap();
        let SchemaNode::Object(root) = schema.root() else {
            panic!("bundled root should be an object schema");
        };
        assert!(!root.additional_properties);
        assert!(member(root, "$schema").is_some());
        assert!(member(root, "root").is_some());
        assert!(member(root, "maintainers").is_some());
        assert!(member(root, "bogus").is_none());
    }

    #[test]
    fn bundled_schema_keeps_declaration_order() {
        let schema = Schema::bundled().unwrap();
        let SchemaNode::Object(root) = schema.root() else {
            panic!("bundled root should be an object schema");
        };
        let names: Vec<&str> = root.properties.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names[..3], ["$schema", "root", "name"]);
    }

    #[test]
    fn bundled_maintainers_are_tuples() {
        let schema = Schema::bundled().unwrap();
        let SchemaNode::Object(root) = schema.root() else {
            panic!("bundled root should be an object schema");
        };
        let Some(SchemaNode::Array(maintainers)) = member(root, "maintainers") else {
            panic!("maintainers should be an array schema");
        };
        let Some(ArrayItemsSpec::Uniform(pair)) = &maintainers.items else {
            panic!("maintainers items should be uniform");
        };
        let SchemaNode::Array(pair) = pair.as_ref() else {
            panic!("maintainer entries should be arrays");
        };
        assert!(matches!(&pair.items, Some(ArrayItemsSpec::Positional(p)) if p.len() == 2));
        assert_eq!(pair.min_items, Some(2));
        assert_eq!(pair.max_items, Some(2));
    }

    // ── Conversion ───────────────────────────────────────────────────

    #[test]
    fn minimal_nodes() {
        assert!(matches!(load(json!({"type": "object"})).unwrap().root(), SchemaNode::Object(o) if o.additional_properties));
        assert!(matches!(load(json!({"type": "array"})).unwrap().root(), SchemaNode::Array(a) if a.items.is_none()));
        assert!(matches!(load(json!({"type": "string"})).unwrap().root(), SchemaNode::String(_)));
    }

    #[test]
    fn string_constraints_converted() {
        let schema = load(json!({
            "type": "string",
            "minLength": 2,
            "format": "email",
            "pattern": "@example\\.com$"
        }))
        .unwrap();
        let SchemaNode::String(s) = schema.root() else {
            panic!("expected string schema");
        };
        assert_eq!(s.min_length, Some(2));
        assert_eq!(s.format, Some(StringFormat::Email));
        assert_eq!(s.pattern.as_ref().map(Pattern::as_str), Some("@example\\.com$"));
    }

    #[test]
    fn annotations_ignored() {
        let schema = load(json!({
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "$comment": "internal",
            "title": "t",
            "description": "d",
            "examples": [{}],
            "default": {},
            "type": "object"
        }));
        assert!(schema.is_ok());
    }

    // ── Vocabulary violations ────────────────────────────────────────

    #[test]
    fn unknown_keyword_rejected() {
        match load(json!({"type": "object", "required": ["root"]})).unwrap_err() {
            SchemaError::Vocabulary { count, violations } => {
                assert_eq!(count, violations.len());
                assert!(count >= 1);
            }
            other => panic!("expected Vocabulary, got: {other}"),
        }
    }

    #[test]
    fn unsupported_type_rejected() {
        assert!(matches!(
            load(json!({"type": "integer"})).unwrap_err(),
            SchemaError::Vocabulary { .. }
        ));
    }

    #[test]
    fn missing_type_rejected() {
        assert!(matches!(
            load(json!({"properties": {}})).unwrap_err(),
            SchemaError::Vocabulary { .. }
        ));
    }

    #[test]
    fn unsupported_format_rejected() {
        assert!(matches!(
            load(json!({"type": "string", "format": "date-time"})).unwrap_err(),
            SchemaError::Vocabulary { .. }
        ));
    }

    #[test]
    fn nested_violations_all_reported() {
        let err = load(json!({
            "type": "object",
            "properties": {
                "a": {"type": "number"},
                "b": {"type": "string", "minLength": -1}
            }
        }))
        .unwrap_err();
        match err {
            SchemaError::Vocabulary { violations, .. } => {
                assert!(violations.iter().any(|v| v.pointer.starts_with("/properties/a")));
                assert!(violations.iter().any(|v| v.pointer.starts_with("/properties/b")));
            }
            other => panic!("expected Vocabulary, got: {other}"),
        }
    }

    // ── Conversion-time checks ───────────────────────────────────────

    #[test]
    fn keyword_for_other_type_rejected() {
        match load(json!({"type": "array", "minLength": 1})).unwrap_err() {
            SchemaError::MisplacedKeyword { pointer, keyword, node_type } => {
                assert_eq!(pointer, "/");
                assert_eq!(keyword, "minLength");
                assert_eq!(node_type, "array");
            }
            other => panic!("expected MisplacedKeyword, got: {other}"),
        }
    }

    #[test]
    fn misplaced_keyword_pointer_is_nested() {
        let err = load(json!({
            "type": "object",
            "properties": {"a/b": {"type": "string", "items": {"type": "string"}}}
        }))
        .unwrap_err();
        match err {
            SchemaError::MisplacedKeyword { pointer, .. } => {
                assert_eq!(pointer, "/properties/a~1b");
            }
            other => panic!("expected MisplacedKeyword, got: {other}"),
        }
    }

    #[test]
    fn invalid_pattern_rejected() {
        match load(json!({"type": "string", "pattern": "(unclosed"})).unwrap_err() {
            SchemaError::InvalidPattern { pattern, .. } => assert_eq!(pattern, "(unclosed"),
            other => panic!("expected InvalidPattern, got: {other}"),
        }
    }

    #[test]
    fn inverted_bounds_rejected() {
        let err = load(json!({"type": "array", "items": [{"type": "string"}], "minItems": 3, "maxItems": 1}))
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidBounds { min: 3, max: 1, .. }));
        assert!(err.to_string().contains("minItems 3 exceeds maxItems 1"));
    }

    #[test]
    fn integral_float_counts_accepted() {
        let schema = load(json!({"type": "array", "minItems": 1.0, "maxItems": 2.0})).unwrap();
        let SchemaNode::Array(array) = schema.root() else {
            panic!("expected array schema");
        };
        assert_eq!(array.min_items, Some(1));
        assert_eq!(array.max_items, Some(2));

        let schema = load(json!({"type": "string", "minLength": 3.0})).unwrap();
        assert_eq!(schema.validate(&json!("ab")).len(), 1);
    }

    #[test]
    fn fractional_count_rejected() {
        assert!(matches!(
            load(json!({"type": "array", "maxItems": 2.5})).unwrap_err(),
            SchemaError::Vocabulary { .. }
        ));
    }

    #[test]
    fn direct_conversion_rejects_non_object_node() {
        let err = convert(&json!("string"), "/items").unwrap_err();
        assert!(err.to_string().contains("/items"));
    }

    // ── Sources ──────────────────────────────────────────────────────

    #[test]
    fn from_json_str_reports_parse_failure() {
        match Schema::from_json_str("{ nope", "custom.json").unwrap_err() {
            SchemaError::Parse(ParseFailure::InvalidJson { origin, .. }) => {
                assert_eq!(origin, "custom.json");
            }
            other => panic!("expected Parse, got: {other}"),
        }
    }

    #[test]
    fn from_path_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Schema::from_path(&dir.path().join("missing.schema.json")).unwrap_err();
        assert!(matches!(err, SchemaError::Parse(ParseFailure::Unreadable { .. })));
    }

    #[test]
    fn from_path_loads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.schema.json");
        std::fs::write(&path, r#"{"type": "object", "additionalProperties": false}"#).unwrap();
        let schema = Schema::from_path(&path).unwrap();
        assert_eq!(schema.validate(&json!({"x": 1})).len(), 1);
    }

    #[test]
    fn vocabulary_error_display_lists_violations() {
        let err = SchemaError::Vocabulary {
            count: 2,
            violations: vec![
                VocabularyViolation { pointer: String::new(), message: "a".into() },
                VocabularyViolation { pointer: "/properties/x".into(), message: "b".into() },
            ],
        };
        assert_eq!(
            err.to_string(),
            "schema uses unsupported vocabulary (2 violation(s)): /: a; /properties/x: b"
        );
    }
}
