//! # Schema Tree
//!
//! The typed form of the supported schema vocabulary. A [`SchemaNode`] tree
//! is built once by [`crate::load`] and is read-only afterwards, so a single
//! tree can serve any number of validations, including concurrent ones.

use regex::Regex;

/// One node of the schema tree.
#[derive(Debug, Clone)]
pub enum SchemaNode {
    /// `"type": "object"`
    Object(ObjectSchema),
    /// `"type": "array"`
    Array(ArraySchema),
    /// `"type": "string"`
    String(StringSchema),
}

impl SchemaNode {
    /// The vocabulary name of this node's type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Object(_) => "object",
            Self::Array(_) => "array",
            Self::String(_) => "string",
        }
    }
}

/// Object node: declared members plus the unknown-key policy.
///
/// There is no `required`: a declared property that is absent from the
/// document is never an error.
#[derive(Debug, Clone)]
pub struct ObjectSchema {
    /// Declared members in schema order.
    pub properties: Vec<(String, SchemaNode)>,
    /// When false, keys not listed in `properties` are reported.
    pub additional_properties: bool,
}

impl Default for ObjectSchema {
    fn default() -> Self {
        Self {
            properties: Vec::new(),
            additional_properties: true,
        }
    }
}

/// Array node.
#[derive(Debug, Clone, Default)]
pub struct ArraySchema {
    /// Element schema(s). `None` checks only the container type and counts.
    pub items: Option<ArrayItemsSpec>,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
}

/// How array elements are checked.
#[derive(Debug, Clone)]
pub enum ArrayItemsSpec {
    /// Every element against the same schema.
    Uniform(Box<SchemaNode>),
    /// Element `i` against schema `i`; elements past the end are unchecked.
    Positional(Vec<SchemaNode>),
}

impl ArrayItemsSpec {
    /// Schema for the element at `index`, if that element is checked at all.
    pub fn schema_for(&self, index: usize) -> Option<&SchemaNode> {
        match self {
            Self::Uniform(node) => Some(node),
            Self::Positional(nodes) => nodes.get(index),
        }
    }
}

/// String node. All present constraints are checked independently.
#[derive(Debug, Clone, Default)]
pub struct StringSchema {
    /// Minimum length in Unicode scalar values.
    pub min_length: Option<u64>,
    pub format: Option<StringFormat>,
    pub pattern: Option<Pattern>,
}

/// Supported `format` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringFormat {
    /// Absolute `http` or `https` URL.
    Uri,
    /// `local@domain.tld` shape.
    Email,
}

impl StringFormat {
    /// Parse the vocabulary keyword value.
    pub fn from_keyword(value: &str) -> Option<Self> {
        match value {
            "uri" => Some(Self::Uri),
            "email" => Some(Self::Email),
            _ => None,
        }
    }
}

/// A compiled `pattern` together with its source text.
///
/// Matching is an unanchored search: `"b"` matches `"abc"`. Anchors in the
/// source text (`^...$`) are what make a pattern match the whole string.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
}

impl Pattern {
    /// Compile a pattern.
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(source)?,
        })
    }

    /// The pattern text as written in the schema.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Whether the pattern occurs anywhere in `text`.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}
