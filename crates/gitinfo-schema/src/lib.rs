//! # gitinfo-schema
//!
//! Loads the schema vocabulary understood by the `.gitinfo` validator and
//! checks parsed documents against it.
//!
//! ## Vocabulary
//!
//! Three node types: `object` (`properties`, `additionalProperties`),
//! `array` (`items` as one schema or a positional list, `minItems`,
//! `maxItems`) and `string` (`minLength`, `format` of `uri` or `email`,
//! `pattern`). Anything else is rejected when the schema is loaded, never
//! silently ignored at validation time.
//!
//! ## Usage
//!
//! ```
//! use gitinfo_schema::Schema;
//! use serde_json::json;
//!
//! let schema = Schema::bundled().unwrap();
//! let errors = schema.validate(&json!({ "name": "" }));
//! assert_eq!(errors[0].to_string(), ".name: string too short (min 1)");
//! ```

pub mod format;
pub mod load;
pub mod node;
pub mod validate;

pub use load::{Schema, SchemaError, VocabularyViolation, GITINFO_SCHEMA};
pub use node::{ArrayItemsSpec, ArraySchema, ObjectSchema, SchemaNode, StringFormat, StringSchema};
pub use validate::{validate, ValidationError, ViolationKind};
