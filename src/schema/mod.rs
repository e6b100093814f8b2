//! Schema declarations and the typed result model

pub mod file;
pub mod types;

pub use file::{load_schema, schema_from_json, FieldDocument, SchemaDocument};
pub use types::{EnvValue, FieldKind, FieldSpec, ParsedEnv, Schema, ValidationOutcome, ValidatorFn};
