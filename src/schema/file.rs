//! JSON schema documents
//!
//! Hosts that cannot express validators as closures (the CLI, ops tooling)
//! describe a schema as a JSON document with declarative rules.

use super::types::{EnvValue, FieldKind, FieldSpec, Schema};
use crate::error::{EnvError, Result};
use crate::rules::RuleSet;
use serde::Deserialize;
use std::path::Path;

/// Top-level schema document
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDocument {
    pub fields: Vec<FieldDocument>,
}

/// Declared kind as written in a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindName {
    String,
    Number,
    Boolean,
    Enum,
}

/// One field entry of a schema document
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDocument {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: KindName,
    #[serde(default)]
    pub default: Option<serde_json::Value>,
    /// Allowed literals; numbers and booleans are kept as their JSON text
    #[serde(default)]
    pub values: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sensitive: bool,
    #[serde(default)]
    pub rules: Option<RuleSet>,
}

impl FieldDocument {
    /// Convert into a field declaration
    pub fn into_spec(self) -> Result<FieldSpec> {
        if self.kind != KindName::Enum && self.values.is_some() {
            return Err(EnvError::schema(format!(
                "{} declares values but is not an enum",
                self.name
            )));
        }

        let kind = match self.kind {
            KindName::String => FieldKind::String,
            KindName::Number => FieldKind::Number,
            KindName::Boolean => FieldKind::Boolean,
            // Missing values stay empty and fail the schema check
            KindName::Enum => FieldKind::Enum(
                self.values
                    .unwrap_or_default()
                    .into_iter()
                    .map(|value| scalar_text(&self.name, value))
                    .collect::<Result<Vec<_>>>()?,
            ),
        };
        let is_enum = matches!(kind, FieldKind::Enum(_));

        let mut spec = FieldSpec::new(self.name.clone(), kind);

        if let Some(default) = self.default {
            let value = if is_enum {
                EnvValue::Enum(scalar_text(&self.name, default)?)
            } else {
                json_to_value(&self.name, default)?
            };
            spec = spec.default_value(value);
        }
        if let Some(description) = self.description {
            spec = spec.description(description);
        }
        if self.sensitive {
            spec = spec.sensitive();
        }
        if let Some(rules) = self.rules {
            if !rules.is_empty() {
                let validator = rules.compile(spec.name(), spec.kind())?;
                spec = spec.with_validator_fn(validator);
            }
        }

        spec.check()?;
        Ok(spec)
    }
}

/// Text form of a scalar enum literal, compared against raw values as-is
fn scalar_text(name: &str, value: serde_json::Value) -> Result<String> {
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Bool(b) => Ok(b.to_string()),
        other => Err(EnvError::schema(format!(
            "enum literal for {} must be a string, number or boolean, got {}",
            name, other
        ))),
    }
}

fn json_to_value(name: &str, value: serde_json::Value) -> Result<EnvValue> {
    match value {
        serde_json::Value::String(s) => Ok(EnvValue::String(s)),
        serde_json::Value::Bool(b) => Ok(EnvValue::Boolean(b)),
        serde_json::Value::Number(n) => n
            .as_f64()
            .map(EnvValue::Number)
            .ok_or_else(|| EnvError::schema(format!("default for {} is not a representable number", name))),
        other => Err(EnvError::schema(format!(
            "default for {} must be a string, number or boolean, got {}",
            name, other
        ))),
    }
}

impl SchemaDocument {
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn into_schema(self) -> Result<Schema> {
        let mut schema = Schema::new();
        for field in self.fields {
            if schema.get(&field.name).is_some() {
                return Err(EnvError::schema(format!("{} is declared more than once", field.name)));
            }
            schema.insert(field.into_spec()?);
        }
        Ok(schema)
    }
}

/// Parse a schema from JSON text
pub fn schema_from_json(content: &str) -> Result<Schema> {
    SchemaDocument::from_json(content)?.into_schema()
}

/// Load a schema from a JSON file
pub fn load_schema(path: &Path) -> Result<Schema> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| EnvError::config(format!("Failed to read schema file {}: {}", path.display(), e)))?;
    schema_from_json(&content)
}
