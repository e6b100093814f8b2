//! Schema data model: field declarations, typed values and validator outcomes

use crate::error::{EnvError, Result};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A typed environment value
#[derive(Debug, Clone, PartialEq)]
pub enum EnvValue {
    String(String),
    Number(f64),
    Boolean(bool),
    /// One of an enum field's allowed literals
    Enum(String),
}

impl EnvValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Enum(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Lowercase name of the value's kind
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Number(_) => "number",
            Self::Boolean(_) => "boolean",
            Self::Enum(_) => "enum",
        }
    }
}

impl fmt::Display for EnvValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) | Self::Enum(s) => write!(f, "{}", s),
            Self::Number(n) => write!(f, "{}", n),
            Self::Boolean(b) => write!(f, "{}", b),
        }
    }
}

impl Serialize for EnvValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::String(s) | Self::Enum(s) => serializer.serialize_str(s),
            Self::Number(n) => serializer.serialize_f64(*n),
            Self::Boolean(b) => serializer.serialize_bool(*b),
        }
    }
}

impl From<&str> for EnvValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for EnvValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for EnvValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<f64> for EnvValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for EnvValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<i32> for EnvValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<u16> for EnvValue {
    fn from(value: u16) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<u32> for EnvValue {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

/// Declared kind of a field; enum fields carry their allowed literals
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Number,
    Boolean,
    Enum(Vec<String>),
}

impl FieldKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Enum(_) => "enum",
        }
    }

    /// Whether a value has the shape this kind produces
    fn accepts(&self, value: &EnvValue) -> bool {
        match (self, value) {
            (Self::String, EnvValue::String(_)) => true,
            (Self::Number, EnvValue::Number(n)) => n.is_finite(),
            (Self::Boolean, EnvValue::Boolean(_)) => true,
            (Self::Enum(allowed), EnvValue::Enum(s) | EnvValue::String(s)) => allowed.iter().any(|a| a == s),
            _ => false,
        }
    }
}

/// Result of a custom validator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Valid,
    /// Rejected without a reason
    Invalid,
    /// Rejected with a human-readable reason
    Rejected(String),
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

impl From<bool> for ValidationOutcome {
    fn from(valid: bool) -> Self {
        if valid {
            Self::Valid
        } else {
            Self::Invalid
        }
    }
}

impl From<&str> for ValidationOutcome {
    fn from(reason: &str) -> Self {
        Self::Rejected(reason.to_string())
    }
}

impl From<String> for ValidationOutcome {
    fn from(reason: String) -> Self {
        Self::Rejected(reason)
    }
}

impl From<std::result::Result<(), String>> for ValidationOutcome {
    fn from(result: std::result::Result<(), String>) -> Self {
        match result {
            Ok(()) => Self::Valid,
            Err(reason) => Self::Rejected(reason),
        }
    }
}

/// User-supplied validation callback; must be pure and synchronous
pub type ValidatorFn = Arc<dyn Fn(&EnvValue) -> ValidationOutcome + Send + Sync>;

/// One schema entry
#[derive(Clone)]
pub struct FieldSpec {
    name: String,
    kind: FieldKind,
    default: Option<EnvValue>,
    validator: Option<ValidatorFn>,
    description: Option<String>,
    sensitive: bool,
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("default", &self.default)
            .field("validator", &self.validator.as_ref().map(|_| "<fn>"))
            .field("description", &self.description)
            .field("sensitive", &self.sensitive)
            .finish()
    }
}

impl FieldSpec {
    pub fn new<S: Into<String>>(name: S, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
            validator: None,
            description: None,
            sensitive: false,
        }
    }

    pub fn string<S: Into<String>>(name: S) -> Self {
        Self::new(name, FieldKind::String)
    }

    pub fn number<S: Into<String>>(name: S) -> Self {
        Self::new(name, FieldKind::Number)
    }

    pub fn boolean<S: Into<String>>(name: S) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    pub fn enumeration<S, I, V>(name: S, allowed: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self::new(name, FieldKind::Enum(allowed.into_iter().map(Into::into).collect()))
    }

    /// Set the value used when the variable is unset
    ///
    /// Text defaults on enum fields are stored as enum literals. A default of
    /// the wrong kind is reported by [`FieldSpec::check`].
    pub fn default_value<V: Into<EnvValue>>(mut self, value: V) -> Self {
        let value = match (&self.kind, value.into()) {
            (FieldKind::Enum(_), EnvValue::String(s)) => EnvValue::Enum(s),
            (_, value) => value,
        };
        self.default = Some(value);
        self
    }

    pub fn validator<F, R>(mut self, validator: F) -> Self
    where
        F: Fn(&EnvValue) -> R + Send + Sync + 'static,
        R: Into<ValidationOutcome>,
    {
        self.validator = Some(Arc::new(move |value: &EnvValue| validator(value).into()));
        self
    }

    pub(crate) fn with_validator_fn(mut self, validator: ValidatorFn) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mask this field's value in diagnostic output
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn default(&self) -> Option<&EnvValue> {
        self.default.as_ref()
    }

    pub fn get_validator(&self) -> Option<&ValidatorFn> {
        self.validator.as_ref()
    }

    pub fn get_description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_sensitive(&self) -> bool {
        self.sensitive
    }

    /// Requiredness is derived: a field without a default must be set
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }

    /// Check the declaration itself is well formed
    pub fn check(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(EnvError::schema("field name cannot be empty"));
        }

        if let FieldKind::Enum(allowed) = &self.kind {
            if allowed.is_empty() {
                return Err(EnvError::schema(format!(
                    "{} is declared as enum but has no allowed values",
                    self.name
                )));
            }
        }

        if let Some(default) = &self.default {
            if !self.kind.accepts(default) {
                return Err(EnvError::schema(match &self.kind {
                    FieldKind::Enum(allowed) => format!(
                        "default for {} must be one of: {}",
                        self.name,
                        allowed.join(", ")
                    ),
                    kind => format!(
                        "default for {} is a {} but the field is declared {}",
                        self.name,
                        default.kind_name(),
                        kind.name()
                    ),
                }));
            }
        }

        Ok(())
    }
}

/// Ordered set of field declarations, keyed by name
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<FieldSpec>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field, replacing any earlier field of the same name in place
    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.insert(spec);
        self
    }

    pub fn insert(&mut self, spec: FieldSpec) {
        match self.fields.iter_mut().find(|f| f.name == spec.name) {
            Some(existing) => *existing = spec,
            None => self.fields.push(spec),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Check every declaration, failing on the first malformed one
    pub fn check(&self) -> Result<()> {
        self.fields.iter().try_for_each(FieldSpec::check)
    }
}

impl FromIterator<FieldSpec> for Schema {
    fn from_iter<I: IntoIterator<Item = FieldSpec>>(iter: I) -> Self {
        let mut schema = Schema::new();
        for spec in iter {
            schema.insert(spec);
        }
        schema
    }
}

/// Typed validation result, one entry per resolved field
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ParsedEnv {
    values: BTreeMap<String, EnvValue>,
}

impl ParsedEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert<S: Into<String>>(&mut self, name: S, value: EnvValue) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&EnvValue> {
        self.values.get(name)
    }

    /// Text of a string or enum field
    pub fn string(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(EnvValue::as_str)
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(EnvValue::as_number)
    }

    pub fn boolean(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(EnvValue::as_bool)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EnvValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}
