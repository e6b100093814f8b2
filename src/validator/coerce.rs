//! Text to typed value coercion

use crate::error::{EnvError, ExpectedType, Result};
use crate::schema::{EnvValue, FieldKind};

/// Coerce raw text according to a field's declared kind
pub fn coerce(name: &str, kind: &FieldKind, raw: &str) -> Result<EnvValue> {
    match kind {
        FieldKind::String => Ok(EnvValue::String(raw.to_string())),
        FieldKind::Number => parse_number(name, raw).map(EnvValue::Number),
        FieldKind::Boolean => parse_boolean(name, raw).map(EnvValue::Boolean),
        FieldKind::Enum(allowed) => {
            // Exact text comparison, no case folding or numeric coercion
            if allowed.iter().any(|candidate| candidate == raw) {
                Ok(EnvValue::Enum(raw.to_string()))
            } else {
                Err(EnvError::invalid_enum(name, allowed))
            }
        }
    }
}

/// Decimal number; surrounding whitespace is ignored, non-finite results rejected
pub fn parse_number(name: &str, raw: &str) -> Result<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EnvError::invalid_type(name, raw, ExpectedType::Number));
    }

    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(n),
        _ => Err(EnvError::invalid_type(name, raw, ExpectedType::Number)),
    }
}

/// `true`/`1` and `false`/`0`, case-insensitive
pub fn parse_boolean(name: &str, raw: &str) -> Result<bool> {
    match raw.to_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(EnvError::invalid_type(name, raw, ExpectedType::Boolean)),
    }
}
