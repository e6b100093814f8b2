//! Built-in validators
//!
//! Each constructor returns a closure usable with [`FieldSpec::validator`];
//! [`RuleSet`] is the declarative form used by JSON schema documents.
//!
//! [`FieldSpec::validator`]: crate::schema::FieldSpec::validator

use crate::error::{EnvError, Result};
use crate::schema::{EnvValue, FieldKind, ValidationOutcome, ValidatorFn};
use regex::Regex;
use serde::Deserialize;
use std::net::IpAddr;
use std::sync::Arc;

fn text(value: &EnvValue) -> std::result::Result<&str, ValidationOutcome> {
    value
        .as_str()
        .ok_or_else(|| ValidationOutcome::Rejected(format!("expected text, got a {}", value.kind_name())))
}

fn number(value: &EnvValue) -> std::result::Result<f64, ValidationOutcome> {
    value
        .as_number()
        .ok_or_else(|| ValidationOutcome::Rejected(format!("expected a number, got a {}", value.kind_name())))
}

/// Text must have at least `min` characters
pub fn min_length(min: usize) -> impl Fn(&EnvValue) -> ValidationOutcome + Send + Sync + 'static {
    move |value: &EnvValue| match text(value) {
        Ok(s) if s.chars().count() >= min => ValidationOutcome::Valid,
        Ok(_) => ValidationOutcome::Rejected(format!("must be at least {} characters", min)),
        Err(outcome) => outcome,
    }
}

/// Text must have at most `max` characters
pub fn max_length(max: usize) -> impl Fn(&EnvValue) -> ValidationOutcome + Send + Sync + 'static {
    move |value: &EnvValue| match text(value) {
        Ok(s) if s.chars().count() <= max => ValidationOutcome::Valid,
        Ok(_) => ValidationOutcome::Rejected(format!("must be at most {} characters", max)),
        Err(outcome) => outcome,
    }
}

/// Text must match a regular expression
pub fn pattern(expr: &str) -> Result<impl Fn(&EnvValue) -> ValidationOutcome + Send + Sync + 'static> {
    let regex = Regex::new(expr)?;
    Ok(move |value: &EnvValue| match text(value) {
        Ok(s) if regex.is_match(s) => ValidationOutcome::Valid,
        Ok(_) => ValidationOutcome::Rejected(format!("must match pattern {}", regex.as_str())),
        Err(outcome) => outcome,
    })
}

/// Number must lie within the inclusive bounds given
pub fn range(min: Option<f64>, max: Option<f64>) -> impl Fn(&EnvValue) -> ValidationOutcome + Send + Sync + 'static {
    move |value: &EnvValue| {
        let n = match number(value) {
            Ok(n) => n,
            Err(outcome) => return outcome,
        };
        if let Some(min) = min {
            if n < min {
                return ValidationOutcome::Rejected(format!("must be >= {}", min));
            }
        }
        if let Some(max) = max {
            if n > max {
                return ValidationOutcome::Rejected(format!("must be <= {}", max));
            }
        }
        ValidationOutcome::Valid
    }
}

/// Number must be an integer TCP/UDP port (1-65535)
pub fn port() -> impl Fn(&EnvValue) -> ValidationOutcome + Send + Sync + 'static {
    |value: &EnvValue| match number(value) {
        Ok(n) if n.fract() == 0.0 && (1.0..=65535.0).contains(&n) => ValidationOutcome::Valid,
        Ok(_) => ValidationOutcome::Rejected("must be a port between 1 and 65535".to_string()),
        Err(outcome) => outcome,
    }
}

/// Text must parse as a URL, optionally restricted to some schemes
pub fn url(schemes: &[&str]) -> impl Fn(&EnvValue) -> ValidationOutcome + Send + Sync + 'static {
    let schemes: Vec<String> = schemes.iter().map(|s| s.to_string()).collect();
    move |value: &EnvValue| {
        let s = match text(value) {
            Ok(s) => s,
            Err(outcome) => return outcome,
        };
        match ::url::Url::parse(s) {
            Ok(parsed) if schemes.is_empty() || schemes.iter().any(|scheme| scheme == parsed.scheme()) => {
                ValidationOutcome::Valid
            }
            Ok(parsed) => ValidationOutcome::Rejected(format!(
                "URL scheme {} is not one of: {}",
                parsed.scheme(),
                schemes.join(", ")
            )),
            Err(e) => ValidationOutcome::Rejected(format!("must be a valid URL: {}", e)),
        }
    }
}

/// Text must parse as an IPv4 or IPv6 address
pub fn ip_addr() -> impl Fn(&EnvValue) -> ValidationOutcome + Send + Sync + 'static {
    |value: &EnvValue| match text(value) {
        Ok(s) if s.parse::<IpAddr>().is_ok() => ValidationOutcome::Valid,
        Ok(_) => ValidationOutcome::Rejected("must be a valid IP address".to_string()),
        Err(outcome) => outcome,
    }
}

/// Declarative rules as written in schema documents
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSet {
    #[serde(default)]
    pub min_length: Option<usize>,
    #[serde(default)]
    pub max_length: Option<usize>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub url: bool,
    /// Allowed URL schemes; implies `url`
    #[serde(default)]
    pub schemes: Option<Vec<String>>,
    #[serde(default)]
    pub ip: bool,
}

impl RuleSet {
    pub fn is_empty(&self) -> bool {
        self.min_length.is_none()
            && self.max_length.is_none()
            && self.pattern.is_none()
            && self.min.is_none()
            && self.max.is_none()
            && !self.url
            && self.schemes.is_none()
            && !self.ip
    }

    fn has_text_rules(&self) -> bool {
        self.min_length.is_some()
            || self.max_length.is_some()
            || self.pattern.is_some()
            || self.url
            || self.schemes.is_some()
            || self.ip
    }

    fn has_number_rules(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }

    /// Build a single validator; the first failing rule decides the outcome
    pub fn compile(&self, name: &str, kind: &FieldKind) -> Result<ValidatorFn> {
        let text_kind = matches!(kind, FieldKind::String | FieldKind::Enum(_));
        if self.has_text_rules() && !text_kind {
            return Err(EnvError::schema(format!(
                "{} has text rules but is declared {}",
                name,
                kind.name()
            )));
        }
        if self.has_number_rules() && *kind != FieldKind::Number {
            return Err(EnvError::schema(format!(
                "{} has numeric rules but is declared {}",
                name,
                kind.name()
            )));
        }

        let mut checks: Vec<ValidatorFn> = Vec::new();
        if let Some(min) = self.min_length {
            checks.push(Arc::new(min_length(min)));
        }
        if let Some(max) = self.max_length {
            checks.push(Arc::new(max_length(max)));
        }
        if let Some(expr) = &self.pattern {
            checks.push(Arc::new(pattern(expr)?));
        }
        if self.has_number_rules() {
            checks.push(Arc::new(range(self.min, self.max)));
        }
        if self.url || self.schemes.is_some() {
            let schemes = self.schemes.clone().unwrap_or_default();
            let schemes: Vec<&str> = schemes.iter().map(String::as_str).collect();
            checks.push(Arc::new(url(&schemes)));
        }
        if self.ip {
            checks.push(Arc::new(ip_addr()));
        }

        Ok(Arc::new(move |value: &EnvValue| {
            checks
                .iter()
                .map(|check| check(value))
                .find(|outcome| !outcome.is_valid())
                .unwrap_or(ValidationOutcome::Valid)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(value: &str) -> EnvValue {
        EnvValue::String(value.to_string())
    }

    #[test]
    fn test_length_rules() {
        let min = min_length(3);
        assert!(min(&s("abc")).is_valid());
        assert_eq!(min(&s("ab")), ValidationOutcome::Rejected("must be at least 3 characters".into()));

        let max = max_length(2);
        assert!(max(&s("ab")).is_valid());
        assert!(!max(&s("abc")).is_valid());
        assert!(!max(&EnvValue::Number(1.0)).is_valid());
    }

    #[test]
    fn test_pattern_rule() {
        let rule = pattern("^[a-z]+$").unwrap();
        assert!(rule(&s("abc")).is_valid());
        assert!(!rule(&s("ABC")).is_valid());
        assert!(pattern("(").is_err());
    }

    #[test]
    fn test_range_and_port_rules() {
        let rule = range(Some(1.0), Some(10.0));
        assert!(rule(&EnvValue::Number(1.0)).is_valid());
        assert!(rule(&EnvValue::Number(10.0)).is_valid());
        assert_eq!(rule(&EnvValue::Number(11.0)), ValidationOutcome::Rejected("must be <= 10".into()));
        assert_eq!(rule(&EnvValue::Number(0.0)), ValidationOutcome::Rejected("must be >= 1".into()));

        let port = port();
        assert!(port(&EnvValue::Number(8080.0)).is_valid());
        assert!(!port(&EnvValue::Number(0.0)).is_valid());
        assert!(!port(&EnvValue::Number(80.5)).is_valid());
        assert!(!port(&EnvValue::Number(70000.0)).is_valid());
    }

    #[test]
    fn test_url_and_ip_rules() {
        let any = url(&[]);
        assert!(any(&s("http://example.com")).is_valid());
        assert!(!any(&s("not-a-url")).is_valid());

        let https = url(&["https"]);
        assert!(https(&s("https://example.com")).is_valid());
        assert!(!https(&s("http://example.com")).is_valid());

        let ip = ip_addr();
        assert!(ip(&s("8.8.8.8")).is_valid());
        assert!(ip(&s("2001:4860:4860::8888")).is_valid());
        assert!(!ip(&s("not-an-ip")).is_valid());
    }

    #[test]
    fn test_rule_set_first_failure_wins() {
        let rules = RuleSet {
            min_length: Some(3),
            pattern: Some("^[0-9]+$".to_string()),
            ..Default::default()
        };
        let check = rules.compile("CODE", &FieldKind::String).unwrap();

        assert!(check(&s("1234")).is_valid());
        assert_eq!(check(&s("12")), ValidationOutcome::Rejected("must be at least 3 characters".into()));
        assert_eq!(check(&s("abcd")), ValidationOutcome::Rejected("must match pattern ^[0-9]+$".into()));
    }

    #[test]
    fn test_rule_set_kind_mismatch() {
        let numeric = RuleSet { min: Some(1.0), ..Default::default() };
        assert!(matches!(numeric.compile("X", &FieldKind::String), Err(EnvError::Schema(_))));

        let textual = RuleSet { ip: true, ..Default::default() };
        assert!(matches!(textual.compile("X", &FieldKind::Boolean), Err(EnvError::Schema(_))));
        assert!(textual.compile("X", &FieldKind::Enum(vec!["a".into()])).is_ok());
    }

    #[test]
    fn test_rule_set_deserializes() {
        let rules: RuleSet = serde_json::from_str(r#"{"schemes":["https"],"max_length":100}"#).unwrap();
        assert!(!rules.is_empty());
        let check = rules.compile("URL", &FieldKind::String).unwrap();
        assert!(check(&s("https://example.com")).is_valid());
        assert!(!check(&s("ftp://example.com")).is_valid());

        assert!(serde_json::from_str::<RuleSet>(r#"{"bogus":1}"#).is_err());
        assert!(RuleSet::default().is_empty());
    }
}
