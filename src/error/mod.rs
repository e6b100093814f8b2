//! Error handling for environment validation

use crate::schema::ParsedEnv;
use thiserror::Error;

/// Errors produced while validating an environment against a schema
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EnvError {
    /// Required field has no raw value and no default
    #[error("{name} is required but not set")]
    Missing { name: String },

    /// Raw text cannot be coerced to the declared number/boolean kind
    #[error("Cannot parse \"{raw}\" as {expected} for {name}{}", .expected.hint())]
    InvalidType {
        name: String,
        raw: String,
        expected: ExpectedType,
    },

    /// Raw text is not one of the declared enum values
    #[error("{name} must be one of: {}", .allowed.join(", "))]
    InvalidEnum { name: String, allowed: Vec<String> },

    /// A custom validator rejected an already well-typed value
    #[error("{}", validation_failed_message(.name, .reason.as_deref()))]
    ValidationFailed { name: String, reason: Option<String> },

    /// The schema itself is malformed
    #[error("Schema error: {0}")]
    Schema(String),

    /// Every per-field failure of an accumulate-mode run
    #[error("{0}")]
    Aggregate(AggregateError),

    /// .env or schema document problems
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(String),

    /// Parsing errors (JSON documents, etc.)
    #[error("Parsing error: {0}")]
    Parse(String),
}

/// Target kind of a failed coercion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedType {
    Number,
    Boolean,
}

impl ExpectedType {
    fn hint(&self) -> &'static str {
        match self {
            Self::Number => "",
            Self::Boolean => ". Expected: true, false, 1, or 0",
        }
    }
}

impl std::fmt::Display for ExpectedType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number => write!(f, "number"),
            Self::Boolean => write!(f, "boolean"),
        }
    }
}

fn validation_failed_message(name: &str, reason: Option<&str>) -> String {
    match reason {
        Some(reason) => format!("{} validation error: {}", name, reason),
        None => format!("{} failed validation", name),
    }
}

/// Accumulated field errors, in field-encounter order
///
/// The fields that did resolve are kept alongside so a caller can report on
/// them; they are never handed out as a successful result.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateError {
    errors: Vec<EnvError>,
    resolved: ParsedEnv,
}

impl AggregateError {
    pub(crate) fn new(errors: Vec<EnvError>, resolved: ParsedEnv) -> Self {
        Self { errors, resolved }
    }

    /// Individual field errors
    pub fn errors(&self) -> &[EnvError] {
        &self.errors
    }

    /// Fields that resolved successfully in the same run
    pub fn resolved(&self) -> &ParsedEnv {
        &self.resolved
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl std::fmt::Display for AggregateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl EnvError {
    pub fn missing<S: Into<String>>(name: S) -> Self {
        Self::Missing { name: name.into() }
    }

    pub fn invalid_type<N: Into<String>, R: Into<String>>(name: N, raw: R, expected: ExpectedType) -> Self {
        Self::InvalidType {
            name: name.into(),
            raw: raw.into(),
            expected,
        }
    }

    pub fn invalid_enum<S: Into<String>>(name: S, allowed: &[String]) -> Self {
        Self::InvalidEnum {
            name: name.into(),
            allowed: allowed.to_vec(),
        }
    }

    pub fn validation_failed<S: Into<String>>(name: S, reason: Option<String>) -> Self {
        Self::ValidationFailed {
            name: name.into(),
            reason,
        }
    }

    /// Create a new schema error
    pub fn schema<S: Into<String>>(message: S) -> Self {
        Self::Schema(message.into())
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io(message.into())
    }

    /// Create a new parsing error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse(message.into())
    }

    /// Name of the offending field, for field-level errors
    pub fn field_name(&self) -> Option<&str> {
        match self {
            Self::Missing { name }
            | Self::InvalidType { name, .. }
            | Self::InvalidEnum { name, .. }
            | Self::ValidationFailed { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Individual messages; one for plain errors, one per field for aggregates
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Aggregate(aggregate) => aggregate.errors.iter().map(|e| e.to_string()).collect(),
            other => vec![other.to_string()],
        }
    }

    /// Get error category for logging and reporting
    pub fn category(&self) -> &'static str {
        match self {
            Self::Missing { .. } => "MISSING",
            Self::InvalidType { .. } => "TYPE",
            Self::InvalidEnum { .. } => "ENUM",
            Self::ValidationFailed { .. } => "VALIDATION",
            Self::Schema(_) => "SCHEMA",
            Self::Aggregate(_) => "AGGREGATE",
            Self::Config(_) => "CONFIG",
            Self::Io(_) => "IO",
            Self::Parse(_) => "PARSE",
        }
    }

    /// Hint for errors a user can fix from the shell, if any
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::Missing { name } => Some(format!(
                "Set {} in the environment or in the file passed with --env-file.",
                name
            )),
            Self::Aggregate(aggregate) => Some(format!(
                "{} variable(s) need attention.\n  \
                 - Run `envguard describe --schema <FILE>` to list expected types\n  \
                 - Run `envguard example --schema <FILE>` for a starter .env file",
                aggregate.len()
            )),
            Self::Schema(_) | Self::Parse(_) => Some(
                "Schema help:\n  \
                 - Enum fields need a non-empty \"values\" list\n  \
                 - Defaults must match the declared type\n  \
                 - Patterns must be valid regular expressions"
                    .to_string(),
            ),
            Self::Config(_) => Some("Check that the schema and .env paths exist and are readable.".to_string()),
            Self::InvalidType { .. } | Self::InvalidEnum { .. } => {
                Some("Run `envguard describe --schema <FILE>` to see the accepted values.".to_string())
            }
            Self::ValidationFailed { .. } | Self::Io(_) => None,
        }
    }

    /// Get exit code for this error type
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Missing { .. }
            | Self::InvalidType { .. }
            | Self::InvalidEnum { .. }
            | Self::ValidationFailed { .. }
            | Self::Aggregate(_) => 1,
            Self::Schema(_) | Self::Parse(_) => 2,
            Self::Config(_) => 3,
            Self::Io(_) => 5,
        }
    }

    /// Format error for console display with color coding
    pub fn format_for_console(&self, use_color: bool) -> String {
        use colored::Colorize;

        let category = self.category();
        let lines = self.messages();

        lines
            .iter()
            .map(|line| {
                if !use_color {
                    return format!("[{}] {}", category, line);
                }
                match self {
                    Self::Schema(_) | Self::Parse(_) => {
                        format!("[{}] {}", category.bright_red().bold(), line.bright_red())
                    }
                    Self::Config(_) | Self::Io(_) => {
                        format!("[{}] {}", category.yellow().bold(), line.yellow())
                    }
                    _ => format!("[{}] {}", category.red().bold(), line.red()),
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl From<AggregateError> for EnvError {
    fn from(error: AggregateError) -> Self {
        Self::Aggregate(error)
    }
}

impl From<std::io::Error> for EnvError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<serde_json::Error> for EnvError {
    fn from(error: serde_json::Error) -> Self {
        Self::parse(format!("JSON parse error: {}", error))
    }
}

impl From<dotenv::Error> for EnvError {
    fn from(error: dotenv::Error) -> Self {
        Self::config(format!("Environment file error: {}", error))
    }
}

impl From<regex::Error> for EnvError {
    fn from(error: regex::Error) -> Self {
        Self::schema(format!("Invalid pattern: {}", error))
    }
}

/// Custom Result type for the library
pub type Result<T> = std::result::Result<T, EnvError>;
