//! Schema validation and coercion of environment snapshots
//!
//! A run walks the schema once, in declaration order. For every field the
//! raw value is looked up, defaulted or coerced, then passed to the field's
//! validator. Fail-fast runs stop at the first field error; accumulate runs
//! visit every field and fail once with all messages.

pub mod coerce;


use crate::env::RawEnv;
use crate::error::{AggregateError, EnvError, Result};
use crate::logging::{LogEntry, LogLevel, LogSink, Logger};
use crate::schema::{EnvValue, FieldSpec, ParsedEnv, Schema, ValidationOutcome};

/// Logger name used for validation diagnostics
pub const LOGGER_NAME: &str = "envguard";

const MASK: &str = "****";

/// Per-run options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidateOptions {
    /// Stop at the first field error instead of reporting all of them
    pub throw_on_error: bool,
    /// Emit one diagnostic entry per resolved field
    pub debug_log: bool,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            throw_on_error: true,
            debug_log: false,
        }
    }
}

impl ValidateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate every field and report all failures together
    pub fn accumulate(mut self) -> Self {
        self.throw_on_error = false;
        self
    }

    pub fn with_throw_on_error(mut self, throw_on_error: bool) -> Self {
        self.throw_on_error = throw_on_error;
        self
    }

    pub fn with_debug_log(mut self, debug_log: bool) -> Self {
        self.debug_log = debug_log;
        self
    }
}

/// Where a resolved value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    Environment,
    Default,
}

impl ValueSource {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Environment => "environment",
            Self::Default => "default",
        }
    }
}

/// A successfully resolved field
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub value: EnvValue,
    pub source: ValueSource,
}

/// Resolve one field: required check, then coercion, then custom validation
pub fn evaluate_field(spec: &FieldSpec, env: &RawEnv) -> Result<Resolution> {
    let name = spec.name();

    let resolution = match env.get_set(name) {
        Some(raw) => Resolution {
            value: coerce::coerce(name, spec.kind(), raw)?,
            source: ValueSource::Environment,
        },
        None => match spec.default() {
            Some(default) => Resolution {
                value: default.clone(),
                source: ValueSource::Default,
            },
            None => return Err(EnvError::missing(name)),
        },
    };

    if let Some(validator) = spec.get_validator() {
        match validator(&resolution.value) {
            ValidationOutcome::Valid => {}
            ValidationOutcome::Invalid => return Err(EnvError::validation_failed(name, None)),
            ValidationOutcome::Rejected(reason) => {
                return Err(EnvError::validation_failed(name, Some(reason)))
            }
        }
    }

    Ok(resolution)
}

/// Lazily evaluated per-field outcomes, in schema order
fn outcomes<'a>(
    schema: &'a Schema,
    env: &'a RawEnv,
) -> impl Iterator<Item = (&'a FieldSpec, Result<Resolution>)> + 'a {
    schema.fields().map(move |spec| (spec, evaluate_field(spec, env)))
}

fn diagnostic_entry(spec: &FieldSpec, resolution: &Resolution) -> LogEntry {
    let shown = if spec.is_sensitive() {
        MASK.to_string()
    } else {
        resolution.value.to_string()
    };

    let message = match resolution.source {
        ValueSource::Default => format!("{}={} (using default)", spec.name(), shown),
        ValueSource::Environment => format!("{}={}", spec.name(), shown),
    };

    LogEntry::new(LogLevel::Info, LOGGER_NAME, message)
        .field("field", spec.name())
        .field("kind", spec.kind().name())
        .field("source", resolution.source.as_str())
}

/// Validate a snapshot, sending diagnostics to `sink` when enabled
pub fn validate_with_sink(
    schema: &Schema,
    env: &RawEnv,
    options: &ValidateOptions,
    sink: &dyn LogSink,
) -> Result<ParsedEnv> {
    // Malformed declarations fail regardless of the propagation mode
    schema.check()?;

    let mut parsed = ParsedEnv::new();
    let mut errors = Vec::new();
    let mut entries = Vec::new();

    for (spec, outcome) in outcomes(schema, env) {
        match outcome {
            Ok(resolution) => {
                entries.push(diagnostic_entry(spec, &resolution));
                parsed.insert(spec.name(), resolution.value);
            }
            Err(error) => {
                errors.push(error);
                if options.throw_on_error {
                    break;
                }
            }
        }
    }

    if options.debug_log {
        for entry in entries {
            sink.emit(entry);
        }
    }

    if options.throw_on_error {
        if let Some(first) = errors.into_iter().next() {
            return Err(first);
        }
    } else if !errors.is_empty() {
        return Err(AggregateError::new(errors, parsed).into());
    }

    Ok(parsed)
}

/// Validate a snapshot, logging to the console when `debug_log` is set
pub fn validate(schema: &Schema, env: &RawEnv, options: &ValidateOptions) -> Result<ParsedEnv> {
    validate_with_sink(schema, env, options, &Logger::new(LOGGER_NAME))
}

/// Snapshot the process environment and validate it
pub fn validate_env(schema: &Schema, options: &ValidateOptions) -> Result<ParsedEnv> {
    validate(schema, &RawEnv::from_process(), options)
}

/// Reusable validation entry point bundling schema, options and log sink
pub struct Validator {
    schema: Schema,
    options: ValidateOptions,
    sink: Box<dyn LogSink + Send + Sync>,
}

impl Validator {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            options: ValidateOptions::default(),
            sink: Box::new(Logger::new(LOGGER_NAME)),
        }
    }

    pub fn options(mut self, options: ValidateOptions) -> Self {
        self.options = options;
        self
    }

    pub fn sink<S: LogSink + Send + Sync + 'static>(mut self, sink: S) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn validate(&self, env: &RawEnv) -> Result<ParsedEnv> {
        validate_with_sink(&self.schema, env, &self.options, self.sink.as_ref())
    }

    pub fn validate_process_env(&self) -> Result<ParsedEnv> {
        self.validate(&RawEnv::from_process())
    }
}
