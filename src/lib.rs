//! envguard
//!
//! Declarative validation of environment variables at process startup.
//! A [`Schema`] names the variables a program reads, their kinds
//! (string, number, boolean or a fixed set of literals), optional defaults
//! and validators. Validating an environment snapshot against it produces a
//! typed [`ParsedEnv`] or an error naming every offending variable.
//!
//! ```
//! use envguard::{validate, FieldSpec, RawEnv, Schema, ValidateOptions};
//!
//! let schema = Schema::new()
//!     .field(FieldSpec::number("PORT").default_value(3000))
//!     .field(FieldSpec::enumeration("NODE_ENV", ["development", "production", "test"]))
//!     .field(FieldSpec::boolean("DEBUG").default_value(false));
//!
//! let env = RawEnv::from_pairs([("NODE_ENV", "production"), ("DEBUG", "1")]);
//! let parsed = validate(&schema, &env, &ValidateOptions::default()).unwrap();
//!
//! assert_eq!(parsed.number("PORT"), Some(3000.0));
//! assert_eq!(parsed.string("NODE_ENV"), Some("production"));
//! assert_eq!(parsed.boolean("DEBUG"), Some(true));
//! ```

pub mod app;
pub mod cli;
pub mod env;
pub mod error;
pub mod logging;
pub mod rules;
pub mod schema;
pub mod validator;

// Re-export commonly used types
pub use env::RawEnv;
pub use error::{AggregateError, EnvError, ExpectedType, Result};
pub use logging::{supports_color, LogEntry, LogFormat, LogLevel, LogSink, Logger, MemorySink, NullSink};
pub use schema::{EnvValue, FieldKind, FieldSpec, ParsedEnv, Schema, ValidationOutcome};
pub use validator::{validate, validate_env, validate_with_sink, ValidateOptions, Validator};
