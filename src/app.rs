//! Command dispatch for the envguard binary

use crate::{
    cli::{CheckArgs, Cli, Command, DescribeArgs, ExampleArgs},
    env::{display_env_help, example_env_content, save_example_env_file, RawEnv},
    error::{EnvError, Result},
    logging::{LogEntry, LogSink, Logger},
    schema::{load_schema, ParsedEnv, Schema},
    validator::{validate_with_sink, ValidateOptions, LOGGER_NAME},
};
use colored::Colorize;
use std::path::Path;

const MASK: &str = "****";

/// Runs one CLI invocation
pub struct App {
    cli: Cli,
    use_color: bool,
}

impl App {
    pub fn new(cli: Cli) -> Self {
        let use_color = cli.use_colors();
        Self { cli, use_color }
    }

    pub fn use_color(&self) -> bool {
        self.use_color
    }

    pub fn run(&self) -> Result<()> {
        match &self.cli.command {
            Command::Check(args) => self.check(args),
            Command::Example(args) => self.example(args),
            Command::Describe(args) => self.describe(args),
        }
    }

    fn check(&self, args: &CheckArgs) -> Result<()> {
        let schema = load_schema(&args.schema)?;
        let env = load_env(args.env_file.as_deref())?;

        let options = ValidateOptions::new()
            .with_throw_on_error(!args.no_throw)
            .with_debug_log(args.debug);

        let mut logger = Logger::with_session(LOGGER_NAME);
        logger.set_format(args.log_format);
        logger.set_color(self.use_color);

        // Keep stdout clean for the JSON document
        let result = if args.json {
            validate_with_sink(&schema, &env, &options, &StderrSink(logger.clone()))
        } else {
            validate_with_sink(&schema, &env, &options, &logger)
        };

        let parsed = match result {
            Ok(parsed) => parsed,
            Err(error) => {
                if args.debug {
                    logger
                        .error("Validation failed")
                        .field("failures", error.messages().len())
                        .error_info(&error)
                        .log();
                }
                return Err(error);
            }
        };

        if args.json {
            println!("{}", render_json(&schema, &parsed)?);
        } else {
            print!("{}", render_summary(&schema, &parsed, self.use_color));
        }
        Ok(())
    }

    fn example(&self, args: &ExampleArgs) -> Result<()> {
        let schema = load_schema(&args.schema)?;
        match &args.output {
            Some(path) => {
                save_example_env_file(&schema, path)?;
                println!("Wrote example .env to {}", path.display());
            }
            None => {
                let title = format!("Environment for {}", args.schema.display());
                print!("{}", example_env_content(&schema, &title));
            }
        }
        Ok(())
    }

    fn describe(&self, args: &DescribeArgs) -> Result<()> {
        let schema = load_schema(&args.schema)?;
        print!("{}", display_env_help(&schema));
        Ok(())
    }
}

/// Process environment overlaid on the optional .env file
pub fn load_env(env_file: Option<&Path>) -> Result<RawEnv> {
    let process = RawEnv::from_process();
    match env_file {
        Some(path) => Ok(RawEnv::from_env_file(path)?.overlay(process)),
        None => Ok(process),
    }
}

/// Renders log entries on stderr regardless of level
struct StderrSink(Logger);

impl LogSink for StderrSink {
    fn emit(&self, entry: LogEntry) {
        if let Some(output) = self.0.render(&entry) {
            eprintln!("{}", output);
        }
    }
}

fn display_value(schema: &Schema, name: &str, value: &crate::schema::EnvValue) -> String {
    match schema.get(name) {
        Some(spec) if spec.is_sensitive() => MASK.to_string(),
        _ => value.to_string(),
    }
}

/// Human-readable listing of a successful check
pub fn render_summary(schema: &Schema, parsed: &ParsedEnv, use_color: bool) -> String {
    let headline = format!("All {} environment variables are valid", parsed.len());
    let mut output = if use_color {
        format!("{}\n", headline.green().bold())
    } else {
        format!("{}\n", headline)
    };

    for (name, value) in parsed.iter() {
        let shown = display_value(schema, name, value);
        if use_color {
            output.push_str(&format!("  {}={}\n", name.cyan(), shown));
        } else {
            output.push_str(&format!("  {}={}\n", name, shown));
        }
    }
    output
}

/// JSON object of the parsed environment with sensitive values masked
pub fn render_json(schema: &Schema, parsed: &ParsedEnv) -> Result<String> {
    let mut object = serde_json::Map::new();
    for (name, value) in parsed.iter() {
        let json = match schema.get(name) {
            Some(spec) if spec.is_sensitive() => serde_json::Value::String(MASK.to_string()),
            _ => serde_json::to_value(value)?,
        };
        object.insert(name.to_string(), json);
    }
    serde_json::to_string_pretty(&object).map_err(EnvError::from)
}
