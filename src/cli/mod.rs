//! Command-line interface definitions

use crate::logging::{supports_color, LogFormat};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// envguard - validate environment variables against a declarative schema
#[derive(Parser, Debug, Clone)]
#[command(name = "envguard")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Validate the current environment against a schema
    Check(CheckArgs),
    /// Write a commented example .env file for a schema
    Example(ExampleArgs),
    /// List the variables a schema reads
    Describe(DescribeArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Schema document (JSON)
    #[arg(short, long, env = "ENVGUARD_SCHEMA", value_name = "FILE")]
    pub schema: PathBuf,

    /// .env file to read; process variables take precedence over it
    #[arg(short, long, env = "ENVGUARD_ENV_FILE", value_name = "FILE")]
    pub env_file: Option<PathBuf>,

    /// Report every invalid variable instead of stopping at the first
    #[arg(long)]
    pub no_throw: bool,

    /// Log each resolved variable
    #[arg(long)]
    pub debug: bool,

    /// Format of debug log lines (console, json, compact)
    #[arg(long, value_name = "FORMAT", value_parser = parse_log_format, default_value = "console")]
    pub log_format: LogFormat,

    /// Print the parsed environment as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ExampleArgs {
    /// Schema document (JSON)
    #[arg(short, long, env = "ENVGUARD_SCHEMA", value_name = "FILE")]
    pub schema: PathBuf,

    /// Write to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct DescribeArgs {
    /// Schema document (JSON)
    #[arg(short, long, env = "ENVGUARD_SCHEMA", value_name = "FILE")]
    pub schema: PathBuf,
}

impl Cli {
    /// Whether output should be colored, honoring --no-color and the terminal
    pub fn use_colors(&self) -> bool {
        !self.no_color && supports_color()
    }
}

fn parse_log_format(s: &str) -> Result<LogFormat, String> {
    s.parse::<LogFormat>().map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_arguments() {
        let cli = Cli::try_parse_from([
            "envguard",
            "check",
            "--schema",
            "schema.json",
            "--env-file",
            ".env",
            "--no-throw",
            "--debug",
            "--log-format",
            "json",
        ])
        .unwrap();

        match cli.command {
            Command::Check(args) => {
                assert_eq!(args.schema, PathBuf::from("schema.json"));
                assert_eq!(args.env_file, Some(PathBuf::from(".env")));
                assert!(args.no_throw);
                assert!(args.debug);
                assert_eq!(args.log_format, LogFormat::Json);
                assert!(!args.json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_log_format_default_and_rejection() {
        let cli = Cli::try_parse_from(["envguard", "check", "-s", "schema.json"]).unwrap();
        match cli.command {
            Command::Check(args) => assert_eq!(args.log_format, LogFormat::Console),
            other => panic!("unexpected command: {:?}", other),
        }

        let result = Cli::try_parse_from(["envguard", "check", "-s", "s.json", "--log-format", "xml"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_no_color() {
        let cli = Cli::try_parse_from(["envguard", "describe", "--schema", "s.json", "--no-color"]).unwrap();
        assert!(cli.no_color);
        assert!(!cli.use_colors());
    }

    #[test]
    fn test_example_output() {
        let cli = Cli::try_parse_from(["envguard", "example", "-s", "s.json", "-o", "out.env"]).unwrap();
        match cli.command {
            Command::Example(args) => assert_eq!(args.output, Some(PathBuf::from("out.env"))),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["envguard"]).is_err());
    }
}
