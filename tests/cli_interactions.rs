//! CLI interaction tests for the envguard binary
//!
//! Each test runs the binary against a cleared environment so results do
//! not depend on the variables of the machine running the suite.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

const SCHEMA: &str = r#"{
  "fields": [
    { "name": "DATABASE_URL", "type": "string", "description": "Connection string",
      "rules": { "url": true, "schemes": ["postgres"] } },
    { "name": "PORT", "type": "number", "default": 3000, "description": "HTTP port",
      "rules": { "min": 1, "max": 65535 } },
    { "name": "NODE_ENV", "type": "enum", "values": ["development", "production", "test"],
      "default": "development" },
    { "name": "DEBUG", "type": "boolean", "default": false },
    { "name": "API_KEY", "type": "string", "default": "dev-secret-key", "sensitive": true }
  ]
}"#;

/// Helper function to create a test command with an empty environment
fn create_test_cmd() -> Command {
    let mut cmd = Command::cargo_bin("envguard").unwrap();
    cmd.env_clear().env("NO_COLOR", "1");
    cmd
}

/// Helper function to write a file into a fresh temporary directory
fn create_temp_file(name: &str, content: &str) -> (TempDir, String) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join(name);
    fs::write(&path, content).unwrap();
    let path_str = path.to_str().unwrap().to_string();
    (temp_dir, path_str)
}

#[test]
fn test_check_success_with_defaults() {
    let (_dir, schema) = create_temp_file("schema.json", SCHEMA);

    create_test_cmd()
        .args(["check", "--schema", &schema])
        .env("DATABASE_URL", "postgres://localhost/app")
        .assert()
        .success()
        .stdout(predicate::str::contains("All 5 environment variables are valid"))
        .stdout(predicate::str::contains("PORT=3000"))
        .stdout(predicate::str::contains("NODE_ENV=development"))
        .stdout(predicate::str::contains("API_KEY=****"))
        .stdout(predicate::str::contains("dev-secret-key").not());
}

#[test]
fn test_check_missing_required_fails_fast() {
    let (_dir, schema) = create_temp_file("schema.json", SCHEMA);

    create_test_cmd()
        .args(["check", "--schema", &schema])
        .env("PORT", "not-a-number")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("[MISSING] DATABASE_URL is required but not set"))
        .stderr(predicate::str::contains("not-a-number").not());
}

#[test]
fn test_check_no_throw_reports_every_failure() {
    let (_dir, schema) = create_temp_file("schema.json", SCHEMA);

    create_test_cmd()
        .args(["check", "--schema", &schema, "--no-throw"])
        .env("PORT", "not-a-number")
        .env("NODE_ENV", "staging")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("DATABASE_URL is required but not set"))
        .stderr(predicate::str::contains("Cannot parse \"not-a-number\" as number for PORT"))
        .stderr(predicate::str::contains("NODE_ENV must be one of: development, production, test"))
        .stderr(predicate::str::contains("3 variable(s) need attention"));
}

#[test]
fn test_check_rule_violation() {
    let (_dir, schema) = create_temp_file("schema.json", SCHEMA);

    create_test_cmd()
        .args(["check", "--schema", &schema])
        .env("DATABASE_URL", "postgres://localhost/app")
        .env("PORT", "70000")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("PORT validation error: must be <= 65535"));
}

#[test]
fn test_check_env_file_with_process_override() {
    let (dir, schema) = create_temp_file("schema.json", SCHEMA);
    let env_path = dir.path().join(".env");
    fs::write(&env_path, "DATABASE_URL=postgres://file/app\nPORT=4000\nDEBUG=true\n").unwrap();

    create_test_cmd()
        .args(["check", "--schema", &schema, "--env-file"])
        .arg(&env_path)
        .env("PORT", "5000")
        .assert()
        .success()
        .stdout(predicate::str::contains("DATABASE_URL=postgres://file/app"))
        .stdout(predicate::str::contains("PORT=5000"))
        .stdout(predicate::str::contains("DEBUG=true"));
}

#[test]
fn test_check_schema_and_env_file_from_environment() {
    let (dir, schema) = create_temp_file("schema.json", SCHEMA);
    let env_path = dir.path().join("app.env");
    fs::write(&env_path, "DATABASE_URL=postgres://db/app\n").unwrap();

    create_test_cmd()
        .arg("check")
        .env("ENVGUARD_SCHEMA", &schema)
        .env("ENVGUARD_ENV_FILE", &env_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("DATABASE_URL=postgres://db/app"));
}

#[test]
fn test_check_json_output() {
    let (_dir, schema) = create_temp_file("schema.json", SCHEMA);

    let output = create_test_cmd()
        .args(["check", "--schema", &schema, "--json", "--debug"])
        .env("DATABASE_URL", "postgres://localhost/app")
        .env("DEBUG", "1")
        .output()
        .unwrap();

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["PORT"], serde_json::json!(3000.0));
    assert_eq!(value["DEBUG"], serde_json::json!(true));
    assert_eq!(value["NODE_ENV"], serde_json::json!("development"));
    assert_eq!(value["API_KEY"], serde_json::json!("****"));

    // Debug entries go to stderr so stdout stays parseable
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("PORT=3000 (using default)"));
    assert!(stderr.contains("API_KEY=**** (using default)"));
}

#[test]
fn test_check_debug_log_formats() {
    let (_dir, schema) = create_temp_file("schema.json", SCHEMA);

    create_test_cmd()
        .args(["check", "--schema", &schema, "--debug"])
        .env("DATABASE_URL", "postgres://localhost/app")
        .assert()
        .success()
        .stdout(predicate::str::contains("[envguard] PORT=3000 (using default)"))
        .stdout(predicate::str::contains("DATABASE_URL=postgres://localhost/app"));

    create_test_cmd()
        .args(["check", "--schema", &schema, "--debug", "--log-format", "json"])
        .env("DATABASE_URL", "postgres://localhost/app")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"message\":\"PORT=3000 (using default)\""))
        .stdout(predicate::str::contains("\"session_id\""));

    create_test_cmd()
        .args(["check", "--schema", &schema])
        .env("DATABASE_URL", "postgres://localhost/app")
        .assert()
        .success()
        .stdout(predicate::str::contains("(using default)").not());
}

#[test]
fn test_invalid_log_format_rejected() {
    let (_dir, schema) = create_temp_file("schema.json", SCHEMA);

    create_test_cmd()
        .args(["check", "--schema", &schema, "--log-format", "xml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid log format"));
}

#[test]
fn test_schema_errors() {
    // Enum without allowed values
    let (_dir, schema) = create_temp_file(
        "schema.json",
        r#"{ "fields": [ { "name": "MODE", "type": "enum", "values": [] } ] }"#,
    );
    create_test_cmd()
        .args(["check", "--schema", &schema])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("[SCHEMA]"));

    // Default of the wrong type
    let (_dir, schema) = create_temp_file(
        "schema.json",
        r#"{ "fields": [ { "name": "PORT", "type": "number", "default": "abc" } ] }"#,
    );
    create_test_cmd()
        .args(["check", "--schema", &schema, "--no-throw"])
        .assert()
        .failure()
        .code(2);

    // Malformed JSON
    let (_dir, schema) = create_temp_file("schema.json", "{ not json");
    create_test_cmd()
        .args(["describe", "--schema", &schema])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("[PARSE]"));
}

#[test]
fn test_missing_files() {
    create_test_cmd()
        .args(["check", "--schema", "/nonexistent/schema.json"])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("[CONFIG]"));

    let (_dir, schema) = create_temp_file("schema.json", SCHEMA);
    create_test_cmd()
        .args(["check", "--schema", &schema, "--env-file", "/nonexistent/.env"])
        .assert()
        .failure()
        .code(3);
}

#[test]
fn test_example_to_stdout_and_file() {
    let (dir, schema) = create_temp_file("schema.json", SCHEMA);

    create_test_cmd()
        .args(["example", "--schema", &schema])
        .assert()
        .success()
        .stdout(predicate::str::contains("DATABASE_URL=\n"))
        .stdout(predicate::str::contains("# PORT=3000\n"))
        .stdout(predicate::str::contains("# Type: one of: development, production, test"));

    let output_path = dir.path().join("example.env");
    create_test_cmd()
        .args(["example", "--schema", &schema, "--output"])
        .arg(&output_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote example .env"));

    let content = fs::read_to_string(&output_path).unwrap();
    assert!(content.contains("# HTTP port\n# Type: number\n# PORT=3000\n"));
}

#[test]
fn test_describe() {
    let (_dir, schema) = create_temp_file("schema.json", SCHEMA);

    create_test_cmd()
        .args(["describe", "--schema", &schema])
        .assert()
        .success()
        .stdout(predicate::str::contains("Supported Environment Variables:"))
        .stdout(predicate::str::contains("DATABASE_URL"))
        .stdout(predicate::str::contains("Default: (hidden)"))
        .stdout(predicate::str::contains("dev-secret-key").not());
}

#[test]
fn test_help_and_version() {
    create_test_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("example"))
        .stdout(predicate::str::contains("describe"));

    create_test_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_numeric_enum_literals() {
    let (_dir, schema) = create_temp_file(
        "schema.json",
        r#"{ "fields": [ { "name": "LEVEL", "type": "enum", "values": [1, 2, 3], "default": 1 } ] }"#,
    );

    create_test_cmd()
        .args(["check", "--schema", &schema])
        .env("LEVEL", "2")
        .assert()
        .success()
        .stdout(predicate::str::contains("LEVEL=2"));

    create_test_cmd()
        .args(["check", "--schema", &schema])
        .env("LEVEL", "2.0")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("LEVEL must be one of: 1, 2, 3"));
}
