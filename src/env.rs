//! Environment snapshots and .env file handling
//!
//! [`RawEnv`] is the read-only input of a validation run. Snapshots can come
//! from the process, from explicit pairs, or from a `.env` file; reading a
//! file never touches the process environment.

use crate::error::{EnvError, Result};
use crate::schema::{FieldKind, FieldSpec, Schema};
use std::collections::BTreeMap;
use std::path::Path;

/// Flat snapshot of environment variables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEnv {
    vars: BTreeMap<String, String>,
}

impl RawEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the current process environment
    ///
    /// Variables whose name or value is not valid UTF-8 are skipped.
    pub fn from_process() -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
            .collect();
        Self { vars }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    /// Parse a .env file into a snapshot
    pub fn from_env_file(path: &Path) -> Result<Self> {
        // Only the iterator form leaves the process environment alone
        #[allow(deprecated)]
        let iter = dotenv::from_path_iter(path)
            .map_err(|e| EnvError::config(format!("Failed to load {}: {}", path.display(), e)))?;

        let mut vars = BTreeMap::new();
        for item in iter {
            let (key, value) = item?;
            vars.insert(key, value);
        }
        Ok(Self { vars })
    }

    /// Combine two snapshots; keys in `overlay` win
    pub fn overlay(mut self, overlay: RawEnv) -> Self {
        self.vars.extend(overlay.vars);
        self
    }

    pub fn set<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Value of a key, treating the empty string as unset
    pub fn get_set(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|value| !value.is_empty())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

fn kind_summary(spec: &FieldSpec) -> String {
    match spec.kind() {
        FieldKind::Enum(allowed) => format!("one of: {}", allowed.join(", ")),
        FieldKind::Boolean => "boolean (true, false, 1, 0)".to_string(),
        kind => kind.name().to_string(),
    }
}

/// Commented example .env content for a schema
pub fn example_env_content(schema: &Schema, title: &str) -> String {
    let mut content = String::new();
    content.push_str(&format!("# {}\n", title));
    content.push_str("#\n");
    content.push_str("# Required variables are left empty; optional ones are commented out\n");
    content.push_str("# and show their default.\n");

    for spec in schema.fields() {
        content.push('\n');
        if let Some(description) = spec.get_description() {
            content.push_str(&format!("# {}\n", description));
        }
        content.push_str(&format!("# Type: {}\n", kind_summary(spec)));
        match spec.default() {
            Some(default) => content.push_str(&format!("# {}={}\n", spec.name(), default)),
            None => content.push_str(&format!("{}=\n", spec.name())),
        }
    }

    content
}

/// Write example .env content to disk
pub fn save_example_env_file(schema: &Schema, path: &Path) -> Result<()> {
    let content = example_env_content(schema, "Environment configuration");
    std::fs::write(path, content)
        .map_err(|e| EnvError::config(format!("Failed to write example .env file: {}", e)))
}

/// Human-readable list of the variables a schema reads
pub fn display_env_help(schema: &Schema) -> String {
    let mut help = String::new();
    help.push_str("Supported Environment Variables:\n\n");

    for spec in schema.fields() {
        let description = spec.get_description().unwrap_or("");
        help.push_str(&format!("  {:<18} {}\n", spec.name(), description));
        help.push_str(&format!("  {:<18} Type: {}\n", "", kind_summary(spec)));
        match spec.default() {
            Some(_) if spec.is_sensitive() => help.push_str(&format!("  {:<18} Default: (hidden)\n\n", "")),
            Some(default) => help.push_str(&format!("  {:<18} Default: {}\n\n", "", default)),
            None => help.push_str(&format!("  {:<18} Required\n\n", "")),
        }
    }

    help.push_str("Resolution order (highest to lowest):\n");
    help.push_str("  1. Process environment\n");
    help.push_str("  2. .env file values\n");
    help.push_str("  3. Schema defaults\n");

    help
}
