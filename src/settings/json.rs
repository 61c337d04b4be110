//! Editor settings backed by a JSON file (VS Code style `settings.json`)
//!
//! Reads parse the file on every call. Writes load the current document,
//! replace a single key, and write the result back atomically so that other
//! settings survive untouched.

use super::SettingsStore;
use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// SettingsStore over a JSON object stored on disk
#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the settings object. A missing or blank file is an empty object.
    fn load(&self) -> Result<Map<String, Value>> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read {}", self.path.display()));
            }
        };

        if contents.trim().is_empty() {
            return Ok(Map::new());
        }

        let value: Value = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", self.path.display()))?;

        match value {
            Value::Object(map) => Ok(map),
            _ => bail!("{} does not contain a JSON object", self.path.display()),
        }
    }

    /// Write the settings object: temp file in the same directory, then rename
    fn save(&self, settings: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
        }

        let mut json =
            serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;
        json.push('\n');

        let temp_path = self.path.with_extension("json.tmp");
        std::fs::write(&temp_path, &json)
            .with_context(|| format!("Failed to write temp file: {}", temp_path.display()))?;
        std::fs::rename(&temp_path, &self.path).with_context(|| {
            format!("Failed to rename temp file to {}", self.path.display())
        })?;

        Ok(())
    }
}

impl SettingsStore for JsonSettingsStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let settings = self.load()?;
        match settings.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => {
                tracing::warn!(
                    key,
                    value = %other,
                    path = %self.path.display(),
                    "Ignoring non-string setting"
                );
                Ok(None)
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        // Never clobber a file we could not parse
        let mut settings = self.load()?;
        settings.insert(key.to_string(), Value::String(value.to_string()));
        self.save(&settings)?;

        tracing::debug!(key, value, path = %self.path.display(), "Wrote editor setting");
        Ok(())
    }
}
