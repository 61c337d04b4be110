// Settings module - the editor's persisted global configuration
//
// The synchronizer never touches the settings file directly. It goes through
// the SettingsStore trait so the store can be swapped for an in-memory fake
// in tests. Values are read fresh on every call; nothing here caches.

mod json;
#[cfg(test)]
pub mod memory;

pub use json::JsonSettingsStore;

use crate::sync::Mode;
use anyhow::Result;

/// Key-value access to the editor's global settings
pub trait SettingsStore: Send + Sync {
    /// Read a string setting. `Ok(None)` when the key is unset.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a string setting, creating the key if needed
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Names of the settings keys the synchronizer reads and writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsKeys {
    /// Write target: the editor's active color theme
    pub color_theme: String,
    /// Theme name to use while the system is light
    pub light: String,
    /// Theme name to use while the system is dark
    pub dark: String,
}

impl Default for SettingsKeys {
    fn default() -> Self {
        Self {
            color_theme: "editor.colorTheme".to_string(),
            light: "theme.light".to_string(),
            dark: "theme.dark".to_string(),
        }
    }
}

impl SettingsKeys {
    /// Key holding the preferred theme name for `mode`
    pub fn preference(&self, mode: Mode) -> &str {
        match mode {
            Mode::Light => &self.light,
            Mode::Dark => &self.dark,
        }
    }
}
