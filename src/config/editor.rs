//! Editor and environment configuration
//!
//! [editor] says where the settings file lives and which keys hold the theme
//! preferences. [environment] holds the argv of the gsettings query and
//! monitor commands.

use crate::settings::SettingsKeys;
use serde::Deserialize;
use std::path::PathBuf;

/// GSettings schema holding the GTK theme
const GTK_SCHEMA: &str = "org.gnome.desktop.interface";
/// Key within the schema
const GTK_THEME_KEY: &str = "gtk-theme";

// ─────────────────────────────────────────────────────────────────────────────
// Editor Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Editor settings location and key names
#[derive(Debug, Clone)]
pub struct EditorConfig {
    /// The editor's user settings.json
    pub settings_path: PathBuf,
    /// Key the resolved theme name is written to
    pub color_theme_key: String,
    /// Key holding the light-mode theme name
    pub light_key: String,
    /// Key holding the dark-mode theme name
    pub dark_key: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        let keys = SettingsKeys::default();
        Self {
            settings_path: default_settings_path(),
            color_theme_key: keys.color_theme,
            light_key: keys.light,
            dark_key: keys.dark,
        }
    }
}

/// VS Code's user settings: ~/.config/Code/User/settings.json
fn default_settings_path() -> PathBuf {
    dirs::home_dir()
        .map(|p| p.join(".config"))
        .unwrap_or_default()
        .join("Code")
        .join("User")
        .join("settings.json")
}

/// Editor settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileEditor {
    pub settings_path: Option<String>,
    pub color_theme_key: Option<String>,
    pub light_key: Option<String>,
    pub dark_key: Option<String>,
}

impl EditorConfig {
    /// Create from file config with defaults
    pub fn from_file(file: Option<FileEditor>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            settings_path: file
                .settings_path
                .map(|p| expand_home(&p))
                .unwrap_or(defaults.settings_path),
            color_theme_key: file.color_theme_key.unwrap_or(defaults.color_theme_key),
            light_key: file.light_key.unwrap_or(defaults.light_key),
            dark_key: file.dark_key.unwrap_or(defaults.dark_key),
        }
    }

    /// Key names for the settings store
    pub fn keys(&self) -> SettingsKeys {
        SettingsKeys {
            color_theme: self.color_theme_key.clone(),
            light: self.light_key.clone(),
            dark: self.dark_key.clone(),
        }
    }
}

/// Expand a leading `~/` to the home directory
fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Environment Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Commands used to observe the desktop appearance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentConfig {
    /// One-shot query, prints the current value
    pub query_command: Vec<String>,
    /// Long-running monitor, prints one line per change
    pub monitor_command: Vec<String>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            query_command: gsettings("get"),
            monitor_command: gsettings("monitor"),
        }
    }
}

fn gsettings(verb: &str) -> Vec<String> {
    ["gsettings", verb, GTK_SCHEMA, GTK_THEME_KEY]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Environment commands as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileEnvironment {
    pub query_command: Option<Vec<String>>,
    pub monitor_command: Option<Vec<String>>,
}

impl EnvironmentConfig {
    /// Create from file config with defaults. Empty commands fall back too.
    pub fn from_file(file: Option<FileEnvironment>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            query_command: file
                .query_command
                .filter(|c| !c.is_empty())
                .unwrap_or(defaults.query_command),
            monitor_command: file
                .monitor_command
                .filter(|c| !c.is_empty())
                .unwrap_or(defaults.monitor_command),
        }
    }
}
