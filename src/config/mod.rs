//! Configuration for the theme synchronizer
//!
//! Configuration is loaded in order of precedence:
//! 1. Environment variables (highest priority)
//! 2. Config file (~/.config/gtk-theme-sync/config.toml)
//! 3. Built-in defaults (lowest priority)

use serde::Deserialize;
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Submodules
// ─────────────────────────────────────────────────────────────────────────────

mod editor;
mod observability;
mod serialization;


// ─────────────────────────────────────────────────────────────────────────────
// Re-exports
// ─────────────────────────────────────────────────────────────────────────────

pub use editor::{EditorConfig, EnvironmentConfig, FileEditor, FileEnvironment};
pub use observability::{
    FileLogging, FileNotifications, LogRotation, LoggingConfig, NotificationsConfig,
};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Overrides `[editor] settings_path`
pub const ENV_SETTINGS_PATH: &str = "GTK_THEME_SYNC_SETTINGS";

/// Overrides `[logging] level`
pub const ENV_LOG_LEVEL: &str = "GTK_THEME_SYNC_LOG";

// ─────────────────────────────────────────────────────────────────────────────
// Application Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Application configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Where the editor keeps its settings and which keys we use
    pub editor: EditorConfig,

    /// Commands that query and monitor the desktop appearance
    pub environment: EnvironmentConfig,

    /// How theme switches and failures are reported
    pub notifications: NotificationsConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

// ─────────────────────────────────────────────────────────────────────────────
// File Configuration (deserialization layer)
// ─────────────────────────────────────────────────────────────────────────────

/// Config file structure
#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileConfig {
    /// Optional [editor] section
    pub editor: Option<FileEditor>,

    /// Optional [environment] section
    pub environment: Option<FileEnvironment>,

    /// Optional [notifications] section
    pub notifications: Option<FileNotifications>,

    /// Optional [logging] section
    pub logging: Option<FileLogging>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration Loading
// ─────────────────────────────────────────────────────────────────────────────

impl Config {
    /// Directory holding our config file: ~/.config/gtk-theme-sync
    /// Uses Unix-style ~/.config on all platforms for consistency
    pub fn config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("gtk-theme-sync"))
    }

    /// Get the config file path: ~/.config/gtk-theme-sync/config.toml
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("config.toml"))
    }

    /// Create config file with defaults if it doesn't exist
    /// Called during startup to help users discover configuration options
    pub fn ensure_config_exists() {
        let Some(path) = Self::config_path() else {
            return;
        };

        // Don't overwrite existing config
        if path.exists() {
            return;
        }

        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return; // Config is optional
            }
        }

        // Config::default().to_toml() is the single source of truth for the template
        let _ = std::fs::write(&path, Self::default().to_toml());
    }

    /// Load file config if it exists
    ///
    /// # Panics
    /// Exits the process if the config file exists but cannot be parsed. A
    /// broken config should fail fast instead of silently syncing with defaults.
    fn load_file_config() -> FileConfig {
        let Some(path) = Self::config_path() else {
            return FileConfig::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("\n╔══════════════════════════════════════════════════════════════╗");
                    eprintln!("║  CONFIG ERROR - Failed to parse configuration file          ║");
                    eprintln!("╚══════════════════════════════════════════════════════════════╝\n");
                    eprintln!("  File: {}\n", path.display());
                    eprintln!("  Error: {}\n", e);
                    eprintln!("  Tip: Check for:\n");
                    eprintln!("    - Missing quotes around string values");
                    eprintln!("    - Commands written as a string instead of an array");
                    eprintln!("    - Typos in section names\n");
                    eprintln!("  To reset, run `gtk-theme-sync config --reset`.\n");
                    std::process::exit(1);
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => FileConfig::default(),
            Err(e) => {
                eprintln!("\n╔══════════════════════════════════════════════════════════════╗");
                eprintln!("║  CONFIG ERROR - Cannot read configuration file              ║");
                eprintln!("╚══════════════════════════════════════════════════════════════╝\n");
                eprintln!("  File: {}\n", path.display());
                eprintln!("  Error: {}\n", e);
                std::process::exit(1);
            }
        }
    }

    /// Load configuration: env vars > file > defaults
    pub fn from_env() -> Self {
        Self::resolve(Self::load_file_config(), |key| std::env::var(key).ok())
    }

    /// Merge a parsed config file with environment overrides
    pub(crate) fn resolve(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Self {
        let mut editor = EditorConfig::from_file(file.editor);
        if let Some(path) = env(ENV_SETTINGS_PATH).filter(|p| !p.is_empty()) {
            editor.settings_path = PathBuf::from(path);
        }

        let mut logging = LoggingConfig::from_file(file.logging);
        if let Some(level) = env(ENV_LOG_LEVEL).filter(|l| !l.is_empty()) {
            logging.level = level;
        }

        Self {
            editor,
            environment: EnvironmentConfig::from_file(file.environment),
            notifications: NotificationsConfig::from_file(file.notifications),
            logging,
        }
    }
}
