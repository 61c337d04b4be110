//! Config serialization to TOML
//!
//! Single source of truth for config file format. The output doubles as the
//! commented template written on first run.

use super::Config;

/// Quote a string as a TOML basic string
fn quoted(s: &str) -> String {
    toml::Value::String(s.to_string()).to_string()
}

/// Render an argv list as a TOML array of strings
fn command(argv: &[String]) -> String {
    let items: Vec<String> = argv.iter().map(|arg| quoted(arg)).collect();
    format!("[{}]", items.join(", "))
}

impl Config {
    /// Serialize the full config to TOML with explanatory comments
    pub fn to_toml(&self) -> String {
        let editor = &self.editor;
        let environment = &self.environment;
        let notifications = &self.notifications;
        let logging = &self.logging;

        format!(
            r#"# gtk-theme-sync configuration
#
# Environment variables override values here:
#   GTK_THEME_SYNC_SETTINGS  editor settings.json path
#   GTK_THEME_SYNC_LOG       log level
#   RUST_LOG                 full tracing filter (overrides everything)

[editor]
# The editor's user settings file (VS Code layout by default)
settings_path = {settings_path}
# Setting that receives the resolved theme name
color_theme_key = {color_theme_key}
# Settings holding your preferred light and dark themes
light_key = {light_key}
dark_key = {dark_key}

[environment]
# Prints the current GTK theme once
query_command = {query_command}
# Prints a line every time the GTK theme changes
monitor_command = {monitor_command}

[notifications]
# Report theme switches and monitor failures (false = log only)
enabled = {notifications_enabled}
# Use desktop notifications via notify-send
desktop = {notifications_desktop}

[logging]
# trace, debug, info, warn, error
level = {level}
# Also write JSON logs to rotating files
file_enabled = {file_enabled}
file_dir = {file_dir}
# hourly, daily, never
file_rotation = {file_rotation}
file_prefix = {file_prefix}
"#,
            settings_path = quoted(&editor.settings_path.display().to_string()),
            color_theme_key = quoted(&editor.color_theme_key),
            light_key = quoted(&editor.light_key),
            dark_key = quoted(&editor.dark_key),
            query_command = command(&environment.query_command),
            monitor_command = command(&environment.monitor_command),
            notifications_enabled = notifications.enabled,
            notifications_desktop = notifications.desktop,
            level = quoted(&logging.level),
            file_enabled = logging.file_enabled,
            file_dir = quoted(&logging.file_dir.display().to_string()),
            file_rotation = quoted(logging.file_rotation.as_str()),
            file_prefix = quoted(&logging.file_prefix),
        )
    }
}
