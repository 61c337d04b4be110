// Startup module - banner shown when the daemon starts
//
// Shows the version, where the config came from, the settings file being
// written, and which parts of the sync loop are active.

use crate::config::{Config, VERSION};
use crate::settings::SettingsKeys;

/// ANSI color codes for terminal output
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GREEN: &str = "\x1b[32m";
    pub const MAGENTA: &str = "\x1b[35m";
}

/// One line of the module list
pub struct ModuleStatus {
    pub name: &'static str,
    pub enabled: bool,
    pub description: String,
}

/// Print the startup banner and module status
pub fn print_startup(config: &Config) {
    use colors::*;

    println!();
    println!("  {BOLD}{CYAN}gtk-theme-sync{RESET} {DIM}v{VERSION}{RESET}");
    println!("  {DIM}Mirrors the GTK theme into your editor{RESET}");
    println!();

    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("  {DIM}Config:{RESET} {GREEN}✓{RESET} {}", path.display());
        } else {
            println!("  {DIM}Config:{RESET} {DIM}(using defaults){RESET}");
        }
    }
    println!(
        "  {DIM}Settings:{RESET} {}",
        config.editor.settings_path.display()
    );
    println!();

    for module in &get_module_status(config) {
        print_module_status(module);
    }

    println!();
    println!(
        "  {MAGENTA}▸{RESET} Writing {BOLD}{}{RESET} {DIM}(light: {}, dark: {}){RESET}",
        config.editor.color_theme_key, config.editor.light_key, config.editor.dark_key
    );
    println!();
}

/// Status of each trigger source and output channel
fn get_module_status(config: &Config) -> Vec<ModuleStatus> {
    let keys: SettingsKeys = config.editor.keys();
    vec![
        ModuleStatus {
            name: "probe",
            enabled: true, // Core, always on
            description: config.environment.query_command.join(" "),
        },
        ModuleStatus {
            name: "monitor",
            enabled: true, // Core, always on
            description: config.environment.monitor_command.join(" "),
        },
        ModuleStatus {
            name: "prefs",
            enabled: true,
            description: format!("watching {} and {}", keys.light, keys.dark),
        },
        ModuleStatus {
            name: "notify",
            enabled: config.notifications.enabled,
            description: if config.notifications.desktop {
                "Desktop notifications".to_string()
            } else {
                "Terminal messages".to_string()
            },
        },
        ModuleStatus {
            name: "file-log",
            enabled: config.logging.file_enabled,
            description: config.logging.file_dir.display().to_string(),
        },
    ]
}

/// Print a single module's status
fn print_module_status(module: &ModuleStatus) {
    use colors::*;

    let (icon, style) = if module.enabled {
        (format!("{GREEN}✓{RESET}"), "")
    } else {
        (format!("{DIM}○{RESET}"), DIM)
    };

    println!(
        "    {icon} {style}{:<10}{RESET} {DIM}{}{RESET}",
        module.name, module.description
    );
}
