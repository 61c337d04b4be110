// CLI module - command-line argument parsing and handlers
//
// Subcommands:
// - watch (default): keep the editor theme in sync with the GTK theme
// - sync: apply the theme for the current appearance once
// - change-dark-theme / change-light-theme [NAME]: edit a preference
// - config --show/--reset/--edit/--path: manage our own config file

use crate::config::{Config, VERSION};
use crate::sync::{Mode, Synchronizer};
use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::process::Command;

/// gtk-theme-sync - mirror the GNOME GTK theme into your editor
#[derive(Parser)]
#[command(name = "gtk-theme-sync")]
#[command(version = VERSION)]
#[command(about = "Mirror the GNOME GTK theme into your editor's color theme", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Watch the system theme and keep the editor theme in sync (default)
    Watch,

    /// Apply the theme for the current system appearance once and exit
    Sync,

    /// Set the editor theme used while the system is dark
    ChangeDarkTheme {
        /// Theme name; prompts when omitted
        name: Option<String>,
    },

    /// Set the editor theme used while the system is light
    ChangeLightTheme {
        /// Theme name; prompts when omitted
        name: Option<String>,
    },

    /// Manage configuration
    Config(ConfigArgs),
}

#[derive(Args, Debug, PartialEq, Eq)]
pub struct ConfigArgs {
    /// Show effective configuration
    #[arg(long)]
    pub show: bool,

    /// Reset config file to defaults
    #[arg(long)]
    pub reset: bool,

    /// Open config file in $EDITOR
    #[arg(long)]
    pub edit: bool,

    /// Show config file path
    #[arg(long)]
    pub path: bool,
}

/// One-shot resync, printing the applied theme
pub async fn handle_sync(sync: &Synchronizer) -> anyhow::Result<()> {
    let theme = sync.resync().await?;
    println!("Editor theme set to {}", theme);
    Ok(())
}

/// Edit the preferred theme for `mode`
pub async fn handle_change_theme(
    sync: &Synchronizer,
    mode: Mode,
    name: Option<String>,
) -> anyhow::Result<()> {
    match sync.set_preferred_theme(mode, name).await? {
        Some(theme) => println!("Saved {} theme. Editor theme is now {}", mode, theme),
        None => println!("No theme entered, nothing changed."),
    }
    Ok(())
}

pub fn handle_config(args: ConfigArgs) {
    if args.path {
        handle_config_path();
    } else if args.show {
        handle_config_show();
    } else if args.reset {
        handle_config_reset();
    } else if args.edit {
        handle_config_edit();
    } else {
        // No flag provided, show help
        println!("Usage: gtk-theme-sync config [--show|--reset|--edit|--path]");
        println!();
        println!("Options:");
        println!("  --show    Display effective configuration");
        println!("  --reset   Reset config file to defaults");
        println!("  --edit    Open config file in $EDITOR");
        println!("  --path    Show config file path");
    }
}

fn handle_config_path() {
    match Config::config_path() {
        Some(path) => println!("{}", path.display()),
        None => {
            eprintln!("Error: Could not determine config path");
            std::process::exit(1);
        }
    }
}

fn handle_config_show() {
    let config = Config::from_env();

    println!("# Effective configuration (env > file > defaults)");
    println!();
    print!("{}", config.to_toml());

    println!();
    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("# Source: {}", path.display());
        } else {
            println!("# Source: defaults (no config file)");
        }
    }
}

fn handle_config_reset() {
    let Some(path) = Config::config_path() else {
        eprintln!("Error: Could not determine config path");
        std::process::exit(1);
    };

    if path.exists() {
        eprint!(
            "Config file exists at {}. Overwrite? [y/N] ",
            path.display()
        );
        let _ = std::io::stderr().flush();

        let mut input = String::new();
        if std::io::stdin().read_line(&mut input).is_err()
            || !input.trim().eq_ignore_ascii_case("y")
        {
            println!("Aborted.");
            return;
        }
    }

    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            eprintln!("Error creating directory: {}", e);
            std::process::exit(1);
        }
    }

    if let Err(e) = std::fs::write(&path, Config::default().to_toml()) {
        eprintln!("Error writing config: {}", e);
        std::process::exit(1);
    }

    println!("Config reset to defaults: {}", path.display());
}

fn handle_config_edit() {
    let Some(path) = Config::config_path() else {
        eprintln!("Error: Could not determine config path");
        std::process::exit(1);
    };

    if !path.exists() {
        Config::ensure_config_exists();
        println!("Created new config file: {}", path.display());
    }

    let editor = std::env::var("EDITOR")
        .or_else(|_| std::env::var("VISUAL"))
        .unwrap_or_else(|_| "nano".to_string());

    println!("Opening {} with {}", path.display(), editor);

    match Command::new(&editor).arg(&path).status() {
        Ok(s) if s.success() => {}
        Ok(s) => {
            eprintln!("Editor exited with status: {}", s);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Failed to launch editor '{}': {}", editor, e);
            eprintln!("Set $EDITOR environment variable to your preferred editor");
            std::process::exit(1);
        }
    }
}
