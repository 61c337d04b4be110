// gtk-theme-sync - mirrors the GNOME GTK theme into the editor's color theme
//
// Architecture:
// - Appearance watcher: runs `gsettings get` once and `gsettings monitor` for changes
// - Synchronizer: classifies each signal as light/dark and writes the matching theme
// - Settings store: the editor's settings.json, read fresh on every sync
// - Preference watcher: resyncs when the light/dark theme preferences are edited
// - Daemon: multiplexes the three triggers until Ctrl+C

mod appearance;
mod cli;
mod config;
mod daemon;
mod error;
mod logging;
mod notifier;
mod preferences;
mod prompt;
mod settings;
mod startup;
mod sync;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use sync::{Mode, Synchronizer};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config management runs before anything else and never touches the editor
    let command = match cli.command.unwrap_or(Commands::Watch) {
        Commands::Config(args) => {
            cli::handle_config(args);
            return Ok(());
        }
        command => command,
    };

    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();

    let config = Config::from_env();

    // The guard must be kept alive for the duration of the program to ensure logs flush
    let _file_guard = logging::init(&config.logging);

    let synchronizer = Synchronizer::from_config(&config);

    match command {
        Commands::Watch => {
            startup::print_startup(&config);
            tracing::info!("Watching system theme");
            daemon::run(&synchronizer, &config.editor.settings_path, async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!("Failed to listen for Ctrl+C: {}", e);
                    std::future::pending::<()>().await;
                }
            })
            .await;
            tracing::info!("Shutdown complete");
            Ok(())
        }
        Commands::Sync => cli::handle_sync(&synchronizer).await,
        Commands::ChangeDarkTheme { name } => {
            cli::handle_change_theme(&synchronizer, Mode::Dark, name).await
        }
        Commands::ChangeLightTheme { name } => {
            cli::handle_change_theme(&synchronizer, Mode::Light, name).await
        }
        // Handled before logging was set up
        Commands::Config(_) => Ok(()),
    }
}
