//! Config command - manage configuration.

use anyhow::Result;
use clap::{Args, Subcommand};
use cursorbar_store::{Settings, SettingsStore, default_config_dir};
use tracing::info;

use crate::output::JsonFormatter;
use crate::{Cli, OutputFormat};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration.
    Show,

    /// Show configuration paths.
    Path,

    /// Use a specific state.vscdb instead of the platform default.
    SetDbPath {
        /// Path to state.vscdb.
        path: String,
    },

    /// Go back to the platform default database location.
    ClearDbPath,

    /// Set the application directory name (for forks and nightly builds).
    SetAppName {
        /// Directory name, e.g. "Cursor Nightly".
        name: String,
    },

    /// Reset to defaults.
    Reset,
}

/// Runs the config command.
pub async fn run(args: &ConfigArgs, cli: &Cli, store: &SettingsStore) -> Result<()> {
    match &args.action {
        ConfigAction::Show => show_config(cli, store).await,
        ConfigAction::Path => show_paths(cli, store),
        ConfigAction::SetDbPath { path } => set_db_path(path, store).await,
        ConfigAction::ClearDbPath => clear_db_path(store).await,
        ConfigAction::SetAppName { name } => set_app_name(name, store).await,
        ConfigAction::Reset => reset_config(store).await,
    }
}

async fn show_config(cli: &Cli, store: &SettingsStore) -> Result<()> {
    let settings = store.get().await;

    match cli.format {
        OutputFormat::Text => {
            println!("CursorBar Configuration");
            println!("{}", "─".repeat(40));
            println!();
            println!(
                "Database path: {}",
                settings.database_path().unwrap_or("(platform default)")
            );
            println!("App name:      {}", settings.app_name());
            println!(
                "API base URL:  {}",
                settings.api_base_url().unwrap_or("(default)")
            );
            println!("Log level:     {}", settings.log_level);
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&settings)?);
        }
    }

    Ok(())
}

fn show_paths(cli: &Cli, store: &SettingsStore) -> Result<()> {
    let config_dir = default_config_dir();
    let settings_path = store.path();

    match cli.format {
        OutputFormat::Text => {
            println!("Configuration Paths");
            println!("{}", "─".repeat(40));
            println!();
            println!("Config dir:    {}", config_dir.display());
            println!("Settings file: {}", settings_path.display());
        }
        OutputFormat::Json => {
            let paths = serde_json::json!({
                "config_dir": config_dir.display().to_string(),
                "settings_file": settings_path.display().to_string(),
            });
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&paths)?);
        }
    }

    Ok(())
}

async fn set_db_path(path: &str, store: &SettingsStore) -> Result<()> {
    store.try_update(|s| s.set_database_path(path)).await?;
    store.save().await?;

    info!(path, "Database path updated");
    println!("Database path set to: {path}");

    Ok(())
}

async fn clear_db_path(store: &SettingsStore) -> Result<()> {
    store.update(Settings::clear_database_path).await;
    store.save().await?;

    info!("Database path cleared");
    println!("Database path reset to the platform default");

    Ok(())
}

async fn set_app_name(name: &str, store: &SettingsStore) -> Result<()> {
    store.try_update(|s| s.set_app_name(name)).await?;
    store.save().await?;

    let settings = store.get().await;
    info!(app_name = settings.app_name(), "App name updated");
    println!("App name set to: {}", settings.app_name());

    Ok(())
}

async fn reset_config(store: &SettingsStore) -> Result<()> {
    let path = store.path();

    if path.exists() {
        tokio::fs::remove_file(path).await?;
        store.reset().await;
        info!(path = %path.display(), "Settings reset");
        println!("Configuration reset to defaults");
    } else {
        println!("No configuration file to reset");
    }

    Ok(())
}
