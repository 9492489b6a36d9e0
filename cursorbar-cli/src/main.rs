// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! CursorBar CLI - Cursor plan usage from the command line.
//!
//! # Examples
//!
//! ```bash
//! # Show usage and billing cycle
//! cursorbar
//!
//! # JSON output
//! cursorbar --format json --pretty
//!
//! # Read a specific state database
//! cursorbar --db-path ~/backup/state.vscdb
//!
//! # Diagnose credential discovery without calling the network
//! cursorbar check
//!
//! # Persist a database path override
//! cursorbar config set-db-path /mnt/c/Users/me/AppData/Roaming/Cursor/User/globalStorage/state.vscdb
//! ```

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use cursorbar_providers::{CycleError, CycleStage};
use cursorbar_store::{LogLevel, SettingsStore};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{check, config, usage};

// ============================================================================
// CLI Definition
// ============================================================================

/// CursorBar CLI - Cursor plan usage monitoring.
#[derive(Parser)]
#[command(name = "cursorbar")]
#[command(about = "Cursor plan usage and billing cycle monitor")]
#[command(long_about = r#"
CursorBar reads the Cursor session from the local state database, asks the
Cursor usage endpoint for the current request counts, and shows when the
billing cycle renews.

Examples:
  cursorbar                      # Usage and billing cycle
  cursorbar --format json        # JSON output
  cursorbar check                # Where the database is and whether a token is there
  cursorbar config show          # Saved settings
"#)]
#[command(version)]
#[command(author = "CursorBar Contributors")]
pub struct Cli {
    /// Subcommand to run. If none, runs 'usage' by default.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Path to Cursor's state.vscdb. Overrides the saved setting.
    #[arg(long, global = true)]
    pub db_path: Option<String>,

    /// Application directory name (e.g. "Cursor Nightly"). Overrides the saved setting.
    #[arg(long, global = true)]
    pub app_name: Option<String>,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Fetch current usage (default if no command specified).
    #[command(visible_alias = "u")]
    Usage,

    /// Check database discovery and credentials without calling the network.
    Check,

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// State database or session token unavailable.
    CredentialsMissing = 2,
    /// The usage request failed or returned an unreadable body.
    RequestFailed = 3,
    /// The usage anchor date could not be turned into a billing cycle.
    InvalidData = 4,
}

impl ExitCode {
    /// Picks the exit code for a failed command.
    pub fn for_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<CycleError>().map(|e| e.stage) {
            Some(CycleStage::Credentials) => Self::CredentialsMissing,
            Some(CycleStage::Usage) => Self::RequestFailed,
            Some(CycleStage::BillingCycle) => Self::InvalidData,
            None => Self::Error,
        }
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool, level: LogLevel) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::new("cursorbar=debug,info")
    } else {
        EnvFilter::new(format!("cursorbar={level}"))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let store = SettingsStore::load_default().await;
    let settings = store.get().await;

    setup_logging(cli.verbose, cli.quiet, settings.log_level);

    let result = match &cli.command {
        Some(Commands::Usage) | None => usage::run(&cli, &settings).await,
        Some(Commands::Check) => check::run(&cli, &settings).await,
        Some(Commands::Config(args)) => config::run(args, &cli, &store).await,
    };

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e}");
        }
        std::process::exit(ExitCode::for_error(&e) as i32);
    }

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
