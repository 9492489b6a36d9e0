//! Check command - diagnose database discovery and credentials.
//!
//! Never calls the network.

use anyhow::Result;
use cursorbar_fetch::{FetchContext, PlatformInfo, ProcessRunner};
use cursorbar_providers::{CursorError, CycleError, CycleStage};
use cursorbar_store::Settings;
use serde::Serialize;

use super::build_fetcher;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Result of a credential check.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckReport {
    /// Host platform name.
    pub platform: String,
    /// True when running under WSL.
    pub wsl: bool,
    /// Resolved `state.vscdb` path.
    pub database_path: String,
    /// Whether the database file exists.
    pub database_exists: bool,
    /// User id taken from the session token, if one could be read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Why the token could not be read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckReport {
    /// Returns true if a session token was found.
    pub fn token_found(&self) -> bool {
        self.user_id.is_some()
    }
}

/// Runs the check command.
pub async fn run(cli: &Cli, settings: &Settings) -> Result<()> {
    let platform = PlatformInfo::detect(&ProcessRunner::new()).await;
    let ctx = FetchContext::builder().platform(platform.clone()).build();
    let fetcher = build_fetcher(cli, settings, ctx)?;

    let database_path = fetcher.db_path_for(&platform);
    let outcome = fetcher.read_session_token().await.and_then(|token| {
        token.user_id().map(str::to_string).ok_or_else(|| {
            CycleError::new(CycleStage::Credentials, CursorError::AuthExtraction)
        })
    });

    let (user_id, failure) = match outcome {
        Ok(id) => (Some(id), None),
        Err(e) => (None, Some(e)),
    };

    let report = CheckReport {
        platform: platform.os.display_name().to_string(),
        wsl: platform.is_wsl(),
        database_path: database_path.display().to_string(),
        database_exists: database_path.exists(),
        user_id,
        error: failure.as_ref().map(|e| e.source_error().to_string()),
    };

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_check(&report));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&report)?);
        }
    }

    match failure {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}
