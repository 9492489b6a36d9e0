//! CLI command implementations.

pub mod check;
pub mod config;
pub mod usage;

use anyhow::{Context, Result};
use cursorbar_fetch::FetchContext;
use cursorbar_providers::CursorUsageFetcher;
use cursorbar_store::Settings;
use tracing::debug;

use crate::Cli;

/// Builds a fetcher from saved settings with per-invocation overrides applied.
pub fn build_fetcher(
    cli: &Cli,
    settings: &Settings,
    ctx: FetchContext,
) -> Result<CursorUsageFetcher> {
    let db_path = cli
        .db_path
        .clone()
        .or_else(|| settings.database_path().map(str::to_string));
    let app_name = cli
        .app_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| settings.app_name());

    debug!(db_path = ?db_path, app_name, "Building usage fetcher");

    let mut fetcher = CursorUsageFetcher::with_context(ctx)
        .with_db_path(db_path)
        .with_app_name(app_name);

    if let Some(base_url) = settings.api_base_url() {
        fetcher = fetcher
            .with_api_base_url(base_url)
            .with_context(|| format!("Invalid api_base_url in settings: {base_url}"))?;
    }

    Ok(fetcher)
}
