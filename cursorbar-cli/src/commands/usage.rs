//! Usage command - fetch and display Cursor usage.

use anyhow::Result;
use cursorbar_fetch::FetchContext;
use cursorbar_store::Settings;
use tracing::{info, warn};

use super::build_fetcher;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Runs the usage command.
pub async fn run(cli: &Cli, settings: &Settings) -> Result<()> {
    let fetcher = build_fetcher(cli, settings, FetchContext::new())?;

    info!("Fetching Cursor usage");

    let usage = match fetcher.fetch().await {
        Ok(usage) => usage,
        Err(e) => {
            warn!(stage = %e.stage, error = %e.source_error(), "Usage fetch failed");
            if cli.format == OutputFormat::Json {
                let formatter = JsonFormatter::new(cli.pretty);
                println!("{}", formatter.format_error(&e)?);
            }
            return Err(e.into());
        }
    };

    if !usage.report.usage_info.has_primary_tier() {
        warn!("Usage response has no gpt-4 tier");
    }

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_usage(&usage));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_usage(&usage)?);
        }
    }

    Ok(())
}
