//! Main Cursor usage fetcher.
//!
//! One fetch cycle runs three steps in order and stops at the first
//! failure:
//!
//! 1. **Credentials**: locate `state.vscdb` and compose the session token
//! 2. **Usage**: one request to the usage endpoint
//! 3. **Billing cycle**: project the renewal date from the usage anchor
//!
//! Every failure is reported as a [`CycleError`] naming the step.
//!
//! # Example
//!
//! ```ignore
//! let fetcher = CursorUsageFetcher::new();
//! let usage = fetcher.fetch().await?;
//! println!("{} days left", usage.billing_cycle.days_remaining);
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use cursorbar_core::{BillingCycleInfo, UsageReport};
use cursorbar_fetch::{FetchContext, PlatformInfo};
use serde::Serialize;
use tracing::{debug, info, instrument};

use super::api::CursorApiClient;
use super::auth::{CursorAuthReader, SessionToken, StateDbDiagnostics, TracingDiagnostics};
use super::error::{CursorError, CycleError, CycleStage};
use super::locator::{DEFAULT_APP_NAME, resolve_state_db_path_for};

// ============================================================================
// Fetch Result
// ============================================================================

/// Both data products of a completed cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorUsage {
    /// The usage snapshot and when it was fetched.
    pub report: UsageReport,
    /// The billing cycle projected from the snapshot.
    pub billing_cycle: BillingCycleInfo,
}

// ============================================================================
// Fetcher
// ============================================================================

/// Main Cursor usage fetcher.
///
/// Holds no mutable state; concurrent calls are independent.
#[derive(Clone)]
pub struct CursorUsageFetcher {
    ctx: FetchContext,
    api: CursorApiClient,
    custom_db_path: Option<String>,
    app_name: String,
    diagnostics: Arc<dyn StateDbDiagnostics>,
}

impl CursorUsageFetcher {
    /// Creates a fetcher for the production API and default locations.
    pub fn new() -> Self {
        Self::with_context(FetchContext::new())
    }

    /// Creates a fetcher using the given host context.
    ///
    /// Usage requests go through the context's HTTP client.
    pub fn with_context(ctx: FetchContext) -> Self {
        Self {
            api: CursorApiClient::from_http(&ctx.http),
            ctx,
            custom_db_path: None,
            app_name: DEFAULT_APP_NAME.to_string(),
            diagnostics: Arc::new(TracingDiagnostics),
        }
    }

    /// Uses `path` instead of the platform default. Blank paths are ignored.
    #[must_use]
    pub fn with_db_path(mut self, path: Option<String>) -> Self {
        self.custom_db_path = path;
        self
    }

    /// Sets the application directory name (default `Cursor`).
    #[must_use]
    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }

    /// Points usage requests at another deployment of the API, still
    /// through the context's HTTP client.
    ///
    /// # Errors
    ///
    /// Returns `CursorError::Transport` if `base_url` is not an absolute
    /// URL with a host.
    pub fn with_api_base_url(mut self, base_url: &str) -> Result<Self, CursorError> {
        self.api = CursorApiClient::with_http(&self.ctx.http, base_url)?;
        Ok(self)
    }

    /// Replaces the missing-token diagnostics hook.
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn StateDbDiagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Returns the API client.
    pub fn api_client(&self) -> &CursorApiClient {
        &self.api
    }

    /// Returns the custom database path, if one is set and non-blank.
    fn custom_path(&self) -> Option<&str> {
        self.custom_db_path
            .as_deref()
            .filter(|p| !p.trim().is_empty())
    }

    /// Resolves the state database path for `platform`.
    pub fn db_path_for(&self, platform: &PlatformInfo) -> PathBuf {
        resolve_state_db_path_for(self.custom_path(), &self.app_name, platform)
    }

    /// Resolves the state database path.
    ///
    /// The host is only inspected when no custom path is set.
    pub async fn resolve_db_path(&self) -> PathBuf {
        if let Some(custom) = self.custom_path() {
            return PathBuf::from(custom);
        }
        let platform = self.ctx.platform().await;
        self.db_path_for(&platform)
    }

    /// Returns an auth reader for the resolved database.
    pub async fn auth_reader(&self) -> CursorAuthReader {
        CursorAuthReader::new(self.resolve_db_path().await)
            .with_diagnostics(Arc::clone(&self.diagnostics))
    }

    /// Reads the session token without touching the network.
    ///
    /// # Errors
    ///
    /// Returns a `CycleError` at the `Credentials` stage.
    #[instrument(skip(self))]
    pub async fn read_session_token(&self) -> Result<SessionToken, CycleError> {
        let reader = self.auth_reader().await;
        debug!(path = %reader.db_path().display(), "Reading Cursor session token");

        reader
            .read_session_token()
            .map_err(|e| CycleError::new(CycleStage::Credentials, e))
    }

    /// Runs the credential and usage steps.
    ///
    /// # Errors
    ///
    /// Returns a `CycleError` at the `Credentials` or `Usage` stage.
    #[instrument(skip(self))]
    pub async fn fetch_usage(&self) -> Result<UsageReport, CycleError> {
        let token = self.read_session_token().await?;

        let usage_info = self
            .api
            .fetch_usage(&token)
            .await
            .map_err(|e| CycleError::new(CycleStage::Usage, e))?;

        if !usage_info.has_primary_tier() {
            debug!("Usage response has no gpt-4 tier");
        }

        Ok(UsageReport::new(usage_info))
    }

    /// Projects the billing cycle of a report.
    ///
    /// # Errors
    ///
    /// Returns a `CycleError` at the `BillingCycle` stage if the anchor
    /// date cannot be parsed.
    pub fn billing_cycle(report: &UsageReport) -> Result<BillingCycleInfo, CycleError> {
        report
            .billing_cycle()
            .map_err(|e| CycleError::new(CycleStage::BillingCycle, CursorError::InvalidDate(e)))
    }

    /// Runs a full cycle.
    ///
    /// # Errors
    ///
    /// Returns a `CycleError` naming the step that failed.
    #[instrument(skip(self))]
    pub async fn fetch(&self) -> Result<CursorUsage, CycleError> {
        let report = self.fetch_usage().await?;
        let billing_cycle = Self::billing_cycle(&report)?;

        info!(
            summary = ?report.usage_info.primary_summary(),
            days_remaining = billing_cycle.days_remaining,
            "Fetched Cursor usage"
        );

        Ok(CursorUsage {
            report,
            billing_cycle,
        })
    }
}

impl Default for CursorUsageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CursorUsageFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CursorUsageFetcher")
            .field("api", &self.api)
            .field("custom_db_path", &self.custom_db_path)
            .field("app_name", &self.app_name)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
