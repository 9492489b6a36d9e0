//! Fetch context providing access to host APIs.
//!
//! The fetch context is handed to fetchers and provides unified access to
//! system resources: the HTTP client, the process runner, and the host
//! platform description.

use std::sync::Arc;
use std::time::Duration;

use crate::host::{http::HttpClient, platform::PlatformInfo, process::ProcessRunner};

// ============================================================================
// Fetch Context
// ============================================================================

/// Context provided to fetchers, giving access to host APIs.
#[derive(Clone)]
pub struct FetchContext {
    /// HTTP client shared by every request made through this context.
    pub http: Arc<HttpClient>,
    /// Process runner for host lookups.
    pub process: Arc<ProcessRunner>,
    /// Fixed platform description. Detected on demand when unset.
    pub platform: Option<PlatformInfo>,
    /// Request timeout the HTTP client was built with. `None` leaves the
    /// transport's own behavior in place.
    pub timeout: Option<Duration>,
}

impl FetchContext {
    /// Creates a new fetch context with default host API implementations.
    pub fn new() -> Self {
        FetchContextBuilder::new().build()
    }

    /// Creates a builder for customizing the context.
    pub fn builder() -> FetchContextBuilder {
        FetchContextBuilder::new()
    }

    /// Returns the platform description, probing the host if none was set.
    pub async fn platform(&self) -> PlatformInfo {
        match &self.platform {
            Some(platform) => platform.clone(),
            None => PlatformInfo::detect(&self.process).await,
        }
    }
}

impl Default for FetchContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FetchContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchContext")
            .field("platform", &self.platform)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Fetch Context Builder
// ============================================================================

/// Builder for constructing a `FetchContext`.
#[derive(Debug, Default)]
pub struct FetchContextBuilder {
    http: Option<Arc<HttpClient>>,
    process: Option<Arc<ProcessRunner>>,
    platform: Option<PlatformInfo>,
    timeout: Option<Duration>,
}

impl FetchContextBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the HTTP client.
    #[must_use]
    pub fn http(mut self, http: Arc<HttpClient>) -> Self {
        self.http = Some(http);
        self
    }

    /// Sets the process runner.
    #[must_use]
    pub fn process(mut self, process: Arc<ProcessRunner>) -> Self {
        self.process = Some(process);
        self
    }

    /// Pins the platform description instead of probing the host.
    #[must_use]
    pub fn platform(mut self, platform: PlatformInfo) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Sets the request timeout of the context's HTTP client.
    ///
    /// Ignored when an HTTP client is supplied explicitly.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the fetch context.
    pub fn build(self) -> FetchContext {
        let (http, timeout) = match (self.http, self.timeout) {
            (Some(http), _) => (http, None),
            (None, Some(timeout)) => (Arc::new(HttpClient::with_timeout(timeout)), Some(timeout)),
            (None, None) => (Arc::new(HttpClient::new()), None),
        };

        FetchContext {
            http,
            process: self.process.unwrap_or_else(|| Arc::new(ProcessRunner::new())),
            platform: self.platform,
            timeout,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::platform::HostOs;

    #[test]
    fn test_default_context() {
        let ctx = FetchContext::new();
        assert_eq!(ctx.timeout, None);
        assert!(ctx.platform.is_none());
        assert!(ctx.http.allowed_domains().is_none());
    }

    #[test]
    fn test_context_builder() {
        let ctx = FetchContext::builder()
            .timeout(Duration::from_secs(5))
            .platform(PlatformInfo::new(HostOs::MacOs, "/Users/me"))
            .build();

        assert_eq!(ctx.timeout, Some(Duration::from_secs(5)));
        assert_eq!(ctx.platform.as_ref().map(|p| p.os), Some(HostOs::MacOs));
    }

    #[test]
    fn test_explicit_client_wins_over_timeout() {
        let http = Arc::new(HttpClient::with_allowed_domains(vec!["cursor.com".into()]));
        let ctx = FetchContext::builder()
            .timeout(Duration::from_secs(5))
            .http(Arc::clone(&http))
            .build();

        assert_eq!(ctx.timeout, None);
        assert!(Arc::ptr_eq(&ctx.http, &http));
    }

    #[tokio::test]
    async fn test_pinned_platform_is_returned() {
        let pinned = PlatformInfo::new(HostOs::Windows, "C:\\Users\\me")
            .with_roaming_app_data_dir("C:\\Users\\me\\AppData\\Roaming");
        let ctx = FetchContext::builder().platform(pinned.clone()).build();

        assert_eq!(ctx.platform().await, pinned);
    }
}
