//! HTTP client with tracing and domain allowlist.
//!
//! This module provides a wrapped HTTP client that adds:
//! - Request/response tracing
//! - Domain allowlist so session cookies only go where they belong

use reqwest::{Client, Response, header::HeaderMap};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use crate::error::HttpError;

/// User agent string for CursorBar.
const USER_AGENT: &str = concat!("CursorBar/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// HTTP Client
// ============================================================================

/// HTTP client wrapper with tracing and domain allowlist.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
    allowed_domains: Option<Vec<String>>,
}

impl HttpClient {
    /// Creates a new HTTP client with the transport's own timeout behavior.
    ///
    /// No request timeout is set.
    pub fn new() -> Self {
        Self::build(Client::builder())
    }

    /// Creates a new HTTP client that gives up on a request after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::build(Client::builder().timeout(timeout))
    }

    /// Finishes a client builder.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built. This should only occur
    /// if the system's TLS/SSL configuration is broken, making network
    /// operations impossible.
    fn build(builder: reqwest::ClientBuilder) -> Self {
        let client = builder.user_agent(USER_AGENT).build().unwrap_or_else(|e| {
            panic!(
                "Failed to create HTTP client: {e}. \
                This usually indicates a broken TLS/SSL configuration."
            )
        });

        Self {
            inner: client,
            allowed_domains: None,
        }
    }

    /// Creates a new HTTP client with domain allowlist.
    ///
    /// Only requests to domains in the allowlist (or their subdomains) will
    /// be permitted.
    pub fn with_allowed_domains(domains: Vec<String>) -> Self {
        Self::new().restricted_to(domains)
    }

    /// Returns a client sharing this one's connection pool and timeout,
    /// limited to `domains`.
    #[must_use]
    pub fn restricted_to(&self, domains: Vec<String>) -> Self {
        Self {
            inner: self.inner.clone(),
            allowed_domains: Some(domains),
        }
    }

    /// Returns the allowlist, if one is set.
    pub fn allowed_domains(&self) -> Option<&[String]> {
        self.allowed_domains.as_deref()
    }

    /// Checks if a URL's domain is allowed.
    fn is_domain_allowed(&self, url: &str) -> Result<(), HttpError> {
        let Some(ref allowed) = self.allowed_domains else {
            return Ok(()); // No restrictions
        };

        let parsed = Url::parse(url).map_err(|e| HttpError::InvalidUrl(e.to_string()))?;

        let host = parsed
            .host_str()
            .ok_or_else(|| HttpError::InvalidUrl("No host in URL".to_string()))?;

        let allowed = allowed
            .iter()
            .any(|domain| host == domain || host.ends_with(&format!(".{domain}")));

        if allowed {
            Ok(())
        } else {
            Err(HttpError::DomainNotAllowed(host.to_string()))
        }
    }

    /// Performs a GET request with custom headers.
    ///
    /// Exactly one attempt is made; the client's timeout, if any, is the
    /// only bound.
    ///
    /// # Errors
    ///
    /// Returns `HttpError::DomainNotAllowed` / `HttpError::InvalidUrl` before
    /// sending, or `HttpError::Request` when the transport fails.
    #[instrument(skip(self, headers), fields(url = %url))]
    pub async fn get_with_headers(
        &self,
        url: &str,
        headers: HeaderMap,
    ) -> Result<Response, HttpError> {
        self.is_domain_allowed(url)?;
        debug!("GET request with headers");

        let response = self.inner.get(url).headers(headers).send().await?;
        debug!(status = %response.status(), "Response received");
        Ok(response)
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
