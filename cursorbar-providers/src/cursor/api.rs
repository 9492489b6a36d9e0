//! Cursor usage API client.
//!
//! One endpoint, one request per call:
//!
//! ```text
//! GET https://www.cursor.com/api/usage?user=<userId>
//! Cookie: WorkosCursorSessionToken=<userId>%3A%3A<accessToken>
//! ```

use std::sync::{Arc, LazyLock};

use cursorbar_core::UsageSnapshot;
use cursorbar_fetch::{HttpClient, HttpError};
use reqwest::header::{ACCEPT, COOKIE, HeaderMap, HeaderValue, USER_AGENT};
use tracing::{debug, instrument, warn};
use url::Url;

use super::auth::SessionToken;
use super::error::CursorError;

// ============================================================================
// Constants
// ============================================================================

/// Cursor API base URL.
pub const CURSOR_API_BASE: &str = "https://www.cursor.com";

static CURSOR_API_BASE_URL: LazyLock<Url> = LazyLock::new(|| {
    Url::parse(CURSOR_API_BASE).unwrap_or_else(|e| panic!("invalid CURSOR_API_BASE: {e}"))
});

/// Cursor usage API endpoint.
const USAGE_ENDPOINT: &str = "/api/usage";

/// Name of the session cookie.
const SESSION_COOKIE_NAME: &str = "WorkosCursorSessionToken";

/// User agent the endpoint expects.
const USER_AGENT_VALUE: &str = "VSCode Extension";

// ============================================================================
// API Client
// ============================================================================

/// Cursor usage API client.
#[derive(Debug, Clone)]
pub struct CursorApiClient {
    http: Arc<HttpClient>,
    base_url: Url,
}

impl CursorApiClient {
    /// Creates a client for the production API.
    pub fn new() -> Self {
        Self::from_http(&HttpClient::new())
    }

    /// Creates a client for the production API on top of `http`.
    ///
    /// The client shares `http`'s connection pool and timeout.
    pub fn from_http(http: &HttpClient) -> Self {
        Self::for_url(http, CURSOR_API_BASE_URL.clone())
    }

    /// Creates a client for another deployment of the API.
    ///
    /// # Errors
    ///
    /// Returns `CursorError::Transport` if `base_url` is not an absolute
    /// URL with a host.
    pub fn with_base_url(base_url: &str) -> Result<Self, CursorError> {
        Self::with_http(&HttpClient::new(), base_url)
    }

    /// Creates a client for another deployment of the API on top of `http`.
    ///
    /// # Errors
    ///
    /// Returns `CursorError::Transport` if `base_url` is not an absolute
    /// URL with a host.
    pub fn with_http(http: &HttpClient, base_url: &str) -> Result<Self, CursorError> {
        let url = Url::parse(base_url)
            .map_err(|e| CursorError::Transport(format!("Invalid base URL {base_url:?}: {e}")))?;
        if url.host_str().is_none() {
            return Err(CursorError::Transport(format!(
                "Base URL {base_url:?} has no host"
            )));
        }
        Ok(Self::for_url(http, url))
    }

    /// Requests are only allowed to the base URL's host.
    fn for_url(http: &HttpClient, base_url: Url) -> Self {
        let host = base_url.host_str().unwrap_or_default().to_string();
        Self {
            http: Arc::new(http.restricted_to(vec![host])),
            base_url,
        }
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds the usage URL for `user_id`.
    pub fn usage_url(&self, user_id: &str) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(USAGE_ENDPOINT);
        url.query_pairs_mut().clear().append_pair("user", user_id);
        url
    }

    /// Fetches the usage snapshot for the session's user.
    ///
    /// # Errors
    ///
    /// - `CursorError::AuthExtraction` if the token carries no user id
    /// - `CursorError::Transport` if no response arrived
    /// - `CursorError::Http` for a non-2xx status
    /// - `CursorError::Decode` if the body is not a usage snapshot
    #[instrument(skip(self, token))]
    pub async fn fetch_usage(&self, token: &SessionToken) -> Result<UsageSnapshot, CursorError> {
        let user_id = token.user_id().ok_or(CursorError::AuthExtraction)?;
        let url = self.usage_url(user_id);
        debug!(user_id = %user_id, url = %url, "Fetching Cursor usage");

        let headers = build_headers(token)?;
        let response = self
            .http
            .get_with_headers(url.as_str(), headers)
            .await
            .map_err(|e| match e {
                HttpError::Request(err) => CursorError::from(err),
                other => CursorError::Transport(other.to_string()),
            })?;

        let status = response.status();
        debug!(status = %status, "Usage response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|e| {
                warn!(status = %status, error = %e, "Failed to read rejected response body");
                String::new()
            });
            warn!(status = %status, body_len = body.len(), "Usage request rejected");
            return Err(CursorError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        debug!(len = body.len(), "Got usage response");

        UsageSnapshot::from_json(&body).map_err(|e| {
            warn!(error = %e, "Failed to parse usage response");
            CursorError::Decode(e.to_string())
        })
    }
}

impl Default for CursorApiClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds request headers.
fn build_headers(token: &SessionToken) -> Result<HeaderMap, CursorError> {
    let mut headers = HeaderMap::new();

    headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    let mut cookie =
        HeaderValue::from_str(&format!("{SESSION_COOKIE_NAME}={}", token.expose()))
            .map_err(|_| CursorError::InvalidToken("token is not a valid header value".into()))?;
    cookie.set_sensitive(true);
    headers.insert(COOKIE, cookie);

    Ok(headers)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_url() {
        let client = CursorApiClient::new();
        assert_eq!(
            client.usage_url("user_01ABC").as_str(),
            "https://www.cursor.com/api/usage?user=user_01ABC"
        );
    }

    #[test]
    fn test_usage_url_custom_base() {
        let client = CursorApiClient::with_base_url("http://127.0.0.1:8080").unwrap();
        assert_eq!(
            client.usage_url("u").as_str(),
            "http://127.0.0.1:8080/api/usage?user=u"
        );
    }

    #[test]
    fn test_allowlist_is_base_host() {
        let shared = HttpClient::new();
        let client = CursorApiClient::with_http(&shared, "http://127.0.0.1:8080").unwrap();

        assert_eq!(client.http.allowed_domains(), Some(&["127.0.0.1".to_string()][..]));
        assert!(shared.allowed_domains().is_none());

        let prod = CursorApiClient::from_http(&shared);
        assert_eq!(prod.http.allowed_domains(), Some(&["www.cursor.com".to_string()][..]));
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(CursorApiClient::with_base_url("not a url").is_err());
        assert!(CursorApiClient::with_base_url("data:text/plain,hi").is_err());
    }

    #[test]
    fn test_build_headers() {
        let token = SessionToken::compose("user123", "a.b.c");
        let headers = build_headers(&token).unwrap();

        assert_eq!(headers[USER_AGENT], "VSCode Extension");
        assert_eq!(headers[ACCEPT], "application/json");
        assert_eq!(
            headers[COOKIE],
            "WorkosCursorSessionToken=user123%3A%3Aa.b.c"
        );
        assert!(headers[COOKIE].is_sensitive());
    }

    #[test]
    fn test_header_rejects_control_characters() {
        let token = SessionToken::compose("user123", "bad\ntoken");
        assert!(matches!(
            build_headers(&token),
            Err(CursorError::InvalidToken(_))
        ));
    }

    #[tokio::test]
    async fn test_token_without_user_id() {
        let client = CursorApiClient::new();
        let token = SessionToken::from_raw("%3A%3Atoken");

        assert!(matches!(
            client.fetch_usage(&token).await,
            Err(CursorError::AuthExtraction)
        ));
    }
}
