//! Cursor session credential extraction.
//!
//! A logged-in Cursor stores its access token (a JWT) under
//! `cursorAuth/accessToken` in `state.vscdb`. The web API does not accept
//! the bare token; it wants a session cookie of the form
//!
//! ```text
//! <userId>%3A%3A<accessToken>
//! ```
//!
//! where `userId` comes from the token's `sub` claim (for example
//! `auth0|user_01ABC` yields `user_01ABC`).
//!
//! The JWT is decoded without verifying its signature. This is data
//! extraction from a token the local application already trusts, not
//! authentication.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::prelude::*;
use cursorbar_fetch::StateDb;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use tracing::{debug, instrument, trace, warn};

use super::error::CursorError;

/// `ItemTable` key holding the access token.
pub const ACCESS_TOKEN_KEY: &str = "cursorAuth/accessToken";

/// URL-encoded `::` separating the user id from the token.
const SESSION_SEPARATOR: &str = "%3A%3A";

/// Key patterns listed when the token is missing.
const DIAGNOSTIC_KEY_PATTERNS: &[&str] = &["%auth%", "%token%", "%cursor%"];

// ============================================================================
// JWT Claims
// ============================================================================

/// The subset of JWT claims we read.
///
/// Only `sub` is needed. `exp` and `iss` are kept for logging and read
/// leniently: a value of an unexpected type becomes `None` instead of
/// failing the decode.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct JwtClaims {
    /// Subject. Numeric subjects are stringified.
    #[serde(default, deserialize_with = "string_or_number")]
    pub sub: Option<String>,
    /// Expiration as a NumericDate, which may carry a fraction.
    #[serde(default, deserialize_with = "lenient")]
    pub exp: Option<f64>,
    /// Issuer.
    #[serde(default, deserialize_with = "lenient")]
    pub iss: Option<String>,
}

impl JwtClaims {
    /// Returns the subject if it is present and non-empty.
    pub fn subject(&self) -> Option<&str> {
        self.sub.as_deref().filter(|s| !s.is_empty())
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Subject {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Option::<Subject>::deserialize(deserializer)? {
        Some(Subject::Text(s)) => Some(s),
        Some(Subject::Number(n)) => Some(n.to_string()),
        None => None,
    })
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

/// Decodes a JWT's payload without verifying it.
///
/// # Errors
///
/// Returns `CursorError::InvalidToken` if the token does not have three
/// dot-separated parts or the payload is not base64-encoded JSON.
#[instrument(skip(token), fields(token_len = token.len()))]
pub fn decode_jwt_claims(token: &str) -> Result<JwtClaims, CursorError> {
    let parts: Vec<&str> = token.split('.').collect();

    if parts.len() != 3 {
        return Err(CursorError::InvalidToken(format!(
            "expected 3 parts, got {}",
            parts.len()
        )));
    }

    let payload_b64 = parts[1];

    let decoded = BASE64_URL_SAFE_NO_PAD
        .decode(payload_b64)
        .or_else(|_| BASE64_URL_SAFE.decode(payload_b64))
        .or_else(|_| BASE64_STANDARD.decode(payload_b64))
        .map_err(|e| CursorError::InvalidToken(format!("base64 decode error: {e}")))?;

    let claims: JwtClaims = serde_json::from_slice(&decoded)
        .map_err(|e| CursorError::InvalidToken(format!("payload is not JSON: {e}")))?;

    trace!(has_sub = claims.sub.is_some(), exp = ?claims.exp, "Decoded JWT claims");
    Ok(claims)
}

/// Returns the user id part of a subject claim.
///
/// Subjects look like `<provider>|<id>`. Everything after the first `|` is
/// the id, so `github|a|b` yields `a|b`. Without a `|` the whole subject is
/// the id.
pub fn user_id_from_subject(sub: &str) -> &str {
    sub.split_once('|').map_or(sub, |(_, id)| id)
}

// ============================================================================
// Session Token
// ============================================================================

/// The composite session credential sent as `WorkosCursorSessionToken`.
///
/// `Debug` never prints the access token.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Builds `<user_id>%3A%3A<access_token>`.
    pub fn compose(user_id: &str, access_token: &str) -> Self {
        Self(format!("{user_id}{SESSION_SEPARATOR}{access_token}"))
    }

    /// Wraps an already composed credential.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the full credential.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns the user id: everything before the first `%`.
    ///
    /// `None` if that prefix is empty.
    pub fn user_id(&self) -> Option<&str> {
        let prefix = self.0.split('%').next().unwrap_or_default();
        (!prefix.is_empty()).then_some(prefix)
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionToken")
            .field("user_id", &self.user_id())
            .field("len", &self.0.len())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

/// Hook run when the state database has no access token.
///
/// Implementations must not fail; anything they cannot read is skipped.
pub trait StateDbDiagnostics: Send + Sync {
    /// Reports what the database contains instead.
    fn report_missing_token(&self, db: &StateDb);
}

/// Logs the database layout through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl StateDbDiagnostics for TracingDiagnostics {
    fn report_missing_token(&self, db: &StateDb) {
        warn!(
            path = %db.source_path().display(),
            key = ACCESS_TOKEN_KEY,
            "Access token not found in state database"
        );

        match db.table_names() {
            Ok(tables) => debug!(tables = ?tables, "State database tables"),
            Err(e) => debug!(error = %e, "Could not list tables"),
        }

        match db.keys_matching(DIAGNOSTIC_KEY_PATTERNS, 20) {
            Ok(keys) => debug!(keys = ?keys, "Auth-related keys"),
            Err(e) => debug!(error = %e, "Could not list auth-related keys"),
        }

        match db.sample_keys(10) {
            Ok(keys) => debug!(keys = ?keys, "First keys"),
            Err(e) => debug!(error = %e, "Could not sample keys"),
        }
    }
}

/// Diagnostics that do nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDiagnostics;

impl StateDbDiagnostics for NoDiagnostics {
    fn report_missing_token(&self, _db: &StateDb) {}
}

// ============================================================================
// Auth Reader
// ============================================================================

/// Reads the session credential from a Cursor state database.
#[derive(Clone)]
pub struct CursorAuthReader {
    db_path: PathBuf,
    diagnostics: Arc<dyn StateDbDiagnostics>,
}

impl CursorAuthReader {
    /// Creates a reader for the database at `db_path`.
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            diagnostics: Arc::new(TracingDiagnostics),
        }
    }

    /// Replaces the missing-token diagnostics hook.
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn StateDbDiagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Path of the database this reader opens.
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Returns true if the database file exists.
    pub fn database_exists(&self) -> bool {
        self.db_path.is_file()
    }

    /// Reads the access token exactly as stored.
    ///
    /// # Errors
    ///
    /// - `CursorError::DatabaseNotFound` if the file does not exist
    /// - `CursorError::StateDb` if it cannot be opened or queried
    /// - `CursorError::TokenMissing` if the key is absent, empty or blank
    #[instrument(skip(self), fields(path = %self.db_path.display()))]
    pub fn read_access_token(&self) -> Result<String, CursorError> {
        if !self.database_exists() {
            return Err(CursorError::DatabaseNotFound {
                path: self.db_path.clone(),
            });
        }

        let db = StateDb::open(&self.db_path)?;

        match db.get_item(ACCESS_TOKEN_KEY)? {
            Some(token) if !token.trim().is_empty() => {
                debug!(
                    len = token.len(),
                    prefix = %token.chars().take(8).collect::<String>(),
                    "Found access token"
                );
                Ok(token)
            }
            _ => {
                self.diagnostics.report_missing_token(&db);
                Err(CursorError::TokenMissing)
            }
        }
    }

    /// Reads the access token and composes the session credential.
    ///
    /// # Errors
    ///
    /// Everything [`Self::read_access_token`] returns, plus
    /// `CursorError::InvalidToken` when the token has no usable subject.
    /// A subject with an empty id part (`auth0|`) is rejected here rather
    /// than producing a credential that no user id can be read back from.
    #[instrument(skip(self), fields(path = %self.db_path.display()))]
    pub fn read_session_token(&self) -> Result<SessionToken, CursorError> {
        let access_token = self.read_access_token()?;
        let claims = decode_jwt_claims(&access_token)?;

        let subject = claims
            .subject()
            .ok_or_else(|| CursorError::InvalidToken("token has no subject".to_string()))?;
        let user_id = user_id_from_subject(subject);
        if user_id.is_empty() {
            return Err(CursorError::InvalidToken(format!(
                "subject {subject:?} has no user id"
            )));
        }

        debug!(user_id = %user_id, "Composed session token");
        Ok(SessionToken::compose(user_id, &access_token))
    }

    /// Reads the user id from the stored session.
    ///
    /// # Errors
    ///
    /// Everything [`Self::read_session_token`] returns, plus
    /// `CursorError::AuthExtraction` when the credential has no user id.
    pub fn read_user_id(&self) -> Result<String, CursorError> {
        let token = self.read_session_token()?;
        token
            .user_id()
            .map(str::to_string)
            .ok_or(CursorError::AuthExtraction)
    }
}

impl fmt::Debug for CursorAuthReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CursorAuthReader")
            .field("db_path", &self.db_path)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn make_jwt(payload_json: &str) -> String {
        let header = BASE64_URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = BASE64_URL_SAFE_NO_PAD.encode(payload_json.as_bytes());
        format!("{header}.{payload}.signature")
    }

    fn state_db(token: Option<&str>) -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.vscdb");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE ItemTable (key TEXT UNIQUE ON CONFLICT REPLACE, value BLOB);
             INSERT INTO ItemTable VALUES ('cursorAuth/cachedEmail', 'me@example.com');",
        )
        .unwrap();
        if let Some(token) = token {
            conn.execute(
                "INSERT INTO ItemTable (key, value) VALUES (?1, ?2)",
                [ACCESS_TOKEN_KEY, token],
            )
            .unwrap();
        }
        (dir, path)
    }

    // ------------------------------------------------------------------------
    // JWT decoding
    // ------------------------------------------------------------------------

    #[test]
    fn test_decode_claims() {
        let token = make_jwt(r#"{"sub":"auth0|user_01ABC","exp":1735689600,"iss":"https://authentication.cursor.sh"}"#);
        let claims = decode_jwt_claims(&token).unwrap();

        assert_eq!(claims.subject(), Some("auth0|user_01ABC"));
        assert_eq!(claims.exp, Some(1_735_689_600.0));
        assert_eq!(claims.iss.as_deref(), Some("https://authentication.cursor.sh"));
    }

    #[test]
    fn test_decode_fractional_exp() {
        let token = make_jwt(r#"{"sub":"auth0|user123","exp":1735689600.5}"#);
        let claims = decode_jwt_claims(&token).unwrap();

        assert_eq!(claims.subject(), Some("auth0|user123"));
        assert_eq!(claims.exp, Some(1_735_689_600.5));
    }

    #[test]
    fn test_decode_ignores_odd_optional_claims() {
        let token = make_jwt(r#"{"sub":"auth0|user123","exp":"soon","iss":["a","b"]}"#);
        let claims = decode_jwt_claims(&token).unwrap();

        assert_eq!(claims.subject(), Some("auth0|user123"));
        assert_eq!(claims.exp, None);
        assert_eq!(claims.iss, None);
    }

    #[test]
    fn test_decode_numeric_subject() {
        let token = make_jwt(r#"{"sub":12345}"#);
        let claims = decode_jwt_claims(&token).unwrap();
        assert_eq!(claims.subject(), Some("12345"));
    }

    #[test]
    fn test_decode_padded_payload() {
        let header = BASE64_URL_SAFE_NO_PAD.encode("{}");
        let payload = BASE64_URL_SAFE.encode(r#"{"sub":"a"}"#);
        assert!(payload.ends_with('='));

        let claims = decode_jwt_claims(&format!("{header}.{payload}.sig")).unwrap();
        assert_eq!(claims.subject(), Some("a"));
    }

    #[test]
    fn test_decode_wrong_part_count() {
        for bad in ["", "abc", "a.b", "a.b.c.d"] {
            assert!(
                matches!(decode_jwt_claims(bad), Err(CursorError::InvalidToken(_))),
                "expected InvalidToken for {bad:?}"
            );
        }
    }

    #[test]
    fn test_decode_garbage_payload() {
        assert!(matches!(
            decode_jwt_claims("a.!!!.c"),
            Err(CursorError::InvalidToken(_))
        ));

        let not_json = BASE64_URL_SAFE_NO_PAD.encode("not json");
        assert!(matches!(
            decode_jwt_claims(&format!("a.{not_json}.c")),
            Err(CursorError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_user_id_from_subject() {
        assert_eq!(user_id_from_subject("auth0|user_01ABC"), "user_01ABC");
        assert_eq!(user_id_from_subject("github|a|b"), "a|b");
        assert_eq!(user_id_from_subject("user123"), "user123");
    }

    // ------------------------------------------------------------------------
    // Session token
    // ------------------------------------------------------------------------

    #[test]
    fn test_session_token_compose() {
        let token = SessionToken::compose("user_01ABC", "ey.J.x");
        assert_eq!(token.expose(), "user_01ABC%3A%3Aey.J.x");
        assert_eq!(token.user_id(), Some("user_01ABC"));
    }

    #[test]
    fn test_session_token_without_prefix() {
        assert_eq!(SessionToken::from_raw("%3A%3Atoken").user_id(), None);
        assert_eq!(SessionToken::from_raw("").user_id(), None);
        assert_eq!(SessionToken::from_raw("plain").user_id(), Some("plain"));
    }

    #[test]
    fn test_session_token_debug_redacts() {
        let token = SessionToken::compose("user123", "super-secret-token");
        let debug = format!("{token:?}");
        assert!(debug.contains("user123"));
        assert!(!debug.contains("super-secret-token"));
    }

    // ------------------------------------------------------------------------
    // Reader
    // ------------------------------------------------------------------------

    #[test]
    fn test_read_session_token() {
        let jwt = make_jwt(r#"{"sub":"auth0|user123"}"#);
        let (_dir, path) = state_db(Some(&jwt));

        let reader = CursorAuthReader::new(&path);
        let token = reader.read_session_token().unwrap();

        assert_eq!(token.expose(), format!("user123%3A%3A{jwt}"));
        assert_eq!(reader.read_user_id().unwrap(), "user123");
    }

    #[test]
    fn test_missing_database() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.vscdb");

        let result = CursorAuthReader::new(&path).read_session_token();
        assert!(matches!(
            result,
            Err(CursorError::DatabaseNotFound { path: p }) if p == path
        ));
    }

    #[derive(Default)]
    struct CountingDiagnostics(AtomicUsize);

    impl StateDbDiagnostics for CountingDiagnostics {
        fn report_missing_token(&self, db: &StateDb) {
            assert!(db.get_item("cursorAuth/cachedEmail").unwrap().is_some());
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_missing_token_runs_diagnostics() {
        let (_dir, path) = state_db(None);
        let diagnostics = Arc::new(CountingDiagnostics::default());

        let reader = CursorAuthReader::new(&path).with_diagnostics(diagnostics.clone());
        let result = reader.read_session_token();

        assert!(matches!(result, Err(CursorError::TokenMissing)));
        assert_eq!(diagnostics.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_empty_token_is_missing() {
        let (_dir, path) = state_db(Some("  "));
        let reader = CursorAuthReader::new(&path).with_diagnostics(Arc::new(NoDiagnostics));
        assert!(matches!(
            reader.read_session_token(),
            Err(CursorError::TokenMissing)
        ));
    }

    #[test]
    fn test_token_without_subject() {
        let (_dir, path) = state_db(Some(&make_jwt(r#"{"exp":1}"#)));
        let result = CursorAuthReader::new(&path).read_session_token();
        assert!(matches!(result, Err(CursorError::InvalidToken(_))));
    }

    #[test]
    fn test_subject_with_empty_id() {
        let (_dir, path) = state_db(Some(&make_jwt(r#"{"sub":"auth0|"}"#)));
        let reader = CursorAuthReader::new(&path);

        assert!(matches!(
            reader.read_session_token(),
            Err(CursorError::InvalidToken(msg)) if msg.contains("no user id")
        ));
        assert!(matches!(
            reader.read_user_id(),
            Err(CursorError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_token_is_used_as_stored() {
        let jwt = format!("{}\n", make_jwt(r#"{"sub":"auth0|user123"}"#));
        let (_dir, path) = state_db(Some(&jwt));
        let reader = CursorAuthReader::new(&path);

        assert_eq!(reader.read_access_token().unwrap(), jwt);
        assert_eq!(
            reader.read_session_token().unwrap().expose(),
            format!("user123%3A%3A{jwt}")
        );
    }

    #[test]
    fn test_non_sqlite_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.vscdb");
        std::fs::write(&path, b"definitely not sqlite, just some bytes that are long enough").unwrap();

        let result = CursorAuthReader::new(&path).read_session_token();
        assert!(matches!(result, Err(CursorError::StateDb(_))));
    }
}
