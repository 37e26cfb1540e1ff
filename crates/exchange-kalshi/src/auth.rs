//! Email/password login and bearer-token caching for the Kalshi API.
//!
//! `POST /login` exchanges credentials for a bearer token. The
//! [`SessionManager`] caches that token with a local expiry shorter than the
//! server's (55 minutes for a 60-minute token by default) and logs in again on
//! a miss, after expiry, or after [`SessionManager::invalidate`].
//!
//! # Security
//!
//! - Passwords and tokens are held as [`SecretString`]
//! - Neither is ever logged or shown in `Debug` output
//!
//! # Example
//!
//! ```ignore
//! use kalshi_bridge::auth::{Credentials, SessionManager};
//! use kalshi_bridge::{Environment, KalshiClientConfig};
//!
//! let credentials = Credentials::from_env(Environment::Demo, &Default::default())?;
//! let session = SessionManager::new(&KalshiClientConfig::default())?;
//! let token = session.get_token(&credentials).await?;
//! ```

use crate::client::{KalshiClientConfig, MAX_TOKEN_TTL_SECS};
use crate::clock::{Clock, SystemClock};
use crate::error::{upstream_message, KalshiError, Result};
use crate::types::Environment;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// =============================================================================
// Credentials
// =============================================================================

/// Environment variable names holding the login credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialEnvVars {
    /// Variable holding the account email.
    pub email: String,
    /// Variable holding the account password.
    pub password: String,
}

impl Default for CredentialEnvVars {
    fn default() -> Self {
        Self {
            email: "KALSHI_EMAIL".to_string(),
            password: "KALSHI_PASSWORD".to_string(),
        }
    }
}

impl CredentialEnvVars {
    /// Sets custom environment variable names.
    #[must_use]
    pub fn with_names(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Login credentials for one Kalshi account in one environment.
pub struct Credentials {
    /// Target deployment.
    pub environment: Environment,
    /// Account email.
    pub email: String,
    password: SecretString,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("environment", &self.environment)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Credentials {
    /// Creates credentials.
    pub fn new(
        environment: Environment,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            environment,
            email: email.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// Reads email and password from environment variables.
    ///
    /// # Errors
    /// Returns `Configuration` if either variable is missing or empty.
    pub fn from_env(environment: Environment, vars: &CredentialEnvVars) -> Result<Self> {
        let read = |name: &str| {
            std::env::var(name)
                .ok()
                .filter(|v| !v.is_empty())
                .ok_or_else(|| {
                    KalshiError::Configuration(format!("missing environment variable: {name}"))
                })
        };

        let email = read(&vars.email)?;
        let password = read(&vars.password)?;

        Ok(Self::new(environment, email, password))
    }

    fn owner(&self) -> TokenOwner {
        TokenOwner {
            environment: self.environment,
            email: self.email.clone(),
        }
    }
}

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: Option<String>,
}

// =============================================================================
// SessionManager
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
struct TokenOwner {
    environment: Environment,
    email: String,
}

struct CachedToken {
    value: SecretString,
    expires_at: DateTime<Utc>,
    owner: TokenOwner,
}

/// Owns the cached bearer token.
///
/// Construct once per process (or worker) and share it through an `Arc`.
/// A token is served only while `now < expires_at` and only to the account
/// it was issued for.
pub struct SessionManager {
    http: Client,
    config: KalshiClientConfig,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    token: RwLock<Option<CachedToken>>,
    login_gate: tokio::sync::Mutex<()>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("ttl", &self.ttl)
            .field("expires_at", &self.cached_expiry())
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Creates a session manager using the system clock.
    ///
    /// # Errors
    /// Returns `Configuration` if the TTL is zero, exceeds the server token
    /// lifetime, or the HTTP client cannot be built.
    pub fn new(config: &KalshiClientConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates a session manager with an explicit time source.
    ///
    /// # Errors
    /// Returns `Configuration` if the TTL is zero, exceeds the server token
    /// lifetime, or the HTTP client cannot be built.
    pub fn with_clock(config: &KalshiClientConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        if config.token_ttl_secs == 0 || config.token_ttl_secs > MAX_TOKEN_TTL_SECS {
            return Err(KalshiError::Configuration(format!(
                "token_ttl_secs must be between 1 and {MAX_TOKEN_TTL_SECS}, got {}",
                config.token_ttl_secs
            )));
        }

        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| KalshiError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            ttl: config.token_ttl(),
            config: config.clone(),
            clock,
            token: RwLock::new(None),
            login_gate: tokio::sync::Mutex::new(()),
        })
    }

    /// Returns a valid token for `credentials`, logging in if needed.
    ///
    /// Concurrent callers that miss the cache wait on a single login.
    ///
    /// # Errors
    /// Returns `Authentication` if the login exchange fails.
    pub async fn get_token(&self, credentials: &Credentials) -> Result<SecretString> {
        if let Some(token) = self.cached_for(credentials) {
            tracing::debug!(environment = %credentials.environment, "using cached token");
            return Ok(token);
        }

        let _gate = self.login_gate.lock().await;

        // Another caller may have logged in while this one waited.
        if let Some(token) = self.cached_for(credentials) {
            return Ok(token);
        }

        let issued_at = self.clock.now();
        let expires_at = issued_at.checked_add_signed(self.ttl).ok_or_else(|| {
            KalshiError::Configuration(format!("token expiry overflows at {issued_at}"))
        })?;
        let value = self.login(credentials).await?;

        *self.token.write() = Some(CachedToken {
            value: SecretString::from(value.clone()),
            expires_at,
            owner: credentials.owner(),
        });

        tracing::info!(
            environment = %credentials.environment,
            %expires_at,
            "logged in to Kalshi"
        );

        Ok(SecretString::from(value))
    }

    /// Clears the cached token. The next [`get_token`](Self::get_token) logs in.
    pub fn invalidate(&self) {
        if self.token.write().take().is_some() {
            tracing::debug!("session token invalidated");
        }
    }

    /// Returns the expiry of the cached token, if one is held.
    #[must_use]
    pub fn cached_expiry(&self) -> Option<DateTime<Utc>> {
        self.token.read().as_ref().map(|t| t.expires_at)
    }

    /// Returns true if a token valid for `credentials` is cached.
    #[must_use]
    pub fn has_valid_token(&self, credentials: &Credentials) -> bool {
        self.cached_for(credentials).is_some()
    }

    fn cached_for(&self, credentials: &Credentials) -> Option<SecretString> {
        let now = self.clock.now();
        let guard = self.token.read();
        guard
            .as_ref()
            .filter(|t| now < t.expires_at && t.owner == credentials.owner())
            .map(|t| SecretString::from(t.value.expose_secret().to_owned()))
    }

    async fn login(&self, credentials: &Credentials) -> Result<String> {
        let url = format!(
            "{}/login",
            self.config.base_url_for(credentials.environment)
        );
        let body = LoginRequest {
            email: &credentials.email,
            password: credentials.password.expose_secret(),
        };

        tracing::debug!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "login request failed");
                KalshiError::authentication(None, format!("login request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "login rejected");
            return Err(KalshiError::authentication(
                Some(status.as_u16()),
                upstream_message(&text),
            ));
        }

        let parsed: LoginResponse = response.json().await.map_err(|e| {
            KalshiError::authentication(
                Some(status.as_u16()),
                format!("invalid login response: {e}"),
            )
        })?;

        parsed.token.filter(|t| !t.is_empty()).ok_or_else(|| {
            KalshiError::authentication(
                Some(status.as_u16()),
                "login response did not contain a token",
            )
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn demo_credentials() -> Credentials {
        Credentials::new(Environment::Demo, "trader@example.com", "hunter2")
    }

    fn config_for(server: &MockServer) -> KalshiClientConfig {
        KalshiClientConfig::default().with_base_url(server.uri())
    }

    async fn mount_login(server: &MockServer, token: &str, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path("/login"))
            .and(body_json(json!({
                "email": "trader@example.com",
                "password": "hunter2"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "member_id": "member-1",
                "token": token
            })))
            .expect(expected_calls)
            .mount(server)
            .await;
    }

    // ==================== Credentials Tests ====================

    #[test]
    fn test_credential_env_vars_default() {
        let vars = CredentialEnvVars::default();
        assert_eq!(vars.email, "KALSHI_EMAIL");
        assert_eq!(vars.password, "KALSHI_PASSWORD");
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let debug_output = format!("{:?}", demo_credentials());
        assert!(debug_output.contains("trader@example.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("hunter2"));
    }

    #[test]
    fn test_credentials_from_env_missing_email() {
        let vars = CredentialEnvVars::with_names(
            "KALSHI_BRIDGE_TEST_MISSING_EMAIL",
            "KALSHI_BRIDGE_TEST_MISSING_PASSWORD",
        );

        let result = Credentials::from_env(Environment::Demo, &vars);
        assert!(matches!(result, Err(KalshiError::Configuration(_))));
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("KALSHI_BRIDGE_TEST_MISSING_EMAIL"));
    }

    #[test]
    fn test_zero_ttl_is_rejected() {
        let config = KalshiClientConfig::default().with_token_ttl_secs(0);
        assert!(matches!(
            SessionManager::new(&config),
            Err(KalshiError::Configuration(_))
        ));
    }

    #[test]
    fn test_ttl_beyond_server_lifetime_is_rejected() {
        for secs in [MAX_TOKEN_TTL_SECS + 1, 1_000_000_000_000_000] {
            let config = KalshiClientConfig::default().with_token_ttl_secs(secs);
            let err = SessionManager::new(&config).unwrap_err();
            assert!(matches!(err, KalshiError::Configuration(_)));
            assert!(err.to_string().contains("token_ttl_secs"));
        }

        let config = KalshiClientConfig::default().with_token_ttl_secs(MAX_TOKEN_TTL_SECS);
        assert!(SessionManager::new(&config).is_ok());
    }

    #[tokio::test]
    async fn test_expiry_overflow_is_error_not_panic() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "token-1" })))
            .expect(0)
            .mount(&server)
            .await;

        let clock = Arc::new(ManualClock::new(DateTime::<Utc>::MAX_UTC - Duration::minutes(1)));
        let session = SessionManager::with_clock(&config_for(&server), clock).unwrap();

        let err = session.get_token(&demo_credentials()).await.unwrap_err();
        assert!(matches!(err, KalshiError::Configuration(_)));
        assert_eq!(session.cached_expiry(), None);
    }

    // ==================== Token Cache Tests ====================

    #[tokio::test]
    async fn test_token_reused_within_ttl() {
        let server = MockServer::start().await;
        mount_login(&server, "token-1", 1).await;

        let session = SessionManager::new(&config_for(&server)).unwrap();
        let credentials = demo_credentials();

        let first = session.get_token(&credentials).await.unwrap();
        let second = session.get_token(&credentials).await.unwrap();

        assert_eq!(first.expose_secret(), "token-1");
        assert_eq!(second.expose_secret(), "token-1");
        assert!(session.has_valid_token(&credentials));
    }

    #[tokio::test]
    async fn test_token_expiry_forces_fresh_login() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "token-1" })))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "token-2" })))
            .expect(1)
            .mount(&server)
            .await;

        let start = Utc::now();
        let clock = Arc::new(ManualClock::new(start));
        let session = SessionManager::with_clock(&config_for(&server), clock.clone()).unwrap();
        let credentials = demo_credentials();

        let first = session.get_token(&credentials).await.unwrap();
        assert_eq!(first.expose_secret(), "token-1");
        assert_eq!(session.cached_expiry(), Some(start + Duration::minutes(55)));

        clock.advance(Duration::minutes(54));
        let still_cached = session.get_token(&credentials).await.unwrap();
        assert_eq!(still_cached.expose_secret(), "token-1");

        clock.advance(Duration::minutes(1));
        assert!(!session.has_valid_token(&credentials));
        let renewed = session.get_token(&credentials).await.unwrap();
        assert_eq!(renewed.expose_secret(), "token-2");
    }

    #[tokio::test]
    async fn test_invalidate_forces_fresh_login() {
        let server = MockServer::start().await;
        mount_login(&server, "token-1", 2).await;

        let session = SessionManager::new(&config_for(&server)).unwrap();
        let credentials = demo_credentials();

        session.get_token(&credentials).await.unwrap();
        session.invalidate();
        assert_eq!(session.cached_expiry(), None);

        session.get_token(&credentials).await.unwrap();
        assert!(session.cached_expiry().is_some());
    }

    #[tokio::test]
    async fn test_token_not_served_to_other_account() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "token-x" })))
            .expect(2)
            .mount(&server)
            .await;

        let session = SessionManager::new(&config_for(&server)).unwrap();
        let alice = Credentials::new(Environment::Demo, "alice@example.com", "pw");
        let bob = Credentials::new(Environment::Demo, "bob@example.com", "pw");

        session.get_token(&alice).await.unwrap();
        assert!(!session.has_valid_token(&bob));
        session.get_token(&bob).await.unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_misses_share_one_login() {
        let server = MockServer::start().await;
        mount_login(&server, "token-1", 1).await;

        let session = Arc::new(SessionManager::new(&config_for(&server)).unwrap());
        let credentials = Arc::new(demo_credentials());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let session = session.clone();
                let credentials = credentials.clone();
                tokio::spawn(async move { session.get_token(&credentials).await })
            })
            .collect();

        for handle in handles {
            let token = handle.await.unwrap().unwrap();
            assert_eq!(token.expose_secret(), "token-1");
        }
    }

    // ==================== Login Failure Tests ====================

    #[tokio::test]
    async fn test_login_rejection_is_authentication_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": { "code": "invalid_credentials", "message": "invalid email or password" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let session = SessionManager::new(&config_for(&server)).unwrap();
        let err = session.get_token(&demo_credentials()).await.unwrap_err();

        match err {
            KalshiError::Authentication {
                status_code,
                message,
            } => {
                assert_eq!(status_code, Some(403));
                assert_eq!(message, "invalid email or password");
            }
            other => panic!("expected authentication error, got {other:?}"),
        }
        assert_eq!(session.cached_expiry(), None);
    }

    #[tokio::test]
    async fn test_login_without_token_is_authentication_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "member_id": "m" })))
            .mount(&server)
            .await;

        let session = SessionManager::new(&config_for(&server)).unwrap();
        let err = session.get_token(&demo_credentials()).await.unwrap_err();
        assert!(matches!(err, KalshiError::Authentication { .. }));
        assert!(err.to_string().contains("did not contain a token"));
    }

    #[tokio::test]
    async fn test_login_network_failure_is_authentication_error() {
        // Nothing listens on this port once the listener is dropped.
        let addr = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };
        let config = KalshiClientConfig::default()
            .with_base_url(format!("http://{addr}"))
            .with_timeout_secs(2);

        let session = SessionManager::new(&config).unwrap();
        let err = session.get_token(&demo_credentials()).await.unwrap_err();
        assert!(matches!(
            err,
            KalshiError::Authentication {
                status_code: None,
                ..
            }
        ));
    }
}
