//! Kalshi REST request dispatcher.
//!
//! Every call goes through [`KalshiClient::send`]: it takes a bearer token
//! from the shared [`SessionManager`], waits on the rate limiter, and issues
//! the request. A 401 triggers exactly one re-login and resend.
//!
//! # Example
//!
//! ```ignore
//! use kalshi_bridge::{Credentials, Environment, KalshiClient, KalshiClientConfig, RequestDescriptor};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let credentials = Credentials::new(Environment::Demo, "me@example.com", "secret");
//!     let client = KalshiClient::with_new_session(KalshiClientConfig::default(), credentials)?;
//!
//!     let status = client.send(&RequestDescriptor::get("/exchange/status")).await?;
//!     println!("{status}");
//!
//!     Ok(())
//! }
//! ```

use crate::auth::{Credentials, SessionManager};
use crate::error::{upstream_message, KalshiError, Result};
use crate::pagination::Paginator;
use crate::types::{Environment, ItemsField, RequestDescriptor};
use governor::{Quota, RateLimiter};
use nonzero_ext::nonzero;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::num::NonZeroU32;
use std::sync::Arc;

// =============================================================================
// Constants
// =============================================================================

/// Kalshi production API base URL.
pub const KALSHI_PROD_URL: &str = "https://api.elections.kalshi.com/trade-api/v2";

/// Kalshi demo API base URL.
pub const KALSHI_DEMO_URL: &str = "https://demo-api.kalshi.co/trade-api/v2";

/// Default local token lifetime: 55 minutes for a 60-minute server token.
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 55 * 60;

/// Upper bound on the local token lifetime: the server token's 60 minutes.
pub const MAX_TOKEN_TTL_SECS: u64 = 60 * 60;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the Kalshi client and its session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KalshiClientConfig {
    /// Replaces the environment's base URL when set (proxies, tests).
    pub base_url: Option<String>,

    /// Requests per minute allowed by the local throttle.
    pub requests_per_minute: NonZeroU32,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Local lifetime of a login token in seconds.
    pub token_ttl_secs: u64,

    /// Upper bound on a whole pagination run, in seconds.
    pub pagination_timeout_secs: Option<u64>,
}

impl Default for KalshiClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            requests_per_minute: nonzero!(600u32),
            timeout_secs: 30,
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            pagination_timeout_secs: None,
        }
    }
}

impl KalshiClientConfig {
    /// Sets the base URL override.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the rate limit.
    #[must_use]
    pub fn with_rate_limit(mut self, requests_per_minute: NonZeroU32) -> Self {
        self.requests_per_minute = requests_per_minute;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Sets the local token lifetime.
    #[must_use]
    pub fn with_token_ttl_secs(mut self, secs: u64) -> Self {
        self.token_ttl_secs = secs;
        self
    }

    /// Sets the total pagination timeout.
    #[must_use]
    pub fn with_pagination_timeout_secs(mut self, secs: u64) -> Self {
        self.pagination_timeout_secs = Some(secs);
        self
    }

    /// Returns the base URL for `environment`, honoring the override.
    #[must_use]
    pub fn base_url_for(&self, environment: Environment) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => environment.base_url().to_string(),
        }
    }

    /// Returns the token lifetime as a chrono duration.
    #[must_use]
    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::from_std(std::time::Duration::from_secs(self.token_ttl_secs))
            .unwrap_or(chrono::Duration::MAX)
    }
}

// =============================================================================
// KalshiClient
// =============================================================================

type DirectRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Authenticated Kalshi REST dispatcher for one set of credentials.
pub struct KalshiClient {
    /// Configuration.
    config: KalshiClientConfig,

    /// Account this client acts for.
    credentials: Credentials,

    /// Resolved base URL.
    base_url: String,

    /// HTTP client.
    http: Client,

    /// Rate limiter.
    rate_limiter: Arc<DirectRateLimiter>,

    /// Shared token cache.
    session: Arc<SessionManager>,
}

impl std::fmt::Debug for KalshiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KalshiClient")
            .field("base_url", &self.base_url)
            .field("environment", &self.credentials.environment)
            .field("requests_per_minute", &self.config.requests_per_minute)
            .finish_non_exhaustive()
    }
}

impl KalshiClient {
    /// Creates a client that shares `session` with other clients.
    ///
    /// # Errors
    /// Returns `Configuration` if the HTTP client cannot be built.
    pub fn new(
        config: KalshiClientConfig,
        credentials: Credentials,
        session: Arc<SessionManager>,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| KalshiError::Configuration(format!("failed to build HTTP client: {e}")))?;

        let quota = Quota::per_minute(config.requests_per_minute);
        let rate_limiter = Arc::new(RateLimiter::direct(quota));
        let base_url = config.base_url_for(credentials.environment);

        Ok(Self {
            config,
            credentials,
            base_url,
            http,
            rate_limiter,
            session,
        })
    }

    /// Creates a client with a session of its own.
    ///
    /// # Errors
    /// Returns `Configuration` if the configuration is invalid.
    pub fn with_new_session(config: KalshiClientConfig, credentials: Credentials) -> Result<Self> {
        let session = Arc::new(SessionManager::new(&config)?);
        Self::new(config, credentials, session)
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &KalshiClientConfig {
        &self.config
    }

    /// Returns the credentials this client acts for.
    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Returns the shared session.
    #[must_use]
    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    /// Sends one authenticated request and returns the decoded JSON body.
    ///
    /// On 401 the cached token is invalidated, a fresh login is performed and
    /// the identical request is resent once. A failure of that resend is
    /// surfaced as `Api`; no other status is retried.
    ///
    /// # Errors
    /// - `Authentication` if a login fails
    /// - `Api` for every failed response or transport error
    pub async fn send(&self, request: &RequestDescriptor) -> Result<Value> {
        let token = self.session.get_token(&self.credentials).await?;

        match self.execute(request, &token).await {
            Err(KalshiError::AuthorizationExpired { message }) => {
                tracing::warn!(
                    method = %request.method,
                    path = %request.path,
                    %message,
                    "request unauthorized, logging in again"
                );
                self.session.invalidate();
                let token = self.session.get_token(&self.credentials).await?;
                self.execute(request, &token)
                    .await
                    .map_err(KalshiError::into_retry_failure)
            }
            other => other,
        }
    }

    /// Follows the cursor of a listing and returns every item.
    ///
    /// # Errors
    /// Returns `Aggregation` if any page fails.
    pub async fn collect_all(
        &self,
        request: &RequestDescriptor,
        fields: &[ItemsField],
    ) -> Result<Vec<Value>> {
        self.paginator().collect_all(request, fields).await
    }

    /// Returns a paginator bound to this client.
    #[must_use]
    pub fn paginator(&self) -> Paginator<'_> {
        Paginator::new(self)
    }

    /// Fetches the exchange status to verify credentials and connectivity.
    ///
    /// # Errors
    /// Returns error if login or the status request fails.
    pub async fn check_connection(&self) -> Result<Value> {
        self.send(&RequestDescriptor::get("/exchange/status")).await
    }

    /// Waits for the rate limiter and issues a single attempt.
    async fn execute(&self, request: &RequestDescriptor, token: &SecretString) -> Result<Value> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}{}", self.base_url, request.path);

        tracing::debug!(
            "{} {} query_params={} body={}",
            request.method,
            url,
            request.query.len(),
            request.sends_body()
        );

        let mut builder = self
            .http
            .request(request.method.clone(), &url)
            .header("Accept", "application/json")
            .bearer_auth(token.expose_secret());

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if request.sends_body() {
            builder = builder.json(&request.body);
        }

        let response = builder.send().await?;
        self.handle_response(response).await
    }

    /// Handles API response, converting errors appropriately.
    async fn handle_response(&self, response: reqwest::Response) -> Result<Value> {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            let text = response.text().await.unwrap_or_default();
            return Err(KalshiError::AuthorizationExpired {
                message: upstream_message(&text),
            });
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(KalshiError::api(status.as_u16(), upstream_message(&text)));
        }

        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Object(Map::new()));
        }

        serde_json::from_slice(&bytes).map_err(|e| {
            KalshiError::api(status.as_u16(), format!("invalid JSON response: {e}"))
        })
    }
}
