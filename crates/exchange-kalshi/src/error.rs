//! Error types for the Kalshi adapter.
//!
//! Every failure is local to one request. The only automatic recovery is the
//! dispatcher's single re-login after a 401; everything else is surfaced as
//! one of the variants below.

use serde::Serialize;
use thiserror::Error;

/// Errors that can occur when talking to Kalshi.
#[derive(Debug, Error)]
pub enum KalshiError {
    /// The login exchange failed.
    #[error("authentication error{}: {message}", fmt_status(.status_code))]
    Authentication {
        /// HTTP status of the login response, if one was received.
        status_code: Option<u16>,
        /// Underlying cause.
        message: String,
    },

    /// A live request was rejected with 401.
    ///
    /// Consumed by the dispatcher's retry path and never returned by
    /// [`KalshiClient::send`](crate::KalshiClient::send).
    #[error("authorization expired: {message}")]
    AuthorizationExpired {
        /// Message from the rejected response.
        message: String,
    },

    /// Remote failure, transport failure or undecodable response.
    #[error("API error{}: {message}", fmt_status(.status_code))]
    Api {
        /// Upstream HTTP status, absent for transport failures.
        status_code: Option<u16>,
        /// Upstream message, verbatim.
        message: String,
    },

    /// Caller-supplied input could not be used. No request was sent.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A page fetch failed during pagination. Items from earlier pages are
    /// discarded.
    #[error("pagination aborted at page {page}: {source}")]
    Aggregation {
        /// 1-based number of the page that failed.
        page: usize,
        /// Failure of that page.
        #[source]
        source: Box<KalshiError>,
    },

    /// Invalid client configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
}

fn fmt_status(status_code: &Option<u16>) -> String {
    status_code.map(|c| format!(" ({c})")).unwrap_or_default()
}

impl KalshiError {
    /// Creates an API error from a status code and message.
    pub fn api(status_code: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status_code: Some(status_code),
            message: message.into(),
        }
    }

    /// Creates an API error for a failure with no HTTP status.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Api {
            status_code: None,
            message: message.into(),
        }
    }

    /// Creates an authentication error.
    pub fn authentication(status_code: Option<u16>, message: impl Into<String>) -> Self {
        Self::Authentication {
            status_code,
            message: message.into(),
        }
    }

    /// Wraps a page failure into an aggregation error.
    pub fn aggregation(page: usize, source: KalshiError) -> Self {
        Self::Aggregation {
            page,
            source: Box::new(source),
        }
    }

    /// Returns the upstream HTTP status carried by this error, if any.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Authentication { status_code, .. } | Self::Api { status_code, .. } => {
                *status_code
            }
            Self::AuthorizationExpired { .. } => Some(401),
            Self::Aggregation { source, .. } => source.status_code(),
            Self::MalformedInput(_) | Self::Configuration(_) => None,
        }
    }

    /// Reclassifies the failure of a post-relogin retry.
    ///
    /// A second 401 becomes a plain API error; anything else is kept.
    #[must_use]
    pub(crate) fn into_retry_failure(self) -> Self {
        match self {
            Self::AuthorizationExpired { message } => Self::api(401, message),
            other => other,
        }
    }

    /// Converts the error into data that can be emitted inline as an item.
    #[must_use]
    pub fn to_error_data(&self) -> ErrorData {
        ErrorData {
            error: self.to_string(),
            status_code: self.status_code(),
        }
    }
}

impl From<reqwest::Error> for KalshiError {
    fn from(err: reqwest::Error) -> Self {
        let status_code = err.status().map(|s| s.as_u16());
        let message = if err.is_timeout() {
            format!("request timed out: {err}")
        } else if err.is_connect() {
            format!("connection failed: {err}")
        } else {
            err.to_string()
        };
        Self::Api {
            status_code,
            message,
        }
    }
}

impl From<serde_json::Error> for KalshiError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedInput(err.to_string())
    }
}

/// Extracts the upstream message from an error response body.
///
/// Kalshi errors look like `{"error": {"code": "...", "message": "..."}}`;
/// anything else is returned as trimmed text.
pub(crate) fn upstream_message(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "empty response body".to_string();
    }

    let parsed: Option<serde_json::Value> = serde_json::from_str(trimmed).ok();
    let message = parsed.as_ref().and_then(|value| {
        value
            .pointer("/error/message")
            .or_else(|| value.get("message"))
            .or_else(|| value.get("error"))
            .and_then(serde_json::Value::as_str)
            .map(str::to_owned)
    });

    message.unwrap_or_else(|| trimmed.to_string())
}

/// Serializable form of an error, embeddable as an output item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorData {
    /// Human-readable message.
    pub error: String,
    /// Upstream status code, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

/// Result type alias for Kalshi operations.
pub type Result<T> = std::result::Result<T, KalshiError>;
