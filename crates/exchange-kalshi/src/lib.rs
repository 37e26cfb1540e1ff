//! Kalshi prediction-market REST adapter.
//!
//! This crate provides:
//! - Email/password login with a cached, locally expiring bearer token
//! - A rate-limited request dispatcher that re-authenticates once on 401
//! - Cursor-following pagination with all-or-nothing aggregation
//! - A typed catalog of market, event, series, order, portfolio and exchange
//!   operations, and a sequential batch runner over it
//!
//! # Example
//!
//! ```ignore
//! use kalshi_bridge::{Credentials, Environment, KalshiClient, KalshiClientConfig, Operation};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let credentials = Credentials::from_env(Environment::Demo, &Default::default())?;
//!     let client = KalshiClient::with_new_session(KalshiClientConfig::default(), credentials)?;
//!
//!     let operation = Operation::from_value(json!({
//!         "resource": "market",
//!         "operation": "getAll",
//!         "filters": { "status": "open", "limit": 200 },
//!         "returnAll": true
//!     }))?;
//!     let markets = operation.execute(&client).await?;
//!     println!("Found {} open markets", markets.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Authentication
//!
//! `POST /login` exchanges an email and password for a bearer token. Set:
//!
//! - `KALSHI_EMAIL`: account email
//! - `KALSHI_PASSWORD`: account password
//!
//! Tokens are cached for 55 minutes and renewed on demand.
//!
//! # API Endpoints
//!
//! - `GET /markets`, `/markets/{ticker}`, `/markets/{ticker}/history`, `/markets/{ticker}/orderbook`,
//!   `/markets/trades`
//! - `GET /events`, `/events/{event_ticker}`, `/events/{event_ticker}/metadata`
//! - `GET /series`, `/series/{series_ticker}`, and market/event candlesticks under it
//! - `POST /portfolio/orders`, `/portfolio/orders/{id}/amend`, `/portfolio/orders/{id}/decrease`
//! - `GET|DELETE /portfolio/orders/{id}`, `POST|DELETE /portfolio/orders/batched`
//! - `GET /portfolio/balance`, `/portfolio/positions`, `/portfolio/fills`, `/portfolio/settlements`
//! - `GET /exchange/status`, `/exchange/announcements`, `/exchange/schedule`

pub mod auth;
pub mod batch;
pub mod catalog;
pub mod client;
pub mod clock;
pub mod error;
pub mod pagination;
pub mod types;

#[cfg(test)]
mod test_support;

// Re-export main types for convenience
pub use auth::{CredentialEnvVars, Credentials, SessionManager};
pub use batch::{parse_items, BatchRunner};
pub use catalog::{validate_path_segment, Operation, OrdersInput};
pub use client::{KalshiClient, KalshiClientConfig, KALSHI_DEMO_URL, KALSHI_PROD_URL};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ErrorData, KalshiError, Result};
pub use pagination::Paginator;
pub use types::{
    Action, Environment, EventStatus, ItemsField, MarketStatus, OrderStatus, OrderType,
    RequestDescriptor, SettlementStatus, Side,
};
