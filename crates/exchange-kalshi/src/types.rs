//! Value types shared by the session, dispatcher, paginator and catalog.
//!
//! Kalshi quotes prices in cents (1-99); counts are whole contracts.

use crate::client::{KALSHI_DEMO_URL, KALSHI_PROD_URL};
use crate::error::{KalshiError, Result};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Environment
// =============================================================================

/// Which Kalshi deployment a call targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Real-money exchange.
    Production,
    /// Sandbox without real money.
    #[default]
    Demo,
}

impl Environment {
    /// Returns the versioned REST base URL for this environment.
    #[must_use]
    pub fn base_url(self) -> &'static str {
        match self {
            Self::Production => KALSHI_PROD_URL,
            Self::Demo => KALSHI_DEMO_URL,
        }
    }

    /// Returns the configuration string for this environment.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Demo => "demo",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = KalshiError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "demo" => Ok(Self::Demo),
            other => Err(KalshiError::Configuration(format!(
                "unknown environment: {other} (expected production or demo)"
            ))),
        }
    }
}

// =============================================================================
// Order Enums
// =============================================================================

/// Contract side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// YES contracts.
    Yes,
    /// NO contracts.
    No,
}

impl Side {
    /// Returns the API string representation.
    #[must_use]
    pub fn as_api_str(&self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
        }
    }

    /// Returns the body field that carries a limit price for this side.
    #[must_use]
    pub fn price_field(&self) -> &'static str {
        match self {
            Self::Yes => "yes_price",
            Self::No => "no_price",
        }
    }
}

/// Order action (buy or sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Buy contracts.
    Buy,
    /// Sell contracts.
    Sell,
}

impl Action {
    /// Returns the API string representation.
    #[must_use]
    pub fn as_api_str(&self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }
}

/// Order type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    /// Fill at best available.
    Market,
    /// Fill at the given price or better.
    Limit,
}

impl OrderType {
    /// Returns the API string representation.
    #[must_use]
    pub fn as_api_str(&self) -> &'static str {
        match self {
            Self::Market => "market",
            Self::Limit => "limit",
        }
    }
}

// =============================================================================
// Filter Enums
// =============================================================================

/// Market status accepted by the markets listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketStatus {
    /// Not yet open.
    Unopened,
    /// Open for trading.
    Open,
    /// Closed, awaiting settlement.
    Closed,
    /// Settled.
    Settled,
}

/// Event status accepted by the events listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// At least one market open.
    Open,
    /// All markets closed.
    Closed,
    /// All markets settled.
    Settled,
}

/// Order status accepted by the orders listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Resting on the book.
    Resting,
    /// Canceled.
    Canceled,
    /// Fully executed.
    Executed,
}

/// Settlement filter for the positions listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementStatus {
    /// Every position.
    All,
    /// Settled positions only.
    Settled,
    /// Unsettled positions only.
    Unsettled,
}

// =============================================================================
// Request Descriptor
// =============================================================================

/// Everything needed to issue one remote call.
///
/// `path` is relative to the versioned base URL (e.g. `/markets`).
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    /// HTTP method.
    pub method: Method,
    /// Path relative to the base URL.
    pub path: String,
    /// JSON object body.
    pub body: Map<String, Value>,
    /// Query parameters in insertion order.
    pub query: Vec<(String, String)>,
}

impl RequestDescriptor {
    /// Creates a descriptor with an empty body and no query.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: Map::new(),
            query: Vec::new(),
        }
    }

    /// Creates a GET descriptor.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Creates a POST descriptor.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Creates a DELETE descriptor.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Sets a body field.
    #[must_use]
    pub fn with_body_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.body.insert(key.into(), value.into());
        self
    }

    /// Adds a query parameter.
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Adds every truthy field of a serializable filter set as a query parameter.
    ///
    /// Nulls, empty strings, zeros, `false` and empty arrays are dropped.
    /// Arrays are joined with commas.
    ///
    /// # Errors
    /// Returns `MalformedInput` if the filters do not serialize to an object.
    pub fn with_query_filters<T: Serialize>(mut self, filters: &T) -> Result<Self> {
        for (key, value) in truthy_fields(filters)? {
            if let Some(rendered) = query_value(&value) {
                self.query.push((key, rendered));
            }
        }
        Ok(self)
    }

    /// Adds every truthy field of a serializable value to the body.
    ///
    /// # Errors
    /// Returns `MalformedInput` if the value does not serialize to an object.
    pub fn with_body_fields<T: Serialize>(mut self, fields: &T) -> Result<Self> {
        for (key, value) in truthy_fields(fields)? {
            self.body.insert(key, value);
        }
        Ok(self)
    }

    /// Sets a query parameter, replacing every existing value for `key`.
    pub fn set_query(&mut self, key: &str, value: impl ToString) {
        self.query.retain(|(k, _)| k != key);
        self.query.push((key.to_string(), value.to_string()));
    }

    /// Returns the first query value for `key`.
    #[must_use]
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if the body goes on the wire.
    ///
    /// Read-style methods (GET, DELETE) with no body fields send no body at
    /// all; every other request sends its JSON object, even when empty.
    #[must_use]
    pub fn sends_body(&self) -> bool {
        let read_style = self.method == Method::GET || self.method == Method::DELETE;
        !(read_style && self.body.is_empty())
    }
}

fn truthy_fields<T: Serialize>(value: &T) -> Result<Vec<(String, Value)>> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map.into_iter().filter(|(_, v)| is_truthy(v)).collect()),
        other => Err(KalshiError::MalformedInput(format!(
            "expected an object of fields, got {other}"
        ))),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}

fn query_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(query_value).collect();
            (!parts.is_empty()).then(|| parts.join(","))
        }
        other => Some(other.to_string()),
    }
}

// =============================================================================
// List Fields
// =============================================================================

/// Response field that carries the list payload of a listing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemsField {
    /// `markets`
    Markets,
    /// `events`
    Events,
    /// `series`
    Series,
    /// `orders`
    Orders,
    /// `positions`
    Positions,
    /// `market_positions`
    MarketPositions,
    /// `fills`
    Fills,
    /// `settlements`
    Settlements,
    /// `trades`
    Trades,
}

impl ItemsField {
    /// Fields tried, in order, when the caller has no explicit mapping.
    pub const KNOWN: [ItemsField; 5] = [
        Self::Markets,
        Self::Events,
        Self::Orders,
        Self::Positions,
        Self::Fills,
    ];

    /// Returns the JSON key.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Markets => "markets",
            Self::Events => "events",
            Self::Series => "series",
            Self::Orders => "orders",
            Self::Positions => "positions",
            Self::MarketPositions => "market_positions",
            Self::Fills => "fills",
            Self::Settlements => "settlements",
            Self::Trades => "trades",
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
