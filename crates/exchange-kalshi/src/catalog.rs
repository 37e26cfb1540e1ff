//! Typed catalog of Kalshi operations.
//!
//! An [`Operation`] is deserialized from a flat JSON object naming a
//! `resource` and an `operation`, e.g.
//!
//! ```json
//! { "resource": "market", "operation": "getOrderbook", "ticker": "KXBTC-24DEC31", "depth": 10 }
//! ```
//!
//! Each operation knows its request shape ([`Operation::request`]) and, for
//! listings, the response field carrying its items. Input problems are
//! reported as `MalformedInput` before anything is sent.

use crate::client::KalshiClient;
use crate::error::{KalshiError, Result};
use crate::types::{
    Action, EventStatus, ItemsField, MarketStatus, OrderStatus, OrderType, RequestDescriptor,
    SettlementStatus, Side,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// Path Validation
// =============================================================================

/// Maximum length of a market, event or series ticker.
pub const MAX_TICKER_LEN: usize = 64;

/// Maximum length of an order identifier.
pub const MAX_IDENTIFIER_LEN: usize = 128;

/// Validates a value interpolated into a URL path.
///
/// Accepts ASCII alphanumerics, `-`, `_` and `.`; rejects empty values,
/// traversal sequences and values longer than `max_len`.
///
/// # Errors
/// Returns `MalformedInput` describing the violation.
pub fn validate_path_segment<'a>(kind: &str, value: &'a str, max_len: usize) -> Result<&'a str> {
    if value.is_empty() {
        return Err(KalshiError::MalformedInput(format!("{kind} cannot be empty")));
    }

    if value.contains("..") || value.contains('/') || value.contains('\\') {
        return Err(KalshiError::MalformedInput(format!(
            "invalid {kind}: contains forbidden characters: {value}"
        )));
    }

    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(KalshiError::MalformedInput(format!(
            "invalid {kind}: must contain only alphanumeric, hyphen, underscore or dot: {value}"
        )));
    }

    if value.len() > max_len {
        return Err(KalshiError::MalformedInput(format!(
            "invalid {kind}: exceeds maximum length of {max_len}: {}",
            value.len()
        )));
    }

    Ok(value)
}

fn ticker(value: &str) -> Result<&str> {
    validate_path_segment("ticker", value, MAX_TICKER_LEN)
}

fn order_id(value: &str) -> Result<&str> {
    validate_path_segment("order id", value, MAX_IDENTIFIER_LEN)
}

// =============================================================================
// Filters
// =============================================================================

/// Filters for `GET /markets`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarketFilters {
    pub event_ticker: Option<String>,
    pub series_ticker: Option<String>,
    pub status: Option<MarketStatus>,
    pub tickers: Vec<String>,
    pub min_close_ts: Option<i64>,
    pub max_close_ts: Option<i64>,
    pub limit: Option<u32>,
    pub cursor: Option<String>,
}

/// Filters for `GET /events`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EventFilters {
    pub series_ticker: Option<String>,
    pub status: Option<EventStatus>,
    pub with_nested_markets: bool,
    pub limit: Option<u32>,
    pub cursor: Option<String>,
}

/// Filters for `GET /series`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeriesFilters {
    pub category: Option<String>,
    pub tags: Option<String>,
}

/// Filters for `GET /markets/trades`, besides the ticker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TradeFilters {
    pub min_ts: Option<i64>,
    pub max_ts: Option<i64>,
    pub limit: Option<u32>,
    pub cursor: Option<String>,
}

/// Filters for `GET /markets/{ticker}/history`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HistoryFilters {
    pub min_ts: Option<i64>,
    pub max_ts: Option<i64>,
    pub limit: Option<u32>,
    pub cursor: Option<String>,
}

/// Filters for `GET /portfolio/orders`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OrderFilters {
    pub ticker: Option<String>,
    pub event_ticker: Option<String>,
    pub status: Option<OrderStatus>,
    pub min_ts: Option<i64>,
    pub max_ts: Option<i64>,
    pub limit: Option<u32>,
    pub cursor: Option<String>,
}

/// Filters for `GET /portfolio/positions`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PositionFilters {
    pub ticker: Option<String>,
    pub event_ticker: Option<String>,
    pub count_filter: Option<String>,
    pub settlement_status: Option<SettlementStatus>,
    pub limit: Option<u32>,
    pub cursor: Option<String>,
}

/// Filters for `GET /portfolio/fills`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FillFilters {
    pub ticker: Option<String>,
    pub order_id: Option<String>,
    pub min_ts: Option<i64>,
    pub max_ts: Option<i64>,
    pub limit: Option<u32>,
    pub cursor: Option<String>,
}

/// Filters for `GET /portfolio/settlements`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SettlementFilters {
    pub ticker: Option<String>,
    pub event_ticker: Option<String>,
    pub min_ts: Option<i64>,
    pub max_ts: Option<i64>,
    pub limit: Option<u32>,
    pub cursor: Option<String>,
}

/// Optional fields of an order, sent only when set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OrderOptions {
    pub expiration_ts: Option<i64>,
    pub client_order_id: Option<String>,
    pub sell_position_floor: Option<u32>,
    pub buy_max_cost: Option<u64>,
}

/// Candlestick window, in Unix seconds and minutes per candle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandlestickRange {
    pub start_ts: i64,
    pub end_ts: i64,
    pub period_interval: u32,
}

impl CandlestickRange {
    fn apply(&self, request: RequestDescriptor) -> Result<RequestDescriptor> {
        if self.end_ts < self.start_ts {
            return Err(KalshiError::MalformedInput(format!(
                "candlestick range ends before it starts: {} < {}",
                self.end_ts, self.start_ts
            )));
        }
        Ok(request
            .with_query("start_ts", self.start_ts)
            .with_query("end_ts", self.end_ts)
            .with_query("period_interval", self.period_interval))
    }
}

// =============================================================================
// Batch Inputs
// =============================================================================

/// Orders for a batch create: a JSON array, or a string holding one.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OrdersInput {
    /// Raw JSON text.
    Json(String),
    /// Already-structured orders.
    List(Vec<Value>),
}

impl OrdersInput {
    /// Returns the orders as a non-empty list of objects.
    ///
    /// # Errors
    /// Returns `MalformedInput` for unparseable text, non-array JSON, an
    /// empty list, or entries that are not objects.
    pub fn parse(&self) -> Result<Vec<Value>> {
        let orders = match self {
            Self::List(orders) => orders.clone(),
            Self::Json(text) => match serde_json::from_str::<Value>(text) {
                Ok(Value::Array(orders)) => orders,
                Ok(other) => {
                    return Err(KalshiError::MalformedInput(format!(
                        "orders must be a JSON array, got {other}"
                    )))
                }
                Err(e) => {
                    return Err(KalshiError::MalformedInput(format!(
                        "orders is not valid JSON: {e}"
                    )))
                }
            },
        };

        if orders.is_empty() {
            return Err(KalshiError::MalformedInput("orders cannot be empty".to_string()));
        }
        if let Some(position) = orders.iter().position(|o| !o.is_object()) {
            return Err(KalshiError::MalformedInput(format!(
                "order at index {position} is not an object"
            )));
        }

        Ok(orders)
    }
}

/// Splits a comma-separated id list, trimming entries and dropping empties.
///
/// # Errors
/// Returns `MalformedInput` if no id remains or an id is not a valid identifier.
pub fn parse_order_ids(text: &str) -> Result<Vec<String>> {
    let ids: Vec<String> = text
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| order_id(id).map(str::to_owned))
        .collect::<Result<_>>()?;

    if ids.is_empty() {
        return Err(KalshiError::MalformedInput("orderIds cannot be empty".to_string()));
    }
    Ok(ids)
}

// =============================================================================
// Operations
// =============================================================================

/// One callable operation, tagged by `resource` and `operation`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "resource", rename_all = "camelCase")]
pub enum Operation {
    Market(MarketOperation),
    Event(EventOperation),
    Series(SeriesOperation),
    Order(OrderOperation),
    Position(PositionOperation),
    Portfolio(PortfolioOperation),
    Exchange(ExchangeOperation),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum MarketOperation {
    GetAll {
        #[serde(default)]
        filters: MarketFilters,
        #[serde(default)]
        return_all: bool,
    },
    Get {
        ticker: String,
    },
    GetHistory {
        ticker: String,
        #[serde(default)]
        filters: HistoryFilters,
    },
    GetOrderbook {
        ticker: String,
        #[serde(default)]
        depth: Option<u32>,
    },
    GetCandlesticks {
        series_ticker: String,
        ticker: String,
        #[serde(flatten)]
        range: CandlestickRange,
    },
    GetTrades {
        ticker: String,
        #[serde(default)]
        filters: TradeFilters,
        #[serde(default)]
        return_all: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum EventOperation {
    GetAll {
        #[serde(default)]
        filters: EventFilters,
        #[serde(default)]
        return_all: bool,
    },
    Get {
        event_ticker: String,
        #[serde(default)]
        with_nested_markets: bool,
    },
    GetMetadata {
        event_ticker: String,
    },
    GetCandlesticks {
        series_ticker: String,
        event_ticker: String,
        #[serde(flatten)]
        range: CandlestickRange,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SeriesOperation {
    GetAll {
        #[serde(default)]
        filters: SeriesFilters,
    },
    Get {
        series_ticker: String,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum OrderOperation {
    Create {
        ticker: String,
        action: Action,
        side: Side,
        #[serde(rename = "type")]
        order_type: OrderType,
        count: u32,
        /// Limit price in cents; required for limit orders.
        #[serde(default)]
        price: Option<u32>,
        #[serde(default)]
        options: OrderOptions,
    },
    GetAll {
        #[serde(default)]
        filters: OrderFilters,
        #[serde(default)]
        return_all: bool,
    },
    Get {
        order_id: String,
    },
    Cancel {
        order_id: String,
    },
    Amend {
        order_id: String,
        ticker: String,
        action: Action,
        side: Side,
        count: u32,
        price: u32,
        #[serde(default)]
        client_order_id: Option<String>,
        #[serde(default)]
        updated_client_order_id: Option<String>,
    },
    Decrease {
        order_id: String,
        reduce_by: u32,
    },
    BatchCreate {
        orders: OrdersInput,
    },
    BatchCancel {
        order_ids: String,
    },
}

/// Positions as a resource of their own; same endpoint as
/// `portfolio.getPositions`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PositionOperation {
    GetAll {
        #[serde(default)]
        filters: PositionFilters,
        #[serde(default)]
        return_all: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PortfolioOperation {
    GetBalance,
    GetPositions {
        #[serde(default)]
        filters: PositionFilters,
        #[serde(default)]
        return_all: bool,
    },
    GetFills {
        #[serde(default)]
        filters: FillFilters,
        #[serde(default)]
        return_all: bool,
    },
    GetSettlements {
        #[serde(default)]
        filters: SettlementFilters,
        #[serde(default)]
        return_all: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase")]
pub enum ExchangeOperation {
    GetStatus,
    GetAnnouncements,
    GetSchedule,
}

impl Operation {
    /// Parses an operation from its JSON form.
    ///
    /// # Errors
    /// Returns `MalformedInput` for unknown resources, operations or fields.
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Returns `resource.operation`, for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Market(op) => match op {
                MarketOperation::GetAll { .. } => "market.getAll",
                MarketOperation::Get { .. } => "market.get",
                MarketOperation::GetHistory { .. } => "market.getHistory",
                MarketOperation::GetOrderbook { .. } => "market.getOrderbook",
                MarketOperation::GetCandlesticks { .. } => "market.getCandlesticks",
                MarketOperation::GetTrades { .. } => "market.getTrades",
            },
            Self::Event(op) => match op {
                EventOperation::GetAll { .. } => "event.getAll",
                EventOperation::Get { .. } => "event.get",
                EventOperation::GetMetadata { .. } => "event.getMetadata",
                EventOperation::GetCandlesticks { .. } => "event.getCandlesticks",
            },
            Self::Series(op) => match op {
                SeriesOperation::GetAll { .. } => "series.getAll",
                SeriesOperation::Get { .. } => "series.get",
            },
            Self::Order(op) => match op {
                OrderOperation::Create { .. } => "order.create",
                OrderOperation::GetAll { .. } => "order.getAll",
                OrderOperation::Get { .. } => "order.get",
                OrderOperation::Cancel { .. } => "order.cancel",
                OrderOperation::Amend { .. } => "order.amend",
                OrderOperation::Decrease { .. } => "order.decrease",
                OrderOperation::BatchCreate { .. } => "order.batchCreate",
                OrderOperation::BatchCancel { .. } => "order.batchCancel",
            },
            Self::Position(PositionOperation::GetAll { .. }) => "position.getAll",
            Self::Portfolio(op) => match op {
                PortfolioOperation::GetBalance => "portfolio.getBalance",
                PortfolioOperation::GetPositions { .. } => "portfolio.getPositions",
                PortfolioOperation::GetFills { .. } => "portfolio.getFills",
                PortfolioOperation::GetSettlements { .. } => "portfolio.getSettlements",
            },
            Self::Exchange(op) => match op {
                ExchangeOperation::GetStatus => "exchange.getStatus",
                ExchangeOperation::GetAnnouncements => "exchange.getAnnouncements",
                ExchangeOperation::GetSchedule => "exchange.getSchedule",
            },
        }
    }

    /// Returns the response field carrying the items of a listing.
    #[must_use]
    pub fn items_field(&self) -> Option<ItemsField> {
        match self {
            Self::Market(MarketOperation::GetAll { .. }) => Some(ItemsField::Markets),
            Self::Market(MarketOperation::GetTrades { .. }) => Some(ItemsField::Trades),
            Self::Event(EventOperation::GetAll { .. }) => Some(ItemsField::Events),
            Self::Series(SeriesOperation::GetAll { .. }) => Some(ItemsField::Series),
            Self::Order(OrderOperation::GetAll { .. }) => Some(ItemsField::Orders),
            Self::Position(PositionOperation::GetAll { .. })
            | Self::Portfolio(PortfolioOperation::GetPositions { .. }) => {
                Some(ItemsField::MarketPositions)
            }
            Self::Portfolio(PortfolioOperation::GetFills { .. }) => Some(ItemsField::Fills),
            Self::Portfolio(PortfolioOperation::GetSettlements { .. }) => {
                Some(ItemsField::Settlements)
            }
            _ => None,
        }
    }

    /// Returns true if every page should be fetched and flattened.
    #[must_use]
    pub fn return_all(&self) -> bool {
        match self {
            Self::Market(MarketOperation::GetAll { return_all, .. })
            | Self::Market(MarketOperation::GetTrades { return_all, .. })
            | Self::Event(EventOperation::GetAll { return_all, .. })
            | Self::Order(OrderOperation::GetAll { return_all, .. })
            | Self::Position(PositionOperation::GetAll { return_all, .. })
            | Self::Portfolio(PortfolioOperation::GetPositions { return_all, .. })
            | Self::Portfolio(PortfolioOperation::GetFills { return_all, .. })
            | Self::Portfolio(PortfolioOperation::GetSettlements { return_all, .. }) => *return_all,
            _ => false,
        }
    }

    /// Builds the request for this operation.
    ///
    /// # Errors
    /// Returns `MalformedInput` if an argument is unusable.
    pub fn request(&self) -> Result<RequestDescriptor> {
        match self {
            Self::Market(op) => op.request(),
            Self::Event(op) => op.request(),
            Self::Series(op) => op.request(),
            Self::Order(op) => op.request(),
            Self::Position(PositionOperation::GetAll { filters, .. }) => {
                RequestDescriptor::get("/portfolio/positions").with_query_filters(filters)
            }
            Self::Portfolio(op) => op.request(),
            Self::Exchange(op) => Ok(op.request()),
        }
    }

    /// Runs the operation and returns its outputs.
    ///
    /// A paginated listing yields one output per item; everything else yields
    /// the response as a single output.
    ///
    /// # Errors
    /// Returns `MalformedInput` before sending, or any dispatch error.
    pub async fn execute(&self, client: &KalshiClient) -> Result<Vec<Value>> {
        let request = self.request()?;

        tracing::debug!(operation = self.name(), path = %request.path, "executing operation");

        match self.items_field() {
            Some(field) if self.return_all() => client.collect_all(&request, &[field]).await,
            _ => Ok(vec![client.send(&request).await?]),
        }
    }
}

impl MarketOperation {
    fn request(&self) -> Result<RequestDescriptor> {
        match self {
            Self::GetAll { filters, .. } => {
                RequestDescriptor::get("/markets").with_query_filters(filters)
            }
            Self::Get { ticker: t } => Ok(RequestDescriptor::get(format!("/markets/{}", ticker(t)?))),
            Self::GetHistory { ticker: t, filters } => {
                RequestDescriptor::get(format!("/markets/{}/history", ticker(t)?))
                    .with_query_filters(filters)
            }
            Self::GetOrderbook { ticker: t, depth } => {
                let mut request = RequestDescriptor::get(format!("/markets/{}/orderbook", ticker(t)?));
                if let Some(depth) = depth.filter(|d| *d > 0) {
                    request = request.with_query("depth", depth);
                }
                Ok(request)
            }
            Self::GetCandlesticks {
                series_ticker,
                ticker: t,
                range,
            } => range.apply(RequestDescriptor::get(format!(
                "/series/{}/markets/{}/candlesticks",
                ticker(series_ticker)?,
                ticker(t)?
            ))),
            Self::GetTrades {
                ticker: t,
                filters,
                ..
            } => RequestDescriptor::get("/markets/trades")
                .with_query("ticker", ticker(t)?)
                .with_query_filters(filters),
        }
    }
}

impl EventOperation {
    fn request(&self) -> Result<RequestDescriptor> {
        match self {
            Self::GetAll { filters, .. } => {
                RequestDescriptor::get("/events").with_query_filters(filters)
            }
            Self::Get {
                event_ticker,
                with_nested_markets,
            } => {
                let mut request = RequestDescriptor::get(format!("/events/{}", ticker(event_ticker)?));
                if *with_nested_markets {
                    request = request.with_query("with_nested_markets", true);
                }
                Ok(request)
            }
            Self::GetMetadata { event_ticker } => Ok(RequestDescriptor::get(format!(
                "/events/{}/metadata",
                ticker(event_ticker)?
            ))),
            Self::GetCandlesticks {
                series_ticker,
                event_ticker,
                range,
            } => range.apply(RequestDescriptor::get(format!(
                "/series/{}/events/{}/candlesticks",
                ticker(series_ticker)?,
                ticker(event_ticker)?
            ))),
        }
    }
}

impl SeriesOperation {
    fn request(&self) -> Result<RequestDescriptor> {
        match self {
            Self::GetAll { filters } => RequestDescriptor::get("/series").with_query_filters(filters),
            Self::Get { series_ticker } => Ok(RequestDescriptor::get(format!(
                "/series/{}",
                ticker(series_ticker)?
            ))),
        }
    }
}

impl OrderOperation {
    fn request(&self) -> Result<RequestDescriptor> {
        match self {
            Self::Create {
                ticker: t,
                action,
                side,
                order_type,
                count,
                price,
                options,
            } => {
                let mut request = RequestDescriptor::post("/portfolio/orders")
                    .with_body_field("ticker", ticker(t)?)
                    .with_body_field("action", action.as_api_str())
                    .with_body_field("side", side.as_api_str())
                    .with_body_field("type", order_type.as_api_str())
                    .with_body_field("count", *count);

                if *order_type == OrderType::Limit {
                    let price = price.ok_or_else(|| {
                        KalshiError::MalformedInput("limit orders require a price".to_string())
                    })?;
                    request = request.with_body_field(side.price_field(), price);
                }

                request.with_body_fields(options)
            }
            Self::GetAll { filters, .. } => {
                RequestDescriptor::get("/portfolio/orders").with_query_filters(filters)
            }
            Self::Get { order_id: id } => Ok(RequestDescriptor::get(format!(
                "/portfolio/orders/{}",
                order_id(id)?
            ))),
            Self::Cancel { order_id: id } => Ok(RequestDescriptor::delete(format!(
                "/portfolio/orders/{}",
                order_id(id)?
            ))),
            Self::Amend {
                order_id: id,
                ticker: t,
                action,
                side,
                count,
                price,
                client_order_id,
                updated_client_order_id,
            } => {
                let optional = serde_json::json!({
                    "client_order_id": client_order_id,
                    "updated_client_order_id": updated_client_order_id,
                });
                RequestDescriptor::post(format!("/portfolio/orders/{}/amend", order_id(id)?))
                    .with_body_field("ticker", ticker(t)?)
                    .with_body_field("action", action.as_api_str())
                    .with_body_field("side", side.as_api_str())
                    .with_body_field("count", *count)
                    .with_body_field(side.price_field(), *price)
                    .with_body_fields(&optional)
            }
            Self::Decrease {
                order_id: id,
                reduce_by,
            } => Ok(RequestDescriptor::post(format!(
                "/portfolio/orders/{}/decrease",
                order_id(id)?
            ))
            .with_body_field("reduce_by", *reduce_by)),
            Self::BatchCreate { orders } => Ok(RequestDescriptor::post("/portfolio/orders/batched")
                .with_body_field("orders", orders.parse()?)),
            Self::BatchCancel { order_ids } => {
                Ok(RequestDescriptor::delete("/portfolio/orders/batched")
                    .with_body_field("ids", parse_order_ids(order_ids)?))
            }
        }
    }
}

impl PortfolioOperation {
    fn request(&self) -> Result<RequestDescriptor> {
        match self {
            Self::GetBalance => Ok(RequestDescriptor::get("/portfolio/balance")),
            Self::GetPositions { filters, .. } => {
                RequestDescriptor::get("/portfolio/positions").with_query_filters(filters)
            }
            Self::GetFills { filters, .. } => {
                RequestDescriptor::get("/portfolio/fills").with_query_filters(filters)
            }
            Self::GetSettlements { filters, .. } => {
                RequestDescriptor::get("/portfolio/settlements").with_query_filters(filters)
            }
        }
    }
}

impl ExchangeOperation {
    fn request(&self) -> RequestDescriptor {
        match self {
            Self::GetStatus => RequestDescriptor::get("/exchange/status"),
            Self::GetAnnouncements => RequestDescriptor::get("/exchange/announcements"),
            Self::GetSchedule => RequestDescriptor::get("/exchange/schedule"),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
