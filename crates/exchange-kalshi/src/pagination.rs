//! Cursor-following aggregation of Kalshi listing endpoints.
//!
//! Kalshi listings return a page of items plus a `cursor` that names the next
//! page. [`Paginator::collect_all`] keeps fetching until the cursor is
//! missing or empty and returns every item in arrival order. Any page failure
//! aborts the whole run and nothing collected so far is returned.

use crate::client::KalshiClient;
use crate::error::{KalshiError, Result};
use crate::types::{ItemsField, RequestDescriptor};
use serde_json::Value;
use std::time::Duration;
use tokio::time::Instant;

/// Query parameter and response field carrying the continuation token.
const CURSOR_FIELD: &str = "cursor";

/// Collects every page of a listing through a [`KalshiClient`].
#[derive(Debug)]
pub struct Paginator<'a> {
    client: &'a KalshiClient,
    timeout: Option<Duration>,
}

impl<'a> Paginator<'a> {
    /// Creates a paginator using the client's configured total timeout.
    #[must_use]
    pub fn new(client: &'a KalshiClient) -> Self {
        Self {
            client,
            timeout: client
                .config()
                .pagination_timeout_secs
                .map(Duration::from_secs),
        }
    }

    /// Bounds the whole run, across all pages.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Fetches every page of `request` and concatenates the list payloads.
    ///
    /// From each page the first of `fields` holding an array is taken; with
    /// an empty `fields` the [`ItemsField::KNOWN`] list is tried. A page
    /// with none of them contributes the whole response as one item.
    ///
    /// # Errors
    /// Returns `Aggregation` naming the failed page. Earlier pages are dropped.
    pub async fn collect_all(
        &self,
        request: &RequestDescriptor,
        fields: &[ItemsField],
    ) -> Result<Vec<Value>> {
        let fields = if fields.is_empty() {
            &ItemsField::KNOWN[..]
        } else {
            fields
        };
        let deadline = self.timeout.map(|t| Instant::now() + t);

        let mut request = request.clone();
        let mut items = Vec::new();
        let mut page = 0usize;

        loop {
            page += 1;

            let response = self.fetch_page(&request, deadline).await.map_err(|e| {
                tracing::warn!(path = %request.path, page, error = %e, "pagination aborted");
                KalshiError::aggregation(page, e)
            })?;

            let cursor = next_cursor(&response);
            let before = items.len();
            items.extend(split_page(response, fields));

            tracing::debug!(
                path = %request.path,
                page,
                added = items.len() - before,
                has_cursor = cursor.is_some(),
                "fetched page"
            );

            match cursor {
                Some(cursor) => request.set_query(CURSOR_FIELD, cursor),
                None => break,
            }
        }

        tracing::info!(
            path = %request.path,
            pages = page,
            items = items.len(),
            "pagination complete"
        );

        Ok(items)
    }

    async fn fetch_page(
        &self,
        request: &RequestDescriptor,
        deadline: Option<Instant>,
    ) -> Result<Value> {
        match (deadline, self.timeout) {
            (Some(deadline), Some(timeout)) => {
                tokio::time::timeout_at(deadline, self.client.send(request))
                    .await
                    .map_err(|_| {
                        KalshiError::transport(format!(
                            "pagination timed out after {}s",
                            timeout.as_secs()
                        ))
                    })?
            }
            _ => self.client.send(request).await,
        }
    }
}

/// Returns the continuation token, treating null and empty as the end.
fn next_cursor(response: &Value) -> Option<String> {
    response
        .get(CURSOR_FIELD)
        .and_then(Value::as_str)
        .filter(|c| !c.is_empty())
        .map(str::to_owned)
}

/// Extracts the items of one page.
fn split_page(response: Value, fields: &[ItemsField]) -> Vec<Value> {
    let field = fields
        .iter()
        .find(|f| matches!(response.get(f.as_str()), Some(Value::Array(_))));

    match (field, response) {
        (Some(field), Value::Object(mut map)) => match map.remove(field.as_str()) {
            Some(Value::Array(list)) => list,
            _ => Vec::new(),
        },
        (_, response) => vec![response],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::KalshiClientConfig;
    use crate::test_support::{client_for, demo_credentials, mount_login};
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_market_pages(server: &MockServer, page_two: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path("/markets"))
            .and(query_param_is_missing("cursor"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "markets": [{ "ticker": "M-1" }, { "ticker": "M-2" }],
                "cursor": "a"
            })))
            .expect(1)
            .mount(server)
            .await;

        Mock::given(method("GET"))
            .and(path("/markets"))
            .and(query_param("cursor", "a"))
            .respond_with(page_two)
            .expect(1)
            .mount(server)
            .await;
    }

    // ==================== Split Tests ====================

    #[test]
    fn test_split_page_takes_first_present_field() {
        let page = json!({ "events": [{ "event_ticker": "E-1" }], "markets": [1, 2] });
        let items = split_page(page, &ItemsField::KNOWN);
        // markets is tried before events
        assert_eq!(items, vec![json!(1), json!(2)]);
    }

    #[test]
    fn test_split_page_falls_back_to_whole_response() {
        let page = json!({ "balance": 10000 });
        let items = split_page(page.clone(), &[ItemsField::MarketPositions]);
        assert_eq!(items, vec![page]);
    }

    #[test]
    fn test_split_page_empty_list_adds_nothing() {
        let items = split_page(json!({ "orders": [], "cursor": "" }), &[ItemsField::Orders]);
        assert!(items.is_empty());
    }

    #[test]
    fn test_next_cursor_end_markers() {
        assert_eq!(next_cursor(&json!({ "cursor": "abc" })), Some("abc".to_string()));
        assert_eq!(next_cursor(&json!({ "cursor": "" })), None);
        assert_eq!(next_cursor(&json!({ "cursor": null })), None);
        assert_eq!(next_cursor(&json!({ "markets": [] })), None);
    }

    // ==================== Aggregation Tests ====================

    #[tokio::test]
    async fn test_collect_all_concatenates_three_pages() {
        let server = MockServer::start().await;
        mount_login(&server).await;
        mount_market_pages(
            &server,
            ResponseTemplate::new(200).set_body_json(json!({
                "markets": [{ "ticker": "M-3" }],
                "cursor": "b"
            })),
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/markets"))
            .and(query_param("cursor", "b"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "markets": [{ "ticker": "M-4" }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let request = RequestDescriptor::get("/markets").with_query("limit", 2);
        let items = client
            .paginator()
            .collect_all(&request, &[ItemsField::Markets])
            .await
            .unwrap();

        let tickers: Vec<_> = items.iter().map(|m| m["ticker"].as_str().unwrap()).collect();
        assert_eq!(tickers, ["M-1", "M-2", "M-3", "M-4"]);
    }

    #[tokio::test]
    async fn test_collect_all_discards_partial_results_on_failure() {
        let server = MockServer::start().await;
        mount_login(&server).await;
        mount_market_pages(
            &server,
            ResponseTemplate::new(502).set_body_string("bad gateway"),
        )
        .await;

        let client = client_for(&server);
        let err = client
            .collect_all(&RequestDescriptor::get("/markets"), &[ItemsField::Markets])
            .await
            .unwrap_err();

        match err {
            KalshiError::Aggregation { page, source } => {
                assert_eq!(page, 2);
                assert_eq!(source.status_code(), Some(502));
            }
            other => panic!("expected aggregation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_collect_all_aborts_on_page_transport_failure() {
        let server = MockServer::start().await;
        mount_login(&server).await;
        mount_market_pages(
            &server,
            ResponseTemplate::new(200)
                .set_body_json(json!({ "markets": [{ "ticker": "M-3" }] }))
                .set_delay(Duration::from_secs(3)),
        )
        .await;

        let config = KalshiClientConfig::default()
            .with_base_url(server.uri())
            .with_timeout_secs(1);
        let client = KalshiClient::with_new_session(config, demo_credentials()).unwrap();

        let err = client
            .collect_all(&RequestDescriptor::get("/markets"), &[ItemsField::Markets])
            .await
            .unwrap_err();

        match err {
            KalshiError::Aggregation { page, source } => {
                assert_eq!(page, 2);
                assert!(matches!(
                    *source,
                    KalshiError::Api {
                        status_code: None,
                        ..
                    }
                ));
                assert!(source.to_string().contains("timed out"));
            }
            other => panic!("expected aggregation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_collect_all_replaces_caller_cursor() {
        let server = MockServer::start().await;
        mount_login(&server).await;

        Mock::given(method("GET"))
            .and(path("/portfolio/fills"))
            .and(query_param("cursor", "start"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "fills": [{ "trade_id": "t-1" }],
                "cursor": "next"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/portfolio/fills"))
            .and(query_param("cursor", "next"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "fills": [{ "trade_id": "t-2" }],
                "cursor": ""
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let request = RequestDescriptor::get("/portfolio/fills").with_query("cursor", "start");
        let items = client.collect_all(&request, &[]).await.unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[1]["trade_id"], "t-2");

        let requests = server.received_requests().await.unwrap();
        let second = requests
            .iter()
            .filter(|r| r.url.path() == "/portfolio/fills")
            .nth(1)
            .unwrap();
        let cursors: Vec<_> = second
            .url
            .query_pairs()
            .filter(|(k, _)| k == "cursor")
            .collect();
        assert_eq!(cursors.len(), 1);
    }

    #[tokio::test]
    async fn test_collect_all_wraps_unknown_shape() {
        let server = MockServer::start().await;
        mount_login(&server).await;

        Mock::given(method("GET"))
            .and(path("/portfolio/balance"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "balance": 10000 })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let items = client
            .collect_all(&RequestDescriptor::get("/portfolio/balance"), &[])
            .await
            .unwrap();

        assert_eq!(items, vec![json!({ "balance": 10000 })]);
    }

    #[tokio::test]
    async fn test_collect_all_total_timeout() {
        let server = MockServer::start().await;
        mount_login(&server).await;

        Mock::given(method("GET"))
            .and(path("/events"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "events": [], "cursor": "again" }))
                    .set_delay(Duration::from_millis(300)),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .paginator()
            .with_timeout(Duration::from_millis(100))
            .collect_all(&RequestDescriptor::get("/events"), &[ItemsField::Events])
            .await
            .unwrap_err();

        match err {
            KalshiError::Aggregation { page, source } => {
                assert_eq!(page, 1);
                assert!(source.to_string().contains("timed out"));
            }
            other => panic!("expected aggregation error, got {other:?}"),
        }
    }
}
