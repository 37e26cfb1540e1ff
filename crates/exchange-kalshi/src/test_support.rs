//! Shared fixtures for wiremock-backed tests.

use crate::auth::Credentials;
use crate::client::{KalshiClient, KalshiClientConfig};
use crate::types::Environment;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Login responder issuing `token-1`, `token-2`, ... on successive calls.
#[derive(Debug, Default)]
pub(crate) struct SequentialTokens {
    calls: AtomicUsize,
}

impl Respond for SequentialTokens {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        ResponseTemplate::new(200).set_body_json(json!({
            "member_id": "member-1",
            "token": format!("token-{n}")
        }))
    }
}

pub(crate) fn demo_credentials() -> Credentials {
    Credentials::new(Environment::Demo, "trader@example.com", "hunter2")
}

pub(crate) async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(SequentialTokens::default())
        .mount(server)
        .await;
}

pub(crate) fn client_for(server: &MockServer) -> KalshiClient {
    let config = KalshiClientConfig::default()
        .with_base_url(server.uri())
        .with_timeout_secs(5);
    KalshiClient::with_new_session(config, demo_credentials()).unwrap()
}
