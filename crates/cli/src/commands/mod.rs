//! CLI commands for the Kalshi bridge.

pub mod check;
pub mod run;

pub use check::{run_check, CheckArgs};
pub use run::{execute_items, read_items, run_items, RunArgs};

use crate::config::AppConfig;
use anyhow::Result;
use kalshi_bridge::{CredentialEnvVars, Credentials, KalshiClient};

/// Builds a client for the configured environment from `KALSHI_EMAIL` and `KALSHI_PASSWORD`.
fn connect(config: &AppConfig) -> Result<KalshiClient> {
    let credentials = Credentials::from_env(config.environment, &CredentialEnvVars::default())?;
    let client = KalshiClient::with_new_session(config.client.clone(), credentials)?;

    tracing::info!(
        environment = %config.environment,
        base_url = client.base_url(),
        "Kalshi client ready"
    );

    Ok(client)
}
