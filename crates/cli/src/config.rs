//! Layered configuration for the CLI.
//!
//! Sources, lowest to highest precedence:
//! 1. Built-in defaults
//! 2. `config/Config.toml` (optional)
//! 3. The file passed with `--config`
//! 4. `KALSHI_`-prefixed environment variables, `__` separating sections
//!    (e.g. `KALSHI_CLIENT__TIMEOUT_SECS=10`, `KALSHI_ENVIRONMENT=production`)
//!
//! Credentials are never read from here; see [`kalshi_bridge::Credentials::from_env`].

use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use kalshi_bridge::{Environment, KalshiClientConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/Config.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub environment: Environment,
    pub client: KalshiClientConfig,
    pub host: HostConfig,
}

/// Batch-level behavior.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Emit failed items as error data instead of aborting the batch.
    pub continue_on_fail: bool,
}

impl AppConfig {
    /// Loads configuration by merging defaults, TOML files and environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `explicit` does not exist or a source cannot be parsed.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(DEFAULT_CONFIG_PATH));

        if let Some(path) = explicit {
            if !path.is_file() {
                anyhow::bail!("config file not found: {}", path.display());
            }
            figment = figment.merge(Toml::file(path));
        }

        let config: AppConfig = figment
            .merge(
                Env::prefixed("KALSHI_")
                    .ignore(&["email", "password"])
                    .split("__"),
            )
            .extract()
            .context("invalid configuration")?;

        Ok(config)
    }
}
