//! CLI command to verify credentials against the exchange status endpoint.

use super::connect;
use crate::config::AppConfig;
use anyhow::Result;
use clap::Args;

/// Arguments for the check command.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Print only the status object, without the summary line.
    #[arg(long)]
    pub quiet: bool,
}

/// Logs in and fetches `/exchange/status`.
pub async fn run_check(args: CheckArgs, config: &AppConfig) -> Result<()> {
    let client = connect(config)?;
    let status = client.check_connection().await?;

    if !args.quiet {
        let flag = |key: &str| status.get(key).and_then(|v| v.as_bool()).unwrap_or(false);
        eprintln!(
            "Connected to {} (exchange_active={}, trading_active={})",
            config.environment,
            flag("exchange_active"),
            flag("trading_active")
        );
    }

    println!("{}", serde_json::to_string_pretty(&status)?);

    Ok(())
}
