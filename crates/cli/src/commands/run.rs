//! CLI command to execute a file of Kalshi operations.
//!
//! Items are run sequentially and the collected outputs are printed to
//! stdout as one JSON array.

use super::connect;
use crate::config::{AppConfig, HostConfig};
use anyhow::{Context, Result};
use clap::Args;
use kalshi_bridge::{parse_items, BatchRunner, KalshiClient};
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncRead, AsyncReadExt};

/// Path value that selects stdin.
const STDIN_PATH: &str = "-";

/// Arguments for the run command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Operations file: a JSON array or one JSON object per line (`-` for stdin).
    #[arg(short, long)]
    pub items: PathBuf,

    /// Emit failed items as `{"error": ...}` outputs instead of aborting.
    #[arg(long)]
    pub continue_on_fail: bool,
}

impl RunArgs {
    /// The flag or the configured `host.continue_on_fail`; either enables it.
    #[must_use]
    pub fn continue_on_fail(&self, host: &HostConfig) -> bool {
        self.continue_on_fail || host.continue_on_fail
    }
}

/// Runs every item in the file.
pub async fn run_items(args: RunArgs, config: &AppConfig) -> Result<()> {
    let items = read_items(&args.items, tokio::io::stdin()).await?;
    if items.is_empty() {
        anyhow::bail!("no items to run");
    }

    let continue_on_fail = args.continue_on_fail(&config.host);
    tracing::info!(items = items.len(), continue_on_fail, "running batch");

    let client = connect(config)?;
    execute_items(&client, items, continue_on_fail, std::io::stdout()).await
}

/// Reads and parses the items at `path`, taking them from `stdin` for `-`.
///
/// # Errors
///
/// Returns an error if the source cannot be read or is not valid item input.
pub async fn read_items<R>(path: &Path, mut stdin: R) -> Result<Vec<Value>>
where
    R: AsyncRead + Unpin,
{
    let text = if path.as_os_str() == STDIN_PATH {
        let mut buf = String::new();
        stdin
            .read_to_string(&mut buf)
            .await
            .context("failed to read items from stdin")?;
        buf
    } else {
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?
    };

    Ok(parse_items(&text)?)
}

/// Runs `items` and writes the outputs to `out` as a pretty JSON array.
///
/// # Errors
///
/// Returns the batch error when not continuing on failure, or a write error.
pub async fn execute_items<W: Write>(
    client: &KalshiClient,
    items: Vec<Value>,
    continue_on_fail: bool,
    mut out: W,
) -> Result<()> {
    let outputs = BatchRunner::new(client)
        .continue_on_fail(continue_on_fail)
        .run(items)
        .await?;

    serde_json::to_writer_pretty(&mut out, &outputs)?;
    writeln!(out)?;
    out.flush()?;

    Ok(())
}
