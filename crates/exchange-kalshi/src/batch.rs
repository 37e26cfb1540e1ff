//! Sequential execution of a list of operations.
//!
//! Items run one at a time in input order. By default the first failure
//! aborts the batch; with `continue_on_fail` each failure is emitted inline
//! as `{"error": ..., "status_code": ...}` and the batch moves on.

use crate::catalog::Operation;
use crate::client::KalshiClient;
use crate::error::{KalshiError, Result};
use serde_json::Value;

/// Runs operation items against one client.
#[derive(Debug)]
pub struct BatchRunner<'a> {
    client: &'a KalshiClient,
    continue_on_fail: bool,
}

impl<'a> BatchRunner<'a> {
    /// Creates a runner that stops at the first failure.
    #[must_use]
    pub fn new(client: &'a KalshiClient) -> Self {
        Self {
            client,
            continue_on_fail: false,
        }
    }

    /// Emits failures as data instead of aborting.
    #[must_use]
    pub fn continue_on_fail(mut self, enabled: bool) -> Self {
        self.continue_on_fail = enabled;
        self
    }

    /// Executes every item and returns the concatenated outputs.
    ///
    /// # Errors
    /// Returns the first item failure unless `continue_on_fail` is set.
    pub async fn run(&self, items: Vec<Value>) -> Result<Vec<Value>> {
        let total = items.len();
        let mut outputs = Vec::new();
        let mut failed = 0usize;

        for (index, item) in items.into_iter().enumerate() {
            let result = match Operation::from_value(item) {
                Ok(operation) => operation.execute(self.client).await,
                Err(e) => Err(e),
            };

            match result {
                Ok(items) => outputs.extend(items),
                Err(e) if self.continue_on_fail => {
                    tracing::warn!(item = index, error = %e, "item failed, continuing");
                    failed += 1;
                    outputs.push(serde_json::to_value(e.to_error_data())?);
                }
                Err(e) => {
                    tracing::error!(item = index, error = %e, "item failed, aborting batch");
                    return Err(e);
                }
            }
        }

        tracing::info!(items = total, failed, outputs = outputs.len(), "batch finished");
        Ok(outputs)
    }
}

/// Parses batch input: a JSON array of items, or one JSON object per line.
///
/// # Errors
/// Returns `MalformedInput` naming the offending line.
pub fn parse_items(text: &str) -> Result<Vec<Value>> {
    let trimmed = text.trim_start();

    if trimmed.starts_with('[') {
        return match serde_json::from_str::<Value>(trimmed)? {
            Value::Array(items) => Ok(items),
            _ => Err(KalshiError::MalformedInput("expected a JSON array".to_string())),
        };
    }

    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| {
            serde_json::from_str(line).map_err(|e| {
                KalshiError::MalformedInput(format!("line {}: {e}", n + 1))
            })
        })
        .collect()
}
