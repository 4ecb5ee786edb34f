//! Timeout utilities for agent operations
//!
//! Every asynchronous boundary in the agent is paired with a timeout;
//! there is no other cancellation primitive.

use anyhow::Result;
use std::future::Future;
use std::time::Duration;

/// Wrap an async operation with an explicit timeout
///
/// Returns the operation's own error when it fails, or a timeout error
/// naming the operation when the bound is exceeded.
pub async fn with_timeout<F, T>(operation: F, timeout: Duration, operation_name: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, operation).await {
        Ok(result) => result,
        Err(_) => Err(anyhow::anyhow!(
            "{operation_name} timed out after {:.0}s",
            timeout.as_secs_f64()
        )),
    }
}
