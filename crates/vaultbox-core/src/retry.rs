//! Single-retry wrapper for idempotent reads against external stores.
//!
//! Writes are never routed through here: a failed write is surfaced and the
//! caller decides whether to re-submit.

use std::future::Future;

use crate::error::ErrorKind;
use crate::result::AppResult;

/// Run `op`, and run it once more if it fails with [`ErrorKind::ExternalStore`].
///
/// Any other error kind is returned immediately.
pub async fn read_retrying_once<T, F, Fut>(operation: &str, mut op: F) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    match op().await {
        Err(e) if e.kind == ErrorKind::ExternalStore => {
            tracing::warn!(operation, error = %e, "External store read failed, retrying once");
            op().await
        }
        other => other,
    }
}
