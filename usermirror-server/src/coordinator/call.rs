//! Bounded store calls
//!
//! Every store call made by the coordinator or the read path goes through
//! `bounded_call`: it is raced against a timeout and a cancellation token.
//! Losing the race drops the call future, which drops any connection lease
//! it holds.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::db::StoreError;
use crate::models::StoreRole;

/// Run `call`, mapping timeout and cancellation to store errors.
pub async fn bounded_call<T, F>(
    role: StoreRole,
    timeout: Duration,
    cancel: &CancellationToken,
    call: F,
) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    // Fail fast if already cancelled
    if cancel.is_cancelled() {
        return Err(StoreError::Cancelled { role });
    }

    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(StoreError::Cancelled { role }),
        result = tokio::time::timeout(timeout, call) => {
            match result {
                Ok(inner) => inner,
                Err(_) => Err(StoreError::Timeout { role, after: timeout }),
            }
        }
    }
}
