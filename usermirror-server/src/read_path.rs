//! Read path
//!
//! Lists usernames from the local store only. Reads are never mirrored and
//! never reconciled against the peer, so the result says nothing about the
//! peer's contents.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::coordinator::bounded_call;
use crate::db::{StoreError, UserStore};
use crate::models::Operation;

/// Single-store query surface.
#[derive(Clone)]
pub struct ReadPath {
    local: Arc<dyn UserStore>,
    timeout: Duration,
}

impl ReadPath {
    pub fn new(local: Arc<dyn UserStore>, timeout: Duration) -> Self {
        Self { local, timeout }
    }

    /// Usernames in the local store's native order.
    pub async fn list(&self) -> Result<Vec<String>, StoreError> {
        self.list_with_cancel(&CancellationToken::new()).await
    }

    pub async fn list_with_cancel(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, StoreError> {
        let role = self.local.role();
        let users = bounded_call(role, self.timeout, cancel, self.local.list_usernames()).await?;
        tracing::debug!(
            operation = %Operation::List,
            which_store = %role,
            count = users.len(),
            "listed usernames"
        );
        Ok(users)
    }
}
