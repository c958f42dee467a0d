//! Bounded lease pool for the in-memory backend
//!
//! Same contract as the sqlx pool: bounded capacity, first-come-first-served
//! acquisition, a bound on waiting, and release on drop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use super::{PoolStatus, StoreError};
use crate::models::StoreRole;

/// A leased slot. Dropping it returns the slot to the pool.
#[derive(Debug)]
pub struct Lease {
    _permit: OwnedSemaphorePermit,
}

/// Bounded pool of leases for one store.
#[derive(Debug, Clone)]
pub struct LeasePool {
    role: StoreRole,
    capacity: u32,
    permits: Arc<Semaphore>,
    acquire_timeout: Duration,
}

impl LeasePool {
    pub fn new(role: StoreRole, capacity: u32, acquire_timeout: Duration) -> Self {
        Self {
            role,
            capacity,
            permits: Arc::new(Semaphore::new(capacity as usize)),
            acquire_timeout,
        }
    }

    /// Wait for a free slot, failing with `PoolExhausted` after the bound.
    ///
    /// Waiters are served in arrival order.
    pub async fn acquire(&self) -> Result<Lease, StoreError> {
        let waiting = Arc::clone(&self.permits).acquire_owned();
        match tokio::time::timeout(self.acquire_timeout, waiting).await {
            Ok(Ok(permit)) => Ok(Lease { _permit: permit }),
            Ok(Err(_)) => Err(StoreError::ConnectFailed {
                role: self.role,
                detail: "pool closed".into(),
            }),
            Err(_) => {
                tracing::debug!(which_store = %self.role, "lease acquisition timed out");
                Err(StoreError::PoolExhausted { role: self.role })
            }
        }
    }

    pub fn status(&self) -> PoolStatus {
        let idle = u32::try_from(self.permits.available_permits()).unwrap_or(self.capacity);
        PoolStatus {
            capacity: self.capacity,
            size: self.capacity,
            idle,
            in_use: self.capacity.saturating_sub(idle),
        }
    }
}
