//! In-memory store accessor
//!
//! Holds usernames in a Vec behind a lease pool with the same contract as
//! the SQL pool. Faults can be injected to exercise partial failures
//! without a database: unreachable store, failing statements, slow calls.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::UserStore;
use crate::db::{Lease, LeasePool, PoolStatus, StoreError};
use crate::models::{StoreRole, Username};

#[derive(Debug, Default)]
struct Faults {
    unreachable: bool,
    failing_statements: u32,
    latency: Duration,
}

/// In-memory username store.
#[derive(Debug)]
pub struct MemoryStore {
    role: StoreRole,
    pool: LeasePool,
    rows: Mutex<Vec<String>>,
    faults: Mutex<Faults>,
}

impl MemoryStore {
    pub fn new(role: StoreRole, capacity: u32, acquire_timeout: Duration) -> Self {
        Self {
            role,
            pool: LeasePool::new(role, capacity, acquire_timeout),
            rows: Mutex::new(Vec::new()),
            faults: Mutex::new(Faults::default()),
        }
    }

    /// Store with the default pool capacity and acquire bound.
    pub fn with_defaults(role: StoreRole) -> Self {
        Self::new(
            role,
            crate::config::DEFAULT_MAX_CONNECTIONS,
            Duration::from_secs(crate::config::DEFAULT_ACQUIRE_TIMEOUT_SECS),
        )
    }

    /// Make connection acquisition fail until cleared.
    pub async fn set_unreachable(&self, unreachable: bool) {
        self.faults.lock().await.unreachable = unreachable;
    }

    /// Fail the next `count` statements after a connection is acquired.
    pub async fn fail_next(&self, count: u32) {
        self.faults.lock().await.failing_statements = count;
    }

    /// Delay every statement by `latency` while holding the lease.
    pub async fn set_latency(&self, latency: Duration) {
        self.faults.lock().await.latency = latency;
    }

    async fn checkout(&self) -> Result<Lease, StoreError> {
        if self.faults.lock().await.unreachable {
            return Err(StoreError::ConnectFailed {
                role: self.role,
                detail: "connection refused".into(),
            });
        }
        self.pool.acquire().await
    }

    /// Apply latency and injected failures ahead of a statement.
    async fn before_statement(&self) -> Result<(), StoreError> {
        let latency = {
            let mut faults = self.faults.lock().await;
            if faults.failing_statements > 0 {
                faults.failing_statements -= 1;
                return Err(StoreError::Statement {
                    role: self.role,
                    detail: "injected statement failure".into(),
                });
            }
            faults.latency
        };

        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    fn role(&self) -> StoreRole {
        self.role
    }

    async fn insert_username(&self, name: &Username) -> Result<(), StoreError> {
        let _lease = self.checkout().await?;
        self.before_statement().await?;
        self.rows.lock().await.push(name.as_str().to_owned());
        Ok(())
    }

    async fn list_usernames(&self) -> Result<Vec<String>, StoreError> {
        let _lease = self.checkout().await?;
        self.before_statement().await?;
        Ok(self.rows.lock().await.clone())
    }

    async fn delete_all_usernames(&self) -> Result<(), StoreError> {
        let _lease = self.checkout().await?;
        self.before_statement().await?;
        self.rows.lock().await.clear();
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let _lease = self.checkout().await?;
        Ok(())
    }

    fn pool_status(&self) -> PoolStatus {
        self.pool.status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> Username {
        Username::new(s).unwrap()
    }

    #[tokio::test]
    async fn keeps_insertion_order_and_duplicates() {
        let store = MemoryStore::with_defaults(StoreRole::Local);
        store.insert_username(&name("b")).await.unwrap();
        store.insert_username(&name("a")).await.unwrap();
        store.insert_username(&name("b")).await.unwrap();

        assert_eq!(store.list_usernames().await.unwrap(), vec!["b", "a", "b"]);
    }

    #[tokio::test]
    async fn delete_all_empties_store() {
        let store = MemoryStore::with_defaults(StoreRole::Local);
        store.insert_username(&name("a")).await.unwrap();
        store.delete_all_usernames().await.unwrap();

        assert!(store.list_usernames().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unreachable_store_fails_before_leasing() {
        let store = MemoryStore::with_defaults(StoreRole::Peer);
        store.set_unreachable(true).await;

        let err = store.insert_username(&name("a")).await.unwrap_err();
        assert!(matches!(err, StoreError::ConnectFailed { role: StoreRole::Peer, .. }));
        assert_eq!(store.pool_status().in_use, 0);

        store.set_unreachable(false).await;
        assert!(store.ping().await.is_ok());
    }

    #[tokio::test]
    async fn failed_statement_releases_lease() {
        let store = MemoryStore::with_defaults(StoreRole::Local);
        let before = store.pool_status();
        store.fail_next(1).await;

        let err = store.insert_username(&name("a")).await.unwrap_err();
        assert!(matches!(err, StoreError::Statement { .. }));
        assert_eq!(store.pool_status(), before);

        // Injected failure is consumed
        store.insert_username(&name("a")).await.unwrap();
        assert_eq!(store.list_usernames().await.unwrap(), vec!["a"]);
    }
}
