//! Store accessors
//!
//! Each accessor call follows the same shape:
//! - acquire a connection (scoped lease, released on drop)
//! - run exactly one statement
//! - report failure upward immediately, no retries

pub mod memory;
pub mod users;

use std::sync::Arc;

use async_trait::async_trait;

use super::{PoolStatus, StoreError};
use crate::models::{StoreRole, Username};

pub use memory::MemoryStore;
pub use users::SqlStore;

/// Operation surface over one store's pool.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Role this store plays; stamped onto every error it returns.
    fn role(&self) -> StoreRole;

    async fn insert_username(&self, name: &Username) -> Result<(), StoreError>;

    /// Usernames in store-native order.
    async fn list_usernames(&self) -> Result<Vec<String>, StoreError>;

    async fn delete_all_usernames(&self) -> Result<(), StoreError>;

    /// Round-trip a trivial statement to check reachability.
    async fn ping(&self) -> Result<(), StoreError>;

    fn pool_status(&self) -> PoolStatus;
}

/// The two stores, owned once and shared by handle.
#[derive(Clone)]
pub struct Stores {
    pub local: Arc<dyn UserStore>,
    pub peer: Arc<dyn UserStore>,
}

impl Stores {
    pub fn new(local: Arc<dyn UserStore>, peer: Arc<dyn UserStore>) -> Self {
        debug_assert_eq!(local.role(), StoreRole::Local);
        debug_assert_eq!(peer.role(), StoreRole::Peer);
        Self { local, peer }
    }
}
