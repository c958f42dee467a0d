//! Database connection pool management
//!
//! Uses sqlx MySqlPool (MariaDB wire protocol) with explicit connection
//! limits. Pools connect lazily: an unreachable peer does not block startup,
//! it fails the first call that needs a connection.

use serde::Serialize;
use sqlx::mysql::MySqlPoolOptions;
use sqlx::MySqlPool;

use crate::config::StoreConfig;
use crate::models::StoreRole;

/// Snapshot of a pool's occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolStatus {
    /// Maximum connections the pool will hold
    pub capacity: u32,
    /// Connections currently open
    pub size: u32,
    /// Open connections waiting in the pool
    pub idle: u32,
    /// Connections leased to callers
    pub in_use: u32,
}

impl PoolStatus {
    pub fn of(pool: &MySqlPool) -> Self {
        let size = pool.size();
        let idle = u32::try_from(pool.num_idle()).unwrap_or(size);
        Self {
            capacity: pool.options().get_max_connections(),
            size,
            idle,
            in_use: size.saturating_sub(idle),
        }
    }
}

/// Create the pool for one store.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool(StoreRole::Peer, &config.peer);
/// ```
pub fn create_pool(role: StoreRole, config: &StoreConfig) -> MySqlPool {
    tracing::debug!(
        which_store = %role,
        host = %config.host,
        port = config.port,
        max_connections = config.max_connections,
        "creating lazy pool"
    );

    MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .connect_lazy_with(config.connect_options())
}
