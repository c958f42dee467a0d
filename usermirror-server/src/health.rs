//! Store reachability probes

use std::time::Duration;

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::coordinator::bounded_call;
use crate::db::{PoolStatus, UserStore};
use crate::models::StoreRole;

/// Reachability and pool occupancy of one store.
#[derive(Debug, Clone, Serialize)]
pub struct StoreHealth {
    pub which_store: StoreRole,
    pub reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub pool: PoolStatus,
}

/// Ping `store` within `timeout` and snapshot its pool.
pub async fn probe(store: &dyn UserStore, timeout: Duration) -> StoreHealth {
    let role = store.role();
    let result = bounded_call(role, timeout, &CancellationToken::new(), store.ping()).await;
    if let Err(e) = &result {
        tracing::warn!(which_store = %role, error = %e, "store probe failed");
    }

    StoreHealth {
        which_store: role,
        reachable: result.is_ok(),
        error: result.err().map(|e| e.to_string()),
        pool: store.pool_status(),
    }
}
