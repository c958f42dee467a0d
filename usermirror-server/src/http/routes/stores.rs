//! Store diagnostics endpoint
//!
//! Reports reachability and pool occupancy of both stores so an operator
//! can see why the stores may have diverged.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::coordinator::DispatchPolicy;
use crate::health::{probe, StoreHealth};
use crate::http::server::AppState;

#[derive(Serialize)]
pub struct StoresResponse {
    pub policy: DispatchPolicy,
    pub stores: Vec<StoreHealth>,
}

/// GET /stores
async fn stores(State(state): State<Arc<AppState>>) -> Json<StoresResponse> {
    let coordinator = &state.coordinator;
    let timeout = coordinator.store_timeout();
    let stores = coordinator.stores();

    let (local, peer) = tokio::join!(
        probe(stores.local.as_ref(), timeout),
        probe(stores.peer.as_ref(), timeout),
    );

    Json(StoresResponse {
        policy: coordinator.policy(),
        stores: vec![local, peer],
    })
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/stores", get(stores))
}
