//! Dual writes against two real MariaDB/MySQL stores
//!
//! Run with:
//!   LOCAL_DATABASE_URL=mysql://... PEER_DATABASE_URL=mysql://... \
//!   cargo test -p usermirror-server --test sql_stores -- --ignored

use std::sync::Arc;
use std::time::Duration;

use sqlx::MySqlPool;
use usermirror_server::db::schema;
use usermirror_server::{
    DispatchPolicy, DualWriteCoordinator, SqlStore, StoreConfig, StoreRole, Stores, UserStore,
};

async fn store(role: StoreRole, var: &str) -> Arc<SqlStore> {
    let url = std::env::var(var).unwrap_or_else(|_| panic!("{var} required"));
    let pool = MySqlPool::connect(&url).await.expect("pool creation failed");
    schema::ensure(role, &pool).await.expect("schema bootstrap failed");
    Arc::new(SqlStore::new(role, pool))
}

#[tokio::test]
#[ignore = "requires database"]
async fn register_reaches_both_databases() {
    let local = store(StoreRole::Local, "LOCAL_DATABASE_URL").await;
    let peer = store(StoreRole::Peer, "PEER_DATABASE_URL").await;
    let coordinator = DualWriteCoordinator::with_timeout(
        Stores::new(local.clone(), peer.clone()),
        DispatchPolicy::AttemptBoth,
        Duration::from_secs(10),
    );

    coordinator.clear().await.unwrap();
    coordinator.register("integration-user").await.unwrap();

    assert_eq!(local.list_usernames().await.unwrap(), vec!["integration-user"]);
    assert_eq!(peer.list_usernames().await.unwrap(), vec!["integration-user"]);

    coordinator.clear().await.unwrap();
    assert!(local.list_usernames().await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires database"]
async fn unreachable_peer_keeps_local_row() {
    let local = store(StoreRole::Local, "LOCAL_DATABASE_URL").await;

    let mut peer_config = StoreConfig::new("127.0.0.1", "nobody");
    peer_config.port = 9;
    peer_config.acquire_timeout_secs = 1;
    let peer = Arc::new(SqlStore::from_config(StoreRole::Peer, &peer_config));

    let coordinator = DualWriteCoordinator::with_timeout(
        Stores::new(local.clone(), peer),
        DispatchPolicy::AttemptBoth,
        Duration::from_secs(5),
    );

    local.delete_all_usernames().await.unwrap();
    let err = coordinator.register("lonely").await.unwrap_err();

    let report = err.report().unwrap();
    assert!(report.is_partial());
    assert_eq!(report.failed_stores(), vec![StoreRole::Peer]);
    assert_eq!(local.list_usernames().await.unwrap(), vec!["lonely"]);
}
