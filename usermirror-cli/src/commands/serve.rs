//! HTTP server command
//!
//! Runs the usermirror HTTP server over either the configured SQL stores or
//! two in-memory stores.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use usermirror_server::db::schema;
use usermirror_server::{
    run_server, AppState, CoordinatorConfig, DispatchPolicy, MemoryStore, ServerConfig,
    SqlStore, StoreRole, Stores,
};

use crate::config::MirrorConfig;

/// Storage backend
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// MariaDB/MySQL stores from the config file
    Sql,
    /// Two in-memory stores, for local development
    Memory,
}

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Config file (default: $USERMIRROR_CONFIG or ~/.usermirror/config.toml)
    #[arg(long, short = 'c', env = "USERMIRROR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to bind to (overrides config)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Dual-write policy: attempt_both, short_circuit or parallel (overrides config)
    #[arg(long)]
    pub policy: Option<DispatchPolicy>,

    /// Bound on each store call in seconds (overrides config)
    #[arg(long)]
    pub store_timeout_secs: Option<u64>,

    /// Storage backend
    #[arg(long, value_enum, default_value_t = Backend::Sql)]
    pub backend: Backend,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,
}

impl ServeArgs {
    fn apply_overrides(&self, server: &mut ServerConfig, coordinator: &mut CoordinatorConfig) {
        if let Some(bind) = self.bind {
            server.bind_addr = bind;
        }
        if self.cors_permissive {
            server.cors_permissive = true;
        }
        if let Some(policy) = self.policy {
            coordinator.policy = policy;
        }
        if let Some(secs) = self.store_timeout_secs {
            coordinator.store_timeout_secs = secs;
        }
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let (stores, server, coordinator) = match args.backend {
        Backend::Sql => sql_backend(&args).await?,
        Backend::Memory => memory_backend(&args),
    };
    coordinator.validate()?;

    tracing::info!("Starting usermirror server on {}", server.bind_addr);
    let state = AppState::new(stores, &coordinator);

    // Run server (blocks until shutdown)
    run_server(state, server).await.context("Server error")?;

    Ok(())
}

async fn sql_backend(args: &ServeArgs) -> Result<(Stores, ServerConfig, CoordinatorConfig)> {
    let mut config = MirrorConfig::load(args.config.as_deref())?;
    args.apply_overrides(&mut config.server, &mut config.coordinator);

    let local = SqlStore::from_config(StoreRole::Local, &config.local);
    let peer = SqlStore::from_config(StoreRole::Peer, &config.peer);

    if config.migrate {
        schema::ensure(StoreRole::Local, local.pool())
            .await
            .context("Failed to create Users table on local store")?;
        // Peer may be down at startup; writes to it will report the failure
        if let Err(e) = schema::ensure(StoreRole::Peer, peer.pool()).await {
            tracing::warn!(error = %e, "peer schema bootstrap failed, continuing");
        }
    }

    let stores = Stores::new(Arc::new(local), Arc::new(peer));
    Ok((stores, config.server, config.coordinator))
}

fn memory_backend(args: &ServeArgs) -> (Stores, ServerConfig, CoordinatorConfig) {
    tracing::warn!("using in-memory stores; data is lost on exit");

    let mut server = ServerConfig::default();
    let mut coordinator = CoordinatorConfig::default();
    args.apply_overrides(&mut server, &mut coordinator);

    let stores = Stores::new(
        Arc::new(MemoryStore::with_defaults(StoreRole::Local)),
        Arc::new(MemoryStore::with_defaults(StoreRole::Peer)),
    );
    (stores, server, coordinator)
}
