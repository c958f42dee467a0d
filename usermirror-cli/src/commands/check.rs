//! Store connectivity check
//!
//! Pings both stores with the configured timeout and prints one line per
//! store. Exits non-zero if either store is unreachable.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use usermirror_server::health::{probe, StoreHealth};
use usermirror_server::{SqlStore, StoreRole};

use crate::config::MirrorConfig;

/// Arguments for the check command
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Config file (default: $USERMIRROR_CONFIG or ~/.usermirror/config.toml)
    #[arg(long, short = 'c', env = "USERMIRROR_CONFIG")]
    pub config: Option<PathBuf>,
}

pub async fn run_check(args: CheckArgs) -> Result<()> {
    let config = MirrorConfig::load(args.config.as_deref())?;
    let timeout = config.coordinator.store_timeout();

    let mut unreachable = Vec::new();
    for role in StoreRole::ALL {
        let store = SqlStore::from_config(role, config.store(role));
        let health = probe(&store, timeout).await;
        println!("{}", render(&health));
        if !health.reachable {
            unreachable.push(role.as_str());
        }
    }

    if !unreachable.is_empty() {
        anyhow::bail!("unreachable store(s): {}", unreachable.join(", "));
    }
    Ok(())
}

fn render(health: &StoreHealth) -> String {
    let state = match &health.error {
        None => "ok".to_string(),
        Some(e) => format!("FAILED: {}", e),
    };
    format!(
        "{:<6} {}  (pool {}/{} in use)",
        health.which_store, state, health.pool.in_use, health.pool.capacity
    )
}
