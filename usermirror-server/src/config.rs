//! Per-store connection configuration
//!
//! Each store (local, peer) gets its own independent `StoreConfig`.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sqlx::mysql::MySqlConnectOptions;

use crate::models::StoreRole;

/// Default pool capacity per store.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Default bound on waiting for a pooled connection.
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;

const DEFAULT_PORT: u16 = 3306;
const DEFAULT_DATABASE: &str = "Users";

/// Configuration error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{section}.{field}: {reason}")]
    Invalid {
        section: &'static str,
        field: &'static str,
        reason: &'static str,
    },
}

/// Connection target for one store.
#[derive(Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_database() -> String {
    DEFAULT_DATABASE.to_string()
}

fn default_max_connections() -> u32 {
    DEFAULT_MAX_CONNECTIONS
}

fn default_acquire_timeout_secs() -> u64 {
    DEFAULT_ACQUIRE_TIMEOUT_SECS
}

impl StoreConfig {
    /// Config pointing at `host` with every other field defaulted.
    pub fn new(host: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            user: user.into(),
            password: String::new(),
            database: DEFAULT_DATABASE.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT_SECS,
        }
    }

    /// Driver options for this store.
    pub fn connect_options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    /// Reject values that would leave the pool unusable.
    pub fn validate(&self, role: StoreRole) -> Result<(), ConfigError> {
        let section = role.as_str();
        let invalid = |field, reason| ConfigError::Invalid {
            section,
            field,
            reason,
        };

        if self.host.trim().is_empty() {
            return Err(invalid("host", "cannot be empty"));
        }
        if self.user.trim().is_empty() {
            return Err(invalid("user", "cannot be empty"));
        }
        if self.database.trim().is_empty() {
            return Err(invalid("database", "cannot be empty"));
        }
        if self.max_connections == 0 {
            return Err(invalid("max_connections", "must be at least 1"));
        }
        if self.acquire_timeout_secs == 0 {
            return Err(invalid("acquire_timeout_secs", "must be at least 1"));
        }
        Ok(())
    }
}

// Password stays out of logs.
impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .finish()
    }
}
