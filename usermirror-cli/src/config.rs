//! Configuration file for usermirror
//!
//! Loaded from `--config`, `USERMIRROR_CONFIG`, or
//! `~/.usermirror/config.toml`, in that order. Command-line flags override
//! file values.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use usermirror_server::{CoordinatorConfig, ServerConfig, StoreConfig, StoreRole};

/// Example configuration printed by `usermirror config example`.
pub const EXAMPLE_CONFIG: &str = r#"# usermirror configuration

# Create the Users table on startup if missing
migrate = true

[server]
bind_addr = "0.0.0.0:80"
cors_permissive = false

[coordinator]
# attempt_both | short_circuit | parallel
policy = "attempt_both"
store_timeout_secs = 10

# Store on this host; also serves /list
[local]
host = "127.0.0.1"
port = 3306
user = "rudy"
password = "secret"
database = "Users"
max_connections = 5
acquire_timeout_secs = 5

# Store on the other host
[peer]
host = "10.128.0.3"
port = 3306
user = "rodolfo"
password = "secret"
database = "Users"
max_connections = 5
acquire_timeout_secs = 5
"#;

/// Complete service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MirrorConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub coordinator: CoordinatorConfig,
    pub local: StoreConfig,
    pub peer: StoreConfig,
    #[serde(default)]
    pub migrate: bool,
}

impl MirrorConfig {
    /// Load config from `path`, or the default location when `None`.
    ///
    /// Fails hard with an actionable error if the file doesn't exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_path);

        if !config_path.exists() {
            anyhow::bail!(
                "Config not found at {:?}\n\nRun: usermirror config example > {:?}",
                config_path,
                config_path
            );
        }

        let content = fs::read_to_string(&config_path)
            .context(format!("Failed to read config file: {:?}", config_path))?;

        Self::from_toml(&content)
            .context(format!("Invalid config file: {:?}", config_path))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).context("Failed to parse config file (invalid TOML)")?;
        config.validate()?;
        Ok(config)
    }

    /// Default config path: $USERMIRROR_CONFIG or ~/.usermirror/config.toml
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("USERMIRROR_CONFIG") {
            return PathBuf::from(path);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".usermirror/config.toml")
    }

    pub fn store(&self, role: StoreRole) -> &StoreConfig {
        match role {
            StoreRole::Local => &self.local,
            StoreRole::Peer => &self.peer,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for role in StoreRole::ALL {
            self.store(role).validate(role)?;
        }
        self.coordinator.validate()?;
        Ok(())
    }
}
