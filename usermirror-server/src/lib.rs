//! usermirror-server: username service mirrored across two stores
//!
//! Every mutation is applied to a local and a peer MariaDB store that share
//! no transaction. The dual-write coordinator runs both calls, keeps both
//! outcomes, and reports partial failure instead of hiding it. Reads come
//! from the local store only.

pub mod config;
pub mod coordinator;
pub mod db;
pub mod health;
pub mod http;
pub mod models;
pub mod read_path;

pub use config::{ConfigError, StoreConfig};
pub use coordinator::{
    CoordinatorConfig, CoordinatorError, DispatchPolicy, DualOutcome, DualWriteCoordinator,
    DualWriteReport, SideResult,
};
pub use db::{MemoryStore, SqlStore, StoreError, Stores, UserStore};
pub use http::{run_server, AppState, ServerConfig};
pub use models::{StoreRole, Username};
pub use read_path::ReadPath;
