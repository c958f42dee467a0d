//! Database layer - connection pools and store accessors
//!
//! # Design Principles
//!
//! - One bounded pool per store, constructed at startup and owned explicitly
//! - Connections are scoped leases released on drop, on every exit path
//! - One statement per accessor call, no retries

pub mod error;
pub mod lease;
pub mod pool;
pub mod repos;
pub mod schema;

pub use error::StoreError;
pub use lease::{Lease, LeasePool};
pub use pool::{create_pool, PoolStatus};
pub use repos::*;
