//! Route handlers organized by resource

pub mod greeting;
pub mod health;
pub mod stores;
pub mod users;
