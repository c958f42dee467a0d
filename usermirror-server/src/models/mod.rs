//! Domain models with validation at construction
//!
//! User input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod operation;
pub mod store_role;
pub mod username;
pub mod validation;

pub use operation::{Mutation, Operation};
pub use store_role::StoreRole;
pub use username::Username;
pub use validation::ValidationError;
