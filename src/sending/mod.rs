//! Outbound mail: permission checks and delivery

pub mod permissions;
pub mod provider;
pub mod store;

pub use permissions::{SendPermission, check_basic_permission, check_send_permission};
pub use store::DbPolicyStore;
