//! Orders
//!
//! - [`lifecycle`]: stage transition rules and the customer cancel guard
//! - [`manager`]: checkout, queries and stage updates over the store

pub mod lifecycle;
pub mod manager;

pub use lifecycle::{LifecycleError, TransitionPolicy, advance, cancel_by_customer};
pub use manager::{ManagerError, ManagerResult, OrdersManager};
