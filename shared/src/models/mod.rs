//! Data models
//!
//! Shared between the server and API clients. Wire format is camelCase JSON.

pub mod offer;
pub mod order;
pub mod pizza;
pub mod serde_helpers;

// Re-exports
pub use offer::*;
pub use order::*;
pub use pizza::*;
