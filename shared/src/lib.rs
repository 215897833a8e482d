//! Shared types for the pizza storefront
//!
//! Domain models, push-channel events and the unified error system used by
//! the server and its API clients.

pub mod error;
pub mod message;
pub mod models;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use message::{HubEvent, OrderStatusEvent};
