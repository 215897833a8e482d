//! Authentication
//!
//! - [`JwtService`] - bearer token validation
//! - [`RequesterContext`] - caller identity extracted per request

pub mod context;
pub mod jwt;

pub use context::RequesterContext;
pub use jwt::{ADMIN_ROLE, Claims, JwtConfig, JwtError, JwtService};
