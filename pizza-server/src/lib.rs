//! Pizza Server - storefront backend
//!
//! # Architecture
//!
//! - **Pricing** (`pricing`): deterministic per-pizza and cart pricing
//! - **Offers** (`offers`): coupon validation and offer administration
//! - **Orders** (`orders`): checkout, lifecycle state machine, stage updates
//! - **Storage** (`storage`): embedded redb database
//! - **Live** (`live`): order notification fan-out
//! - **Auth** (`auth`): JWT bearer tokens to requester context
//! - **HTTP API** (`api`): axum routes and handlers
//!
//! # Module layout
//!
//! ```text
//! pizza-server/src/
//! ├── core/          # config, state, server
//! ├── auth/          # JWT, requester context
//! ├── pricing/       # price engine
//! ├── offers/        # offer engine + admin service
//! ├── orders/        # lifecycle + manager
//! ├── storage/       # redb tables
//! ├── live/          # notification hub + stage tracker
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # logging
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod live;
pub mod offers;
pub mod orders;
pub mod pricing;
pub mod storage;
pub mod utils;

pub use auth::{JwtService, RequesterContext};
pub use core::{Config, Server, ServerState};
pub use live::{OrderHub, StageTracker};
pub use offers::{OfferEngine, OfferService};
pub use orders::OrdersManager;
pub use storage::Store;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

pub use utils::logger::{init_logger, init_logger_with_file};

/// Load `.env` and initialise logging
///
/// Runs before [`Config::from_env`] so configuration warnings are logged.
pub fn setup_environment() {
    let _ = dotenv::dotenv();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty());
    let log_json = std::env::var("LOG_JSON")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(false);
    init_logger_with_file(log_level.as_deref(), log_json, log_dir.as_deref());
}

pub fn print_banner() {
    println!(
        r#"
    ____  _
   / __ \(_)_______  ____ _
  / /_/ / /_  /_  / / __ `/
 / ____/ / / /_/ /_/ /_/ /
/_/   /_/ /___/___/\__,_/
    "#
    );
}
