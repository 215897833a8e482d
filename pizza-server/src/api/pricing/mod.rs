//! Pricing API
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /api/pricing/quote | POST | Breakdown for one pizza |
//! | /api/pricing/cart | POST | Priced lines and subtotal |

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/pricing", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/quote", post(handler::quote))
        .route("/cart", post(handler::cart))
}
