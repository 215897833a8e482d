//! Order API
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/orders | POST | none (guest or user checkout) |
//! | /api/orders | GET | user (own orders), admin (all) |
//! | /api/orders/{id} | GET | owner, admin |
//! | /api/orders/{id}/status | GET | owner, admin, guest holding the id |
//! | /api/orders/{id}/status | PATCH | admin |
//! | /api/orders/{id}/cancel | POST | owner, admin |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::checkout))
        .route("/{id}", get(handler::get_by_id))
        .route(
            "/{id}/status",
            get(handler::status).patch(handler::update_status),
        )
        .route("/{id}/cancel", post(handler::cancel))
}
