//! Offer API
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/offers/apply | POST | none (preview, records no usage) |
//! | /api/offers | GET, POST | admin |
//! | /api/offers/{code} | GET, PUT, DELETE | admin |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/offers", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/apply", post(handler::apply))
        .route("/", get(handler::list).post(handler::create))
        .route(
            "/{code}",
            get(handler::get_by_code)
                .put(handler::update)
                .delete(handler::deactivate),
        )
}
