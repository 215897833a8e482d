//! Order API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use shared::models::{CheckoutRequest, Order, StageUpdate};
use shared::{AppResult, OrderStatusEvent};

use crate::auth::RequesterContext;
use crate::core::ServerState;

/// Status snapshot plus the poll interval clients should fall back to
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusResponse {
    #[serde(flatten)]
    pub status: OrderStatusEvent,
    pub poll_interval_secs: u64,
}

/// POST /api/orders - checkout
pub async fn checkout(
    State(state): State<ServerState>,
    ctx: RequesterContext,
    Json(payload): Json<CheckoutRequest>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.orders.checkout(payload, &ctx)?))
}

/// GET /api/orders - own orders, or every order for admins
pub async fn list(
    State(state): State<ServerState>,
    ctx: RequesterContext,
) -> AppResult<Json<Vec<Order>>> {
    Ok(Json(state.orders.list_orders(&ctx)?))
}

/// GET /api/orders/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    ctx: RequesterContext,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.orders.get_order(&id, &ctx)?))
}

/// GET /api/orders/{id}/status - polling fallback for the push channel
pub async fn status(
    State(state): State<ServerState>,
    ctx: RequesterContext,
    Path(id): Path<String>,
) -> AppResult<Json<OrderStatusResponse>> {
    let status = state.orders.order_status(&id, &ctx)?;
    Ok(Json(OrderStatusResponse {
        status,
        poll_interval_secs: state.config.status_poll_interval_secs,
    }))
}

/// PATCH /api/orders/{id}/status - admin stage change
pub async fn update_status(
    State(state): State<ServerState>,
    ctx: RequesterContext,
    Path(id): Path<String>,
    Json(payload): Json<StageUpdate>,
) -> AppResult<Json<Order>> {
    ctx.require_admin()?;
    Ok(Json(state.orders.update_stage(&id, payload.current_stage, &ctx)?))
}

/// POST /api/orders/{id}/cancel - customer cancel
pub async fn cancel(
    State(state): State<ServerState>,
    ctx: RequesterContext,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.orders.cancel(&id, &ctx)?))
}
