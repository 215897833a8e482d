//! Offer API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;
use shared::AppResult;
use shared::models::{ApplyOfferRequest, DiscountResult, Offer, OfferCreate, OfferUpdate};

use crate::auth::RequesterContext;
use crate::core::ServerState;

/// POST /api/offers/apply - coupon preview for a cart total
pub async fn apply(
    State(state): State<ServerState>,
    ctx: RequesterContext,
    Json(req): Json<ApplyOfferRequest>,
) -> AppResult<Json<DiscountResult>> {
    let validated = state.offer_engine.validate(
        &state.store,
        req.code.as_deref(),
        req.cart_total,
        &ctx,
        Utc::now(),
    )?;
    Ok(Json(validated.discount))
}

/// GET /api/offers - all offers
pub async fn list(
    State(state): State<ServerState>,
    ctx: RequesterContext,
) -> AppResult<Json<Vec<Offer>>> {
    ctx.require_admin()?;
    Ok(Json(state.offers.list_offers()?))
}

/// GET /api/offers/{code}
pub async fn get_by_code(
    State(state): State<ServerState>,
    ctx: RequesterContext,
    Path(code): Path<String>,
) -> AppResult<Json<Offer>> {
    ctx.require_admin()?;
    Ok(Json(state.offers.get_offer(&code)?))
}

/// POST /api/offers - create an offer
pub async fn create(
    State(state): State<ServerState>,
    ctx: RequesterContext,
    Json(payload): Json<OfferCreate>,
) -> AppResult<Json<Offer>> {
    ctx.require_admin()?;
    Ok(Json(state.offers.create_offer(payload, Utc::now())?))
}

/// PUT /api/offers/{code} - update an offer
pub async fn update(
    State(state): State<ServerState>,
    ctx: RequesterContext,
    Path(code): Path<String>,
    Json(payload): Json<OfferUpdate>,
) -> AppResult<Json<Offer>> {
    ctx.require_admin()?;
    Ok(Json(state.offers.update_offer(&code, payload, Utc::now())?))
}

/// DELETE /api/offers/{code} - deactivate (soft delete)
pub async fn deactivate(
    State(state): State<ServerState>,
    ctx: RequesterContext,
    Path(code): Path<String>,
) -> AppResult<Json<Offer>> {
    ctx.require_admin()?;
    Ok(Json(state.offers.deactivate_offer(&code, Utc::now())?))
}
