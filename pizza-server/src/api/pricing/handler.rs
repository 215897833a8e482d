//! Pricing API Handlers

use axum::Json;
use serde::Deserialize;
use shared::models::{CartLine, CartQuote, PriceBreakdown, PriceInput};

use crate::pricing;
use shared::AppResult;

#[derive(Debug, Deserialize)]
pub struct CartRequest {
    pub items: Vec<CartLine>,
}

/// POST /api/pricing/quote - price one pizza
pub async fn quote(Json(input): Json<PriceInput>) -> AppResult<Json<PriceBreakdown>> {
    pricing::validate_price_input(&input)?;
    Ok(Json(pricing::quote(&input)))
}

/// POST /api/pricing/cart - price a cart
pub async fn cart(Json(req): Json<CartRequest>) -> AppResult<Json<CartQuote>> {
    pricing::validate_cart(&req.items)?;
    Ok(Json(pricing::price_cart(&req.items)))
}
