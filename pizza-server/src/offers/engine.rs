//! Coupon validation
//!
//! [`OfferEngine::validate`] is a pure read-check: it looks an offer up,
//! walks the rejection rules in a fixed order and computes the discount.
//! Recording a redemption is the caller's job and must happen in the same
//! write transaction as the order insert (see `OrdersManager::checkout`).

use chrono::{DateTime, Utc};
use rust_decimal::prelude::*;
use shared::error::{AppError, ErrorCode};
use shared::models::{DiscountResult, Offer, OfferType};
use thiserror::Error;

use crate::auth::RequesterContext;
use crate::pricing::money::{MAX_CART_TOTAL, bounded, round2, to_f64};
use crate::storage::StorageError;

/// Read access the engine needs from the data store
pub trait OfferLookup {
    /// Active offer by code. `code` is already uppercased.
    fn find_active_offer_by_code(&self, code: &str) -> Result<Option<Offer>, StorageError>;

    /// Number of orders placed by a user (for first-order-only offers)
    fn count_orders_by_user(&self, user_id: &str) -> Result<u64, StorageError>;
}

/// Why a coupon was refused
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OfferRejection {
    #[error("Coupon code and a valid cart total are required")]
    MissingOrInvalidInput,

    #[error("Invalid or inactive coupon")]
    InvalidOrInactiveCoupon,

    #[error("This coupon expired on {valid_to}")]
    Expired { valid_to: DateTime<Utc> },

    #[error("This coupon is valid from {valid_from}")]
    NotYetValid { valid_from: DateTime<Utc> },

    #[error("Minimum order amount is {required}, current total is {current}")]
    BelowMinimumOrder { required: f64, current: f64 },

    #[error("This coupon has reached its usage limit of {limit}")]
    GlobalLimitReached { limit: u32 },

    #[error("You have already used this coupon the maximum of {limit} time(s)")]
    PerUserLimitReached { limit: u32 },

    #[error("This coupon is only valid on your first order")]
    FirstOrderOnly,

    #[error("Please log in to use this coupon")]
    LoginRequired,
}

impl OfferRejection {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::MissingOrInvalidInput => ErrorCode::OfferInputInvalid,
            Self::InvalidOrInactiveCoupon => ErrorCode::OfferInvalidOrInactive,
            Self::Expired { .. } => ErrorCode::OfferExpired,
            Self::NotYetValid { .. } => ErrorCode::OfferNotYetValid,
            Self::BelowMinimumOrder { .. } => ErrorCode::OfferBelowMinimumOrder,
            Self::GlobalLimitReached { .. } => ErrorCode::OfferGlobalLimitReached,
            Self::PerUserLimitReached { .. } => ErrorCode::OfferPerUserLimitReached,
            Self::FirstOrderOnly => ErrorCode::OfferFirstOrderOnly,
            Self::LoginRequired => ErrorCode::OfferLoginRequired,
        }
    }
}

impl From<OfferRejection> for AppError {
    fn from(rejection: OfferRejection) -> Self {
        let err = AppError::with_message(rejection.code(), rejection.to_string());
        match rejection {
            OfferRejection::Expired { valid_to } => {
                err.with_detail("validTo", valid_to.to_rfc3339())
            }
            OfferRejection::NotYetValid { valid_from } => {
                err.with_detail("validFrom", valid_from.to_rfc3339())
            }
            OfferRejection::BelowMinimumOrder { required, current } => err
                .with_detail("required", required)
                .with_detail("current", current),
            OfferRejection::GlobalLimitReached { limit }
            | OfferRejection::PerUserLimitReached { limit } => err.with_detail("limit", limit),
            _ => err,
        }
    }
}

#[derive(Debug, Error)]
pub enum OfferError {
    #[error(transparent)]
    Rejected(#[from] OfferRejection),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<OfferError> for AppError {
    fn from(err: OfferError) -> Self {
        match err {
            OfferError::Rejected(r) => r.into(),
            OfferError::Storage(e) => AppError::database(e.to_string()),
        }
    }
}

/// An offer that passed validation, with its computed discount
#[derive(Debug, Clone)]
pub struct ValidatedOffer {
    pub offer: Offer,
    pub discount: DiscountResult,
}

/// Coupon validation rules
#[derive(Debug, Clone, Copy)]
pub struct OfferEngine {
    /// Let admin requesters without a user id past the guest login gate
    pub admin_guest_bypass: bool,
}

impl Default for OfferEngine {
    fn default() -> Self {
        Self {
            admin_guest_bypass: true,
        }
    }
}

/// Normalize a coupon code for lookup and storage
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

impl OfferEngine {
    pub fn new(admin_guest_bypass: bool) -> Self {
        Self { admin_guest_bypass }
    }

    /// Validate `code` against `cart_total` for `ctx` at `now`
    ///
    /// Checks run in a fixed order and stop at the first failure.
    pub fn validate(
        &self,
        lookup: &impl OfferLookup,
        code: Option<&str>,
        cart_total: Option<f64>,
        ctx: &RequesterContext,
        now: DateTime<Utc>,
    ) -> Result<ValidatedOffer, OfferError> {
        let code = code.map(normalize_code).filter(|c| !c.is_empty());
        let (code, cart_total) = match (code, cart_total) {
            (Some(code), Some(total)) if (0.0..=MAX_CART_TOTAL).contains(&total) => (code, total),
            _ => return Err(OfferRejection::MissingOrInvalidInput.into()),
        };

        let offer = lookup
            .find_active_offer_by_code(&code)?
            .ok_or(OfferRejection::InvalidOrInactiveCoupon)?;

        if let Some(valid_to) = offer.valid_to
            && now > valid_to
        {
            return Err(OfferRejection::Expired { valid_to }.into());
        }
        if let Some(valid_from) = offer.valid_from
            && now < valid_from
        {
            return Err(OfferRejection::NotYetValid { valid_from }.into());
        }

        if let Some(required) = offer.min_order_amount
            && cart_total < required
        {
            return Err(OfferRejection::BelowMinimumOrder {
                required,
                current: cart_total,
            }
            .into());
        }

        if let Some(limit) = offer.usage_limit_total
            && offer.used_count >= limit
        {
            return Err(OfferRejection::GlobalLimitReached { limit }.into());
        }

        match ctx.user_id() {
            Some(user_id) => {
                let limit = offer.usage_limit_per_user;
                if offer.tracks_per_user() && offer.usage_for(user_id) >= limit {
                    return Err(OfferRejection::PerUserLimitReached { limit }.into());
                }
                if offer.first_order_only && lookup.count_orders_by_user(user_id)? > 0 {
                    return Err(OfferRejection::FirstOrderOnly.into());
                }
            }
            None => {
                let bypass = ctx.is_admin && self.admin_guest_bypass;
                if !bypass && (offer.tracks_per_user() || offer.first_order_only) {
                    return Err(OfferRejection::LoginRequired.into());
                }
            }
        }

        let discount = compute_discount(&offer, cart_total);
        Ok(ValidatedOffer { offer, discount })
    }
}

/// Discount amount for a cart total, clamped to `[0, cart_total]`
///
/// Amounts are bounded to `[0, MAX_CART_TOTAL]` first, so the arithmetic
/// cannot overflow; [`OfferEngine::validate`] rejects totals outside it.
pub fn compute_discount(offer: &Offer, cart_total: f64) -> DiscountResult {
    let total = bounded(cart_total, MAX_CART_TOTAL);
    let value = bounded(offer.value, MAX_CART_TOTAL);

    let raw = match offer.offer_type {
        OfferType::Fixed => value,
        OfferType::Percent => {
            let pct = total * value / Decimal::ONE_HUNDRED;
            match offer.max_discount {
                Some(cap) => pct.min(bounded(cap, MAX_CART_TOTAL)),
                None => pct,
            }
        }
    };
    let discount = round2(raw.min(total));

    DiscountResult {
        code: offer.code.clone(),
        offer_type: offer.offer_type,
        value: offer.value,
        discount_amount: to_f64(discount),
        final_total: to_f64(total - discount),
    }
}
