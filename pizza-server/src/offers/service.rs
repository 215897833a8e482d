//! Offer administration
//!
//! Create, edit and deactivate coupon definitions. Every write validates the
//! resulting offer before it is committed.

use chrono::{DateTime, Utc};
use shared::error::{AppError, ErrorCode};
use shared::models::{Offer, OfferCreate, OfferType, OfferUpdate, default_usage_limit_per_user};
use thiserror::Error;

use super::engine::normalize_code;
use crate::pricing::money::MAX_CART_TOTAL;
use crate::storage::{StorageError, Store};

const MAX_CODE_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum OfferServiceError {
    #[error("Invalid offer: {0}")]
    Invalid(String),

    #[error("Coupon code already exists: {0}")]
    CodeExists(String),

    #[error("Offer not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(StorageError),
}

impl From<StorageError> for OfferServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::OfferNotFound(code) => Self::NotFound(code),
            other => Self::Storage(other),
        }
    }
}

impl From<OfferServiceError> for AppError {
    fn from(err: OfferServiceError) -> Self {
        match err {
            OfferServiceError::Invalid(msg) => {
                AppError::with_message(ErrorCode::OfferDefinitionInvalid, msg)
            }
            OfferServiceError::CodeExists(code) => {
                AppError::new(ErrorCode::OfferCodeExists).with_detail("code", code)
            }
            OfferServiceError::NotFound(code) => {
                AppError::new(ErrorCode::OfferNotFound).with_detail("code", code)
            }
            OfferServiceError::Storage(e) => AppError::database(e.to_string()),
        }
    }
}

pub type OfferServiceResult<T> = Result<T, OfferServiceError>;

/// Check the invariants every stored offer must satisfy
pub fn validate_offer(offer: &Offer) -> OfferServiceResult<()> {
    let invalid = |msg: &str| Err(OfferServiceError::Invalid(msg.to_string()));

    if offer.code.is_empty() {
        return invalid("code must not be empty");
    }
    if offer.code.len() > MAX_CODE_LEN
        || !offer
            .code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return invalid("code must be up to 32 letters, digits, '-' or '_'");
    }
    if !offer.value.is_finite() {
        return invalid("value must be a finite number");
    }
    match offer.offer_type {
        OfferType::Percent if !(0.0..=100.0).contains(&offer.value) => {
            return invalid("percent value must be between 0 and 100");
        }
        OfferType::Fixed if !(0.0..=MAX_CART_TOTAL).contains(&offer.value) => {
            return invalid("fixed value must be between 0 and 1000000000000");
        }
        _ => {}
    }
    for (name, amount) in [
        ("minOrderAmount", offer.min_order_amount),
        ("maxDiscount", offer.max_discount),
    ] {
        if let Some(amount) = amount
            && !(0.0..=MAX_CART_TOTAL).contains(&amount)
        {
            return Err(OfferServiceError::Invalid(format!(
                "{name} must be between 0 and 1000000000000"
            )));
        }
    }
    if let (Some(from), Some(to)) = (offer.valid_from, offer.valid_to)
        && from > to
    {
        return invalid("validFrom must not be after validTo");
    }
    Ok(())
}

/// Admin-facing offer operations
#[derive(Clone)]
pub struct OfferService {
    store: Store,
}

impl OfferService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn create_offer(&self, req: OfferCreate, now: DateTime<Utc>) -> OfferServiceResult<Offer> {
        let offer = Offer {
            code: normalize_code(&req.code),
            offer_type: req.offer_type,
            value: req.value,
            min_order_amount: req.min_order_amount,
            max_discount: req.max_discount,
            valid_from: req.valid_from,
            valid_to: req.valid_to,
            usage_limit_total: req.usage_limit_total,
            usage_limit_per_user: req
                .usage_limit_per_user
                .unwrap_or_else(default_usage_limit_per_user),
            used_count: 0,
            user_usage: Vec::new(),
            active: req.active.unwrap_or(true),
            first_order_only: req.first_order_only.unwrap_or(false),
            created_at: now,
            updated_at: now,
        };
        validate_offer(&offer)?;

        if !self.store.insert_offer(&offer)? {
            return Err(OfferServiceError::CodeExists(offer.code));
        }
        tracing::info!(code = %offer.code, offer_type = ?offer.offer_type, value = offer.value, "Offer created");
        Ok(offer)
    }

    pub fn update_offer(
        &self,
        code: &str,
        update: OfferUpdate,
        now: DateTime<Utc>,
    ) -> OfferServiceResult<Offer> {
        let code = normalize_code(code);
        let offer = self.store.update_offer(&code, |offer| {
            apply_update(offer, update);
            offer.updated_at = now;
            validate_offer(offer)
        })?;
        tracing::info!(code = %offer.code, "Offer updated");
        Ok(offer)
    }

    /// Soft delete: the record and its usage counters are kept
    pub fn deactivate_offer(&self, code: &str, now: DateTime<Utc>) -> OfferServiceResult<Offer> {
        let code = normalize_code(code);
        let offer = self
            .store
            .update_offer::<OfferServiceError, _>(&code, |offer| {
                offer.active = false;
                offer.updated_at = now;
                Ok(())
            })?;
        tracing::info!(code = %offer.code, "Offer deactivated");
        Ok(offer)
    }

    pub fn list_offers(&self) -> OfferServiceResult<Vec<Offer>> {
        Ok(self.store.list_offers()?)
    }

    pub fn get_offer(&self, code: &str) -> OfferServiceResult<Offer> {
        let code = normalize_code(code);
        self.store
            .get_offer(&code)?
            .ok_or(OfferServiceError::NotFound(code))
    }
}

fn apply_update(offer: &mut Offer, update: OfferUpdate) {
    if let Some(v) = update.offer_type {
        offer.offer_type = v;
    }
    if let Some(v) = update.value {
        offer.value = v;
    }
    // Some(None) clears the field
    if let Some(v) = update.min_order_amount {
        offer.min_order_amount = v;
    }
    if let Some(v) = update.max_discount {
        offer.max_discount = v;
    }
    if let Some(v) = update.valid_from {
        offer.valid_from = v;
    }
    if let Some(v) = update.valid_to {
        offer.valid_to = v;
    }
    if let Some(v) = update.usage_limit_total {
        offer.usage_limit_total = v;
    }
    if let Some(v) = update.usage_limit_per_user {
        offer.usage_limit_per_user = v;
    }
    if let Some(v) = update.first_order_only {
        offer.first_order_only = v;
    }
    if let Some(v) = update.active {
        offer.active = v;
    }
}
