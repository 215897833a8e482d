//! Offers (coupons)
//!
//! - [`engine`]: pure coupon validation and discount computation
//! - [`service`]: admin CRUD over stored offers

pub mod engine;
pub mod service;

pub use engine::{
    OfferEngine, OfferError, OfferLookup, OfferRejection, ValidatedOffer, compute_discount,
    normalize_code,
};
pub use service::{OfferService, OfferServiceError, validate_offer};
