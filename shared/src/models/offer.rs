//! Offer (coupon) Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::serde_helpers;

/// Discount rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferType {
    /// Flat amount off the cart total
    Fixed,
    /// Percentage of the cart total (0..=100), optionally capped by `max_discount`
    Percent,
}

/// Per-user redemption counter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUsage {
    pub user_id: String,
    pub count: u32,
}

pub fn default_usage_limit_per_user() -> u32 {
    1
}

/// Offer entity
///
/// `code` is stored uppercase and is unique. `usage_limit_per_user == 0`
/// means redemptions are not tracked per user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub code: String,
    #[serde(rename = "type")]
    pub offer_type: OfferType,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_order_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_discount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_to: Option<DateTime<Utc>>,
    #[serde(default)]
    pub usage_limit_total: Option<u32>,
    #[serde(default = "default_usage_limit_per_user")]
    pub usage_limit_per_user: u32,
    #[serde(default)]
    pub used_count: u32,
    #[serde(default)]
    pub user_usage: Vec<UserUsage>,
    pub active: bool,
    #[serde(default)]
    pub first_order_only: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Offer {
    /// Redemptions recorded for `user_id`
    pub fn usage_for(&self, user_id: &str) -> u32 {
        self.user_usage
            .iter()
            .find(|u| u.user_id == user_id)
            .map(|u| u.count)
            .unwrap_or(0)
    }

    /// Whether redemptions are tracked per user
    pub fn tracks_per_user(&self) -> bool {
        self.usage_limit_per_user > 0
    }

    /// Increment `used_count` and upsert the requester's usage entry
    pub fn record_usage(&mut self, user_id: Option<&str>) {
        self.used_count = self.used_count.saturating_add(1);
        let Some(user_id) = user_id else {
            return;
        };
        match self.user_usage.iter_mut().find(|u| u.user_id == user_id) {
            Some(entry) => entry.count = entry.count.saturating_add(1),
            None => self.user_usage.push(UserUsage {
                user_id: user_id.to_string(),
                count: 1,
            }),
        }
    }
}

/// Create offer payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferCreate {
    pub code: String,
    #[serde(rename = "type")]
    pub offer_type: OfferType,
    pub value: f64,
    pub min_order_amount: Option<f64>,
    pub max_discount: Option<f64>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_to: Option<DateTime<Utc>>,
    pub usage_limit_total: Option<u32>,
    pub usage_limit_per_user: Option<u32>,
    pub first_order_only: Option<bool>,
    pub active: Option<bool>,
}

/// Update offer payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferUpdate {
    #[serde(rename = "type")]
    pub offer_type: Option<OfferType>,
    pub value: Option<f64>,
    /// `null` clears the minimum
    #[serde(default, deserialize_with = "serde_helpers::nullable", skip_serializing_if = "Option::is_none")]
    pub min_order_amount: Option<Option<f64>>,
    /// `null` clears the cap
    #[serde(default, deserialize_with = "serde_helpers::nullable", skip_serializing_if = "Option::is_none")]
    pub max_discount: Option<Option<f64>>,
    #[serde(default, deserialize_with = "serde_helpers::nullable", skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "serde_helpers::nullable", skip_serializing_if = "Option::is_none")]
    pub valid_to: Option<Option<DateTime<Utc>>>,
    /// `null` removes the global limit
    #[serde(default, deserialize_with = "serde_helpers::nullable", skip_serializing_if = "Option::is_none")]
    pub usage_limit_total: Option<Option<u32>>,
    pub usage_limit_per_user: Option<u32>,
    pub first_order_only: Option<bool>,
    pub active: Option<bool>,
}

/// Coupon preview request (`POST /api/offers/apply`)
///
/// Both fields are optional on the wire so a missing value surfaces as a
/// domain rejection instead of a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyOfferRequest {
    pub code: Option<String>,
    pub cart_total: Option<f64>,
}

/// Successful coupon validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountResult {
    pub code: String,
    #[serde(rename = "type")]
    pub offer_type: OfferType,
    pub value: f64,
    pub discount_amount: f64,
    pub final_total: f64,
}
