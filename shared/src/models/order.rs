//! Order Model

use super::offer::OfferType;
use super::pizza::{CartLine, LinePrice};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order lifecycle stage
///
/// Wire value is the stage integer (`-1..=4`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i64")]
#[repr(i8)]
pub enum Stage {
    Cancelled = -1,
    Placed = 0,
    Preparing = 1,
    Baking = 2,
    OutForDelivery = 3,
    Delivered = 4,
}

impl Stage {
    #[inline]
    pub const fn value(&self) -> i8 {
        *self as i8
    }

    /// Display name stored in `status`
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Cancelled => "Cancelled",
            Self::Placed => "Placed",
            Self::Preparing => "Preparing",
            Self::Baking => "Baking",
            Self::OutForDelivery => "Out for Delivery",
            Self::Delivered => "Delivered",
        }
    }

    /// Delivered and Cancelled absorb every further transition
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Next stage in the forward sequence, `None` when terminal
    pub const fn next(&self) -> Option<Self> {
        match self {
            Self::Placed => Some(Self::Preparing),
            Self::Preparing => Some(Self::Baking),
            Self::Baking => Some(Self::OutForDelivery),
            Self::OutForDelivery => Some(Self::Delivered),
            Self::Delivered | Self::Cancelled => None,
        }
    }
}

impl From<Stage> for i8 {
    fn from(stage: Stage) -> Self {
        stage.value()
    }
}

/// Stage integer outside `-1..=4`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidStage(pub i64);

impl fmt::Display for InvalidStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid stage: {}", self.0)
    }
}

impl std::error::Error for InvalidStage {}

impl TryFrom<i64> for Stage {
    type Error = InvalidStage;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Self::Cancelled),
            0 => Ok(Self::Placed),
            1 => Ok(Self::Preparing),
            2 => Ok(Self::Baking),
            3 => Ok(Self::OutForDelivery),
            4 => Ok(Self::Delivered),
            _ => Err(InvalidStage(value)),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Append-only history entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub stage: Stage,
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl StatusEntry {
    pub fn new(stage: Stage, timestamp: DateTime<Utc>) -> Self {
        Self {
            stage,
            status: stage.name().to_string(),
            timestamp,
        }
    }
}

/// Coupon snapshot taken at checkout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedOffer {
    pub code: String,
    #[serde(rename = "type")]
    pub offer_type: OfferType,
    pub value: f64,
    pub discount_amount: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    pub phone: String,
    pub address: String,
}

/// Order entity
///
/// `subtotal`, `discount` and `total` are a snapshot taken at checkout and
/// never change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    /// `None` for guest orders
    pub user_id: Option<String>,
    pub customer: CustomerInfo,
    pub items: Vec<LinePrice>,
    pub subtotal: f64,
    pub discount: f64,
    pub total: f64,
    pub current_stage: Stage,
    pub status: String,
    pub status_history: Vec<StatusEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_offer: Option<AppliedOffer>,
    pub created_at: DateTime<Utc>,
    pub estimated_delivery_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_delivery_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl Order {
    pub fn is_owned_by(&self, user_id: Option<&str>) -> bool {
        self.user_id.as_deref() == user_id
    }

    /// Timestamp of the most recent transition
    pub fn last_transition_at(&self) -> DateTime<Utc> {
        self.status_history
            .last()
            .map(|e| e.timestamp)
            .into_iter()
            .chain(self.cancelled_at)
            .max()
            .unwrap_or(self.created_at)
    }
}

/// Checkout payload (`POST /api/orders`)
///
/// Prices on the lines are re-computed server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub items: Vec<CartLine>,
    pub customer: CustomerInfo,
    #[serde(default)]
    pub coupon_code: Option<String>,
}

/// Admin stage update payload (`PATCH /api/orders/{id}/status`)
///
/// Kept as a raw integer so an out-of-range stage is reported as a
/// lifecycle rejection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageUpdate {
    pub current_stage: i64,
}
