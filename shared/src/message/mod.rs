//! Push-channel event types
//!
//! Events are published to `order:<id>` (customers tracking one order) and
//! `admin-dashboard` (every order). Both carry small JSON payloads of the
//! form `{"type": ..., "payload": ...}`.

use crate::models::{Order, Stage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Aggregate channel for the admin dashboard
pub const ADMIN_DASHBOARD_CHANNEL: &str = "admin-dashboard";

/// Per-order channel name
pub fn order_channel(order_id: &str) -> String {
    format!("order:{order_id}")
}

/// Stage change notification
///
/// Consumers deduplicate on `(order_id, current_stage)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusEvent {
    pub order_id: String,
    pub status: String,
    pub current_stage: Stage,
    pub timestamp: DateTime<Utc>,
}

impl OrderStatusEvent {
    pub fn from_order(order: &Order) -> Self {
        Self {
            order_id: order.id.clone(),
            status: order.status.clone(),
            current_stage: order.current_stage,
            timestamp: order.last_transition_at(),
        }
    }
}

/// New order summary for the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreatedEvent {
    pub order_id: String,
    pub customer_name: String,
    pub total: f64,
    pub item_count: u32,
    pub created_at: DateTime<Utc>,
}

impl OrderCreatedEvent {
    pub fn from_order(order: &Order) -> Self {
        Self {
            order_id: order.id.clone(),
            customer_name: order.customer.name.clone(),
            total: order.total,
            item_count: order.items.iter().map(|l| l.quantity).sum(),
            created_at: order.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum HubEvent {
    OrderCreated(OrderCreatedEvent),
    StatusChanged(OrderStatusEvent),
}

impl HubEvent {
    pub fn order_id(&self) -> &str {
        match self {
            Self::OrderCreated(e) => &e.order_id,
            Self::StatusChanged(e) => &e.order_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_names() {
        assert_eq!(order_channel("abc"), "order:abc");
        assert_eq!(ADMIN_DASHBOARD_CHANNEL, "admin-dashboard");
    }

    #[test]
    fn test_hub_event_wire_shape() {
        let event = HubEvent::StatusChanged(OrderStatusEvent {
            order_id: "o-1".into(),
            status: "Baking".into(),
            current_stage: Stage::Baking,
            timestamp: "2026-03-01T12:00:00Z".parse().unwrap(),
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "status_changed");
        assert_eq!(json["payload"]["orderId"], "o-1");
        assert_eq!(json["payload"]["currentStage"], 2);
        assert_eq!(event.order_id(), "o-1");
    }
}
