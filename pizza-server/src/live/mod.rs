//! Order notification hub
//!
//! One `broadcast` channel per topic (`order:<id>` or `admin-dashboard`).
//! Publishing is fire-and-forget: events sent to a topic nobody listens on
//! are dropped, and clients that miss an event recover through the status
//! polling endpoint.

pub mod tracker;

use dashmap::DashMap;
use shared::message::{
    ADMIN_DASHBOARD_CHANNEL, HubEvent, OrderCreatedEvent, OrderStatusEvent, order_channel,
};
use shared::models::Order;
use std::sync::Arc;
use tokio::sync::broadcast;

pub use tracker::StageTracker;

const BROADCAST_CAPACITY: usize = 256;

#[derive(Clone, Default)]
pub struct OrderHub {
    channels: Arc<DashMap<String, broadcast::Sender<HubEvent>>>,
}

impl OrderHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to a channel, creating it on first use
    pub fn subscribe(&self, channel: &str) -> broadcast::Receiver<HubEvent> {
        self.channels
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(BROADCAST_CAPACITY).0)
            .subscribe()
    }

    /// Send an event to every current subscriber of `channel`
    ///
    /// Returns the number of receivers reached.
    pub fn publish(&self, channel: &str, event: HubEvent) -> usize {
        match self.channels.get(channel) {
            Some(tx) => tx.send(event).unwrap_or(0),
            None => 0,
        }
    }

    /// Fan a committed stage change out to the order and dashboard channels
    pub fn publish_status(&self, order: &Order) {
        let event = HubEvent::StatusChanged(OrderStatusEvent::from_order(order));
        let reached = self.publish(&order_channel(&order.id), event.clone())
            + self.publish(ADMIN_DASHBOARD_CHANNEL, event);
        tracing::debug!(
            order_id = %order.id,
            stage = order.current_stage.value(),
            reached,
            "Status event published"
        );
    }

    pub fn publish_created(&self, order: &Order) {
        let event = HubEvent::OrderCreated(OrderCreatedEvent::from_order(order));
        self.publish(ADMIN_DASHBOARD_CHANNEL, event);
    }

    /// Drop a channel once its last subscriber is gone
    pub fn release(&self, channel: &str) {
        self.channels
            .remove_if(channel, |_, tx| tx.receiver_count() == 0);
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use shared::models::{CustomerInfo, Stage, StatusEntry};

    fn order(id: &str, stage: Stage) -> Order {
        let created_at = Utc::now();
        Order {
            id: id.to_string(),
            user_id: None,
            customer: CustomerInfo {
                name: "Ada".into(),
                ..Default::default()
            },
            items: vec![],
            subtotal: 10.0,
            discount: 0.0,
            total: 10.0,
            current_stage: stage,
            status: stage.name().to_string(),
            status_history: vec![StatusEntry::new(stage, created_at)],
            applied_offer: None,
            created_at,
            estimated_delivery_time: created_at + Duration::minutes(45),
            actual_delivery_time: None,
            cancelled_at: None,
        }
    }

    #[tokio::test]
    async fn test_status_reaches_order_and_dashboard() {
        let hub = OrderHub::new();
        let mut order_rx = hub.subscribe(&order_channel("o1"));
        let mut admin_rx = hub.subscribe(ADMIN_DASHBOARD_CHANNEL);

        hub.publish_status(&order("o1", Stage::Baking));

        for rx in [&mut order_rx, &mut admin_rx] {
            match rx.recv().await.unwrap() {
                HubEvent::StatusChanged(e) => {
                    assert_eq!(e.order_id, "o1");
                    assert_eq!(e.current_stage, Stage::Baking);
                    assert_eq!(e.status, "Baking");
                }
                other => panic!("unexpected event: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_other_orders_are_isolated() {
        let hub = OrderHub::new();
        let mut rx = hub.subscribe(&order_channel("mine"));

        hub.publish_status(&order("theirs", Stage::Preparing));
        hub.publish_status(&order("mine", Stage::Preparing));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.order_id(), "mine");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_created_goes_to_dashboard_only() {
        let hub = OrderHub::new();
        let mut order_rx = hub.subscribe(&order_channel("o2"));
        let mut admin_rx = hub.subscribe(ADMIN_DASHBOARD_CHANNEL);

        hub.publish_created(&order("o2", Stage::Placed));

        match admin_rx.recv().await.unwrap() {
            HubEvent::OrderCreated(e) => assert_eq!(e.customer_name, "Ada"),
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(order_rx.try_recv().is_err());
    }

    #[test]
    fn test_publish_without_subscribers_is_noop() {
        let hub = OrderHub::new();
        let event = HubEvent::StatusChanged(OrderStatusEvent::from_order(&order(
            "o3",
            Stage::Placed,
        )));
        assert_eq!(hub.publish("order:o3", event), 0);
        assert_eq!(hub.channel_count(), 0);
    }

    #[test]
    fn test_release_keeps_live_channels() {
        let hub = OrderHub::new();
        let rx = hub.subscribe("order:o4");
        hub.release("order:o4");
        assert_eq!(hub.channel_count(), 1);

        drop(rx);
        hub.release("order:o4");
        assert_eq!(hub.channel_count(), 0);
    }
}
