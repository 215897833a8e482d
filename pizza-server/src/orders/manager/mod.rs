//! OrdersManager - checkout and stage updates
//!
//! # Checkout Flow
//!
//! ```text
//! checkout(req, ctx)
//!     ├─ 1. Validate cart lines and customer details
//!     ├─ 2. Re-price every line server-side
//!     ├─ 3. Begin write transaction
//!     ├─ 4. Validate the coupon against current counters
//!     ├─ 5. Record coupon usage + insert order
//!     ├─ 6. Commit
//!     └─ 7. Publish order_created to the dashboard
//! ```
//!
//! Stage changes follow the same shape: one write transaction around the
//! lifecycle transition, then a status event to `order:<id>` and
//! `admin-dashboard` once committed.

mod error;
pub use error::*;

use chrono::{Duration, Utc};
use shared::OrderStatusEvent;
use shared::models::{
    AppliedOffer, CheckoutRequest, CustomerInfo, Order, Stage, StatusEntry,
};
use uuid::Uuid;

use super::lifecycle::{self, TransitionPolicy};
use crate::auth::RequesterContext;
use crate::live::OrderHub;
use crate::offers::{OfferEngine, ValidatedOffer};
use crate::pricing::{price_cart, validate_cart};
use crate::storage::Store;

/// Delivery estimate promised at checkout
const ESTIMATED_DELIVERY_MINUTES: i64 = 45;

#[derive(Clone)]
pub struct OrdersManager {
    store: Store,
    hub: OrderHub,
    engine: OfferEngine,
    policy: TransitionPolicy,
}

impl std::fmt::Debug for OrdersManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrdersManager")
            .field("store", &"<Store>")
            .field("hub", &"<OrderHub>")
            .field("engine", &self.engine)
            .field("policy", &self.policy)
            .finish()
    }
}

impl OrdersManager {
    pub fn new(store: Store, hub: OrderHub, engine: OfferEngine, policy: TransitionPolicy) -> Self {
        Self {
            store,
            hub,
            engine,
            policy,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Place an order, redeeming `coupon_code` atomically with the insert
    pub fn checkout(&self, req: CheckoutRequest, ctx: &RequesterContext) -> ManagerResult<Order> {
        validate_cart(&req.items)?;
        let customer = normalize_customer(req.customer)?;
        let quote = price_cart(&req.items);

        let now = Utc::now();
        let coupon = req
            .coupon_code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty());
        let engine = self.engine;

        let order = self.store.create_order_with_offer(|txn| {
            let mut discount = 0.0;
            let mut total = quote.subtotal;
            let mut applied_offer = None;
            let mut redeemed = None;

            if let Some(code) = coupon {
                let ValidatedOffer {
                    mut offer,
                    discount: result,
                } = engine.validate(txn, Some(code), Some(quote.subtotal), ctx, now)?;

                offer.record_usage(ctx.user_id());
                offer.updated_at = now;

                discount = result.discount_amount;
                total = result.final_total;
                applied_offer = Some(AppliedOffer {
                    code: result.code,
                    offer_type: result.offer_type,
                    value: result.value,
                    discount_amount: result.discount_amount,
                });
                redeemed = Some(offer);
            }

            let order = Order {
                id: Uuid::new_v4().to_string(),
                user_id: ctx.user_id.clone(),
                customer,
                items: quote.lines,
                subtotal: quote.subtotal,
                discount,
                total,
                current_stage: Stage::Placed,
                status: Stage::Placed.name().to_string(),
                status_history: vec![StatusEntry::new(Stage::Placed, now)],
                applied_offer,
                created_at: now,
                estimated_delivery_time: now + Duration::minutes(ESTIMATED_DELIVERY_MINUTES),
                actual_delivery_time: None,
                cancelled_at: None,
            };
            Ok::<_, ManagerError>((order, redeemed))
        })?;

        tracing::info!(
            order_id = %order.id,
            user_id = ?order.user_id,
            total = order.total,
            coupon = ?order.applied_offer.as_ref().map(|o| o.code.as_str()),
            "Order placed"
        );
        self.hub.publish_created(&order);
        Ok(order)
    }

    /// One order, visible to its owner and admins
    ///
    /// Guest orders are visible to anyone holding the id.
    pub fn get_order(&self, order_id: &str, ctx: &RequesterContext) -> ManagerResult<Order> {
        let order = self
            .store
            .get_order(order_id)?
            .ok_or_else(|| ManagerError::OrderNotFound(order_id.to_string()))?;
        if !can_view(&order, ctx) {
            return Err(ManagerError::Forbidden(order_id.to_string()));
        }
        Ok(order)
    }

    /// Orders for the requester, newest first; admins see every order
    pub fn list_orders(&self, ctx: &RequesterContext) -> ManagerResult<Vec<Order>> {
        if ctx.is_admin {
            return Ok(self.store.list_orders()?);
        }
        let user_id = ctx.user_id().ok_or(ManagerError::NotAuthenticated)?;
        Ok(self.store.list_orders_by_user(user_id)?)
    }

    /// Current status snapshot (polling fallback for the push channel)
    pub fn order_status(
        &self,
        order_id: &str,
        ctx: &RequesterContext,
    ) -> ManagerResult<OrderStatusEvent> {
        self.get_order(order_id, ctx)
            .map(|order| OrderStatusEvent::from_order(&order))
    }

    /// Administrative stage change
    pub fn update_stage(
        &self,
        order_id: &str,
        target: i64,
        ctx: &RequesterContext,
    ) -> ManagerResult<Order> {
        if !ctx.is_admin {
            return Err(if ctx.is_guest() {
                ManagerError::NotAuthenticated
            } else {
                ManagerError::Forbidden(order_id.to_string())
            });
        }

        let policy = self.policy;
        let order = self.store.update_order(order_id, |order| {
            lifecycle::advance(order, target, policy, Utc::now()).map_err(ManagerError::from)
        })?;

        tracing::info!(
            order_id = %order.id,
            stage = order.current_stage.value(),
            by = ?ctx.user_id(),
            "Order stage updated"
        );
        self.hub.publish_status(&order);
        Ok(order)
    }

    /// Customer cancel, allowed only while the order is still `Placed`
    pub fn cancel(&self, order_id: &str, ctx: &RequesterContext) -> ManagerResult<Order> {
        let order = self.store.update_order(order_id, |order| {
            lifecycle::cancel_by_customer(order, ctx, Utc::now()).map_err(ManagerError::from)
        })?;

        tracing::info!(order_id = %order.id, by = ?ctx.user_id(), "Order cancelled");
        self.hub.publish_status(&order);
        Ok(order)
    }
}

fn can_view(order: &Order, ctx: &RequesterContext) -> bool {
    ctx.is_admin || order.user_id.is_none() || order.is_owned_by(ctx.user_id())
}

fn normalize_customer(customer: CustomerInfo) -> ManagerResult<CustomerInfo> {
    let customer = CustomerInfo {
        name: customer.name.trim().to_string(),
        phone: customer.phone.trim().to_string(),
        address: customer.address.trim().to_string(),
    };
    for (field, value) in [
        ("name", &customer.name),
        ("phone", &customer.phone),
        ("address", &customer.address),
    ] {
        if value.is_empty() {
            return Err(ManagerError::InvalidCustomer(format!("{field} is required")));
        }
    }
    Ok(customer)
}

#[cfg(test)]
mod tests;
