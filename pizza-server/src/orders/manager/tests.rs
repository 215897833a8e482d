use super::*;
use crate::offers::{OfferRejection, OfferService};
use crate::orders::lifecycle::LifecycleError;
use shared::HubEvent;
use shared::message::{ADMIN_DASHBOARD_CHANNEL, order_channel};
use shared::models::{CartLine, Crust, OfferCreate, OfferType, Size, Topping};

fn create_test_manager() -> OrdersManager {
    let store = Store::open_in_memory().unwrap();
    OrdersManager::new(
        store,
        OrderHub::new(),
        OfferEngine::default(),
        TransitionPolicy::default(),
    )
}

fn customer() -> CustomerInfo {
    CustomerInfo {
        name: "Ada".into(),
        phone: "555-0100".into(),
        address: "1 Main St".into(),
    }
}

fn margherita(quantity: u32) -> CartLine {
    CartLine {
        name: "Margherita".into(),
        base_price: 1000.0,
        size: Size::Large,
        crust: Crust::Stuffed,
        toppings: (0..5).map(|i| Topping::priced(format!("t{i}"), 150.0)).collect(),
        quantity,
    }
}

fn checkout_req(coupon: Option<&str>) -> CheckoutRequest {
    CheckoutRequest {
        items: vec![margherita(1)],
        customer: customer(),
        coupon_code: coupon.map(str::to_string),
    }
}

fn create_offer(manager: &OrdersManager, code: &str, f: impl FnOnce(&mut OfferCreate)) {
    let mut req = OfferCreate {
        code: code.to_string(),
        offer_type: OfferType::Percent,
        value: 10.0,
        min_order_amount: None,
        max_discount: None,
        valid_from: None,
        valid_to: None,
        usage_limit_total: None,
        usage_limit_per_user: None,
        first_order_only: None,
        active: None,
    };
    f(&mut req);
    OfferService::new(manager.store().clone())
        .create_offer(req, Utc::now())
        .unwrap();
}

// ========================================================================
// Checkout
// ========================================================================

#[test]
fn test_checkout_reprices_and_snapshots_totals() {
    let manager = create_test_manager();
    let order = manager
        .checkout(
            CheckoutRequest {
                items: vec![margherita(2)],
                customer: customer(),
                coupon_code: None,
            },
            &RequesterContext::user("u1"),
        )
        .unwrap();

    assert_eq!(order.items[0].unit.total, 2050.0);
    assert_eq!(order.subtotal, 4100.0);
    assert_eq!(order.discount, 0.0);
    assert_eq!(order.total, 4100.0);
    assert_eq!(order.current_stage, Stage::Placed);
    assert_eq!(order.status_history.len(), 1);
    assert_eq!(
        order.estimated_delivery_time - order.created_at,
        Duration::minutes(45)
    );
    assert_eq!(manager.store().get_order(&order.id).unwrap().unwrap(), order);
}

#[test]
fn test_checkout_rejects_bad_cart_and_customer() {
    let manager = create_test_manager();
    let ctx = RequesterContext::guest();

    let mut empty = checkout_req(None);
    empty.items.clear();
    assert!(matches!(manager.checkout(empty, &ctx), Err(ManagerError::Cart(_))));

    let mut zero = checkout_req(None);
    zero.items[0].quantity = 0;
    assert!(matches!(manager.checkout(zero, &ctx), Err(ManagerError::Cart(_))));

    let mut nameless = checkout_req(None);
    nameless.customer.name = "   ".into();
    assert!(matches!(
        manager.checkout(nameless, &ctx),
        Err(ManagerError::InvalidCustomer(_))
    ));

    assert_eq!(manager.store().stats().unwrap().order_count, 0);
}

#[test]
fn test_checkout_with_coupon_records_usage() {
    let manager = create_test_manager();
    create_offer(&manager, "PIZZA15", |o| {
        o.value = 15.0;
        o.max_discount = Some(200.0);
    });

    let order = manager
        .checkout(checkout_req(Some(" pizza15 ")), &RequesterContext::user("u1"))
        .unwrap();

    assert_eq!(order.subtotal, 2050.0);
    assert_eq!(order.discount, 200.0);
    assert_eq!(order.total, 1850.0);
    let applied = order.applied_offer.unwrap();
    assert_eq!(applied.code, "PIZZA15");
    assert_eq!(applied.discount_amount, 200.0);

    let offer = manager.store().get_offer("PIZZA15").unwrap().unwrap();
    assert_eq!(offer.used_count, 1);
    assert_eq!(offer.usage_for("u1"), 1);
    assert_eq!(manager.store().stats().unwrap().redemption_count, 1);
}

#[test]
fn test_rejected_coupon_aborts_whole_checkout() {
    let manager = create_test_manager();
    create_offer(&manager, "ONCE", |_| {});
    let ctx = RequesterContext::user("u1");

    manager.checkout(checkout_req(Some("ONCE")), &ctx).unwrap();
    let err = manager
        .checkout(checkout_req(Some("ONCE")), &ctx)
        .unwrap_err();
    assert!(matches!(
        err,
        ManagerError::Offer(OfferRejection::PerUserLimitReached { limit: 1 })
    ));

    assert_eq!(manager.store().stats().unwrap().order_count, 1);
    assert_eq!(
        manager.store().get_offer("ONCE").unwrap().unwrap().used_count,
        1
    );
}

#[test]
fn test_first_order_only_sees_prior_orders() {
    let manager = create_test_manager();
    create_offer(&manager, "WELCOME", |o| o.first_order_only = Some(true));
    let ctx = RequesterContext::user("u1");

    manager.checkout(checkout_req(None), &ctx).unwrap();
    assert!(matches!(
        manager.checkout(checkout_req(Some("WELCOME")), &ctx),
        Err(ManagerError::Offer(OfferRejection::FirstOrderOnly))
    ));
    assert!(
        manager
            .checkout(checkout_req(Some("WELCOME")), &RequesterContext::user("u2"))
            .is_ok()
    );
}

#[test]
fn test_guest_needs_login_for_tracked_coupon() {
    let manager = create_test_manager();
    create_offer(&manager, "TRACKED", |_| {});
    create_offer(&manager, "OPEN", |o| o.usage_limit_per_user = Some(0));

    assert!(matches!(
        manager.checkout(checkout_req(Some("TRACKED")), &RequesterContext::guest()),
        Err(ManagerError::Offer(OfferRejection::LoginRequired))
    ));

    let order = manager
        .checkout(checkout_req(Some("OPEN")), &RequesterContext::guest())
        .unwrap();
    assert!(order.user_id.is_none());
    assert_eq!(
        manager.store().get_offer("OPEN").unwrap().unwrap().used_count,
        1
    );
}

#[test]
fn test_concurrent_redemptions_never_exceed_global_limit() {
    let manager = create_test_manager();
    create_offer(&manager, "LAST", |o| o.usage_limit_total = Some(1));

    let results: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let manager = &manager;
                s.spawn(move || {
                    manager.checkout(
                        checkout_req(Some("LAST")),
                        &RequesterContext::user(format!("user-{i}")),
                    )
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let succeeded = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(succeeded, 1);
    for result in results.iter().filter_map(|r| r.as_ref().err()) {
        assert!(matches!(
            result,
            ManagerError::Offer(OfferRejection::GlobalLimitReached { limit: 1 })
        ));
    }
    assert_eq!(
        manager.store().get_offer("LAST").unwrap().unwrap().used_count,
        1
    );
    assert_eq!(manager.store().stats().unwrap().order_count, 1);
}

// ========================================================================
// Access
// ========================================================================

#[test]
fn test_order_visibility() {
    let manager = create_test_manager();
    let mine = manager
        .checkout(checkout_req(None), &RequesterContext::user("u1"))
        .unwrap();
    let guest = manager
        .checkout(checkout_req(None), &RequesterContext::guest())
        .unwrap();

    assert!(manager.get_order(&mine.id, &RequesterContext::user("u1")).is_ok());
    assert!(manager.get_order(&mine.id, &RequesterContext::admin("boss")).is_ok());
    assert!(matches!(
        manager.get_order(&mine.id, &RequesterContext::user("u2")),
        Err(ManagerError::Forbidden(_))
    ));
    assert!(matches!(
        manager.get_order(&mine.id, &RequesterContext::guest()),
        Err(ManagerError::Forbidden(_))
    ));
    assert!(manager.order_status(&guest.id, &RequesterContext::guest()).is_ok());
    assert!(matches!(
        manager.get_order("missing", &RequesterContext::guest()),
        Err(ManagerError::OrderNotFound(_))
    ));
}

#[test]
fn test_list_orders_scoping() {
    let manager = create_test_manager();
    manager
        .checkout(checkout_req(None), &RequesterContext::user("u1"))
        .unwrap();
    manager
        .checkout(checkout_req(None), &RequesterContext::user("u2"))
        .unwrap();

    assert_eq!(
        manager.list_orders(&RequesterContext::user("u1")).unwrap().len(),
        1
    );
    assert_eq!(
        manager.list_orders(&RequesterContext::admin("boss")).unwrap().len(),
        2
    );
    assert!(matches!(
        manager.list_orders(&RequesterContext::guest()),
        Err(ManagerError::NotAuthenticated)
    ));
}

// ========================================================================
// Stage updates
// ========================================================================

#[test]
fn test_update_stage_requires_admin() {
    let manager = create_test_manager();
    let order = manager
        .checkout(checkout_req(None), &RequesterContext::user("u1"))
        .unwrap();

    assert!(matches!(
        manager.update_stage(&order.id, 1, &RequesterContext::user("u1")),
        Err(ManagerError::Forbidden(_))
    ));
    assert!(matches!(
        manager.update_stage(&order.id, 1, &RequesterContext::guest()),
        Err(ManagerError::NotAuthenticated)
    ));
}

#[test]
fn test_update_stage_persists_and_rejects_backwards() {
    let manager = create_test_manager();
    let admin = RequesterContext::admin("boss");
    let order = manager
        .checkout(checkout_req(None), &RequesterContext::user("u1"))
        .unwrap();

    let updated = manager.update_stage(&order.id, 2, &admin).unwrap();
    assert_eq!(updated.current_stage, Stage::Baking);
    assert!(matches!(
        manager.update_stage(&order.id, 1, &admin),
        Err(ManagerError::Lifecycle(LifecycleError::BackwardTransition { .. }))
    ));

    let stored = manager.store().get_order(&order.id).unwrap().unwrap();
    assert_eq!(stored.current_stage, Stage::Baking);
    assert_eq!(stored.status_history.len(), 2);
    // checkout snapshot is untouched by transitions
    assert_eq!(stored.total, order.total);
}

#[test]
fn test_strict_policy_blocks_skips() {
    let store = Store::open_in_memory().unwrap();
    let manager = OrdersManager::new(
        store,
        OrderHub::new(),
        OfferEngine::default(),
        TransitionPolicy {
            strict_stepping: true,
        },
    );
    let admin = RequesterContext::admin("boss");
    let order = manager.checkout(checkout_req(None), &admin).unwrap();

    assert!(matches!(
        manager.update_stage(&order.id, 3, &admin),
        Err(ManagerError::Lifecycle(LifecycleError::StageSkipped { .. }))
    ));
    assert!(manager.update_stage(&order.id, 1, &admin).is_ok());
}

#[test]
fn test_update_missing_order() {
    let manager = create_test_manager();
    assert!(matches!(
        manager.update_stage("ghost", 1, &RequesterContext::admin("boss")),
        Err(ManagerError::OrderNotFound(_))
    ));
}

#[test]
fn test_cancel_guard() {
    let manager = create_test_manager();
    let owner = RequesterContext::user("u1");
    let early = manager.checkout(checkout_req(None), &owner).unwrap();
    let late = manager.checkout(checkout_req(None), &owner).unwrap();

    let cancelled = manager.cancel(&early.id, &owner).unwrap();
    assert_eq!(cancelled.status, "Cancelled");
    assert!(cancelled.cancelled_at.is_some());

    manager
        .update_stage(&late.id, 1, &RequesterContext::admin("boss"))
        .unwrap();
    assert!(matches!(
        manager.cancel(&late.id, &owner),
        Err(ManagerError::Lifecycle(
            LifecycleError::CannotCancelAfterPreparation(Stage::Preparing)
        ))
    ));
    assert!(matches!(
        manager.cancel(&late.id, &RequesterContext::user("u2")),
        Err(ManagerError::Lifecycle(LifecycleError::NotOwner))
    ));
}

// ========================================================================
// Notifications
// ========================================================================

#[tokio::test]
async fn test_events_published_after_commit() {
    let hub = OrderHub::new();
    let manager = OrdersManager::new(
        Store::open_in_memory().unwrap(),
        hub.clone(),
        OfferEngine::default(),
        TransitionPolicy::default(),
    );
    let mut admin_rx = hub.subscribe(ADMIN_DASHBOARD_CHANNEL);

    let order = manager
        .checkout(checkout_req(None), &RequesterContext::user("u1"))
        .unwrap();
    match admin_rx.recv().await.unwrap() {
        HubEvent::OrderCreated(e) => {
            assert_eq!(e.order_id, order.id);
            assert_eq!(e.total, order.total);
        }
        other => panic!("unexpected event: {other:?}"),
    }

    let mut order_rx = hub.subscribe(&order_channel(&order.id));
    manager
        .update_stage(&order.id, 1, &RequesterContext::admin("boss"))
        .unwrap();

    for rx in [&mut order_rx, &mut admin_rx] {
        match rx.recv().await.unwrap() {
            HubEvent::StatusChanged(e) => {
                assert_eq!(e.current_stage, Stage::Preparing);
                assert_eq!(e.status, "Preparing");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    // rejected transitions publish nothing
    assert!(manager
        .update_stage(&order.id, 0, &RequesterContext::admin("boss"))
        .is_err());
    assert!(order_rx.try_recv().is_err());
}
