use anyhow::Result;
use chrono::Utc;
use payment_reconciler::domain::order::{GatewayKind, Order, OrderStatus};
use payment_reconciler::service::locator::{Located, OrderLocator, OrderLookup};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use uuid::Uuid;

fn pending_order(transaction_id: &str) -> Order {
    let now = Utc::now();
    Order {
        id: Uuid::new_v4(),
        gateway: GatewayKind::Mercadopago,
        gateway_transaction_id: Some(transaction_id.to_string()),
        status: OrderStatus::Pending,
        customer_email: "buyer@example.com".to_string(),
        customer_name: "Buyer".to_string(),
        customer_phone: None,
        amount_minor: 9900,
        currency: "BRL".to_string(),
        created_at: now,
        updated_at: now,
        paid_at: None,
    }
}

struct ScriptedLookup {
    calls: AtomicU32,
    appear_after: Option<u32>,
}

impl ScriptedLookup {
    fn new(appear_after: Option<u32>) -> Self {
        Self {
            calls: AtomicU32::new(0),
            appear_after,
        }
    }
}

#[async_trait::async_trait]
impl OrderLookup for ScriptedLookup {
    async fn find_by_transaction(
        &self,
        _gateway: GatewayKind,
        transaction_id: &str,
    ) -> Result<Option<Order>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        match self.appear_after {
            Some(k) if call >= k => Ok(Some(pending_order(transaction_id))),
            _ => Ok(None),
        }
    }
}

#[tokio::test(start_paused = true)]
async fn order_committed_between_attempts_is_found() {
    let lookup = Arc::new(ScriptedLookup::new(Some(3)));
    let locator = OrderLocator {
        orders: lookup.clone(),
        attempts: 5,
        delay_ms: 2000,
    };

    let located = locator
        .locate(GatewayKind::Mercadopago, "12345678901")
        .await
        .unwrap();

    match located {
        Located::Found { order, lookups } => {
            assert_eq!(lookups, 3);
            assert_eq!(order.gateway_transaction_id.as_deref(), Some("12345678901"));
        }
        Located::NotFoundYet { .. } => panic!("order should have surfaced on the third lookup"),
    }
    assert_eq!(lookup.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn order_never_committed_exhausts_every_attempt() {
    let lookup = Arc::new(ScriptedLookup::new(None));
    let locator = OrderLocator {
        orders: lookup.clone(),
        attempts: 5,
        delay_ms: 2000,
    };

    let located = locator
        .locate(GatewayKind::Mercadopago, "12345678901")
        .await
        .unwrap();

    match located {
        Located::NotFoundYet { lookups } => assert_eq!(lookups, 5),
        Located::Found { .. } => panic!("lookup should never find the order"),
    }
    assert_eq!(lookup.calls.load(Ordering::SeqCst), 5);
}

#[tokio::test(start_paused = true)]
async fn order_visible_on_first_attempt_skips_the_wait() {
    let lookup = Arc::new(ScriptedLookup::new(Some(1)));
    let locator = OrderLocator {
        orders: lookup.clone(),
        attempts: 5,
        delay_ms: 2000,
    };

    let located = locator
        .locate(GatewayKind::Mercadopago, "12345678901")
        .await
        .unwrap();

    match located {
        Located::Found { lookups, .. } => assert_eq!(lookups, 1),
        Located::NotFoundYet { .. } => panic!("order is visible immediately"),
    }
    assert_eq!(lookup.calls.load(Ordering::SeqCst), 1);
}
