use payment_reconciler::domain::order::{GatewayKind, OrderStatus};
use payment_reconciler::gateways::mock::MockGateway;
use payment_reconciler::gateways::PaymentGateway;
use payment_reconciler::service::reconciler::{plan_transition, TransitionPlan};

fn mock(behavior: &str) -> MockGateway {
    MockGateway {
        kind: GatewayKind::Mercadopago,
        behavior: behavior.to_string(),
    }
}

#[tokio::test]
async fn gateway_approved_report_plans_the_same_paid_transition_as_a_webhook() {
    let gw = mock("ALWAYS_APPROVED");
    let payment = gw.fetch_payment("12345678901").await.unwrap();

    let target = gw.map_status(&payment.provider_status).expect("approved is mapped");
    assert_eq!(
        plan_transition(OrderStatus::Pending, target),
        TransitionPlan::Apply(OrderStatus::Paid)
    );
}

#[tokio::test]
async fn gateway_still_pending_report_plans_no_transition() {
    let gw = mock("ALWAYS_PENDING");
    let payment = gw.fetch_payment("12345678901").await.unwrap();

    let target = gw.map_status(&payment.provider_status).unwrap();
    assert_eq!(plan_transition(OrderStatus::Pending, target), TransitionPlan::NoOp);
}

#[tokio::test]
async fn gateway_rejected_report_plans_failed_transition() {
    let gw = mock("ALWAYS_REJECTED");
    let payment = gw.fetch_payment("12345678901").await.unwrap();

    let target = gw.map_status(&payment.provider_status).unwrap();
    assert_eq!(
        plan_transition(OrderStatus::Pending, target),
        TransitionPlan::Apply(OrderStatus::Failed)
    );
}

#[tokio::test]
async fn unreachable_gateway_is_a_transient_error_not_an_outcome() {
    let gw = mock("FETCH_ERROR");
    assert!(gw.fetch_payment("12345678901").await.is_err());
}
