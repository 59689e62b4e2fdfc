use payment_reconciler::domain::order::OrderStatus;
use payment_reconciler::gateways::mercadopago::MercadoPagoGateway;
use payment_reconciler::gateways::pagbank::PagBankGateway;
use payment_reconciler::gateways::PaymentGateway;

fn mercadopago() -> MercadoPagoGateway {
    MercadoPagoGateway {
        base_url: "http://localhost".to_string(),
        access_token: String::new(),
        timeout_ms: 100,
        client: reqwest::Client::new(),
    }
}

fn pagbank() -> PagBankGateway {
    PagBankGateway {
        base_url: "http://localhost".to_string(),
        token: String::new(),
        timeout_ms: 100,
        client: reqwest::Client::new(),
    }
}

#[test]
fn mercadopago_approved_maps_to_paid() {
    assert_eq!(mercadopago().map_status("approved"), Some(OrderStatus::Paid));
}

#[test]
fn mercadopago_in_flight_statuses_stay_pending() {
    let gw = mercadopago();
    for status in ["pending", "in_process", "in_mediation", "authorized"] {
        assert_eq!(gw.map_status(status), Some(OrderStatus::Pending), "{status}");
    }
}

#[test]
fn mercadopago_rejected_maps_to_failed() {
    assert_eq!(mercadopago().map_status("rejected"), Some(OrderStatus::Failed));
}

#[test]
fn mercadopago_terminal_negatives_map_to_cancelled() {
    let gw = mercadopago();
    for status in ["cancelled", "expired", "refunded", "charged_back"] {
        assert_eq!(gw.map_status(status), Some(OrderStatus::Cancelled), "{status}");
    }
}

#[test]
fn mercadopago_unknown_status_is_unmapped() {
    assert_eq!(mercadopago().map_status("weird_new_status"), None);
}

#[test]
fn pagbank_paid_maps_to_paid() {
    assert_eq!(pagbank().map_status("PAID"), Some(OrderStatus::Paid));
}

#[test]
fn pagbank_in_flight_statuses_stay_pending() {
    let gw = pagbank();
    for status in ["AUTHORIZED", "WAITING", "IN_ANALYSIS"] {
        assert_eq!(gw.map_status(status), Some(OrderStatus::Pending), "{status}");
    }
}

#[test]
fn pagbank_declined_maps_to_failed() {
    assert_eq!(pagbank().map_status("DECLINED"), Some(OrderStatus::Failed));
}

#[test]
fn pagbank_canceled_maps_to_cancelled() {
    assert_eq!(pagbank().map_status("CANCELED"), Some(OrderStatus::Cancelled));
}

#[test]
fn pagbank_unknown_status_is_unmapped() {
    assert_eq!(pagbank().map_status("paid"), None);
    assert_eq!(pagbank().map_status(""), None);
}
