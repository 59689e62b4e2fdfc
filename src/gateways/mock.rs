use crate::domain::order::{GatewayKind, OrderStatus};
use crate::gateways::{id_field_to_string, GatewayPayment, PaymentGateway, WebhookParse};
use anyhow::{anyhow, Result};

pub struct MockGateway {
    pub kind: GatewayKind,
    pub behavior: String,
}

#[async_trait::async_trait]
impl PaymentGateway for MockGateway {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn kind(&self) -> GatewayKind {
        self.kind
    }

    fn parse_webhook(&self, raw: &serde_json::Value) -> WebhookParse {
        let Some(obj) = raw.as_object() else {
            return WebhookParse::Unrecognized;
        };
        if !obj.contains_key("id") && !obj.contains_key("status") {
            return WebhookParse::Unrecognized;
        }

        WebhookParse::Event {
            transaction_id: obj.get("id").and_then(id_field_to_string),
            provider_status: obj.get("status").and_then(|s| s.as_str()).map(str::to_string),
        }
    }

    fn map_status(&self, provider_status: &str) -> Option<OrderStatus> {
        match provider_status {
            "approved" => Some(OrderStatus::Paid),
            "pending" => Some(OrderStatus::Pending),
            "rejected" => Some(OrderStatus::Failed),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    async fn fetch_payment(&self, transaction_id: &str) -> Result<GatewayPayment> {
        match self.behavior.as_str() {
            "FETCH_ERROR" => Err(anyhow!("mock gateway unreachable")),
            "ALWAYS_PENDING" => Ok(GatewayPayment {
                transaction_id: transaction_id.to_string(),
                provider_status: "pending".to_string(),
                amount_minor: None,
            }),
            "ALWAYS_REJECTED" => Ok(GatewayPayment {
                transaction_id: transaction_id.to_string(),
                provider_status: "rejected".to_string(),
                amount_minor: None,
            }),
            _ => Ok(GatewayPayment {
                transaction_id: transaction_id.to_string(),
                provider_status: "approved".to_string(),
                amount_minor: None,
            }),
        }
    }
}
