use crate::domain::order::{GatewayKind, OrderStatus};
use anyhow::Result;

pub mod mercadopago;
pub mod mock;
pub mod pagbank;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookParse {
    Event {
        transaction_id: Option<String>,
        provider_status: Option<String>,
    },
    Unrecognized,
}

#[derive(Debug, Clone)]
pub struct GatewayPayment {
    pub transaction_id: String,
    pub provider_status: String,
    pub amount_minor: Option<i64>,
}

#[async_trait::async_trait]
pub trait PaymentGateway: Send + Sync {
    fn name(&self) -> &'static str;

    fn kind(&self) -> GatewayKind;

    fn parse_webhook(&self, raw: &serde_json::Value) -> WebhookParse;

    fn map_status(&self, provider_status: &str) -> Option<OrderStatus>;

    async fn fetch_payment(&self, transaction_id: &str) -> Result<GatewayPayment>;
}

fn id_field_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
