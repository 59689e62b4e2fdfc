use crate::domain::order::{GatewayKind, OrderStatus};
use crate::gateways::{id_field_to_string, GatewayPayment, PaymentGateway, WebhookParse};
use anyhow::{anyhow, Result};

pub struct MercadoPagoGateway {
    pub base_url: String,
    pub access_token: String,
    pub timeout_ms: u64,
    pub client: reqwest::Client,
}

#[async_trait::async_trait]
impl PaymentGateway for MercadoPagoGateway {
    fn name(&self) -> &'static str {
        "mercadopago"
    }

    fn kind(&self) -> GatewayKind {
        GatewayKind::Mercadopago
    }

    fn parse_webhook(&self, raw: &serde_json::Value) -> WebhookParse {
        let Some(obj) = raw.as_object() else {
            return WebhookParse::Unrecognized;
        };

        let looks_like_event = obj.contains_key("data")
            || obj.contains_key("resource")
            || obj.contains_key("type")
            || obj.contains_key("topic")
            || obj.contains_key("action");
        if !looks_like_event {
            return WebhookParse::Unrecognized;
        }

        let data = obj.get("data").and_then(|d| d.as_object());

        let transaction_id = data
            .and_then(|d| d.get("id"))
            .and_then(id_field_to_string)
            .or_else(|| {
                obj.get("resource")
                    .and_then(|r| r.as_str())
                    .and_then(|r| r.rsplit('/').next())
                    .filter(|tail| !tail.is_empty())
                    .map(str::to_string)
            });

        let provider_status = data
            .and_then(|d| d.get("status"))
            .and_then(|s| s.as_str())
            .map(str::to_string);

        WebhookParse::Event {
            transaction_id,
            provider_status,
        }
    }

    fn map_status(&self, provider_status: &str) -> Option<OrderStatus> {
        match provider_status {
            "approved" => Some(OrderStatus::Paid),
            "pending" | "in_process" | "in_mediation" | "authorized" => Some(OrderStatus::Pending),
            "rejected" => Some(OrderStatus::Failed),
            "cancelled" | "expired" | "refunded" | "charged_back" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    async fn fetch_payment(&self, transaction_id: &str) -> Result<GatewayPayment> {
        let url = format!("{}/v1/payments/{}", self.base_url, transaction_id);
        let resp = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .timeout(std::time::Duration::from_millis(self.timeout_ms))
            .send()
            .await;

        match resp {
            Ok(r) if r.status().is_success() => {
                let v: serde_json::Value = r.json().await?;
                let provider_status = v
                    .get("status")
                    .and_then(|s| s.as_str())
                    .ok_or_else(|| anyhow!("mercadopago payment {transaction_id} has no status"))?
                    .to_string();
                let amount_minor = v
                    .get("transaction_amount")
                    .and_then(|a| a.as_f64())
                    .map(|a| (a * 100.0).round() as i64);

                Ok(GatewayPayment {
                    transaction_id: transaction_id.to_string(),
                    provider_status,
                    amount_minor,
                })
            }
            Ok(r) => {
                let status = r.status();
                let body = r.text().await.unwrap_or_default();
                Err(anyhow!(
                    "mercadopago payment lookup failed: HTTP_{} {}",
                    status.as_u16(),
                    body.chars().take(200).collect::<String>()
                ))
            }
            Err(e) if e.is_timeout() => Err(anyhow!("mercadopago payment lookup timed out")),
            Err(e) => Err(anyhow!("mercadopago payment lookup network error: {e}")),
        }
    }
}
