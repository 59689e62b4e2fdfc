use crate::domain::order::{GatewayKind, OrderStatus};
use crate::gateways::{id_field_to_string, GatewayPayment, PaymentGateway, WebhookParse};
use anyhow::{anyhow, Result};

pub struct PagBankGateway {
    pub base_url: String,
    pub token: String,
    pub timeout_ms: u64,
    pub client: reqwest::Client,
}

#[async_trait::async_trait]
impl PaymentGateway for PagBankGateway {
    fn name(&self) -> &'static str {
        "pagbank"
    }

    fn kind(&self) -> GatewayKind {
        GatewayKind::Pagbank
    }

    fn parse_webhook(&self, raw: &serde_json::Value) -> WebhookParse {
        let Some(obj) = raw.as_object() else {
            return WebhookParse::Unrecognized;
        };

        if let Some(charge) = obj
            .get("charges")
            .and_then(|c| c.as_array())
            .and_then(|c| c.first())
            .and_then(|c| c.as_object())
        {
            return WebhookParse::Event {
                transaction_id: charge.get("id").and_then(id_field_to_string),
                provider_status: charge
                    .get("status")
                    .and_then(|s| s.as_str())
                    .map(str::to_string),
            };
        }

        if obj.contains_key("id") || obj.contains_key("status") {
            return WebhookParse::Event {
                transaction_id: obj.get("id").and_then(id_field_to_string),
                provider_status: obj.get("status").and_then(|s| s.as_str()).map(str::to_string),
            };
        }

        WebhookParse::Unrecognized
    }

    fn map_status(&self, provider_status: &str) -> Option<OrderStatus> {
        match provider_status {
            "PAID" => Some(OrderStatus::Paid),
            "AUTHORIZED" | "WAITING" | "IN_ANALYSIS" => Some(OrderStatus::Pending),
            "DECLINED" => Some(OrderStatus::Failed),
            "CANCELED" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    async fn fetch_payment(&self, transaction_id: &str) -> Result<GatewayPayment> {
        let url = format!("{}/charges/{}", self.base_url, transaction_id);
        let resp = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .timeout(std::time::Duration::from_millis(self.timeout_ms))
            .send()
            .await;

        match resp {
            Ok(r) if r.status().is_success() => {
                let v: serde_json::Value = r.json().await?;
                let provider_status = v
                    .get("status")
                    .and_then(|s| s.as_str())
                    .ok_or_else(|| anyhow!("pagbank charge {transaction_id} has no status"))?
                    .to_string();
                let amount_minor = v
                    .get("amount")
                    .and_then(|a| a.get("value"))
                    .and_then(|a| a.as_i64());

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
                    "pagbank charge lookup failed: HTTP_{} {}",
                    status.as_u16(),
                    body.chars().take(200).collect::<String>()
                ))
            }
            Err(e) if e.is_timeout() => Err(anyhow!("pagbank charge lookup timed out")),
            Err(e) => Err(anyhow!("pagbank charge lookup network error: {e}")),
        }
    }
}
