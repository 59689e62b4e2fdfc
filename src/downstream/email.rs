use crate::downstream::{Mailer, ProvisionedAccount};
use anyhow::{anyhow, Result};
use serde_json::json;

pub struct EmailApiClient {
    pub base_url: String,
    pub api_key: String,
    pub timeout_ms: u64,
    pub client: reqwest::Client,
}

#[async_trait::async_trait]
impl Mailer for EmailApiClient {
    async fn send_welcome(&self, to: &str, name: &str, account: &ProvisionedAccount) -> Result<()> {
        let url = format!("{}/messages/welcome", self.base_url);
        let body = json!({
            "to": to,
            "name": name,
            "login_email": account.login_email,
            "temporary_password": account.temporary_password,
        });

        let resp = self
            .client
            .post(url)
            .header("X-Api-Key", &self.api_key)
            .json(&body)
            .timeout(std::time::Duration::from_millis(self.timeout_ms))
            .send()
            .await;

        match resp {
            Ok(r) if r.status().is_success() => {
                tracing::info!("welcome email for {} accepted (account {})", to, account.account_id);
                Ok(())
            }
            Ok(r) => {
                let status = r.status();
                let body = r.text().await.unwrap_or_default();
                Err(anyhow!(
                    "welcome email rejected: HTTP_{} {}",
                    status.as_u16(),
                    body.chars().take(200).collect::<String>()
                ))
            }
            Err(e) if e.is_timeout() => Err(anyhow!("welcome email send timed out")),
            Err(e) => Err(anyhow!("welcome email network error: {e}")),
        }
    }
}
