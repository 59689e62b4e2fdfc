use crate::downstream::{AccountProvisioner, ProvisionedAccount};
use anyhow::{anyhow, Result};
use serde_json::json;

pub struct AccountsApiClient {
    pub base_url: String,
    pub api_key: String,
    pub timeout_ms: u64,
    pub client: reqwest::Client,
}

#[async_trait::async_trait]
impl AccountProvisioner for AccountsApiClient {
    async fn ensure_account(
        &self,
        email: &str,
        name: &str,
        phone: Option<&str>,
    ) -> Result<ProvisionedAccount> {
        let url = format!("{}/accounts", self.base_url);
        let body = json!({
            "email": email,
            "name": name,
            "phone": phone,
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
                let v: serde_json::Value = r.json().await?;
                let account_id = v
                    .get("account_id")
                    .and_then(|id| id.as_str())
                    .ok_or_else(|| anyhow!("accounts api response has no account_id"))?
                    .to_string();

                Ok(ProvisionedAccount {
                    account_id,
                    login_email: email.to_string(),
                    temporary_password: v
                        .get("temporary_password")
                        .and_then(|p| p.as_str())
                        .map(str::to_string),
                    created: v.get("created").and_then(|c| c.as_bool()).unwrap_or(false),
                })
            }
            Ok(r) => {
                let status = r.status();
                let body = r.text().await.unwrap_or_default();
                Err(anyhow!(
                    "account provisioning failed: HTTP_{} {}",
                    status.as_u16(),
                    body.chars().take(200).collect::<String>()
                ))
            }
            Err(e) if e.is_timeout() => Err(anyhow!("account provisioning timed out")),
            Err(e) => Err(anyhow!("account provisioning network error: {e}")),
        }
    }
}
