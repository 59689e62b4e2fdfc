use anyhow::Result;

pub mod accounts;
pub mod email;

#[derive(Debug, Clone)]
pub struct ProvisionedAccount {
    pub account_id: String,
    pub login_email: String,
    pub temporary_password: Option<String>,
    pub created: bool,
}

#[async_trait::async_trait]
pub trait AccountProvisioner: Send + Sync {
    async fn ensure_account(
        &self,
        email: &str,
        name: &str,
        phone: Option<&str>,
    ) -> Result<ProvisionedAccount>;
}

#[async_trait::async_trait]
pub trait Mailer: Send + Sync {
    async fn send_welcome(&self, to: &str, name: &str, account: &ProvisionedAccount) -> Result<()>;
}

#[async_trait::async_trait]
pub trait CartCleanup: Send + Sync {
    async fn clear_for_email(&self, email: &str) -> Result<u64>;
}

#[async_trait::async_trait]
impl CartCleanup for crate::repo::abandoned_carts_repo::AbandonedCartsRepo {
    async fn clear_for_email(&self, email: &str) -> Result<u64> {
        self.delete_by_email(email).await
    }
}
