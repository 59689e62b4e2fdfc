use crate::domain::order::{GatewayKind, Order};
use crate::repo::orders_repo::OrdersRepo;
use anyhow::Result;
use std::sync::Arc;

#[async_trait::async_trait]
pub trait OrderLookup: Send + Sync {
    async fn find_by_transaction(
        &self,
        gateway: GatewayKind,
        transaction_id: &str,
    ) -> Result<Option<Order>>;
}

#[async_trait::async_trait]
impl OrderLookup for OrdersRepo {
    async fn find_by_transaction(
        &self,
        gateway: GatewayKind,
        transaction_id: &str,
    ) -> Result<Option<Order>> {
        OrdersRepo::find_by_transaction(self, gateway, transaction_id).await
    }
}

#[derive(Debug)]
pub enum Located {
    Found { order: Order, lookups: u32 },
    NotFoundYet { lookups: u32 },
}

#[derive(Clone)]
pub struct OrderLocator {
    pub orders: Arc<dyn OrderLookup>,
    pub attempts: u32,
    pub delay_ms: u64,
}

impl OrderLocator {
    pub async fn locate(&self, gateway: GatewayKind, transaction_id: &str) -> Result<Located> {
        let attempts = self.attempts.max(1);
        for attempt in 1..=attempts {
            if let Some(order) = self
                .orders
                .find_by_transaction(gateway, transaction_id)
                .await?
            {
                return Ok(Located::Found {
                    order,
                    lookups: attempt,
                });
            }

            if attempt < attempts {
                tracing::debug!(
                    "order for {} txn {} not visible yet (attempt {}), waiting for checkout commit",
                    gateway.as_str(),
                    transaction_id,
                    attempt
                );
                tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
            }
        }

        Ok(Located::NotFoundYet { lookups: attempts })
    }
}
