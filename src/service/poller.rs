use crate::domain::order::{GatewayKind, Order, OrderStatus};
use crate::gateways::PaymentGateway;
use crate::repo::orders_repo::OrdersRepo;
use crate::service::reconciler::{amounts_disagree, Reconciler};
use anyhow::Result;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub enum OrderRef {
    Id(Uuid),
    Transaction(GatewayKind, String),
}

#[derive(Debug, Clone, Serialize)]
pub struct PollResult {
    pub order_id: Uuid,
    pub status: String,
    pub order_status: OrderStatus,
    pub is_paid: bool,
    pub synced_from_gateway: bool,
}

#[derive(Clone)]
pub struct StatusPoller {
    pub orders_repo: OrdersRepo,
    pub reconciler: Reconciler,
    pub mercadopago: Arc<dyn PaymentGateway>,
    pub pagbank: Arc<dyn PaymentGateway>,
}

impl StatusPoller {
    fn gateway(&self, kind: GatewayKind) -> &Arc<dyn PaymentGateway> {
        match kind {
            GatewayKind::Mercadopago => &self.mercadopago,
            GatewayKind::Pagbank => &self.pagbank,
        }
    }

    pub async fn poll(&self, order_ref: OrderRef) -> Result<Option<PollResult>> {
        let order = match order_ref {
            OrderRef::Id(id) => self.orders_repo.find_by_id(id).await?,
            OrderRef::Transaction(gateway, ref txn) => {
                self.orders_repo.find_by_transaction(gateway, txn).await?
            }
        };
        let Some(order) = order else {
            return Ok(None);
        };

        if order.status.is_terminal() {
            return Ok(Some(local_result(order, false)));
        }

        let Some(transaction_id) = order.gateway_transaction_id.clone() else {
            return Ok(Some(local_result(order, false)));
        };

        let gateway = self.gateway(order.gateway).clone();
        let payment = match gateway.fetch_payment(&transaction_id).await {
            Ok(payment) => payment,
            Err(err) => {
                tracing::warn!(
                    "{} status fetch for order {} failed, returning local state: {err:#}",
                    gateway.name(),
                    order.id
                );
                return Ok(Some(local_result(order, false)));
            }
        };

        if amounts_disagree(payment.amount_minor, order.amount_minor) {
            tracing::warn!(
                "{} reports amount {:?} for order {} but local amount is {}",
                gateway.name(),
                payment.amount_minor,
                order.id,
                order.amount_minor
            );
        }

        let raw_payload = json!({
            "source": "status_poll",
            "transaction_id": payment.transaction_id,
            "status": payment.provider_status,
        });
        self.reconciler
            .reconcile(&order, gateway.as_ref(), &payment.provider_status, &raw_payload)
            .await?;

        let refreshed = self.orders_repo.find_by_id(order.id).await?.unwrap_or(order);
        Ok(Some(PollResult {
            order_id: refreshed.id,
            status: payment.provider_status,
            is_paid: refreshed.status == OrderStatus::Paid,
            order_status: refreshed.status,
            synced_from_gateway: true,
        }))
    }
}

fn local_result(order: Order, synced: bool) -> PollResult {
    PollResult {
        order_id: order.id,
        status: order.status.as_str().to_string(),
        is_paid: order.status == OrderStatus::Paid,
        order_status: order.status,
        synced_from_gateway: synced,
    }
}
