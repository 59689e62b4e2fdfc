use crate::domain::order::{GatewayKind, OrderStatus};
use crate::gateways::PaymentGateway;
use crate::repo::audit_log_repo::AuditLogRepo;
use crate::service::classifier::{classify, ClassifiedEvent};
use crate::service::locator::{Located, OrderLocator};
use crate::service::reconciler::{amounts_disagree, ReconcileOutcome, Reconciler};
use anyhow::Result;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    Processed(OrderStatus),
    StillPending,
    Duplicate,
    Ignored,
    Probe,
    Deferred,
    Malformed,
}

#[derive(Clone)]
pub struct ReconciliationService {
    pub pool: PgPool,
    pub audit_log: AuditLogRepo,
    pub locator: OrderLocator,
    pub reconciler: Reconciler,
    pub mercadopago: Arc<dyn PaymentGateway>,
    pub pagbank: Arc<dyn PaymentGateway>,
}

impl ReconciliationService {
    pub fn gateway(&self, kind: GatewayKind) -> &Arc<dyn PaymentGateway> {
        match kind {
            GatewayKind::Mercadopago => &self.mercadopago,
            GatewayKind::Pagbank => &self.pagbank,
        }
    }

    pub async fn handle_webhook(&self, kind: GatewayKind, body: &str) -> Result<WebhookOutcome> {
        let gateway = self.gateway(kind).clone();

        let raw = match serde_json::from_str::<serde_json::Value>(body) {
            Ok(v) => v,
            Err(_) => {
                let entry_id = self
                    .audit_log
                    .record(gateway.name(), &json!({ "unparseable_body": body }))
                    .await?;
                self.audit_log
                    .mark_processed(entry_id, "malformed", Some("body is not valid json"), 0)
                    .await?;
                return Ok(WebhookOutcome::Malformed);
            }
        };

        let entry_id = self.audit_log.record(gateway.name(), &raw).await?;

        let (transaction_id, provider_status) = match classify(&gateway.parse_webhook(&raw)) {
            ClassifiedEvent::Malformed => {
                self.audit_log
                    .mark_processed(entry_id, "malformed", Some("unrecognized event envelope"), 0)
                    .await?;
                return Ok(WebhookOutcome::Malformed);
            }
            ClassifiedEvent::Probe => {
                self.audit_log.mark_processed(entry_id, "probe", None, 0).await?;
                return Ok(WebhookOutcome::Probe);
            }
            ClassifiedEvent::Payment {
                transaction_id,
                provider_status,
            } => (transaction_id, provider_status),
        };

        let (order, lookups) = match self.locator.locate(kind, &transaction_id).await? {
            Located::NotFoundYet { lookups } => {
                tracing::info!(
                    "no order for {} txn {} within retry window, deferring",
                    gateway.name(),
                    transaction_id
                );
                self.audit_log
                    .mark_processed(
                        entry_id,
                        "deferred",
                        Some("order not visible within retry window"),
                        retries(lookups),
                    )
                    .await?;
                return Ok(WebhookOutcome::Deferred);
            }
            Located::Found { order, lookups } => (order, lookups),
        };

        let provider_status = match provider_status {
            Some(s) => s,
            None => match gateway.fetch_payment(&transaction_id).await {
                Ok(payment) => {
                    if amounts_disagree(payment.amount_minor, order.amount_minor) {
                        tracing::warn!(
                            "{} reports amount {:?} for order {} but local amount is {}",
                            gateway.name(),
                            payment.amount_minor,
                            order.id,
                            order.amount_minor
                        );
                    }
                    payment.provider_status
                }
                Err(err) => {
                    tracing::warn!(
                        "status fetch for {} txn {} failed, deferring to redelivery: {err:#}",
                        gateway.name(),
                        transaction_id
                    );
                    let detail = format!("status fetch failed: {err:#}");
                    self.audit_log
                        .mark_processed(entry_id, "deferred", Some(detail.as_str()), retries(lookups))
                        .await?;
                    return Ok(WebhookOutcome::Deferred);
                }
            },
        };

        let outcome = self
            .reconciler
            .reconcile(&order, gateway.as_ref(), &provider_status, &raw)
            .await?;

        let label = match &outcome {
            ReconcileOutcome::Transitioned(status) => format!("transitioned:{}", status.as_str()),
            ReconcileOutcome::StillPending => "still_pending".to_string(),
            ReconcileOutcome::Duplicate => "duplicate".to_string(),
            ReconcileOutcome::Ignored(status) => format!("ignored:{status}"),
        };
        self.audit_log
            .mark_processed(entry_id, &label, None, retries(lookups))
            .await?;

        Ok(match outcome {
            ReconcileOutcome::Transitioned(status) => WebhookOutcome::Processed(status),
            ReconcileOutcome::StillPending => WebhookOutcome::StillPending,
            ReconcileOutcome::Duplicate => WebhookOutcome::Duplicate,
            ReconcileOutcome::Ignored(_) => WebhookOutcome::Ignored,
        })
    }
}

fn retries(lookups: u32) -> i32 {
    lookups.saturating_sub(1) as i32
}
