use crate::domain::order::{Order, OrderStatus};
use crate::gateways::PaymentGateway;
use crate::repo::orders_repo::OrdersRepo;
use crate::repo::provisioning_jobs_repo::ProvisioningJobsRepo;
use anyhow::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionPlan {
    Apply(OrderStatus),
    NoOp,
}

pub fn plan_transition(current: OrderStatus, target: OrderStatus) -> TransitionPlan {
    if current.is_terminal() || current == target {
        TransitionPlan::NoOp
    } else {
        TransitionPlan::Apply(target)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Transitioned(OrderStatus),
    StillPending,
    Duplicate,
    Ignored(String),
}

pub fn noop_outcome(current: OrderStatus) -> ReconcileOutcome {
    if current.is_terminal() {
        ReconcileOutcome::Duplicate
    } else {
        ReconcileOutcome::StillPending
    }
}

pub fn amounts_disagree(reported: Option<i64>, local: i64) -> bool {
    reported.is_some_and(|r| r != local)
}

#[derive(Clone)]
pub struct Reconciler {
    pub orders_repo: OrdersRepo,
    pub jobs_repo: ProvisioningJobsRepo,
    pub max_job_retries: i32,
}

impl Reconciler {
    pub async fn reconcile(
        &self,
        order: &Order,
        gateway: &dyn PaymentGateway,
        provider_status: &str,
        raw_payload: &serde_json::Value,
    ) -> Result<ReconcileOutcome> {
        let Some(target) = gateway.map_status(provider_status) else {
            tracing::warn!(
                "unmapped {} status '{}' for order {}, leaving order untouched",
                gateway.name(),
                provider_status,
                order.id
            );
            return Ok(ReconcileOutcome::Ignored(provider_status.to_string()));
        };

        match plan_transition(order.status, target) {
            TransitionPlan::NoOp => Ok(noop_outcome(order.status)),
            TransitionPlan::Apply(target) => {
                let applied = self
                    .orders_repo
                    .transition(order.id, target, raw_payload)
                    .await?;
                if !applied {
                    return Ok(ReconcileOutcome::Duplicate);
                }

                tracing::info!(
                    "order {} transitioned to {} ({} status '{}')",
                    order.id,
                    target.as_str(),
                    gateway.name(),
                    provider_status
                );

                if target == OrderStatus::Paid {
                    let enqueued = self
                        .jobs_repo
                        .enqueue_if_absent(order.id, self.max_job_retries)
                        .await?;
                    if enqueued {
                        tracing::info!("provisioning job enqueued for order {}", order.id);
                    }
                }

                Ok(ReconcileOutcome::Transitioned(target))
            }
        }
    }
}
