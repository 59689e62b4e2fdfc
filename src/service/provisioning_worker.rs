use crate::domain::order::Order;
use crate::downstream::{AccountProvisioner, CartCleanup, Mailer};
use crate::repo::orders_repo::OrdersRepo;
use crate::repo::provisioning_jobs_repo::{ProvisioningJob, ProvisioningJobsRepo};
use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;

#[async_trait::async_trait]
pub trait OrderProvisioner: Send + Sync {
    async fn provision(&self, order: &Order) -> Result<()>;
}

pub struct DefaultProvisioner {
    pub accounts: Arc<dyn AccountProvisioner>,
    pub mailer: Arc<dyn Mailer>,
    pub carts: Arc<dyn CartCleanup>,
}

#[async_trait::async_trait]
impl OrderProvisioner for DefaultProvisioner {
    async fn provision(&self, order: &Order) -> Result<()> {
        let account = self
            .accounts
            .ensure_account(
                &order.customer_email,
                &order.customer_name,
                order.customer_phone.as_deref(),
            )
            .await?;

        let cleared = self.carts.clear_for_email(&order.customer_email).await?;
        if cleared > 0 {
            tracing::info!("cleared {} abandoned cart entries for order {}", cleared, order.id);
        }

        self.mailer
            .send_welcome(&order.customer_email, &order.customer_name, &account)
            .await?;

        Ok(())
    }
}

#[async_trait::async_trait]
pub trait JobLifecycle: Send + Sync {
    async fn complete(&self, job_id: i64, retry_count: i32) -> Result<()>;
    async fn fail(&self, job_id: i64, retry_count: i32) -> Result<()>;
    async fn release(&self, job_id: i64, retry_count: i32) -> Result<()>;
    async fn reclaim(&self, job_id: i64) -> Result<bool>;
}

#[async_trait::async_trait]
impl JobLifecycle for ProvisioningJobsRepo {
    async fn complete(&self, job_id: i64, retry_count: i32) -> Result<()> {
        self.mark_completed(job_id, retry_count).await
    }

    async fn fail(&self, job_id: i64, retry_count: i32) -> Result<()> {
        self.mark_failed(job_id, retry_count).await
    }

    async fn release(&self, job_id: i64, retry_count: i32) -> Result<()> {
        self.mark_retry(job_id, retry_count).await
    }

    async fn reclaim(&self, job_id: i64) -> Result<bool> {
        ProvisioningJobsRepo::reclaim(self, job_id).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Completed { retry_count: i32 },
    Failed { retry_count: i32 },
    Stolen,
}

pub async fn drive_job(
    job: &ProvisioningJob,
    order: &Order,
    provisioner: &dyn OrderProvisioner,
    lifecycle: &dyn JobLifecycle,
) -> Result<JobOutcome> {
    let mut retry_count = job.retry_count;
    loop {
        match provisioner.provision(order).await {
            Ok(()) => {
                lifecycle.complete(job.id, retry_count).await?;
                return Ok(JobOutcome::Completed { retry_count });
            }
            Err(err) => {
                retry_count += 1;
                tracing::warn!(
                    "provisioning attempt {}/{} for job {} (order {}) failed: {err:#}",
                    retry_count,
                    job.max_retries,
                    job.id,
                    order.id
                );

                if retry_count >= job.max_retries {
                    lifecycle.fail(job.id, retry_count).await?;
                    return Ok(JobOutcome::Failed { retry_count });
                }

                lifecycle.release(job.id, retry_count).await?;
                if !lifecycle.reclaim(job.id).await? {
                    return Ok(JobOutcome::Stolen);
                }
            }
        }
    }
}

#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct RunStats {
    pub processed: u32,
    pub succeeded: u32,
    pub failed: u32,
}

#[derive(Clone)]
pub struct ProvisioningWorker {
    pub jobs_repo: ProvisioningJobsRepo,
    pub orders_repo: OrdersRepo,
    pub provisioner: Arc<dyn OrderProvisioner>,
    pub batch_size: i64,
    pub interval_secs: u64,
    pub stale_secs: i64,
}

impl ProvisioningWorker {
    pub async fn run(self) {
        loop {
            match self.run_once(self.batch_size).await {
                Ok(stats) if stats.processed > 0 => {
                    tracing::info!(
                        "provisioning run finished: {} processed, {} succeeded, {} failed",
                        stats.processed,
                        stats.succeeded,
                        stats.failed
                    );
                }
                Ok(_) => {}
                Err(err) => tracing::error!("provisioning run error: {err:#}"),
            }
            tokio::time::sleep(std::time::Duration::from_secs(self.interval_secs)).await;
        }
    }

    pub async fn run_once(&self, batch_size: i64) -> Result<RunStats> {
        let released = self.jobs_repo.release_stale(self.stale_secs).await?;
        if released > 0 {
            tracing::warn!("returned {} stale processing jobs to pending", released);
        }

        let jobs = self.jobs_repo.claim_pending(batch_size).await?;
        let mut stats = RunStats::default();

        for job in &jobs {
            stats.processed += 1;

            let Some(order) = self.orders_repo.find_by_id(job.sale_id).await? else {
                tracing::error!("job {} references missing order {}", job.id, job.sale_id);
                self.jobs_repo.mark_failed(job.id, job.retry_count).await?;
                stats.failed += 1;
                continue;
            };

            match drive_job(job, &order, self.provisioner.as_ref(), &self.jobs_repo).await? {
                JobOutcome::Completed { .. } => stats.succeeded += 1,
                JobOutcome::Failed { .. } => stats.failed += 1,
                JobOutcome::Stolen => {}
            }
        }

        Ok(stats)
    }
}
