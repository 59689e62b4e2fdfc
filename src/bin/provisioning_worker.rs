use anyhow::Result;
use payment_reconciler::config::AppConfig;
use payment_reconciler::downstream::accounts::AccountsApiClient;
use payment_reconciler::downstream::email::EmailApiClient;
use payment_reconciler::repo::abandoned_carts_repo::AbandonedCartsRepo;
use payment_reconciler::repo::orders_repo::OrdersRepo;
use payment_reconciler::repo::provisioning_jobs_repo::ProvisioningJobsRepo;
use payment_reconciler::service::provisioning_worker::{DefaultProvisioner, ProvisioningWorker};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&cfg.database_url)
        .await?;

    let provisioner = DefaultProvisioner {
        accounts: Arc::new(AccountsApiClient {
            base_url: cfg.accounts_api_url.clone(),
            api_key: cfg.accounts_api_key.clone(),
            timeout_ms: cfg.downstream_timeout_ms,
            client: reqwest::Client::new(),
        }),
        mailer: Arc::new(EmailApiClient {
            base_url: cfg.email_api_url.clone(),
            api_key: cfg.email_api_key.clone(),
            timeout_ms: cfg.downstream_timeout_ms,
            client: reqwest::Client::new(),
        }),
        carts: Arc::new(AbandonedCartsRepo { pool: pool.clone() }),
    };

    let worker = ProvisioningWorker {
        jobs_repo: ProvisioningJobsRepo { pool: pool.clone() },
        orders_repo: OrdersRepo { pool },
        provisioner: Arc::new(provisioner),
        batch_size: cfg.provisioning_batch,
        interval_secs: cfg.provisioning_interval_secs,
        stale_secs: cfg.provisioning_stale_secs,
    };

    worker.run().await;
    Ok(())
}
