use anyhow::{anyhow, Result};
use chrono::Utc;
use payment_reconciler::domain::order::{GatewayKind, Order, OrderStatus};
use payment_reconciler::downstream::{AccountProvisioner, CartCleanup, Mailer, ProvisionedAccount};
use payment_reconciler::repo::provisioning_jobs_repo::ProvisioningJob;
use payment_reconciler::service::provisioning_worker::{
    drive_job, DefaultProvisioner, JobLifecycle, JobOutcome, OrderProvisioner,
};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

fn paid_order() -> Order {
    Order {
        id: Uuid::new_v4(),
        gateway: GatewayKind::Mercadopago,
        gateway_transaction_id: Some("12345678901".to_string()),
        status: OrderStatus::Paid,
        customer_email: "buyer@example.com".to_string(),
        customer_name: "Buyer".to_string(),
        customer_phone: None,
        amount_minor: 19900,
        currency: "BRL".to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
        paid_at: Some(Utc::now()),
    }
}

fn job(retry_count: i32, max_retries: i32) -> ProvisioningJob {
    ProvisioningJob {
        id: 1,
        sale_id: Uuid::new_v4(),
        retry_count,
        max_retries,
    }
}

struct ScriptedProvisioner {
    failures_before_success: AtomicU32,
    attempts: AtomicU32,
}

impl ScriptedProvisioner {
    fn failing_first(n: u32) -> Self {
        Self {
            failures_before_success: AtomicU32::new(n),
            attempts: AtomicU32::new(0),
        }
    }
}

#[async_trait::async_trait]
impl OrderProvisioner for ScriptedProvisioner {
    async fn provision(&self, _order: &Order) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failures_before_success.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures_before_success.store(remaining - 1, Ordering::SeqCst);
            return Err(anyhow!("email send timed out"));
        }
        Ok(())
    }
}

#[derive(Default)]
struct MemoryLifecycle {
    status: Mutex<String>,
    retry_count: Mutex<i32>,
    releases: AtomicU32,
    reclaims: AtomicU32,
    reclaim_succeeds: bool,
}

#[async_trait::async_trait]
impl JobLifecycle for MemoryLifecycle {
    async fn complete(&self, _job_id: i64, retry_count: i32) -> Result<()> {
        *self.status.lock().unwrap() = "completed".to_string();
        *self.retry_count.lock().unwrap() = retry_count;
        Ok(())
    }

    async fn fail(&self, _job_id: i64, retry_count: i32) -> Result<()> {
        *self.status.lock().unwrap() = "failed".to_string();
        *self.retry_count.lock().unwrap() = retry_count;
        Ok(())
    }

    async fn release(&self, _job_id: i64, retry_count: i32) -> Result<()> {
        self.releases.fetch_add(1, Ordering::SeqCst);
        *self.status.lock().unwrap() = "pending".to_string();
        *self.retry_count.lock().unwrap() = retry_count;
        Ok(())
    }

    async fn reclaim(&self, _job_id: i64) -> Result<bool> {
        self.reclaims.fetch_add(1, Ordering::SeqCst);
        if self.reclaim_succeeds {
            *self.status.lock().unwrap() = "processing".to_string();
        }
        Ok(self.reclaim_succeeds)
    }
}

#[tokio::test]
async fn two_failures_then_success_completes_with_retry_count_two() {
    let provisioner = ScriptedProvisioner::failing_first(2);
    let lifecycle = MemoryLifecycle {
        reclaim_succeeds: true,
        ..Default::default()
    };

    let outcome = drive_job(&job(0, 3), &paid_order(), &provisioner, &lifecycle)
        .await
        .unwrap();

    assert_eq!(outcome, JobOutcome::Completed { retry_count: 2 });
    assert_eq!(provisioner.attempts.load(Ordering::SeqCst), 3);
    assert_eq!(*lifecycle.status.lock().unwrap(), "completed");
    assert_eq!(*lifecycle.retry_count.lock().unwrap(), 2);
    assert_eq!(lifecycle.releases.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn exhausted_retries_fail_permanently_after_exactly_max_attempts() {
    let provisioner = ScriptedProvisioner::failing_first(u32::MAX);
    let lifecycle = MemoryLifecycle {
        reclaim_succeeds: true,
        ..Default::default()
    };

    let outcome = drive_job(&job(0, 3), &paid_order(), &provisioner, &lifecycle)
        .await
        .unwrap();

    assert_eq!(outcome, JobOutcome::Failed { retry_count: 3 });
    assert_eq!(provisioner.attempts.load(Ordering::SeqCst), 3);
    assert_eq!(*lifecycle.status.lock().unwrap(), "failed");
}

#[tokio::test]
async fn resumed_job_keeps_accumulated_retry_count() {
    let provisioner = ScriptedProvisioner::failing_first(u32::MAX);
    let lifecycle = MemoryLifecycle {
        reclaim_succeeds: true,
        ..Default::default()
    };

    let outcome = drive_job(&job(2, 3), &paid_order(), &provisioner, &lifecycle)
        .await
        .unwrap();

    assert_eq!(outcome, JobOutcome::Failed { retry_count: 3 });
    assert_eq!(provisioner.attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn lost_reclaim_stops_processing_without_terminal_state() {
    let provisioner = ScriptedProvisioner::failing_first(u32::MAX);
    let lifecycle = MemoryLifecycle {
        reclaim_succeeds: false,
        ..Default::default()
    };

    let outcome = drive_job(&job(0, 3), &paid_order(), &provisioner, &lifecycle)
        .await
        .unwrap();

    assert_eq!(outcome, JobOutcome::Stolen);
    assert_eq!(provisioner.attempts.load(Ordering::SeqCst), 1);
    assert_eq!(*lifecycle.status.lock().unwrap(), "pending");
}

struct RecordingAccounts {
    calls: Arc<Mutex<Vec<&'static str>>>,
}

#[async_trait::async_trait]
impl AccountProvisioner for RecordingAccounts {
    async fn ensure_account(
        &self,
        email: &str,
        _name: &str,
        _phone: Option<&str>,
    ) -> Result<ProvisionedAccount> {
        self.calls.lock().unwrap().push("account");
        Ok(ProvisionedAccount {
            account_id: "acct_1".to_string(),
            login_email: email.to_string(),
            temporary_password: Some("changeme".to_string()),
            created: true,
        })
    }
}

struct RecordingMailer {
    calls: Arc<Mutex<Vec<&'static str>>>,
}

#[async_trait::async_trait]
impl Mailer for RecordingMailer {
    async fn send_welcome(&self, _to: &str, _name: &str, account: &ProvisionedAccount) -> Result<()> {
        assert_eq!(account.account_id, "acct_1");
        self.calls.lock().unwrap().push("email");
        Ok(())
    }
}

struct RecordingCarts {
    calls: Arc<Mutex<Vec<&'static str>>>,
}

#[async_trait::async_trait]
impl CartCleanup for RecordingCarts {
    async fn clear_for_email(&self, _email: &str) -> Result<u64> {
        self.calls.lock().unwrap().push("cart");
        Ok(1)
    }
}

#[tokio::test]
async fn side_effects_run_in_account_cart_email_order() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let provisioner = DefaultProvisioner {
        accounts: Arc::new(RecordingAccounts { calls: calls.clone() }),
        mailer: Arc::new(RecordingMailer { calls: calls.clone() }),
        carts: Arc::new(RecordingCarts { calls: calls.clone() }),
    };

    provisioner.provision(&paid_order()).await.unwrap();

    assert_eq!(*calls.lock().unwrap(), vec!["account", "cart", "email"]);
}
