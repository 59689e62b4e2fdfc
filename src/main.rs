use axum::middleware::from_fn_with_state;
use axum::routing::{get, post, put};
use axum::Router;
use payment_reconciler::config::AppConfig;
use payment_reconciler::downstream::accounts::AccountsApiClient;
use payment_reconciler::downstream::email::EmailApiClient;
use payment_reconciler::gateways::mercadopago::MercadoPagoGateway;
use payment_reconciler::gateways::pagbank::PagBankGateway;
use payment_reconciler::gateways::PaymentGateway;
use payment_reconciler::repo::abandoned_carts_repo::AbandonedCartsRepo;
use payment_reconciler::repo::audit_log_repo::AuditLogRepo;
use payment_reconciler::repo::orders_repo::OrdersRepo;
use payment_reconciler::repo::provisioning_jobs_repo::ProvisioningJobsRepo;
use payment_reconciler::service::locator::OrderLocator;
use payment_reconciler::service::poller::StatusPoller;
use payment_reconciler::service::provisioning_worker::{DefaultProvisioner, ProvisioningWorker};
use payment_reconciler::service::reconciler::Reconciler;
use payment_reconciler::service::reconciliation::ReconciliationService;
use payment_reconciler::AppState;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&cfg.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let orders_repo = OrdersRepo { pool: pool.clone() };
    let audit_log = AuditLogRepo { pool: pool.clone() };
    let jobs_repo = ProvisioningJobsRepo { pool: pool.clone() };
    let carts_repo = AbandonedCartsRepo { pool: pool.clone() };

    let mercadopago: Arc<dyn PaymentGateway> = Arc::new(MercadoPagoGateway {
        base_url: cfg.mercadopago_base_url.clone(),
        access_token: cfg.mercadopago_access_token.clone(),
        timeout_ms: cfg.gateway_timeout_ms,
        client: reqwest::Client::new(),
    });
    let pagbank: Arc<dyn PaymentGateway> = Arc::new(PagBankGateway {
        base_url: cfg.pagbank_base_url.clone(),
        token: cfg.pagbank_token.clone(),
        timeout_ms: cfg.gateway_timeout_ms,
        client: reqwest::Client::new(),
    });

    let reconciler = Reconciler {
        orders_repo: orders_repo.clone(),
        jobs_repo: jobs_repo.clone(),
        max_job_retries: cfg.provisioning_max_retries,
    };

    let reconciliation = ReconciliationService {
        pool: pool.clone(),
        audit_log,
        locator: OrderLocator {
            orders: Arc::new(orders_repo.clone()),
            attempts: cfg.order_lookup_attempts,
            delay_ms: cfg.order_lookup_delay_ms,
        },
        reconciler: reconciler.clone(),
        mercadopago: mercadopago.clone(),
        pagbank: pagbank.clone(),
    };

    let poller = StatusPoller {
        orders_repo: orders_repo.clone(),
        reconciler,
        mercadopago,
        pagbank,
    };

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
        carts: Arc::new(carts_repo.clone()),
    };

    let worker = ProvisioningWorker {
        jobs_repo,
        orders_repo: orders_repo.clone(),
        provisioner: Arc::new(provisioner),
        batch_size: cfg.provisioning_batch,
        interval_secs: cfg.provisioning_interval_secs,
        stale_secs: cfg.provisioning_stale_secs,
    };
    tokio::spawn(worker.clone().run());

    let state = AppState {
        reconciliation,
        poller,
        worker,
        orders_repo,
        carts_repo,
    };

    let admin_key = cfg.internal_api_key.clone();
    let admin_routes = Router::new()
        .route(
            "/provisioning/run",
            post(payment_reconciler::http::handlers::provisioning::run_provisioning),
        )
        .layer(from_fn_with_state(
            admin_key,
            payment_reconciler::http::middleware::admin_auth::require_internal_api_key,
        ));

    let app = Router::new()
        .route("/health", get(payment_reconciler::http::handlers::ops::health))
        .route("/ops/liveness", get(payment_reconciler::http::handlers::ops::liveness))
        .route("/ops/readiness", get(payment_reconciler::http::handlers::ops::readiness))
        .route(
            "/webhooks/mercadopago",
            post(payment_reconciler::http::handlers::webhooks::mercadopago),
        )
        .route(
            "/webhooks/pagbank",
            post(payment_reconciler::http::handlers::webhooks::pagbank),
        )
        .route("/orders", post(payment_reconciler::http::handlers::orders::create_order))
        .route(
            "/orders/:order_id/transaction",
            put(payment_reconciler::http::handlers::orders::attach_transaction),
        )
        .route(
            "/orders/status",
            get(payment_reconciler::http::handlers::orders::poll_status),
        )
        .route("/carts", post(payment_reconciler::http::handlers::orders::capture_cart))
        .merge(admin_routes)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!("listening on {}", cfg.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
