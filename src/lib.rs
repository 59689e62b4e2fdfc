pub mod config;
pub mod domain {
    pub mod order;
}
pub mod downstream;
pub mod gateways;
pub mod http {
    pub mod handlers {
        pub mod orders;
        pub mod ops;
        pub mod provisioning;
        pub mod webhooks;
    }
    pub mod middleware {
        pub mod admin_auth;
    }
}
pub mod repo {
    pub mod abandoned_carts_repo;
    pub mod audit_log_repo;
    pub mod orders_repo;
    pub mod provisioning_jobs_repo;
}
pub mod service {
    pub mod classifier;
    pub mod locator;
    pub mod poller;
    pub mod provisioning_worker;
    pub mod reconciler;
    pub mod reconciliation;
}

#[derive(Clone)]
pub struct AppState {
    pub reconciliation: service::reconciliation::ReconciliationService,
    pub poller: service::poller::StatusPoller,
    pub worker: service::provisioning_worker::ProvisioningWorker,
    pub orders_repo: repo::orders_repo::OrdersRepo,
    pub carts_repo: repo::abandoned_carts_repo::AbandonedCartsRepo,
}
