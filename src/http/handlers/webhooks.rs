use crate::domain::order::GatewayKind;
use crate::service::reconciliation::WebhookOutcome;
use crate::AppState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

pub async fn mercadopago(State(state): State<AppState>, body: String) -> impl IntoResponse {
    ingest(state, GatewayKind::Mercadopago, body).await
}

pub async fn pagbank(State(state): State<AppState>, body: String) -> impl IntoResponse {
    ingest(state, GatewayKind::Pagbank, body).await
}

async fn ingest(state: AppState, kind: GatewayKind, body: String) -> axum::response::Response {
    match state.reconciliation.handle_webhook(kind, &body).await {
        Ok(outcome) => {
            let (status, label) = match outcome {
                WebhookOutcome::Processed(order_status) => {
                    return (
                        axum::http::StatusCode::OK,
                        Json(serde_json::json!({
                            "received": true,
                            "outcome": "processed",
                            "order_status": order_status,
                        })),
                    )
                        .into_response()
                }
                WebhookOutcome::StillPending => (axum::http::StatusCode::OK, "still_pending"),
                WebhookOutcome::Duplicate => (axum::http::StatusCode::OK, "duplicate"),
                WebhookOutcome::Ignored => (axum::http::StatusCode::OK, "ignored"),
                WebhookOutcome::Probe => (axum::http::StatusCode::OK, "probe"),
                WebhookOutcome::Deferred => (axum::http::StatusCode::ACCEPTED, "deferred"),
                WebhookOutcome::Malformed => (axum::http::StatusCode::BAD_REQUEST, "malformed"),
            };

            (
                status,
                Json(serde_json::json!({ "received": true, "outcome": label })),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("{} webhook processing failed: {e:#}", kind.as_str());
            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}
