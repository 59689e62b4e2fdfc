use crate::AppState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

pub async fn run_provisioning(State(state): State<AppState>) -> impl IntoResponse {
    match state.worker.run_once(state.worker.batch_size).await {
        Ok(stats) => (axum::http::StatusCode::OK, Json(stats)).into_response(),
        Err(e) => {
            tracing::error!("triggered provisioning run failed: {e:#}");
            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}
