use crate::domain::order::{CreateOrderRequest, GatewayKind};
use crate::repo::orders_repo::NewOrder;
use crate::service::poller::OrderRef;
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

pub async fn create_order(
    State(state): State<AppState>,
    Json(req): Json<CreateOrderRequest>,
) -> impl IntoResponse {
    if req.amount_minor <= 0 {
        return (
            axum::http::StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "amount_minor must be > 0" })),
        )
            .into_response();
    }

    let order = NewOrder {
        id: Uuid::new_v4(),
        gateway: req.gateway,
        gateway_transaction_id: req.gateway_transaction_id,
        customer_email: req.customer_email,
        customer_name: req.customer_name,
        customer_phone: req.customer_phone,
        amount_minor: req.amount_minor,
        currency: req.currency.unwrap_or_else(|| "BRL".to_string()),
    };

    match state.orders_repo.insert(&order).await {
        Ok(()) => (
            axum::http::StatusCode::CREATED,
            Json(serde_json::json!({ "order_id": order.id })),
        )
            .into_response(),
        Err(e) => (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct AttachTransactionRequest {
    pub gateway_transaction_id: String,
}

pub async fn attach_transaction(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(req): Json<AttachTransactionRequest>,
) -> impl IntoResponse {
    match state
        .orders_repo
        .attach_transaction_id(order_id, &req.gateway_transaction_id)
        .await
    {
        Ok(true) => (
            axum::http::StatusCode::OK,
            Json(serde_json::json!({ "order_id": order_id, "attached": true })),
        )
            .into_response(),
        Ok(false) => (
            axum::http::StatusCode::CONFLICT,
            Json(serde_json::json!({
                "error": "order not found or transaction id already set"
            })),
        )
            .into_response(),
        Err(e) => (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub order_id: Option<Uuid>,
    pub gateway: Option<String>,
    pub transaction_id: Option<String>,
}

pub async fn poll_status(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> impl IntoResponse {
    let order_ref = match (query.order_id, query.gateway.as_deref(), query.transaction_id) {
        (Some(id), _, _) => OrderRef::Id(id),
        (None, Some(gateway), Some(transaction_id)) => match GatewayKind::parse(gateway) {
            Some(kind) => OrderRef::Transaction(kind, transaction_id),
            None => {
                return (
                    axum::http::StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({ "error": "unknown gateway" })),
                )
                    .into_response()
            }
        },
        _ => {
            return (
                axum::http::StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "error": "order_id or gateway+transaction_id required"
                })),
            )
                .into_response()
        }
    };

    match state.poller.poll(order_ref).await {
        Ok(Some(result)) => (axum::http::StatusCode::OK, Json(result)).into_response(),
        Ok(None) => (
            axum::http::StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "order not found" })),
        )
            .into_response(),
        Err(e) => (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct CaptureCartRequest {
    pub email: String,
    pub name: Option<String>,
    pub phone: Option<String>,
}

pub async fn capture_cart(
    State(state): State<AppState>,
    Json(req): Json<CaptureCartRequest>,
) -> impl IntoResponse {
    match state
        .carts_repo
        .insert(&req.email, req.name.as_deref(), req.phone.as_deref())
        .await
    {
        Ok(()) => (
            axum::http::StatusCode::CREATED,
            Json(serde_json::json!({ "captured": true })),
        )
            .into_response(),
        Err(e) => (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}
