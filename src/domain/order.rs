use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayKind {
    Mercadopago,
    Pagbank,
}

impl GatewayKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GatewayKind::Mercadopago => "mercadopago",
            GatewayKind::Pagbank => "pagbank",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "mercadopago" => Some(GatewayKind::Mercadopago),
            "pagbank" => Some(GatewayKind::Pagbank),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Paid,
    Failed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Failed => "failed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "paid" => Some(OrderStatus::Paid),
            "failed" => Some(OrderStatus::Failed),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: Uuid,
    pub gateway: GatewayKind,
    pub gateway_transaction_id: Option<String>,
    pub status: OrderStatus,
    pub customer_email: String,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub amount_minor: i64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderRequest {
    pub gateway: GatewayKind,
    pub customer_email: String,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub amount_minor: i64,
    pub currency: Option<String>,
    pub gateway_transaction_id: Option<String>,
}
