use crate::domain::order::{GatewayKind, Order, OrderStatus};
use anyhow::{anyhow, Result};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

pub struct NewOrder {
    pub id: Uuid,
    pub gateway: GatewayKind,
    pub gateway_transaction_id: Option<String>,
    pub customer_email: String,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub amount_minor: i64,
    pub currency: String,
}

#[derive(Clone)]
pub struct OrdersRepo {
    pub pool: PgPool,
}

const ORDER_COLUMNS: &str = r#"
    id, gateway, gateway_transaction_id, status, customer_email, customer_name,
    customer_phone, amount_minor, currency, created_at, updated_at, paid_at
"#;

impl OrdersRepo {
    pub async fn insert(&self, order: &NewOrder) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO orders (
                id, gateway, gateway_transaction_id, status, customer_email,
                customer_name, customer_phone, amount_minor, currency
            ) VALUES ($1, $2, $3, 'pending', $4, $5, $6, $7, $8)
            "#,
        )
        .bind(order.id)
        .bind(order.gateway.as_str())
        .bind(order.gateway_transaction_id.clone())
        .bind(order.customer_email.clone())
        .bind(order.customer_name.clone())
        .bind(order.customer_phone.clone())
        .bind(order.amount_minor)
        .bind(order.currency.clone())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>> {
        let row = sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| map_order(&r)).transpose()
    }

    pub async fn find_by_transaction(
        &self,
        gateway: GatewayKind,
        transaction_id: &str,
    ) -> Result<Option<Order>> {
        let row = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE gateway = $1 AND gateway_transaction_id = $2"
        ))
        .bind(gateway.as_str())
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| map_order(&r)).transpose()
    }

    pub async fn attach_transaction_id(&self, id: Uuid, transaction_id: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET gateway_transaction_id = $2, updated_at = now()
            WHERE id = $1 AND gateway_transaction_id IS NULL
            "#,
        )
        .bind(id)
        .bind(transaction_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn transition(
        &self,
        id: Uuid,
        target: OrderStatus,
        raw_payload: &serde_json::Value,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = $2,
                gateway_payload = $3,
                paid_at = CASE WHEN $2 = 'paid' THEN now() ELSE paid_at END,
                updated_at = now()
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(id)
        .bind(target.as_str())
        .bind(raw_payload)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

fn map_order(row: &PgRow) -> Result<Order> {
    let gateway: String = row.get("gateway");
    let status: String = row.get("status");

    Ok(Order {
        id: row.get("id"),
        gateway: GatewayKind::parse(&gateway).ok_or_else(|| anyhow!("unknown gateway: {gateway}"))?,
        gateway_transaction_id: row.get("gateway_transaction_id"),
        status: OrderStatus::parse(&status).ok_or_else(|| anyhow!("unknown order status: {status}"))?,
        customer_email: row.get("customer_email"),
        customer_name: row.get("customer_name"),
        customer_phone: row.get("customer_phone"),
        amount_minor: row.get("amount_minor"),
        currency: row.get("currency"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        paid_at: row.get("paid_at"),
    })
}
