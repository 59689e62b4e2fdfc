use anyhow::Result;
use sqlx::{PgPool, Row};

#[derive(Clone)]
pub struct AuditLogRepo {
    pub pool: PgPool,
}

impl AuditLogRepo {
    pub async fn record(&self, provider: &str, payload: &serde_json::Value) -> Result<i64> {
        let row = sqlx::query(
            r#"
            INSERT INTO webhook_audit_log (provider, payload, received_at, processed, retry_count)
            VALUES ($1, $2, now(), false, 0)
            RETURNING id
            "#,
        )
        .bind(provider)
        .bind(payload)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get("id"))
    }

    pub async fn mark_processed(
        &self,
        entry_id: i64,
        outcome: &str,
        error: Option<&str>,
        retry_count: i32,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE webhook_audit_log
            SET processed = true, outcome = $2, error = $3, retry_count = $4
            WHERE id = $1
            "#,
        )
        .bind(entry_id)
        .bind(outcome)
        .bind(error)
        .bind(retry_count)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
