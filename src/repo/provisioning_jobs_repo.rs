use anyhow::Result;
use sqlx::{PgPool, Row};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct ProvisioningJob {
    pub id: i64,
    pub sale_id: Uuid,
    pub retry_count: i32,
    pub max_retries: i32,
}

#[derive(Clone)]
pub struct ProvisioningJobsRepo {
    pub pool: PgPool,
}

impl ProvisioningJobsRepo {
    pub async fn enqueue_if_absent(&self, sale_id: Uuid, max_retries: i32) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO provisioning_jobs (sale_id, status, retry_count, max_retries)
            VALUES ($1, 'pending', 0, $2)
            ON CONFLICT (sale_id) WHERE status IN ('pending', 'processing') DO NOTHING
            "#,
        )
        .bind(sale_id)
        .bind(max_retries)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn claim_pending(&self, batch_size: i64) -> Result<Vec<ProvisioningJob>> {
        let mut tx = self.pool.begin().await?;
        let rows = sqlx::query(
            r#"
            SELECT id, sale_id, retry_count, max_retries
            FROM provisioning_jobs
            WHERE status = 'pending'
            ORDER BY id ASC
            LIMIT $1
            FOR UPDATE SKIP LOCKED
            "#,
        )
        .bind(batch_size)
        .fetch_all(tx.as_mut())
        .await?;

        if rows.is_empty() {
            tx.rollback().await?;
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = rows.iter().map(|r| r.get("id")).collect();
        sqlx::query("UPDATE provisioning_jobs SET status = 'processing', updated_at = now() WHERE id = ANY($1)")
            .bind(&ids)
            .execute(tx.as_mut())
            .await?;

        tx.commit().await?;

        Ok(rows
            .into_iter()
            .map(|r| ProvisioningJob {
                id: r.get("id"),
                sale_id: r.get("sale_id"),
                retry_count: r.get("retry_count"),
                max_retries: r.get("max_retries"),
            })
            .collect())
    }

    pub async fn mark_completed(&self, id: i64, retry_count: i32) -> Result<()> {
        sqlx::query(
            "UPDATE provisioning_jobs SET status = 'completed', retry_count = $2, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(retry_count)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn mark_failed(&self, id: i64, retry_count: i32) -> Result<()> {
        sqlx::query(
            "UPDATE provisioning_jobs SET status = 'failed', retry_count = $2, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(retry_count)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn mark_retry(&self, id: i64, retry_count: i32) -> Result<()> {
        sqlx::query(
            "UPDATE provisioning_jobs SET status = 'pending', retry_count = $2, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(retry_count)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn reclaim(&self, id: i64) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE provisioning_jobs SET status = 'processing', updated_at = now() WHERE id = $1 AND status = 'pending'",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn release_stale(&self, older_than_secs: i64) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE provisioning_jobs
            SET status = 'pending', updated_at = now()
            WHERE status = 'processing'
              AND updated_at < now() - make_interval(secs => $1::double precision)
            "#,
        )
        .bind(older_than_secs)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
