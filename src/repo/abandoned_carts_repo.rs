use anyhow::Result;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AbandonedCartsRepo {
    pub pool: PgPool,
}

impl AbandonedCartsRepo {
    pub async fn insert(&self, email: &str, name: Option<&str>, phone: Option<&str>) -> Result<()> {
        sqlx::query("INSERT INTO abandoned_carts (email, name, phone) VALUES ($1, $2, $3)")
            .bind(email)
            .bind(name)
            .bind(phone)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn delete_by_email(&self, email: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM abandoned_carts WHERE email = $1")
            .bind(email)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
