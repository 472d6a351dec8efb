use crate::error::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// One row per (article, visitor) pair that has been counted.
#[async_trait]
pub trait ViewRepository: Send + Sync {
    async fn exists(&self, article_id: Uuid, visitor_id: &str) -> Result<bool>;

    async fn insert(&self, article_id: Uuid, visitor_id: &str) -> Result<()>;
}

pub struct PgViewRepository {
    pool: PgPool,
}

impl PgViewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ViewRepository for PgViewRepository {
    async fn exists(&self, article_id: Uuid, visitor_id: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM article_views WHERE article_id = $1 AND visitor_id = $2)",
        )
        .bind(article_id)
        .bind(visitor_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn insert(&self, article_id: Uuid, visitor_id: &str) -> Result<()> {
        // A concurrent first view may already have inserted the pair.
        sqlx::query(
            r#"
            INSERT INTO article_views (article_id, visitor_id)
            VALUES ($1, $2)
            ON CONFLICT (article_id, visitor_id) DO NOTHING
            "#,
        )
        .bind(article_id)
        .bind(visitor_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
