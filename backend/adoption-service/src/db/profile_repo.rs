use crate::error::Result;
use crate::models::{AiUsage, UserProfile};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn get(&self, user_id: Uuid) -> Result<Option<UserProfile>>;

    /// Fetch the profile, creating a default one on first use
    async fn ensure(&self, user_id: Uuid) -> Result<UserProfile>;

    /// Overwrite the similarity search usage pair
    async fn record_ai_search(&self, user_id: Uuid, usage: AiUsage) -> Result<()>;
}

pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn get(&self, user_id: Uuid) -> Result<Option<UserProfile>> {
        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT id, nickname, role, ai_search_count, last_ai_search_at, created_at
            FROM user_profiles
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn ensure(&self, user_id: Uuid) -> Result<UserProfile> {
        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            INSERT INTO user_profiles (id)
            VALUES ($1)
            ON CONFLICT (id) DO UPDATE SET id = EXCLUDED.id
            RETURNING id, nickname, role, ai_search_count, last_ai_search_at, created_at
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn record_ai_search(&self, user_id: Uuid, usage: AiUsage) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE user_profiles
            SET ai_search_count = $2, last_ai_search_at = $3
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(usage.count)
        .bind(usage.last_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
