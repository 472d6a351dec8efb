use crate::error::Result;
use crate::models::{NewPost, Post, PostChanges, PostQuery};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create(&self, post: NewPost) -> Result<Post>;

    async fn get(&self, post_id: Uuid) -> Result<Option<Post>>;

    /// Newest first
    async fn list(&self, query: &PostQuery) -> Result<Vec<Post>>;

    /// Returns `None` when the post does not exist
    async fn update(&self, post_id: Uuid, changes: PostChanges) -> Result<Option<Post>>;

    async fn delete(&self, post_id: Uuid) -> Result<bool>;
}

pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn create(&self, post: NewPost) -> Result<Post> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (author_id, title, content, tags)
            VALUES ($1, $2, $3, $4)
            RETURNING id, author_id, title, content, tags, created_at, updated_at
            "#,
        )
        .bind(post.author_id)
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.tags)
        .fetch_one(&self.pool)
        .await?;

        Ok(post)
    }

    async fn get(&self, post_id: Uuid) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, author_id, title, content, tags, created_at, updated_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn list(&self, query: &PostQuery) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, author_id, title, content, tags, created_at, updated_at
            FROM posts
            WHERE ($1::text IS NULL OR $1 = ANY(tags))
              AND ($2::uuid IS NULL OR author_id = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(query.tag.as_deref())
        .bind(query.author_id)
        .bind(query.limit)
        .bind(query.offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn update(&self, post_id: Uuid, changes: PostChanges) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET title = COALESCE($2, title),
                content = COALESCE($3, content),
                tags = COALESCE($4, tags),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, author_id, title, content, tags, created_at, updated_at
            "#,
        )
        .bind(post_id)
        .bind(changes.title)
        .bind(changes.content)
        .bind(changes.tags)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn delete(&self, post_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
