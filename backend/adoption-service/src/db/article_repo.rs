use crate::error::Result;
use crate::models::{Article, ArticleChanges, ArticleQuery, NewArticle};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

const ARTICLE_COLUMNS: &str = "id, kind, title, content, category, status, image_urls, \
                               author_id, view_count, created_at, updated_at";

/// Notices and card-news share one table, told apart by `kind`.
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    async fn create(&self, article: NewArticle) -> Result<Article>;

    async fn get(&self, article_id: Uuid) -> Result<Option<Article>>;

    async fn list(&self, query: &ArticleQuery) -> Result<Vec<Article>>;

    async fn update(&self, article_id: Uuid, changes: ArticleChanges) -> Result<Option<Article>>;

    async fn delete(&self, article_id: Uuid) -> Result<bool>;

    /// Bump the counter by one and return the new value
    async fn increment_view_count(&self, article_id: Uuid) -> Result<i64>;
}

pub struct PgArticleRepository {
    pool: PgPool,
}

impl PgArticleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ArticleRepository for PgArticleRepository {
    async fn create(&self, article: NewArticle) -> Result<Article> {
        let sql = format!(
            "INSERT INTO articles (kind, title, content, category, status, image_urls, author_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {ARTICLE_COLUMNS}"
        );

        let article = sqlx::query_as::<_, Article>(&sql)
            .bind(article.kind)
            .bind(&article.title)
            .bind(&article.content)
            .bind(&article.category)
            .bind(article.status)
            .bind(&article.image_urls)
            .bind(article.author_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(article)
    }

    async fn get(&self, article_id: Uuid) -> Result<Option<Article>> {
        let sql = format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE id = $1");

        let article = sqlx::query_as::<_, Article>(&sql)
            .bind(article_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(article)
    }

    async fn list(&self, query: &ArticleQuery) -> Result<Vec<Article>> {
        let sql = format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles \
             WHERE ($1::article_kind IS NULL OR kind = $1) \
               AND ($2::text IS NULL OR category = $2) \
               AND ($3 OR status = 'published') \
             ORDER BY created_at DESC \
             LIMIT $4 OFFSET $5"
        );

        let articles = sqlx::query_as::<_, Article>(&sql)
            .bind(query.kind)
            .bind(query.category.as_deref())
            .bind(query.include_drafts)
            .bind(query.limit)
            .bind(query.offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(articles)
    }

    async fn update(&self, article_id: Uuid, changes: ArticleChanges) -> Result<Option<Article>> {
        let sql = format!(
            "UPDATE articles SET \
                title = COALESCE($2, title), \
                content = COALESCE($3, content), \
                category = COALESCE($4, category), \
                status = COALESCE($5, status), \
                image_urls = COALESCE($6, image_urls), \
                updated_at = NOW() \
             WHERE id = $1 RETURNING {ARTICLE_COLUMNS}"
        );

        let article = sqlx::query_as::<_, Article>(&sql)
            .bind(article_id)
            .bind(changes.title)
            .bind(changes.content)
            .bind(changes.category)
            .bind(changes.status)
            .bind(changes.image_urls)
            .fetch_optional(&self.pool)
            .await?;

        Ok(article)
    }

    async fn delete(&self, article_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM articles WHERE id = $1")
            .bind(article_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn increment_view_count(&self, article_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "UPDATE articles SET view_count = view_count + 1 WHERE id = $1 RETURNING view_count",
        )
        .bind(article_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
