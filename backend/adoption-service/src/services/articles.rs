/// Article service - notices and card-news
///
/// Anyone can read published articles. Drafts are only visible to
/// administrators, and only administrators can write.
use crate::db::{ArticleRepository, ProfileRepository};
use crate::error::{AppError, Result};
use crate::models::{
    Article, ArticleChanges, ArticleKind, ArticleQuery, ArticleStatus, CreateArticleRequest,
    NewArticle, UpdateArticleRequest,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

pub struct ArticleService {
    articles: Arc<dyn ArticleRepository>,
    profiles: Arc<dyn ProfileRepository>,
}

impl ArticleService {
    pub fn new(articles: Arc<dyn ArticleRepository>, profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { articles, profiles }
    }

    async fn is_admin(&self, caller: Option<Uuid>) -> Result<bool> {
        match caller {
            Some(user_id) => Ok(self
                .profiles
                .get(user_id)
                .await?
                .map(|p| p.is_admin())
                .unwrap_or(false)),
            None => Ok(false),
        }
    }

    async fn require_admin(&self, caller: Uuid) -> Result<()> {
        if self.is_admin(Some(caller)).await? {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "administrator role required".to_string(),
            ))
        }
    }

    pub async fn list_articles(
        &self,
        caller: Option<Uuid>,
        kind: Option<ArticleKind>,
        category: Option<String>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Article>> {
        let query = ArticleQuery {
            kind,
            category: category.filter(|c| !c.trim().is_empty()),
            include_drafts: self.is_admin(caller).await?,
            limit,
            offset,
        };
        self.articles.list(&query).await
    }

    pub async fn get_article(&self, caller: Option<Uuid>, article_id: Uuid) -> Result<Article> {
        let not_found = || AppError::NotFound(format!("article {} not found", article_id));
        let article = self.articles.get(article_id).await?.ok_or_else(not_found)?;

        if article.status == ArticleStatus::Draft && !self.is_admin(caller).await? {
            return Err(not_found());
        }
        Ok(article)
    }

    pub async fn create_article(&self, caller: Uuid, req: CreateArticleRequest) -> Result<Article> {
        self.require_admin(caller).await?;
        let req = CreateArticleRequest {
            title: req.title.trim().to_string(),
            category: req.category.trim().to_string(),
            ..req
        };
        req.validate()?;

        let article = self
            .articles
            .create(NewArticle {
                kind: req.kind,
                title: req.title,
                content: req.content,
                category: req.category,
                status: req.status,
                image_urls: req.image_urls,
                author_id: caller,
            })
            .await?;

        tracing::info!(article_id = %article.id, kind = ?article.kind, "article created");
        Ok(article)
    }

    pub async fn update_article(
        &self,
        caller: Uuid,
        article_id: Uuid,
        req: UpdateArticleRequest,
    ) -> Result<Article> {
        self.require_admin(caller).await?;
        let req = UpdateArticleRequest {
            title: req.title.map(|t| t.trim().to_string()),
            category: req.category.map(|c| c.trim().to_string()),
            ..req
        };
        req.validate()?;

        self.articles
            .update(
                article_id,
                ArticleChanges {
                    title: req.title,
                    content: req.content,
                    category: req.category,
                    status: req.status,
                    image_urls: req.image_urls,
                },
            )
            .await?
            .ok_or_else(|| AppError::NotFound(format!("article {} not found", article_id)))
    }

    pub async fn delete_article(&self, caller: Uuid, article_id: Uuid) -> Result<()> {
        self.require_admin(caller).await?;
        if !self.articles.delete(article_id).await? {
            return Err(AppError::NotFound(format!(
                "article {} not found",
                article_id
            )));
        }
        tracing::info!(article_id = %article_id, "article deleted");
        Ok(())
    }
}
