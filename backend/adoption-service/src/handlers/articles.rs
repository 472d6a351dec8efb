/// Notice and card-news handlers
use super::Pagination;
use crate::error::Result;
use crate::middleware::{ClientIp, UserId};
use crate::models::{ArticleKind, CreateArticleRequest, UpdateArticleRequest};
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use std::time::Duration;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ListArticlesQuery {
    pub kind: Option<ArticleKind>,
    pub category: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RecordViewRequest {
    /// Time the reader spent on the page
    pub dwell_ms: u64,
}

/// Published articles for everyone, drafts included for administrators
pub async fn list_articles(
    state: web::Data<AppState>,
    user_id: Option<UserId>,
    query: web::Query<ListArticlesQuery>,
) -> Result<HttpResponse> {
    let query = query.into_inner();
    let page = Pagination {
        limit: query.limit,
        offset: query.offset,
    };
    let articles = state
        .articles
        .list_articles(
            user_id.map(|u| u.0),
            query.kind,
            query.category,
            page.limit(),
            page.offset(),
        )
        .await?;
    Ok(HttpResponse::Ok().json(articles))
}

pub async fn get_article(
    state: web::Data<AppState>,
    user_id: Option<UserId>,
    article_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let article = state
        .articles
        .get_article(user_id.map(|u| u.0), article_id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(article))
}

pub async fn create_article(
    state: web::Data<AppState>,
    user_id: UserId,
    req: web::Json<CreateArticleRequest>,
) -> Result<HttpResponse> {
    let article = state
        .articles
        .create_article(user_id.0, req.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(article))
}

pub async fn update_article(
    state: web::Data<AppState>,
    user_id: UserId,
    article_id: web::Path<Uuid>,
    req: web::Json<UpdateArticleRequest>,
) -> Result<HttpResponse> {
    let article = state
        .articles
        .update_article(user_id.0, article_id.into_inner(), req.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(article))
}

pub async fn delete_article(
    state: web::Data<AppState>,
    user_id: UserId,
    article_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    state
        .articles
        .delete_article(user_id.0, article_id.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Record a view once the reader has stayed long enough
pub async fn record_view(
    state: web::Data<AppState>,
    client_ip: ClientIp,
    article_id: web::Path<Uuid>,
    req: web::Json<RecordViewRequest>,
) -> Result<HttpResponse> {
    let outcome = state
        .views
        .record(
            article_id.into_inner(),
            &client_ip.0,
            Duration::from_millis(req.dwell_ms),
        )
        .await?;
    Ok(HttpResponse::Ok().json(outcome))
}
