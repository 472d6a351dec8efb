/// Post handlers - HTTP endpoints for the community board
use super::Pagination;
use crate::error::Result;
use crate::middleware::UserId;
use crate::models::{CreatePostRequest, PostQuery, UpdatePostRequest};
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ListPostsQuery {
    pub tag: Option<String>,
    pub author_id: Option<Uuid>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// List posts, newest first
pub async fn list_posts(
    state: web::Data<AppState>,
    query: web::Query<ListPostsQuery>,
) -> Result<HttpResponse> {
    let query = query.into_inner();
    let page = Pagination {
        limit: query.limit,
        offset: query.offset,
    };
    let posts = state
        .posts
        .list_posts(PostQuery {
            tag: query.tag.filter(|t| !t.trim().is_empty()),
            author_id: query.author_id,
            limit: page.limit(),
            offset: page.offset(),
        })
        .await?;

    Ok(HttpResponse::Ok().json(posts))
}

/// Create a new post
pub async fn create_post(
    state: web::Data<AppState>,
    user_id: UserId,
    req: web::Json<CreatePostRequest>,
) -> Result<HttpResponse> {
    let post = state.posts.create_post(user_id.0, req.into_inner()).await?;
    Ok(HttpResponse::Created().json(post))
}

/// Get a post by ID
pub async fn get_post(state: web::Data<AppState>, post_id: web::Path<Uuid>) -> Result<HttpResponse> {
    let post = state.posts.get_post(post_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post))
}

pub async fn update_post(
    state: web::Data<AppState>,
    user_id: UserId,
    post_id: web::Path<Uuid>,
    req: web::Json<UpdatePostRequest>,
) -> Result<HttpResponse> {
    let post = state
        .posts
        .update_post(user_id.0, post_id.into_inner(), req.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(post))
}

pub async fn delete_post(
    state: web::Data<AppState>,
    user_id: UserId,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    state
        .posts
        .delete_post(user_id.0, post_id.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
