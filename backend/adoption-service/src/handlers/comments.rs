use super::Pagination;
use crate::error::Result;
use crate::middleware::UserId;
use crate::models::CreateCommentRequest;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use uuid::Uuid;

/// Comments on a post, oldest first
pub async fn list_comments(
    state: web::Data<AppState>,
    post_id: web::Path<Uuid>,
    page: web::Query<Pagination>,
) -> Result<HttpResponse> {
    let comments = state
        .comments
        .list_comments(post_id.into_inner(), page.limit(), page.offset())
        .await?;
    Ok(HttpResponse::Ok().json(comments))
}

pub async fn create_comment(
    state: web::Data<AppState>,
    user_id: UserId,
    post_id: web::Path<Uuid>,
    req: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse> {
    let comment = state
        .comments
        .create_comment(user_id.0, post_id.into_inner(), req.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(comment))
}

pub async fn delete_comment(
    state: web::Data<AppState>,
    user_id: UserId,
    comment_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    state
        .comments
        .delete_comment(user_id.0, comment_id.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
