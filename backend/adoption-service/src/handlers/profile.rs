use crate::error::Result;
use crate::middleware::UserId;
use crate::state::AppState;
use actix_web::{web, HttpResponse};

/// The caller's profile, created on first use
pub async fn me(state: web::Data<AppState>, user_id: UserId) -> Result<HttpResponse> {
    let profile = state.repos.profiles.ensure(user_id.0).await?;
    Ok(HttpResponse::Ok().json(profile))
}
