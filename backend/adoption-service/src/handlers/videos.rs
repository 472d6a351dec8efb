use crate::clients::Video;
use crate::error::Result;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize)]
pub struct TrendingQuery {
    #[serde(rename = "maxResults")]
    pub max_results: Option<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TrendingResponse {
    pub videos: Vec<Video>,
}

/// Most viewed adoption-related videos
pub async fn trending_videos(
    state: web::Data<AppState>,
    query: web::Query<TrendingQuery>,
) -> Result<HttpResponse> {
    let videos = state.youtube.trending(query.max_results).await?;
    Ok(HttpResponse::Ok().json(TrendingResponse { videos }))
}
