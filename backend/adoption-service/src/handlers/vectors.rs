/// Vector index proxy handlers
use crate::error::{AppError, Result};
use crate::services::clamp_top_k;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::{json, Value};
use utoipa::ToSchema;

const DEFAULT_LIST_LIMIT: u32 = 100;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VectorQueryRequest {
    pub vector: Vec<f32>,
    pub top_k: Option<u32>,
    /// Metadata filter, forwarded as-is
    #[schema(value_type = Option<Object>)]
    pub filter: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorListQuery {
    pub limit: Option<u32>,
    pub pagination_token: Option<String>,
}

pub async fn query_vectors(
    state: web::Data<AppState>,
    req: web::Json<VectorQueryRequest>,
) -> Result<HttpResponse> {
    let req = req.into_inner();
    let dimension = state.config.vector_index.dimension;
    if req.vector.len() != dimension {
        return Err(AppError::BadRequest(format!(
            "vector must have {} dimensions, got {}",
            dimension,
            req.vector.len()
        )));
    }

    let matches = state
        .vector_index
        .query(&req.vector, clamp_top_k(req.top_k), req.filter)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "matches": matches })))
}

/// Page through stored vectors with their metadata
pub async fn list_vectors(
    state: web::Data<AppState>,
    query: web::Query<VectorListQuery>,
) -> Result<HttpResponse> {
    let query = query.into_inner();
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, 100);
    let token = query
        .pagination_token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());

    let page = state.vector_index.list(limit, token).await?;
    Ok(HttpResponse::Ok().json(page))
}
