/// Shelter-id token handlers
use crate::error::{AppError, Result};
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

pub const MAX_BATCH: usize = 100;

#[derive(Debug, Deserialize, ToSchema)]
pub struct EncodeTokensRequest {
    /// Shelter registration numbers
    pub ids: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EncodedToken {
    pub id: String,
    pub token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EncodeTokensResponse {
    pub tokens: Vec<EncodedToken>,
}

/// Encode a batch of shelter registration numbers
pub async fn encode_tokens(
    state: web::Data<AppState>,
    req: web::Json<EncodeTokensRequest>,
) -> Result<HttpResponse> {
    let ids = req.into_inner().ids;
    if ids.is_empty() {
        return Err(AppError::BadRequest("ids must not be empty".to_string()));
    }
    if ids.len() > MAX_BATCH {
        return Err(AppError::BadRequest(format!(
            "at most {} ids per request",
            MAX_BATCH
        )));
    }

    let codec = state.shelter_tokens()?;
    let tokens = ids
        .into_iter()
        .map(|id| {
            let id = id.trim().to_string();
            if id.is_empty() {
                return Err(AppError::BadRequest("ids must not contain blanks".to_string()));
            }
            let token = codec
                .encode(&id)
                .map_err(|e| AppError::Internal(e.to_string()))?;
            Ok(EncodedToken { id, token })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(HttpResponse::Ok().json(EncodeTokensResponse { tokens }))
}

/// Resolve a token back to its registration number
pub async fn decode_token(
    state: web::Data<AppState>,
    token: web::Path<String>,
) -> Result<HttpResponse> {
    let id = state
        .shelter_tokens()?
        .decode(&token)
        .ok_or_else(|| AppError::NotFound("unknown shelter token".to_string()))?;

    Ok(HttpResponse::Ok().json(json!({ "id": id })))
}
