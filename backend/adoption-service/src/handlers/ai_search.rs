/// Image similarity search handlers
use crate::error::{AppError, Result};
use crate::middleware::UserId;
use crate::state::AppState;
use crate::utils::multipart::{read_form, FormSchema};
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};

const SEARCH_FORM: FormSchema = FormSchema {
    files: &["image"],
    fields: &["topK"],
};

/// Search for animals that look like the uploaded `image`.
///
/// Optional `topK` form field, clamped to 1..=100.
pub async fn search_similar(
    state: web::Data<AppState>,
    user_id: UserId,
    payload: Multipart,
) -> Result<HttpResponse> {
    let mut form = read_form(payload, SEARCH_FORM, state.config.embedding.max_image_bytes).await?;

    let top_k = match form.field("topK") {
        Some(raw) => Some(
            raw.parse::<u32>()
                .map_err(|_| AppError::BadRequest("topK must be a non-negative integer".to_string()))?,
        ),
        None => None,
    };

    let image = form
        .take_file("image")
        .ok_or_else(|| AppError::BadRequest("image is required".to_string()))?;
    if !image.is_image() {
        return Err(AppError::BadRequest(format!(
            "expected an image, got {}",
            image.content_type
        )));
    }

    let result = state
        .similarity
        .search(user_id.0, image.bytes, top_k)
        .await?;
    Ok(HttpResponse::Ok().json(result))
}

/// Remaining searches in the current window
pub async fn quota_status(state: web::Data<AppState>, user_id: UserId) -> Result<HttpResponse> {
    let status = state.similarity.quota_status(user_id.0).await?;
    Ok(HttpResponse::Ok().json(status))
}
