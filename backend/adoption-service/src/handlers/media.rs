/// Image upload/delete handlers backed by Cloudinary
use crate::clients::cloudinary::public_id_from_url;
use crate::error::{AppError, Result};
use crate::middleware::UserId;
use crate::state::AppState;
use crate::utils::multipart::{read_form, FormSchema};
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteImageRequest {
    #[serde(alias = "public_id")]
    pub public_id: Option<String>,
    /// Delivery URL, used when no public id is given
    pub url: Option<String>,
}

const UPLOAD_FORM: FormSchema = FormSchema {
    files: &["file"],
    fields: &[],
};

/// Upload one image from the `file` field
pub async fn upload_image(
    state: web::Data<AppState>,
    user_id: UserId,
    payload: Multipart,
) -> Result<HttpResponse> {
    let max_bytes = state.config.cloudinary.max_upload_bytes;
    let mut form = read_form(payload, UPLOAD_FORM, max_bytes).await?;

    let file = form
        .take_file("file")
        .ok_or_else(|| AppError::BadRequest("file is required".to_string()))?;
    if !file.is_image() {
        return Err(AppError::BadRequest(format!(
            "only images can be uploaded, got {}",
            file.content_type
        )));
    }
    if file.bytes.is_empty() {
        return Err(AppError::BadRequest("file is empty".to_string()));
    }

    tracing::info!(user_id = %user_id.0, size = file.bytes.len(), "uploading image");
    let uploaded = state
        .cloudinary
        .upload(file.bytes, &file.file_name, &file.content_type)
        .await?;

    Ok(HttpResponse::Created().json(uploaded))
}

/// Delete an image by public id or delivery URL
pub async fn delete_image(
    state: web::Data<AppState>,
    _user_id: UserId,
    req: web::Json<DeleteImageRequest>,
) -> Result<HttpResponse> {
    let req = req.into_inner();
    let public_id = match (
        req.public_id.filter(|id| !id.trim().is_empty()),
        req.url.filter(|url| !url.trim().is_empty()),
    ) {
        (Some(public_id), _) => public_id.trim().to_string(),
        (None, Some(url)) => public_id_from_url(&url)?,
        (None, None) => {
            return Err(AppError::BadRequest(
                "publicId or url is required".to_string(),
            ))
        }
    };

    state.cloudinary.destroy(&public_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "deleted": public_id })))
}
