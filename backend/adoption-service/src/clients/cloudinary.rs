/// Cloudinary image upload and deletion
///
/// Requests are signed: the parameters (minus `file`, `api_key` and
/// `resource_type`) are sorted by name, joined as `k=v&k=v`, suffixed with
/// the API secret and hashed with SHA-1.
use super::{require, send_json};
use crate::config::CloudinaryConfig;
use crate::error::{AppError, Result};
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::collections::BTreeMap;
use url::Url;
use utoipa::ToSchema;

const SERVICE: &str = "cloudinary";

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadedImage {
    pub url: String,
    pub public_id: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

struct Credentials<'a> {
    cloud_name: &'a str,
    api_key: &'a str,
    api_secret: &'a str,
}

#[derive(Clone)]
pub struct CloudinaryClient {
    http: reqwest::Client,
    base_url: String,
    cloud_name: Option<String>,
    api_key: Option<String>,
    api_secret: Option<String>,
    folder: String,
}

impl CloudinaryClient {
    pub fn new(http: reqwest::Client, config: &CloudinaryConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            cloud_name: config.cloud_name.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            folder: config.folder.clone(),
        }
    }

    fn credentials(&self) -> Result<Credentials<'_>> {
        Ok(Credentials {
            cloud_name: require(&self.cloud_name, "CLOUDINARY_CLOUD_NAME")?,
            api_key: require(&self.api_key, "CLOUDINARY_API_KEY")?,
            api_secret: require(&self.api_secret, "CLOUDINARY_API_SECRET")?,
        })
    }

    pub async fn upload(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        content_type: &str,
    ) -> Result<UploadedImage> {
        let creds = self.credentials()?;
        let timestamp = Utc::now().timestamp().to_string();

        let mut params = BTreeMap::new();
        params.insert("folder", self.folder.clone());
        params.insert("timestamp", timestamp.clone());
        let signature = sign(&params, creds.api_secret);

        let file = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)
            .map_err(|e| AppError::BadRequest(format!("invalid content type: {}", e)))?;
        let form = Form::new()
            .part("file", file)
            .text("api_key", creds.api_key.to_string())
            .text("folder", self.folder.clone())
            .text("timestamp", timestamp)
            .text("signature", signature);

        let url = format!("{}/v1_1/{}/image/upload", self.base_url, creds.cloud_name);
        let response: UploadResponse =
            send_json(SERVICE, self.http.post(&url).multipart(form)).await?;

        tracing::info!(public_id = %response.public_id, "image uploaded");
        Ok(UploadedImage {
            url: response.secure_url,
            public_id: response.public_id,
        })
    }

    /// Delete an image; an unknown public id is a 404
    pub async fn destroy(&self, public_id: &str) -> Result<()> {
        let creds = self.credentials()?;
        let timestamp = Utc::now().timestamp().to_string();

        let mut params = BTreeMap::new();
        params.insert("public_id", public_id.to_string());
        params.insert("timestamp", timestamp.clone());
        let signature = sign(&params, creds.api_secret);

        let form = [
            ("public_id", public_id.to_string()),
            ("timestamp", timestamp),
            ("api_key", creds.api_key.to_string()),
            ("signature", signature),
        ];

        let url = format!("{}/v1_1/{}/image/destroy", self.base_url, creds.cloud_name);
        let response: DestroyResponse = send_json(SERVICE, self.http.post(&url).form(&form)).await?;

        match response.result.as_str() {
            "ok" => {
                tracing::info!(public_id, "image deleted");
                Ok(())
            }
            "not found" => Err(AppError::NotFound(format!("image {} not found", public_id))),
            other => Err(AppError::upstream(
                SERVICE,
                502,
                format!("unexpected destroy result: {}", other),
            )),
        }
    }
}

/// SHA-1 request signature over the sorted parameters
pub fn sign(params: &BTreeMap<&str, String>, api_secret: &str) -> String {
    let to_sign = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha1::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Derive the public id from a delivery URL.
///
/// `https://res.cloudinary.com/demo/image/upload/c_fill,w_300/v1712/community/cat.jpg`
/// yields `community/cat`: everything after `upload/`, past the version
/// segment when there is one, without the file extension.
pub fn public_id_from_url(raw: &str) -> Result<String> {
    let malformed = || AppError::BadRequest(format!("not a Cloudinary image URL: {}", raw));

    let parsed = Url::parse(raw.trim()).map_err(|_| malformed())?;
    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    let upload = segments
        .iter()
        .position(|seg| *seg == "upload")
        .ok_or_else(malformed)?;
    let mut rest = &segments[upload + 1..];
    if let Some(version) = rest.iter().position(|seg| is_version(seg)) {
        rest = &rest[version + 1..];
    }

    let (file, dirs) = rest.split_last().ok_or_else(malformed)?;
    let stem = file.rsplit_once('.').map_or(*file, |(stem, _)| stem);
    if stem.is_empty() {
        return Err(malformed());
    }

    let mut parts = dirs.to_vec();
    parts.push(stem);
    Ok(parts.join("/"))
}

fn is_version(segment: &str) -> bool {
    segment
        .strip_prefix('v')
        .map_or(false, |n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}
