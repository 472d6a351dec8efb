/// HTTP clients for the third-party services this backend proxies
///
/// - `open_data`: government animal protection open data (animals, shelters, codes)
/// - `geocoding`: Kakao reverse geocoding
/// - `youtube`: YouTube Data API search
/// - `cloudinary`: signed image upload/delete
/// - `pinecone`: vector index query/list/fetch
///
/// All clients share one `reqwest::Client` and go through [`send`], which
/// records metrics and turns upstream failures into [`AppError::Upstream`]
/// carrying the upstream status and body. Nothing is retried.
pub mod cloudinary;
pub mod geocoding;
pub mod open_data;
pub mod pinecone;
pub mod youtube;

pub use cloudinary::{CloudinaryClient, UploadedImage};
pub use geocoding::GeocodingClient;
pub use open_data::{AnimalQuery, OpenDataClient, OpenDataPage, ShelterQuery};
pub use pinecone::{PineconeClient, VectorIndex, VectorMatch, VectorPage, VectorRecord};
pub use youtube::{Video, YoutubeClient};

use crate::error::{AppError, Result};
use crate::metrics::{UPSTREAM_REQUESTS_TOTAL, UPSTREAM_REQUEST_DURATION_SECONDS};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::{Duration, Instant};

/// Build the HTTP client shared by all upstream integrations
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("adoption-service/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| AppError::Internal(format!("failed to build HTTP client: {}", e)))
}

/// Send `request` and return the body of a successful response.
///
/// Transport failures map to 502 (504 on timeout); non-2xx responses keep
/// their status and attach the upstream body as detail.
pub(crate) async fn send(service: &'static str, request: RequestBuilder) -> Result<String> {
    let started = Instant::now();
    let result = request.send().await;
    UPSTREAM_REQUEST_DURATION_SECONDS
        .with_label_values(&[service])
        .observe(started.elapsed().as_secs_f64());

    let response = match result {
        Ok(response) => response,
        Err(err) => {
            UPSTREAM_REQUESTS_TOTAL
                .with_label_values(&[service, "transport_error"])
                .inc();
            tracing::warn!(service, error = %err, "upstream request failed");
            let status = if err.is_timeout() { 504 } else { 502 };
            return Err(AppError::upstream(service, status, err.to_string()));
        }
    };

    let status = response.status();
    let body = response.text().await.map_err(|e| {
        AppError::upstream(service, 502, format!("failed to read response body: {}", e))
    })?;

    if !status.is_success() {
        UPSTREAM_REQUESTS_TOTAL
            .with_label_values(&[service, "http_error"])
            .inc();
        tracing::warn!(service, status = status.as_u16(), "upstream returned an error");
        return Err(AppError::Upstream {
            service,
            status: status.as_u16(),
            message: status
                .canonical_reason()
                .unwrap_or("upstream error")
                .to_string(),
            detail: Some(body),
        });
    }

    UPSTREAM_REQUESTS_TOTAL
        .with_label_values(&[service, "ok"])
        .inc();
    Ok(body)
}

/// [`send`] followed by JSON decoding; undecodable bodies are a 502.
pub(crate) async fn send_json<T: DeserializeOwned>(
    service: &'static str,
    request: RequestBuilder,
) -> Result<T> {
    let body = send(service, request).await?;
    serde_json::from_str(&body).map_err(|e| AppError::Upstream {
        service,
        status: 502,
        message: format!("unexpected response: {}", e),
        detail: Some(body),
    })
}

/// Coerce a "one or many" value into a list.
///
/// XML-to-JSON gateways emit a lone object when there is exactly one result,
/// an array otherwise, and an empty string or nothing when there are none.
pub fn normalize_items(value: Option<&Value>) -> Vec<Value> {
    match value {
        Some(Value::Array(items)) => items.clone(),
        Some(Value::Object(item)) => vec![Value::Object(item.clone())],
        _ => Vec::new(),
    }
}

pub(crate) fn require<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::missing_config(name))
}
