/// Kakao Local API reverse geocoding
use super::{require, send_json};
use crate::config::GeocodingConfig;
use crate::error::Result;
use serde_json::Value;

const SERVICE: &str = "geocoding";

#[derive(Clone)]
pub struct GeocodingClient {
    http: reqwest::Client,
    base_url: String,
    rest_api_key: Option<String>,
}

impl GeocodingClient {
    pub fn new(http: reqwest::Client, config: &GeocodingConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            rest_api_key: config.rest_api_key.clone(),
        }
    }

    /// Administrative/legal region codes for a WGS84 coordinate.
    ///
    /// The upstream document is returned as-is.
    pub async fn reverse(&self, longitude: f64, latitude: f64) -> Result<Value> {
        let key = require(&self.rest_api_key, "KAKAO_REST_API_KEY")?;
        let url = format!("{}/v2/local/geo/coord2regioncode.json", self.base_url);

        let request = self
            .http
            .get(&url)
            .header("Authorization", format!("KakaoAK {}", key))
            .query(&[("x", longitude.to_string()), ("y", latitude.to_string())]);

        send_json(SERVICE, request).await
    }
}
