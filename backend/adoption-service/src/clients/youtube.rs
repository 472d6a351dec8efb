/// YouTube Data API v3 search
use super::{require, send_json};
use crate::config::YoutubeConfig;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

const SERVICE: &str = "youtube";

/// Upper bound accepted by `search.list`
pub const MAX_RESULTS_LIMIT: u32 = 50;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Video {
    pub id: String,
    pub title: String,
    pub channel: String,
    pub thumbnail: Option<String>,
    pub published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchId,
    snippet: Option<Snippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    channel_title: String,
    published_at: Option<String>,
    thumbnails: Option<Thumbnails>,
}

#[derive(Debug, Deserialize)]
struct Thumbnails {
    high: Option<Thumbnail>,
    medium: Option<Thumbnail>,
    default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Clone)]
pub struct YoutubeClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    query: String,
    region_code: String,
    default_max_results: u32,
}

impl YoutubeClient {
    pub fn new(http: reqwest::Client, config: &YoutubeConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            query: config.query.clone(),
            region_code: config.region_code.clone(),
            default_max_results: config.max_results,
        }
    }

    /// Most viewed videos for the configured search phrase
    pub async fn trending(&self, max_results: Option<u32>) -> Result<Vec<Video>> {
        let key = require(&self.api_key, "YOUTUBE_API_KEY")?;
        let max_results = max_results
            .unwrap_or(self.default_max_results)
            .clamp(1, MAX_RESULTS_LIMIT)
            .to_string();

        let url = format!("{}/youtube/v3/search", self.base_url);
        let request = self.http.get(&url).query(&[
            ("part", "snippet"),
            ("type", "video"),
            ("order", "viewCount"),
            ("q", self.query.as_str()),
            ("regionCode", self.region_code.as_str()),
            ("maxResults", max_results.as_str()),
            ("key", key),
        ]);

        let response: SearchResponse = send_json(SERVICE, request).await?;
        Ok(response.items.into_iter().filter_map(to_video).collect())
    }
}

fn to_video(item: SearchItem) -> Option<Video> {
    let id = item.id.video_id?;
    let snippet = item.snippet?;
    let thumbnail = snippet
        .thumbnails
        .and_then(|t| t.high.or(t.medium).or(t.default))
        .map(|t| t.url);

    Some(Video {
        id,
        title: snippet.title,
        channel: snippet.channel_title,
        thumbnail,
        published_at: snippet.published_at,
    })
}
