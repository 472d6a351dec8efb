/// Pinecone vector index (data plane REST API)
use super::{require, send_json};
use crate::config::VectorIndexConfig;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use utoipa::ToSchema;

const SERVICE: &str = "pinecone";
const API_VERSION: &str = "2024-07";

/// Nearest-neighbour hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VectorMatch {
    pub id: String,
    #[serde(default)]
    pub score: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Value>,
}

/// Stored vector id with its metadata, as returned by the listing
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct VectorRecord {
    pub id: String,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VectorPage {
    pub vectors: Vec<VectorRecord>,
    pub pagination_token: Option<String>,
}

/// Read access to the vector index.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn query(
        &self,
        vector: &[f32],
        top_k: u32,
        filter: Option<Value>,
    ) -> Result<Vec<VectorMatch>>;

    /// One page of ids, each enriched with its stored metadata
    async fn list(&self, limit: u32, pagination_token: Option<&str>) -> Result<VectorPage>;
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<VectorMatch>,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    vectors: Vec<ListedId>,
    pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize)]
struct ListedId {
    id: String,
}

#[derive(Debug, Deserialize)]
struct Pagination {
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FetchResponse {
    #[serde(default)]
    vectors: HashMap<String, FetchedVector>,
}

#[derive(Debug, Deserialize)]
struct FetchedVector {
    metadata: Option<Value>,
}

#[derive(Clone)]
pub struct PineconeClient {
    http: reqwest::Client,
    host: Option<String>,
    api_key: Option<String>,
    namespace: Option<String>,
}

impl PineconeClient {
    pub fn new(http: reqwest::Client, config: &VectorIndexConfig) -> Self {
        Self {
            http,
            host: config
                .host
                .as_ref()
                .map(|h| h.trim_end_matches('/').to_string()),
            api_key: config.api_key.clone(),
            namespace: config.namespace.clone(),
        }
    }

    fn endpoint(&self, path: &str) -> Result<(String, &str)> {
        let host = require(&self.host, "PINECONE_INDEX_HOST")?;
        let api_key = require(&self.api_key, "PINECONE_API_KEY")?;
        let host = if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("https://{}", host)
        };
        Ok((format!("{}{}", host, path), api_key))
    }

    async fn fetch_metadata(&self, ids: &[String]) -> Result<HashMap<String, Option<Value>>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let (url, api_key) = self.endpoint("/vectors/fetch")?;
        let mut params: Vec<(&str, &str)> = ids.iter().map(|id| ("ids", id.as_str())).collect();
        if let Some(namespace) = &self.namespace {
            params.push(("namespace", namespace.as_str()));
        }

        let request = self
            .http
            .get(&url)
            .header("Api-Key", api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .query(&params);
        let response: FetchResponse = send_json(SERVICE, request).await?;

        Ok(response
            .vectors
            .into_iter()
            .map(|(id, v)| (id, v.metadata))
            .collect())
    }
}

#[async_trait]
impl VectorIndex for PineconeClient {
    async fn query(
        &self,
        vector: &[f32],
        top_k: u32,
        filter: Option<Value>,
    ) -> Result<Vec<VectorMatch>> {
        let (url, api_key) = self.endpoint("/query")?;

        let mut body = json!({
            "vector": vector,
            "topK": top_k,
            "includeMetadata": true,
            "includeValues": false,
        });
        if let Some(namespace) = &self.namespace {
            body["namespace"] = json!(namespace);
        }
        if let Some(filter) = filter {
            body["filter"] = filter;
        }

        let request = self
            .http
            .post(&url)
            .header("Api-Key", api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .json(&body);
        let response: QueryResponse = send_json(SERVICE, request).await?;

        Ok(response.matches)
    }

    async fn list(&self, limit: u32, pagination_token: Option<&str>) -> Result<VectorPage> {
        let (url, api_key) = self.endpoint("/vectors/list")?;

        let mut params = vec![("limit", limit.to_string())];
        if let Some(token) = pagination_token {
            params.push(("paginationToken", token.to_string()));
        }
        if let Some(namespace) = &self.namespace {
            params.push(("namespace", namespace.clone()));
        }

        let request = self
            .http
            .get(&url)
            .header("Api-Key", api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .query(&params);
        let listed: ListResponse = send_json(SERVICE, request).await?;

        let ids: Vec<String> = listed.vectors.into_iter().map(|v| v.id).collect();
        let mut metadata = self.fetch_metadata(&ids).await?;

        Ok(VectorPage {
            vectors: ids
                .into_iter()
                .map(|id| {
                    let metadata = metadata.remove(&id).flatten();
                    VectorRecord { id, metadata }
                })
                .collect(),
            pagination_token: listed.pagination.and_then(|p| p.next),
        })
    }
}
