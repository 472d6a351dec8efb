//! Vector index client against a mocked data plane

use adoption_service::clients::{build_http_client, PineconeClient, VectorIndex};
use adoption_service::config::VectorIndexConfig;
use adoption_service::AppError;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(host: Option<String>, namespace: Option<&str>) -> PineconeClient {
    let http = build_http_client(Duration::from_secs(5)).unwrap();
    PineconeClient::new(
        http,
        &VectorIndexConfig {
            host,
            api_key: Some("pc-key".to_string()),
            namespace: namespace.map(str::to_string),
            dimension: 4,
        },
    )
}

#[tokio::test]
async fn test_query_sends_top_k_namespace_and_filter() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .and(header("Api-Key", "pc-key"))
        .and(header("X-Pinecone-API-Version", "2024-07"))
        .and(body_partial_json(json!({
            "vector": [0.6, 0.8],
            "topK": 3,
            "includeMetadata": true,
            "includeValues": false,
            "namespace": "animals",
            "filter": { "kind": { "$eq": "dog" } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "matches": [
                { "id": "448548202400123", "score": 0.93, "metadata": { "kind": "dog" } },
                { "id": "448548202400124", "score": 0.71 }
            ],
            "namespace": "animals"
        })))
        .expect(1)
        .mount(&server)
        .await;

    // Trailing slash on the host is tolerated
    let index = client(Some(format!("{}/", server.uri())), Some("animals"));
    let matches = index
        .query(&[0.6, 0.8], 3, Some(json!({ "kind": { "$eq": "dog" } })))
        .await
        .unwrap();

    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].id, "448548202400123");
    assert_eq!(matches[0].metadata, Some(json!({ "kind": "dog" })));
    assert_eq!(matches[1].metadata, None);
}

#[tokio::test]
async fn test_list_merges_fetched_metadata() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vectors/list"))
        .and(query_param("limit", "2"))
        .and(query_param("paginationToken", "tok-1"))
        .and(query_param("namespace", "animals"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "vectors": [{ "id": "a-1" }, { "id": "a-2" }],
            "pagination": { "next": "tok-2" },
            "namespace": "animals"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/vectors/fetch"))
        .and(query_param("ids", "a-1"))
        .and(query_param("ids", "a-2"))
        .and(header("Api-Key", "pc-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "vectors": {
                "a-1": { "id": "a-1", "values": [], "metadata": { "shelter": "서울동물복지지원센터" } }
            },
            "namespace": "animals"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = client(Some(server.uri()), Some("animals"))
        .list(2, Some("tok-1"))
        .await
        .unwrap();

    assert_eq!(page.pagination_token.as_deref(), Some("tok-2"));
    assert_eq!(page.vectors.len(), 2);
    assert_eq!(page.vectors[0].id, "a-1");
    assert_eq!(
        page.vectors[0].metadata,
        Some(json!({ "shelter": "서울동물복지지원센터" }))
    );
    assert_eq!(page.vectors[1].id, "a-2");
    assert_eq!(page.vectors[1].metadata, None);
}

#[tokio::test]
async fn test_empty_listing_skips_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vectors/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "vectors": [] })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/vectors/fetch"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let page = client(Some(server.uri()), None).list(10, None).await.unwrap();
    assert!(page.vectors.is_empty());
    assert_eq!(page.pagination_token, None);
}

#[tokio::test]
async fn test_upstream_error_keeps_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(500).set_body_string("index unavailable"))
        .mount(&server)
        .await;

    let err = client(Some(server.uri()), None)
        .query(&[1.0, 0.0], 5, None)
        .await
        .unwrap_err();

    match err {
        AppError::Upstream {
            service,
            status,
            detail,
            ..
        } => {
            assert_eq!(service, "pinecone");
            assert_eq!(status, 500);
            assert_eq!(detail.as_deref(), Some("index unavailable"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_host_is_config_error() {
    let err = client(None, None).query(&[1.0], 1, None).await.unwrap_err();
    assert!(matches!(err, AppError::Config(ref msg) if msg.contains("PINECONE_INDEX_HOST")));

    let err = client(Some("   ".to_string()), None)
        .list(10, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Config(_)));
}
