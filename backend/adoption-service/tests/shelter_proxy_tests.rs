//! Open data proxy: envelope unwrapping, defaults and error passthrough

#[macro_use]
mod common;

use actix_web::{http::StatusCode, test};
use common::{build_state, test_config};
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn envelope(items: Value, total: Value) -> Value {
    json!({
        "response": {
            "header": { "resultCode": "00", "resultMsg": "NORMAL SERVICE." },
            "body": {
                "items": items,
                "numOfRows": 20,
                "pageNo": 1,
                "totalCount": total
            }
        }
    })
}

#[actix_web::test]
async fn test_animals_single_item_is_wrapped_in_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/abandonmentPublic_v2"))
        .and(query_param("serviceKey", "test-service-key"))
        .and(query_param("_type", "json"))
        .and(query_param("bgnde", "20240101"))
        .and(query_param("endde", "20240131"))
        .and(query_param("upkind", "417000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            json!({ "item": { "desertionNo": "448548202400123", "kindCd": "[개] 믹스견" } }),
            json!("1"),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = build_state(test_config(&server.uri()));
    let app = init_app!(ctx.state);

    let req = test::TestRequest::get()
        .uri("/api/v1/shelters/animals?bgnde=20240101&endde=20240131&upkind=417000")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["total_count"], 1);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["items"][0]["desertionNo"], "448548202400123");
}

#[actix_web::test]
async fn test_animals_empty_items_string() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/abandonmentPublic_v2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!(""), json!(0))))
        .mount(&server)
        .await;

    let ctx = build_state(test_config(&server.uri()));
    let app = init_app!(ctx.state);

    let req = test::TestRequest::get()
        .uri("/api/v1/shelters/animals")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["items"], json!([]));
    assert_eq!(body["total_count"], 0);
}

#[actix_web::test]
async fn test_upstream_error_body_surfaces_as_detail() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/shelterInfo_v2"))
        .respond_with(ResponseTemplate::new(500).set_body_string("SERVICE ERROR"))
        .mount(&server)
        .await;

    let ctx = build_state(test_config(&server.uri()));
    let app = init_app!(ctx.state);

    let req = test::TestRequest::get().uri("/api/v1/shelters").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], 500);
    assert_eq!(body["detail"], "SERVICE ERROR");
}

#[actix_web::test]
async fn test_non_ok_result_code_is_bad_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sido_v2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": {
                "header": { "resultCode": "30", "resultMsg": "SERVICE_KEY_IS_NOT_REGISTERED_ERROR" }
            }
        })))
        .mount(&server)
        .await;

    let ctx = build_state(test_config(&server.uri()));
    let app = init_app!(ctx.state);

    let req = test::TestRequest::get().uri("/api/v1/shelters/sido").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"]["resultCode"], "30");
}

#[actix_web::test]
async fn test_missing_service_key_is_server_error() {
    let server = MockServer::start().await;
    let mut config = test_config(&server.uri());
    config.open_data.service_key = None;

    let ctx = build_state(config);
    let app = init_app!(ctx.state);

    let req = test::TestRequest::get()
        .uri("/api/v1/shelters/animals")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("OPEN_DATA_SERVICE_KEY"));
}

#[actix_web::test]
async fn test_bad_date_and_rows_are_rejected() {
    let server = MockServer::start().await;
    let ctx = build_state(test_config(&server.uri()));
    let app = init_app!(ctx.state);

    for uri in [
        "/api/v1/shelters/animals?bgnde=2024-01-01",
        "/api/v1/shelters/animals?bgnde=20240201&endde=20240101",
        "/api/v1/shelters/animals?numOfRows=5000",
        "/api/v1/shelters/sigungu",
        "/api/v1/shelters/kinds?up_kind_cd=%20",
    ] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", uri);
    }
}

#[actix_web::test]
async fn test_sigungu_passes_province_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sigungu_v2"))
        .and(query_param("upr_cd", "6110000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            json!({ "item": [
                { "orgCd": "3220000", "orgdownNm": "강남구" },
                { "orgCd": "3240000", "orgdownNm": "강동구" }
            ] }),
            json!(2),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = build_state(test_config(&server.uri()));
    let app = init_app!(ctx.state);

    let req = test::TestRequest::get()
        .uri("/api/v1/shelters/sigungu?upr_cd=6110000")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
}
