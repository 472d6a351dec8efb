//! Shelter-id tokens over HTTP

#[macro_use]
mod common;

use actix_web::{http::StatusCode, test};
use common::{build_state, test_config};
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

macro_rules! encode_one {
    ($app:expr, $id:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/v1/shelter-tokens")
            .set_json(json!({ "ids": [$id] }))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["tokens"][0]["id"], $id);
        body["tokens"][0]["token"].as_str().unwrap().to_string()
    }};
}

#[actix_web::test]
async fn test_encode_then_decode() {
    let ctx = build_state(test_config("http://127.0.0.1:9"));
    let app = init_app!(ctx.state);

    let token = encode_one!(app, "311322200900001");
    assert!(!token.contains("311322200900001"));

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/shelter-tokens/{}", token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["id"], "311322200900001");
}

#[actix_web::test]
async fn test_batch_limits() {
    let ctx = build_state(test_config("http://127.0.0.1:9"));
    let app = init_app!(ctx.state);

    let too_many: Vec<String> = (0..101).map(|i| format!("3113222009{:05}", i)).collect();
    for payload in [
        json!({ "ids": [] }),
        json!({ "ids": too_many }),
        json!({ "ids": ["311322200900001", "  "] }),
    ] {
        let req = test::TestRequest::post()
            .uri("/api/v1/shelter-tokens")
            .set_json(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    let exactly_max: Vec<String> = (0..100).map(|i| format!("3113222009{:05}", i)).collect();
    let req = test::TestRequest::post()
        .uri("/api/v1/shelter-tokens")
        .set_json(json!({ "ids": exactly_max }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["tokens"].as_array().unwrap().len(), 100);
}

#[actix_web::test]
async fn test_unknown_token_is_not_found() {
    let ctx = build_state(test_config("http://127.0.0.1:9"));
    let app = init_app!(ctx.state);

    let req = test::TestRequest::get()
        .uri("/api/v1/shelter-tokens/not-a-real-token")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_missing_secret_is_server_error() {
    let mut config = test_config("http://127.0.0.1:9");
    config.shelter_token.secret = None;
    let ctx = build_state(config);
    let app = init_app!(ctx.state);

    let req = test::TestRequest::post()
        .uri("/api/v1/shelter-tokens")
        .set_json(json!({ "ids": ["311322200900001"] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[actix_web::test]
async fn test_animals_by_token_filters_on_shelter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/abandonmentPublic_v2"))
        .and(query_param("care_reg_no", "311322200900001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": {
                "header": { "resultCode": "00", "resultMsg": "NORMAL SERVICE." },
                "body": { "items": "", "numOfRows": 20, "pageNo": 1, "totalCount": 0 }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = build_state(test_config(&server.uri()));
    let app = init_app!(ctx.state);
    let token = encode_one!(app, "311322200900001");

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/shelters/animals/by-token/{}", token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/api/v1/shelters/animals/by-token/garbage")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
