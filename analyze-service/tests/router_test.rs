use analyze_service::config::{AnalyzeConfig, CorsConfig, ObservabilityConfig, OpenAiConfig};
use analyze_service::startup::{build_router, routes, with_middleware, AppState};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    routing::get,
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use service_core::config::Config as CoreConfig;
use tower::util::ServiceExt;

fn state_with_origins(allowed_origins: Vec<String>) -> AppState {
    AppState::new(AnalyzeConfig {
        common: CoreConfig::default(),
        openai: OpenAiConfig { api_key: None },
        cors: CorsConfig { allowed_origins },
        observability: ObservabilityConfig {
            log_level: "info".to_string(),
            otlp_endpoint: None,
        },
    })
}

fn app_with_origins(allowed_origins: Vec<String>) -> Router {
    build_router(state_with_origins(allowed_origins))
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn app() -> Router {
    app_with_origins(Vec::new())
}

async fn post_analyze(body: impl Into<Body>) -> (StatusCode, Value) {
    let response = app()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/analyze")
                .header(header::CONTENT_TYPE, "application/json")
                .body(body.into())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap();
    (status, body)
}

#[tokio::test]
async fn empty_lists_are_echoed() {
    let (status, body) = post_analyze(r#"{"questions": [], "answers": []}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "received": { "questions": [], "answers": [] } }));
}

#[tokio::test]
async fn length_mismatch_is_tolerated() {
    let (status, body) =
        post_analyze(r#"{"questions": ["a", "b", "c"], "answers": ["only one"]}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "received": { "questions": ["a", "b", "c"], "answers": ["only one"] } })
    );
}

#[tokio::test]
async fn order_and_values_are_preserved() {
    let questions = vec!["z", "", "ünïcödé ✓", "  spaced  ", "a"];
    let payload = json!({ "questions": questions, "answers": ["1", "1", "0"] });

    let (status, body) = post_analyze(payload.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["received"], payload);
}

#[tokio::test]
async fn missing_answers_is_rejected() {
    let (status, body) = post_analyze(r#"{"questions": ["q"]}"#).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body,
        json!({
            "detail": [
                { "loc": ["body", "answers"], "msg": "Field required", "type": "missing" }
            ]
        })
    );
}

#[tokio::test]
async fn non_list_questions_is_rejected() {
    let (status, body) = post_analyze(r#"{"questions": "q", "answers": []}"#).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["loc"], json!(["body", "questions"]));
    assert_eq!(body["detail"][0]["type"], "list_type");
}

#[tokio::test]
async fn all_field_errors_are_reported() {
    let (status, body) = post_analyze(r#"{"questions": [1, "ok", true]}"#).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let locs: Vec<&Value> = body["detail"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| &d["loc"])
        .collect();
    assert_eq!(
        locs,
        vec![
            &json!(["body", "questions", 0]),
            &json!(["body", "questions", 2]),
            &json!(["body", "answers"]),
        ]
    );
}

#[tokio::test]
async fn empty_body_is_missing() {
    let (status, body) = post_analyze(Body::empty()).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body,
        json!({ "detail": [ { "loc": ["body"], "msg": "Field required", "type": "missing" } ] })
    );
}

#[tokio::test]
async fn whitespace_body_is_invalid_json() {
    let (status, body) = post_analyze("   ").await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["type"], "json_invalid");
    assert_eq!(body["detail"][0]["loc"], json!(["body", 3]));
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let (status, body) = post_analyze(r#"{"questions": ["#).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["type"], "json_invalid");
    assert_eq!(body["detail"][0]["loc"], json!(["body", 15]));
    assert!(body.get("received").is_none());
}

#[tokio::test]
async fn wrong_method_returns_json_405() {
    let response = app()
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri("/api/analyze")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(json_body(response).await, json!({ "detail": "Method Not Allowed" }));
}

async fn explode() -> &'static str {
    panic!("echo failed")
}

#[tokio::test]
async fn handler_panic_becomes_json_500() {
    let app = with_middleware(
        routes().route("/explode", get(explode)),
        state_with_origins(Vec::new()),
    );

    let response = app
        .oneshot(Request::builder().uri("/explode").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(json_body(response).await, json!({ "detail": "echo failed" }));
}

#[tokio::test]
async fn unknown_route_returns_json_404() {
    let response = app()
        .oneshot(Request::builder().uri("/api/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await, json!({ "detail": "Not Found" }));
}

#[tokio::test]
async fn responses_carry_security_headers_and_request_id() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    assert_eq!(response.headers()[header::X_FRAME_OPTIONS], "DENY");
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn cors_preflight_allows_configured_origin() {
    let response = app_with_origins(vec!["https://app.example".to_string()])
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/api/analyze")
                .header(header::ORIGIN, "https://app.example")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://app.example"
    );
}

#[tokio::test]
async fn metrics_endpoint_responds_without_recorder() {
    let response = app()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
