//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint through the public router.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use guarded_kv::{
    api::create_router,
    guard::RateLimitConfig,
    store::{RecordStore, SqliteStore},
    AppState,
};
use serde_json::{json, Value};
use tower::ServiceExt;

// == Helper Functions ==

const KEY: &str = "validapi1";

fn seeded_store() -> Arc<SqliteStore> {
    let store = SqliteStore::open_in_memory().unwrap();
    store
        .seed_api_keys(&["validapi1", "validapi2", "validapi3"])
        .unwrap();
    Arc::new(store)
}

fn app_with(store: Arc<SqliteStore>, max_requests: u32) -> Router {
    let limits = RateLimitConfig::new(max_requests, Duration::from_secs(60));
    create_router(AppState::new(store, limits))
}

fn create_test_app() -> Router {
    // Generous quota so functional tests never trip the limiter
    app_with(seeded_store(), 1000)
}

fn request(method: &str, uri: &str, api_key: Option<&str>, body: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(key) = api_key {
        builder = builder.header("x-api-key", key);
    }
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> Response {
    app.clone().oneshot(req).await.unwrap()
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// == End-to-end Scenario ==

#[tokio::test]
async fn test_create_get_update_flow() {
    let app = create_test_app();

    let response = send(
        &app,
        request("POST", "/data", Some(KEY), Some(r#"{"key":"x","value":"hello"}"#)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        body_to_json(response.into_body()).await,
        json!({"message": "Data added successfully", "x": "hello"})
    );

    let response = send(&app, request("GET", "/data/x", Some(KEY), None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_to_json(response.into_body()).await,
        json!({"data": {"x": "hello"}, "source": "cache"})
    );

    let response = send(
        &app,
        request("PUT", "/data/x", Some(KEY), Some(r#"{"value":"world"}"#)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_to_json(response.into_body()).await,
        json!({"message": "Data updated successfully", "x": "world"})
    );

    let response = send(&app, request("GET", "/data/x", Some(KEY), None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["data"]["x"], "world");
    assert_eq!(json["source"], "cache");

    let response = send(
        &app,
        request("POST", "/data", Some(KEY), Some(r#"{"key":"x","value":"again"}"#)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_to_json(response.into_body()).await.get("error").is_some());
}

// == GET Endpoint Tests ==

#[tokio::test]
async fn test_get_reads_through_from_database() {
    let store = seeded_store();
    store.create("preloaded", "from-disk").unwrap();
    let app = app_with(store, 1000);

    let response = send(&app, request("GET", "/data/preloaded", Some(KEY), None)).await;
    assert_eq!(
        body_to_json(response.into_body()).await,
        json!({"data": {"preloaded": "from-disk"}, "source": "database"})
    );

    let response = send(&app, request("GET", "/data/preloaded", Some(KEY), None)).await;
    assert_eq!(body_to_json(response.into_body()).await["source"], "cache");
}

#[tokio::test]
async fn test_get_unknown_key() {
    let app = create_test_app();

    let response = send(&app, request("GET", "/data/never_created", Some(KEY), None)).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_to_json(response.into_body()).await,
        json!({"error": "Key not found"})
    );
}

// == PUT Endpoint Tests ==

#[tokio::test]
async fn test_update_unknown_key_does_not_create() {
    let app = create_test_app();

    let response = send(
        &app,
        request("PUT", "/data/ghost", Some(KEY), Some(r#"{"value":"boo"}"#)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, request("GET", "/data/ghost", Some(KEY), None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// == Body Validation Tests ==

#[tokio::test]
async fn test_malformed_bodies_are_bad_requests() {
    let app = create_test_app();

    let bodies = [
        r#"{"invalid json"#,
        r#"{"value":"no key"}"#,
        r#"{"key":"no_value"}"#,
        r#"{"key":"","value":"empty key"}"#,
        r#"{"key":"k","value":42}"#,
        r#""not an object""#,
    ];

    for body in bodies {
        let response = send(&app, request("POST", "/data", Some(KEY), Some(body))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {}", body);
        assert!(body_to_json(response.into_body()).await.get("error").is_some());
    }
}

#[tokio::test]
async fn test_update_without_value_is_bad_request() {
    let app = create_test_app();
    send(
        &app,
        request("POST", "/data", Some(KEY), Some(r#"{"key":"x","value":"v"}"#)),
    )
    .await;

    for body in ["{}", r#"{"invalid json"#, r#"{"value":7}"#] {
        let response = send(&app, request("PUT", "/data/x", Some(KEY), Some(body))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {}", body);
    }

    let response = send(&app, request("GET", "/data/x", Some(KEY), None)).await;
    assert_eq!(body_to_json(response.into_body()).await["data"]["x"], "v");
}

#[tokio::test]
async fn test_update_unknown_key_with_bad_body_is_not_found() {
    let app = create_test_app();

    for body in ["{}", r#"{"invalid json"#] {
        let response = send(&app, request("PUT", "/data/ghost", Some(KEY), Some(body))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "body: {}", body);
        assert_eq!(
            body_to_json(response.into_body()).await,
            json!({"error": "Key not found"})
        );
    }
}

// == Response Shape Tests ==

#[tokio::test]
async fn test_record_named_message_yields_single_member() {
    let app = create_test_app();

    let response = send(
        &app,
        request("POST", "/data", Some(KEY), Some(r#"{"key":"message","value":"hi"}"#)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let raw = String::from_utf8(bytes.to_vec()).unwrap();
    assert_eq!(raw.matches("\"message\"").count(), 1, "body: {}", raw);
    assert_eq!(
        serde_json::from_str::<Value>(&raw).unwrap(),
        json!({"message": "hi"})
    );
}

// == Authentication Tests ==

#[tokio::test]
async fn test_invalid_credentials_are_unauthorized() {
    let app = create_test_app();

    for api_key in [None, Some(""), Some("not-a-key")] {
        let response = send(&app, request("GET", "/data/x", api_key, None)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "key: {:?}", api_key);
        assert_eq!(
            body_to_json(response.into_body()).await,
            json!({"error": "Invalid or missing API Key"})
        );
    }
}

#[tokio::test]
async fn test_all_seeded_keys_are_authorized() {
    let app = create_test_app();

    for api_key in ["validapi1", "validapi2", "validapi3"] {
        let response = send(&app, request("GET", "/data/x", Some(api_key), None)).await;
        // Authorized requests reach the handler, which reports the missing key
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn test_unauthorized_does_not_leak_key_existence() {
    let store = seeded_store();
    store.create("secret", "value").unwrap();
    let app = app_with(store, 1000);

    let existing = send(&app, request("GET", "/data/secret", Some("bad"), None)).await;
    let missing = send(&app, request("GET", "/data/other", Some("bad"), None)).await;

    assert_eq!(existing.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
}

// == Rate Limiting Tests ==

#[tokio::test]
async fn test_sixth_request_is_rate_limited() {
    let app = app_with(seeded_store(), 5);

    for _ in 0..5 {
        let response = send(&app, request("GET", "/data/x", Some(KEY), None)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    let response = send(&app, request("GET", "/data/x", Some(KEY), None)).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let retry_after: u64 = response.headers()[header::RETRY_AFTER]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!((1..=60).contains(&retry_after));
    assert!(body_to_json(response.into_body()).await.get("error").is_some());

    // Other clients have their own quota
    let response = send(&app, request("GET", "/data/x", Some("validapi2"), None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_rate_limit_runs_before_authentication() {
    let app = app_with(seeded_store(), 2);

    for _ in 0..2 {
        let response = send(&app, request("GET", "/data/x", None, None)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    // Anonymous callers share one bucket, now exhausted
    let response = send(&app, request("GET", "/data/x", None, None)).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_quota_is_shared_across_guarded_routes() {
    let app = app_with(seeded_store(), 3);

    let responses = [
        send(
            &app,
            request("POST", "/data", Some(KEY), Some(r#"{"key":"a","value":"1"}"#)),
        )
        .await,
        send(&app, request("GET", "/data/a", Some(KEY), None)).await,
        send(&app, request("PUT", "/data/a", Some(KEY), Some(r#"{"value":"2"}"#))).await,
        send(&app, request("GET", "/stats", Some(KEY), None)).await,
    ];

    let statuses: Vec<StatusCode> = responses.iter().map(|r| r.status()).collect();
    assert_eq!(
        statuses,
        vec![
            StatusCode::CREATED,
            StatusCode::OK,
            StatusCode::OK,
            StatusCode::TOO_MANY_REQUESTS
        ]
    );
}

// == List-all Endpoint Tests ==

#[tokio::test]
async fn test_list_all_is_open_and_unlimited() {
    let store = seeded_store();
    store.create("a", "1").unwrap();
    store.create("b", "").unwrap();
    let app = app_with(store, 1);

    // Exhaust the anonymous bucket on a guarded route first
    send(&app, request("GET", "/data/a", None, None)).await;
    let response = send(&app, request("GET", "/data/a", None, None)).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    for _ in 0..3 {
        let response = send(&app, request("GET", "/data", None, None)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_to_json(response.into_body()).await,
            json!({"a": "1", "b": ""})
        );
    }
}

#[tokio::test]
async fn test_list_all_empty() {
    let app = create_test_app();

    let response = send(&app, request("GET", "/data", None, None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_to_json(response.into_body()).await, json!({}));
}

// == STATS / HEALTH Endpoint Tests ==

#[tokio::test]
async fn test_stats_endpoint() {
    let app = create_test_app();

    send(
        &app,
        request("POST", "/data", Some(KEY), Some(r#"{"key":"s","value":"v"}"#)),
    )
    .await;
    send(&app, request("GET", "/data/s", Some(KEY), None)).await; // hit
    send(&app, request("GET", "/data/missing", Some(KEY), None)).await; // miss

    let response = send(&app, request("GET", "/stats", Some(KEY), None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;

    assert_eq!(json["cache"]["hits"].as_u64().unwrap(), 1);
    assert_eq!(json["cache"]["misses"].as_u64().unwrap(), 1);
    assert_eq!(json["cache"]["total_entries"].as_u64().unwrap(), 1);
    assert!(json["cache"].get("hit_rate").is_some());
    assert_eq!(json["rate_limiter"]["tracked_identities"].as_u64().unwrap(), 1);
    assert_eq!(json["rate_limiter"]["max_requests"].as_u64().unwrap(), 1000);
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let response = send(&app, request("GET", "/health", None, None)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"].as_str().unwrap(), "healthy");
    assert!(json.get("timestamp").is_some());
}
