// tests/api_http.rs
//
// HTTP-level tests for the public Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - GET /careers/widget (placeholder rendering, variants, filter row)
// - GET /jobs (JSON contract)

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`
use url::Url;

use careers_slider::api::{self, AppState};
use careers_slider::categories::{CategoryEngine, CategoryHandle};

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

/// Router with no providers configured: every request falls back to the
/// placeholder records, which keeps these tests deterministic and offline.
fn test_router() -> Router {
    let state = AppState::new(
        CategoryHandle::new(CategoryEngine::builtin()),
        Url::parse("https://example.com").expect("base url"),
    );
    api::router(state)
}

async fn get_body(app: Router, uri: &str) -> (StatusCode, String) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build request");
    let resp = app.oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    (status, String::from_utf8(bytes).expect("utf8"))
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let (status, body) = get_body(test_router(), "/health").await;
    assert_eq!(status, StatusCode::OK, "health should be 200");
    assert_eq!(body.trim(), "ok");
}

#[tokio::test]
async fn api_widget_renders_placeholder_board() {
    let (status, body) = get_body(test_router(), "/careers/widget").await;
    assert_eq!(status, StatusCode::OK);

    // Without providers the placeholders render, each card tagged with its
    // category for the client-side filter.
    assert!(body.contains("fresh-jobs-wrapper"), "missing wrapper: {body}");
    assert!(body.contains(r#"data-category="Engineering""#));
    assert!(body.contains("Senior Software Engineer"));
    assert!(body.contains(r#"target="_blank""#));
}

#[tokio::test]
async fn api_widget_honors_variant_and_filter_params() {
    let (_, ultra) = get_body(test_router(), "/careers/widget?variant=ultra").await;
    assert!(ultra.contains("ultra-jobs-wrapper"));
    assert!(!ultra.contains("fresh-jobs-wrapper"));

    let (_, unfiltered) = get_body(test_router(), "/careers/widget?filters=0").await;
    assert!(!unfiltered.contains("filter-btn"));
}

#[tokio::test]
async fn api_jobs_returns_categorized_records() {
    let (status, body) = get_body(test_router(), "/jobs").await;
    assert_eq!(status, StatusCode::OK);

    let v: Json = serde_json::from_str(&body).expect("parse jobs json");
    let arr = v.as_array().expect("jobs response must be an array");
    assert_eq!(arr.len(), 3, "placeholder set has three records");
    for job in arr {
        assert!(job.get("title").and_then(Json::as_str).is_some_and(|t| !t.is_empty()));
        assert!(job.get("category").and_then(Json::as_str).is_some_and(|c| !c.is_empty()));
    }
    // Field is serialized under its wire name "type".
    assert!(arr[0].get("type").is_some());
}

#[tokio::test]
async fn api_reload_categories_reports_outcome() {
    let (status, body) = get_body(test_router(), "/admin/reload-categories").await;
    assert_eq!(status, StatusCode::OK);
    // Either the shipped config loads, or a missing file reports failure —
    // but the route never errors out.
    assert!(body == "reloaded" || body.starts_with("failed:"), "got: {body}");
}
