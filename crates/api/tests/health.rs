//! Health, diagnostics and general HTTP behaviour. No database required.

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{body_json, build_offline_app, get, get_auth, leadership_form, post_json};
use coursecraft_core::roles::{ROLE_ADMIN, ROLE_TRAINER};
use coursecraft_generation::openai::{OpenAiBackend, OpenAiConfig};
use tower::ServiceExt;

#[tokio::test]
async fn health_reports_degraded_without_database() {
    let (app, _) = build_offline_app();
    let response = get(app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["db_healthy"], false);
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let (app, _) = build_offline_app();
    let response = get(app, "/this-route-does-not-exist").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn response_carries_request_id() {
    let (app, _) = build_offline_app();
    let response = get(app, "/api/v1/diagnostics/connectivity").await;

    let id = response
        .headers()
        .get("x-request-id")
        .expect("x-request-id header")
        .to_str()
        .unwrap();
    assert_eq!(id.len(), 36, "x-request-id should be a UUID string");
}

#[tokio::test]
async fn cors_preflight_allows_dev_origin() {
    let (app, _) = build_offline_app();
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/v1/generation")
        .header("Origin", "http://localhost:5173")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "content-type")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "http://localhost:5173"
    );
}

#[tokio::test]
async fn connectivity_reports_job_store_size() {
    let (app, _) = build_offline_app();

    let json = body_json(get(app.clone(), "/api/v1/diagnostics/connectivity").await).await;
    assert_eq!(json["data"]["jobStoreSize"], 0);
    assert!(json["data"]["serverTime"].is_string());

    post_json(
        app.clone(),
        "/api/v1/generation",
        serde_json::json!({ "action": "start", "formData": leadership_form() }),
    )
    .await;

    let json = body_json(get(app, "/api/v1/diagnostics/connectivity").await).await;
    assert_eq!(json["data"]["jobStoreSize"], 1);
}

#[tokio::test]
async fn backend_probe_with_mock() {
    let (app, _) = build_offline_app();
    let token = common::access_token(1, ROLE_TRAINER);
    let json = body_json(get_auth(app, "/api/v1/diagnostics/backend", &token).await).await;
    assert_eq!(json["data"]["backend"], "mock");
    assert_eq!(json["data"]["hasCredential"], true);
    assert_eq!(json["data"]["reachable"], true);
    assert!(json["data"].get("error").is_none());
}

#[tokio::test]
async fn backend_probe_without_credential() {
    let backend = Arc::new(OpenAiBackend::new(OpenAiConfig::default()));
    let (app, _) = common::build_test_app_with(common::unreachable_pool(), backend);

    let token = common::access_token(1, ROLE_TRAINER);
    let json = body_json(get_auth(app, "/api/v1/diagnostics/backend", &token).await).await;
    assert_eq!(json["data"]["backend"], "openai");
    assert_eq!(json["data"]["hasCredential"], false);
    assert_eq!(json["data"]["reachable"], false);
    assert!(json["data"]["error"].is_string());
}

#[tokio::test]
async fn env_report_lists_presence_only() {
    let (app, _) = build_offline_app();
    let token = common::access_token(1, ROLE_ADMIN);
    let json = body_json(get_auth(app, "/api/v1/diagnostics/env", &token).await).await;

    let data = json["data"].as_object().unwrap();
    assert!(data.contains_key("OPENAI_API_KEY"));
    assert!(data.contains_key("JOB_RECOVERY_POLICY"));
    assert!(data.values().all(|v| v.is_boolean()));
}

#[tokio::test]
async fn backend_probe_requires_sign_in() {
    let (app, _) = build_offline_app();
    let response = get(app, "/api/v1/diagnostics/backend").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn env_report_is_admin_only() {
    let (app, _) = build_offline_app();
    let response = get(app.clone(), "/api/v1/diagnostics/env").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let token = common::access_token(1, ROLE_TRAINER);
    let response = get_auth(app, "/api/v1/diagnostics/env", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
