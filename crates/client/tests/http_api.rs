//! `HttpGenerationApi` and `Poller` against a mocked server.

use std::time::Duration;

use assert_matches::assert_matches;
use coursecraft_client::{
    ApiError, GenerationApi, HttpGenerationApi, PollError, Poller, PollerConfig, RemoteStatus,
};
use coursecraft_core::course::FormData;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn form() -> FormData {
    FormData {
        subject: "Leadership basics".into(),
        audience: "Managers".into(),
        ..Default::default()
    }
}

fn fast() -> PollerConfig {
    PollerConfig {
        interval: Duration::from_millis(10),
        poll_timeout: Duration::from_secs(5),
        safety_timeout: Duration::from_secs(10),
        max_consecutive_errors: 3,
    }
}

async fn mount_start(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/v1/generation"))
        .and(body_partial_json(json!({ "action": "start", "formData": { "subject": "Leadership basics" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "jobId": "job_1700000000000_abcdefghi",
            "status": "processing",
            "milestone": "job_created",
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn start_sends_action_and_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/generation"))
        .and(header("authorization", "Bearer secret-token"))
        .and(body_partial_json(json!({ "action": "start", "clientInfo": { "client": "tests" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "jobId": "job_1_x",
            "status": "processing",
            "milestone": "job_created",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = HttpGenerationApi::new(server.uri()).with_token("secret-token");
    let response = api.start(&form(), &json!({ "client": "tests" })).await.unwrap();
    assert!(response.success);
    assert_eq!(response.job_id.as_deref(), Some("job_1_x"));
}

#[tokio::test]
async fn validation_failure_is_an_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/generation"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "success": false,
            "error": "subject is required",
            "code": "VALIDATION_ERROR",
        })))
        .mount(&server)
        .await;

    let api = HttpGenerationApi::new(server.uri());
    let err = api.start(&FormData::default(), &json!({})).await.unwrap_err();
    assert_matches!(err, ApiError::Api { status: 400, body } if body.contains("subject is required"));
}

#[tokio::test]
async fn status_parses_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/generation"))
        .and(body_partial_json(json!({ "action": "status", "jobId": "job_0_gone" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "jobId": "job_0_gone",
            "status": "not_found",
            "progressPercent": 0,
            "statusMessage": "This generation job could not be found.",
            "error": "job not found",
        })))
        .mount(&server)
        .await;

    let api = HttpGenerationApi::new(format!("{}/", server.uri()));
    let status = api.status("job_0_gone").await.unwrap();
    assert_eq!(status.status, RemoteStatus::NotFound);
    assert!(!status.success);
}

#[tokio::test]
async fn poller_returns_materials() {
    let server = MockServer::start().await;
    mount_start(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/generation"))
        .and(body_partial_json(json!({ "action": "status" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "jobId": "job_1700000000000_abcdefghi",
            "status": "completed",
            "progressPercent": 100,
            "milestone": "completed",
            "statusMessage": "Your course materials are ready",
            "data": { "sections": [
                { "type": "lesson-plan", "title": "Lesson plan", "content": "1. Introduction" },
                { "type": "slides", "title": "Slides", "content": "Slide 1" }
            ] },
        })))
        .mount(&server)
        .await;

    let poller = Poller::new(HttpGenerationApi::new(server.uri()), fast());
    let mut updates = Vec::new();
    let materials = poller
        .generate(&form(), &json!({}), |p| updates.push(p))
        .await
        .unwrap();

    assert_eq!(materials.sections.len(), 2);
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].percent, 100);
}

#[tokio::test]
async fn poller_surfaces_job_error() {
    let server = MockServer::start().await;
    mount_start(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/generation"))
        .and(body_partial_json(json!({ "action": "status" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "status": "error",
            "progressPercent": 20,
            "milestone": "error",
            "statusMessage": "Generation failed",
            "error": "Generation failed: API error (503): overloaded",
            "errorDetails": { "attempts": 3, "kind": "api" },
        })))
        .mount(&server)
        .await;

    let poller = Poller::new(HttpGenerationApi::new(server.uri()), fast());
    let err = poller.generate(&form(), &json!({}), |_| {}).await.unwrap_err();
    assert_matches!(err, PollError::Job { details: Some(d), .. } if d["attempts"] == 3);
}

#[tokio::test]
async fn poller_gives_up_when_status_is_unreachable() {
    let server = MockServer::start().await;
    mount_start(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/generation"))
        .and(body_partial_json(json!({ "action": "status" })))
        .respond_with(ResponseTemplate::new(502))
        .expect(3)
        .mount(&server)
        .await;

    let poller = Poller::new(HttpGenerationApi::new(server.uri()), fast());
    let err = poller.generate(&form(), &json!({}), |_| {}).await.unwrap_err();
    assert_matches!(err, PollError::StatusUnavailable { attempts: 3, .. });
}
