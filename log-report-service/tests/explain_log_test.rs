//! Integration tests for `/api/explain-log`.
//!
//! Run with: cargo test -p log-report-service --test explain_log_test

mod common;

use axum::body::Body;
use axum::http::{Method, StatusCode};
use common::{test_config, TestApp};
use log_report_service::services::providers::mock::{MockReply, MockTextGenerator};
use serde_json::json;
use std::sync::Arc;

const PATH: &str = "/api/explain-log";

#[tokio::test]
async fn explains_log_line() {
    let mock = Arc::new(MockTextGenerator::replying("X"));
    let app = TestApp::with_mock(&mock);

    let response = app
        .post_json(PATH, json!({ "logLine": "GET /wp-login.php 404" }))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!({ "explanation": "X" }));
    assert_eq!(mock.call_count(), 1);

    let prompt = mock.last_prompt().unwrap();
    assert!(prompt.contains("\"GET /wp-login.php 404\""));
    assert!(prompt.contains("junior developer"));
}

#[tokio::test]
async fn non_post_methods_are_rejected_without_upstream_call() {
    let mock = Arc::new(MockTextGenerator::replying("X"));
    let app = TestApp::with_mock(&mock);

    for method in [Method::GET, Method::PUT, Method::DELETE, Method::PATCH] {
        let response = app
            .request(method.clone(), PATH, Body::from(r#"{"logLine":"x"}"#))
            .await;

        assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED, "{method}");
        assert_eq!(response.json(), json!({ "error": "Method Not Allowed" }));
    }

    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn missing_credential_is_configuration_error() {
    let mock = Arc::new(MockTextGenerator::replying("X"));
    let app = TestApp::new(test_config(None, "http://unused.invalid"), mock.clone());

    let response = app.post_json(PATH, json!({ "logLine": "x" })).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json(),
        json!({ "error": "Server configuration error: API Key missing" })
    );
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn missing_field_is_bad_request() {
    let mock = Arc::new(MockTextGenerator::replying("X"));
    let app = TestApp::with_mock(&mock);

    let response = app.post_json(PATH, json!({ "line": "x" })).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let error = response.json()["error"].as_str().unwrap().to_string();
    assert!(error.contains("logLine"), "{error}");
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn non_string_field_is_bad_request() {
    let mock = Arc::new(MockTextGenerator::replying("X"));
    let app = TestApp::with_mock(&mock);

    let response = app.post_json(PATH, json!({ "logLine": ["a", "b"] })).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn long_log_line_is_not_truncated() {
    let mock = Arc::new(MockTextGenerator::replying("X"));
    let app = TestApp::with_mock(&mock);
    let line = "¶".repeat(20_000);

    let response = app.post_json(PATH, json!({ "logLine": line })).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(mock.last_prompt().unwrap().matches('¶').count(), 20_000);
}

#[tokio::test]
async fn malformed_upstream_reply_is_server_error() {
    let mock = Arc::new(MockTextGenerator::new(MockReply::MissingText));
    let app = TestApp::with_mock(&mock);

    let response = app.post_json(PATH, json!({ "logLine": "x" })).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    let error = response.json()["error"].as_str().unwrap().to_string();
    assert!(error.contains("candidates[0].content.parts[0].text"), "{error}");
}

#[tokio::test]
async fn responses_carry_request_id() {
    let mock = Arc::new(MockTextGenerator::replying("X"));
    let app = TestApp::with_mock(&mock);

    let response = app.post_json(PATH, json!({ "logLine": "x" })).await;

    assert!(response.headers.contains_key("x-request-id"));
    assert_eq!(response.headers["x-content-type-options"], "nosniff");
}
