#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use log_report_service::config::{GeminiSettings, LimitSettings, LogReportConfig};
use log_report_service::services::providers::gemini::{GeminiConfig, GeminiTextProvider};
use log_report_service::services::providers::mock::MockTextGenerator;
use log_report_service::services::providers::TextGenerator;
use log_report_service::startup::{build_router, AppState};
use secrecy::Secret;
use service_core::config::Config as CoreConfig;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

pub const TEST_API_KEY: &str = "test-secret-key";
pub const TEST_MODEL: &str = "gemini-test";

pub fn test_config(api_key: Option<&str>, api_base: &str) -> LogReportConfig {
    LogReportConfig {
        common: CoreConfig { port: 0 },
        gemini: GeminiSettings {
            api_key: api_key.map(|k| Secret::new(k.to_string())),
            api_base: api_base.to_string(),
            model: TEST_MODEL.to_string(),
            timeout: Duration::from_secs(5),
        },
        limits: LimitSettings::default(),
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("response body is not JSON")
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Router driven in-process through `oneshot`.
pub struct TestApp {
    pub router: Router,
}

impl TestApp {
    pub fn new(config: LogReportConfig, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            router: build_router(AppState::new(config, generator)),
        }
    }

    /// App backed by `mock`, with a configured credential.
    pub fn with_mock(mock: &Arc<MockTextGenerator>) -> Self {
        Self::new(test_config(Some(TEST_API_KEY), "http://unused.invalid"), mock.clone())
    }

    /// App backed by the real Gemini provider pointed at `api_base`.
    pub fn with_gemini(api_key: Option<&str>, api_base: &str) -> Self {
        let config = test_config(api_key, api_base);
        let provider = GeminiTextProvider::new(GeminiConfig::from(&config.gemini))
            .expect("Failed to create Gemini provider");
        Self::new(config, Arc::new(provider))
    }

    pub async fn request(&self, method: Method, path: &str, body: Body) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router failed");

        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body")
            .to_vec();

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn post_json(&self, path: &str, body: serde_json::Value) -> TestResponse {
        self.request(Method::POST, path, Body::from(body.to_string()))
            .await
    }
}

pub fn gemini_success(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{ "content": { "parts": [{ "text": text }], "role": "model" } }]
    })
}

/// A local address nothing is listening on.
pub async fn refused_address() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind probe listener");
    let addr = listener.local_addr().expect("Failed to read probe address");
    drop(listener);
    format!("http://{}", addr)
}
