//! Application startup and lifecycle management.

use crate::config::LogReportConfig;
use crate::handlers::{
    explain_log, fetch_generate_report, generate_report,
    health::{health_check, readiness_check},
    metrics::metrics,
};
use crate::pipeline::{PipelineSettings, ReportPipeline};
use crate::services::init_metrics;
use crate::services::providers::gemini::{GeminiConfig, GeminiTextProvider};
use crate::services::providers::TextGenerator;
use axum::{
    middleware::from_fn,
    routing::{any, get},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    request_id_middleware, security_headers_middleware, REQUEST_ID_HEADER,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Shared application state. Everything in it is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<LogReportConfig>,
    pub pipeline: Arc<ReportPipeline>,
}

impl AppState {
    pub fn new(config: LogReportConfig, generator: Arc<dyn TextGenerator>) -> Self {
        let pipeline = ReportPipeline::new(PipelineSettings::from_config(&config), generator);
        Self {
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
        }
    }
}

/// Report routes accept any method so the pipeline, not the router, answers 405.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics))
        .route("/api/explain-log", any(explain_log))
        .route("/api/generate-report", any(generate_report))
        .route(
            "/.netlify/functions/generate-report",
            any(fetch_generate_report),
        )
        .layer(from_fn(security_headers_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application against the real Gemini API.
    pub async fn build(config: LogReportConfig) -> Result<Self, AppError> {
        let provider = GeminiTextProvider::new(GeminiConfig::from(&config.gemini))
            .map_err(|e| AppError::InternalError(anyhow::anyhow!(e)))?;

        tracing::info!(
            model = %config.gemini.model,
            api_base = %config.gemini.api_base,
            "Initialized Gemini text provider"
        );

        Self::build_with_generator(config, Arc::new(provider)).await
    }

    /// Build the application with any text generator (tests use the mock).
    pub async fn build_with_generator(
        config: LogReportConfig,
        generator: Arc<dyn TextGenerator>,
    ) -> Result<Self, AppError> {
        init_metrics().map_err(|e| {
            AppError::InternalError(anyhow::anyhow!("Failed to initialize metrics: {}", e))
        })?;

        if config.gemini.api_key.is_none() {
            tracing::warn!("GEMINI_API_KEY is not set; report requests will fail with 500");
        }

        // Port 0 = random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Log report service listening on port {}", port);

        let router = build_router(AppState::new(config, generator));

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run until the server fails.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router).await
    }

    /// Run until `signal` resolves, then drain in-flight requests.
    pub async fn run_with_shutdown<F>(self, signal: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(signal)
            .await
    }
}
