//! The log-to-report request pipeline.
//!
//! One request moves through `method check -> credential check -> body parse ->
//! prompt build -> one upstream call` and ends as either a [`GeneratedReport`] or a
//! [`PipelineError`]. Checks run in that order, so a wrong method never reads the
//! credential and a missing credential never reads the body.

mod error;
mod request;

pub use error::PipelineError;
pub use request::{GeneratedReport, InboundRequest, LogInput, ReportKind};

use crate::config::LogReportConfig;
use crate::prompts::{render_prompt, TruncationPolicy};
use crate::services::metrics;
use crate::services::providers::TextGenerator;
use axum::body::Bytes;
use axum::http::Method;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use secrecy::Secret;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Read-only settings fixed at construction.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub credential: Option<Secret<String>>,
    pub truncation: TruncationPolicy,
    pub upstream_timeout: Duration,
    pub max_body_bytes: usize,
}

impl PipelineSettings {
    pub fn from_config(config: &LogReportConfig) -> Self {
        Self {
            credential: config.gemini.api_key.clone(),
            truncation: config.limits.truncation,
            upstream_timeout: config.gemini.timeout,
            max_body_bytes: config.limits.max_body_bytes,
        }
    }
}

pub struct ReportPipeline {
    settings: PipelineSettings,
    generator: Arc<dyn TextGenerator>,
}

impl ReportPipeline {
    pub fn new(settings: PipelineSettings, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            settings,
            generator,
        }
    }

    pub fn has_credential(&self) -> bool {
        self.settings.credential.is_some()
    }

    #[tracing::instrument(
        skip(self, request),
        fields(kind = kind.as_str(), method = %request.method)
    )]
    pub async fn handle(
        &self,
        kind: ReportKind,
        request: InboundRequest,
    ) -> Result<GeneratedReport, PipelineError> {
        if request.method != Method::POST {
            return Err(PipelineError::MethodNotAllowed);
        }

        let credential = self
            .settings
            .credential
            .as_ref()
            .ok_or_else(|| PipelineError::Configuration("API Key missing".to_string()))?;

        let body = self.read_body(request).await?;
        let input = LogInput::parse(kind, &body)?;
        let prompt = render_prompt(&input, &self.settings.truncation);

        tracing::debug!(
            prompt_len = prompt.len(),
            generator = self.generator.name(),
            "Prompt built, calling upstream"
        );

        let started = Instant::now();
        let outcome = tokio::time::timeout(
            self.settings.upstream_timeout,
            self.generator.generate(credential, &prompt),
        )
        .await;
        metrics::observe_upstream_latency(kind, started.elapsed());

        let result = match outcome {
            Ok(result) => result.map_err(PipelineError::from),
            Err(_) => Err(PipelineError::Timeout(self.settings.upstream_timeout)),
        };

        match result {
            Ok(text) => {
                tracing::debug!(response_len = text.len(), "Upstream call succeeded");
                Ok(GeneratedReport::new(kind, text))
            }
            Err(err) => {
                metrics::record_upstream_error(kind, err.kind());
                Err(err)
            }
        }
    }

    async fn read_body(&self, request: InboundRequest) -> Result<Bytes, PipelineError> {
        let limit = self.settings.max_body_bytes;

        let collected = Limited::new(request.body, limit)
            .collect()
            .await
            .map_err(|e| {
                if e.downcast_ref::<LengthLimitError>().is_some() {
                    PipelineError::PayloadTooLarge(limit)
                } else {
                    PipelineError::BadRequest(format!("Failed to read request body: {}", e))
                }
            })?;

        Ok(collected.to_bytes())
    }
}
