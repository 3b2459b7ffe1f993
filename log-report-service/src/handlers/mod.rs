//! HTTP handlers.
//!
//! Each hosting target the service once ran on is a [`HostAdapter`]: it decides how a
//! platform request becomes an [`InboundRequest`] and how a pipeline result becomes a
//! platform response. The pipeline itself is shared by every route.

pub mod fetch;
pub mod health;
pub mod metrics;
pub mod node;

pub use fetch::FetchStyle;
pub use node::NodeStyle;

use crate::pipeline::{GeneratedReport, InboundRequest, PipelineError, ReportKind};
use crate::services::metrics as service_metrics;
use crate::startup::AppState;
use axum::extract::{Request, State};
use axum::response::Response;
use serde::Serialize;

/// Client-facing failure body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl From<&PipelineError> for ErrorBody {
    fn from(err: &PipelineError) -> Self {
        Self {
            error: err.to_string(),
        }
    }
}

pub trait HostAdapter {
    fn parse_request(request: Request) -> InboundRequest {
        let (parts, body) = request.into_parts();
        InboundRequest {
            method: parts.method,
            body,
        }
    }

    fn render_response(result: Result<GeneratedReport, PipelineError>) -> Response;
}

/// Drive one request through the pipeline behind adapter `A`.
pub async fn serve<A: HostAdapter>(
    state: &AppState,
    kind: ReportKind,
    request: Request,
) -> Response {
    let inbound = A::parse_request(request);
    let result = state.pipeline.handle(kind, inbound).await;

    match &result {
        Ok(_) => {
            service_metrics::record_request(kind, "success");
            tracing::info!(kind = kind.as_str(), "Report generated");
        }
        Err(err) => {
            service_metrics::record_request(kind, err.kind());
            let status = err.status_code().as_u16();
            if err.status_code().is_server_error() {
                tracing::error!(
                    kind = kind.as_str(),
                    status,
                    error = %err,
                    "Report request failed"
                );
            } else {
                tracing::warn!(
                    kind = kind.as_str(),
                    status,
                    error = %err,
                    "Report request rejected"
                );
            }
        }
    }

    A::render_response(result)
}

/// `/api/explain-log`
pub async fn explain_log(State(state): State<AppState>, request: Request) -> Response {
    serve::<NodeStyle>(&state, ReportKind::Explanation, request).await
}

/// `/api/generate-report`
pub async fn generate_report(State(state): State<AppState>, request: Request) -> Response {
    serve::<NodeStyle>(&state, ReportKind::IncidentReport, request).await
}

/// `/.netlify/functions/generate-report`
pub async fn fetch_generate_report(State(state): State<AppState>, request: Request) -> Response {
    serve::<FetchStyle>(&state, ReportKind::IncidentReport, request).await
}
