use super::{ErrorBody, HostAdapter};
use crate::pipeline::{GeneratedReport, PipelineError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Conventional `(req, res)` handler: every response, including 405, is JSON.
pub struct NodeStyle;

impl HostAdapter for NodeStyle {
    fn render_response(result: Result<GeneratedReport, PipelineError>) -> Response {
        match result {
            Ok(report) => (StatusCode::OK, Json(report)).into_response(),
            Err(err) => (err.status_code(), Json(ErrorBody::from(&err))).into_response(),
        }
    }
}
