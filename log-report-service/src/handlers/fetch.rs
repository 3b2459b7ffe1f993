use super::{ErrorBody, HostAdapter};
use crate::pipeline::{GeneratedReport, PipelineError};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Platform-native `fetch(Request) -> Response` handler.
///
/// A wrong method gets a plain-text body; everything else is JSON with an explicit
/// `Content-Type`.
pub struct FetchStyle;

impl HostAdapter for FetchStyle {
    fn render_response(result: Result<GeneratedReport, PipelineError>) -> Response {
        match result {
            Ok(report) => json_response(StatusCode::OK, &report),
            Err(PipelineError::MethodNotAllowed) => {
                (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed").into_response()
            }
            Err(err) => json_response(err.status_code(), &ErrorBody::from(&err)),
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    match serde_json::to_vec(body) {
        Ok(bytes) => (
            status,
            [(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            )],
            bytes,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to serialize response body: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
