use crate::services::providers::ProviderError;
use axum::http::StatusCode;
use std::time::Duration;
use thiserror::Error;

/// Every way a report request can end without a report.
///
/// `Display` is the exact string placed in the client's `{"error": ...}` body,
/// so upstream messages pass through unprefixed.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    /// Missing server credential. Every route answers with
    /// `Server configuration error: API Key missing`; the explain-log route used to say
    /// `API Key missing on server`, so clients matching that older string must switch.
    #[error("Server configuration error: {0}")]
    Configuration(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Request body exceeds the {0} byte limit")]
    PayloadTooLarge(usize),

    #[error("{0}")]
    Upstream(String),

    #[error("Malformed upstream response: missing {0}")]
    MalformedUpstreamResponse(String),

    #[error("Upstream request timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),
}

impl PipelineError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PipelineError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            PipelineError::BadRequest(_) => StatusCode::BAD_REQUEST,
            PipelineError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            PipelineError::Configuration(_)
            | PipelineError::Upstream(_)
            | PipelineError::MalformedUpstreamResponse(_)
            | PipelineError::Timeout(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::MethodNotAllowed => "method_not_allowed",
            PipelineError::Configuration(_) => "configuration",
            PipelineError::BadRequest(_) => "bad_request",
            PipelineError::PayloadTooLarge(_) => "payload_too_large",
            PipelineError::Upstream(_) => "upstream",
            PipelineError::MalformedUpstreamResponse(_) => "malformed_upstream",
            PipelineError::Timeout(_) => "timeout",
        }
    }
}

impl From<ProviderError> for PipelineError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::MissingText(path) => PipelineError::MalformedUpstreamResponse(path),
            other => PipelineError::Upstream(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_message_is_verbatim() {
        let err: PipelineError = ProviderError::Api("quota exceeded".to_string()).into();
        assert_eq!(err.to_string(), "quota exceeded");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn missing_text_becomes_malformed_response() {
        let err: PipelineError =
            ProviderError::MissingText("candidates[0].content.parts[0].text".to_string()).into();
        assert!(matches!(err, PipelineError::MalformedUpstreamResponse(_)));
    }

    #[test]
    fn status_codes() {
        let cases = vec![
            (PipelineError::MethodNotAllowed, StatusCode::METHOD_NOT_ALLOWED),
            (
                PipelineError::Configuration("API Key missing".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                PipelineError::BadRequest("bad".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (PipelineError::PayloadTooLarge(10), StatusCode::PAYLOAD_TOO_LARGE),
            (
                PipelineError::Timeout(Duration::from_secs(60)),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.status_code(), expected, "{}", err.kind());
        }
    }

    #[test]
    fn configuration_message_matches_client_contract() {
        let err = PipelineError::Configuration("API Key missing".to_string());
        assert_eq!(err.to_string(), "Server configuration error: API Key missing");
    }

    #[test]
    fn timeout_message_names_duration() {
        let err = PipelineError::Timeout(Duration::from_millis(1500));
        assert_eq!(err.to_string(), "Upstream request timed out after 1.5s");
    }
}
