use super::PipelineError;
use axum::body::Body;
use axum::http::Method;
use serde::{Deserialize, Serialize};

/// Which report a route produces. Selects the template, truncation bound and output field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    /// One log line explained in plain language.
    Explanation,
    /// Access + error log batch turned into a markdown incident report.
    IncidentReport,
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Explanation => "explain_log",
            ReportKind::IncidentReport => "incident_report",
        }
    }
}

/// Host-neutral request. The body stays unread until method and credential checks pass.
pub struct InboundRequest {
    pub method: Method,
    pub body: Body,
}

impl InboundRequest {
    pub fn new(method: Method, body: impl Into<Body>) -> Self {
        Self {
            method,
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogInput {
    Single {
        log_line: String,
    },
    Batch {
        access_logs: String,
        error_logs: String,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExplainLogBody {
    log_line: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IncidentReportBody {
    access_logs: String,
    error_logs: String,
}

impl LogInput {
    /// Decode and type-check the JSON body for `kind`. Missing or non-string fields are
    /// rejected here rather than surfacing later as an upstream failure.
    pub fn parse(kind: ReportKind, body: &[u8]) -> Result<Self, PipelineError> {
        let value: serde_json::Value = serde_json::from_slice(body).map_err(|e| {
            PipelineError::BadRequest(format!("Request body must be valid JSON: {}", e))
        })?;

        if !value.is_object() {
            return Err(PipelineError::BadRequest(
                "Request body must be a JSON object".to_string(),
            ));
        }

        match kind {
            ReportKind::Explanation => {
                let body: ExplainLogBody = serde_json::from_value(value).map_err(invalid_body)?;
                Ok(LogInput::Single {
                    log_line: body.log_line,
                })
            }
            ReportKind::IncidentReport => {
                let body: IncidentReportBody =
                    serde_json::from_value(value).map_err(invalid_body)?;
                Ok(LogInput::Batch {
                    access_logs: body.access_logs,
                    error_logs: body.error_logs,
                })
            }
        }
    }

    pub fn kind(&self) -> ReportKind {
        match self {
            LogInput::Single { .. } => ReportKind::Explanation,
            LogInput::Batch { .. } => ReportKind::IncidentReport,
        }
    }
}

fn invalid_body(err: serde_json::Error) -> PipelineError {
    PipelineError::BadRequest(format!("Invalid request body: {}", err))
}

/// Success payload; serializes to `{"explanation": ...}` or `{"markdown": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum GeneratedReport {
    Explanation { explanation: String },
    Markdown { markdown: String },
}

impl GeneratedReport {
    pub fn new(kind: ReportKind, text: String) -> Self {
        match kind {
            ReportKind::Explanation => GeneratedReport::Explanation { explanation: text },
            ReportKind::IncidentReport => GeneratedReport::Markdown { markdown: text },
        }
    }
}
