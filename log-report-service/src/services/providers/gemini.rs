//! Gemini `generateContent` provider.
//!
//! Sends the prompt as the single text part of a single content entry and reads
//! back `candidates[0].content.parts[0].text`.

use super::{ProviderError, TextGenerator};
use crate::config::GeminiSettings;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

const TEXT_PATH: &str = "candidates[0].content.parts[0].text";

/// Gemini provider configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_base: String,
    pub model: String,
}

impl From<&GeminiSettings> for GeminiConfig {
    fn from(settings: &GeminiSettings) -> Self {
        Self {
            api_base: settings.api_base.clone(),
            model: settings.model.clone(),
        }
    }
}

/// Gemini text provider.
pub struct GeminiTextProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiTextProvider {
    pub fn new(config: GeminiConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| ProviderError::Client(e.without_url().to_string()))?;

        Ok(Self { config, client })
    }

    /// `{base}/models/{model}:generateContent`; the key is attached as a query parameter per call.
    fn api_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl TextGenerator for GeminiTextProvider {
    async fn generate(
        &self,
        credential: &Secret<String>,
        prompt: &str,
    ) -> Result<String, ProviderError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        tracing::debug!(
            model = %self.config.model,
            prompt_len = prompt.len(),
            "Sending request to Gemini API"
        );

        let response = self
            .client
            .post(self.api_url())
            .query(&[("key", credential.expose_secret().as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ProviderError::Network(e.without_url().to_string()))?;

        extract_text(status, &body).inspect_err(|e| {
            tracing::warn!(status = status.as_u16(), error = %e, "Gemini API call failed");
        })
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

/// Interpret a `generateContent` reply.
///
/// The body decides before the status does: an `error.message` is reported verbatim
/// whatever the status, and a 2xx body without the text path is a malformed response.
fn extract_text(status: StatusCode, body: &[u8]) -> Result<String, ProviderError> {
    let parsed: GenerateContentResponse = match serde_json::from_slice(body) {
        Ok(parsed) => parsed,
        Err(e) if status.is_success() => {
            return Err(ProviderError::InvalidResponse(e.to_string()));
        }
        Err(_) => return Err(unexpected_status(status)),
    };

    if let Some(error) = parsed.error {
        return Err(match error.message.filter(|m| !m.is_empty()) {
            Some(message) => ProviderError::Api(message),
            None => unexpected_status(status),
        });
    }

    if !status.is_success() {
        return Err(unexpected_status(status));
    }

    parsed
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts)
        .and_then(|parts| parts.into_iter().next())
        .and_then(|part| part.text)
        .ok_or_else(|| ProviderError::MissingText(TEXT_PATH.to_string()))
}

fn unexpected_status(status: StatusCode) -> ProviderError {
    ProviderError::Api(format!("Gemini API returned HTTP {}", status))
}

// ============================================================================
// Gemini API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

// Every level is optional: the reply shape is not ours to trust.
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Option<Vec<Candidate>>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn extracts_first_candidate_text() {
        let reply = body(json!({
            "candidates": [
                { "content": { "parts": [{ "text": "X" }, { "text": "ignored" }] } },
                { "content": { "parts": [{ "text": "second" }] } }
            ]
        }));
        assert_eq!(extract_text(StatusCode::OK, &reply).unwrap(), "X");
    }

    #[test]
    fn service_error_message_is_verbatim() {
        let reply = body(json!({ "error": { "code": 429, "message": "quota exceeded" } }));
        let err = extract_text(StatusCode::TOO_MANY_REQUESTS, &reply).unwrap_err();
        assert_eq!(err.to_string(), "quota exceeded");
    }

    #[test]
    fn service_error_wins_even_with_ok_status() {
        let reply = body(json!({ "error": { "message": "API key not valid" } }));
        let err = extract_text(StatusCode::OK, &reply).unwrap_err();
        assert!(matches!(err, ProviderError::Api(ref m) if m == "API key not valid"));
    }

    #[test]
    fn missing_text_path_is_malformed() {
        for reply in [
            json!({}),
            json!({ "candidates": [] }),
            json!({ "candidates": [{ "finishReason": "SAFETY" }] }),
            json!({ "candidates": [{ "content": { "parts": [] } }] }),
            json!({ "candidates": [{ "content": { "parts": [{ "inlineData": {} }] } }] }),
        ] {
            let err = extract_text(StatusCode::OK, &body(reply.clone())).unwrap_err();
            assert!(matches!(err, ProviderError::MissingText(_)), "{reply}");
        }
    }

    #[test]
    fn non_json_success_body_is_invalid_response() {
        let err = extract_text(StatusCode::OK, b"<html>oops</html>").unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }

    #[test]
    fn non_json_error_body_reports_status() {
        let err = extract_text(StatusCode::BAD_GATEWAY, b"upstream down").unwrap_err();
        assert_eq!(err.to_string(), "Gemini API returned HTTP 502 Bad Gateway");
    }

    #[test]
    fn request_body_has_single_text_part() {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: "hello".to_string(),
                }],
            }],
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "contents": [{ "parts": [{ "text": "hello" }] }] })
        );
    }

    #[test]
    fn api_url_tolerates_trailing_slash() {
        let provider = GeminiTextProvider::new(GeminiConfig {
            api_base: "http://localhost:9999/v1beta/".to_string(),
            model: "gemini-test".to_string(),
        })
        .unwrap();
        assert_eq!(
            provider.api_url(),
            "http://localhost:9999/v1beta/models/gemini-test:generateContent"
        );
    }
}
