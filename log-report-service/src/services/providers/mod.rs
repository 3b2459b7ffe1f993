//! Text generation provider abstraction.
//!
//! The pipeline only needs "prompt in, text out"; providers own the wire format
//! and map every failure into [`ProviderError`].

pub mod gemini;
pub mod mock;

use async_trait::async_trait;
use secrecy::Secret;
use thiserror::Error;

/// Error type for provider operations.
///
/// Messages never contain the credential: transport errors are stripped of
/// their request URL before being stored.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Failed to create HTTP client: {0}")]
    Client(String),

    #[error("{0}")]
    Network(String),

    /// Service-level error, message as reported by the service.
    #[error("{0}")]
    Api(String),

    #[error("Failed to parse upstream response: {0}")]
    InvalidResponse(String),

    /// Success-shaped response without the expected text field.
    #[error("Upstream response is missing {0}")]
    MissingText(String),
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Issue exactly one generation call for `prompt`.
    async fn generate(
        &self,
        credential: &Secret<String>,
        prompt: &str,
    ) -> Result<String, ProviderError>;

    fn name(&self) -> &str;
}
