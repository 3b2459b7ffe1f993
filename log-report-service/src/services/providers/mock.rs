//! Mock provider implementation for testing.

use super::{ProviderError, TextGenerator};
use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// What the mock answers on every call.
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    ApiError(String),
    NetworkError(String),
    MissingText,
}

/// Records every call so tests can assert how often the upstream was hit.
pub struct MockTextGenerator {
    reply: MockReply,
    delay: Option<Duration>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
    credentials: Mutex<Vec<String>>,
}

impl MockTextGenerator {
    pub fn new(reply: MockReply) -> Self {
        Self {
            reply,
            delay: None,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
            credentials: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(text: &str) -> Self {
        Self::new(MockReply::Text(text.to_string()))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts().pop()
    }

    pub fn last_credential(&self) -> Option<String> {
        self.credentials
            .lock()
            .map(|c| c.last().cloned())
            .unwrap_or_else(|poisoned| poisoned.into_inner().last().cloned())
    }
}

fn push(log: &Mutex<Vec<String>>, value: String) {
    match log.lock() {
        Ok(mut entries) => entries.push(value),
        Err(poisoned) => poisoned.into_inner().push(value),
    }
}

#[async_trait]
impl TextGenerator for MockTextGenerator {
    async fn generate(
        &self,
        credential: &Secret<String>,
        prompt: &str,
    ) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        push(&self.prompts, prompt.to_string());
        push(&self.credentials, credential.expose_secret().clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.reply {
            MockReply::Text(text) => Ok(text.clone()),
            MockReply::ApiError(message) => Err(ProviderError::Api(message.clone())),
            MockReply::NetworkError(message) => Err(ProviderError::Network(message.clone())),
            MockReply::MissingText => Err(ProviderError::MissingText(
                "candidates[0].content.parts[0].text".to_string(),
            )),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
