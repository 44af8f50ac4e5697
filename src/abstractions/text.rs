//! Text-generation collaborator

use crate::error::{Error, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Notify};

/// Produces a structured JSON document for a prompt.
///
/// Implementations send `schema` along with the prompt so the remote model
/// can constrain its output, but callers must still validate the result.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_structured(&self, prompt: &str, schema: &Value) -> Result<Value>;
}

/// Type alias for recorded prompts
type RecordedPrompts = Arc<Mutex<Vec<String>>>;

/// Mock implementation of `TextGenerator` for testing
#[derive(Clone, Default)]
pub struct MockTextGenerator {
    responses: Arc<Mutex<Vec<Result<Value>>>>,
    prompts: RecordedPrompts,
    gate: Option<Arc<Notify>>,
    delay: Option<Duration>,
}

impl MockTextGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response
    pub async fn add_response(&self, value: Value) {
        self.responses.lock().await.push(Ok(value));
    }

    /// Queue a failure carrying `message`
    pub async fn add_error(&self, message: &str) {
        self.responses
            .lock()
            .await
            .push(Err(Error::External(message.to_string())));
    }

    /// Hold every call until `gate` is notified
    #[must_use]
    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Sleep before answering each call
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Prompts received so far
    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.prompts.lock().await.len()
    }
}

#[async_trait]
impl TextGenerator for MockTextGenerator {
    async fn generate_structured(&self, prompt: &str, _schema: &Value) -> Result<Value> {
        self.prompts.lock().await.push(prompt.to_string());

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let mut responses = self.responses.lock().await;
        if responses.is_empty() {
            return Err(Error::External("No mock response configured".to_string()));
        }
        responses.remove(0)
    }
}
