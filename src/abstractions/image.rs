//! Image-generation collaborator

use crate::error::{Error, Result};
use crate::identity::LogoArtifact;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Produces one image for a prompt
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate_image(&self, prompt: &str, aspect_ratio: &str) -> Result<LogoArtifact>;
}

/// Type alias for recorded (prompt, aspect ratio) calls
type RecordedCalls = Arc<Mutex<Vec<(String, String)>>>;

/// Mock implementation of `ImageGenerator` for testing
#[derive(Clone, Default)]
pub struct MockImageGenerator {
    responses: Arc<Mutex<Vec<Result<LogoArtifact>>>>,
    calls: RecordedCalls,
}

impl MockImageGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_response(&self, artifact: LogoArtifact) {
        self.responses.lock().await.push(Ok(artifact));
    }

    pub async fn add_error(&self, message: &str) {
        self.responses
            .lock()
            .await
            .push(Err(Error::External(message.to_string())));
    }

    pub async fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }
}

#[async_trait]
impl ImageGenerator for MockImageGenerator {
    async fn generate_image(&self, prompt: &str, aspect_ratio: &str) -> Result<LogoArtifact> {
        self.calls
            .lock()
            .await
            .push((prompt.to_string(), aspect_ratio.to_string()));

        let mut responses = self.responses.lock().await;
        if responses.is_empty() {
            return Err(Error::External("No mock response configured".to_string()));
        }
        responses.remove(0)
    }
}
