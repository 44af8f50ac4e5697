//! Gemini `generateContent` client
//!
//! One attempt per call: failures are returned to the workflow as-is.

use super::models::{
    ApiErrorBody, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
};
use crate::abstractions::credential::MISSING_KEY_MESSAGE;
use crate::abstractions::{CredentialProvider, ImageGenerator, TextGenerator};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::identity::LogoArtifact;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Returned when the image model answers without any image part
pub const NO_IMAGE_MESSAGE: &str = "Failed to generate logo image";

/// HTTP client for the text and image models
pub struct GeminiClient {
    client: Client,
    base_url: String,
    text_model: String,
    image_model: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl GeminiClient {
    pub fn new(config: &Config, credentials: Arc<dyn CredentialProvider>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            text_model: config.text_model.clone(),
            image_model: config.image_model.clone(),
            credentials,
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }

    /// Make a single API request
    async fn make_request(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let api_key = self
            .credentials
            .api_key()
            .await
            .ok_or_else(|| Error::Credential(MISSING_KEY_MESSAGE.to_string()))?;

        let url = self.endpoint(model);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| Error::External(format!("API request failed: {}", e)))?;

        match response.status() {
            StatusCode::OK => response
                .json::<GenerateContentResponse>()
                .await
                .map_err(|e| Error::External(format!("Failed to parse response: {}", e))),
            status => {
                let body = response.text().await.unwrap_or_default();
                warn!("Model {} returned {}", model, status);
                Err(Error::External(api_error_message(status, &body)))
            }
        }
    }
}

/// Prefer the message from the Gemini error envelope; fall back to the raw body
fn api_error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(envelope) if !envelope.error.message.trim().is_empty() => envelope.error.message,
        _ => format!("API error {}: {}", status, body.trim()),
    }
}

/// Models sometimes wrap JSON in a fenced code block despite the mime type
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate_structured(&self, prompt: &str, schema: &Value) -> Result<Value> {
        let request = GenerateContentRequest::user_text(prompt, GenerationConfig::json(schema));
        let response = self.make_request(&self.text_model, &request).await?;

        if let Some(reason) = response.block_reason() {
            return Err(Error::External(format!("Request was blocked: {}", reason)));
        }

        let text: String = response
            .first_candidate_parts()
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();

        if text.trim().is_empty() {
            return Err(Error::External("Model returned an empty response".to_string()));
        }

        serde_json::from_str(strip_code_fence(&text))
            .map_err(|e| Error::External(format!("Model returned invalid JSON: {}", e)))
    }
}

#[async_trait]
impl ImageGenerator for GeminiClient {
    async fn generate_image(&self, prompt: &str, aspect_ratio: &str) -> Result<LogoArtifact> {
        let request =
            GenerateContentRequest::user_text(prompt, GenerationConfig::image(aspect_ratio));
        let response = self.make_request(&self.image_model, &request).await?;

        response
            .first_candidate_parts()
            .iter()
            .find_map(|part| part.inline_data.as_ref())
            .map(|inline| LogoArtifact::new(inline.mime_type.clone(), inline.data.clone()))
            .ok_or_else(|| Error::External(NO_IMAGE_MESSAGE.to_string()))
    }
}
