//! Ollama embedding provider.
//!
//! Calls `POST {endpoint}/api/embeddings` with `{model, prompt}` and reads
//! back `{embedding}`. Ollama has no batch endpoint, so batches are embedded
//! one text at a time. Failures are returned as-is; nothing is retried.

use crate::embeddings::EmbeddingProvider;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};
use vrag_core::{AppError, AppResult};

const EMBEDDING_ENDPOINT: &str = "/api/embeddings";

/// Text embedded once at construction to check availability and learn the
/// vector width.
const SELF_CHECK_TEXT: &str = "test";

/// Ollama embedding provider using the local API.
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
    dimensions: usize,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

impl OllamaProvider {
    /// Connect to Ollama and run the availability self-check.
    ///
    /// # Errors
    /// * `AppError::Connectivity` - the service did not answer
    /// * `AppError::Config` - the service answered but the model is unusable
    pub async fn connect(base_url: &str, model: &str, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client for Ollama: {}", e)))?;

        let mut provider = Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            dimensions: 0,
        };

        provider.dimensions = provider.self_check().await?;

        Ok(provider)
    }

    #[instrument(skip(self), fields(model = %self.model))]
    async fn self_check(&self) -> AppResult<usize> {
        debug!("Verifying Ollama embeddings at {}", self.base_url);

        match self.request_embedding(SELF_CHECK_TEXT).await {
            Ok(embedding) => {
                debug!(
                    "Ollama embedding model '{}' ready ({} dimensions)",
                    self.model,
                    embedding.len()
                );
                Ok(embedding.len())
            }
            Err(AppError::Connectivity(e)) => Err(AppError::Connectivity(format!(
                "Ollama not available at {}: {}",
                self.base_url, e
            ))),
            Err(e @ AppError::EmptyResult(_)) => Err(e),
            Err(e) => Err(AppError::Config(format!(
                "Embedding model '{}' is not usable at {}: {}. Run: ollama pull {}",
                self.model, self.base_url, e, self.model
            ))),
        }
    }

    #[instrument(skip(self, text), fields(text_len = text.len()))]
    async fn request_embedding(&self, text: &str) -> AppResult<Vec<f32>> {
        let url = format!("{}{}", self.base_url, EMBEDDING_ENDPOINT);

        let response = self
            .client
            .post(&url)
            .json(&EmbeddingRequest {
                model: &self.model,
                prompt: text,
            })
            .send()
            .await
            .map_err(|e| AppError::Connectivity(format!("Failed to send request to Ollama: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|r| r.error)
                .unwrap_or(body);
            return Err(AppError::Model(format!(
                "Ollama embedding model '{}' failed ({}): {}",
                self.model, status, message
            )));
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| AppError::Model(format!("Failed to parse Ollama embedding response: {}", e)))?;

        if body.embedding.is_empty() {
            return Err(AppError::EmptyResult(format!(
                "Ollama model '{}' returned an empty embedding",
                self.model
            )));
        }

        Ok(body.embedding)
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for OllamaProvider {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    #[instrument(skip(self, text), fields(provider = "ollama", model = %self.model))]
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let embedding = self.request_embedding(text).await?;

        if embedding.len() != self.dimensions {
            return Err(AppError::Model(format!(
                "Unexpected embedding dimensions from '{}': got {}, expected {}",
                self.model,
                embedding.len(),
                self.dimensions
            )));
        }

        Ok(embedding)
    }
}
