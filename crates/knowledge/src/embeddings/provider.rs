//! Embedding provider trait and factory.

use crate::embeddings::providers::{MockProvider, OllamaProvider};
use std::sync::Arc;
use std::time::Duration;
use vrag_core::{AppConfig, AppError, AppResult};

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "mock", "ollama")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Generate the embedding for one text.
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>>;

    /// Generate embeddings for several texts, in input order.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }
}

/// Create the embedding provider selected by configuration.
///
/// The Ollama provider runs its availability self-check here, so a returned
/// provider is known to answer.
///
/// # Errors
/// `AppError::Config` for an unknown provider or a missing embedding model,
/// `AppError::Connectivity` when the service cannot be reached.
pub async fn create_provider(config: &AppConfig) -> AppResult<Arc<dyn EmbeddingProvider>> {
    let settings = &config.rag;

    match settings.embedding_provider.to_lowercase().as_str() {
        "mock" => {
            let provider = MockProvider::new(crate::embeddings::providers::mock::DEFAULT_DIMENSIONS);
            Ok(Arc::new(provider))
        }

        "ollama" => {
            let model = config.require_embedding_model()?;
            let provider = OllamaProvider::connect(
                &settings.ollama_endpoint,
                model,
                Duration::from_secs(settings.request_timeout_secs),
            )
            .await?;
            Ok(Arc::new(provider))
        }

        other => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: ollama, mock",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(provider: &str, model: Option<&str>) -> AppConfig {
        let mut config = AppConfig::default();
        config.rag.embedding_provider = provider.to_string();
        config.rag.embedding_model = model.map(str::to_string);
        config
    }

    #[tokio::test]
    async fn test_create_mock_provider() {
        let provider = create_provider(&config_with("mock", None)).await.unwrap();
        assert_eq!(provider.provider_name(), "mock");
        assert_eq!(provider.dimensions(), 384);

        let embedding = provider.embed("test text").await.unwrap();
        assert_eq!(embedding.len(), 384);
    }

    #[tokio::test]
    async fn test_ollama_without_model_is_config_error() {
        match create_provider(&config_with("ollama", None)).await {
            Err(AppError::Config(msg)) => assert!(msg.contains("LLM_EMBEDDING_MODEL")),
            other => panic!("Expected config error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_ollama_unreachable_is_connectivity_error() {
        let mut config = config_with("ollama", Some("nomic-embed-text"));
        config.rag.ollama_endpoint = "http://127.0.0.1:9".to_string();
        config.rag.request_timeout_secs = 2;

        let result = create_provider(&config).await;
        assert!(matches!(result, Err(AppError::Connectivity(_))));
    }

    #[tokio::test]
    async fn test_create_unknown_provider() {
        let result = create_provider(&config_with("openai", Some("x"))).await;
        match result {
            Err(AppError::Config(msg)) => assert!(msg.contains("Unknown embedding provider")),
            other => panic!("Expected config error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_default_embed_batch_preserves_order() {
        let provider = MockProvider::new(64);
        let texts = vec!["alpha beta".to_string(), "gamma delta".to_string()];

        let batch = provider.embed_batch(&texts).await.unwrap();
        assert_eq!(batch[0], provider.embed("alpha beta").await.unwrap());
        assert_eq!(batch[1], provider.embed("gamma delta").await.unwrap());
    }
}
