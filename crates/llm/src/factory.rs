//! Answer generator factory.
//!
//! Resolves a provider name from configuration into a ready client.

use crate::client::LlmClient;
use crate::providers::OllamaClient;
use std::sync::Arc;
use std::time::Duration;
use vrag_core::{AppError, AppResult};

/// Create an LLM client for the named provider.
///
/// # Arguments
/// * `provider` - Provider identifier (only "ollama" is shipped)
/// * `endpoint` - Optional custom endpoint URL
/// * `timeout` - Request timeout for generation calls
///
/// # Errors
/// `AppError::Config` for unknown providers or an HTTP client that cannot be
/// built.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    timeout: Duration,
) -> AppResult<Arc<dyn LlmClient>> {
    match provider.to_lowercase().as_str() {
        "ollama" => {
            let base_url = endpoint.unwrap_or(crate::providers::ollama::DEFAULT_OLLAMA_URL);
            let client = OllamaClient::with_base_url(base_url, timeout)?;
            Ok(Arc::new(client))
        }
        _ => Err(AppError::Config(format!(
            "Unknown generation provider: {}. Supported: ollama",
            provider
        ))),
    }
}
