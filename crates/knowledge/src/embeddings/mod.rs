//! Embedding providers.
//!
//! Every provider turns text into a fixed-length vector. The Ollama provider
//! is used for real collections; the mock provider is deterministic and
//! offline.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};
