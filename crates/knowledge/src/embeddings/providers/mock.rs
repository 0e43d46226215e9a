//! Deterministic offline embeddings.

use crate::embeddings::provider::EmbeddingProvider;
use std::collections::BTreeMap;
use vrag_core::AppResult;

/// Dimensions used when the mock provider is selected by configuration.
pub const DEFAULT_DIMENSIONS: usize = 384;

const STOP_WORDS: &[&str] = &[
    "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to", "of",
    "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have", "has", "had",
    "it", "its", "their", "they", "them",
];

/// Hashing embedder for tests and offline runs.
///
/// Words (minus stop words) and their character trigrams are hashed into a
/// fixed number of buckets and the result is normalised to unit length. Texts
/// sharing vocabulary end up close under cosine distance, which is enough to
/// exercise retrieval without a model. Words are visited in sorted order, so
/// the output is bit-identical across runs.
#[derive(Debug, Clone)]
pub struct MockProvider {
    dimensions: usize,
}

impl MockProvider {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        for (word, freq) in word_frequencies(text) {
            let chars: Vec<char> = word.chars().collect();
            for window in chars.windows(3) {
                let trigram: String = window.iter().collect();
                vector[self.bucket(&trigram, 37)] += (freq as f32).sqrt();
            }
            vector[self.bucket(&word, 31)] += freq as f32;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }

        vector
    }

    fn bucket(&self, token: &str, multiplier: u64) -> usize {
        let hash = token
            .bytes()
            .fold(0u64, |acc, b| acc.wrapping_mul(multiplier).wrapping_add(b as u64));
        (hash % self.dimensions as u64) as usize
    }
}

fn word_frequencies(text: &str) -> BTreeMap<String, u32> {
    let mut freq = BTreeMap::new();
    for word in text.to_lowercase().split_whitespace() {
        if word.chars().count() > 2 && !STOP_WORDS.contains(&word) {
            *freq.entry(word.to_string()).or_insert(0) += 1;
        }
    }
    freq
}

#[async_trait::async_trait]
impl EmbeddingProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "trigram-v1"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        Ok(self.vectorize(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[tokio::test]
    async fn test_embedding_is_unit_length() {
        let provider = MockProvider::new(DEFAULT_DIMENSIONS);
        let embedding = provider.embed("interface control documents").await.unwrap();

        assert_eq!(embedding.len(), DEFAULT_DIMENSIONS);
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_deterministic() {
        let provider = MockProvider::new(128);
        assert_eq!(
            provider.embed("trade study").await.unwrap(),
            provider.embed("trade study").await.unwrap()
        );
    }

    #[tokio::test]
    async fn test_bitwise_stable_when_buckets_collide() {
        // Few buckets force many words into the same slot, so the summation
        // order shows up in the low bits.
        let provider = MockProvider::new(3);
        let text = "requirements verification validation interface architecture \
                    lifecycle stakeholder integration operations baseline \
                    configuration allocation decomposition traceability";

        let bits = |v: Vec<f32>| v.into_iter().map(f32::to_bits).collect::<Vec<u32>>();
        let expected = bits(provider.embed(text).await.unwrap());
        for _ in 0..32 {
            assert_eq!(bits(provider.embed(text).await.unwrap()), expected);
        }
    }

    #[tokio::test]
    async fn test_shared_vocabulary_scores_higher() {
        let provider = MockProvider::new(DEFAULT_DIMENSIONS);
        let query = provider.embed("requirements verification").await.unwrap();
        let related = provider
            .embed("verification of requirements happens late")
            .await
            .unwrap();
        let unrelated = provider.embed("pasta cooking recipes").await.unwrap();

        assert!(cosine(&query, &related) > cosine(&query, &unrelated));
    }

    #[tokio::test]
    async fn test_empty_text_is_zero_vector() {
        let provider = MockProvider::new(16);
        let embedding = provider.embed("").await.unwrap();
        assert!(embedding.iter().all(|&x| x == 0.0));
    }

    #[tokio::test]
    async fn test_utf8_text() {
        let provider = MockProvider::new(DEFAULT_DIMENSIONS);
        let embedding = provider.embed("Système d'ingénierie 🚀 aéronautique").await.unwrap();
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.001);
    }
}
