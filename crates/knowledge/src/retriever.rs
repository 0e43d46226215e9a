//! Retrieval and prompt assembly.
//!
//! The question is embedded, the top-k chunks are fetched, their texts are
//! joined in retrieval order into the `{{context}}` block, and the rendered
//! prompt goes to the answer generator.

use crate::embeddings::EmbeddingProvider;
use crate::types::{Answer, RetrievalResult};
use crate::vector_index::VectorIndex;
use vrag_core::AppResult;
use vrag_llm::{LlmClient, LlmRequest};
use vrag_prompt::{render_prompt, PromptTemplate};

/// Separator placed between retrieved chunk texts.
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Join retrieved texts in the order given.
pub fn build_context(results: &[RetrievalResult]) -> String {
    results
        .iter()
        .map(|r| r.text.as_str())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

/// Answers questions over a vector index.
pub struct Retriever<'a> {
    index: &'a dyn VectorIndex,
    embedder: &'a dyn EmbeddingProvider,
    generator: &'a dyn LlmClient,
    model: String,
    template: PromptTemplate,
}

impl<'a> Retriever<'a> {
    pub fn new(
        index: &'a dyn VectorIndex,
        embedder: &'a dyn EmbeddingProvider,
        generator: &'a dyn LlmClient,
        model: impl Into<String>,
        template: PromptTemplate,
    ) -> Self {
        Self {
            index,
            embedder,
            generator,
            model: model.into(),
            template,
        }
    }

    /// Top-k chunks for `question`, most relevant first.
    pub async fn retrieve(&self, question: &str, k: usize) -> AppResult<Vec<RetrievalResult>> {
        let query_vector = self.embedder.embed(question).await?;
        let results = self.index.search(&query_vector, k).await?;

        tracing::info!(
            "Retrieved {} chunks (requested {}, top score: {:.3})",
            results.len(),
            k,
            results.first().map(|r| r.score).unwrap_or(0.0)
        );

        Ok(results)
    }

    /// Answer `question` from the `k` most relevant chunks.
    ///
    /// An empty index still produces a prompt (with an empty context) and a
    /// generator call. Embedding and generator errors are returned unchanged.
    pub async fn answer(&self, question: &str, k: usize, temperature: f32) -> AppResult<Answer> {
        let results = self.retrieve(question, k).await?;

        let context = build_context(&results);
        let prompt = render_prompt(&self.template, &context, question)?;
        tracing::debug!("Rendered prompt ({} chars)", prompt.len());

        let request = LlmRequest::new(prompt.clone(), self.model.clone()).with_temperature(temperature);
        let response = self.generator.complete(&request).await?;

        Ok(Answer {
            response: response.content,
            sources: results.iter().map(|r| r.metadata.id.clone()).collect(),
            prompt,
            scores: results.iter().map(|r| r.score).collect(),
        })
    }
}
