//! PDF retrieval-augmented question answering.
//!
//! Write path: PDFs are loaded, split into overlapping chunks, given
//! deterministic ids and written to a LanceDB collection, skipping ids that
//! are already stored. Read path: a question is embedded, the nearest chunks
//! are joined into a prompt, and the answer generator responds.

pub mod chunk_id;
pub mod chunker;
pub mod embeddings;
pub mod indexer;
pub mod lancedb_index;
pub mod loader;
pub mod retriever;
pub mod types;
pub mod vector_index;

#[cfg(test)]
mod tests;

pub use chunk_id::{assign_ids, assign_ids_grouped, ChunkIdAssigner};
pub use embeddings::{create_provider, EmbeddingProvider};
pub use lancedb_index::LanceDbIndex;
pub use retriever::{build_context, Retriever};
pub use types::{
    Answer, Chunk, ChunkMetadata, CollectionStats, Document, EntryMetadata, IdentifiedChunk,
    IndexReport, IndexedEntry, IngestStats, Page, RetrievalResult,
};
pub use vector_index::VectorIndex;

use std::time::{Duration, Instant};
use vrag_core::{AppConfig, AppError, AppResult, RagSettings};
use vrag_llm::create_client;

/// Provider used for answer generation.
const GENERATION_PROVIDER: &str = "ollama";

/// Open the configured collection.
pub async fn open_index(config: &AppConfig) -> AppResult<LanceDbIndex> {
    LanceDbIndex::open(&config.collection_dir(), &config.rag.collection_name).await
}

/// Chunk, identify and index already-loaded documents.
///
/// Every chunk produced is counted as either added or skipped in the report.
pub async fn ingest_documents(
    documents: &[Document],
    index: &dyn VectorIndex,
    embedder: &dyn EmbeddingProvider,
    settings: &RagSettings,
) -> AppResult<IndexReport> {
    let chunks = chunker::split(documents, settings.chunk_size, settings.chunk_overlap)?;
    let identified = assign_ids(chunks)?;
    indexer::index_chunks(&identified, index, embedder, settings.embedding_batch_size).await
}

/// Populate the collection from the configured PDF directory.
///
/// With `reset`, the collection is cleared first.
pub async fn ingest(config: &AppConfig, reset: bool) -> AppResult<IngestStats> {
    let start = Instant::now();
    config.validate()?;

    let index = open_index(config).await?;
    if reset {
        tracing::info!("Clearing collection '{}'", config.rag.collection_name);
        indexer::clear(&index).await?;
    }

    let pdf_dir = config.pdf_dir();
    tracing::info!("Starting ingestion from {:?}", pdf_dir);
    let documents = loader::load_directory(&pdf_dir)?;

    let embedder = create_provider(config).await?;
    tracing::debug!(
        "Embedding with '{}' (model: {}, {} dimensions)",
        embedder.provider_name(),
        embedder.model_name(),
        embedder.dimensions()
    );

    let report = ingest_documents(&documents, &index, embedder.as_ref(), &config.rag).await?;

    let stats = IngestStats {
        documents: documents.len(),
        pages: documents.iter().map(|d| d.pages.len()).sum(),
        chunks: report.added + report.skipped,
        added: report.added,
        skipped: report.skipped,
        duration_secs: start.elapsed().as_secs_f64(),
    };

    tracing::info!(
        "Ingestion completed: {} documents, {} chunks, {} added, {} skipped in {:.2}s",
        stats.documents,
        stats.chunks,
        stats.added,
        stats.skipped,
        stats.duration_secs
    );

    Ok(stats)
}

/// Answer a question against the configured collection.
///
/// `k` and `temperature` override the configured values when given.
pub async fn query(
    config: &AppConfig,
    question: &str,
    k: Option<usize>,
    temperature: Option<f32>,
) -> AppResult<Answer> {
    config.validate()?;

    let k = k.unwrap_or(config.rag.chunks_to_return);
    if k == 0 {
        return Err(AppError::Config("k must be greater than 0".to_string()));
    }
    let temperature = temperature.unwrap_or(config.rag.temperature);
    if !(0.0..=2.0).contains(&temperature) {
        return Err(AppError::Config(format!(
            "temperature must be between 0.0 and 2.0, got {}",
            temperature
        )));
    }

    let model = config.require_generation_model()?;
    let template = vrag_prompt::load_or_default(config.prompt_path().as_deref())?;
    let generator = create_client(
        GENERATION_PROVIDER,
        Some(config.rag.ollama_endpoint.as_str()),
        Duration::from_secs(config.rag.request_timeout_secs),
    )?;

    let index = open_index(config).await?;
    let embedder = create_provider(config).await?;

    tracing::info!("Answering with top-{} chunks using model '{}'", k, model);

    Retriever::new(&index, embedder.as_ref(), generator.as_ref(), model, template)
        .answer(question, k, temperature)
        .await
}

/// Irreversibly remove every entry from the configured collection.
pub async fn clear(config: &AppConfig) -> AppResult<()> {
    let index = open_index(config).await?;
    indexer::clear(&index).await
}

/// Entry count of the configured collection.
pub async fn stats(config: &AppConfig) -> AppResult<CollectionStats> {
    let index = open_index(config).await?;
    Ok(CollectionStats {
        collection_name: config.rag.collection_name.clone(),
        collection_path: index.location().display().to_string(),
        entries: index.count().await?,
    })
}
