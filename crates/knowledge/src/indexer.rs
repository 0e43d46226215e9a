//! Incremental index population.
//!
//! Only chunks whose id is not yet stored are embedded and written, so
//! ingesting the same documents twice is a no-op. Deduplication is by id
//! alone: changed text under an unchanged id is not re-indexed.

use crate::embeddings::EmbeddingProvider;
use crate::types::{IdentifiedChunk, IndexReport, IndexedEntry};
use crate::vector_index::VectorIndex;
use std::collections::HashSet;
use vrag_core::{AppError, AppResult};

/// Embed and store the chunks that the index does not already hold.
///
/// New chunks are embedded in batches of `batch_size`, each batch written
/// with a single upsert. Repeated ids within `chunks` are collapsed and the
/// first occurrence wins.
pub async fn index_chunks(
    chunks: &[IdentifiedChunk],
    index: &dyn VectorIndex,
    embedder: &dyn EmbeddingProvider,
    batch_size: usize,
) -> AppResult<IndexReport> {
    if batch_size == 0 {
        return Err(AppError::Config("embedding_batch_size must be greater than 0".to_string()));
    }

    let existing = index.existing_ids().await?;
    tracing::info!(
        "Number of existing entries in collection: {}",
        existing.len()
    );

    let mut seen: HashSet<&str> = HashSet::new();
    let mut new_chunks = Vec::new();
    let mut skipped = 0usize;
    for chunk in chunks {
        if existing.contains(&chunk.id) || !seen.insert(chunk.id.as_str()) {
            skipped += 1;
        } else {
            new_chunks.push(chunk);
        }
    }

    if new_chunks.is_empty() {
        tracing::info!("No new chunks to add ({} already indexed)", skipped);
        return Ok(IndexReport { added: 0, skipped });
    }

    tracing::info!("Adding {} new chunks", new_chunks.len());

    let batch_count = new_chunks.len().div_ceil(batch_size);
    let mut added = 0usize;
    for (batch_number, batch) in new_chunks.chunks(batch_size).enumerate() {
        let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
        let vectors = embedder.embed_batch(&texts).await?;

        if vectors.len() != batch.len() {
            return Err(AppError::EmptyResult(format!(
                "Embedding provider returned {} vectors for {} texts",
                vectors.len(),
                batch.len()
            )));
        }

        let entries: Vec<IndexedEntry> = batch
            .iter()
            .zip(vectors)
            .map(|(chunk, vector)| IndexedEntry::from_chunk(chunk, vector))
            .collect();

        index.upsert(&entries).await?;
        added += entries.len();

        tracing::debug!(
            "Indexed batch {}/{} ({} entries)",
            batch_number + 1,
            batch_count,
            entries.len()
        );
    }

    Ok(IndexReport { added, skipped })
}

/// Remove every entry from the index.
pub async fn clear(index: &dyn VectorIndex) -> AppResult<()> {
    index.clear().await
}
