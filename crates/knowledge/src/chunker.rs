//! Page text chunking with configurable size and overlap.
//!
//! Sizes are measured in characters. Semantic boundaries (paragraphs,
//! sentences, words) are preferred, with a hard character split as the last
//! resort.

use crate::types::{Chunk, Document};
use text_splitter::{ChunkConfig as SplitterConfig, TextSplitter};
use vrag_core::{AppError, AppResult};

/// Split documents into overlapping chunks, preserving document and page order.
///
/// # Errors
/// `AppError::Config` when `chunk_size` is zero or `chunk_overlap` is not
/// smaller than `chunk_size`.
pub fn split(documents: &[Document], chunk_size: usize, chunk_overlap: usize) -> AppResult<Vec<Chunk>> {
    let splitter = build_splitter(chunk_size, chunk_overlap)?;

    let mut chunks = Vec::new();
    for document in documents {
        for page in &document.pages {
            let before = chunks.len();
            chunks.extend(
                splitter
                    .chunks(&page.text)
                    .filter(|text| !text.trim().is_empty())
                    .map(|text| Chunk::new(text, document.source.as_str(), page.number)),
            );

            tracing::debug!(
                "Split {} page {} into {} chunks",
                document.source,
                page.number,
                chunks.len() - before
            );
        }
    }

    tracing::info!(
        "Split {} documents into {} chunks (size: {}, overlap: {})",
        documents.len(),
        chunks.len(),
        chunk_size,
        chunk_overlap
    );

    Ok(chunks)
}

fn build_splitter(chunk_size: usize, chunk_overlap: usize) -> AppResult<TextSplitter<text_splitter::Characters>> {
    if chunk_size == 0 {
        return Err(AppError::Config("chunk_size must be greater than 0".to_string()));
    }

    if chunk_overlap >= chunk_size {
        return Err(AppError::Config(format!(
            "chunk_overlap ({}) must be smaller than chunk_size ({})",
            chunk_overlap, chunk_size
        )));
    }

    let config = SplitterConfig::new(chunk_size)
        .with_overlap(chunk_overlap)
        .map_err(|e| AppError::Config(format!("Invalid chunk settings: {}", e)))?;

    Ok(TextSplitter::new(config))
}
