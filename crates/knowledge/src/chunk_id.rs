//! Deterministic chunk identifiers.
//!
//! A chunk id is `"{source}:{page}:{sequence_index}"`. The sequence index
//! counts chunks of the same (source, page) in processing order, starting at
//! 0. State lives in an explicit [`ChunkIdAssigner`] folded over the input;
//! nothing is kept between calls.
//!
//! A page key that re-appears after a different key resumes its own counter,
//! so ids never collide even when pages are interleaved. Grouping by page key
//! and numbering each group on its own gives the same ids, which is what
//! [`assign_ids_grouped`] does.

use crate::types::{Chunk, IdentifiedChunk};
use std::collections::HashMap;
use vrag_core::{AppError, AppResult};

/// Format a chunk id.
pub fn format_id(source: &str, page: u32, sequence_index: u32) -> String {
    format!("{}:{}:{}", source, page, sequence_index)
}

/// Accumulator for sequence numbering.
#[derive(Debug, Default)]
pub struct ChunkIdAssigner {
    last_page_key: Option<(String, u32)>,
    current_sequence_index: u32,
    next_index: HashMap<(String, u32), u32>,
}

impl ChunkIdAssigner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identify the next chunk in processing order.
    pub fn assign(&mut self, chunk: Chunk) -> AppResult<IdentifiedChunk> {
        let (source, page) = page_key(&chunk)?;
        let key = (source, page);

        if self.last_page_key.as_ref() == Some(&key) {
            self.current_sequence_index += 1;
        } else {
            if let Some(previous) = self.last_page_key.take() {
                self.next_index
                    .insert(previous, self.current_sequence_index + 1);
            }
            self.current_sequence_index = self.next_index.get(&key).copied().unwrap_or(0);
        }

        let sequence_index = self.current_sequence_index;
        let id = format_id(&key.0, key.1, sequence_index);
        let (source, page) = key.clone();
        self.last_page_key = Some(key);

        Ok(IdentifiedChunk {
            id,
            text: chunk.text,
            source,
            page,
            sequence_index,
        })
    }
}

/// Identify chunks in input order.
///
/// # Errors
/// `AppError::MalformedMetadata` for the first chunk missing its source or
/// page; no partial result is returned.
pub fn assign_ids(chunks: Vec<Chunk>) -> AppResult<Vec<IdentifiedChunk>> {
    chunks
        .into_iter()
        .try_fold(
            (ChunkIdAssigner::new(), Vec::new()),
            |(mut assigner, mut out), chunk| -> AppResult<(ChunkIdAssigner, Vec<IdentifiedChunk>)> {
                out.push(assigner.assign(chunk)?);
                Ok((assigner, out))
            },
        )
        .map(|(_, out)| out)
}

/// Identify chunks group by group.
///
/// Chunks are grouped by (source, page) in order of first appearance and
/// each group is numbered independently. Produces the same ids as
/// [`assign_ids`]; the output is ordered by group.
pub fn assign_ids_grouped(chunks: Vec<Chunk>) -> AppResult<Vec<IdentifiedChunk>> {
    let mut order: Vec<(String, u32)> = Vec::new();
    let mut groups: HashMap<(String, u32), Vec<Chunk>> = HashMap::new();

    for chunk in chunks {
        let key = page_key(&chunk)?;
        if !groups.contains_key(&key) {
            order.push(key.clone());
        }
        groups.entry(key).or_default().push(chunk);
    }

    let mut identified = Vec::new();
    for key in order {
        let group = groups.remove(&key).unwrap_or_default();
        identified.extend(assign_ids(group)?);
    }

    Ok(identified)
}

fn page_key(chunk: &Chunk) -> AppResult<(String, u32)> {
    let source = chunk.metadata.source.clone().ok_or_else(|| {
        AppError::MalformedMetadata(format!("Chunk is missing its source: {}", preview(&chunk.text)))
    })?;
    let page = chunk.metadata.page.ok_or_else(|| {
        AppError::MalformedMetadata(format!(
            "Chunk from '{}' is missing its page: {}",
            source,
            preview(&chunk.text)
        ))
    })?;
    Ok((source, page))
}

fn preview(text: &str) -> String {
    text.chars().take(40).collect()
}
