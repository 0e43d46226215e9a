//! Vector index abstraction.
//!
//! The pipeline only needs keyed upserts, id lookups and top-k search; the
//! search algorithm itself belongs to the backend.

use crate::types::{IndexedEntry, RetrievalResult};
use std::collections::HashSet;
use vrag_core::AppResult;

/// Trait for vector index backends.
///
/// Implementations must keep at most one entry per id and return search
/// results ordered by descending score.
#[async_trait::async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert entries, replacing any entry that already has the same id.
    async fn upsert(&self, entries: &[IndexedEntry]) -> AppResult<()>;

    /// All ids currently stored.
    async fn existing_ids(&self) -> AppResult<HashSet<String>>;

    /// The subset of `ids` that is stored.
    async fn exists(&self, ids: &[String]) -> AppResult<HashSet<String>> {
        let existing = self.existing_ids().await?;
        Ok(ids.iter().filter(|id| existing.contains(*id)).cloned().collect())
    }

    /// Up to `k` entries nearest to `query_vector`. Fewer are returned when
    /// the index holds fewer entries.
    async fn search(&self, query_vector: &[f32], k: usize) -> AppResult<Vec<RetrievalResult>>;

    /// Remove every entry.
    async fn clear(&self) -> AppResult<()>;

    /// Number of stored entries.
    async fn count(&self) -> AppResult<usize>;
}
