//! Pipeline data model.

use serde::{Deserialize, Serialize};

/// One page of extracted text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Page number as reported by the loader (0-based for PDFs)
    pub number: u32,

    /// Raw page text
    pub text: String,
}

impl Page {
    pub fn new(number: u32, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }
}

/// A loaded document with an explicit, stable source label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Stable label, e.g. the PDF path relative to the ingestion directory
    pub source: String,

    /// Pages in document order
    pub pages: Vec<Page>,
}

impl Document {
    pub fn new(source: impl Into<String>, pages: Vec<Page>) -> Self {
        Self {
            source: source.into(),
            pages,
        }
    }
}

/// Location metadata carried by a chunk before it is identified.
///
/// Both fields are optional so that chunks from foreign producers can be
/// checked before identification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub source: Option<String>,
    pub page: Option<u32>,
}

/// A contiguous piece of page text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub text: String,
    pub metadata: ChunkMetadata,
}

impl Chunk {
    pub fn new(text: impl Into<String>, source: impl Into<String>, page: u32) -> Self {
        Self {
            text: text.into(),
            metadata: ChunkMetadata {
                source: Some(source.into()),
                page: Some(page),
            },
        }
    }
}

/// A chunk with its deterministic identifier `"{source}:{page}:{sequence_index}"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifiedChunk {
    pub id: String,
    pub text: String,
    pub source: String,
    pub page: u32,
    pub sequence_index: u32,
}

impl IdentifiedChunk {
    pub fn metadata(&self) -> EntryMetadata {
        EntryMetadata {
            source: self.source.clone(),
            page: self.page,
            id: self.id.clone(),
        }
    }
}

/// Metadata stored next to every indexed vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryMetadata {
    pub source: String,
    pub page: u32,
    pub id: String,
}

/// A record as written to the vector index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedEntry {
    pub id: String,
    pub vector: Vec<f32>,
    pub text: String,
    pub metadata: EntryMetadata,
}

impl IndexedEntry {
    pub fn from_chunk(chunk: &IdentifiedChunk, vector: Vec<f32>) -> Self {
        Self {
            id: chunk.id.clone(),
            vector,
            text: chunk.text.clone(),
            metadata: chunk.metadata(),
        }
    }
}

/// One search hit. Higher `score` means more relevant (`1 - cosine distance`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub text: String,
    pub metadata: EntryMetadata,
    pub score: f32,
}

/// Outcome of an indexing run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexReport {
    /// Entries newly written to the index
    pub added: usize,

    /// Chunks whose id was already present (or repeated in the input)
    pub skipped: usize,
}

/// Outcome of an ingestion run, including loader statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestStats {
    pub documents: usize,
    pub pages: usize,
    pub chunks: usize,
    pub added: usize,
    pub skipped: usize,
    pub duration_secs: f64,
}

/// A generated answer with its grounding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// Generator output
    pub response: String,

    /// Chunk ids in context order
    pub sources: Vec<String>,

    /// Prompt sent to the generator
    pub prompt: String,

    /// Relevance score of each source, aligned with `sources`
    pub scores: Vec<f32>,
}

/// Collection statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionStats {
    pub collection_name: String,
    pub collection_path: String,
    pub entries: usize,
}
