//! Test doubles for the pipeline collaborators.

use crate::embeddings::EmbeddingProvider;
use crate::types::{IndexedEntry, RetrievalResult};
use crate::vector_index::VectorIndex;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Object, Stream};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Mutex;
use vrag_core::{AppError, AppResult};
use vrag_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};

/// Brute-force cosine index kept in memory.
#[derive(Default)]
pub struct InMemoryIndex {
    entries: Mutex<BTreeMap<String, IndexedEntry>>,
    upsert_calls: Mutex<Vec<usize>>,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sizes of every upsert call so far.
    pub fn upsert_calls(&self) -> Vec<usize> {
        self.upsert_calls.lock().unwrap().clone()
    }

    pub fn text_of(&self, id: &str) -> Option<String> {
        self.entries.lock().unwrap().get(id).map(|e| e.text.clone())
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait::async_trait]
impl VectorIndex for InMemoryIndex {
    async fn upsert(&self, entries: &[IndexedEntry]) -> AppResult<()> {
        self.upsert_calls.lock().unwrap().push(entries.len());
        let mut stored = self.entries.lock().unwrap();
        for entry in entries {
            stored.insert(entry.id.clone(), entry.clone());
        }
        Ok(())
    }

    async fn existing_ids(&self) -> AppResult<HashSet<String>> {
        Ok(self.entries.lock().unwrap().keys().cloned().collect())
    }

    async fn search(&self, query_vector: &[f32], k: usize) -> AppResult<Vec<RetrievalResult>> {
        let mut results: Vec<RetrievalResult> = self
            .entries
            .lock()
            .unwrap()
            .values()
            .map(|e| RetrievalResult {
                text: e.text.clone(),
                metadata: e.metadata.clone(),
                score: cosine_similarity(query_vector, &e.vector),
            })
            .collect();
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(k);
        Ok(results)
    }

    async fn clear(&self) -> AppResult<()> {
        self.entries.lock().unwrap().clear();
        Ok(())
    }

    async fn count(&self) -> AppResult<usize> {
        Ok(self.entries.lock().unwrap().len())
    }
}

/// Index that ignores the query and returns a fixed result list.
pub struct ScriptedIndex {
    pub results: Vec<RetrievalResult>,
}

#[async_trait::async_trait]
impl VectorIndex for ScriptedIndex {
    async fn upsert(&self, _entries: &[IndexedEntry]) -> AppResult<()> {
        Ok(())
    }

    async fn existing_ids(&self) -> AppResult<HashSet<String>> {
        Ok(self.results.iter().map(|r| r.metadata.id.clone()).collect())
    }

    async fn search(&self, _query_vector: &[f32], k: usize) -> AppResult<Vec<RetrievalResult>> {
        Ok(self.results.iter().take(k).cloned().collect())
    }

    async fn clear(&self) -> AppResult<()> {
        Ok(())
    }

    async fn count(&self) -> AppResult<usize> {
        Ok(self.results.len())
    }
}

/// Generator that records every request and replies with a canned answer,
/// or with an error when one is configured.
pub struct RecordingGenerator {
    reply: String,
    failure: Option<fn() -> AppError>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl RecordingGenerator {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            failure: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(failure: fn() -> AppError) -> Self {
        Self {
            reply: String::new(),
            failure: Some(failure),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl LlmClient for RecordingGenerator {
    fn provider_name(&self) -> &str {
        "recording"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(failure) = self.failure {
            return Err(failure());
        }
        Ok(LlmResponse {
            content: self.reply.clone(),
            model: request.model.clone(),
            usage: LlmUsage::default(),
        })
    }
}

/// Embedder that always fails with a connectivity error.
#[derive(Debug)]
pub struct UnreachableEmbedder;

#[async_trait::async_trait]
impl EmbeddingProvider for UnreachableEmbedder {
    fn provider_name(&self) -> &str {
        "unreachable"
    }

    fn model_name(&self) -> &str {
        "none"
    }

    fn dimensions(&self) -> usize {
        0
    }

    async fn embed(&self, _text: &str) -> AppResult<Vec<f32>> {
        Err(AppError::Connectivity("connection refused".to_string()))
    }
}

/// Write a PDF with one line of text per page.
pub fn write_pdf(path: &Path, page_texts: &[&str]) {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in page_texts {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id =
            doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}
