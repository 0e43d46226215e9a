//! LanceDB-backed vector index.
//!
//! One table per collection with columns `id`, `text`, `source`, `page` and a
//! fixed-size `vector`. The table is created on the first upsert, once the
//! vector width is known, and dropped again by `clear`. Search uses cosine
//! distance and reports `1 - distance` as the score.

use crate::types::{EntryMetadata, IndexedEntry, RetrievalResult};
use crate::vector_index::VectorIndex;
use arrow_array::types::Float32Type;
use arrow_array::{
    Array, FixedSizeListArray, Float32Array, RecordBatch, RecordBatchIterator, StringArray,
    UInt32Array,
};
use arrow_schema::{DataType, Field, Schema};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase, Select};
use lancedb::{Connection, DistanceType, Table};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use vrag_core::{AppError, AppResult};

/// Ids per `IN (...)` filter when probing for existing entries.
const EXISTS_FILTER_CHUNK: usize = 256;

/// LanceDB-backed vector index for one collection.
pub struct LanceDbIndex {
    connection: Connection,
    location: PathBuf,
    table_name: String,
    table: RwLock<Option<Table>>,
}

impl LanceDbIndex {
    /// Open the collection `table_name` in the database directory `db_path`,
    /// creating the directory if needed.
    pub async fn open(db_path: &Path, table_name: &str) -> AppResult<Self> {
        std::fs::create_dir_all(db_path).map_err(|e| {
            AppError::Storage(format!("Failed to create collection directory {:?}: {}", db_path, e))
        })?;

        let uri = db_path.to_string_lossy().to_string();
        let connection = lancedb::connect(&uri)
            .execute()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to connect to LanceDB: {}", e)))?;

        let table_names = connection
            .table_names()
            .execute()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to list tables: {}", e)))?;

        let table = if table_names.iter().any(|name| name == table_name) {
            let table = connection
                .open_table(table_name)
                .execute()
                .await
                .map_err(|e| AppError::Storage(format!("Failed to open table '{}': {}", table_name, e)))?;
            Some(table)
        } else {
            None
        };

        tracing::debug!(
            "Opened LanceDB collection '{}' at {:?} (exists: {})",
            table_name,
            db_path,
            table.is_some()
        );

        Ok(Self {
            connection,
            location: db_path.to_path_buf(),
            table_name: table_name.to_string(),
            table: RwLock::new(table),
        })
    }

    /// Database directory.
    pub fn location(&self) -> &Path {
        &self.location
    }

    fn schema(dimensions: usize) -> Arc<Schema> {
        Arc::new(Schema::new(vec![
            Field::new("id", DataType::Utf8, false),
            Field::new("text", DataType::Utf8, false),
            Field::new("source", DataType::Utf8, false),
            Field::new("page", DataType::UInt32, false),
            Field::new(
                "vector",
                DataType::FixedSizeList(
                    Arc::new(Field::new("item", DataType::Float32, true)),
                    dimensions as i32,
                ),
                false,
            ),
        ]))
    }

    async fn current_table(&self) -> Option<Table> {
        self.table.read().await.clone()
    }

    async fn table_for_write(&self, dimensions: usize) -> AppResult<Table> {
        let mut guard = self.table.write().await;

        if let Some(table) = guard.as_ref() {
            let stored = Self::stored_dimensions(table).await?;
            if stored != Some(dimensions) {
                return Err(AppError::Storage(format!(
                    "Collection '{}' holds {}-dimensional vectors but got {}; \
                     clear it to rebuild with the new embedding model",
                    self.table_name,
                    stored.map(|d| d.to_string()).unwrap_or_else(|| "unknown".to_string()),
                    dimensions
                )));
            }
            return Ok(table.clone());
        }

        let schema = Self::schema(dimensions);
        let table = self
            .connection
            .create_table(
                &self.table_name,
                RecordBatchIterator::new(vec![Ok(RecordBatch::new_empty(schema.clone()))], schema),
            )
            .execute()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to create table '{}': {}", self.table_name, e)))?;

        tracing::info!(
            "Created collection '{}' ({} dimensions)",
            self.table_name,
            dimensions
        );

        *guard = Some(table.clone());
        Ok(table)
    }

    async fn stored_dimensions(table: &Table) -> AppResult<Option<usize>> {
        let schema = table
            .schema()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to read table schema: {}", e)))?;

        Ok(match schema.field_with_name("vector").map(|f| f.data_type()) {
            Ok(DataType::FixedSizeList(_, size)) => Some(*size as usize),
            _ => None,
        })
    }

    fn entries_to_batch(entries: &[IndexedEntry], dimensions: usize) -> AppResult<RecordBatch> {
        if let Some(bad) = entries.iter().find(|e| e.vector.len() != dimensions) {
            return Err(AppError::Storage(format!(
                "Entry '{}' has {} dimensions, expected {}",
                bad.id,
                bad.vector.len(),
                dimensions
            )));
        }

        let ids = StringArray::from_iter_values(entries.iter().map(|e| e.id.as_str()));
        let texts = StringArray::from_iter_values(entries.iter().map(|e| e.text.as_str()));
        let sources =
            StringArray::from_iter_values(entries.iter().map(|e| e.metadata.source.as_str()));
        let pages = UInt32Array::from_iter_values(entries.iter().map(|e| e.metadata.page));
        let vectors = FixedSizeListArray::from_iter_primitive::<Float32Type, _, _>(
            entries
                .iter()
                .map(|e| Some(e.vector.iter().copied().map(Some).collect::<Vec<_>>())),
            dimensions as i32,
        );

        RecordBatch::try_new(
            Self::schema(dimensions),
            vec![
                Arc::new(ids),
                Arc::new(texts),
                Arc::new(sources),
                Arc::new(pages),
                Arc::new(vectors),
            ],
        )
        .map_err(|e| AppError::Storage(format!("Failed to create RecordBatch: {}", e)))
    }

    async fn collect_ids(&self, table: &Table, filter: Option<String>) -> AppResult<HashSet<String>> {
        let mut query = table.query().select(Select::columns(&["id"]));
        if let Some(filter) = filter {
            query = query.only_if(filter);
        }

        let batches: Vec<RecordBatch> = query
            .execute()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to read ids: {}", e)))?
            .try_collect()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to collect ids: {}", e)))?;

        let mut ids = HashSet::new();
        for batch in &batches {
            let column = string_column(batch, "id")?;
            for row in 0..batch.num_rows() {
                ids.insert(column.value(row).to_string());
            }
        }

        Ok(ids)
    }
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> AppResult<&'a StringArray> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| AppError::Storage(format!("Invalid {} column", name)))
}

fn quote(id: &str) -> String {
    format!("'{}'", id.replace('\'', "''"))
}

fn batch_to_results(batch: &RecordBatch) -> AppResult<Vec<RetrievalResult>> {
    let ids = string_column(batch, "id")?;
    let texts = string_column(batch, "text")?;
    let sources = string_column(batch, "source")?;
    let pages = batch
        .column_by_name("page")
        .and_then(|c| c.as_any().downcast_ref::<UInt32Array>())
        .ok_or_else(|| AppError::Storage("Invalid page column".to_string()))?;
    let distances = batch
        .column_by_name("_distance")
        .and_then(|c| c.as_any().downcast_ref::<Float32Array>())
        .ok_or_else(|| AppError::Storage("Search result has no _distance column".to_string()))?;

    Ok((0..batch.num_rows())
        .map(|row| RetrievalResult {
            text: texts.value(row).to_string(),
            metadata: EntryMetadata {
                source: sources.value(row).to_string(),
                page: pages.value(row),
                id: ids.value(row).to_string(),
            },
            score: 1.0 - distances.value(row),
        })
        .collect())
}

#[async_trait::async_trait]
impl VectorIndex for LanceDbIndex {
    async fn upsert(&self, entries: &[IndexedEntry]) -> AppResult<()> {
        let Some(first) = entries.first() else {
            return Ok(());
        };

        let dimensions = first.vector.len();
        if dimensions == 0 {
            return Err(AppError::Storage(format!("Entry '{}' has an empty vector", first.id)));
        }

        let table = self.table_for_write(dimensions).await?;
        let batch = Self::entries_to_batch(entries, dimensions)?;
        let schema = batch.schema();

        let mut merge = table.merge_insert(&["id"]);
        merge
            .when_matched_update_all(None)
            .when_not_matched_insert_all();
        merge
            .execute(Box::new(RecordBatchIterator::new(vec![Ok(batch)], schema)))
            .await
            .map_err(|e| AppError::Storage(format!("Failed to upsert entries: {}", e)))?;

        tracing::debug!("Upserted {} entries into '{}'", entries.len(), self.table_name);
        Ok(())
    }

    async fn existing_ids(&self) -> AppResult<HashSet<String>> {
        match self.current_table().await {
            Some(table) => self.collect_ids(&table, None).await,
            None => Ok(HashSet::new()),
        }
    }

    async fn exists(&self, ids: &[String]) -> AppResult<HashSet<String>> {
        let Some(table) = self.current_table().await else {
            return Ok(HashSet::new());
        };

        let mut found = HashSet::new();
        for chunk in ids.chunks(EXISTS_FILTER_CHUNK) {
            let list = chunk.iter().map(|id| quote(id)).collect::<Vec<_>>().join(", ");
            found.extend(
                self.collect_ids(&table, Some(format!("id IN ({})", list)))
                    .await?,
            );
        }

        Ok(found)
    }

    async fn search(&self, query_vector: &[f32], k: usize) -> AppResult<Vec<RetrievalResult>> {
        let Some(table) = self.current_table().await else {
            tracing::debug!("Collection '{}' does not exist yet", self.table_name);
            return Ok(Vec::new());
        };

        if k == 0 || self.count().await? == 0 {
            return Ok(Vec::new());
        }

        let batches: Vec<RecordBatch> = table
            .query()
            .nearest_to(query_vector.to_vec())
            .map_err(|e| AppError::Storage(format!("Failed to create query: {}", e)))?
            .distance_type(DistanceType::Cosine)
            .limit(k)
            .execute()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to execute search: {}", e)))?
            .try_collect()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to collect results: {}", e)))?;

        let mut results = Vec::new();
        for batch in &batches {
            results.extend(batch_to_results(batch)?);
        }

        tracing::debug!("Retrieved {} entries (requested top-{})", results.len(), k);

        Ok(results)
    }

    async fn clear(&self) -> AppResult<()> {
        // Dropping the table also discards its vector width, so the next
        // upsert may use a different embedding model.
        let mut guard = self.table.write().await;
        if guard.take().is_some() {
            self.connection
                .drop_table(&self.table_name, &[])
                .await
                .map_err(|e| AppError::Storage(format!("Failed to clear collection: {}", e)))?;
        }

        tracing::info!("Cleared collection '{}'", self.table_name);
        Ok(())
    }

    async fn count(&self) -> AppResult<usize> {
        match self.current_table().await {
            Some(table) => table
                .count_rows(None)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to count rows: {}", e))),
            None => Ok(0),
        }
    }
}
