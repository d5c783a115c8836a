//! The vector index over the persisted chunk collection.
//!
//! Every entry observable through `search` or `count` was committed by a
//! prior `insert` and not yet removed by `clear`. Inserts append one whole
//! record batch, so concurrent readers observe either the pre- or the
//! post-state of an insert, never a partial one.

use std::cmp::Ordering;
use std::path::Path;
use std::sync::Arc;

use arrow_array::{FixedSizeListArray, Int32Array, RecordBatch, RecordBatchIterator, StringArray};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{Connection, DistanceType};

use docrag_core::traits::Embedder;
use docrag_core::types::{Chunk, ScoredChunk};
use docrag_core::{Error, Result};

use crate::schema::build_chunk_schema;
use crate::table;

pub struct VectorIndex {
    db: Connection,
    table_name: String,
    embedder: Arc<dyn Embedder>,
}

impl VectorIndex {
    /// Connect to the on-disk collection at `db_path`. The collection is
    /// created lazily on first insert (or eagerly by [`clear`]), so opening
    /// against a fresh directory is valid and `count` reports 0.
    ///
    /// [`clear`]: VectorIndex::clear
    pub async fn open(
        db_path: &Path,
        table_name: &str,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self> {
        let db = table::open_db(db_path.to_string_lossy().as_ref())
            .await
            .map_err(|e| Error::Store {
                op: "open",
                reason: e.to_string(),
            })?;
        Ok(Self {
            db,
            table_name: table_name.to_string(),
            embedder,
        })
    }

    /// Embed and store a batch of chunks. One embedding call per invocation;
    /// nothing is committed unless every chunk in the batch embedded
    /// successfully with the expected dimensionality. Returns the number of
    /// stored entries. Duplicate chunks are stored again, not deduplicated.
    pub async fn insert(&self, chunks: &[Chunk]) -> Result<usize> {
        if chunks.is_empty() {
            return Ok(0);
        }
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self
            .embedder
            .embed_batch(&texts)
            .await
            .map_err(|e| Error::Embedding {
                op: "insert",
                reason: e.to_string(),
            })?;
        if embeddings.len() != chunks.len() {
            return Err(Error::Embedding {
                op: "insert",
                reason: format!(
                    "provider returned {} vectors for {} chunks",
                    embeddings.len(),
                    chunks.len()
                ),
            });
        }
        for e in &embeddings {
            if e.len() != self.embedder.dim() {
                return Err(Error::Embedding {
                    op: "insert",
                    reason: format!(
                        "provider returned a {}-dim vector, expected {}",
                        e.len(),
                        self.embedder.dim()
                    ),
                });
            }
        }
        self.append_batch(chunks, &embeddings)
            .await
            .map_err(|e| Error::Store {
                op: "insert",
                reason: e.to_string(),
            })?;
        tracing::debug!(count = chunks.len(), table = %self.table_name, "inserted chunks");
        Ok(chunks.len())
    }

    /// Embed the query once and return the `k` nearest chunks by cosine
    /// distance, ascending (most similar first). An empty or missing
    /// collection yields an empty result, and `k` beyond the collection
    /// size yields everything stored.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>> {
        if k == 0 || !self.table_exists().await? {
            return Ok(Vec::new());
        }
        let query_vec = self
            .embedder
            .embed_batch(&[query.to_string()])
            .await
            .map_err(|e| Error::Embedding {
                op: "search",
                reason: e.to_string(),
            })?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Embedding {
                op: "search",
                reason: "provider returned no vector for the query".to_string(),
            })?;
        self.scan(query_vec, k).await.map_err(|e| Error::Store {
            op: "search",
            reason: e.to_string(),
        })
    }

    /// Number of stored entries; 0 when the collection does not exist yet.
    pub async fn count(&self) -> Result<usize> {
        if !self.table_exists().await? {
            return Ok(0);
        }
        let table = self
            .db
            .open_table(&self.table_name)
            .execute()
            .await
            .map_err(|e| Error::Store {
                op: "count",
                reason: e.to_string(),
            })?;
        table.count_rows(None).await.map_err(|e| Error::Store {
            op: "count",
            reason: e.to_string(),
        })
    }

    /// Remove every entry irreversibly and leave behind an empty, usable
    /// collection: a subsequent insert needs no re-initialization by the
    /// caller.
    pub async fn clear(&self) -> Result<()> {
        let exists = self.table_exists().await?;
        if exists {
            self.db
                .drop_table(&self.table_name, &[])
                .await
                .map_err(|e| Error::Store {
                    op: "clear",
                    reason: e.to_string(),
                })?;
        }
        table::ensure_table(
            &self.db,
            &self.table_name,
            build_chunk_schema(self.embedder.dim() as i32),
        )
        .await
        .map_err(|e| Error::Store {
            op: "clear",
            reason: e.to_string(),
        })?;
        tracing::info!(table = %self.table_name, "cleared chunk collection");
        Ok(())
    }

    async fn table_exists(&self) -> Result<bool> {
        let names = self
            .db
            .table_names()
            .execute()
            .await
            .map_err(|e| Error::Store {
                op: "list tables",
                reason: e.to_string(),
            })?;
        Ok(names.contains(&self.table_name))
    }

    async fn append_batch(&self, chunks: &[Chunk], embeddings: &[Vec<f32>]) -> anyhow::Result<()> {
        let dim = self.embedder.dim() as i32;
        let batch = chunks_to_record_batch(chunks, embeddings, dim)?;
        let schema = batch.schema();
        let reader = Box::new(RecordBatchIterator::new(vec![Ok(batch)].into_iter(), schema));
        if self.table_exists().await.map_err(anyhow::Error::new)? {
            self.db
                .open_table(&self.table_name)
                .execute()
                .await?
                .add(reader)
                .execute()
                .await?;
        } else {
            self.db
                .create_table(&self.table_name, reader)
                .execute()
                .await?;
        }
        Ok(())
    }

    async fn scan(&self, query_vec: Vec<f32>, k: usize) -> anyhow::Result<Vec<ScoredChunk>> {
        let table = self.db.open_table(&self.table_name).execute().await?;
        let mut stream = table
            .vector_search(query_vec)?
            .distance_type(DistanceType::Cosine)
            .limit(k)
            .execute()
            .await?;
        let mut results = Vec::new();
        while let Some(batch) = stream.try_next().await? {
            for row in 0..batch.num_rows() {
                let chunk = Chunk {
                    source_id: string_value(&batch, "source_id", row)?,
                    page: int_value(&batch, "page", row)? as usize,
                    sequence: int_value(&batch, "sequence", row)? as usize,
                    text: string_value(&batch, "text", row)?,
                };
                let distance = distance_value(&batch, row)?;
                results.push(ScoredChunk { chunk, distance });
            }
        }
        // LanceDB already yields nearest-first; keep the contract explicit.
        results.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(Ordering::Equal));
        results.truncate(k);
        Ok(results)
    }
}

fn string_value(batch: &RecordBatch, name: &str, row: usize) -> anyhow::Result<String> {
    let col = batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| anyhow::anyhow!("column '{}' missing or not utf8", name))?;
    Ok(col.value(row).to_string())
}

fn int_value(batch: &RecordBatch, name: &str, row: usize) -> anyhow::Result<i32> {
    let col = batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<Int32Array>())
        .ok_or_else(|| anyhow::anyhow!("column '{}' missing or not int32", name))?;
    Ok(col.value(row))
}

fn distance_value(batch: &RecordBatch, row: usize) -> anyhow::Result<f32> {
    let col = batch
        .column_by_name("_distance")
        .and_then(|c| c.as_any().downcast_ref::<arrow_array::Float32Array>())
        .ok_or_else(|| anyhow::anyhow!("search result is missing the _distance column"))?;
    Ok(col.value(row))
}

fn chunks_to_record_batch(
    chunks: &[Chunk],
    embeddings: &[Vec<f32>],
    dim: i32,
) -> anyhow::Result<RecordBatch> {
    let schema = build_chunk_schema(dim);
    let mut source_ids = Vec::with_capacity(chunks.len());
    let mut pages = Vec::with_capacity(chunks.len());
    let mut sequences = Vec::with_capacity(chunks.len());
    let mut texts = Vec::with_capacity(chunks.len());
    let mut vectors: Vec<Option<Vec<Option<f32>>>> = Vec::with_capacity(chunks.len());
    for (chunk, embedding) in chunks.iter().zip(embeddings) {
        source_ids.push(chunk.source_id.clone());
        pages.push(chunk.page as i32);
        sequences.push(chunk.sequence as i32);
        texts.push(chunk.text.clone());
        vectors.push(Some(embedding.iter().map(|&x| Some(x)).collect()));
    }
    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(StringArray::from(source_ids)),
            Arc::new(Int32Array::from(pages)),
            Arc::new(Int32Array::from(sequences)),
            Arc::new(StringArray::from(texts)),
            Arc::new(FixedSizeListArray::from_iter_primitive::<
                arrow_array::types::Float32Type,
                _,
                _,
            >(vectors.into_iter(), dim)),
        ],
    )?;
    Ok(batch)
}
