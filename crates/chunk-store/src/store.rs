use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use rag_ann_index::HnswGraph;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::config::StoreConfig;
use crate::error::{ChunkStoreError, Result};
use crate::query::{self, QueryParams};
use crate::types::{Chunk, DocumentSummary, SimilarityMatch};

pub const CHUNK_STORE_SCHEMA_VERSION: u32 = 1;

pub(crate) struct StoreInner {
    pub config: StoreConfig,
    pub chunks: BTreeMap<u64, Chunk>,
    pub index: HnswGraph,
    // Secondary lookup: document name to the ids of its chunks.
    pub by_document: BTreeMap<String, Vec<u64>>,
    pub next_id: u64,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedChunkStore {
    schema_version: u32,
    dimension: usize,
    next_id: u64,
    chunks: Vec<Chunk>,
}

/// Durable store for text chunks and their embeddings.
///
/// The store owns the chunk records and their vectors; the proximity graph
/// holds only id-to-position references. Insertion registers the embedding
/// with the graph before returning, so a chunk is queryable as soon as
/// `insert` resolves.
///
/// Cheap to clone; clones share state. Insertions take a coarse write lock,
/// so concurrent readers observe either none or all of a new chunk's graph
/// links. Queries and lookups take the read lock and never block each other.
#[derive(Clone)]
pub struct ChunkStore {
    inner: Arc<RwLock<StoreInner>>,
}

impl ChunkStore {
    pub fn new(config: StoreConfig) -> Result<Self> {
        config.validate()?;
        log::info!(
            "Initializing ChunkStore (dimension {}, m {})",
            config.dimension,
            config.index.m
        );
        let index = HnswGraph::new(config.dimension, config.index.clone());
        Ok(Self {
            inner: Arc::new(RwLock::new(StoreInner {
                config,
                chunks: BTreeMap::new(),
                index,
                by_document: BTreeMap::new(),
                next_id: 0,
            })),
        })
    }

    /// Insert one chunk; returns its assigned id.
    ///
    /// All-or-nothing: if the embedding fails the dimension check or graph
    /// registration fails, no record is stored and the id is not consumed.
    pub async fn insert(
        &self,
        document_name: impl Into<String>,
        chunk_text: impl Into<String>,
        chunk_index: usize,
        embedding: Vec<f32>,
        metadata: Value,
    ) -> Result<u64> {
        let mut inner = self.inner.write().await;

        if embedding.len() != inner.config.dimension {
            return Err(ChunkStoreError::DimensionMismatch {
                expected: inner.config.dimension,
                actual: embedding.len(),
            });
        }

        let id = inner.next_id;
        inner.index.insert(id, embedding.clone())?;

        let chunk = Chunk {
            id,
            document_name: document_name.into(),
            chunk_text: chunk_text.into(),
            chunk_index,
            embedding,
            created_at: Utc::now(),
            metadata,
        };

        inner
            .by_document
            .entry(chunk.document_name.clone())
            .or_default()
            .push(id);
        inner.chunks.insert(id, chunk);
        inner.next_id += 1;

        log::debug!("Inserted chunk {id} (total {})", inner.chunks.len());
        Ok(id)
    }

    /// Point lookup by id.
    pub async fn get(&self, id: u64) -> Result<Chunk> {
        let inner = self.inner.read().await;
        inner
            .chunks
            .get(&id)
            .cloned()
            .ok_or(ChunkStoreError::NotFound(id))
    }

    /// Rank stored chunks against `query_embedding`.
    ///
    /// Returns at most `params.match_count` rows with similarity strictly
    /// above `params.match_threshold`, ordered by descending similarity with
    /// ascending-id tie-breaks. Empty results are a normal outcome, never an
    /// error.
    pub async fn search_similar(
        &self,
        query_embedding: &[f32],
        params: &QueryParams,
    ) -> Result<Vec<SimilarityMatch>> {
        let inner = self.inner.read().await;

        if inner.chunks.is_empty() || params.match_count == 0 {
            return Ok(Vec::new());
        }
        if query_embedding.len() != inner.config.dimension {
            return Err(ChunkStoreError::DimensionMismatch {
                expected: inner.config.dimension,
                actual: query_embedding.len(),
            });
        }

        query::execute(&inner, query_embedding, params)
    }

    /// Distinct documents with their chunk counts, sorted by name.
    pub async fn list_documents(&self) -> Vec<DocumentSummary> {
        let inner = self.inner.read().await;
        inner
            .by_document
            .iter()
            .map(|(name, ids)| DocumentSummary {
                document_name: name.clone(),
                chunk_count: ids.len(),
            })
            .collect()
    }

    /// Every chunk of one document, ordered by `chunk_index`.
    pub async fn document_chunks(&self, document_name: &str) -> Vec<Chunk> {
        let inner = self.inner.read().await;
        let mut chunks: Vec<Chunk> = inner
            .by_document
            .get(document_name)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| inner.chunks.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default();
        chunks.sort_by(|a, b| a.chunk_index.cmp(&b.chunk_index).then(a.id.cmp(&b.id)));
        chunks
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.chunks.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.chunks.is_empty()
    }

    /// Snapshot the store to `path` as versioned JSON.
    ///
    /// Writes to a temp file in the same directory, then renames over the
    /// destination so an interrupted save never truncates an existing
    /// snapshot.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref().to_path_buf();
        let bytes = {
            let inner = self.inner.read().await;
            let persisted = PersistedChunkStore {
                schema_version: CHUNK_STORE_SCHEMA_VERSION,
                dimension: inner.config.dimension,
                next_id: inner.next_id,
                chunks: inner.chunks.values().cloned().collect(),
            };
            serde_json::to_vec_pretty(&persisted)?
        };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        log::info!("Saved ChunkStore to {}", path.display());
        Ok(())
    }

    /// Load a snapshot saved by [`ChunkStore::save`].
    ///
    /// The proximity graph is not persisted; it is rebuilt by re-inserting
    /// every embedding in ascending-id order, which reproduces the original
    /// graph exactly for a fixed level seed.
    pub async fn load(path: impl AsRef<Path>, config: StoreConfig) -> Result<Self> {
        config.validate()?;
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let persisted: PersistedChunkStore = serde_json::from_slice(&bytes)?;

        if persisted.schema_version != CHUNK_STORE_SCHEMA_VERSION {
            return Err(ChunkStoreError::UnsupportedSchemaVersion(
                persisted.schema_version,
            ));
        }
        if persisted.dimension != config.dimension {
            return Err(ChunkStoreError::DimensionMismatch {
                expected: config.dimension,
                actual: persisted.dimension,
            });
        }

        let mut index = HnswGraph::new(config.dimension, config.index.clone());
        let mut chunks = BTreeMap::new();
        let mut by_document: BTreeMap<String, Vec<u64>> = BTreeMap::new();

        for chunk in persisted.chunks {
            index.insert(chunk.id, chunk.embedding.clone())?;
            by_document
                .entry(chunk.document_name.clone())
                .or_default()
                .push(chunk.id);
            chunks.insert(chunk.id, chunk);
        }

        log::info!(
            "Loaded {} chunks from {}",
            chunks.len(),
            path.display()
        );

        Ok(Self {
            inner: Arc::new(RwLock::new(StoreInner {
                config,
                chunks,
                index,
                by_document,
                next_id: persisted.next_id,
            })),
        })
    }
}
