//! # RAG Chunk Store
//!
//! Storage and similarity search for text-chunk embeddings, the retrieval
//! core behind a retrieval-augmented-generation workflow.
//!
//! ## Architecture
//!
//! ```text
//! insert(document_name, text, index, embedding, metadata)
//!     │
//!     ├──> Chunk Store (owns records + vectors)
//!     │
//!     └──> Proximity Graph (rag-ann-index, id references only)
//!
//! search_similar(query_embedding, params)
//!     │
//!     ├──> graph search (oversampled candidates)
//!     └──> join to records, threshold + rank + bound
//! ```
//!
//! Embeddings arrive as opaque fixed-length vectors from an external
//! encoder; the store validates only their dimensionality. Generation,
//! chunking policy, and any wire protocol are the caller's concern.
//!
//! ## Example
//!
//! ```no_run
//! use rag_chunk_store::{ChunkStore, QueryParams, StoreConfig};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = ChunkStore::new(StoreConfig::with_dimension(384))?;
//!
//!     let embedding = vec![0.0; 384]; // from the external encoder
//!     let id = store
//!         .insert("manual.pdf", "chunk text", 0, embedding.clone(), json!({}))
//!         .await?;
//!
//!     let matches = store
//!         .search_similar(&embedding, &QueryParams::default())
//!         .await?;
//!     for m in matches {
//!         println!("{} [{}]: {:.3}", m.document_name, m.id, m.similarity);
//!     }
//!
//!     store.save("chunks.json").await?;
//!     let _ = id;
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod query;
mod store;
mod types;

pub use config::StoreConfig;
pub use error::{ChunkStoreError, Result};
pub use query::QueryParams;
pub use store::{ChunkStore, CHUNK_STORE_SCHEMA_VERSION};
pub use types::{Chunk, DocumentSummary, SimilarityMatch};

// Re-export index types for callers that tune graph parameters.
pub use rag_ann_index::{AnnIndexError, IndexParams};
