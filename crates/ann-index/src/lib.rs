//! # RAG ANN Index
//!
//! Approximate nearest-neighbor index for embedding vectors, built as a
//! hierarchical small-world proximity graph with cosine distance.
//!
//! The index holds only ids and vectors; record storage lives in the
//! `rag-chunk-store` crate, which registers every inserted embedding here and
//! joins search hits back to its own records.
//!
//! ## Example
//!
//! ```
//! use rag_ann_index::{HnswGraph, IndexParams};
//!
//! let mut index = HnswGraph::new(2, IndexParams::default());
//! index.insert(0, vec![1.0, 0.0])?;
//! index.insert(1, vec![0.0, 1.0])?;
//!
//! let hits = index.search(&[0.9, 0.1], 1)?;
//! assert_eq!(hits[0].0, 0);
//! # Ok::<(), rag_ann_index::AnnIndexError>(())
//! ```

pub mod distance;
mod error;
mod graph;
mod node;
mod pqueue;

pub use error::{AnnIndexError, Result};
pub use graph::{HnswGraph, IndexParams};
