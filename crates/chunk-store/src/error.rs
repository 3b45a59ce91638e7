use rag_ann_index::AnnIndexError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChunkStoreError>;

#[derive(Error, Debug)]
pub enum ChunkStoreError {
    #[error("Invalid embedding dimension: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Chunk not found: {0}")]
    NotFound(u64),

    #[error("Index error: {0}")]
    Index(#[from] AnnIndexError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unsupported chunk store schema version: {0}")]
    UnsupportedSchemaVersion(u32),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
