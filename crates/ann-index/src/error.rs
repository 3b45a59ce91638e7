use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnnIndexError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnnIndexError {
    #[error("Invalid vector dimension: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Duplicate point id: {0}")]
    DuplicateId(u64),

    #[error("Empty vector")]
    EmptyVector,
}
