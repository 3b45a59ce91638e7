use rag_ann_index::IndexParams;
use serde::Deserialize;

use crate::error::{ChunkStoreError, Result};

/// Store-level configuration.
///
/// `dimension` is the contract with the external encoder: every inserted
/// embedding and every query vector must have exactly this many components.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Embedding dimensionality, e.g. 384 for all-MiniLM-L6-v2.
    pub dimension: usize,
    /// Graph construction and search parameters.
    pub index: IndexParams,
    /// Candidate multiplier for similarity queries: the engine asks the
    /// index for `match_count * oversample` candidates to absorb the
    /// approximation error and the threshold filter.
    pub oversample: usize,
    /// Candidate floor for small `match_count` values.
    pub min_candidates: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dimension: 384,
            index: IndexParams::default(),
            oversample: 4,
            min_candidates: 16,
        }
    }
}

impl StoreConfig {
    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            dimension,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.dimension == 0 {
            return Err(ChunkStoreError::InvalidConfig(
                "dimension must be non-zero".to_string(),
            ));
        }
        if self.index.m < 2 {
            return Err(ChunkStoreError::InvalidConfig(format!(
                "index.m must be at least 2, got {}",
                self.index.m
            )));
        }
        if self.oversample == 0 {
            return Err(ChunkStoreError::InvalidConfig(
                "oversample must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}
