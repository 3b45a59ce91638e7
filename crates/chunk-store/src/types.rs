use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A stored text chunk and its embedding. Immutable after insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Monotonically assigned, never reused.
    pub id: u64,
    /// Source document; many chunks share one name.
    pub document_name: String,
    pub chunk_text: String,
    /// Ordinal position within the source document, for re-assembly.
    pub chunk_index: usize,
    /// Fixed-length vector from the external encoder.
    pub embedding: Vec<f32>,
    pub created_at: DateTime<Utc>,
    /// Opaque caller payload.
    pub metadata: Value,
}

/// One ranked result from a similarity query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityMatch {
    pub id: u64,
    pub document_name: String,
    pub chunk_text: String,
    pub chunk_index: usize,
    /// `1 - cosine_distance`, recomputed from the stored embedding.
    pub similarity: f32,
    pub metadata: Value,
}

/// A distinct source document and how many chunks it contributed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentSummary {
    pub document_name: String,
    pub chunk_count: usize,
}
