//! Similarity query engine.
//!
//! Two-step execution: the proximity graph supplies an oversampled candidate
//! set, then survivors are joined back to the chunk records for the ranked
//! result rows. Similarity is recomputed from the store's own embedding for
//! each surviving candidate, so reported scores always reflect the
//! authoritative vector.

use rag_ann_index::distance::{cosine_similarity, magnitude};
use serde::Deserialize;

use crate::error::Result;
use crate::store::StoreInner;
use crate::types::SimilarityMatch;

/// Thresholds for a similarity query.
///
/// Defaults mirror the retrieval workflow this store backs: keep at most 5
/// chunks with similarity strictly above 0.5.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueryParams {
    /// Candidates with `similarity > match_threshold` survive; equality is
    /// excluded. Values outside `[-1, 1]` are accepted as-is.
    pub match_threshold: f32,
    /// Upper bound on returned rows. Zero yields an empty result.
    pub match_count: usize,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            match_threshold: 0.5,
            match_count: 5,
        }
    }
}

pub(crate) fn execute(
    inner: &StoreInner,
    query_embedding: &[f32],
    params: &QueryParams,
) -> Result<Vec<SimilarityMatch>> {
    if params.match_count == 0 || inner.chunks.is_empty() {
        return Ok(Vec::new());
    }

    let candidate_count = (params.match_count * inner.config.oversample)
        .max(inner.config.min_candidates);
    let candidates = inner.index.search(query_embedding, candidate_count)?;

    let query_mag = magnitude(query_embedding);

    let mut matches: Vec<SimilarityMatch> = candidates
        .into_iter()
        .filter_map(|(id, _)| inner.chunks.get(&id))
        .filter_map(|chunk| {
            let similarity = cosine_similarity(
                &chunk.embedding,
                query_embedding,
                None,
                Some(query_mag),
            );
            (similarity > params.match_threshold).then(|| SimilarityMatch {
                id: chunk.id,
                document_name: chunk.document_name.clone(),
                chunk_text: chunk.chunk_text.clone(),
                chunk_index: chunk.chunk_index,
                similarity,
                metadata: chunk.metadata.clone(),
            })
        })
        .collect();

    // Descending similarity, ascending id on ties.
    matches.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
    matches.truncate(params.match_count);

    log::debug!(
        "Query returned {} matches (threshold {}, count {})",
        matches.len(),
        params.match_threshold,
        params.match_count
    );

    Ok(matches)
}
