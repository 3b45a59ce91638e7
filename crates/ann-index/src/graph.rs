//! Hierarchical small-world proximity graph.
//!
//! The graph keeps an exponentially thinning stack of layers: every point
//! lives at layer 0, and a point reaches layer `l` with probability
//! `~exp(-l / level_mult)`. Searches descend greedily from the entry point
//! through the upper layers, then run a beam search with a bounded frontier
//! at layer 0. Construction and search use the same metric, cosine distance.
//!
//! Level assignment is the only source of randomness and is driven by a
//! seeded 64-bit LCG, so a fixed seed plus a fixed insertion order rebuilds
//! an identical graph.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use serde::Deserialize;

use crate::distance::{cosine_distance, magnitude};
use crate::error::{AnnIndexError, Result};
use crate::node::GraphNode;
use crate::pqueue::Candidate;

/// Upper bound on assigned levels; deep layers past this add nothing.
const LEVEL_CAP: u8 = 16;

/// Tuning knobs for graph construction and search.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IndexParams {
    /// Max neighbors per node per upper layer; layer 0 allows `2 * m`.
    pub m: usize,
    /// Beam width while linking a new point.
    pub ef_construction: usize,
    /// Minimum beam width at query time; the effective width is
    /// `max(k, ef_search)`.
    pub ef_search: usize,
    /// Seed for the level-selection LCG.
    pub level_seed: u64,
}

impl Default for IndexParams {
    fn default() -> Self {
        Self {
            m: 16,
            ef_construction: 200,
            ef_search: 100,
            level_seed: 42,
        }
    }
}

/// Approximate nearest-neighbor index over fixed-dimension vectors.
pub struct HnswGraph {
    m: usize,
    m_max0: usize,
    ef_construction: usize,
    ef_search: usize,
    level_mult: f32,
    dimension: usize,

    nodes: HashMap<u64, GraphNode>,
    entry_point: Option<u64>,
    level_max: u8,
    rng_state: u64,
}

impl HnswGraph {
    /// Create an empty graph over vectors of exactly `dimension` components.
    pub fn new(dimension: usize, params: IndexParams) -> Self {
        let level_mult = 1.0 / (params.m.max(2) as f32).ln();
        Self {
            m: params.m,
            m_max0: params.m * 2,
            ef_construction: params.ef_construction,
            ef_search: params.ef_search,
            level_mult,
            dimension,
            nodes: HashMap::new(),
            entry_point: None,
            level_max: 0,
            rng_state: params.level_seed,
        }
    }

    /// Add a point and link it into every layer up to its assigned level.
    pub fn insert(&mut self, id: u64, vector: Vec<f32>) -> Result<()> {
        if vector.is_empty() {
            return Err(AnnIndexError::EmptyVector);
        }
        if vector.len() != self.dimension {
            return Err(AnnIndexError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        if self.nodes.contains_key(&id) {
            return Err(AnnIndexError::DuplicateId(id));
        }

        let level = self.select_level();
        let node = GraphNode::new(id, level, vector);

        let Some(mut ep_id) = self.entry_point else {
            log::debug!("Index empty, point {id} becomes entry at level {level}");
            self.level_max = level;
            self.entry_point = Some(id);
            self.nodes.insert(id, node);
            return Ok(());
        };

        let query = node.vector.clone();
        let query_mag = node.magnitude();
        self.nodes.insert(id, node);

        // Greedy descent through the layers above the new point's level.
        let mut layer = self.level_max as i32;
        while layer > level as i32 {
            ep_id = self.greedy_step(ep_id, &query, query_mag, layer as u8).id;
            layer -= 1;
        }

        // Link layer by layer from the point's level down to 0.
        for lc in (0..=level.min(self.level_max)).rev() {
            let nearest = self.search_layer(ep_id, &query, query_mag, self.ef_construction, lc);

            let m_limit = if lc == 0 { self.m_max0 } else { self.m };
            let selected: Vec<u64> = nearest
                .iter()
                .filter(|c| c.id != id)
                .take(m_limit)
                .map(|c| c.id)
                .collect();

            for &neighbor_id in &selected {
                self.add_link(neighbor_id, id, lc);
                self.add_link(id, neighbor_id, lc);
            }
            for &neighbor_id in &selected {
                self.prune_neighbors(neighbor_id, lc, m_limit);
            }

            if let Some(best) = nearest.first() {
                ep_id = best.id;
            }
        }

        if level > self.level_max {
            self.level_max = level;
            self.entry_point = Some(id);
        }

        Ok(())
    }

    /// Return up to `k` points by ascending cosine distance to `query`.
    ///
    /// Approximate: recall is high but not guaranteed. Deterministic for a
    /// fixed graph state.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(u64, f32)>> {
        if query.len() != self.dimension {
            return Err(AnnIndexError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let Some(mut ep_id) = self.entry_point else {
            return Ok(Vec::new());
        };
        if k == 0 {
            return Ok(Vec::new());
        }

        let query_mag = magnitude(query);

        let mut layer = self.level_max as i32;
        while layer > 0 {
            ep_id = self.greedy_step(ep_id, query, query_mag, layer as u8).id;
            layer -= 1;
        }

        let ef = k.max(self.ef_search);
        let nearest = self.search_layer(ep_id, query, query_mag, ef, 0);

        Ok(nearest
            .into_iter()
            .take(k)
            .map(|c| (c.id, c.distance))
            .collect())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn contains(&self, id: u64) -> bool {
        self.nodes.contains_key(&id)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Draw a level from the exponential distribution `floor(-ln(u) * mult)`.
    fn select_level(&mut self) -> u8 {
        self.rng_state = self
            .rng_state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let u = ((self.rng_state >> 33) as f32 / (u32::MAX >> 1) as f32).max(1e-7);
        let level = (-u.ln() * self.level_mult).floor() as u8;
        level.min(LEVEL_CAP)
    }

    /// Hill-climb at one layer: move to a closer neighbor until none exists.
    fn greedy_step(&self, entry_id: u64, query: &[f32], query_mag: f32, layer: u8) -> Candidate {
        let mut current = Candidate {
            id: entry_id,
            distance: self.distance_to(entry_id, query, query_mag),
        };

        loop {
            let mut improved = false;
            if let Some(node) = self.nodes.get(&current.id) {
                for &neighbor_id in node.neighbors_at(layer) {
                    let distance = self.distance_to(neighbor_id, query, query_mag);
                    if distance < current.distance {
                        current = Candidate {
                            id: neighbor_id,
                            distance,
                        };
                        improved = true;
                    }
                }
            }
            if !improved {
                return current;
            }
        }
    }

    /// Beam search at one layer with frontier width `ef`.
    ///
    /// Returns up to `ef` candidates sorted by ascending distance.
    fn search_layer(
        &self,
        entry_id: u64,
        query: &[f32],
        query_mag: f32,
        ef: usize,
        layer: u8,
    ) -> Vec<Candidate> {
        let entry = Candidate {
            id: entry_id,
            distance: self.distance_to(entry_id, query, query_mag),
        };

        let mut visited: HashSet<u64> = HashSet::new();
        visited.insert(entry_id);

        // Frontier pops the nearest unexplored candidate; results keep the
        // `ef` nearest found so far with the worst on top.
        let mut frontier: BinaryHeap<Reverse<Candidate>> = BinaryHeap::new();
        let mut results: BinaryHeap<Candidate> = BinaryHeap::new();
        frontier.push(Reverse(entry));
        results.push(entry);

        while let Some(Reverse(candidate)) = frontier.pop() {
            let worst = results.peek().map(|c| c.distance).unwrap_or(f32::INFINITY);
            if candidate.distance > worst && results.len() >= ef {
                break;
            }

            if let Some(node) = self.nodes.get(&candidate.id) {
                for &neighbor_id in node.neighbors_at(layer) {
                    if !visited.insert(neighbor_id) {
                        continue;
                    }
                    let distance = self.distance_to(neighbor_id, query, query_mag);
                    let worst = results.peek().map(|c| c.distance).unwrap_or(f32::INFINITY);
                    if distance < worst || results.len() < ef {
                        let next = Candidate {
                            id: neighbor_id,
                            distance,
                        };
                        frontier.push(Reverse(next));
                        results.push(next);
                        if results.len() > ef {
                            results.pop();
                        }
                    }
                }
            }
        }

        let mut out = results.into_vec();
        out.sort();
        out
    }

    fn add_link(&mut self, from: u64, to: u64, layer: u8) {
        if let Some(node) = self.nodes.get_mut(&from) {
            while node.neighbors.len() <= layer as usize {
                node.neighbors.push(Vec::new());
            }
            let list = &mut node.neighbors[layer as usize];
            if !list.contains(&to) {
                list.push(to);
            }
        }
    }

    /// Drop the farthest links of a node once it exceeds `max_links`.
    fn prune_neighbors(&mut self, node_id: u64, layer: u8, max_links: usize) {
        let (vector, mag, current) = match self.nodes.get(&node_id) {
            Some(node) if node.neighbors_at(layer).len() > max_links => (
                node.vector.clone(),
                node.magnitude(),
                node.neighbors_at(layer).to_vec(),
            ),
            _ => return,
        };

        let mut scored: Vec<Candidate> = current
            .iter()
            .map(|&id| Candidate {
                id,
                distance: self.distance_to(id, &vector, mag),
            })
            .collect();
        scored.sort();
        let kept: Vec<u64> = scored.into_iter().take(max_links).map(|c| c.id).collect();

        if let Some(node) = self.nodes.get_mut(&node_id) {
            node.neighbors[layer as usize] = kept;
        }
    }

    fn distance_to(&self, node_id: u64, query: &[f32], query_mag: f32) -> f32 {
        match self.nodes.get(&node_id) {
            Some(node) => cosine_distance(
                &node.vector,
                query,
                Some(node.magnitude()),
                Some(query_mag),
            ),
            None => f32::INFINITY,
        }
    }
}
