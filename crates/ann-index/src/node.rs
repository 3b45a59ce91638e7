use crate::distance::magnitude;

/// A single point in the proximity graph.
///
/// The node owns nothing but its vector and per-layer adjacency; layer `l`
/// neighbors live at `neighbors[l]`, and `neighbors.len() == level + 1`.
#[derive(Debug, Clone)]
pub(crate) struct GraphNode {
    pub id: u64,
    pub level: u8,
    pub vector: Vec<f32>,
    pub neighbors: Vec<Vec<u64>>,
    magnitude: f32,
}

impl GraphNode {
    pub fn new(id: u64, level: u8, vector: Vec<f32>) -> Self {
        let magnitude = magnitude(&vector);
        let neighbors = vec![Vec::new(); level as usize + 1];
        Self {
            id,
            level,
            vector,
            neighbors,
            magnitude,
        }
    }

    /// Cached L2 norm, computed once at construction.
    pub fn magnitude(&self) -> f32 {
        self.magnitude
    }

    /// Neighbor ids at `layer`, empty for layers above the node's level.
    pub fn neighbors_at(&self, layer: u8) -> &[u64] {
        self.neighbors
            .get(layer as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
