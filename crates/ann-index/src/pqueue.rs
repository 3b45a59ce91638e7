use std::cmp::Ordering;

/// An id paired with a distance, totally ordered for use in binary heaps.
///
/// Ordering is by ascending distance with ascending id as the tie-break, so
/// heap contents pop deterministically even when distances collide. NaN never
/// reaches the heaps (the distance kernels fail closed), but the comparator
/// still treats it as equal rather than panicking.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Candidate {
    pub distance: f32,
    pub id: u64,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.distance == other.distance && self.id == other.id
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .partial_cmp(&other.distance)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.id.cmp(&other.id))
    }
}
