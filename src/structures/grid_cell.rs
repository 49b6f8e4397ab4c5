use std::cmp::Ordering;

/// A cell queued by elevation. `BinaryHeap<GridCell>` pops the lowest
/// priority first; ties are broken by insertion sequence so runs are
/// deterministic.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct GridCell {
    pub row: isize,
    pub column: isize,
    pub priority: f64,
    pub sequence: u64,
}

impl Eq for GridCell {}

impl PartialOrd for GridCell {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GridCell {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}
