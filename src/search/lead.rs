use crate::Probability;
use petgraph::graph::NodeIndex;

/// A frontier entry waiting in the priority queue. The most probable
/// line pops first; ties fall to the larger single-action prior, then to
/// the earlier insertion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lead {
    cum: Probability,
    prior: Probability,
    seq: usize,
    node: NodeIndex,
}

impl Lead {
    pub fn new(cum: Probability, prior: Probability, seq: usize, node: NodeIndex) -> Self {
        Self {
            cum,
            prior,
            seq,
            node,
        }
    }
    pub fn node(&self) -> NodeIndex {
        self.node
    }
    pub fn cum(&self) -> Probability {
        self.cum
    }
}

impl Eq for Lead {}
impl PartialOrd for Lead {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Lead {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.cum
            .partial_cmp(&other.cum)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(
                self.prior
                    .partial_cmp(&other.prior)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
            .then(other.seq.cmp(&self.seq))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BinaryHeap;

    #[test]
    fn probable_lines_pop_first() {
        let mut heap = BinaryHeap::new();
        heap.push(Lead::new(0.1, 0.1, 0, NodeIndex::new(0)));
        heap.push(Lead::new(0.9, 0.9, 1, NodeIndex::new(1)));
        heap.push(Lead::new(0.5, 0.5, 2, NodeIndex::new(2)));
        assert!(heap.pop().map(|l| l.node()) == Some(NodeIndex::new(1)));
        assert!(heap.pop().map(|l| l.node()) == Some(NodeIndex::new(2)));
        assert!(heap.pop().map(|l| l.node()) == Some(NodeIndex::new(0)));
    }

    #[test]
    fn ties_fall_to_prior_then_insertion() {
        let mut heap = BinaryHeap::new();
        heap.push(Lead::new(0.5, 0.2, 0, NodeIndex::new(0)));
        heap.push(Lead::new(0.5, 0.4, 1, NodeIndex::new(1)));
        heap.push(Lead::new(0.5, 0.4, 2, NodeIndex::new(2)));
        assert!(heap.pop().map(|l| l.node()) == Some(NodeIndex::new(1)));
        assert!(heap.pop().map(|l| l.node()) == Some(NodeIndex::new(2)));
        assert!(heap.pop().map(|l| l.node()) == Some(NodeIndex::new(0)));
    }
}
