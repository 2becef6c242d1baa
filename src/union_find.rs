//! Disjoint set union used by [`Strategy::UnionFind`](crate::Strategy).
//!
//! Each set additionally tracks the smallest code it contains, so the labels
//! it produces coincide with the fixpoint of the propagation rounds.

use crate::factorize::Code;
use crate::labeling::Labeling;
use crate::prepare::MatchGraph;

#[derive(Clone, Debug)]
pub(crate) struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
    min_code: Vec<Code>,
}

impl DisjointSet {
    pub(crate) fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
            min_code: (0..n).map(|c| c as Code).collect(),
        }
    }

    pub(crate) fn find(&mut self, mut node: usize) -> usize {
        let mut root = node;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        while self.parent[node] != node {
            let parent = self.parent[node];
            self.parent[node] = root;
            node = parent;
        }

        root
    }

    pub(crate) fn union(&mut self, left: usize, right: usize) -> usize {
        let mut left = self.find(left);
        let mut right = self.find(right);
        if left == right {
            return left;
        }
        let left_rank = self.rank[left];
        let right_rank = self.rank[right];
        if left_rank < right_rank {
            std::mem::swap(&mut left, &mut right);
        }
        self.parent[right] = left;
        self.min_code[left] = self.min_code[left].min(self.min_code[right]);
        if left_rank == right_rank {
            self.rank[left] = left_rank.saturating_add(1);
        }
        left
    }

    /// Smallest code in the set containing `node`.
    pub(crate) fn min_of(&mut self, node: usize) -> Code {
        let root = self.find(node);
        self.min_code[root]
    }
}

/// Labels every node with the minimum code of its component.
pub(crate) fn label_components(graph: &MatchGraph) -> Labeling {
    let mut set = DisjointSet::new(graph.n());
    for &(l, r) in graph.edges() {
        set.union(l as usize, r as usize);
    }
    Labeling::from_vec((0..graph.n()).map(|c| set.min_of(c)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    pub fn union_tracks_minimum() {
        let mut set = DisjointSet::new(5);
        set.union(4, 3);
        set.union(3, 1);
        assert_eq!(1, set.min_of(4));
        assert_eq!(set.find(4), set.find(1));
        assert_ne!(set.find(4), set.find(0));
        assert_eq!(2, set.min_of(2));
    }

    #[test]
    pub fn labels_are_component_minima() {
        let g = MatchGraph::from_coded_edges(6, vec![(5, 2), (2, 4), (0, 1)]);
        let l = label_components(&g);
        assert_eq!(&[0, 0, 2, 3, 2, 2], l.as_slice());
    }
}
