//! Island grouping: connected components of a topology graph.
//!
//! On a graph built with [`Linkage::Uv`](super::Linkage::Uv) the components
//! are texture islands, i.e. groups of faces sharing one local UV frame.

use super::{NodeId, TopologyGraph};

/// Union-find over node indices.
struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            rank: vec![0; len],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }
}

/// Island id per node. Ids are dense and numbered in order of first appearance.
pub fn islands(graph: &TopologyGraph) -> Vec<usize> {
    let mut set = DisjointSet::new(graph.len());
    for (id, node) in graph.nodes().iter().enumerate() {
        for other in node.neighbors.iter().flatten() {
            set.union(id, *other);
        }
    }

    let mut labels: Vec<Option<usize>> = vec![None; graph.len()];
    let mut ids = Vec::with_capacity(graph.len());
    let mut next = 0;
    for id in 0..graph.len() {
        let root = set.find(id);
        let label = *labels[root].get_or_insert_with(|| {
            next += 1;
            next - 1
        });
        ids.push(label);
    }
    ids
}

/// Number of distinct islands.
pub fn island_count(graph: &TopologyGraph) -> usize {
    islands(graph).into_iter().max().map_or(0, |m| m + 1)
}

/// Nodes belonging to island `island`.
pub fn island_members(graph: &TopologyGraph, island: usize) -> Vec<NodeId> {
    islands(graph)
        .into_iter()
        .enumerate()
        .filter(|(_, i)| *i == island)
        .map(|(n, _)| n)
        .collect()
}
