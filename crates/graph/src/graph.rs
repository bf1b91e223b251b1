use crate::types::BiographyGraph;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{BTreeSet, HashSet, VecDeque};

impl BiographyGraph {
    /// Distinct nodes joined to `node` by an edge in either direction,
    /// in index order
    pub fn neighbors(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut seen = BTreeSet::new();
        for edge in self.graph.edges_directed(node, Direction::Outgoing) {
            seen.insert(edge.target());
        }
        for edge in self.graph.edges_directed(node, Direction::Incoming) {
            seen.insert(edge.source());
        }
        seen.remove(&node);
        seen.into_iter().collect()
    }

    /// Edges touching `node`, counting both directions
    pub fn degree(&self, node: NodeIndex) -> usize {
        self.graph.edges_directed(node, Direction::Outgoing).count()
            + self.graph.edges_directed(node, Direction::Incoming).count()
    }

    /// Find all nodes within `max_depth` hops of `node`, ignoring edge direction.
    /// Returns (NodeIndex, distance) in breadth-first order, excluding `node`.
    pub fn related_nodes(&self, node: NodeIndex, max_depth: usize) -> Vec<(NodeIndex, usize)> {
        let mut visited = HashSet::new();
        let mut result = Vec::new();
        let mut queue = VecDeque::from([(node, 0)]);
        visited.insert(node);

        while let Some((current, depth)) = queue.pop_front() {
            if current != node {
                result.push((current, depth));
            }

            if depth < max_depth {
                for next in self.neighbors(current) {
                    if visited.insert(next) {
                        queue.push_back((next, depth + 1));
                    }
                }
            }
        }

        result
    }

    /// Copy of the graph restricted to `keep` and the edges between kept nodes.
    ///
    /// Node and edge order follow the source graph; the central id is kept
    /// only when its node survives.
    pub fn induced_subgraph(&self, keep: &HashSet<NodeIndex>) -> BiographyGraph {
        let mut sub = BiographyGraph::new();
        for idx in self.graph.node_indices() {
            if keep.contains(&idx) {
                sub.add_node(self.graph[idx].clone());
            }
        }

        for edge in self.graph.edge_references() {
            if !(keep.contains(&edge.source()) && keep.contains(&edge.target())) {
                continue;
            }
            let weight = edge.weight();
            if let (Some(from), Some(to)) = (sub.find_node(&weight.source), sub.find_node(&weight.target)) {
                sub.add_edge(from, to, weight.clone());
            }
        }

        sub.central = self
            .central
            .clone()
            .filter(|id| sub.find_node(id).is_some());
        sub
    }
}
