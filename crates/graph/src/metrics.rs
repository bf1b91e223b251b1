//! Structural metrics over a built graph.
//!
//! | Metric | Question answered |
//! |--------|-------------------|
//! | Degree | How many edges touch the node? |
//! | Betweenness | How often does the node sit on shortest paths? |
//! | Edge weight | How many parallel edges join a pair of nodes? |
//!
//! All three are recomputed from scratch on every call.

use crate::types::BiographyGraph;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// Number of parallel edges between an unordered pair of nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeWeight {
    pub a: String,
    pub b: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphMetrics {
    pub degree: BTreeMap<String, usize>,
    pub betweenness: BTreeMap<String, f64>,
    /// Sorted by pair, `a <= b`
    pub edge_weights: Vec<EdgeWeight>,
}

impl GraphMetrics {
    pub fn compute(graph: &BiographyGraph) -> Self {
        let metrics = Self {
            degree: degree_centrality(graph),
            betweenness: betweenness_centrality(graph),
            edge_weights: edge_weights(graph),
        };
        log::debug!(
            "Computed metrics for {} nodes, {} distinct node pairs",
            metrics.degree.len(),
            metrics.edge_weights.len()
        );
        metrics
    }

    pub fn degree_of(&self, id: &str) -> usize {
        self.degree.get(id).copied().unwrap_or(0)
    }

    pub fn betweenness_of(&self, id: &str) -> f64 {
        self.betweenness.get(id).copied().unwrap_or(0.0)
    }

    /// Parallel-edge count between two nodes, in either order
    pub fn weight_between(&self, x: &str, y: &str) -> usize {
        let (a, b) = ordered(x, y);
        self.edge_weights
            .binary_search_by(|w| (w.a.as_str(), w.b.as_str()).cmp(&(a, b)))
            .map(|i| self.edge_weights[i].count)
            .unwrap_or(0)
    }

    pub fn max_degree(&self) -> usize {
        self.degree.values().copied().max().unwrap_or(0)
    }

    pub fn max_betweenness(&self) -> f64 {
        self.betweenness.values().copied().fold(0.0, f64::max)
    }

    pub fn max_edge_weight(&self) -> usize {
        self.edge_weights.iter().map(|w| w.count).max().unwrap_or(0)
    }
}

/// Edges touching each node, counting both directions
pub fn degree_centrality(graph: &BiographyGraph) -> BTreeMap<String, usize> {
    graph
        .graph
        .node_indices()
        .map(|idx| (graph.graph[idx].id.clone(), graph.degree(idx)))
        .collect()
}

/// Brandes betweenness on the undirected, unweighted view of the graph,
/// normalized by `(n-1)(n-2)`. Graphs with two nodes or fewer score zero.
pub fn betweenness_centrality(graph: &BiographyGraph) -> BTreeMap<String, f64> {
    let n = graph.node_count();
    let mut scores = vec![0.0_f64; n];

    if n > 2 {
        let adjacency: Vec<Vec<usize>> = graph
            .graph
            .node_indices()
            .map(|idx| graph.neighbors(idx).into_iter().map(NodeIndex::index).collect())
            .collect();

        for source in 0..n {
            accumulate_from(source, &adjacency, &mut scores);
        }

        let norm = ((n - 1) * (n - 2)) as f64;
        for score in &mut scores {
            *score /= norm;
        }
    }

    graph
        .graph
        .node_indices()
        .map(|idx| (graph.graph[idx].id.clone(), scores[idx.index()]))
        .collect()
}

/// One Brandes pass: BFS from `source`, then back-propagate dependencies
fn accumulate_from(source: usize, adjacency: &[Vec<usize>], scores: &mut [f64]) {
    let n = adjacency.len();
    let mut order = Vec::with_capacity(n);
    let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut paths = vec![0.0_f64; n];
    let mut distance: Vec<Option<usize>> = vec![None; n];

    paths[source] = 1.0;
    distance[source] = Some(0);
    let mut queue = VecDeque::from([source]);

    while let Some(v) = queue.pop_front() {
        order.push(v);
        let Some(dv) = distance[v] else {
            continue;
        };
        for &w in &adjacency[v] {
            if distance[w].is_none() {
                distance[w] = Some(dv + 1);
                queue.push_back(w);
            }
            if distance[w] == Some(dv + 1) {
                paths[w] += paths[v];
                predecessors[w].push(v);
            }
        }
    }

    let mut dependency = vec![0.0_f64; n];
    while let Some(w) = order.pop() {
        for &v in &predecessors[w] {
            dependency[v] += paths[v] / paths[w] * (1.0 + dependency[w]);
        }
        if w != source {
            scores[w] += dependency[w];
        }
    }
}

/// Parallel edges per unordered node pair
pub fn edge_weights(graph: &BiographyGraph) -> Vec<EdgeWeight> {
    let mut counts: BTreeMap<(String, String), usize> = BTreeMap::new();
    for edge in graph.graph.edge_references() {
        let (a, b) = ordered(
            &graph.graph[edge.source()].id,
            &graph.graph[edge.target()].id,
        );
        *counts.entry((a.to_string(), b.to_string())).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|((a, b), count)| EdgeWeight { a, b, count })
        .collect()
}

fn ordered<'a>(x: &'a str, y: &'a str) -> (&'a str, &'a str) {
    if x <= y {
        (x, y)
    } else {
        (y, x)
    }
}
