use crate::error::{GraphError, Result};
use crate::types::BiographyGraph;
use std::collections::HashSet;

/// Subgraph induced by every node within `depth` hops of `center_id`.
///
/// Expansion is level by level over edges in either direction; depth 1
/// yields the center and its immediate neighbors. Edges between two
/// included nodes are kept even when neither is the center.
pub fn ego_network(graph: &BiographyGraph, center_id: &str, depth: usize) -> Result<BiographyGraph> {
    if depth == 0 {
        return Err(GraphError::InvalidDepth(depth));
    }
    let center = graph
        .find_node(center_id)
        .ok_or_else(|| GraphError::node_not_found(center_id))?;

    let mut keep: HashSet<_> = graph
        .related_nodes(center, depth)
        .into_iter()
        .map(|(idx, _)| idx)
        .collect();
    keep.insert(center);

    let ego = graph.induced_subgraph(&keep);
    log::debug!(
        "Ego network of {center_id} at depth {depth}: {} nodes, {} edges",
        ego.node_count(),
        ego.edge_count()
    );
    Ok(ego)
}
