use crate::error::{GraphError, Result};
use biograph_protocol::EntityCategory;
use chrono::NaiveDate;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What a node stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Person,
    Place,
    Organization,
    Letter,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::Place => "place",
            Self::Organization => "organization",
            Self::Letter => "letter",
        }
    }

    pub fn from_category(category: EntityCategory) -> Option<Self> {
        match category {
            EntityCategory::Person => Some(Self::Person),
            EntityCategory::Place => Some(Self::Place),
            EntityCategory::Organization => Some(Self::Organization),
            EntityCategory::Miscellaneous => None,
        }
    }
}

/// Structural layer of the graph, top to bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// The biography subject
    Subject,
    /// People who sent or received letters
    Correspondent,
    /// One node per letter
    Letter,
    /// People, places and organizations mentioned in letters
    Mention,
}

impl Tier {
    /// Zero-based vertical level
    pub fn level(&self) -> usize {
        match self {
            Self::Subject => 0,
            Self::Correspondent => 1,
            Self::Letter => 2,
            Self::Mention => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Subject => "subject",
            Self::Correspondent => "correspondent",
            Self::Letter => "letter",
            Self::Mention => "mention",
        }
    }
}

/// Stable node id: a pure function of kind and normalized name
pub fn node_id(kind: NodeKind, name: &str) -> String {
    format!("{}:{}", kind.as_str(), name)
}

/// Node id of the `n`-th letter (1-based)
pub fn letter_id(n: usize) -> String {
    format!("letter:{n}")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
    pub tier: Tier,

    /// Tooltip text
    #[serde(default)]
    pub title: String,

    pub size: f64,
    pub color: String,
    pub border_color: String,
    pub border_width: f64,

    /// Letters sent/received (people) or times mentioned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity: Option<usize>,

    /// Letter date, or mean date of a correspondent's letters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

/// Relation carried by an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Sender → letter
    Sent,
    /// Letter → recipient
    Received,
    MentionsPerson,
    MentionsPlace,
    MentionsOrganization,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Received => "received",
            Self::MentionsPerson => "mentions_person",
            Self::MentionsPlace => "mentions_place",
            Self::MentionsOrganization => "mentions_organization",
        }
    }

    pub fn is_mention(&self) -> bool {
        !matches!(self, Self::Sent | Self::Received)
    }

    pub fn mention_of(kind: NodeKind) -> Option<Self> {
        match kind {
            NodeKind::Person => Some(Self::MentionsPerson),
            NodeKind::Place => Some(Self::MentionsPlace),
            NodeKind::Organization => Some(Self::MentionsOrganization),
            NodeKind::Letter => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
    pub width: f64,
    pub color: String,
    /// Mentions are dashed, authorship solid
    pub dashed: bool,
    pub arrow: bool,
}

/// Flat node/edge lists, the interchange form of a graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub central: Option<String>,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// Correspondence graph.
///
/// Parallel edges are kept: several letters between the same people yield
/// several edges.
#[derive(Debug, Clone, Default)]
pub struct BiographyGraph {
    /// Directed graph (sender → letter → recipient, letter → mention)
    pub graph: DiGraph<GraphNode, GraphEdge>,

    /// Node id -> NodeIndex mapping for fast lookup
    pub node_index: HashMap<String, NodeIndex>,

    /// Id of the subject node
    pub central: Option<String>,
}

impl BiographyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node; an existing node with the same id is kept and returned
    pub fn add_node(&mut self, node: GraphNode) -> NodeIndex {
        if let Some(&idx) = self.node_index.get(&node.id) {
            return idx;
        }
        let id = node.id.clone();
        let idx = self.graph.add_node(node);
        self.node_index.insert(id, idx);
        idx
    }

    /// Add edge between nodes
    pub fn add_edge(&mut self, from: NodeIndex, to: NodeIndex, edge: GraphEdge) -> EdgeIndex {
        self.graph.add_edge(from, to, edge)
    }

    /// Add an edge between the nodes named by `edge.source` and `edge.target`
    pub fn connect(&mut self, edge: GraphEdge) -> Result<EdgeIndex> {
        let from = self
            .find_node(&edge.source)
            .ok_or_else(|| GraphError::node_not_found(&edge.source))?;
        let to = self
            .find_node(&edge.target)
            .ok_or_else(|| GraphError::node_not_found(&edge.target))?;
        Ok(self.add_edge(from, to, edge))
    }

    pub fn find_node(&self, id: &str) -> Option<NodeIndex> {
        self.node_index.get(id).copied()
    }

    pub fn get_node(&self, idx: NodeIndex) -> Option<&GraphNode> {
        self.graph.node_weight(idx)
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.find_node(id).and_then(|idx| self.get_node(idx))
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut GraphNode> {
        let idx = self.find_node(id)?;
        self.graph.node_weight_mut(idx)
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.graph.raw_nodes().iter().map(|n| &n.weight)
    }

    /// Edges in insertion order
    pub fn edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.graph.raw_edges().iter().map(|e| &e.weight)
    }

    pub fn nodes_in_tier(&self, tier: Tier) -> impl Iterator<Item = &GraphNode> {
        self.nodes().filter(move |n| n.tier == tier)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn central_node(&self) -> Option<&GraphNode> {
        self.central.as_deref().and_then(|id| self.node(id))
    }

    pub fn is_central(&self, id: &str) -> bool {
        self.central.as_deref() == Some(id)
    }

    pub fn to_data(&self) -> GraphData {
        GraphData {
            central: self.central.clone(),
            nodes: self.nodes().cloned().collect(),
            edges: self.edges().cloned().collect(),
        }
    }

    /// Rebuild from flat lists; edges must reference known node ids
    pub fn from_data(data: GraphData) -> Result<Self> {
        let mut graph = Self::new();
        for node in data.nodes {
            if graph.node_index.contains_key(&node.id) {
                return Err(GraphError::import(format!("duplicate node id {}", node.id)));
            }
            graph.add_node(node);
        }
        for edge in data.edges {
            graph.connect(edge)?;
        }
        if let Some(central) = &data.central {
            if graph.find_node(central).is_none() {
                return Err(GraphError::node_not_found(central));
            }
        }
        graph.central = data.central;
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(name: &str) -> GraphNode {
        GraphNode {
            id: node_id(NodeKind::Person, name),
            label: name.to_string(),
            kind: NodeKind::Person,
            tier: Tier::Correspondent,
            title: String::new(),
            size: 18.0,
            color: "#3b82f6".to_string(),
            border_color: "#3b82f6".to_string(),
            border_width: 2.0,
            activity: None,
            date: None,
        }
    }

    #[test]
    fn test_add_node_is_idempotent_by_id() {
        let mut graph = BiographyGraph::new();
        let a = graph.add_node(person("Jo"));
        let b = graph.add_node(person("Jo"));
        assert_eq!(a, b);
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn test_add_edge_requires_endpoints() {
        let mut graph = BiographyGraph::new();
        graph.add_node(person("Jo"));
        let edge = GraphEdge {
            source: "person:Jo".into(),
            target: "person:Theo".into(),
            kind: EdgeKind::Sent,
            width: 2.0,
            color: "#000000".into(),
            dashed: false,
            arrow: true,
        };
        assert!(matches!(graph.connect(edge), Err(GraphError::NodeNotFound(id)) if id == "person:Theo"));
    }

    #[test]
    fn test_tier_levels() {
        assert_eq!(Tier::Subject.level(), 0);
        assert_eq!(Tier::Mention.level(), 3);
        assert!(Tier::Correspondent < Tier::Letter);
    }
}
