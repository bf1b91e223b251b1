//! # Biograph Graph
//!
//! Correspondence network synthesis from letter records.
//!
//! ## Features
//!
//! - **Four-tier graph** - subject, correspondents, letters, mentioned entities
//! - **Alias normalization** - per-corpus spelling variants collapse to one node
//! - **Metrics** - degree, Brandes betweenness, parallel-edge weights
//! - **Ego networks** - induced subgraph within N hops of a node
//! - **Layouts** - deterministic force-directed and tiered placement
//! - **Export** - JSON (round-trips), GEXF, CSV
//!
//! ## Architecture
//!
//! ```text
//! Letter[] + central person
//!     │
//!     ├──> GraphBuilder
//!     │      ├─ Resolve names (unknown sentinels, aliases)
//!     │      ├─ Count activity, compute date range
//!     │      └─ Emit tiers 1-4 and their edges
//!     │
//!     ├──> BiographyGraph (petgraph)
//!     │      ├─ Nodes: people, letters, places, organizations
//!     │      └─ Edges: sent, received, mentions
//!     │
//!     └──> Analysis
//!            ├─ GraphMetrics / apply_encoding
//!            ├─ ego_network
//!            └─ compute_layout / export
//! ```

mod activity;
mod aliases;
mod builder;
mod color;
mod config;
mod ego;
mod encoding;
mod error;
mod export;
mod graph;
mod layout;
mod metrics;
mod types;

pub use activity::{detect_central_person, ActivityCounts, DateRange};
pub use aliases::{AliasEntry, AliasMap};
pub use builder::GraphBuilder;
pub use color::{era_color, palette, time_gradient, Rgb};
pub use config::{GraphConfig, GraphFilters, VisualOptions};
pub use ego::ego_network;
pub use encoding::{apply_encoding, EdgeColorBy, EdgeWidthBy, EncodingOptions, NodeColorBy, NodeSizeBy};
pub use error::{GraphError, Result};
pub use export::{import_json, to_csv, to_gexf, to_json, CsvTables, ExportFormat};
pub use layout::{
    compute_layout, compute_layout_with, HierarchicalOptions, Layout, LayoutMode, PhysicsOptions,
    PhysicsSolver, Position,
};
pub use metrics::{betweenness_centrality, degree_centrality, edge_weights, EdgeWeight, GraphMetrics};
pub use types::{
    letter_id, node_id, BiographyGraph, EdgeKind, GraphData, GraphEdge, GraphNode, NodeKind, Tier,
};
