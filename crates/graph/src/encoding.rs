use crate::activity::DateRange;
use crate::color::{betweenness_ramp, degree_ramp, era_color, palette, weight_ramp};
use crate::metrics::GraphMetrics;
use crate::types::{BiographyGraph, NodeKind, Tier};
use serde::{Deserialize, Serialize};

const HIGHLIGHT_SCALE: f64 = 1.5;
const HIGHLIGHT_BORDER: f64 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeColorBy {
    /// Keep the tier/category colors from the build
    #[default]
    Type,
    /// Correspondents bucketed by the mean date of their letters
    Era,
    Degree,
    Betweenness,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeSizeBy {
    #[default]
    Fixed,
    Degree,
    Betweenness,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeColorBy {
    #[default]
    Type,
    Weight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeWidthBy {
    #[default]
    Fixed,
    Weight,
}

/// Metric-driven restyling applied after a build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingOptions {
    pub node_color_by: NodeColorBy,
    pub node_size_by: NodeSizeBy,
    pub node_base_size: f64,
    pub node_scale_factor: f64,
    pub edge_color_by: EdgeColorBy,
    pub edge_width_by: EdgeWidthBy,
    pub edge_base_width: f64,
    pub edge_scale_factor: f64,
}

impl Default for EncodingOptions {
    fn default() -> Self {
        Self {
            node_color_by: NodeColorBy::Type,
            node_size_by: NodeSizeBy::Fixed,
            node_base_size: 10.0,
            node_scale_factor: 2.0,
            edge_color_by: EdgeColorBy::Type,
            edge_width_by: EdgeWidthBy::Fixed,
            edge_base_width: 1.0,
            edge_scale_factor: 1.0,
        }
    }
}

/// Restyle nodes and edges from `metrics`.
///
/// The central node is always highlighted: gold, thick border, 1.5× the
/// size it would otherwise get.
pub fn apply_encoding(graph: &mut BiographyGraph, metrics: &GraphMetrics, options: &EncodingOptions) {
    let max_degree = metrics.max_degree() as f64;
    let max_betweenness = metrics.max_betweenness();
    let max_weight = metrics.max_edge_weight() as f64;
    let era_range = correspondent_dates(graph);
    let central = graph.central.clone();

    for node in graph.graph.node_weights_mut() {
        let is_central = central.as_deref() == Some(node.id.as_str());

        match options.node_color_by {
            NodeColorBy::Type => {}
            NodeColorBy::Era => {
                if node.kind == NodeKind::Person && node.tier == Tier::Correspondent {
                    if let (Some(date), Some(range)) = (node.date, era_range) {
                        let progress = range.progress(date).unwrap_or(0.0);
                        node.color = era_color(progress).to_string();
                    }
                }
            }
            NodeColorBy::Degree => {
                node.color = degree_ramp(ratio(metrics.degree_of(&node.id) as f64, max_degree));
            }
            NodeColorBy::Betweenness => {
                node.color = betweenness_ramp(ratio(metrics.betweenness_of(&node.id), max_betweenness));
            }
        }

        let metric = match options.node_size_by {
            NodeSizeBy::Fixed => None,
            NodeSizeBy::Degree => Some(metrics.degree_of(&node.id) as f64),
            NodeSizeBy::Betweenness => Some(metrics.betweenness_of(&node.id)),
        };
        if let Some(metric) = metric {
            node.size = options.node_base_size + metric * options.node_scale_factor;
        }

        if is_central {
            node.size *= HIGHLIGHT_SCALE;
            node.color = palette::SUBJECT_HIGHLIGHT.to_string();
            node.border_width = HIGHLIGHT_BORDER;
        }
    }

    for edge in graph.graph.edge_weights_mut() {
        let weight = metrics.weight_between(&edge.source, &edge.target).max(1) as f64;
        if options.edge_width_by == EdgeWidthBy::Weight {
            edge.width = options.edge_base_width + weight * options.edge_scale_factor;
        }
        if options.edge_color_by == EdgeColorBy::Weight {
            edge.color = weight_ramp(ratio(weight, max_weight));
        }
    }
}

fn ratio(value: f64, max: f64) -> f64 {
    if max > 0.0 {
        value / max
    } else {
        0.0
    }
}

fn correspondent_dates(graph: &BiographyGraph) -> Option<DateRange> {
    graph
        .nodes_in_tier(Tier::Correspondent)
        .filter_map(|n| n.date)
        .fold(None, |range: Option<DateRange>, d| match range {
            Some(r) => Some(DateRange::new(r.min.min(d), r.max.max(d))),
            None => Some(DateRange::new(d, d)),
        })
}
