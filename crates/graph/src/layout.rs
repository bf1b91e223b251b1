//! Node placement for the two layout modes.
//!
//! The force mode runs a fixed number of deterministic simulation steps
//! (repulsion, springs along edges, pull toward the origin). The
//! hierarchical mode puts each tier on its own row and orders rows with
//! barycenter sweeps to cut edge crossings. Both also hand back the physics
//! settings a renderer needs to continue from these positions.

use crate::types::BiographyGraph;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f64::consts::TAU;
use std::str::FromStr;

const FORCE_SEED: u64 = 42;
const TIME_STEP: f64 = 0.5;
const MAX_VELOCITY: f64 = 50.0;
const BARYCENTER_SWEEPS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    #[default]
    Force,
    Hierarchical,
}

impl LayoutMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Force => "force",
            Self::Hierarchical => "hierarchical",
        }
    }
}

impl FromStr for LayoutMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "force" => Ok(Self::Force),
            "hierarchical" => Ok(Self::Hierarchical),
            other => Err(format!("unknown layout mode '{other}' (expected force or hierarchical)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PhysicsSolver {
    BarnesHut,
    HierarchicalRepulsion,
}

/// Physics settings handed to the renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsOptions {
    /// Off means positions stay frozen after stabilization
    pub enabled: bool,
    pub solver: PhysicsSolver,
    pub gravitational_constant: f64,
    pub central_gravity: f64,
    pub spring_length: f64,
    pub spring_constant: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_distance: Option<f64>,
    pub damping: f64,
    pub avoid_overlap: f64,
    pub stabilization_iterations: usize,
}

impl PhysicsOptions {
    pub fn for_mode(mode: LayoutMode, enabled: bool) -> Self {
        match mode {
            LayoutMode::Force => Self {
                enabled,
                solver: PhysicsSolver::BarnesHut,
                gravitational_constant: -4000.0,
                central_gravity: 0.3,
                spring_length: 150.0,
                spring_constant: 0.05,
                node_distance: None,
                damping: 0.09,
                avoid_overlap: 0.3,
                stabilization_iterations: 500,
            },
            LayoutMode::Hierarchical => Self {
                enabled,
                solver: PhysicsSolver::HierarchicalRepulsion,
                gravitational_constant: 0.0,
                central_gravity: 0.0,
                spring_length: 200.0,
                spring_constant: 0.01,
                node_distance: Some(150.0),
                damping: 0.09,
                avoid_overlap: 0.0,
                stabilization_iterations: 200,
            },
        }
    }

    /// Override the pull toward the origin (force mode slider)
    pub fn with_central_gravity(mut self, gravity: f64) -> Self {
        self.central_gravity = gravity.max(0.0);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchicalOptions {
    pub level_separation: f64,
    pub node_spacing: f64,
    /// "UD": central person on top, mentions at the bottom
    pub direction: String,
}

impl Default for HierarchicalOptions {
    fn default() -> Self {
        Self {
            level_separation: 200.0,
            node_spacing: 150.0,
            direction: "UD".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub mode: LayoutMode,
    pub physics: PhysicsOptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hierarchical: Option<HierarchicalOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub random_seed: Option<u64>,
    /// Keyed by node id
    pub positions: BTreeMap<String, Position>,
}

impl Layout {
    pub fn position(&self, id: &str) -> Option<Position> {
        self.positions.get(id).copied()
    }
}

/// Place every node of `graph` for the given mode
pub fn compute_layout(graph: &BiographyGraph, mode: LayoutMode, physics_enabled: bool) -> Layout {
    let physics = PhysicsOptions::for_mode(mode, physics_enabled);
    compute_layout_with(graph, mode, physics)
}

pub fn compute_layout_with(graph: &BiographyGraph, mode: LayoutMode, physics: PhysicsOptions) -> Layout {
    let layout = match mode {
        LayoutMode::Force => Layout {
            mode,
            positions: force_positions(graph, &physics),
            physics,
            hierarchical: None,
            random_seed: Some(FORCE_SEED),
        },
        LayoutMode::Hierarchical => {
            let options = HierarchicalOptions::default();
            Layout {
                mode,
                positions: hierarchical_positions(graph, &options),
                physics,
                hierarchical: Some(options),
                random_seed: None,
            }
        }
    };
    log::debug!(
        "Computed {} layout for {} nodes",
        mode.as_str(),
        layout.positions.len()
    );
    layout
}

fn id_positions(graph: &BiographyGraph, points: &[Position]) -> BTreeMap<String, Position> {
    graph
        .graph
        .node_indices()
        .map(|idx| (graph.graph[idx].id.clone(), points[idx.index()]))
        .collect()
}

/// Undirected adjacency by node index, one entry per edge
fn edge_pairs(graph: &BiographyGraph) -> Vec<(usize, usize)> {
    graph
        .graph
        .raw_edges()
        .iter()
        .map(|e| (e.source().index(), e.target().index()))
        .filter(|(a, b)| a != b)
        .collect()
}

fn force_positions(graph: &BiographyGraph, physics: &PhysicsOptions) -> BTreeMap<String, Position> {
    let n = graph.node_count();
    if n == 0 {
        return BTreeMap::new();
    }

    // Circle start; the central node sits at the origin
    let radius = physics.spring_length * (n as f64).sqrt();
    let central = graph
        .central
        .as_deref()
        .and_then(|id| graph.find_node(id))
        .map(|idx| idx.index());
    let mut points: Vec<Position> = (0..n)
        .map(|i| {
            if Some(i) == central {
                return Position::default();
            }
            let angle = TAU * i as f64 / n as f64;
            Position {
                x: radius * angle.cos(),
                y: radius * angle.sin(),
            }
        })
        .collect();
    let mut velocity = vec![Position::default(); n];
    let edges = edge_pairs(graph);
    let repulsion = physics.gravitational_constant.abs();

    for _ in 0..physics.stabilization_iterations {
        let mut force = vec![Position::default(); n];

        for i in 0..n {
            for j in (i + 1)..n {
                let (dx, dy, dist) = separation(points[i], points[j], i, j);
                let f = repulsion / (dist * dist);
                force[i].x += f * dx / dist;
                force[i].y += f * dy / dist;
                force[j].x -= f * dx / dist;
                force[j].y -= f * dy / dist;
            }
        }

        for &(a, b) in &edges {
            let (dx, dy, dist) = separation(points[a], points[b], a, b);
            let f = physics.spring_constant * (dist - physics.spring_length);
            force[a].x -= f * dx / dist;
            force[a].y -= f * dy / dist;
            force[b].x += f * dx / dist;
            force[b].y += f * dy / dist;
        }

        for (i, point) in points.iter_mut().enumerate() {
            force[i].x -= physics.central_gravity * point.x;
            force[i].y -= physics.central_gravity * point.y;

            let v = &mut velocity[i];
            v.x = ((v.x + force[i].x * TIME_STEP) * (1.0 - physics.damping)).clamp(-MAX_VELOCITY, MAX_VELOCITY);
            v.y = ((v.y + force[i].y * TIME_STEP) * (1.0 - physics.damping)).clamp(-MAX_VELOCITY, MAX_VELOCITY);
            point.x += v.x * TIME_STEP;
            point.y += v.y * TIME_STEP;
        }
    }

    id_positions(graph, &points)
}

/// Vector from `b` to `a` and its length, never zero
fn separation(a: Position, b: Position, i: usize, j: usize) -> (f64, f64, f64) {
    let (mut dx, mut dy) = (a.x - b.x, a.y - b.y);
    let mut dist = (dx * dx + dy * dy).sqrt();
    if dist < 1e-6 {
        // Coincident nodes: nudge apart along a direction fixed by their indices
        let angle = TAU * ((i * 31 + j * 17) % 360) as f64 / 360.0;
        dx = angle.cos();
        dy = angle.sin();
        dist = 1.0;
    }
    (dx, dy, dist)
}

fn hierarchical_positions(graph: &BiographyGraph, options: &HierarchicalOptions) -> BTreeMap<String, Position> {
    let n = graph.node_count();
    let level_of: Vec<usize> = graph
        .graph
        .node_indices()
        .map(|idx| graph.graph[idx].tier.level())
        .collect();
    let depth = level_of.iter().copied().max().map_or(0, |m| m + 1);

    let mut rows: Vec<Vec<usize>> = vec![Vec::new(); depth];
    for (i, &level) in level_of.iter().enumerate() {
        rows[level].push(i);
    }

    let edges = edge_pairs(graph);
    let mut neighbors: Vec<Vec<usize>> = vec![Vec::new(); n];
    for &(a, b) in &edges {
        neighbors[a].push(b);
        neighbors[b].push(a);
    }

    let mut best = rows.clone();
    let mut best_crossings = crossings(&rows, &level_of, &edges);
    for _ in 0..BARYCENTER_SWEEPS {
        for level in 1..depth {
            reorder_row(&mut rows, level, &level_of, &neighbors, |l| l < level);
        }
        for level in (0..depth.saturating_sub(1)).rev() {
            reorder_row(&mut rows, level, &level_of, &neighbors, |l| l > level);
        }
        let count = crossings(&rows, &level_of, &edges);
        if count < best_crossings {
            best_crossings = count;
            best = rows.clone();
        }
    }
    log::debug!("Hierarchical layout: {best_crossings} edge crossings");

    let mut points = vec![Position::default(); n];
    for (level, row) in best.iter().enumerate() {
        let offset = (row.len() as f64 - 1.0) / 2.0;
        for (slot, &i) in row.iter().enumerate() {
            let along = (slot as f64 - offset) * options.node_spacing;
            let across = level as f64 * options.level_separation;
            points[i] = match options.direction.as_str() {
                "DU" => Position { x: along, y: -across },
                "LR" => Position { x: across, y: along },
                "RL" => Position { x: -across, y: along },
                _ => Position { x: along, y: across },
            };
        }
    }

    id_positions(graph, &points)
}

/// Sort one row by the mean slot of its neighbors on rows matching `toward`.
/// Nodes without such neighbors keep their current slot as key.
fn reorder_row(
    rows: &mut [Vec<usize>],
    level: usize,
    level_of: &[usize],
    neighbors: &[Vec<usize>],
    toward: impl Fn(usize) -> bool,
) {
    let mut slot = vec![0usize; level_of.len()];
    for row in rows.iter() {
        for (s, &i) in row.iter().enumerate() {
            slot[i] = s;
        }
    }

    let mut keyed: Vec<(f64, usize, usize)> = rows[level]
        .iter()
        .enumerate()
        .map(|(current, &i)| {
            let adjacent: Vec<f64> = neighbors[i]
                .iter()
                .filter(|&&j| toward(level_of[j]))
                .map(|&j| slot[j] as f64)
                .collect();
            let key = if adjacent.is_empty() {
                current as f64
            } else {
                adjacent.iter().sum::<f64>() / adjacent.len() as f64
            };
            (key, current, i)
        })
        .collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    rows[level] = keyed.into_iter().map(|(_, _, i)| i).collect();
}

/// Pairs of edges that cross between the same two rows
fn crossings(rows: &[Vec<usize>], level_of: &[usize], edges: &[(usize, usize)]) -> usize {
    let mut slot = vec![0usize; level_of.len()];
    for row in rows {
        for (s, &i) in row.iter().enumerate() {
            slot[i] = s;
        }
    }

    // Orient every edge upper-row first
    let oriented: Vec<(usize, usize)> = edges
        .iter()
        .filter(|(a, b)| level_of[*a] != level_of[*b])
        .map(|&(a, b)| if level_of[a] < level_of[b] { (a, b) } else { (b, a) })
        .collect();

    let mut count = 0;
    for (k, &(u1, v1)) in oriented.iter().enumerate() {
        for &(u2, v2) in &oriented[k + 1..] {
            if level_of[u1] != level_of[u2] || level_of[v1] != level_of[v2] {
                continue;
            }
            let top = slot[u1] as i64 - slot[u2] as i64;
            let bottom = slot[v1] as i64 - slot[v2] as i64;
            if top * bottom < 0 {
                count += 1;
            }
        }
    }
    count
}
