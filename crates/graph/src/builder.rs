use crate::activity::{mean_date, mention_lists, ActivityCounts, DateRange};
use crate::color::{palette, time_gradient, Rgb};
use crate::config::GraphConfig;
use crate::types::*;
use biograph_protocol::{try_parse_date, Letter};
use chrono::{Datelike, NaiveDate};
use petgraph::graph::NodeIndex;
use std::collections::{HashMap, HashSet};

const SUBJECT_SIZE: f64 = 30.0;
const CORRESPONDENT_SIZE: f64 = 18.0;
const LETTER_SIZE: f64 = 16.0;
const MENTION_SIZE: f64 = 10.0;
const ACTIVITY_CAP: usize = 20;
const AUTHORSHIP_DARKEN: f64 = -20.0;

/// Builds the four-tier correspondence graph:
/// subject → correspondents → letters → mentioned entities.
///
/// Output is a pure function of the letters, the subject name and the
/// config: node ids and edge order are the same on every run.
pub struct GraphBuilder {
    config: GraphConfig,
}

/// Per-build state shared by the node constructors
struct BuildContext<'a> {
    config: &'a GraphConfig,
    activity: ActivityCounts,
    central: String,
    correspondents: HashSet<String>,
    person_dates: HashMap<String, Vec<NaiveDate>>,
}

impl GraphBuilder {
    pub fn new(config: GraphConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Build with the date range taken from the letters themselves
    pub fn build(&self, letters: &[Letter], central_person: &str) -> BiographyGraph {
        self.build_with_range(letters, central_person, DateRange::from_letters(letters))
    }

    pub fn build_with_range(
        &self,
        letters: &[Letter],
        central_person: &str,
        range: Option<DateRange>,
    ) -> BiographyGraph {
        let ctx = self.context(letters, central_person);
        let mut graph = BiographyGraph::new();

        // Tier 1 exists even with no letters
        let central_id = node_id(NodeKind::Person, &ctx.central);
        graph.add_node(ctx.person_node(&ctx.central, Tier::Subject));
        graph.central = Some(central_id);

        for (i, letter) in letters.iter().enumerate() {
            self.add_letter(&mut graph, &ctx, i + 1, letter, range);
        }

        log::info!(
            "Built biography graph: {} nodes, {} edges from {} letters",
            graph.node_count(),
            graph.edge_count(),
            letters.len()
        );

        graph
    }

    fn context<'a>(&'a self, letters: &[Letter], central_person: &str) -> BuildContext<'a> {
        let config = &self.config;
        let central = config
            .resolve_person(central_person)
            .unwrap_or_else(|| "Unknown".to_string());

        let mut correspondents = HashSet::new();
        let mut person_dates: HashMap<String, Vec<NaiveDate>> = HashMap::new();
        for letter in letters {
            let date = try_parse_date(&letter.date);
            for raw in [&letter.sender, &letter.recipient] {
                let Some(name) = config.resolve_person(raw) else {
                    continue;
                };
                if let Some(date) = date {
                    person_dates.entry(name.clone()).or_default().push(date);
                }
                if name != central {
                    correspondents.insert(name);
                }
            }
        }

        BuildContext {
            config,
            activity: ActivityCounts::from_letters(letters, config),
            central,
            correspondents,
            person_dates,
        }
    }

    fn add_letter(
        &self,
        graph: &mut BiographyGraph,
        ctx: &BuildContext<'_>,
        number: usize,
        letter: &Letter,
        range: Option<DateRange>,
    ) {
        let sender = self.config.resolve_person(&letter.sender);
        let recipient = self.config.resolve_person(&letter.recipient);

        let sender_idx = sender.as_deref().map(|name| ctx.ensure_person(graph, name));
        let recipient_idx = recipient.as_deref().map(|name| ctx.ensure_person(graph, name));

        let date = letter.parsed_date();
        let color = if self.config.visual.color_by_time {
            range
                .and_then(|r| r.progress(date))
                .map(|p| time_gradient(p).to_hex())
                .unwrap_or_else(|| palette::SUBJECT.to_string())
        } else {
            palette::LETTER.to_string()
        };

        let id = letter_id(number);
        let letter_idx = graph.add_node(GraphNode {
            id: id.clone(),
            label: format!("Letter {number}\n{}", date.year()),
            kind: NodeKind::Letter,
            tier: Tier::Letter,
            title: format!(
                "Letter {number} ({})\n{} → {}",
                date.year(),
                sender.as_deref().unwrap_or("Unknown"),
                recipient.as_deref().unwrap_or("Unknown")
            ),
            size: LETTER_SIZE,
            color: color.clone(),
            border_color: color.clone(),
            border_width: 0.0,
            activity: None,
            date: Some(date),
        });

        let authorship_color = Rgb::parse(&color)
            .map(|c| c.adjust_brightness(AUTHORSHIP_DARKEN).to_hex())
            .unwrap_or(color);
        let authorship = |source: String, target: String, kind: EdgeKind| GraphEdge {
            source,
            target,
            kind,
            width: 2.0,
            color: authorship_color.clone(),
            dashed: false,
            arrow: true,
        };

        if let (Some(name), Some(idx)) = (&sender, sender_idx) {
            let edge = authorship(node_id(NodeKind::Person, name), id.clone(), EdgeKind::Sent);
            graph.add_edge(idx, letter_idx, edge);
        }
        if let (Some(name), Some(idx)) = (&recipient, recipient_idx) {
            let edge = authorship(id.clone(), node_id(NodeKind::Person, name), EdgeKind::Received);
            graph.add_edge(letter_idx, idx, edge);
        }

        let filters = &self.config.filters;
        for (kind, names) in mention_lists(letter, &self.config) {
            let shown = match kind {
                NodeKind::Person => filters.show_people,
                NodeKind::Place => filters.show_places,
                NodeKind::Organization => filters.show_organizations,
                NodeKind::Letter => false,
            };
            if !shown {
                continue;
            }

            for name in names {
                if kind == NodeKind::Person
                    && (name == ctx.central
                        || sender.as_deref() == Some(name.as_str())
                        || recipient.as_deref() == Some(name.as_str()))
                {
                    continue;
                }
                let target_idx = if kind == NodeKind::Person && ctx.correspondents.contains(&name) {
                    ctx.ensure_person(graph, &name)
                } else {
                    graph.add_node(ctx.mention_node(kind, &name))
                };
                let Some(edge_kind) = EdgeKind::mention_of(kind) else {
                    continue;
                };
                graph.add_edge(
                    letter_idx,
                    target_idx,
                    GraphEdge {
                        source: id.clone(),
                        target: node_id(kind, &name),
                        kind: edge_kind,
                        width: 1.0,
                        color: mention_edge_color(kind).to_string(),
                        dashed: true,
                        arrow: false,
                    },
                );
            }
        }
    }
}

impl BuildContext<'_> {
    /// Subject or correspondent node for `name`, created on first use
    fn ensure_person(&self, graph: &mut BiographyGraph, name: &str) -> NodeIndex {
        let id = node_id(NodeKind::Person, name);
        if let Some(idx) = graph.find_node(&id) {
            return idx;
        }
        let tier = if name == self.central {
            Tier::Subject
        } else {
            Tier::Correspondent
        };
        graph.add_node(self.person_node(name, tier))
    }

    fn person_node(&self, name: &str, tier: Tier) -> GraphNode {
        let id = node_id(NodeKind::Person, name);
        let activity = self.activity.get(&id);
        let (base, color, border_width, role) = match tier {
            Tier::Subject => (SUBJECT_SIZE, palette::SUBJECT, 3.0, "Biography subject"),
            _ => (CORRESPONDENT_SIZE, palette::CORRESPONDENT, 2.0, "Correspondent"),
        };
        GraphNode {
            size: self.sized(activity, base, tier),
            id,
            label: name.to_string(),
            kind: NodeKind::Person,
            tier,
            title: format!("{name}\n({role})\n{activity} letters and mentions"),
            color: color.to_string(),
            border_color: color.to_string(),
            border_width,
            activity: Some(activity),
            date: self
                .person_dates
                .get(name)
                .and_then(|dates| mean_date(dates)),
        }
    }

    fn mention_node(&self, kind: NodeKind, name: &str) -> GraphNode {
        let id = node_id(kind, name);
        let activity = self.activity.get(&id);
        let (fill, border) = match kind {
            NodeKind::Place => (palette::PLACE_FILL, palette::PLACE_BORDER),
            NodeKind::Organization => (palette::ORGANIZATION_FILL, palette::ORGANIZATION_BORDER),
            _ => (palette::PERSON_MENTION_FILL, palette::PERSON_MENTION_BORDER),
        };
        GraphNode {
            size: self.sized(activity, MENTION_SIZE, Tier::Mention),
            id,
            label: name.to_string(),
            kind,
            tier: Tier::Mention,
            title: format!("{name}\n(Mentioned {activity} times)"),
            color: fill.to_string(),
            border_color: border.to_string(),
            border_width: 1.0,
            activity: Some(activity),
            date: None,
        }
    }

    /// `base + min(activity, 20) * factor` when activity sizing is on
    fn sized(&self, activity: usize, base: f64, tier: Tier) -> f64 {
        if !self.config.visual.size_by_activity || activity == 0 {
            return base;
        }
        let factor = match tier {
            Tier::Subject => 2.0,
            Tier::Correspondent => 1.5,
            _ => 1.0,
        };
        base + activity.min(ACTIVITY_CAP) as f64 * factor
    }
}

fn mention_edge_color(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Place => palette::PLACE_EDGE,
        NodeKind::Organization => palette::ORGANIZATION_EDGE,
        _ => palette::PERSON_MENTION_EDGE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VisualOptions;
    use biograph_protocol::EntityCategory;
    use pretty_assertions::assert_eq;

    fn builder() -> GraphBuilder {
        GraphBuilder::new(GraphConfig::default())
    }

    #[test]
    fn test_empty_corpus_keeps_subject() {
        let graph = builder().build(&[], "Vincent");
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
        let central = graph.central_node().unwrap();
        assert_eq!(central.id, "person:Vincent");
        assert_eq!(central.tier, Tier::Subject);
        assert_eq!(central.size, SUBJECT_SIZE);
    }

    #[test]
    fn test_letters_are_numbered_and_never_merged() {
        let letters = vec![
            Letter::new("1888-05-01", "Jo", "Vincent"),
            Letter::new("1888-05-01", "Jo", "Vincent"),
        ];
        let graph = builder().build(&letters, "Vincent");
        let labels: Vec<_> = graph
            .nodes_in_tier(Tier::Letter)
            .map(|n| n.label.clone())
            .collect();
        assert_eq!(labels, vec!["Letter 1\n1888", "Letter 2\n1888"]);
        assert_eq!(graph.nodes_in_tier(Tier::Correspondent).count(), 1);
        assert_eq!(graph.edge_count(), 4);
    }

    #[test]
    fn test_single_date_uses_default_letter_color() {
        let letters = vec![Letter::new("1888-05-01", "Jo", "Vincent")];
        let graph = builder().build(&letters, "Vincent");
        assert_eq!(graph.node("letter:1").unwrap().color, palette::SUBJECT);
    }

    #[test]
    fn test_time_gradient_spans_corpus() {
        let letters = vec![
            Letter::new("1880-01-01", "Jo", "Vincent"),
            Letter::new("1890-01-01", "Jo", "Vincent"),
        ];
        let graph = builder().build(&letters, "Vincent");
        assert_eq!(graph.node("letter:1").unwrap().color, time_gradient(0.0).to_hex());
        assert_eq!(graph.node("letter:2").unwrap().color, time_gradient(1.0).to_hex());

        let plain = GraphBuilder::new(GraphConfig {
            visual: VisualOptions {
                color_by_time: false,
                size_by_activity: false,
            },
            ..Default::default()
        })
        .build(&letters, "Vincent");
        assert_eq!(plain.node("letter:1").unwrap().color, palette::LETTER);
    }

    #[test]
    fn test_unreadable_date_lands_on_sentinel() {
        let letters = vec![Letter::new("sometime in spring", "Jo", "Vincent")];
        let graph = builder().build(&letters, "Vincent");
        let letter = graph.node("letter:1").unwrap();
        assert_eq!(letter.date, NaiveDate::from_ymd_opt(1900, 1, 1));
        assert_eq!(letter.label, "Letter 1\n1900");
    }

    #[test]
    fn test_unknown_participants_get_no_edges() {
        let letters = vec![Letter::new("1888", "Unknown", "Desconocido")];
        let graph = builder().build(&letters, "Vincent");
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_mentioned_correspondent_links_to_tier_two() {
        let letters = vec![
            Letter::new("1888", "Vincent", "Theo")
                .with_mentions(EntityCategory::Person, ["Gauguin", "Vincent", "Theo"]),
            Letter::new("1889", "Gauguin", "Vincent"),
        ];
        let graph = builder().build(&letters, "Vincent");
        let gauguin = graph.node("person:Gauguin").unwrap();
        assert_eq!(gauguin.tier, Tier::Correspondent);
        // 2 authorship edges + 1 mention in letter 1, 2 authorship edges in letter 2
        assert_eq!(graph.edge_count(), 5);
    }

    #[test]
    fn test_filters_drop_mention_categories() {
        let letters = vec![Letter::new("1888", "Jo", "Vincent")
            .with_places("Paris", "Arles")
            .with_mentions(EntityCategory::Organization, ["Goupil"])];
        let config = GraphConfig {
            filters: crate::config::GraphFilters {
                show_places: false,
                ..Default::default()
            },
            ..Default::default()
        };
        let graph = GraphBuilder::new(config).build(&letters, "Vincent");
        assert!(graph.node("place:Paris").is_none());
        assert!(graph.node("organization:Goupil").is_some());
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn test_activity_sizing_is_capped() {
        let letters: Vec<Letter> = (0..30)
            .map(|_| Letter::new("1888", "Jo", "Vincent"))
            .collect();
        let config = GraphConfig {
            visual: VisualOptions {
                color_by_time: false,
                size_by_activity: true,
            },
            ..Default::default()
        };
        let graph = GraphBuilder::new(config).build(&letters, "Vincent");
        assert_eq!(graph.node("person:Vincent").unwrap().size, 30.0 + 20.0 * 2.0);
        assert_eq!(graph.node("person:Jo").unwrap().size, 18.0 + 20.0 * 1.5);
        assert_eq!(graph.node("person:Jo").unwrap().activity, Some(30));
    }

    #[test]
    fn test_authorship_edges_are_darkened_letter_color() {
        let letters = vec![Letter::new("1888", "Jo", "Vincent")];
        let graph = GraphBuilder::new(GraphConfig::minimal()).build(&letters, "Vincent");
        let expected = Rgb::parse(palette::LETTER)
            .unwrap()
            .adjust_brightness(-20.0)
            .to_hex();
        assert!(graph.edges().all(|e| e.color == expected && e.arrow && !e.dashed));
    }
}
