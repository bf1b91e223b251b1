use biograph_graph::{ego_network, GraphBuilder, GraphConfig, GraphMetrics, Tier};
use biograph_protocol::{EntityCategory, Letter};
use proptest::prelude::*;

const PEOPLE: &[&str] = &["Vincent", "Theo", "Jo", "Gauguin", "Rappard", "Unknown"];
const PLACES: &[&str] = &["Paris", "Arles", "Nuenen", "Auvers"];

fn letter_strategy() -> impl Strategy<Value = Letter> {
    (
        1880u32..1891,
        0..PEOPLE.len(),
        0..PEOPLE.len(),
        prop::collection::vec(0..PLACES.len(), 0..3),
        prop::collection::vec(0..PEOPLE.len(), 0..3),
    )
        .prop_map(|(year, from, to, places, people)| {
            Letter::new(year.to_string(), PEOPLE[from], PEOPLE[to])
                .with_mentions(EntityCategory::Place, places.into_iter().map(|i| PLACES[i]))
                .with_mentions(EntityCategory::Person, people.into_iter().map(|i| PEOPLE[i]))
        })
}

proptest! {
    #[test]
    fn degrees_sum_to_twice_the_edges(letters in prop::collection::vec(letter_strategy(), 0..12)) {
        let graph = GraphBuilder::new(GraphConfig::default()).build(&letters, "Vincent");
        let metrics = GraphMetrics::compute(&graph);
        let total: usize = metrics.degree.values().sum();
        prop_assert_eq!(total, 2 * graph.edge_count());
        let weighted: usize = metrics.edge_weights.iter().map(|w| w.count).sum();
        prop_assert_eq!(weighted, graph.edge_count());
    }

    #[test]
    fn betweenness_is_bounded(letters in prop::collection::vec(letter_strategy(), 0..12)) {
        let graph = GraphBuilder::new(GraphConfig::default()).build(&letters, "Vincent");
        let metrics = GraphMetrics::compute(&graph);
        for value in metrics.betweenness.values() {
            prop_assert!(*value >= 0.0);
            prop_assert!(*value <= 1.0 + 1e-9);
        }
        if graph.node_count() <= 2 {
            prop_assert!(metrics.betweenness.values().all(|v| *v == 0.0));
        }
    }

    #[test]
    fn one_subject_and_one_node_per_letter(letters in prop::collection::vec(letter_strategy(), 0..12)) {
        let graph = GraphBuilder::new(GraphConfig::default()).build(&letters, "Vincent");
        prop_assert_eq!(graph.nodes_in_tier(Tier::Subject).count(), 1);
        prop_assert_eq!(graph.nodes_in_tier(Tier::Letter).count(), letters.len());
    }

    #[test]
    fn ego_networks_grow_with_depth(letters in prop::collection::vec(letter_strategy(), 1..8), depth in 1usize..4) {
        let graph = GraphBuilder::new(GraphConfig::default()).build(&letters, "Vincent");
        let inner = ego_network(&graph, "person:Vincent", depth).unwrap();
        let outer = ego_network(&graph, "person:Vincent", depth + 1).unwrap();
        prop_assert!(inner.node_count() <= outer.node_count());
        for node in inner.nodes() {
            prop_assert!(outer.node(&node.id).is_some());
        }
    }
}
