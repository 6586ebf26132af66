//! End-to-end oracle construction and queries through the public API.

mod common;

use hypeq_core::{DistanceOracle, Hypergraph, QueryKind, exact};
use hypeq_test_support::tracing::RecordingLayer;
use rstest::rstest;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;

use common::{chain, config, two_islands};

fn exact_graph(mut graph: Hypergraph, max_s: usize) -> Hypergraph {
    graph.compute_overlaps(max_s);
    graph
}

#[test]
fn populate_records_span_and_summary() {
    let layer = RecordingLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());
    let oracle = tracing::subscriber::with_default(subscriber, || {
        let mut graph = chain();
        DistanceOracle::populate(&mut graph, &config(2, 2, 30))
    });

    let span = layer
        .span("core.oracle.populate")
        .expect("populate span must close");
    assert_eq!(span.field("edges"), Some("3"));
    assert_eq!(span.field("max_s"), Some("2"));
    assert_eq!(span.field("budget"), Some("90"));
    assert!(layer.span("core.landmarks.select_all").is_some());

    let summary = layer.events_with_message(Level::INFO, "oracle populated");
    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0].field("landmarks"), Some("3"));
    assert_eq!(oracle.num_landmarks(), 3);

    let warnings = layer.events_with_message(
        Level::WARN,
        "budget exceeds the largest reachable oracle size; assigning every component its size",
    );
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].field("budget"), Some("90"));
}

#[rstest]
#[case::hierarchical(false)]
#[case::baseline(true)]
fn known_bounds_contain_the_exact_distance(#[case] baseline: bool) {
    let mut graph = two_islands();
    let settings = config(2, 2, 30);
    let oracle = if baseline {
        DistanceOracle::populate_baseline(&mut graph, &settings)
    } else {
        DistanceOracle::populate(&mut graph, &settings)
    };
    let truth = exact_graph(two_islands(), 2);

    for s in 1..=2 {
        for first in 0..truth.num_edges() {
            for second in 0..truth.num_edges() {
                let bounds = oracle.edge_bounds(first, second, s);
                match exact::edge_distance(&truth, first, second, s) {
                    Some(distance) if bounds.is_known() => assert!(
                        bounds.contains(f64::from(distance)),
                        "s={s} ({first}, {second}): {bounds:?} misses {distance}"
                    ),
                    Some(_) => {}
                    None => assert!(!bounds.is_known(), "s={s} ({first}, {second})"),
                }
            }
        }
    }
}

#[test]
fn islands_are_unreachable_from_each_other() {
    let mut graph = two_islands();
    let oracle = DistanceOracle::populate(&mut graph, &config(2, 2, 30));

    let profile = oracle
        .distance_profile(&graph, 0, 5, QueryKind::Edge)
        .expect("both hyperedges exist");
    assert!(profile.is_empty());
    assert_eq!(profile.distance(1), -1.0);

    let reachable = oracle
        .reachable_profile(&graph, 0, QueryKind::Edge)
        .expect("source exists");
    assert_eq!(reachable.size(1), 3);
    assert!(reachable.entries().iter().all(|entry| entry.element < 4));
}

#[test]
fn labelled_chain_matches_exact_rankings() {
    let mut graph = chain();
    let oracle = DistanceOracle::populate(&mut graph, &config(2, 2, 30));
    let truth = exact_graph(chain(), 2);

    let ranked: Vec<usize> = oracle
        .reachable_profile(&graph, 0, QueryKind::Edge)
        .expect("source exists")
        .top_k(2, None)
        .iter()
        .map(|entry| entry.element)
        .collect();
    let expected: Vec<usize> = exact::top_k_reachable(&truth, 0, 1, 2, QueryKind::Edge, None)
        .expect("source exists")
        .into_iter()
        .flatten()
        .collect();
    assert_eq!(ranked, expected);

    let approx = oracle
        .centrality(&graph, 1, 1, QueryKind::Edge)
        .expect("hyperedge exists");
    let real = exact::centrality(&truth, 1, 1, QueryKind::Edge).expect("hyperedge exists");
    assert!((approx - real).abs() < 1e-9);
}

#[rstest]
#[case::edges(QueryKind::Edge)]
#[case::vertices(QueryKind::Vertex)]
#[case::mixed(QueryKind::Both)]
fn sampled_pairs_are_answerable(#[case] kind: QueryKind) {
    let mut graph = two_islands();
    let oracle = DistanceOracle::populate(&mut graph, &config(2, 2, 30));
    let pairs = oracle.sample_query_pairs(&graph, 4, 7, kind);
    assert!(!pairs.is_empty());

    let profiles = oracle
        .distance_profiles(&graph, &pairs, kind)
        .expect("sampled elements exist");
    assert_eq!(profiles.len(), pairs.len());
    assert!(profiles.iter().all(|profile| profile.bounds(1).is_some()));
}
