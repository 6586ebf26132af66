//! Tests for oracle population and bounded queries.

use std::collections::HashMap;

use proptest::prelude::*;
use rstest::{fixture, rstest};

use crate::{
    components::ConnectedComponents,
    config::{LandmarkAssignment, LandmarkSelection, OracleConfig, OracleConfigBuilder, QueryKind},
    error::{HypeqErrorCode, HypergraphErrorCode},
    hypergraph::{EdgeId, Hypergraph},
    landmarks::LandmarkSelector,
    profile::DistanceBounds,
    rng::task_rng,
    test_utils::{chain_graph, hypergraph_fixture_strategy, suite_proptest_config},
};

use super::{DistanceOracle, SDistanceOracle, query::small_component_distance};

const STRATEGIES: [LandmarkSelection; 5] = [
    LandmarkSelection::Random,
    LandmarkSelection::Degree,
    LandmarkSelection::Farthest,
    LandmarkSelection::BestCover,
    LandmarkSelection::Betweenness,
];

fn config(lb: usize, num_landmarks: usize) -> OracleConfig {
    OracleConfigBuilder::new()
        .with_max_s(2)
        .with_lb(lb)
        .with_num_landmarks(num_landmarks)
        .build()
        .expect("test configuration is valid")
}

/// The chain with every hyperedge a landmark at threshold one.
#[fixture]
fn labelled_chain() -> (Hypergraph, DistanceOracle) {
    let mut graph = chain_graph();
    let oracle = DistanceOracle::populate(&mut graph, &config(2, 30));
    (graph, oracle)
}

/// The chain with a lower bound that leaves its only component unlabelled.
#[fixture]
fn unlabelled_chain() -> (Hypergraph, DistanceOracle) {
    let mut graph = chain_graph();
    let oracle = DistanceOracle::populate(&mut graph, &config(4, 30));
    (graph, oracle)
}

#[rstest]
#[case::adjacent(0, 1, 1.0)]
#[case::across(0, 2, 2.0)]
#[case::same(1, 1, 0.0)]
fn labelled_chain_distances_are_exact(
    labelled_chain: (Hypergraph, DistanceOracle),
    #[case] first: EdgeId,
    #[case] second: EdgeId,
    #[case] expected: f64,
) {
    let (_, oracle) = labelled_chain;
    let bounds = oracle.edge_bounds(first, second, 1);
    assert!(bounds.is_exact());
    assert_eq!(bounds.estimate, expected);
}

#[rstest]
fn different_components_are_unknown(labelled_chain: (Hypergraph, DistanceOracle)) {
    let (_, oracle) = labelled_chain;
    assert_eq!(oracle.edge_bounds(0, 1, 2), DistanceBounds::UNKNOWN);
    assert_eq!(oracle.edge_bounds(0, 1, 3), DistanceBounds::UNKNOWN);
    assert_eq!(oracle.edge_bounds(0, 1, 0), DistanceBounds::UNKNOWN);
}

#[rstest]
fn small_components_use_the_pattern_estimate(unlabelled_chain: (Hypergraph, DistanceOracle)) {
    let (graph, oracle) = unlabelled_chain;
    assert_eq!(oracle.num_landmarks(), 0);
    let bounds = oracle.edge_bounds(0, 2, 1);
    assert_eq!(bounds.as_triple(), (1.0, 3.0, small_component_distance(3)));
    assert_eq!(oracle.edge_bounds(2, 2, 1), DistanceBounds::exact(0.0));
    assert_eq!(oracle.vertex_bounds(&graph, 1, 7, 1), bounds);
}

#[rstest]
#[case::single(1, 0.0)]
#[case::pair(2, 1.0)]
#[case::triangle(3, 1.15)]
#[case::large(40, 9.4 / 7.0)]
fn pattern_estimates_grow_with_the_component(#[case] size: usize, #[case] expected: f64) {
    assert!((small_component_distance(size) - expected).abs() < 1e-9);
}

#[rstest]
fn vertices_sharing_a_hyperedge_are_one_apart(labelled_chain: (Hypergraph, DistanceOracle)) {
    let (graph, oracle) = labelled_chain;
    assert_eq!(oracle.vertex_bounds(&graph, 1, 3, 1), DistanceBounds::exact(1.0));
    assert_eq!(oracle.vertex_bounds(&graph, 4, 4, 1), DistanceBounds::exact(0.0));
    assert_eq!(oracle.vertex_bounds(&graph, 1, 7, 1), DistanceBounds::exact(2.0));
    assert_eq!(oracle.vertex_bounds(&graph, 1, 7, 2), DistanceBounds::UNKNOWN);
}

#[rstest]
fn vertex_to_edge_bounds_take_the_closest_hyperedge(labelled_chain: (Hypergraph, DistanceOracle)) {
    let (graph, oracle) = labelled_chain;
    assert_eq!(oracle.vertex_edge_bounds(&graph, 3, 1, 1), DistanceBounds::exact(0.0));
    assert_eq!(oracle.vertex_edge_bounds(&graph, 1, 2, 1), DistanceBounds::exact(2.0));
}

#[rstest]
fn profiles_keep_only_known_levels(labelled_chain: (Hypergraph, DistanceOracle)) {
    let (graph, oracle) = labelled_chain;
    let profile = oracle
        .distance_profile(&graph, 0, 2, QueryKind::Edge)
        .expect("edges exist");
    assert_eq!(profile.len(), 1);
    assert_eq!(profile.distance(1), 2.0);
    assert!(profile.bounds(2).is_none());

    let profiles = oracle
        .distance_profiles(&graph, &[(1, 1), (5, 2)], QueryKind::Both)
        .expect("elements exist");
    assert_eq!(profiles[0].distance(1), 1.0);
    assert_eq!(profiles[1].distance(1), 0.0);
}

#[rstest]
#[case::edge(QueryKind::Edge, 0, 9, HypergraphErrorCode::UnknownEdge)]
#[case::vertex(QueryKind::Vertex, 1, 99, HypergraphErrorCode::UnknownVertex)]
#[case::vertex_end(QueryKind::Both, 99, 0, HypergraphErrorCode::UnknownVertex)]
fn unknown_elements_are_rejected(
    labelled_chain: (Hypergraph, DistanceOracle),
    #[case] kind: QueryKind,
    #[case] first: usize,
    #[case] second: usize,
    #[case] expected: HypergraphErrorCode,
) {
    let (graph, oracle) = labelled_chain;
    let err = oracle
        .distance_profile(&graph, first, second, kind)
        .expect_err("element is unknown");
    assert_eq!(err.code(), HypeqErrorCode::HypergraphFailure);
    assert_eq!(err.hypergraph_code(), Some(expected));
}

#[test]
fn populate_is_deterministic() {
    let config = OracleConfigBuilder::new()
        .with_max_s(3)
        .with_lb(1)
        .with_num_landmarks(1)
        .with_landmark_selection(LandmarkSelection::BestCover)
        .build()
        .expect("test configuration is valid");
    let mut first = chain_graph();
    let mut second = chain_graph();
    assert_eq!(
        DistanceOracle::populate(&mut first, &config),
        DistanceOracle::populate(&mut second, &config)
    );
}

#[test]
fn per_level_population_labels_each_level_separately() {
    let mut graph = chain_graph();
    let oracle =
        DistanceOracle::populate_per_level(&mut graph, &config(2, 30)).expect("importance is valid");
    let expected: Vec<&[EdgeId]> = vec![&[0, 1, 2], &[]];
    assert_eq!(oracle.all_landmarks(), expected);
    assert_eq!(oracle.edge_bounds(0, 2, 1), DistanceBounds::exact(2.0));
    assert!(oracle.components().is_some());
}

#[test]
fn per_level_population_rejects_oversized_importance() {
    let config = OracleConfigBuilder::new()
        .with_landmark_assignment(LandmarkAssignment::Ranking)
        .with_importance(0.9, 0.6)
        .build()
        .expect("ranking accepts any non-negative importance");
    let mut graph = chain_graph();
    let err = DistanceOracle::populate_per_level(&mut graph, &config)
        .expect_err("alpha plus half of beta exceeds one");
    assert_eq!(err.code(), HypeqErrorCode::InvalidImportance);
}

#[test]
fn baseline_population_stops_at_the_budget() {
    let mut graph = chain_graph();
    let oracle = DistanceOracle::populate_baseline(&mut graph, &config(2, 1));
    let expected: Vec<&[EdgeId]> = vec![&[1], &[]];
    assert_eq!(oracle.all_landmarks(), expected);
    assert!(oracle.components().is_none());
    assert_eq!(oracle.component_struct_size(), 0);
    assert_eq!(oracle.oracle_size(), 3);
    assert_eq!(oracle.edge_bounds(0, 2, 1).as_triple(), (1.0, 2.0, 1.5));
    assert_eq!(oracle.edge_bounds(0, 0, 1), DistanceBounds::exact(0.0));
    assert_eq!(oracle.edge_bounds(0, 0, 2), DistanceBounds::UNKNOWN);
}

/// The chain with only its degree landmark, the middle hyperedge, at
/// threshold one.
#[fixture]
fn middle_landmark_chain() -> (Hypergraph, DistanceOracle) {
    let mut graph = chain_graph();
    graph.compute_overlaps(2);
    let selector = LandmarkSelector::new(&graph, LandmarkSelection::Degree, 0.4);
    let chosen = selector.select(&[0, 1, 2], 1, 0, 1, &mut task_rng(4, &[0]));
    let oracle = DistanceOracle {
        oracles: vec![
            SDistanceOracle::from_landmarks(&graph, 1, &chosen),
            SDistanceOracle::empty(&graph, 2),
        ],
        components: Some(ConnectedComponents::discover(&graph, 2)),
        lb: 2,
    };
    (graph, oracle)
}

#[rstest]
#[case::to_landmark(0, 1, (1.0, 1.0, 1.0))]
#[case::from_landmark(1, 2, (1.0, 1.0, 1.0))]
#[case::across_landmark(0, 2, (1.0, 2.0, 1.5))]
#[case::reversed(2, 0, (1.0, 2.0, 1.5))]
fn single_landmark_bounds_straddle_the_distance(
    middle_landmark_chain: (Hypergraph, DistanceOracle),
    #[case] first: EdgeId,
    #[case] second: EdgeId,
    #[case] expected: (f64, f64, f64),
) {
    let (_, oracle) = middle_landmark_chain;
    let all: Vec<&[EdgeId]> = vec![&[1], &[]];
    assert_eq!(oracle.all_landmarks(), all);
    assert_eq!(oracle.edge_bounds(first, second, 1).as_triple(), expected);
    assert_eq!(oracle.edge_bounds(first, second, 2), DistanceBounds::UNKNOWN);
}

#[rstest]
fn reachable_edges_exclude_the_source(labelled_chain: (Hypergraph, DistanceOracle)) {
    let (graph, oracle) = labelled_chain;
    let profile = oracle
        .reachable_profile(&graph, 0, QueryKind::Edge)
        .expect("edge exists");
    assert_eq!(profile.size(1), 2);
    assert_eq!(profile.size(2), 2);
    assert!(profile.entries().iter().all(|entry| entry.s == 1));
    let reached: Vec<(usize, f64)> = profile
        .entries()
        .iter()
        .map(|entry| (entry.element, entry.bounds.estimate))
        .collect();
    assert_eq!(reached, vec![(1, 1.0), (2, 2.0)]);
}

#[rstest]
fn reachable_vertices_project_hyperedge_bounds(labelled_chain: (Hypergraph, DistanceOracle)) {
    let (graph, oracle) = labelled_chain;
    let profile = oracle
        .reachable_profile(&graph, 1, QueryKind::Vertex)
        .expect("vertex exists");
    let estimates: HashMap<usize, f64> = profile
        .entries()
        .iter()
        .map(|entry| (entry.element, entry.bounds.estimate))
        .collect();
    assert!(!estimates.contains_key(&1));
    assert_eq!(estimates.get(&2), Some(&1.0));
    assert_eq!(estimates.get(&5), Some(&1.0));
    assert_eq!(estimates.get(&7), Some(&2.0));

    let edges = oracle
        .reachable_profile(&graph, 3, QueryKind::Both)
        .expect("vertex exists");
    assert_eq!(edges.size(1), 3);
}

#[rstest]
#[case::middle(QueryKind::Edge, 1, 1.0)]
#[case::end(QueryKind::Edge, 0, 2.0 / 3.0)]
#[case::shared_vertex(QueryKind::Vertex, 3, 1.0)]
#[case::end_vertex(QueryKind::Vertex, 7, 2.0 / 3.0)]
fn centrality_is_inverse_mean_landmark_distance(
    labelled_chain: (Hypergraph, DistanceOracle),
    #[case] kind: QueryKind,
    #[case] element: usize,
    #[case] expected: f64,
) {
    let (graph, oracle) = labelled_chain;
    let score = oracle.centrality(&graph, element, 1, kind).expect("element exists");
    assert!((score - expected).abs() < 1e-9);
    assert_eq!(oracle.centrality(&graph, element, 2, kind).expect("element exists"), 0.0);
}

#[rstest]
fn unlabelled_centrality_uses_the_pattern_estimate(unlabelled_chain: (Hypergraph, DistanceOracle)) {
    let (graph, oracle) = unlabelled_chain;
    let score = oracle.centrality(&graph, 0, 1, QueryKind::Edge).expect("edge exists");
    assert!((score - 1.0 / small_component_distance(3)).abs() < 1e-9);
}

#[rstest]
fn edge_samples_stay_inside_components(labelled_chain: (Hypergraph, DistanceOracle)) {
    let (graph, oracle) = labelled_chain;
    let pairs = oracle.sample_query_pairs(&graph, 10, 7, QueryKind::Edge);
    assert_eq!(pairs, vec![(0, 1), (0, 2), (1, 2)]);
    assert_eq!(oracle.sample_query_pairs(&graph, 2, 7, QueryKind::Edge).len(), 2);
}

#[rstest]
fn vertex_samples_use_vertices_of_the_graph(labelled_chain: (Hypergraph, DistanceOracle)) {
    let (graph, oracle) = labelled_chain;
    let pairs = oracle.sample_query_pairs(&graph, 10, 7, QueryKind::Vertex);
    assert!(!pairs.is_empty());
    for (u, v) in pairs {
        assert!(graph.check_vertex(u32::try_from(u).expect("vertex fits")).is_ok());
        assert!(graph.check_vertex(u32::try_from(v).expect("vertex fits")).is_ok());
        assert_ne!(u, v);
    }
}

#[test]
fn baseline_sampling_recomputes_components() {
    let mut graph = chain_graph();
    let oracle = DistanceOracle::populate_baseline(&mut graph, &config(2, 1));
    let pairs = oracle.sample_query_pairs(&graph, 10, 7, QueryKind::Edge);
    assert_eq!(pairs, vec![(0, 1), (0, 2), (1, 2)]);
}

/// Exact s-distances between every reachable pair of hyperedges.
fn exact_distances(edges: &[Vec<u32>], max_s: usize) -> HashMap<(usize, EdgeId, EdgeId), u32> {
    let mut graph = Hypergraph::from_edges(edges.to_vec()).expect("generated edges are non-empty");
    graph.compute_overlaps(max_s);
    let mut distances = HashMap::new();
    for s in 1..=max_s {
        for source in graph.edges_with_min_size(s) {
            for (target, distance) in graph.distances_from(source, s) {
                distances.insert((s, source, target), distance);
            }
        }
    }
    distances
}

fn assert_sound(
    oracle: &DistanceOracle,
    truth: &HashMap<(usize, EdgeId, EdgeId), u32>,
    num_edges: usize,
    max_s: usize,
) -> Result<(), TestCaseError> {
    for s in 1..=max_s {
        for first in 0..num_edges {
            for second in 0..num_edges {
                let bounds = oracle.edge_bounds(first, second, s);
                if !bounds.is_known() {
                    continue;
                }
                let distance = truth.get(&(s, first, second));
                prop_assert!(distance.is_some(), "bounds for unreachable pair ({first}, {second}) at {s}");
                let distance = f64::from(*distance.expect("checked above"));
                prop_assert!(bounds.contains(distance), "{bounds:?} misses {distance}");
            }
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(suite_proptest_config(48))]

    #[test]
    fn bounds_contain_the_exact_distance(
        fixture in hypergraph_fixture_strategy(),
        max_s in 1_usize..4,
        lb in 0_usize..4,
        num_landmarks in 1_usize..6,
        strategy in 0_usize..STRATEGIES.len(),
    ) {
        let config = OracleConfigBuilder::new()
            .with_max_s(max_s)
            .with_lb(lb)
            .with_num_landmarks(num_landmarks)
            .with_landmark_selection(STRATEGIES[strategy])
            .build()
            .expect("test configuration is valid");
        let truth = exact_distances(&fixture.edges, max_s);
        let mut graph = fixture.graph();
        let oracle = DistanceOracle::populate(&mut graph, &config);
        assert_sound(&oracle, &truth, graph.num_edges(), max_s)?;

        let mut graph = fixture.graph();
        let baseline = DistanceOracle::populate_baseline(&mut graph, &config);
        assert_sound(&baseline, &truth, graph.num_edges(), max_s)?;
    }

    #[test]
    fn lazy_and_eager_indices_build_the_same_oracle(
        fixture in hypergraph_fixture_strategy(),
        max_s in 1_usize..4,
        lb in 0_usize..4,
    ) {
        let lazy = OracleConfigBuilder::new()
            .with_max_s(max_s)
            .with_lb(lb)
            .with_num_landmarks(2)
            .build()
            .expect("test configuration is valid");
        let eager = OracleConfigBuilder::new()
            .with_max_s(max_s)
            .with_lb(lb)
            .with_num_landmarks(2)
            .with_precomputed_neighbours(true)
            .build()
            .expect("test configuration is valid");
        let mut first = fixture.graph();
        let mut second = fixture.graph();
        prop_assert_eq!(
            DistanceOracle::populate(&mut first, &lazy),
            DistanceOracle::populate(&mut second, &eager)
        );
    }
}
