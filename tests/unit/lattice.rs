//! Viterbi lattice lifecycle and search tests.

use nusfont::lattice::{
    CostNode, LatticeError, LatticeState, NodeRef, NodeRoute, RouteBuilder, ViterbiLattice,
    WaveUnit, SILENCE_OFFSET,
};

fn node(offset: i64, len: u32, target: f32) -> CostNode {
    CostNode::new(WaveUnit::new(offset, len), target, target)
}

fn at(cluster: usize, index: usize) -> NodeRef {
    NodeRef { cluster, index }
}

/// Three positions; the cheap-target path is not contiguous, the contiguous
/// path is.
fn three_positions(join: f32) -> ViterbiLattice {
    let mut lattice = ViterbiLattice::new();
    for _ in 0..3 {
        lattice.add_cluster(join).unwrap();
    }
    // Contiguous run 0..100, 100..200, 200..300
    lattice.add_node(0, node(0, 100, 1.0)).unwrap();
    lattice.add_node(1, node(100, 100, 1.0)).unwrap();
    lattice.add_node(2, node(200, 100, 1.0)).unwrap();
    // Scattered alternatives with lower target cost
    lattice.add_node(0, node(5000, 100, 0.5)).unwrap();
    lattice.add_node(1, node(9000, 100, 0.5)).unwrap();
    lattice.add_node(2, node(SILENCE_OFFSET, 0, 0.5)).unwrap();
    lattice
}

// ============================================================================
// LIFECYCLE
// ============================================================================

#[test]
fn test_lifecycle_states() {
    let mut lattice = three_positions(1.0);
    assert_eq!(lattice.state(), LatticeState::Populated);

    let r = lattice
        .add_route(NodeRoute::new(vec![at(0, 0), at(1, 0), at(2, 0)]))
        .unwrap();
    lattice.show_routes(&[r]).unwrap();
    assert_eq!(lattice.state(), LatticeState::Filtered);

    lattice.select_route(r).unwrap();
    assert_eq!(lattice.state(), LatticeState::Selected);
    assert_eq!(lattice.selected_route(), Some(r));

    // Re-filtering drops the selection
    lattice.show_routes(&[]).unwrap();
    assert_eq!(lattice.state(), LatticeState::Filtered);
    assert_eq!(lattice.selected_route(), None);
}

#[test]
fn test_empty_lattice_cannot_filter_or_select() {
    let mut lattice = ViterbiLattice::new();
    assert_eq!(lattice.state(), LatticeState::Unbuilt);
    assert!(matches!(
        lattice.show_all_routes(),
        Err(LatticeError::InvalidTransition { state: LatticeState::Unbuilt, .. })
    ));
    assert!(matches!(
        lattice.select_route(0),
        Err(LatticeError::InvalidTransition { .. })
    ));
    assert!(lattice.search_contiguous().is_err());
}

#[test]
fn test_structure_is_frozen_after_filtering() {
    let mut lattice = three_positions(1.0);
    lattice.show_all_routes().unwrap();

    assert!(matches!(
        lattice.add_cluster(0.0),
        Err(LatticeError::InvalidTransition { .. })
    ));
    assert!(lattice.add_node(0, node(42, 1, 0.0)).is_err());
    assert!(lattice
        .add_route(NodeRoute::new(vec![at(0, 0), at(1, 0), at(2, 0)]))
        .is_err());
}

#[test]
fn test_hidden_route_cannot_be_selected() {
    let mut lattice = three_positions(1.0);
    let a = lattice
        .add_route(NodeRoute::new(vec![at(0, 0), at(1, 0), at(2, 0)]))
        .unwrap();
    let b = lattice
        .add_route(NodeRoute::new(vec![at(0, 1), at(1, 1), at(2, 1)]))
        .unwrap();
    lattice.show_routes(&[a]).unwrap();

    assert_eq!(lattice.select_route(b), Err(LatticeError::HiddenRoute(b)));
    assert_eq!(lattice.select_route(7), Err(LatticeError::UnknownRoute(7)));
    assert_eq!(lattice.find_route(at(1, 1)), None);
    assert_eq!(lattice.find_route(at(1, 0)), Some(a));
    assert_eq!(lattice.route_index(&[at(0, 1), at(1, 1), at(2, 1)]), Some(b));
}

#[test]
fn test_route_with_unknown_node_is_rejected() {
    let mut lattice = three_positions(1.0);
    assert_eq!(
        lattice.add_route(NodeRoute::new(vec![at(0, 0), at(1, 9), at(2, 0)])),
        Err(LatticeError::UnknownNode { cluster: 1, index: 9 })
    );
    assert!(matches!(
        lattice.add_route(NodeRoute::new(vec![at(0, 0), at(1, 0)])),
        Err(LatticeError::RouteShape { nodes: 2, clusters: 3 })
    ));
}

#[test]
fn test_node_for_unknown_cluster() {
    let mut lattice = ViterbiLattice::new();
    assert_eq!(
        lattice.add_node(0, node(0, 1, 0.0)),
        Err(LatticeError::UnknownCluster(0))
    );
}

// ============================================================================
// CLUSTERS
// ============================================================================

#[test]
fn test_cluster_tracks_cheapest_node() {
    let lattice = three_positions(1.0);
    let cluster = &lattice.clusters()[0];
    assert_eq!(cluster.len(), 2);
    assert_eq!(cluster.best_node_index(), Some(1));
    assert_eq!(cluster.best_node().unwrap().wave_unit.sample_offset, 5000);
    assert_eq!(cluster.index_of(0), Some(0));
}

#[test]
fn test_duplicate_sample_offsets_are_one_node() {
    let mut lattice = three_positions(1.0);
    assert!(!lattice.add_node(0, node(0, 100, 0.0)).unwrap());
    assert_eq!(lattice.clusters()[0].len(), 2);
}

#[test]
fn test_precedes_is_pure_range_arithmetic() {
    assert!(node(0, 100, 0.0).precedes(&node(100, 5, 0.0)));
    assert!(!node(100, 5, 0.0).precedes(&node(0, 100, 0.0)));
    // A silence unit of length 1 ends at sample 0
    assert!(node(SILENCE_OFFSET, 1, 0.0).precedes(&node(0, 10, 0.0)));
    assert!(!node(SILENCE_OFFSET, 0, 0.0).precedes(&node(0, 10, 0.0)));
}

// ============================================================================
// SEARCH
// ============================================================================

/// With a high join cost the contiguous path wins despite higher targets.
#[test]
fn test_search_prefers_contiguous_audio_when_joins_are_expensive() {
    let mut lattice = three_positions(10.0);
    lattice.search_contiguous().unwrap();

    let best = lattice.best_route().unwrap();
    assert_eq!(best.nodes(), &[at(0, 0), at(1, 0), at(2, 0)]);
    assert_eq!(lattice.node(at(2, 0)).unwrap().route_cost, 3.0);
}

/// With free joins the cheapest targets win.
#[test]
fn test_search_prefers_low_targets_when_joins_are_free() {
    let mut lattice = three_positions(0.0);
    lattice.search_contiguous().unwrap();

    let best = lattice.best_route().unwrap();
    assert_eq!(best.nodes(), &[at(0, 1), at(1, 1), at(2, 1)]);
    assert_eq!(lattice.node(at(2, 1)).unwrap().route_cost, 1.5);
}

#[test]
fn test_custom_concatenation_cost() {
    let mut lattice = three_positions(0.0);
    // Penalize every join into silence
    lattice
        .search(|_, next| if next.wave_unit.is_silence() { 100.0 } else { 0.0 })
        .unwrap();
    let best = lattice.best_route().unwrap();
    assert_eq!(best.nodes()[2], at(2, 0));
}

#[test]
fn test_best_route_of_empty_lattice() {
    assert_eq!(ViterbiLattice::new().best_route(), None);
}

// ============================================================================
// ROUTE BUILDER
// ============================================================================

#[test]
fn test_builder_reverses_into_output_order() {
    let mut builder = RouteBuilder::default();
    assert!(builder.is_empty());
    builder.push(at(2, 1));
    builder.push(at(1, 0));
    builder.push(at(0, 3));
    let route = builder.finish();
    assert_eq!(route.nodes(), &[at(0, 3), at(1, 0), at(2, 1)]);
    assert!(!route.visible);
}
