//! Viterbi search properties on random lattices.

use nusfont::lattice::{CostNode, NodeRef, RouteBuilder, ViterbiLattice, WaveUnit};
use proptest::prelude::*;

/// Clusters of `(sample offset, target cost)` candidates.
fn lattice_strategy() -> impl Strategy<Value = Vec<Vec<(i64, f32)>>> {
    prop::collection::vec(
        prop::collection::vec((0i64..50, 0.0f32..10.0), 1..5),
        1..6,
    )
}

fn build(clusters: &[Vec<(i64, f32)>], join: f32) -> ViterbiLattice {
    let mut lattice = ViterbiLattice::new();
    for (c, nodes) in clusters.iter().enumerate() {
        lattice.add_cluster(join).unwrap();
        for &(offset, target) in nodes {
            let node = CostNode::new(WaveUnit::new(offset * 10, 10), target, target);
            lattice.add_node(c, node).unwrap();
        }
    }
    lattice
}

/// Cheapest total cost over every path, by brute force.
fn brute_force(lattice: &ViterbiLattice) -> f32 {
    let clusters = lattice.clusters();
    let mut best = f32::INFINITY;
    let mut path = vec![0usize; clusters.len()];
    loop {
        let mut cost = 0.0f32;
        for (c, &i) in path.iter().enumerate() {
            let node = &clusters[c].nodes()[i];
            cost += node.target_cost;
            if c > 0 {
                let prev = &clusters[c - 1].nodes()[path[c - 1]];
                if !prev.precedes(node) {
                    cost += clusters[c].concat_cost;
                }
            }
        }
        best = best.min(cost);

        // Odometer increment
        let mut c = 0;
        loop {
            if c == path.len() {
                return best;
            }
            path[c] += 1;
            if path[c] < clusters[c].len() {
                break;
            }
            path[c] = 0;
            c += 1;
        }
    }
}

proptest! {
    /// The best route's cost equals the brute-force minimum.
    #[test]
    fn prop_search_finds_the_minimum(clusters in lattice_strategy(), join in 0.0f32..5.0) {
        let mut lattice = build(&clusters, join);
        lattice.search_contiguous().unwrap();

        let best = lattice.best_route().unwrap();
        let last = *best.nodes().last().unwrap();
        let found = lattice.node(last).unwrap().route_cost;
        let expected = brute_force(&lattice);
        prop_assert!((found - expected).abs() < 1e-3, "found {} expected {}", found, expected);
    }

    /// The best route visits every cluster once, in order.
    #[test]
    fn prop_best_route_is_well_formed(clusters in lattice_strategy(), join in 0.0f32..5.0) {
        let mut lattice = build(&clusters, join);
        lattice.search_contiguous().unwrap();
        let best = lattice.best_route().unwrap();

        prop_assert_eq!(best.nodes().len(), clusters.len());
        for (c, n) in best.nodes().iter().enumerate() {
            prop_assert_eq!(n.cluster, c);
            prop_assert!(lattice.node(*n).is_some());
        }
        // The search's own best route is always a legal route
        prop_assert!(lattice.add_route(best).is_ok());
    }

    /// Routes collected last-position-first come out first-position-first.
    #[test]
    fn prop_route_builder_reverses(indices in prop::collection::vec(0usize..10, 0..12)) {
        let mut builder = RouteBuilder::default();
        for (c, &index) in indices.iter().enumerate().rev() {
            builder.push(NodeRef { cluster: c, index });
        }
        let route = builder.finish();
        let clusters: Vec<usize> = route.nodes().iter().map(|n| n.cluster).collect();
        prop_assert_eq!(clusters, (0..indices.len()).collect::<Vec<_>>());
        let order: Vec<usize> = route.nodes().iter().map(|n| n.index).collect();
        prop_assert_eq!(order, indices);
    }
}
