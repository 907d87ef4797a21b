// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Viterbi cost lattice for unit-selection inspection.
//!
//! One [`CostNodeCluster`] per output position holds every candidate
//! [`CostNode`] for that position. A [`NodeRoute`] is a full path, one node
//! per cluster, stored in output order.
//!
//! The lattice moves through explicit states:
//!
//! ```text
//! Unbuilt ──add_node──▶ Populated ──show_routes──▶ Filtered ──select_route──▶ Selected
//!                          │  ▲                      ▲   │                     │
//!                          └──┘ add_node, add_route  │   └─────show_routes─────┘
//!                                                    └─────────show_routes─────┘
//! ```
//!
//! Each transition checks the current state and fails with
//! [`LatticeError::InvalidTransition`] instead of silently doing the wrong
//! thing. The only operation that never fails on bad input is adding a node
//! whose key is already in its cluster: that is a no-op.

mod trace;

pub use trace::{parse_trace, parse_trace_file, TraceError};

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

/// Sample offset that marks a silence unit.
pub const SILENCE_OFFSET: i64 = -1;

/// Errors from lattice transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LatticeError {
    #[error("cannot {op} while the lattice is {state}")]
    InvalidTransition { op: &'static str, state: LatticeState },

    #[error("no cluster {0}")]
    UnknownCluster(usize),

    #[error("cluster {cluster} has no node {index}")]
    UnknownNode { cluster: usize, index: usize },

    #[error("no route {0}")]
    UnknownRoute(usize),

    #[error("route {0} is not visible")]
    HiddenRoute(usize),

    #[error("route has {nodes} nodes for {clusters} clusters, or visits them out of order")]
    RouteShape { nodes: usize, clusters: usize },
}

/// Where the lattice is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatticeState {
    /// No nodes yet
    Unbuilt,
    /// Full lattice, routes may be added
    Populated,
    /// A subset of routes is visible
    Filtered,
    /// A visible route is selected
    Selected,
}

impl fmt::Display for LatticeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unbuilt => "unbuilt",
            Self::Populated => "populated",
            Self::Filtered => "filtered",
            Self::Selected => "selected",
        })
    }
}

// ============================================================================
// NODES
// ============================================================================

/// A span of recorded audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaveUnit {
    /// First sample, or [`SILENCE_OFFSET`]
    pub sample_offset: i64,
    pub sample_length: u32,
    pub features: Option<Vec<i32>>,
}

impl WaveUnit {
    pub fn new(sample_offset: i64, sample_length: u32) -> Self {
        Self {
            sample_offset,
            sample_length,
            features: None,
        }
    }

    pub fn is_silence(&self) -> bool {
        self.sample_offset == SILENCE_OFFSET
    }
}

/// One candidate for one output position.
#[derive(Debug, Clone, PartialEq)]
pub struct CostNode {
    pub wave_unit: WaveUnit,
    pub target_cost: f32,
    /// Best accumulated cost of any path ending here
    pub route_cost: f32,
    pub cluster_index: usize,
    /// Position within its cluster
    pub index: usize,
    /// Best predecessor in the previous cluster
    pub precede_node_index: Option<usize>,
}

impl CostNode {
    pub fn new(wave_unit: WaveUnit, target_cost: f32, route_cost: f32) -> Self {
        Self {
            wave_unit,
            target_cost,
            route_cost,
            cluster_index: 0,
            index: 0,
            precede_node_index: None,
        }
    }

    /// Identity within a cluster: two nodes with the same key are the same node.
    pub fn key(&self) -> i64 {
        self.wave_unit.sample_offset
    }

    /// Order by route cost, lower first.
    pub fn cmp_cost(&self, other: &Self) -> Ordering {
        self.route_cost.total_cmp(&other.route_cost)
    }

    /// True when this node's range ends exactly where `next` begins.
    ///
    /// Only the sample arithmetic is compared; silence units get no special
    /// treatment.
    pub fn precedes(&self, next: &CostNode) -> bool {
        self.wave_unit.sample_offset + i64::from(self.wave_unit.sample_length)
            == next.wave_unit.sample_offset
    }
}

/// Every candidate for one output position.
#[derive(Debug, Clone, Default)]
pub struct CostNodeCluster {
    nodes: Vec<CostNode>,
    by_key: HashMap<i64, usize>,
    best_node_index: Option<usize>,
    /// Concatenation cost into this cluster
    pub concat_cost: f32,
}

impl CostNodeCluster {
    pub fn new(concat_cost: f32) -> Self {
        Self {
            concat_cost,
            ..Self::default()
        }
    }

    /// Insert `node` unless its key is already present. Returns whether it
    /// was inserted.
    fn add_node(&mut self, cluster_index: usize, mut node: CostNode) -> bool {
        if self.by_key.contains_key(&node.key()) {
            return false;
        }
        let index = self.nodes.len();
        node.cluster_index = cluster_index;
        node.index = index;
        self.by_key.insert(node.key(), index);
        let better = self
            .best_node()
            .map_or(true, |best| node.cmp_cost(best) == Ordering::Less);
        if better {
            self.best_node_index = Some(index);
        }
        self.nodes.push(node);
        true
    }

    pub fn nodes(&self) -> &[CostNode] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> Option<&CostNode> {
        self.nodes.get(index)
    }

    pub fn index_of(&self, key: i64) -> Option<usize> {
        self.by_key.get(&key).copied()
    }

    pub fn best_node_index(&self) -> Option<usize> {
        self.best_node_index
    }

    pub fn best_node(&self) -> Option<&CostNode> {
        self.best_node_index.and_then(|i| self.nodes.get(i))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

// ============================================================================
// ROUTES
// ============================================================================

/// Coordinates of a node in the lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef {
    pub cluster: usize,
    pub index: usize,
}

/// A complete path, first output position first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRoute {
    nodes: Vec<NodeRef>,
    pub visible: bool,
}

impl NodeRoute {
    /// A route already in output order.
    pub fn new(nodes: Vec<NodeRef>) -> Self {
        Self { nodes, visible: false }
    }

    pub fn nodes(&self) -> &[NodeRef] {
        &self.nodes
    }

    pub fn contains(&self, node: NodeRef) -> bool {
        self.nodes.contains(&node)
    }
}

/// Collects a route in trace order (last output position first).
#[derive(Debug, Default)]
pub struct RouteBuilder {
    nodes: Vec<NodeRef>,
}

impl RouteBuilder {
    pub fn push(&mut self, node: NodeRef) {
        self.nodes.push(node);
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Reverse into output order.
    pub fn finish(mut self) -> NodeRoute {
        self.nodes.reverse();
        NodeRoute::new(self.nodes)
    }
}

// ============================================================================
// LATTICE
// ============================================================================

#[derive(Debug, Clone)]
pub struct ViterbiLattice {
    state: LatticeState,
    clusters: Vec<CostNodeCluster>,
    routes: Vec<NodeRoute>,
    selected: Option<usize>,
}

impl Default for ViterbiLattice {
    fn default() -> Self {
        Self::new()
    }
}

impl ViterbiLattice {
    pub fn new() -> Self {
        Self {
            state: LatticeState::Unbuilt,
            clusters: Vec::new(),
            routes: Vec::new(),
            selected: None,
        }
    }

    pub fn state(&self) -> LatticeState {
        self.state
    }

    pub fn clusters(&self) -> &[CostNodeCluster] {
        &self.clusters
    }

    pub fn routes(&self) -> &[NodeRoute] {
        &self.routes
    }

    pub fn selected_route(&self) -> Option<usize> {
        self.selected
    }

    pub fn node(&self, node: NodeRef) -> Option<&CostNode> {
        self.clusters.get(node.cluster)?.node(node.index)
    }

    fn expect_state(&self, op: &'static str, allowed: &[LatticeState]) -> Result<(), LatticeError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(LatticeError::InvalidTransition { op, state: self.state })
        }
    }

    /// Append an empty cluster. Returns its index.
    pub fn add_cluster(&mut self, concat_cost: f32) -> Result<usize, LatticeError> {
        self.expect_state("add a cluster", &[LatticeState::Unbuilt, LatticeState::Populated])?;
        self.clusters.push(CostNodeCluster::new(concat_cost));
        Ok(self.clusters.len() - 1)
    }

    /// Add a candidate to `cluster`. A node whose key is already there is
    /// ignored; the return value says whether this one was inserted.
    pub fn add_node(&mut self, cluster: usize, node: CostNode) -> Result<bool, LatticeError> {
        self.expect_state("add a node", &[LatticeState::Unbuilt, LatticeState::Populated])?;
        let target = self
            .clusters
            .get_mut(cluster)
            .ok_or(LatticeError::UnknownCluster(cluster))?;
        let inserted = target.add_node(cluster, node);
        self.state = LatticeState::Populated;
        Ok(inserted)
    }

    /// Register a complete route. Returns its index.
    pub fn add_route(&mut self, route: NodeRoute) -> Result<usize, LatticeError> {
        self.expect_state("add a route", &[LatticeState::Populated])?;
        let shape_ok = route.nodes.len() == self.clusters.len()
            && route.nodes.iter().enumerate().all(|(i, n)| n.cluster == i);
        if !shape_ok {
            return Err(LatticeError::RouteShape {
                nodes: route.nodes.len(),
                clusters: self.clusters.len(),
            });
        }
        if let Some(missing) = route.nodes.iter().find(|n| self.node(**n).is_none()) {
            return Err(LatticeError::UnknownNode {
                cluster: missing.cluster,
                index: missing.index,
            });
        }
        self.routes.push(route);
        Ok(self.routes.len() - 1)
    }

    /// Make exactly `visible` visible. Clears any selection.
    pub fn show_routes(&mut self, visible: &[usize]) -> Result<(), LatticeError> {
        self.expect_state(
            "show routes",
            &[LatticeState::Populated, LatticeState::Filtered, LatticeState::Selected],
        )?;
        if let Some(&bad) = visible.iter().find(|&&r| r >= self.routes.len()) {
            return Err(LatticeError::UnknownRoute(bad));
        }
        for route in &mut self.routes {
            route.visible = false;
        }
        for &r in visible {
            self.routes[r].visible = true;
        }
        self.selected = None;
        self.state = LatticeState::Filtered;
        Ok(())
    }

    /// Make every route visible.
    pub fn show_all_routes(&mut self) -> Result<(), LatticeError> {
        let all: Vec<usize> = (0..self.routes.len()).collect();
        self.show_routes(&all)
    }

    pub fn select_route(&mut self, route: usize) -> Result<(), LatticeError> {
        self.expect_state("select a route", &[LatticeState::Filtered, LatticeState::Selected])?;
        let r = self.routes.get(route).ok_or(LatticeError::UnknownRoute(route))?;
        if !r.visible {
            return Err(LatticeError::HiddenRoute(route));
        }
        self.selected = Some(route);
        self.state = LatticeState::Selected;
        Ok(())
    }

    /// First visible route through `node`.
    pub fn find_route(&self, node: NodeRef) -> Option<usize> {
        self.routes
            .iter()
            .position(|r| r.visible && r.contains(node))
    }

    /// Index of the route whose nodes are exactly `nodes`, visible or not.
    pub fn route_index(&self, nodes: &[NodeRef]) -> Option<usize> {
        self.routes.iter().position(|r| r.nodes == nodes)
    }

    /// Run the Viterbi recursion over the clusters.
    ///
    /// A node's route cost becomes its target cost plus the cheapest
    /// `predecessor.route_cost + concat_cost(predecessor, node)` over the
    /// previous cluster; first-cluster nodes cost their target cost alone.
    /// Back-pointers and each cluster's best node are updated in place.
    pub fn search<F>(&mut self, concat_cost: F) -> Result<(), LatticeError>
    where
        F: Fn(&CostNode, &CostNode) -> f32,
    {
        self.expect_state(
            "search",
            &[LatticeState::Populated, LatticeState::Filtered, LatticeState::Selected],
        )?;
        for c in 0..self.clusters.len() {
            let (done, rest) = self.clusters.split_at_mut(c);
            let prev = done.last();
            let cluster = &mut rest[0];
            for node in &mut cluster.nodes {
                let best_prev = prev.and_then(|p| {
                    p.nodes
                        .iter()
                        .map(|pn| (pn.index, pn.route_cost + concat_cost(pn, node)))
                        .min_by(|a, b| a.1.total_cmp(&b.1))
                });
                match best_prev {
                    Some((index, cost)) => {
                        node.precede_node_index = Some(index);
                        node.route_cost = node.target_cost + cost;
                    }
                    None => {
                        node.precede_node_index = None;
                        node.route_cost = node.target_cost;
                    }
                }
            }
            cluster.best_node_index = cluster
                .nodes
                .iter()
                .min_by(|a, b| a.cmp_cost(b))
                .map(|n| n.index);
        }
        log::debug!("viterbi search over {} clusters", self.clusters.len());
        Ok(())
    }

    /// [`search`](Self::search) with zero cost between contiguous audio and
    /// the next cluster's `concat_cost` otherwise.
    pub fn search_contiguous(&mut self) -> Result<(), LatticeError> {
        let joins: Vec<f32> = self.clusters.iter().map(|c| c.concat_cost).collect();
        self.search(|prev, next| {
            if prev.precedes(next) {
                0.0
            } else {
                joins[next.cluster_index]
            }
        })
    }

    /// Back-trace from the last cluster's best node.
    ///
    /// `None` when the lattice is empty or a back-pointer is missing.
    pub fn best_route(&self) -> Option<NodeRoute> {
        let last = self.clusters.len().checked_sub(1)?;
        let mut index = self.clusters[last].best_node_index?;
        let mut builder = RouteBuilder::default();
        for c in (0..=last).rev() {
            let node = self.clusters[c].node(index)?;
            builder.push(NodeRef { cluster: c, index });
            if c > 0 {
                index = node.precede_node_index?;
            }
        }
        Some(builder.finish())
    }
}
