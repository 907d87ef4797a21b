// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! `nusfont trace`: load a selection trace and show its routes.

use nusfont::lattice::{parse_trace_file, LatticeState, NodeRoute, ViterbiLattice};

use super::display::{cost_value, row, section_bot, section_mid, section_top, themed, BOLD, CYAN, GRAY};

fn route_line(lattice: &ViterbiLattice, route: &NodeRoute) -> String {
    route
        .nodes()
        .iter()
        .filter_map(|&n| lattice.node(n))
        .map(|node| {
            if node.wave_unit.is_silence() {
                "sil".to_string()
            } else {
                node.wave_unit.sample_offset.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" → ")
}

fn route_cost(lattice: &ViterbiLattice, route: &NodeRoute) -> f32 {
    route
        .nodes()
        .last()
        .and_then(|&n| lattice.node(n))
        .map_or(0.0, |node| node.route_cost)
}

pub fn run_trace(path: &str, route: Option<usize>, search: bool) -> Result<(), String> {
    let mut lattice = parse_trace_file(path).map_err(|e| format!("{}: {}", path, e))?;

    if search {
        lattice.search_contiguous().map_err(|e| e.to_string())?;
    }
    if let Some(r) = route {
        if lattice.state() != LatticeState::Filtered && lattice.state() != LatticeState::Selected {
            lattice.show_all_routes().map_err(|e| e.to_string())?;
        }
        lattice.select_route(r).map_err(|e| e.to_string())?;
    }

    section_top("LATTICE");
    row(&format!(" clusters    {}", lattice.clusters().len()));
    row(&format!(
        " candidates  {}",
        lattice.clusters().iter().map(|c| c.len()).sum::<usize>()
    ));
    row(&format!(" routes      {}", lattice.routes().len()));
    row(&format!(" state       {}", lattice.state()));

    section_mid("BEST ROUTE");
    match lattice.best_route() {
        Some(best) => {
            row(&format!(" {}", route_line(&lattice, &best)));
            row(&format!(" cost {}", cost_value(route_cost(&lattice, &best))));
        }
        None => row(&themed(GRAY, &[], " (no complete back-pointer chain)")),
    }

    section_mid("ROUTES");
    for (i, r) in lattice.routes().iter().enumerate() {
        let marker = if lattice.selected_route() == Some(i) {
            themed(CYAN, &[BOLD], "▶")
        } else if r.visible {
            " ".to_string()
        } else {
            themed(GRAY, &[], "·")
        };
        row(&format!(
            " {} {:>3} {}  {}",
            marker,
            i,
            cost_value(route_cost(&lattice, r)),
            route_line(&lattice, r)
        ));
    }
    section_bot();
    Ok(())
}
