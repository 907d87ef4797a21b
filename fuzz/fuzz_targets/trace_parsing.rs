// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Selection trace parsing under arbitrary text.
//!
//! Traces come from other tools' debug dumps and are often hand-edited. Bad
//! numbers, unbalanced tags, and routes through missing candidates should
//! all come back as line-numbered errors.

#![no_main]

use libfuzzer_sys::fuzz_target;
use nusfont::lattice::parse_trace;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(mut lattice) = parse_trace(text) else {
        return;
    };

    // INVARIANT: every stored route visits each cluster once, in order
    for route in lattice.routes() {
        assert_eq!(route.nodes().len(), lattice.clusters().len());
        for (c, node) in route.nodes().iter().enumerate() {
            assert_eq!(node.cluster, c);
            assert!(lattice.node(*node).is_some());
        }
    }

    // Searching any parsed lattice is safe
    if lattice.search_contiguous().is_ok() {
        if let Some(best) = lattice.best_route() {
            assert_eq!(best.nodes().len(), lattice.clusters().len());
        }
    }
});
