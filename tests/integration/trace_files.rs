//! Selection traces read from disk.

use nusfont::lattice::{parse_trace_file, LatticeState, NodeRef, TraceError};
use tempfile::TempDir;

/// Three output positions. Route 0 is the contiguous run, route 1 detours
/// through silence, and the selection block picks route 1.
pub const TRACE: &str = "\
# sentence 0042
<Header>
voice demo
</Header>
<UnitVector>
0 0.0
1 2.5
2 2.5
</UnitVector>
<CandidateDump>
0 1000 200 0.8 0.8 -1
0 7000 150 0.3 0.3 -1
1 1200 180 0.9 1.7 0
1 -1 0 0.1 2.9 1
2 1380 220 1.0 2.7 0
2 9100 200 0.2 4.4 0
</CandidateDump>
<RouteDump>
0 2 1380
0 1 1200
0 0 1000
1 2 9100
1 1 -1
1 0 7000
</RouteDump>
<WaveUnitSel>
2 9100
1 -1
0 7000
</WaveUnitSel>
";

fn write_trace(dir: &TempDir, name: &str, text: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, text).unwrap();
    path
}

#[test]
fn test_trace_file_populates_lattice() {
    let dir = TempDir::new().unwrap();
    let lattice = parse_trace_file(write_trace(&dir, "s.trace", TRACE)).unwrap();

    assert_eq!(lattice.clusters().len(), 3);
    assert_eq!(lattice.clusters()[1].concat_cost, 2.5);
    assert!(lattice.clusters().iter().all(|c| c.len() == 2));
    assert_eq!(lattice.routes().len(), 2);

    let contiguous = lattice.routes()[0].nodes();
    assert_eq!(
        contiguous,
        &[
            NodeRef { cluster: 0, index: 0 },
            NodeRef { cluster: 1, index: 0 },
            NodeRef { cluster: 2, index: 0 },
        ]
    );
}

#[test]
fn test_trace_selection_is_applied() {
    let dir = TempDir::new().unwrap();
    let lattice = parse_trace_file(write_trace(&dir, "s.trace", TRACE)).unwrap();

    assert_eq!(lattice.state(), LatticeState::Selected);
    assert_eq!(lattice.selected_route(), Some(1));
    assert!(lattice.routes().iter().all(|r| r.visible));
}

/// The dumped back-pointers reconstruct the cheapest route.
#[test]
fn test_dumped_costs_give_best_route() {
    let dir = TempDir::new().unwrap();
    let lattice = parse_trace_file(write_trace(&dir, "s.trace", TRACE)).unwrap();
    let best = lattice.best_route().unwrap();
    assert_eq!(lattice.route_index(best.nodes()), Some(0));
}

/// Re-running the search agrees with the costs the trace recorded.
#[test]
fn test_search_reproduces_dumped_costs() {
    let dir = TempDir::new().unwrap();
    let mut lattice = parse_trace_file(write_trace(&dir, "s.trace", TRACE)).unwrap();
    lattice.search_contiguous().unwrap();

    let last = &lattice.clusters()[2];
    assert!((last.nodes()[0].route_cost - 2.7).abs() < 1e-5);
    assert_eq!(last.best_node_index(), Some(0));
}

#[test]
fn test_trace_without_routes() {
    let text = "<UnitVector>\n0 0.0\n</UnitVector>\n<CandidateDump>\n0 10 10 1.0 1.0 -1\n</CandidateDump>\n";
    let dir = TempDir::new().unwrap();
    let lattice = parse_trace_file(write_trace(&dir, "short.trace", text)).unwrap();
    assert_eq!(lattice.state(), LatticeState::Populated);
    assert!(lattice.routes().is_empty());
    assert_eq!(lattice.best_route().unwrap().nodes().len(), 1);
}

#[test]
fn test_missing_trace_file() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        parse_trace_file(dir.path().join("absent.trace")),
        Err(TraceError::Io(_))
    ));
}

#[test]
fn test_route_through_unknown_candidate() {
    let text = TRACE.replace("1 1 -1\n", "1 1 4242\n");
    let dir = TempDir::new().unwrap();
    assert!(parse_trace_file(write_trace(&dir, "bad.trace", &text)).is_err());
}
