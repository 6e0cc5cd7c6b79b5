use rag_deadlock::domain::cycles::Cycle;
use rag_deadlock::domain::edge::Edge;

pub fn edges(pairs: &[(&str, &str)]) -> Vec<Edge> {
    pairs.iter().map(|&p| Edge::from(p)).collect()
}

/// P1 requests R1, which is held by P2, ... P3 requests R1 again.
pub fn classic_deadlock() -> Vec<Edge> {
    edges(&[
        ("P1", "R1"),
        ("R1", "P2"),
        ("P2", "R2"),
        ("R2", "P3"),
        ("P3", "R1"),
    ])
}

pub fn acyclic_chain() -> Vec<Edge> {
    edges(&[("P1", "R1"), ("R1", "P2"), ("P2", "R3")])
}

/// Two vertex-disjoint cycles plus a dangling request.
pub fn two_disjoint_cycles() -> Vec<Edge> {
    edges(&[
        ("P1", "R1"),
        ("R1", "P1"),
        ("P2", "R2"),
        ("R2", "P3"),
        ("P3", "R3"),
        ("R3", "P2"),
        ("P4", "R1"),
    ])
}

/// A cycle is closed, consecutive pairs are edges of `edges`, and no member repeats.
pub fn assert_simple_cycle(cycle: &Cycle, edges: &[Edge]) {
    let nodes = cycle.nodes();
    assert!(nodes.len() >= 2, "cycle too short: {cycle}");
    assert_eq!(nodes.first(), nodes.last(), "cycle not closed: {cycle}");
    for e in cycle.edges() {
        assert!(edges.contains(&e), "{e} is not an input edge");
    }
    let mut members = cycle.members().to_vec();
    members.sort();
    members.dedup();
    assert_eq!(members.len(), cycle.members().len(), "repeated node in {cycle}");
}
