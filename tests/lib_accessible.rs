//! Sanity check: library and test common module are accessible.

mod common;

use rag_deadlock::domain::graph::RagGraph;

#[test]
fn test_library_accessible() {
    let graph = RagGraph::new();
    assert_eq!(graph.node_count(), 0);
    assert!(graph.is_empty());
}

#[test]
fn test_fixtures_build() {
    let graph = RagGraph::build(&common::fixtures::classic_deadlock()).unwrap();
    assert_eq!(graph.node_count(), 5);
}
