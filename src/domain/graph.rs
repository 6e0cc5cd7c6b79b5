use crate::domain::edge::Edge;
use crate::domain::error::{RagError, RagResult};
use crate::domain::node::NodeId;
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

/// Resource Allocation Graph - the core data structure.
///
/// Node indices follow first-appearance order in the input and outgoing edges are
/// traversed in insertion order, so every analysis over the same edge list is
/// reproducible. Duplicate edges collapse into a single adjacency entry.
#[derive(Debug, Clone, Default)]
pub struct RagGraph {
    /// The directed graph of node identifiers and (deduplicated) edges
    pub graph: DiGraph<NodeId, ()>,

    /// Mapping from identifier to node index
    id_to_node: HashMap<NodeId, NodeIndex>,

    /// Number of edges as supplied, duplicates included
    raw_edge_count: usize,
}

impl RagGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from an ordered edge list.
    ///
    /// Fails with [`RagError::InvalidEdge`] if any endpoint is empty (or only whitespace).
    pub fn build(edges: &[Edge]) -> RagResult<Self> {
        let mut graph = Self::new();
        for (index, edge) in edges.iter().enumerate() {
            if edge.source.trim().is_empty() || edge.target.trim().is_empty() {
                return Err(RagError::InvalidEdge {
                    index,
                    from: edge.source.clone(),
                    to: edge.target.clone(),
                });
            }
            let source = graph.add_node(&edge.source);
            let target = graph.add_node(&edge.target);
            graph.add_edge(source, target);
        }
        Ok(graph)
    }

    /// Add a node. Re-adding an existing identifier returns the existing index.
    pub fn add_node(&mut self, id: &str) -> NodeIndex {
        if let Some(&idx) = self.id_to_node.get(id) {
            return idx;
        }
        let idx = self.graph.add_node(id.to_string());
        self.id_to_node.insert(id.to_string(), idx);
        idx
    }

    /// Add an edge. Counted in [`raw_edge_count`](Self::raw_edge_count) every time, but
    /// stored in the adjacency only once.
    pub fn add_edge(&mut self, source: NodeIndex, target: NodeIndex) {
        self.raw_edge_count += 1;
        if self.graph.find_edge(source, target).is_none() {
            self.graph.add_edge(source, target, ());
        }
    }

    pub fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.id_to_node.get(id).copied()
    }

    pub fn id(&self, idx: NodeIndex) -> &str {
        &self.graph[idx]
    }

    /// Nodes in first-appearance order.
    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Deduplicated edge count (the adjacency used for traversal).
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Edge count as supplied by the caller, duplicates included.
    pub fn raw_edge_count(&self) -> usize {
        self.raw_edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn has_self_loop(&self, idx: NodeIndex) -> bool {
        self.graph.find_edge(idx, idx).is_some()
    }

    /// Outgoing neighbours of `idx` in edge insertion order.
    pub fn successors(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut out: Vec<_> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (e.id().index(), e.target()))
            .collect();
        out.sort_by_key(|(edge_pos, _)| *edge_pos);
        out.into_iter().map(|(_, target)| target).collect()
    }

    /// Ordered adjacency lists keyed by `NodeIndex::index()`.
    pub fn adjacency(&self) -> Vec<Vec<NodeIndex>> {
        self.graph
            .node_indices()
            .map(|idx| self.successors(idx))
            .collect()
    }

    /// Directed density `E / (V * (V - 1))` over the deduplicated adjacency.
    pub fn density(&self) -> f64 {
        let n = self.node_count();
        if n < 2 {
            return 0.0;
        }
        self.edge_count() as f64 / (n as f64 * (n as f64 - 1.0))
    }

    /// Mean total (in + out) degree. A self-loop contributes two.
    pub fn avg_degree(&self) -> f64 {
        let n = self.node_count();
        if n == 0 {
            return 0.0;
        }
        2.0 * self.edge_count() as f64 / n as f64
    }

    pub fn strongly_connected_components(&self) -> Vec<Vec<NodeIndex>> {
        petgraph::algo::tarjan_scc(&self.graph)
    }

    /// Deduplicated edges in insertion order.
    pub fn edges(&self) -> Vec<Edge> {
        self.graph
            .raw_edges()
            .iter()
            .map(|e| Edge::new(self.id(e.source()), self.id(e.target())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edges(pairs: &[(&str, &str)]) -> Vec<Edge> {
        pairs.iter().map(|&p| Edge::from(p)).collect()
    }

    #[test]
    fn test_build_rejects_empty_identifier() {
        let err = RagGraph::build(&edges(&[("P1", "R1"), ("", "R2")])).unwrap_err();
        assert_eq!(
            err,
            RagError::InvalidEdge {
                index: 1,
                from: String::new(),
                to: "R2".into()
            }
        );
        assert!(RagGraph::build(&edges(&[("P1", "  ")])).is_err());
    }

    #[test]
    fn test_duplicates_collapse_but_are_counted() {
        let g = RagGraph::build(&edges(&[("P1", "R1"), ("P1", "R1"), ("R1", "P1")])).unwrap();
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.raw_edge_count(), 3);
    }

    #[test]
    fn test_add_node_is_idempotent() {
        let mut g = RagGraph::new();
        let a = g.add_node("lock");
        let b = g.add_node("lock");
        assert_eq!(a, b);
        assert_eq!(g.node_count(), 1);
        assert_eq!(g.id(a), "lock");
    }

    #[test]
    fn test_successors_follow_insertion_order() {
        let g = RagGraph::build(&edges(&[("A", "C"), ("A", "B"), ("A", "D")])).unwrap();
        let a = g.index_of("A").unwrap();
        let ids: Vec<_> = g.successors(a).into_iter().map(|i| g.id(i)).collect();
        assert_eq!(ids, vec!["C", "B", "D"]);
    }

    #[test]
    fn test_density_and_degree() {
        let g = RagGraph::build(&edges(&[("P1", "R1"), ("R1", "P1")])).unwrap();
        assert!((g.density() - 1.0).abs() < f64::EPSILON);
        assert!((g.avg_degree() - 2.0).abs() < f64::EPSILON);
        assert_eq!(RagGraph::new().density(), 0.0);
    }
}
