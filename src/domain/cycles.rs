//! Cycle engine: single-cycle detection, elementary cycle enumeration and
//! severity classification over a [`RagGraph`].
//!
//! Both searches are pure functions of the graph and allocate all traversal state
//! per call, so they can run concurrently from any number of callers.

use crate::domain::edge::Edge;
use crate::domain::graph::RagGraph;
use crate::domain::node::NodeId;
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Cycles with at most this many edges are classified [`Severity::High`].
pub const HIGH_SEVERITY_MAX_LEN: usize = 4;

/// Closed walk `v0, v1, ..., vk = v0`. A self-loop is `[x, x]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(transparent)]
pub struct Cycle {
    nodes: Vec<NodeId>,
}

impl Cycle {
    /// Build a cycle from its member nodes (without the repeated closing node).
    /// Returns `None` for an empty member list.
    pub fn from_members(members: Vec<NodeId>) -> Option<Self> {
        let first = members.first()?.clone();
        let mut nodes = members;
        nodes.push(first);
        Some(Self { nodes })
    }

    /// Full closed walk, first node repeated at the end.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Distinct members in traversal order.
    pub fn members(&self) -> &[NodeId] {
        &self.nodes[..self.len()]
    }

    /// Number of edges in the cycle.
    pub fn len(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_self_loop(&self) -> bool {
        self.len() == 1
    }

    pub fn contains(&self, id: &str) -> bool {
        self.members().iter().any(|n| n == id)
    }

    /// Consecutive edges of the walk, ending with the closing edge.
    pub fn edges(&self) -> Vec<Edge> {
        self.nodes
            .windows(2)
            .map(|w| Edge::new(w[0].clone(), w[1].clone()))
            .collect()
    }

    /// The edge that returns to the first node.
    pub fn closing_edge(&self) -> Option<Edge> {
        match self.nodes.as_slice() {
            [.., from, to] => Some(Edge::new(from.clone(), to.clone())),
            _ => None,
        }
    }

    /// Same cycle rotated to start at its lexicographically smallest rotation.
    pub fn canonical(&self) -> Cycle {
        let members = self.members();
        let best = (0..members.len())
            .min_by(|&a, &b| {
                let ra = members[a..].iter().chain(&members[..a]);
                let rb = members[b..].iter().chain(&members[..b]);
                ra.cmp(rb)
            })
            .unwrap_or(0);
        let mut rotated: Vec<NodeId> = members[best..].to_vec();
        rotated.extend_from_slice(&members[..best]);
        Cycle::from_members(rotated).unwrap_or_else(|| self.clone())
    }

    pub fn severity(&self) -> Severity {
        if self.len() <= HIGH_SEVERITY_MAX_LEN {
            Severity::High
        } else {
            Severity::Medium
        }
    }
}

impl std::fmt::Display for Cycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.nodes.join(" -> "))
    }
}

/// Deadlock severity. Ordered so that the maximum over several cycles is the overall level.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    schemars::JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    None,
    Medium,
    High,
}

/// Overall severity of a set of cycles.
pub fn classify(cycles: &[Cycle]) -> Severity {
    cycles
        .iter()
        .map(Cycle::severity)
        .max()
        .unwrap_or(Severity::None)
}

/// Every node that sits on at least one cycle, sorted and deduplicated.
pub fn deadlocked_nodes(cycles: &[Cycle]) -> Vec<NodeId> {
    cycles
        .iter()
        .flat_map(|c| c.members().iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn shortest_cycle_len(cycles: &[Cycle]) -> Option<usize> {
    cycles.iter().map(Cycle::len).min()
}

fn cycle_from_indices(graph: &RagGraph, path: &[NodeIndex]) -> Option<Cycle> {
    Cycle::from_members(path.iter().map(|&i| graph.id(i).to_string()).collect())
}

/// First cycle found by a depth-first search in insertion order.
///
/// Self-loops are checked first and returned as `[x, x]`. Otherwise a back-edge to a
/// node on the current path yields the path suffix starting at that node. O(V + E).
pub fn find_one_cycle(graph: &RagGraph) -> Option<Cycle> {
    if let Some(idx) = graph.node_indices().find(|&i| graph.has_self_loop(i)) {
        return cycle_from_indices(graph, &[idx]);
    }

    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Mark {
        Unvisited,
        OnPath,
        Done,
    }

    let adj = graph.adjacency();
    let mut mark = vec![Mark::Unvisited; graph.node_count()];
    // explicit recursion stack: (node, next successor position)
    let mut stack: Vec<(NodeIndex, usize)> = Vec::new();

    for root in graph.node_indices() {
        if mark[root.index()] != Mark::Unvisited {
            continue;
        }
        mark[root.index()] = Mark::OnPath;
        stack.push((root, 0));

        while let Some(top) = stack.last_mut() {
            let (node, pos) = *top;
            let Some(&next) = adj[node.index()].get(pos) else {
                mark[node.index()] = Mark::Done;
                stack.pop();
                continue;
            };
            top.1 += 1;

            match mark[next.index()] {
                Mark::OnPath => {
                    let start = stack.iter().position(|&(n, _)| n == next).unwrap_or(0);
                    let path: Vec<NodeIndex> = stack[start..].iter().map(|&(n, _)| n).collect();
                    return cycle_from_indices(graph, &path);
                }
                Mark::Unvisited => {
                    mark[next.index()] = Mark::OnPath;
                    stack.push((next, 0));
                }
                Mark::Done => {}
            }
        }
    }
    None
}

/// Every elementary cycle in the graph, in discovery order.
pub fn find_all_simple_cycles(graph: &RagGraph) -> Vec<Cycle> {
    SimpleCycles::new(graph).collect()
}

/// Lazy enumeration of elementary cycles.
///
/// Start nodes are taken in insertion order. A search rooted at `s` only walks nodes
/// inserted after `s` that share its strongly connected component, and reports a cycle
/// only when the path closes on `s` itself, so each cycle is emitted exactly once,
/// rotated to begin at its earliest-inserted node. Once a root is exhausted it is closed
/// and never entered again.
///
/// The number of elementary cycles can be exponential in the graph size; there is no
/// internal cap. Callers bound the work with [`Iterator::take`] or a timeout.
pub struct SimpleCycles<'g> {
    graph: &'g RagGraph,
    adj: Vec<Vec<NodeIndex>>,
    component: Vec<usize>,
    on_path: Vec<bool>,
    stack: Vec<(NodeIndex, usize)>,
    root: NodeIndex,
    next_root: usize,
}

impl<'g> SimpleCycles<'g> {
    pub fn new(graph: &'g RagGraph) -> Self {
        let n = graph.node_count();
        let mut component = vec![0; n];
        for (id, scc) in graph.strongly_connected_components().iter().enumerate() {
            for idx in scc {
                component[idx.index()] = id;
            }
        }
        Self {
            graph,
            adj: graph.adjacency(),
            component,
            on_path: vec![false; n],
            stack: Vec::new(),
            root: NodeIndex::new(0),
            next_root: 0,
        }
    }

    /// Move to the next start node; false once all roots are closed.
    fn advance_root(&mut self) -> bool {
        while self.next_root < self.adj.len() {
            let root = NodeIndex::new(self.next_root);
            self.next_root += 1;
            let successors = &self.adj[root.index()];
            let may_cycle = successors
                .iter()
                .any(|s| *s == root || self.component[s.index()] == self.component[root.index()]);
            if may_cycle {
                self.root = root;
                self.on_path[root.index()] = true;
                self.stack.push((root, 0));
                return true;
            }
        }
        false
    }

    fn admissible(&self, next: NodeIndex) -> bool {
        next.index() > self.root.index()
            && !self.on_path[next.index()]
            && self.component[next.index()] == self.component[self.root.index()]
    }
}

impl Iterator for SimpleCycles<'_> {
    type Item = Cycle;

    fn next(&mut self) -> Option<Cycle> {
        loop {
            let Some(&(node, pos)) = self.stack.last() else {
                if !self.advance_root() {
                    return None;
                }
                continue;
            };

            let Some(&next) = self.adj[node.index()].get(pos) else {
                self.on_path[node.index()] = false;
                self.stack.pop();
                continue;
            };
            if let Some(top) = self.stack.last_mut() {
                top.1 += 1;
            }

            if next == self.root {
                let path: Vec<NodeIndex> = self.stack.iter().map(|&(n, _)| n).collect();
                return cycle_from_indices(self.graph, &path);
            }
            if self.admissible(next) {
                self.on_path[next.index()] = true;
                self.stack.push((next, 0));
            }
        }
    }
}
