use crate::domain::cycles::{self, Cycle};
use crate::domain::edge::Edge;
use crate::domain::error::RagResult;
use crate::domain::graph::RagGraph;
use crate::domain::node::{NodeId, NodeKind};
use serde::{Deserialize, Serialize};

pub const NO_ACTION_NEEDED: &str = "No action needed: no deadlock detected.";

/// Node chosen to break a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(tag = "action", content = "node", rename_all = "snake_case")]
pub enum Victim {
    /// Release the resource's hold rather than killing work.
    Preempt(NodeId),
    Terminate(NodeId),
}

impl Victim {
    pub fn node(&self) -> &str {
        match self {
            Victim::Preempt(id) | Victim::Terminate(id) => id,
        }
    }
}

/// Pick a victim for one cycle: the first resource in the cycle if any, otherwise
/// the first process. This is a tie-break, not a minimum feedback vertex set.
pub fn choose_victim(cycle: &Cycle) -> Option<Victim> {
    let members = cycle.members();
    if let Some(resource) = members
        .iter()
        .find(|id| NodeKind::infer(id) == NodeKind::Resource)
    {
        return Some(Victim::Preempt(resource.clone()));
    }
    members
        .iter()
        .find(|id| NodeKind::infer(id) == NodeKind::Process)
        .map(|id| Victim::Terminate(id.clone()))
}

/// One suggestion per cycle. Never empty: no cycles yields [`NO_ACTION_NEEDED`].
pub fn suggest(cycles: &[Cycle]) -> Vec<String> {
    if cycles.is_empty() {
        return vec![NO_ACTION_NEEDED.to_string()];
    }
    cycles
        .iter()
        .map(|cycle| match choose_victim(cycle) {
            Some(Victim::Preempt(id)) => {
                format!("Preempt resource {id} to break cycle {cycle}")
            }
            Some(Victim::Terminate(id)) => {
                format!("Terminate process {id} to break cycle {cycle}")
            }
            None => format!("Inspect cycle {cycle} manually"),
        })
        .collect()
}

/// Outcome of [`break_cycles`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CycleBreak {
    /// Input edges minus the removed ones, original order kept.
    pub remaining: Vec<Edge>,
    /// Removed edges, in removal order.
    pub removed: Vec<Edge>,
}

/// Remove closing edges until the edge list is acyclic.
///
/// Each round drops every copy of the closing edge of the first cycle found, so the
/// loop runs at most once per distinct edge.
pub fn break_cycles(edges: &[Edge]) -> RagResult<CycleBreak> {
    let mut remaining = edges.to_vec();
    let mut removed = Vec::new();

    loop {
        let graph = RagGraph::build(&remaining)?;
        let Some(edge) = cycles::find_one_cycle(&graph).and_then(|c| c.closing_edge()) else {
            break;
        };
        remaining.retain(|e| *e != edge);
        removed.push(edge);
    }

    Ok(CycleBreak { remaining, removed })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cycle(members: &[&str]) -> Cycle {
        Cycle::from_members(members.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    #[test]
    fn test_empty_input_yields_single_no_action_line() {
        assert_eq!(suggest(&[]), vec![NO_ACTION_NEEDED.to_string()]);
    }

    #[test]
    fn test_prefers_resource_victim() {
        let c = cycle(&["P1", "R1", "P2", "R2"]);
        assert_eq!(choose_victim(&c), Some(Victim::Preempt("R1".into())));
        let lines = suggest(&[c]);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("Preempt resource R1"));
    }

    #[test]
    fn test_falls_back_to_first_process() {
        let c = cycle(&["worker_b", "worker_a"]);
        assert_eq!(choose_victim(&c), Some(Victim::Terminate("worker_b".into())));
        assert!(suggest(&[c])[0].starts_with("Terminate process worker_b"));
    }

    #[test]
    fn test_break_cycles_leaves_acyclic_edges() {
        let edges: Vec<Edge> = [("P1", "R1"), ("R1", "P2"), ("P2", "R2"), ("R2", "P1"), ("P2", "R2")]
            .into_iter()
            .map(Edge::from)
            .collect();
        let fixed = break_cycles(&edges).unwrap();
        assert_eq!(fixed.removed, vec![Edge::new("R2", "P1")]);
        assert_eq!(fixed.remaining.len(), 4);
        let g = RagGraph::build(&fixed.remaining).unwrap();
        assert!(cycles::find_one_cycle(&g).is_none());
    }

    #[test]
    fn test_break_cycles_removes_duplicate_closing_edges() {
        let edges: Vec<Edge> = [("A", "A"), ("A", "A")].into_iter().map(Edge::from).collect();
        let fixed = break_cycles(&edges).unwrap();
        assert!(fixed.remaining.is_empty());
        assert_eq!(fixed.removed, vec![Edge::new("A", "A")]);
    }

    #[test]
    fn test_victim_and_relation_agree_on_tagged_kinds() {
        let c = cycle(&["worker", "resource:lock"]);
        assert_eq!(choose_victim(&c), Some(Victim::Preempt("resource:lock".into())));
        assert_eq!(
            Edge::new("worker", "resource:lock").relation(),
            crate::domain::edge::EdgeRelation::Request
        );
    }
}
