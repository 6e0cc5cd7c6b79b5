use crate::domain::node::{NodeId, NodeKind};
use serde::{Deserialize, Serialize};

/// Directed edge between two node identifiers.
///
/// Process -> Resource means "requests"; Resource -> Process means "held by".
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, schemars::JsonSchema,
)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
}

impl Edge {
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }

    /// Relation implied by the kinds of both endpoints.
    pub fn relation(&self) -> EdgeRelation {
        if self.is_self_loop() {
            return EdgeRelation::SelfLoop;
        }
        match (
            NodeKind::infer(&self.source),
            NodeKind::infer(&self.target),
        ) {
            (NodeKind::Process, NodeKind::Resource) => EdgeRelation::Request,
            (NodeKind::Resource, NodeKind::Process) => EdgeRelation::Assignment,
            _ => EdgeRelation::Unknown,
        }
    }
}

impl<S: Into<NodeId>, T: Into<NodeId>> From<(S, T)> for Edge {
    fn from((source, target): (S, T)) -> Self {
        Edge::new(source, target)
    }
}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}->{}", self.source, self.target)
    }
}

/// Edge classification in a resource allocation graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeRelation {
    Request,    // Process → Resource
    Assignment, // Resource → Process

    /// Entity depends on itself: a trivial deadlock.
    SelfLoop,

    /// Both endpoints have the same kind (e.g. a wait-for edge between processes).
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_from_endpoint_kinds() {
        assert_eq!(Edge::new("P1", "R1").relation(), EdgeRelation::Request);
        assert_eq!(Edge::new("R1", "P2").relation(), EdgeRelation::Assignment);
        assert_eq!(Edge::new("P1", "P1").relation(), EdgeRelation::SelfLoop);
        assert_eq!(Edge::new("P1", "P2").relation(), EdgeRelation::Unknown);
    }

    #[test]
    fn test_display_uses_arrow_format() {
        assert_eq!(Edge::from(("A", "B")).to_string(), "A->B");
    }
}
