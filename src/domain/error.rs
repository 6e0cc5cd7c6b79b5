use thiserror::Error;

pub type RagResult<T> = Result<T, RagError>;

/// Errors surfaced by the graph model. Everything else (no cycle, empty or
/// disconnected graph) is a normal outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RagError {
    /// An edge with an empty endpoint identifier.
    #[error("invalid edge #{index} ({from:?} -> {to:?}): endpoint identifier is empty")]
    InvalidEdge {
        index: usize,
        from: String,
        to: String,
    },
}
