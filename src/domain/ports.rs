use crate::domain::edge::Edge;
use anyhow::Result;

/// Source of allocation snapshots for the live monitor (implemented by Infrastructure).
///
/// Each call returns a complete replacement edge list. An error only fails the
/// current refresh tick.
pub trait AllocationSource: Send {
    fn next_edges(&mut self) -> Result<Vec<Edge>>;

    /// Processes tracked by this source.
    fn processes(&self) -> &[String];

    /// Resources tracked by this source.
    fn resources(&self) -> &[String];
}
