//! Plain-text edge lists: `P1->R1, R1->P2` on input, one `A->B` per line on export.

use crate::domain::edge::Edge;
use anyhow::{Context, Result};
use std::path::Path;

const ARROW: &str = "->";

/// Parse comma- or newline-separated `source->target` entries.
///
/// Whitespace around identifiers is trimmed; entries without an arrow (blank
/// lines, stray text) are skipped. Endpoints are not validated here, an empty
/// side surfaces later as an invalid edge when the graph is built.
pub fn parse_edges(text: &str) -> Vec<Edge> {
    text.split([',', '\n'])
        .filter_map(|entry| entry.split_once(ARROW))
        .map(|(source, target)| Edge::new(source.trim(), target.trim()))
        .collect()
}

/// One `source->target` line per edge, no header, no trailing newline.
pub fn export_edges(edges: &[Edge]) -> String {
    edges
        .iter()
        .map(Edge::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Read and parse an edge file.
pub fn read_edge_file(path: &Path) -> Result<Vec<Edge>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read edge file: {}", path.display()))?;
    Ok(parse_edges(&text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_comma_and_newline_separated() {
        let edges = parse_edges("P1->R1, R1 -> P2\nP2->R2\n\nnot an edge");
        assert_eq!(
            edges,
            vec![
                Edge::new("P1", "R1"),
                Edge::new("R1", "P2"),
                Edge::new("P2", "R2"),
            ]
        );
    }

    #[test]
    fn test_parse_keeps_empty_endpoint_for_validation() {
        assert_eq!(parse_edges("->R1"), vec![Edge::new("", "R1")]);
    }

    #[test]
    fn test_export_line_format() {
        let edges = vec![Edge::new("P1", "R1"), Edge::new("R1", "P2")];
        assert_eq!(export_edges(&edges), "P1->R1\nR1->P2");
        assert_eq!(parse_edges(&export_edges(&edges)), edges);
        assert_eq!(export_edges(&[]), "");
    }
}
