use crate::adapters::text::{export_edges, parse_edges, read_edge_file};
use crate::app::dto::AnalysisResult;
use crate::app::engine::DeadlockEngine;
use crate::app::monitor::{LiveMonitor, MonitorConfig};
use crate::domain::advisor::break_cycles;
use crate::domain::cycles::{self, Cycle};
use crate::domain::edge::Edge;
use crate::domain::graph::RagGraph;
use crate::domain::risk::RiskWeights;
use anyhow::{Context as _, Result};
use std::fmt::Write as _;
use std::path::Path;
use std::time::Duration;

/// Load risk weights from a JSON file, or the defaults when no path is given.
pub fn load_weights(path: Option<&Path>) -> Result<RiskWeights> {
    let Some(path) = path else {
        return Ok(RiskWeights::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read weights file: {}", path.display()))?;
    serde_json::from_str(&json).context("Failed to parse risk weights JSON")
}

/// Edges from a file, inline text, or stdin, in that order of preference.
pub fn resolve_edges(text: Option<&str>, file: Option<&Path>) -> Result<Vec<Edge>> {
    if let Some(path) = file {
        return read_edge_file(path);
    }
    if let Some(text) = text {
        return Ok(parse_edges(text));
    }
    let stdin = std::io::read_to_string(std::io::stdin()).context("Failed to read stdin")?;
    Ok(parse_edges(&stdin))
}

pub fn render_analysis(result: &AnalysisResult) -> String {
    let mut out = String::new();
    let status = if result.has_deadlock {
        "DEADLOCK DETECTED"
    } else {
        "No deadlock"
    };
    let _ = writeln!(out, "{status}");
    let _ = writeln!(out, "{}", "=".repeat(60));

    if result.has_deadlock {
        let _ = writeln!(out, "Severity: {:?}", result.severity);
        let _ = writeln!(out, "Cycles ({}):", result.cycles.len());
        for (i, cycle) in result.cycles.iter().enumerate() {
            let _ = writeln!(out, "  {}. {}", i + 1, cycle);
        }
        let _ = writeln!(out, "Deadlocked nodes: {}", result.deadlocked_nodes.join(", "));
    }

    let _ = writeln!(out, "\nRisk: {:.1}%", result.risk_score * 100.0);
    let f = &result.factors;
    let _ = writeln!(out, "  Nodes:       {:>6}", f.node_count);
    let _ = writeln!(out, "  Edges:       {:>6}", f.edge_count);
    let _ = writeln!(out, "  Density:     {:>6.2}", f.density);
    let _ = writeln!(out, "  SCCs:        {:>6}", f.strongly_connected_components);
    let _ = writeln!(out, "  Avg degree:  {:>6.2}", f.avg_degree);

    let _ = writeln!(out, "\nSuggestions:");
    for s in &result.suggestions {
        let _ = writeln!(out, "  - {s}");
    }
    let _ = writeln!(out, "Prevention:");
    for p in &result.prevention {
        let _ = writeln!(out, "  - {p}");
    }
    out
}

pub fn analyze_and_display(engine: &DeadlockEngine, edges: &[Edge], json: bool) -> Result<()> {
    let result = engine.analyze(edges)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", render_analysis(&result));
    }
    Ok(())
}

pub fn display_cycles(edges: &[Edge], canonical: bool) -> Result<()> {
    let graph = RagGraph::build(edges)?;
    let found: Vec<Cycle> = cycles::find_all_simple_cycles(&graph)
        .into_iter()
        .map(|c| if canonical { c.canonical() } else { c })
        .collect();

    if found.is_empty() {
        println!("No cycles found.");
    }
    for cycle in &found {
        println!("{cycle}");
    }
    Ok(())
}

pub fn fix_and_display(edges: &[Edge]) -> Result<()> {
    let fix = break_cycles(edges)?;
    for edge in &fix.removed {
        eprintln!("removed {edge}");
    }
    println!("{}", export_edges(&fix.remaining));
    Ok(())
}

/// Start the simulated monitor, analyze `ticks` snapshots one interval apart, then stop.
pub fn run_monitor(
    engine: &DeadlockEngine,
    config: MonitorConfig,
    ticks: u32,
    json: bool,
) -> Result<()> {
    let interval = Duration::from_millis(config.interval_ms);
    let monitor = LiveMonitor::new(config);
    monitor.start()?;

    for tick in 1..=ticks {
        std::thread::sleep(interval);
        let snapshot = monitor.snapshot();
        let result = engine.analyze(&snapshot)?;
        let metrics = monitor.metrics();

        if json {
            let line = serde_json::json!({
                "tick": tick,
                "edges": export_edges(&snapshot),
                "metrics": metrics,
                "analysis": result,
            });
            println!("{line}");
        } else {
            println!(
                "[tick {tick}] allocations={} waiting={} cycles={} risk={:.1}%",
                metrics.allocations,
                metrics.waiting,
                result.cycles.len(),
                result.risk_score * 100.0
            );
            for s in &result.suggestions {
                println!("    {s}");
            }
        }
    }

    monitor.stop();
    Ok(())
}
