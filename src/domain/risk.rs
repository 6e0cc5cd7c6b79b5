//! Heuristic deadlock-risk scoring.
//!
//! The score is a weighted sum of graph-structure factors, not a learned model.
//! All weights live in [`RiskWeights`] and are configuration, not derived truth.

use crate::domain::cycles::{self, Cycle};
use crate::domain::graph::RagGraph;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Structural factors reported alongside the score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct GraphFactors {
    pub node_count: usize,
    /// Edges as supplied, duplicates included.
    pub edge_count: usize,
    /// Directed density over the deduplicated adjacency.
    pub density: f64,
    pub strongly_connected_components: usize,
    pub avg_degree: f64,
}

impl GraphFactors {
    pub fn from_graph(graph: &RagGraph) -> Self {
        Self {
            node_count: graph.node_count(),
            edge_count: graph.raw_edge_count(),
            density: graph.density(),
            strongly_connected_components: graph.strongly_connected_components().len(),
            avg_degree: graph.avg_degree(),
        }
    }
}

/// Tunable scoring parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(default)]
pub struct RiskWeights {
    /// Risk added per supplied edge, up to `edge_cap` edges.
    pub edge_weight: f64,
    pub edge_cap: usize,
    /// Risk added per strongly connected component beyond the first.
    pub component_weight: f64,
    /// Risk added as `cycle_length_weight / shortest_cycle_len`. Zero disables the term.
    pub cycle_length_weight: f64,
    /// Multiplier applied to the structural score before the floor and clipping.
    pub sensitivity: f64,
    /// Minimum score whenever at least one cycle exists.
    pub cycle_floor: f64,
    /// Upper clip.
    ///
    /// With the default weights every strongly connected component past the first adds
    /// 0.2, so an acyclic graph of six or more nodes already clips here, above
    /// `cycle_floor`. Lower `component_weight` when scores should separate larger
    /// acyclic graphs from deadlocked ones.
    pub max_risk: f64,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            edge_weight: 0.05,
            edge_cap: 16,
            component_weight: 0.2,
            cycle_length_weight: 0.0,
            sensitivity: 1.0,
            cycle_floor: 0.9,
            max_risk: 0.99,
        }
    }
}

/// Deterministic risk scorer. Identical inputs always give identical scores.
#[derive(Debug, Clone, Default)]
pub struct RiskScorer {
    pub weights: RiskWeights,
}

impl RiskScorer {
    pub fn new(weights: RiskWeights) -> Self {
        Self { weights }
    }

    /// Score a graph, detecting its cycles as needed.
    pub fn score(&self, graph: &RagGraph, factors: &GraphFactors) -> f64 {
        if self.weights.cycle_length_weight != 0.0 {
            let all = cycles::find_all_simple_cycles(graph);
            return self.score_with_cycles(factors, &all);
        }
        let first: Vec<Cycle> = cycles::find_one_cycle(graph).into_iter().collect();
        self.score_with_cycles(factors, &first)
    }

    /// Score from precomputed factors and cycles.
    pub fn score_with_cycles(&self, factors: &GraphFactors, cycles: &[Cycle]) -> f64 {
        let w = &self.weights;
        let edges = factors.edge_count.min(w.edge_cap) as f64;
        let extra_components = factors.strongly_connected_components.saturating_sub(1) as f64;

        let mut structural = w.edge_weight * edges + w.component_weight * extra_components;
        if let Some(shortest) = cycles::shortest_cycle_len(cycles).filter(|&len| len > 0) {
            structural += w.cycle_length_weight / shortest as f64;
        }
        structural *= w.sensitivity;

        let risk = if cycles.is_empty() {
            structural
        } else {
            structural.max(w.cycle_floor)
        };
        clip(risk, w.max_risk)
    }
}

fn clip(risk: f64, max: f64) -> f64 {
    if risk.is_nan() {
        return 0.0;
    }
    risk.clamp(0.0, max.clamp(0.0, 1.0))
}

/// Prevention strategies for a given risk level.
pub fn prevention_strategies(risk: f64) -> Vec<String> {
    let tier: [&str; 2] = if risk > 0.8 {
        ["Force terminate oldest process", "Preempt critical resource"]
    } else if risk > 0.5 {
        ["Rollback allocations", "Add timeout mechanisms"]
    } else {
        ["Monitor system", "Optimize scheduling"]
    };
    tier.iter().map(|s| s.to_string()).collect()
}

pub const DEFAULT_HISTORY_CAPACITY: usize = 20;

/// Caller-owned, bounded sequence of past scores (oldest first).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct RiskHistory {
    capacity: usize,
    scores: VecDeque<f64>,
}

impl Default for RiskHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl RiskHistory {
    /// A zero capacity is bumped to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            scores: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a score, evicting the oldest entries so at most `capacity` remain.
    ///
    /// A history deserialized from a caller may arrive with a zero capacity or more
    /// scores than its capacity; both are normalized here.
    pub fn record(mut self, score: f64) -> Self {
        self.capacity = self.capacity.max(1);
        while self.scores.len() >= self.capacity {
            self.scores.pop_front();
        }
        self.scores.push_back(score);
        self
    }

    pub fn scores(&self) -> impl Iterator<Item = f64> + '_ {
        self.scores.iter().copied()
    }

    pub fn latest(&self) -> Option<f64> {
        self.scores.back().copied()
    }

    /// Change between the two most recent scores.
    pub fn trend(&self) -> Option<f64> {
        let n = self.scores.len();
        if n < 2 {
            return None;
        }
        Some(self.scores[n - 1] - self.scores[n - 2])
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
