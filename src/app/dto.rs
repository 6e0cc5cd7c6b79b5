use crate::domain::advisor::CycleBreak;
use crate::domain::cycles::{Cycle, Severity};
use crate::domain::edge::Edge;
use crate::domain::node::NodeId;
use crate::domain::risk::{GraphFactors, RiskHistory, RiskWeights};
use rmcp::schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Full result of one analysis call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisResult {
    pub has_deadlock: bool,
    /// Elementary cycles in discovery order, each starting at its earliest-inserted node.
    pub cycles: Vec<Cycle>,
    /// Heuristic risk in `[0, max_risk]`.
    pub risk_score: f64,
    pub factors: GraphFactors,
    /// One line per cycle, or a single "no action needed" line.
    pub suggestions: Vec<String>,
    pub severity: Severity,
    pub deadlocked_nodes: Vec<NodeId>,
    pub prevention: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnalyzeRequest {
    pub edges: Vec<Edge>,
    /// Overrides the engine's configured weights for this call.
    pub weights: Option<RiskWeights>,
    /// Past scores; when present the new score is appended and returned.
    pub history: Option<RiskHistory>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnalyzeResponse {
    #[serde(flatten)]
    pub result: AnalysisResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<RiskHistory>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SuggestRequest {
    pub cycles: Vec<Cycle>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SuggestResponse {
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FixRequest {
    pub edges: Vec<Edge>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FixResponse {
    #[serde(flatten)]
    pub fix: CycleBreak,
    /// Remaining edges in `A->B` line format.
    pub export: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SnapshotResponse {
    pub edges: Vec<Edge>,
    pub export: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HealthResponse {
    pub status: String,
    pub monitor_running: bool,
    pub weights: RiskWeights,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MonitorStateResponse {
    pub running: bool,
    /// Whether this call changed the monitor state.
    pub changed: bool,
}
