use crate::app::dto::*;
use crate::app::monitor::LiveMonitor;
use crate::adapters::text::export_edges;
use crate::domain::advisor;
use crate::domain::cycles;
use crate::domain::edge::Edge;
use crate::domain::error::RagResult;
use crate::domain::graph::RagGraph;
use crate::domain::risk::{self, GraphFactors, RiskHistory, RiskScorer, RiskWeights};
use tracing::debug;

/// Orchestrates Graph Model -> Cycle Engine -> {Risk Scorer, Resolution Advisor}.
///
/// Stateless apart from its weights: every call builds a fresh graph and can run
/// concurrently with any other call.
#[derive(Debug, Clone, Default)]
pub struct DeadlockEngine {
    scorer: RiskScorer,
}

impl DeadlockEngine {
    pub fn new(weights: RiskWeights) -> Self {
        Self {
            scorer: RiskScorer::new(weights),
        }
    }

    pub fn weights(&self) -> &RiskWeights {
        &self.scorer.weights
    }

    pub fn analyze(&self, edges: &[Edge]) -> RagResult<AnalysisResult> {
        let graph = RagGraph::build(edges)?;
        Ok(self.analyze_graph(&graph))
    }

    pub fn analyze_graph(&self, graph: &RagGraph) -> AnalysisResult {
        let cycles = cycles::find_all_simple_cycles(graph);
        let factors = GraphFactors::from_graph(graph);
        let risk_score = self.scorer.score_with_cycles(&factors, &cycles);

        debug!(
            nodes = factors.node_count,
            edges = factors.edge_count,
            cycles = cycles.len(),
            risk = risk_score,
            "analyzed allocation graph"
        );

        AnalysisResult {
            has_deadlock: !cycles.is_empty(),
            suggestions: advisor::suggest(&cycles),
            severity: cycles::classify(&cycles),
            deadlocked_nodes: cycles::deadlocked_nodes(&cycles),
            prevention: risk::prevention_strategies(risk_score),
            cycles,
            risk_score,
            factors,
        }
    }

    /// Analyze and append the score to a caller-owned history.
    pub fn analyze_with_history(
        &self,
        edges: &[Edge],
        history: RiskHistory,
    ) -> RagResult<(AnalysisResult, RiskHistory)> {
        let result = self.analyze(edges)?;
        let history = history.record(result.risk_score);
        Ok((result, history))
    }

    /// Analyze the monitor's current snapshot.
    pub fn analyze_monitor(&self, monitor: &LiveMonitor) -> RagResult<AnalysisResult> {
        self.analyze(&monitor.snapshot())
    }

    /// Handle an [`AnalyzeRequest`], honouring per-request weights and history.
    pub fn handle(&self, req: AnalyzeRequest) -> RagResult<AnalyzeResponse> {
        let engine = match req.weights {
            Some(weights) => DeadlockEngine::new(weights),
            None => self.clone(),
        };
        match req.history {
            Some(history) => {
                let (result, history) = engine.analyze_with_history(&req.edges, history)?;
                Ok(AnalyzeResponse {
                    result,
                    history: Some(history),
                })
            }
            None => Ok(AnalyzeResponse {
                result: engine.analyze(&req.edges)?,
                history: None,
            }),
        }
    }

    pub fn fix(&self, req: FixRequest) -> RagResult<FixResponse> {
        let fix = advisor::break_cycles(&req.edges)?;
        let export = export_edges(&fix.remaining);
        Ok(FixResponse { fix, export })
    }

    pub fn suggest(&self, req: SuggestRequest) -> SuggestResponse {
        SuggestResponse {
            suggestions: advisor::suggest(&req.cycles),
        }
    }
}
