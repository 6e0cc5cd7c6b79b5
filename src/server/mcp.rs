use crate::app::dto::*;
use crate::app::engine::DeadlockEngine;
use rmcp::{
    Json, ServerHandler, ServiceExt, handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters, model::*, tool, tool_handler, tool_router,
    transport::stdio,
};
use tokio::task::spawn_blocking;

#[derive(Clone)]
pub struct RagMcpServer {
    engine: DeadlockEngine,
    tool_router: ToolRouter<Self>,
}

impl RagMcpServer {
    pub fn new(engine: DeadlockEngine) -> Self {
        Self {
            engine,
            tool_router: Self::tool_router(),
        }
    }

    pub async fn serve_stdio(self) -> anyhow::Result<()> {
        let service = self.serve(stdio()).await?;
        service.waiting().await?;
        Ok(())
    }
}

#[tool_router]
impl RagMcpServer {
    #[tool(
        description = "Detect deadlock cycles in a resource allocation graph, score the risk and suggest victims."
    )]
    async fn analyze_edges(
        &self,
        params: Parameters<AnalyzeRequest>,
    ) -> Result<Json<AnalyzeResponse>, String> {
        let engine = self.engine.clone();
        let req = params.0;
        spawn_blocking(move || engine.handle(req))
            .await
            .map_err(|e| format!("task join error: {e}"))?
            .map(Json)
            .map_err(|e| e.to_string())
    }

    #[tool(description = "Suggest a victim (resource to preempt or process to terminate) per cycle.")]
    async fn suggest_resolution(
        &self,
        params: Parameters<SuggestRequest>,
    ) -> Result<Json<SuggestResponse>, String> {
        Ok(Json(self.engine.suggest(params.0)))
    }

    #[tool(description = "Remove edges until the allocation graph is acyclic.")]
    async fn break_cycles(&self, params: Parameters<FixRequest>) -> Result<Json<FixResponse>, String> {
        let engine = self.engine.clone();
        let req = params.0;
        spawn_blocking(move || engine.fix(req))
            .await
            .map_err(|e| format!("task join error: {e}"))?
            .map(Json)
            .map_err(|e| e.to_string())
    }
}

#[tool_handler]
impl ServerHandler for RagMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Deadlock detection over resource allocation graphs given as source/target edge lists."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cycles::Cycle;
    use crate::domain::edge::Edge;

    #[tokio::test]
    async fn test_mcp_tools_smoke() {
        let server = RagMcpServer::new(DeadlockEngine::default());

        let analysis = server
            .analyze_edges(Parameters(AnalyzeRequest {
                edges: vec![Edge::new("P1", "R1"), Edge::new("R1", "P1")],
                weights: None,
                history: None,
            }))
            .await
            .unwrap()
            .0;
        assert!(analysis.result.has_deadlock);

        let suggestions = server
            .suggest_resolution(Parameters(SuggestRequest {
                cycles: analysis.result.cycles.clone(),
            }))
            .await
            .unwrap()
            .0;
        assert!(suggestions.suggestions[0].contains("R1"));

        let fix = server
            .break_cycles(Parameters(FixRequest {
                edges: vec![Edge::new("P1", "R1"), Edge::new("R1", "P1")],
            }))
            .await
            .unwrap()
            .0;
        assert_eq!(fix.export, "P1->R1");

        let none = server
            .suggest_resolution(Parameters(SuggestRequest {
                cycles: Vec::<Cycle>::new(),
            }))
            .await
            .unwrap()
            .0;
        assert_eq!(none.suggestions.len(), 1);
    }

    #[tokio::test]
    async fn test_mcp_invalid_edge_is_error() {
        let server = RagMcpServer::new(DeadlockEngine::default());
        let result = server
            .analyze_edges(Parameters(AnalyzeRequest {
                edges: vec![Edge::new("", "R1")],
                weights: None,
                history: None,
            }))
            .await;
        let Err(err) = result else {
            panic!("expected an invalid edge error");
        };
        assert!(err.contains("invalid edge"));
    }
}
