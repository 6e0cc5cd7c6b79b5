use crate::app::dto::*;
use crate::app::engine::DeadlockEngine;
use crate::app::monitor::LiveMonitor;
use crate::adapters::text::export_edges;
use anyhow::Result;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use std::fmt::Display;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::{JoinError, spawn_blocking};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[derive(Clone)]
pub struct HttpState {
    pub engine: DeadlockEngine,
    pub monitor: Arc<LiveMonitor>,
}

#[derive(Debug, Clone, Serialize)]
struct ApiErrorBody {
    error: String,
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> Response {
    (status, Json(ApiErrorBody { error: msg.into() })).into_response()
}

/// Map a blocking task outcome to a response; domain errors become `error_status`.
fn respond<T: Serialize, E: Display>(
    outcome: std::result::Result<std::result::Result<T, E>, JoinError>,
    error_status: StatusCode,
) -> Response {
    match outcome {
        Ok(Ok(res)) => Json(res).into_response(),
        Ok(Err(e)) => api_error(error_status, e.to_string()),
        Err(e) => api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("task join error: {e}"),
        ),
    }
}

pub fn build_router(engine: DeadlockEngine, monitor: Arc<LiveMonitor>) -> Router {
    let state = Arc::new(HttpState { engine, monitor });

    Router::new()
        .route("/health", get(health))
        .route("/analyze", post(analyze))
        .route("/suggest", post(suggest))
        .route("/fix", post(fix))
        .route("/monitor/start", post(monitor_start))
        .route("/monitor/stop", post(monitor_stop))
        .route("/monitor/snapshot", get(monitor_snapshot))
        .route("/monitor/metrics", get(monitor_metrics))
        .route("/monitor/analyze", get(monitor_analyze))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn serve(engine: DeadlockEngine, monitor: Arc<LiveMonitor>, addr: SocketAddr) -> Result<()> {
    let app = build_router(engine, monitor);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "HTTP server listening");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".into(),
        monitor_running: state.monitor.is_running(),
        weights: state.engine.weights().clone(),
    })
}

async fn analyze(
    State(state): State<Arc<HttpState>>,
    Json(req): Json<AnalyzeRequest>,
) -> impl IntoResponse {
    let engine = state.engine.clone();
    respond(
        spawn_blocking(move || engine.handle(req)).await,
        StatusCode::BAD_REQUEST,
    )
}

async fn suggest(
    State(state): State<Arc<HttpState>>,
    Json(req): Json<SuggestRequest>,
) -> impl IntoResponse {
    Json(state.engine.suggest(req))
}

async fn fix(State(state): State<Arc<HttpState>>, Json(req): Json<FixRequest>) -> impl IntoResponse {
    let engine = state.engine.clone();
    respond(
        spawn_blocking(move || engine.fix(req)).await,
        StatusCode::BAD_REQUEST,
    )
}

async fn monitor_start(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let monitor = state.monitor.clone();
    respond(
        spawn_blocking(move || {
            monitor.start().map(|changed| MonitorStateResponse {
                running: monitor.is_running(),
                changed,
            })
        })
        .await,
        StatusCode::INTERNAL_SERVER_ERROR,
    )
}

async fn monitor_stop(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let monitor = state.monitor.clone();
    // stop() joins the refresh thread
    respond(
        spawn_blocking(move || {
            let changed = monitor.stop();
            Ok::<_, anyhow::Error>(MonitorStateResponse {
                running: monitor.is_running(),
                changed,
            })
        })
        .await,
        StatusCode::INTERNAL_SERVER_ERROR,
    )
}

async fn monitor_snapshot(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let edges = state.monitor.snapshot();
    let export = export_edges(&edges);
    Json(SnapshotResponse { edges, export })
}

async fn monitor_metrics(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    Json(state.monitor.metrics())
}

async fn monitor_analyze(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let edges = state.monitor.snapshot();
    let engine = state.engine.clone();
    respond(
        spawn_blocking(move || engine.analyze(&edges)).await,
        StatusCode::INTERNAL_SERVER_ERROR,
    )
}
