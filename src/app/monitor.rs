//! Live allocation monitor.
//!
//! `Stopped -> Running` on [`LiveMonitor::start`], `Running -> Stopped` on
//! [`LiveMonitor::stop`]; both are idempotent. While running, a single background
//! thread replaces the edge list once per interval. Readers always get a full copy
//! taken under the same lock, never a reference into the monitor's storage.

use crate::adapters::simulation::{SimulatedAllocations, SimulationConfig};
use crate::domain::edge::{Edge, EdgeRelation};
use crate::domain::ports::AllocationSource;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{info, trace, warn};

/// Longest uninterrupted sleep, so a stop request is noticed promptly.
const SLEEP_SLICE: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, rmcp::schemars::JsonSchema)]
#[serde(default)]
pub struct MonitorConfig {
    /// Refresh interval in milliseconds.
    pub interval_ms: u64,
    pub simulation: SimulationConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_ms: 2000,
            simulation: SimulationConfig::default(),
        }
    }
}

/// Read-only summary of the current snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, rmcp::schemars::JsonSchema)]
pub struct MonitorMetrics {
    pub processes: usize,
    pub resources: usize,
    /// Edges in the current snapshot.
    pub allocations: usize,
    /// Requests for a resource currently assigned to a different process.
    pub waiting: usize,
    pub ticks: u64,
    pub failed_ticks: u64,
    pub running: bool,
}

struct Shared {
    running: AtomicBool,
    edges: RwLock<Vec<Edge>>,
    ticks: AtomicU64,
    failed_ticks: AtomicU64,
}

type SharedSource = Arc<Mutex<Box<dyn AllocationSource>>>;

pub struct LiveMonitor {
    shared: Arc<Shared>,
    source: SharedSource,
    worker: Mutex<Option<JoinHandle<()>>>,
    interval: Duration,
    processes: usize,
    resources: usize,
}

impl LiveMonitor {
    /// Monitor over the randomized allocation simulation.
    pub fn new(config: MonitorConfig) -> Self {
        let interval = Duration::from_millis(config.interval_ms);
        Self::with_source(Box::new(SimulatedAllocations::new(config.simulation)), interval)
    }

    pub fn with_source(source: Box<dyn AllocationSource>, interval: Duration) -> Self {
        let processes = source.processes().len();
        let resources = source.resources().len();
        Self {
            shared: Arc::new(Shared {
                running: AtomicBool::new(false),
                edges: RwLock::new(Vec::new()),
                ticks: AtomicU64::new(0),
                failed_ticks: AtomicU64::new(0),
            }),
            source: Arc::new(Mutex::new(source)),
            worker: Mutex::new(None),
            interval,
            processes,
            resources,
        }
    }

    /// Spawn the refresh loop. Returns `false` if it was already running.
    pub fn start(&self) -> Result<bool> {
        let mut worker = lock(&self.worker);
        if self.shared.running.load(Ordering::Acquire) {
            return Ok(false);
        }
        if let Some(stale) = worker.take() {
            let _ = stale.join();
        }

        self.shared.running.store(true, Ordering::Release);
        let shared = Arc::clone(&self.shared);
        let source = Arc::clone(&self.source);
        let interval = self.interval;
        let spawned = std::thread::Builder::new()
            .name("rag-monitor".into())
            .spawn(move || run_loop(&shared, &source, interval));

        match spawned {
            Ok(handle) => {
                *worker = Some(handle);
                info!(interval_ms = interval.as_millis() as u64, "live monitor started");
                Ok(true)
            }
            Err(e) => {
                self.shared.running.store(false, Ordering::Release);
                Err(e).context("Failed to spawn monitor thread")
            }
        }
    }

    /// Clear the running flag and join the loop. Returns `false` if it was already stopped.
    ///
    /// The loop exits at its next check of the flag, so this blocks for at most one
    /// refresh plus a short sleep slice.
    pub fn stop(&self) -> bool {
        let mut worker = lock(&self.worker);
        let was_running = self.shared.running.swap(false, Ordering::AcqRel);
        if let Some(handle) = worker.take()
            && handle.join().is_err()
        {
            warn!("monitor thread panicked");
        }
        if was_running {
            info!("live monitor stopped");
        }
        was_running
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// Run a single refresh on the caller's thread.
    pub fn refresh_now(&self) -> Result<()> {
        refresh(&self.shared, &self.source)
    }

    /// Copy of the current edge list.
    pub fn snapshot(&self) -> Vec<Edge> {
        self.shared
            .edges
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn metrics(&self) -> MonitorMetrics {
        let edges = self
            .shared
            .edges
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        MonitorMetrics {
            processes: self.processes,
            resources: self.resources,
            allocations: edges.len(),
            waiting: waiting_requests(&edges),
            ticks: self.shared.ticks.load(Ordering::Relaxed),
            failed_ticks: self.shared.failed_ticks.load(Ordering::Relaxed),
            running: self.is_running(),
        }
    }
}

impl Drop for LiveMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

fn lock<T: ?Sized>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

fn run_loop(shared: &Shared, source: &SharedSource, interval: Duration) {
    while shared.running.load(Ordering::Acquire) {
        if let Err(e) = refresh(shared, source) {
            warn!(error = %e, "monitor refresh failed, keeping previous snapshot");
        }

        let deadline = Instant::now() + interval;
        while shared.running.load(Ordering::Acquire) {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            std::thread::sleep((deadline - now).min(SLEEP_SLICE));
        }
    }
}

/// Pull the next state and swap it in under one write lock.
fn refresh(shared: &Shared, source: &SharedSource) -> Result<()> {
    let next = lock(source).next_edges();
    match next {
        Ok(edges) => {
            let count = edges.len();
            *shared.edges.write().unwrap_or_else(PoisonError::into_inner) = edges;
            let tick = shared.ticks.fetch_add(1, Ordering::Relaxed) + 1;
            trace!(tick, edges = count, "monitor snapshot replaced");
            Ok(())
        }
        Err(e) => {
            shared.failed_ticks.fetch_add(1, Ordering::Relaxed);
            Err(e)
        }
    }
}

/// Request edges whose resource is held by some other process.
fn waiting_requests(edges: &[Edge]) -> usize {
    let mut holders: HashMap<&str, Vec<&str>> = HashMap::new();
    for e in edges {
        if e.relation() == EdgeRelation::Assignment {
            holders
                .entry(e.source.as_str())
                .or_default()
                .push(e.target.as_str());
        }
    }
    edges
        .iter()
        .filter(|e| e.relation() == EdgeRelation::Request)
        .filter(|e| {
            holders
                .get(e.target.as_str())
                .is_some_and(|hs| hs.iter().any(|h| *h != e.source))
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    struct Scripted {
        states: Vec<Result<Vec<Edge>, String>>,
        pos: usize,
        processes: Vec<String>,
        resources: Vec<String>,
    }

    impl Scripted {
        fn new(states: Vec<Result<Vec<Edge>, String>>) -> Self {
            Self {
                states,
                pos: 0,
                processes: vec!["P1".into()],
                resources: vec!["R1".into(), "R2".into()],
            }
        }
    }

    impl AllocationSource for Scripted {
        fn next_edges(&mut self) -> Result<Vec<Edge>> {
            let state = self.states[self.pos % self.states.len()].clone();
            self.pos += 1;
            state.map_err(|e| anyhow!(e))
        }
        fn processes(&self) -> &[String] {
            &self.processes
        }
        fn resources(&self) -> &[String] {
            &self.resources
        }
    }

    #[test]
    fn test_waiting_counts_contended_requests() {
        let edges = vec![
            Edge::new("R1", "P1"),
            Edge::new("P2", "R1"),
            Edge::new("P1", "R1"),
            Edge::new("P3", "R2"),
        ];
        assert_eq!(waiting_requests(&edges), 1);
    }

    #[test]
    fn test_failed_refresh_keeps_previous_snapshot() {
        let monitor = LiveMonitor::with_source(
            Box::new(Scripted::new(vec![
                Ok(vec![Edge::new("P1", "R1")]),
                Err("source unavailable".into()),
            ])),
            Duration::from_millis(10),
        );
        monitor.refresh_now().unwrap();
        assert!(monitor.refresh_now().is_err());
        assert_eq!(monitor.snapshot(), vec![Edge::new("P1", "R1")]);
        let m = monitor.metrics();
        assert_eq!((m.ticks, m.failed_ticks), (1, 1));
        assert_eq!((m.processes, m.resources, m.allocations), (1, 2, 1));
    }

    #[test]
    fn test_loop_survives_errors() {
        let monitor = LiveMonitor::with_source(
            Box::new(Scripted::new(vec![
                Err("flaky".into()),
                Ok(vec![Edge::new("P1", "R1")]),
            ])),
            Duration::from_millis(1),
        );
        assert!(monitor.start().unwrap());
        let deadline = Instant::now() + Duration::from_secs(5);
        while monitor.metrics().ticks < 3 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(2));
        }
        assert!(monitor.stop());
        let m = monitor.metrics();
        assert!(m.ticks >= 3);
        assert!(m.failed_ticks >= 3);
        assert!(!m.running);
    }

    #[test]
    fn test_start_and_stop_are_idempotent() {
        let monitor = LiveMonitor::with_source(
            Box::new(Scripted::new(vec![Ok(vec![])])),
            Duration::from_millis(5),
        );
        assert!(!monitor.stop());
        assert!(monitor.start().unwrap());
        assert!(!monitor.start().unwrap());
        assert!(monitor.is_running());
        assert!(monitor.stop());
        assert!(!monitor.stop());
        assert!(monitor.start().unwrap());
        assert!(monitor.stop());
    }
}
