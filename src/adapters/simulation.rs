use crate::domain::edge::Edge;
use crate::domain::ports::AllocationSource;
use anyhow::Result;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Parameters of the randomized allocation workload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(default)]
pub struct SimulationConfig {
    pub processes: Vec<String>,
    pub resources: Vec<String>,
    /// Chance that a process requests a resource on a tick.
    pub request_probability: f64,
    /// Chance that the requested resource is also held by some process.
    pub hold_probability: f64,
    /// Fixed seed for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            processes: vec!["P1".into(), "P2".into(), "P3".into()],
            resources: vec!["R1".into(), "R2".into(), "R3".into()],
            request_probability: 0.6,
            hold_probability: 0.4,
            seed: None,
        }
    }
}

/// Generates a plausible, freshly randomized allocation state on every call.
pub struct SimulatedAllocations {
    config: SimulationConfig,
    rng: StdRng,
}

impl SimulatedAllocations {
    pub fn new(config: SimulationConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { config, rng }
    }

    fn chance(&mut self, p: f64) -> bool {
        self.rng.gen_bool(p.clamp(0.0, 1.0))
    }
}

impl AllocationSource for SimulatedAllocations {
    fn next_edges(&mut self) -> Result<Vec<Edge>> {
        let mut edges = Vec::new();
        for i in 0..self.config.processes.len() {
            if !self.chance(self.config.request_probability) {
                continue;
            }
            let Some(resource) = self.config.resources.choose(&mut self.rng).cloned() else {
                continue;
            };
            edges.push(Edge::new(self.config.processes[i].clone(), resource.clone()));

            if self.chance(self.config.hold_probability)
                && let Some(holder) = self.config.processes.choose(&mut self.rng).cloned()
            {
                edges.push(Edge::new(resource, holder));
            }
        }
        Ok(edges)
    }

    fn processes(&self) -> &[String] {
        &self.config.processes
    }

    fn resources(&self) -> &[String] {
        &self.config.resources
    }
}
