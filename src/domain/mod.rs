pub mod advisor;
pub mod cycles;
pub mod edge;
pub mod error;
pub mod graph;
pub mod node;
pub mod ports;
pub mod risk;
