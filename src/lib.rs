//! rag-deadlock library: resource allocation graph construction, cycle detection,
//! risk scoring, resolution advice and live monitoring.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod domain;
pub mod server;
