// crates/core/src/lib.rs
//! Supervisory and log-reading core for the atc-deck demo dashboard.
//!
//! This crate owns everything both front ends share: environment-derived
//! configuration, health probing of the external services, the lifecycle of
//! the bridge and agent subprocesses, and the read-only views over the JSONL
//! event logs the agent writes (replay, decisions, metrics, session catalog).

pub mod catalog;
pub mod config;
pub mod decisions;
pub mod error;
pub mod events;
pub mod metrics;
pub mod probe;
pub mod reader;
pub mod supervisor;

pub use catalog::{list_sessions, SessionMetadata};
pub use config::Config;
pub use decisions::{derive_decisions, DecisionRecord};
pub use error::{CatalogError, SupervisorError};
pub use events::{Event, EventKind};
pub use metrics::{derive_metrics, Metrics};
pub use probe::{Endpoint, HealthCheck, Prober};
pub use supervisor::{AgentOptions, Supervisor, SupervisorStatus};
