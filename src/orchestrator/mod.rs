//! Orchestrator Module
//!
//! Facade over the index store and the build machinery. It is the only thing the
//! HTTP layer talks to.
//!
//! ## Operations
//! - **`refresh_async`**: Validate a term and queue a rebuild for it.
//! - **`search`**: Resolve the term, find its ready index and delegate to the engine.
//! - **`health_status`**: Derive the service status from a consistent snapshot of the
//!   build state (`building` > `queued` > `ok` > `error` > `waiting`).
//! - **`describe_indices`**, **`queue_status`**, **`build_duration_seconds`**: Diagnostics.

pub mod health;
pub mod service;

pub use health::{derive_status, HealthReport, HealthStatus};
pub use service::{Orchestrator, OrchestratorSettings, RefreshAccepted, SearchOutcome, SearchQuery};
