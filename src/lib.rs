//! Semantic Course Search Service Library
//!
//! Keeps one searchable index per academic term, rebuilt in the background and
//! served over HTTP. The binary (`main.rs`) wires these modules together.
//!
//! ## Modules
//! - **`term`**: Academic terms (`year` + `semester`), validation and default-term resolution.
//! - **`index`**: The `IndexEngine` seam and the concurrent per-term index store.
//! - **`builder`**: FIFO build queue, the single-flight build worker and the startup
//!   sequencer with linear backoff.
//! - **`orchestrator`**: Refresh/search operations and the derived health status.
//! - **`catalog`**: The production engine: fetches courses from the catalog backend
//!   and scores them by token overlap.
//! - **`api`**: Axum handlers for `/health`, `/refresh` and `/search`.
//! - **`config`**: Environment-driven settings.

pub mod api;
pub mod builder;
pub mod catalog;
pub mod config;
pub mod error;
pub mod index;
pub mod orchestrator;
pub mod term;

#[cfg(test)]
pub(crate) mod test_support;
