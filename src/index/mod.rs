//! Index Module
//!
//! Holds the per-term search indexes and the boundary to whatever builds them.
//!
//! ## Submodules
//! - **`engine`**: The `IndexEngine` trait. Discovery, building and querying of an
//!   index are delegated to an implementation of this trait; the orchestrator only
//!   ever sees the opaque `IndexEngine::Index` handle.
//! - **`store`**: `IndexStore`, the authoritative cache of built indexes keyed by term.
//!   Entries are immutable and replaced wholesale on rebuild.
//! - **`types`**: `IndexEntry`, `IndexDescriptor` and subject filter helpers.

pub mod engine;
pub mod store;
pub mod types;

pub use engine::{EngineFuture, IndexEngine};
pub use store::IndexStore;
pub use types::{normalize_subjects, IndexDescriptor, IndexEntry, SubjectFilter};
