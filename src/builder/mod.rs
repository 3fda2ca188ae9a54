//! Index Build Module
//!
//! Keeps the per-term indexes fresh without ever running two builds at once.
//!
//! ## Architecture Overview
//! 1. **Submission**: Refresh requests are appended to the `BuildQueue` and the call
//!    returns immediately with the request's queue position.
//! 2. **Claiming**: The `BuildWorker` pops the head of the queue and marks the build
//!    state as `building` in a single atomic step, so observers never see a request
//!    that is neither pending nor in flight.
//! 3. **Execution**: The worker holds a process-wide single-flight guard while the
//!    engine builds the index, then installs the result into the `IndexStore`.
//! 4. **Startup**: The `StartupSequencer` discovers terms at process start and
//!    retries the whole discover -> build -> drain cycle with a capped linear backoff
//!    until at least one index exists.
//!
//! ## Submodules
//! - **`types`**: Build requests, build state snapshots and queue status DTOs.
//! - **`queue`**: FIFO of pending requests plus the shared build state.
//! - **`worker`**: Single-flight executor and background drain loop.
//! - **`startup`**: Startup retry policy and the sleep abstraction it waits through.

pub mod queue;
pub mod startup;
pub mod types;
pub mod worker;

pub use queue::BuildQueue;
pub use startup::{backoff_delay, Sleeper, StartupOutcome, StartupSequencer, TokioSleeper};
pub use types::{BuildOutcome, BuildRequest, BuildSnapshot, QueueStatus, QueuedBuild};
pub use worker::BuildWorker;

#[cfg(test)]
mod tests;
