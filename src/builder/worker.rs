//! Single-Flight Build Worker
//!
//! Executes build requests one at a time, process-wide.
//!
//! ## Responsibilities
//! - **Mutual exclusion**: Every build, queued or direct, runs while holding the
//!   `flight` guard, so two engine builds never overlap.
//! - **Isolation**: A failing (or panicking) build is recorded into the build state and
//!   the worker moves on to the next request. Failed requests are not requeued.
//! - **Publication**: A successful build is installed into the `IndexStore` before the
//!   build state flips back to idle.

use super::queue::BuildQueue;
use super::types::*;
use crate::index::{IndexEngine, IndexStore};

use std::sync::Arc;
use std::time::Instant;

pub struct BuildWorker<E: IndexEngine> {
    engine: Arc<E>,
    queue: Arc<BuildQueue>,
    store: Arc<IndexStore<E::Index>>,
    /// Held for the whole duration of one build.
    flight: tokio::sync::Mutex<()>,
}

impl<E: IndexEngine> BuildWorker<E> {
    pub fn new(
        engine: Arc<E>,
        queue: Arc<BuildQueue>,
        store: Arc<IndexStore<E::Index>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            engine,
            queue,
            store,
            flight: tokio::sync::Mutex::new(()),
        })
    }

    pub fn engine(&self) -> &Arc<E> {
        &self.engine
    }

    pub fn queue(&self) -> &Arc<BuildQueue> {
        &self.queue
    }

    pub fn store(&self) -> &Arc<IndexStore<E::Index>> {
        &self.store
    }

    /// Spawns the background drain loop and returns immediately.
    pub fn start(self: Arc<Self>) {
        tokio::spawn(async move {
            self.run_forever().await;
        });
        tracing::info!("Build worker started");
    }

    /// Waits for queued work and drains it, forever.
    pub async fn run_forever(&self) {
        loop {
            self.queue.wait_for_work().await;
            let processed = self.drain().await;
            tracing::trace!("Drain cycle processed {} request(s)", processed);
        }
    }

    /// Builds queued requests in FIFO order until the queue is empty.
    ///
    /// Returns the number of requests processed by this call.
    pub async fn drain(&self) -> usize {
        let mut processed = 0;

        loop {
            let _flight = self.flight.lock().await;
            let Some(request) = self.queue.claim_next() else {
                break;
            };
            self.execute(request).await;
            processed += 1;
        }

        processed
    }

    /// Builds one request directly, bypassing the queue but not the single-flight guard.
    ///
    /// Returns `true` if the index was built and installed.
    pub async fn run(&self, request: BuildRequest) -> bool {
        let _flight = self.flight.lock().await;
        if !self.queue.begin(request.term) {
            tracing::warn!("Build state busy, skipping direct build for {}", request.term);
            return false;
        }
        self.execute(request).await
    }

    /// Runs the engine build for a request that is already marked in flight.
    async fn execute(&self, request: BuildRequest) -> bool {
        let term = request.term;
        let started = Instant::now();
        tracing::info!("Building index for {} (request {})", term, request.id);

        // A panicking engine surfaces here as a JoinError.
        let engine = self.engine.clone();
        let filter = request.allowed_subjects.clone();
        let result = tokio::spawn(async move { engine.build(term, filter.as_ref()).await }).await;

        match result {
            Ok(Ok(index)) => {
                let entry = self.store.put(term, request.allowed_subjects, index);
                self.queue.finish(BuildOutcome::Succeeded);
                tracing::info!(
                    "Index for {} ready in {:.1}s (last_refreshed {})",
                    term,
                    started.elapsed().as_secs_f64(),
                    entry.last_refreshed().to_rfc3339()
                );
                true
            }
            Ok(Err(e)) => {
                let message = format!("{:#}", e);
                tracing::error!("Index build for {} failed: {}", term, message);
                self.queue.finish(BuildOutcome::Failed(message));
                false
            }
            Err(join_error) => {
                let message = format!("index build for {} aborted: {}", term, join_error);
                tracing::error!("{}", message);
                self.queue.finish(BuildOutcome::Failed(message));
                false
            }
        }
    }
}
