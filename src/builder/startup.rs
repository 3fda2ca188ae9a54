//! Startup Sequencer
//!
//! Builds the initial set of indexes once, in the background, at process start.
//!
//! The catalog backend is frequently not reachable yet when this service boots, so
//! the whole discover -> build -> drain cycle is retried, not just a single call:
//! an unreachable backend shows up as "no terms discovered" just as often as a
//! failed build.

use super::types::BuildRequest;
use super::worker::BuildWorker;
use crate::index::IndexEngine;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

pub const MAX_STARTUP_RETRIES: u32 = 10;

const BACKOFF_STEP: Duration = Duration::from_secs(60);
const BACKOFF_CAP: Duration = Duration::from_secs(300);

/// Delay before retrying after the given (1-based) failed attempt.
///
/// Linear in the attempt number, capped at five minutes.
pub fn backoff_delay(attempt: u32) -> Duration {
    BACKOFF_STEP.saturating_mul(attempt).min(BACKOFF_CAP)
}

/// Suspension used between startup attempts.
pub trait Sleeper: Send + Sync + 'static {
    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}

/// Production sleeper backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(tokio::time::sleep(duration))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupOutcome {
    /// At least one index exists after `attempts` cycles.
    Ready { attempts: u32 },
    /// Every attempt finished with an empty index store.
    Exhausted { attempts: u32 },
}

pub struct StartupSequencer<E: IndexEngine> {
    worker: Arc<BuildWorker<E>>,
    sleeper: Arc<dyn Sleeper>,
    max_attempts: u32,
}

impl<E: IndexEngine> StartupSequencer<E> {
    pub fn new(worker: Arc<BuildWorker<E>>) -> Self {
        Self {
            worker,
            sleeper: Arc::new(TokioSleeper),
            max_attempts: MAX_STARTUP_RETRIES,
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Runs the sequencer on a detached task.
    ///
    /// The task is never joined. The returned receiver flips to `Some(outcome)` when
    /// the sequencer terminates; callers that do not care simply drop it.
    pub fn spawn(self) -> watch::Receiver<Option<StartupOutcome>> {
        let (done_tx, done_rx) = watch::channel(None);

        tokio::spawn(async move {
            let outcome = self.run().await;
            let _ = done_tx.send(Some(outcome));
        });

        tracing::info!("Started background index building");
        done_rx
    }

    pub async fn run(&self) -> StartupOutcome {
        for attempt in 1..=self.max_attempts {
            self.run_cycle(attempt).await;

            if !self.worker.store().is_empty() {
                tracing::info!(
                    "Startup build complete after {} attempt(s), {} index(es) available",
                    attempt,
                    self.worker.store().len()
                );
                return StartupOutcome::Ready { attempts: attempt };
            }

            if attempt < self.max_attempts {
                let wait = backoff_delay(attempt);
                tracing::info!(
                    "No indexes available yet, retrying in {}s (attempt {}/{})...",
                    wait.as_secs(),
                    attempt,
                    self.max_attempts
                );
                self.sleeper.sleep(wait).await;
            }
        }

        tracing::error!(
            "Startup build exhausted all {} retries",
            self.max_attempts
        );
        StartupOutcome::Exhausted {
            attempts: self.max_attempts,
        }
    }

    /// One discover -> build -> drain pass. Every failure is recorded, none aborts.
    async fn run_cycle(&self, attempt: u32) {
        match self.worker.engine().discover().await {
            Ok(terms) => {
                tracing::info!(
                    "Attempt {}/{}: discovered {} term(s)",
                    attempt,
                    self.max_attempts,
                    terms.len()
                );
                for term in terms {
                    self.worker.run(BuildRequest::new(term, None)).await;
                }
            }
            Err(e) => {
                let message = format!("{:#}", e);
                tracing::error!(
                    "Startup build attempt {}/{} failed: {}",
                    attempt,
                    self.max_attempts,
                    message
                );
                self.worker.queue().record_error(message);
            }
        }

        self.worker.drain().await;
    }
}
