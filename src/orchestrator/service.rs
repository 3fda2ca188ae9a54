use super::health::{duration_seconds, HealthReport};
use crate::builder::{
    BuildQueue, BuildRequest, BuildWorker, QueueStatus, Sleeper, StartupOutcome,
    StartupSequencer, TokioSleeper,
};
use crate::builder::startup::MAX_STARTUP_RETRIES;
use crate::error::{ServiceError, ValidationError};
use crate::index::{normalize_subjects, IndexDescriptor, IndexEngine, IndexEntry, IndexStore};
use crate::term::{resolve_term, Term, TermBounds};

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub bounds: TermBounds,
    /// Term used by searches that do not name one.
    pub default_term: Option<Term>,
    pub startup_attempts: u32,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            bounds: TermBounds::default(),
            default_term: None,
            startup_attempts: MAX_STARTUP_RETRIES,
        }
    }
}

/// Returned by `refresh_async` once the request is queued.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefreshAccepted {
    pub accepted: bool,
    pub term: Term,
    /// 1-based position among pending requests at the time of enqueueing.
    pub queue_position: usize,
}

#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub query: String,
    pub threshold: f32,
    pub year: Option<i32>,
    pub semester: Option<String>,
    pub allowed_subjects: Option<Vec<String>>,
}

pub struct SearchOutcome<E: IndexEngine> {
    pub term: Term,
    /// The entry the search ran against. Stays valid even if the term is rebuilt.
    pub entry: Arc<IndexEntry<E::Index>>,
    pub hits: Vec<E::Hit>,
}

/// Owns the index store, the build queue and the build worker, and exposes the
/// operations the HTTP layer needs. None of them waits for a build to finish.
pub struct Orchestrator<E: IndexEngine> {
    engine: Arc<E>,
    store: Arc<IndexStore<E::Index>>,
    queue: Arc<BuildQueue>,
    worker: Arc<BuildWorker<E>>,
    settings: OrchestratorSettings,
}

impl<E: IndexEngine> Orchestrator<E> {
    pub fn new(engine: Arc<E>, settings: OrchestratorSettings) -> Arc<Self> {
        let store = Arc::new(IndexStore::new());
        let queue = Arc::new(BuildQueue::new());
        let worker = BuildWorker::new(engine.clone(), queue.clone(), store.clone());

        Arc::new(Self {
            engine,
            store,
            queue,
            worker,
            settings,
        })
    }

    /// Starts the background drain loop and the startup sequencer.
    ///
    /// Returns the sequencer's done-signal; the sequencer itself is never joined.
    pub fn start(&self) -> watch::Receiver<Option<StartupOutcome>> {
        self.start_with_sleeper(Arc::new(TokioSleeper))
    }

    pub fn start_with_sleeper(
        &self,
        sleeper: Arc<dyn Sleeper>,
    ) -> watch::Receiver<Option<StartupOutcome>> {
        self.worker.clone().start();
        StartupSequencer::new(self.worker.clone())
            .with_sleeper(sleeper)
            .with_max_attempts(self.settings.startup_attempts)
            .spawn()
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    pub fn worker(&self) -> &Arc<BuildWorker<E>> {
        &self.worker
    }

    pub fn store(&self) -> &Arc<IndexStore<E::Index>> {
        &self.store
    }

    /// Validates the term and queues a rebuild for it. Returns without waiting.
    pub fn refresh_async(
        &self,
        year: i32,
        semester: &str,
        allowed_subjects: Option<Vec<String>>,
    ) -> Result<RefreshAccepted, ValidationError> {
        let term = Term::parse(year, semester, &self.settings.bounds)?;
        let request = BuildRequest::new(term, normalize_subjects(allowed_subjects));
        let queue_position = self.queue.enqueue(request);

        Ok(RefreshAccepted {
            accepted: true,
            term,
            queue_position,
        })
    }

    /// Searches the index of the requested (or default) term.
    ///
    /// Fails fast with `ServiceError::NotReady` when that index has not been built.
    pub async fn search(&self, query: SearchQuery) -> Result<SearchOutcome<E>, ServiceError> {
        if query.query.trim().is_empty() {
            return Err(ValidationError::EmptyQuery.into());
        }
        if !(0.0..=1.0).contains(&query.threshold) {
            return Err(ValidationError::InvalidThreshold(query.threshold).into());
        }

        let term = resolve_term(
            query.year,
            query.semester.as_deref(),
            self.settings.default_term.as_ref(),
            &self.settings.bounds,
        )?;

        let entry = self
            .store
            .get(&term)
            .ok_or(ServiceError::NotReady { term })?;

        let filter = normalize_subjects(query.allowed_subjects);
        let hits = self
            .engine
            .search(entry.index(), &query.query, query.threshold, filter.as_ref())
            .await
            .map_err(ServiceError::Engine)?;

        tracing::debug!(
            "Search '{}' on {} returned {} result(s)",
            query.query,
            term,
            hits.len()
        );

        Ok(SearchOutcome { term, entry, hits })
    }

    pub fn describe_indices(&self) -> Vec<IndexDescriptor> {
        self.store.describe_all()
    }

    pub fn queue_status(&self) -> QueueStatus {
        self.queue.status()
    }

    /// Duration of the running build, or of the most recent finished one.
    pub fn build_duration_seconds(&self) -> Option<f64> {
        duration_seconds(self.queue.snapshot().build_duration)
    }

    pub fn health_status(&self) -> HealthReport {
        let snapshot = self.queue.snapshot();
        let indexes = self.store.describe_all();
        HealthReport::from_snapshot(snapshot, indexes)
    }
}
