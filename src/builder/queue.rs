//! Build Queue
//!
//! FIFO of pending `BuildRequest`s together with the shared `BuildState`.
//!
//! Both live behind one mutex: popping the head of the queue and flagging the
//! build as in flight is a single atomic step (`claim_next`), and a snapshot
//! always sees the queue and the build flag from the same instant. The lock is
//! only ever held for bookkeeping, never across an `.await`.

use super::types::*;
use crate::term::Term;

use parking_lot::Mutex;
use std::collections::VecDeque;
use tokio::sync::Notify;
use tokio::time::Instant;

#[derive(Default)]
struct QueueInner {
    pending: VecDeque<BuildRequest>,
    state: BuildState,
}

pub struct BuildQueue {
    inner: Mutex<QueueInner>,
    /// Wakes the background drain loop when work arrives.
    work_available: Notify,
}

impl BuildQueue {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(QueueInner::default()),
            work_available: Notify::new(),
        }
    }

    /// Appends a request to the tail and returns its 1-based position.
    ///
    /// Never blocks on a running build.
    pub fn enqueue(&self, request: BuildRequest) -> usize {
        let term = request.term;
        let id = request.id;
        let position = {
            let mut inner = self.inner.lock();
            inner.pending.push_back(request);
            inner.pending.len()
        };

        self.work_available.notify_one();
        tracing::info!(
            "Queued build {} for {} (position {})",
            id,
            term,
            position
        );
        position
    }

    /// Pops the head of the queue and marks it as the in-flight build.
    ///
    /// Returns `None` if the queue is empty or a build is already running.
    pub fn claim_next(&self) -> Option<BuildRequest> {
        let mut inner = self.inner.lock();
        if inner.state.building {
            return None;
        }

        let request = inner.pending.pop_front()?;
        Self::mark_started(&mut inner.state, request.term);
        Some(request)
    }

    /// Marks a build that did not come from the queue (startup builds) as in flight.
    ///
    /// Returns `false` if another build is already running.
    pub fn begin(&self, term: Term) -> bool {
        let mut inner = self.inner.lock();
        if inner.state.building {
            return false;
        }
        Self::mark_started(&mut inner.state, term);
        true
    }

    fn mark_started(state: &mut BuildState, term: Term) {
        state.building = true;
        state.current = Some(term);
        state.started_at = Some(Instant::now());
    }

    /// Closes out the in-flight build.
    pub fn finish(&self, outcome: BuildOutcome) {
        let mut inner = self.inner.lock();
        let state = &mut inner.state;

        state.building = false;
        state.current = None;
        state.ended_at = Some(Instant::now());
        state.builds_completed += 1;

        match outcome {
            BuildOutcome::Succeeded => state.last_error = None,
            BuildOutcome::Failed(message) => state.last_error = Some(message),
        }
    }

    /// Records a failure that happened outside a build (e.g. term discovery).
    pub fn record_error(&self, message: String) {
        self.inner.lock().state.last_error = Some(message);
    }

    pub fn snapshot(&self) -> BuildSnapshot {
        let inner = self.inner.lock();
        let state = &inner.state;

        BuildSnapshot {
            building: state.building,
            build_duration: state.duration(Instant::now()),
            last_error: state.last_error.clone(),
            builds_completed: state.builds_completed,
            queue: Self::queue_status(&inner),
        }
    }

    pub fn status(&self) -> QueueStatus {
        Self::queue_status(&self.inner.lock())
    }

    fn queue_status(inner: &QueueInner) -> QueueStatus {
        let pending = inner
            .pending
            .iter()
            .enumerate()
            .map(|(index, request)| QueuedBuild {
                position: index + 1,
                id: request.id,
                term: request.term,
                allowed_subjects: request.allowed_subjects.clone(),
                enqueued_at: request.enqueued_at,
            })
            .collect();

        QueueStatus {
            length: inner.pending.len(),
            current: inner.state.current,
            pending,
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().pending.is_empty()
    }

    pub fn is_building(&self) -> bool {
        self.inner.lock().state.building
    }

    /// Resolves once `enqueue` has been called since the last wake-up.
    pub async fn wait_for_work(&self) {
        self.work_available.notified().await;
    }
}

impl Default for BuildQueue {
    fn default() -> Self {
        Self::new()
    }
}
