use crate::index::SubjectFilter;
use crate::term::Term;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

/// A request to (re)build the index of one term.
///
/// Requests for the same term are not deduplicated; the last one processed wins.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub id: Uuid,
    pub term: Term,
    pub allowed_subjects: Option<SubjectFilter>,
    pub enqueued_at: DateTime<Utc>,
}

impl BuildRequest {
    pub fn new(term: Term, allowed_subjects: Option<SubjectFilter>) -> Self {
        Self {
            id: Uuid::new_v4(),
            term,
            allowed_subjects,
            enqueued_at: Utc::now(),
        }
    }
}

/// Result of one build attempt, as recorded into the build state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    Succeeded,
    Failed(String),
}

/// Process-wide build bookkeeping. Lives inside `BuildQueue`.
#[derive(Debug, Default)]
pub(crate) struct BuildState {
    /// True exactly while one request is being built.
    pub building: bool,
    pub current: Option<Term>,
    pub started_at: Option<Instant>,
    pub ended_at: Option<Instant>,
    /// Message of the most recent failed build. Only a successful build clears it.
    pub last_error: Option<String>,
    pub builds_completed: u64,
}

impl BuildState {
    /// Duration of the current build, or of the last finished one.
    pub fn duration(&self, now: Instant) -> Option<Duration> {
        let started = self.started_at?;
        if self.building {
            return Some(now.saturating_duration_since(started));
        }
        self.ended_at
            .map(|ended| ended.saturating_duration_since(started))
    }
}

/// Consistent point-in-time copy of the build state and the pending queue.
#[derive(Debug, Clone)]
pub struct BuildSnapshot {
    pub building: bool,
    pub build_duration: Option<Duration>,
    pub last_error: Option<String>,
    /// Number of builds (successful or not) that have finished.
    pub builds_completed: u64,
    pub queue: QueueStatus,
}

/// Pending requests, in the order they will be built.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueueStatus {
    /// Pending requests only. The in-flight request is reported as `current`.
    pub length: usize,
    pub current: Option<Term>,
    pub pending: Vec<QueuedBuild>,
}

impl QueueStatus {
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueuedBuild {
    /// 1-based position; the head of the queue is built next.
    pub position: usize,
    pub id: Uuid,
    pub term: Term,
    pub allowed_subjects: Option<SubjectFilter>,
    pub enqueued_at: DateTime<Utc>,
}
