//! Shared test doubles: a scriptable `IndexEngine` and a recording `Sleeper`.

use crate::builder::{BuildQueue, Sleeper};
use crate::index::{EngineFuture, IndexEngine, SubjectFilter};
use crate::term::{Semester, Term, TermBounds};

use parking_lot::Mutex;
use serde::Serialize;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

pub fn term(year: i32, semester: Semester) -> Term {
    Term::new(year, semester, &TermBounds::default()).unwrap()
}

/// Polls `condition` until it holds, panicking after five seconds.
pub async fn wait_until(condition: impl Fn() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not reached within 5s"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

#[derive(Debug)]
pub struct FakeIndex {
    pub term: Term,
    pub courses: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FakeHit {
    pub code: String,
    pub subject: String,
    pub score: f32,
}

/// Engine whose discovery, failures and timing are scripted by the test.
#[derive(Default)]
pub struct FakeEngine {
    discovered: Mutex<Vec<Term>>,
    /// Number of upcoming `discover` calls that fail.
    discover_failures: AtomicUsize,
    /// Number of upcoming `build` calls that fail.
    build_failures: AtomicUsize,
    panic_next_build: Mutex<bool>,
    build_delay: Mutex<Duration>,
    /// When set, every build waits for one permit.
    gate: Mutex<Option<Arc<Semaphore>>>,

    pub discover_calls: AtomicUsize,
    pub build_calls: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub built: Mutex<Vec<Term>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_terms(self, terms: Vec<Term>) -> Self {
        *self.discovered.lock() = terms;
        self
    }

    pub fn failing_discover(self, times: usize) -> Self {
        self.discover_failures.store(times, Ordering::SeqCst);
        self
    }

    pub fn failing_builds(self, times: usize) -> Self {
        self.build_failures.store(times, Ordering::SeqCst);
        self
    }

    pub fn panicking_next_build(self) -> Self {
        *self.panic_next_build.lock() = true;
        self
    }

    pub fn with_build_delay(self, delay: Duration) -> Self {
        *self.build_delay.lock() = delay;
        self
    }

    /// Makes builds block until the returned semaphore receives permits.
    pub fn gated(self) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        *self.gate.lock() = Some(gate.clone());
        (self, gate)
    }

    pub fn built_terms(&self) -> Vec<Term> {
        self.built.lock().clone()
    }
}

fn take_one(counter: &AtomicUsize) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

impl IndexEngine for FakeEngine {
    type Index = FakeIndex;
    type Hit = FakeHit;

    fn discover(&self) -> EngineFuture<'_, Vec<Term>> {
        Box::pin(async move {
            let call = self.discover_calls.fetch_add(1, Ordering::SeqCst) + 1;
            if take_one(&self.discover_failures) {
                anyhow::bail!("catalog backend unreachable (discover call {})", call);
            }
            Ok(self.discovered.lock().clone())
        })
    }

    fn build<'a>(
        &'a self,
        term: Term,
        allowed_subjects: Option<&'a SubjectFilter>,
    ) -> EngineFuture<'a, Self::Index> {
        Box::pin(async move {
            let call = self.build_calls.fetch_add(1, Ordering::SeqCst) + 1;
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            let gate = self.gate.lock().clone();
            if let Some(gate) = gate {
                if let Ok(permit) = gate.acquire().await {
                    permit.forget();
                }
            }
            let delay = *self.build_delay.lock();
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            let should_panic = std::mem::replace(&mut *self.panic_next_build.lock(), false);
            if should_panic {
                panic!("engine exploded while building {}", term);
            }
            if take_one(&self.build_failures) {
                anyhow::bail!("backend unavailable (build call {})", call);
            }

            self.built.lock().push(term);
            let courses = [("CS101", "CS"), ("MATH200", "MATH"), ("CS300", "CS")]
                .into_iter()
                .filter(|(_, subject)| allowed_subjects.map_or(true, |f| f.contains(*subject)))
                .map(|(code, subject)| (code.to_string(), subject.to_string()))
                .collect();

            Ok(FakeIndex { term, courses })
        })
    }

    fn search<'a>(
        &'a self,
        index: &'a Self::Index,
        query: &'a str,
        threshold: f32,
        allowed_subjects: Option<&'a SubjectFilter>,
    ) -> EngineFuture<'a, Vec<Self::Hit>> {
        Box::pin(async move {
            if query == "explode" {
                anyhow::bail!("scoring backend crashed");
            }
            let needle = query.to_lowercase();
            Ok(index
                .courses
                .iter()
                .filter(|(code, _)| code.to_lowercase().contains(&needle))
                .filter(|(_, subject)| allowed_subjects.map_or(true, |f| f.contains(subject)))
                .map(|(code, subject)| FakeHit {
                    code: code.clone(),
                    subject: subject.clone(),
                    score: 1.0,
                })
                .filter(|hit| hit.score >= threshold)
                .collect())
        })
    }
}

/// Sleeper that returns immediately and records what it was asked to wait for.
///
/// When observing a queue it also records `last_error` at the moment of each sleep.
#[derive(Default)]
pub struct RecordingSleeper {
    pub slept: Mutex<Vec<Duration>>,
    pub errors_at_sleep: Mutex<Vec<Option<String>>>,
    queue: Option<Arc<BuildQueue>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observing(queue: Arc<BuildQueue>) -> Self {
        Self {
            queue: Some(queue),
            ..Self::default()
        }
    }

    pub fn slept_secs(&self) -> Vec<u64> {
        self.slept.lock().iter().map(|d| d.as_secs()).collect()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        self.slept.lock().push(duration);
        if let Some(queue) = &self.queue {
            self.errors_at_sleep
                .lock()
                .push(queue.snapshot().last_error);
        }
        Box::pin(async {})
    }
}
