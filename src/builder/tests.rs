//! Build Module Tests
//!
//! ## Test Scopes
//! - **Backoff**: Linear delay capped at five minutes.
//! - **Queue**: FIFO positions, atomic claim, error bookkeeping.
//! - **Worker**: FIFO draining, failure isolation, single-flight under contention.
//! - **Startup**: Retry scenarios driven by a recording sleeper (no real timers).

#[cfg(test)]
mod tests {
    use crate::builder::{
        backoff_delay, BuildOutcome, BuildQueue, BuildRequest, BuildWorker, StartupOutcome,
        StartupSequencer,
    };
    use crate::index::{normalize_subjects, IndexStore};
    use crate::term::Semester;
    use crate::test_support::{term, wait_until, FakeEngine, RecordingSleeper};
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use std::time::Duration;

    fn worker_for(engine: FakeEngine) -> (Arc<FakeEngine>, Arc<BuildWorker<FakeEngine>>) {
        let engine = Arc::new(engine);
        let worker = BuildWorker::new(
            engine.clone(),
            Arc::new(BuildQueue::new()),
            Arc::new(IndexStore::new()),
        );
        (engine, worker)
    }

    // ============================================================
    // BACKOFF POLICY
    // ============================================================

    #[test]
    fn test_backoff_is_linear_then_capped() {
        let secs: Vec<u64> = (1..=10).map(|a| backoff_delay(a).as_secs()).collect();

        assert_eq!(secs, vec![60, 120, 180, 240, 300, 300, 300, 300, 300, 300]);
    }

    #[test]
    fn test_backoff_does_not_overflow() {
        assert_eq!(backoff_delay(u32::MAX), Duration::from_secs(300));
    }

    // ============================================================
    // BUILD QUEUE
    // ============================================================

    #[test]
    fn test_enqueue_returns_fifo_positions() {
        let queue = BuildQueue::new();

        let p1 = queue.enqueue(BuildRequest::new(term(2025, Semester::Fall), None));
        let p2 = queue.enqueue(BuildRequest::new(term(2025, Semester::Spring), None));
        let p3 = queue.enqueue(BuildRequest::new(term(2025, Semester::Fall), None));

        assert_eq!((p1, p2, p3), (1, 2, 3));

        let status = queue.status();
        assert_eq!(status.length, 3);
        let order: Vec<String> = status.pending.iter().map(|p| p.term.to_string()).collect();
        assert_eq!(order, vec!["2025 Fall", "2025 Spring", "2025 Fall"]);
        let positions: Vec<usize> = status.pending.iter().map(|p| p.position).collect();
        assert_eq!(positions, vec![1, 2, 3]);
    }

    #[test]
    fn test_claim_is_atomic_and_excludes_in_flight_from_length() {
        let queue = BuildQueue::new();
        queue.enqueue(BuildRequest::new(term(2025, Semester::Fall), None));
        queue.enqueue(BuildRequest::new(term(2025, Semester::Spring), None));

        let claimed = queue.claim_next().expect("head should be claimable");
        assert_eq!(claimed.term, term(2025, Semester::Fall));

        let snapshot = queue.snapshot();
        assert!(snapshot.building);
        assert_eq!(snapshot.queue.length, 1);
        assert_eq!(snapshot.queue.current, Some(term(2025, Semester::Fall)));
        assert!(snapshot.build_duration.is_some());

        // Second claim is refused while a build is in flight
        assert!(queue.claim_next().is_none());
        assert!(!queue.begin(term(2025, Semester::Winter)));
        assert_eq!(queue.len(), 1);

        queue.finish(BuildOutcome::Succeeded);
        let snapshot = queue.snapshot();
        assert!(!snapshot.building);
        assert_eq!(snapshot.queue.current, None);
        assert_eq!(snapshot.builds_completed, 1);
    }

    #[test]
    fn test_last_error_cleared_only_by_success() {
        let queue = BuildQueue::new();

        assert!(queue.begin(term(2025, Semester::Fall)));
        queue.finish(BuildOutcome::Failed("first".to_string()));
        assert_eq!(queue.snapshot().last_error.as_deref(), Some("first"));

        assert!(queue.begin(term(2025, Semester::Fall)));
        queue.finish(BuildOutcome::Failed("second".to_string()));
        assert_eq!(queue.snapshot().last_error.as_deref(), Some("second"));

        queue.record_error("discovery".to_string());
        assert_eq!(queue.snapshot().last_error.as_deref(), Some("discovery"));

        assert!(queue.begin(term(2025, Semester::Fall)));
        queue.finish(BuildOutcome::Succeeded);
        assert_eq!(queue.snapshot().last_error, None);
    }

    #[test]
    fn test_build_duration_none_before_any_build() {
        let queue = BuildQueue::new();
        assert_eq!(queue.snapshot().build_duration, None);
    }

    // ============================================================
    // BUILD WORKER
    // ============================================================

    #[tokio::test]
    async fn test_drain_builds_in_fifo_order() {
        let (engine, worker) = worker_for(FakeEngine::new());
        let terms = vec![
            term(2025, Semester::Fall),
            term(2024, Semester::Spring),
            term(2025, Semester::Winter),
        ];
        for t in &terms {
            worker.queue().enqueue(BuildRequest::new(*t, None));
        }

        let processed = worker.drain().await;

        assert_eq!(processed, 3);
        assert_eq!(engine.built_terms(), terms);
        assert_eq!(worker.store().len(), 3);
        assert!(worker.queue().is_empty());
        assert!(!worker.queue().is_building());
    }

    #[tokio::test]
    async fn test_drain_keeps_subject_filter_on_entry() {
        let (_engine, worker) = worker_for(FakeEngine::new());
        let fall = term(2025, Semester::Fall);
        let filter = normalize_subjects(Some(vec!["CS".to_string()]));
        worker.queue().enqueue(BuildRequest::new(fall, filter.clone()));

        worker.drain().await;

        let entry = worker.store().get(&fall).unwrap();
        assert_eq!(entry.allowed_subjects(), filter.as_ref());
        assert!(entry.index().courses.iter().all(|(_, s)| s == "CS"));
    }

    #[tokio::test]
    async fn test_failed_request_does_not_poison_queue() {
        let (engine, worker) = worker_for(FakeEngine::new().failing_builds(1));
        worker.queue().enqueue(BuildRequest::new(term(2025, Semester::Fall), None));
        worker.queue().enqueue(BuildRequest::new(term(2025, Semester::Spring), None));

        let processed = worker.drain().await;

        assert_eq!(processed, 2);
        assert_eq!(engine.build_calls.load(Ordering::SeqCst), 2);
        assert!(worker.store().get(&term(2025, Semester::Fall)).is_none());
        assert!(worker.store().get(&term(2025, Semester::Spring)).is_some());
        // Later success cleared the error
        assert_eq!(worker.queue().snapshot().last_error, None);
        // Failed request was not requeued
        assert!(worker.queue().is_empty());
    }

    #[tokio::test]
    async fn test_failure_is_recorded_in_last_error() {
        let (_engine, worker) = worker_for(FakeEngine::new().failing_builds(1));
        worker.queue().enqueue(BuildRequest::new(term(2025, Semester::Fall), None));

        worker.drain().await;

        let snapshot = worker.queue().snapshot();
        assert_eq!(
            snapshot.last_error.as_deref(),
            Some("backend unavailable (build call 1)")
        );
        assert!(!snapshot.building);
        assert_eq!(snapshot.builds_completed, 1);
        assert!(worker.store().is_empty());
    }

    #[tokio::test]
    async fn test_panicking_build_is_reported_as_failure() {
        let (_engine, worker) = worker_for(FakeEngine::new().panicking_next_build());
        worker.queue().enqueue(BuildRequest::new(term(2025, Semester::Fall), None));
        worker.queue().enqueue(BuildRequest::new(term(2025, Semester::Spring), None));

        worker.drain().await;

        let snapshot = worker.queue().snapshot();
        assert!(!snapshot.building);
        assert_eq!(snapshot.builds_completed, 2);
        assert!(worker.store().get(&term(2025, Semester::Spring)).is_some());
    }

    #[tokio::test]
    async fn test_direct_run_installs_entry() {
        let (_engine, worker) = worker_for(FakeEngine::new());

        let ok = worker.run(BuildRequest::new(term(2025, Semester::Fall), None)).await;

        assert!(ok);
        assert!(worker.store().get(&term(2025, Semester::Fall)).is_some());
        assert!(!worker.queue().is_building());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_single_flight_under_racing_refreshes() {
        const N: usize = 12;
        let (engine, worker) =
            worker_for(FakeEngine::new().with_build_delay(Duration::from_millis(5)));
        worker.clone().start();

        // Race enqueues from many tasks, plus competing manual drains
        let mut handles = Vec::new();
        for i in 0..N {
            let worker = worker.clone();
            handles.push(tokio::spawn(async move {
                let semester = if i % 2 == 0 { Semester::Fall } else { Semester::Spring };
                worker
                    .queue()
                    .enqueue(BuildRequest::new(term(2000 + i as i32, semester), None));
                if i % 3 == 0 {
                    worker.drain().await;
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        wait_until(|| worker.queue().snapshot().builds_completed == N as u64).await;

        assert_eq!(engine.build_calls.load(Ordering::SeqCst), N);
        assert_eq!(engine.max_in_flight.load(Ordering::SeqCst), 1);
        assert_eq!(worker.store().len(), N);
        assert!(!worker.queue().is_building());
    }

    #[tokio::test]
    async fn test_background_worker_picks_up_enqueued_work() {
        let (_engine, worker) = worker_for(FakeEngine::new());
        worker.clone().start();

        worker
            .queue()
            .enqueue(BuildRequest::new(term(2025, Semester::Fall), None));

        wait_until(|| worker.store().get(&term(2025, Semester::Fall)).is_some()).await;
        wait_until(|| !worker.queue().is_building()).await;
    }

    // ============================================================
    // STARTUP SEQUENCER
    // ============================================================

    #[tokio::test]
    async fn test_startup_succeeds_on_first_attempt() {
        let (engine, worker) =
            worker_for(FakeEngine::new().with_terms(vec![term(2025, Semester::Fall)]));
        let sleeper = Arc::new(RecordingSleeper::new());

        let outcome = StartupSequencer::new(worker.clone())
            .with_sleeper(sleeper.clone())
            .run()
            .await;

        assert_eq!(outcome, StartupOutcome::Ready { attempts: 1 });
        assert!(sleeper.slept_secs().is_empty());
        assert_eq!(engine.discover_calls.load(Ordering::SeqCst), 1);
        assert_eq!(worker.store().describe_all().len(), 1);
    }

    #[tokio::test]
    async fn test_startup_retries_whole_cycle_with_backoff() {
        let (engine, worker) = worker_for(
            FakeEngine::new()
                .with_terms(vec![term(2025, Semester::Fall)])
                .failing_builds(3),
        );
        let sleeper = Arc::new(RecordingSleeper::observing(worker.queue().clone()));

        let outcome = StartupSequencer::new(worker.clone())
            .with_sleeper(sleeper.clone())
            .run()
            .await;

        assert_eq!(outcome, StartupOutcome::Ready { attempts: 4 });
        assert_eq!(sleeper.slept_secs(), vec![60, 120, 180]);
        // Discovery is part of every retry
        assert_eq!(engine.discover_calls.load(Ordering::SeqCst), 4);

        // Each sleep saw the message of the attempt that just failed
        let errors = sleeper.errors_at_sleep.lock().clone();
        assert_eq!(
            errors,
            vec![
                Some("backend unavailable (build call 1)".to_string()),
                Some("backend unavailable (build call 2)".to_string()),
                Some("backend unavailable (build call 3)".to_string()),
            ]
        );
        // Attempt 4 succeeded and cleared it
        assert_eq!(worker.queue().snapshot().last_error, None);
    }

    #[tokio::test]
    async fn test_startup_survives_discovery_failures() {
        let (_engine, worker) = worker_for(
            FakeEngine::new()
                .with_terms(vec![term(2025, Semester::Fall)])
                .failing_discover(2),
        );
        let sleeper = Arc::new(RecordingSleeper::new());

        let outcome = StartupSequencer::new(worker.clone())
            .with_sleeper(sleeper.clone())
            .run()
            .await;

        assert_eq!(outcome, StartupOutcome::Ready { attempts: 3 });
        assert_eq!(sleeper.slept_secs(), vec![60, 120]);
    }

    #[tokio::test]
    async fn test_startup_exhausts_retries() {
        let (engine, worker) = worker_for(FakeEngine::new().failing_discover(usize::MAX));
        let sleeper = Arc::new(RecordingSleeper::new());

        let outcome = StartupSequencer::new(worker.clone())
            .with_sleeper(sleeper.clone())
            .with_max_attempts(3)
            .run()
            .await;

        assert_eq!(outcome, StartupOutcome::Exhausted { attempts: 3 });
        // No sleep after the final attempt
        assert_eq!(sleeper.slept_secs(), vec![60, 120]);
        assert_eq!(engine.discover_calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            worker.queue().snapshot().last_error.as_deref(),
            Some("catalog backend unreachable (discover call 3)")
        );
    }

    #[tokio::test]
    async fn test_startup_default_retry_count_is_ten() {
        let (engine, worker) = worker_for(FakeEngine::new());
        let sleeper = Arc::new(RecordingSleeper::new());

        let outcome = StartupSequencer::new(worker)
            .with_sleeper(sleeper.clone())
            .run()
            .await;

        assert_eq!(outcome, StartupOutcome::Exhausted { attempts: 10 });
        assert_eq!(engine.discover_calls.load(Ordering::SeqCst), 10);
        assert_eq!(sleeper.slept_secs().len(), 9);
    }

    #[tokio::test]
    async fn test_startup_drains_externally_queued_requests() {
        // Discovery finds nothing, but a refresh arrived before the first cycle
        let (_engine, worker) = worker_for(FakeEngine::new());
        worker
            .queue()
            .enqueue(BuildRequest::new(term(2024, Semester::Summer), None));

        let outcome = StartupSequencer::new(worker.clone())
            .with_sleeper(Arc::new(RecordingSleeper::new()))
            .run()
            .await;

        assert_eq!(outcome, StartupOutcome::Ready { attempts: 1 });
        assert!(worker.store().get(&term(2024, Semester::Summer)).is_some());
    }

    #[tokio::test]
    async fn test_spawned_sequencer_signals_completion() {
        let (_engine, worker) =
            worker_for(FakeEngine::new().with_terms(vec![term(2025, Semester::Fall)]));

        let mut done = StartupSequencer::new(worker.clone())
            .with_sleeper(Arc::new(RecordingSleeper::new()))
            .spawn();

        let outcome = *done.wait_for(|outcome| outcome.is_some()).await.unwrap();

        assert_eq!(outcome, Some(StartupOutcome::Ready { attempts: 1 }));
        assert_eq!(worker.store().len(), 1);
    }
}
