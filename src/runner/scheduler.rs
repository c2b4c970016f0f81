//! Bounded-concurrency test scheduler
//!
//! Drives up to `max_concurrency` test cases at a time, honoring
//! pause/resume/stop transitions, per-attempt deadlines, and retry budgets.
//! "Threads" are logical: each in-flight case runs as a tokio task.

use chrono::Utc;
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::RunnerConfig;
use crate::models::{RunStatus, TestCase, TestError, TestResult, ThreadInfo};
use crate::runner::capture::TestLogger;
use crate::utils::timer::Timer;

/// Progress callback, invoked whenever a logical thread starts or finishes
/// with a snapshot of the in-flight executions and the results so far.
pub type ProgressFn = Arc<dyn Fn(&[ThreadInfo], &[TestResult]) + Send + Sync>;

/// Schedules test cases over a bounded pool of concurrent executions.
///
/// Clones share state: control calls (`pause`, `resume`, `stop`) and the
/// inspection accessors observe the run driven by any clone. A runner hosts
/// one run at a time; a fresh `run_tests` call resets the previous run's
/// results.
#[derive(Clone)]
pub struct TestRunner {
    config: RunnerConfig,
    shared: Arc<Shared>,
}

struct Shared {
    status: watch::Sender<RunStatus>,
    active: Mutex<HashMap<u64, ThreadInfo>>,
    results: Mutex<Vec<TestResult>>,
    next_thread_id: AtomicU64,
}

impl TestRunner {
    /// Create a runner with the given configuration
    pub fn new(config: RunnerConfig) -> Self {
        let (status, _rx) = watch::channel(RunStatus::Idle);
        Self {
            config,
            shared: Arc::new(Shared {
                status,
                active: Mutex::new(HashMap::new()),
                results: Mutex::new(Vec::new()),
                next_thread_id: AtomicU64::new(1),
            }),
        }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Execute the given test cases and return one result per case that
    /// entered execution, in completion order.
    ///
    /// Cases are admitted in input order, at most
    /// `config.max_concurrency` in flight at once. Cases still queued when
    /// the run is stopped are dropped without a result; cases already in
    /// flight are awaited to completion. Individual failures are recorded
    /// in the results, never raised.
    pub async fn run_tests(
        &self,
        test_cases: Vec<TestCase>,
        on_progress: Option<ProgressFn>,
    ) -> Vec<TestResult> {
        self.shared.reset();

        let mut queue: VecDeque<TestCase> = test_cases.into();
        let mut in_flight: FuturesUnordered<JoinHandle<()>> = FuturesUnordered::new();
        let mut status_rx = self.shared.status.subscribe();

        debug!(
            queued = queue.len(),
            max_concurrency = self.config.max_concurrency,
            "run started"
        );

        'sched: while !queue.is_empty() || !in_flight.is_empty() {
            // Control gate: wait out a pause, honor a stop before dequeuing
            loop {
                let current = *status_rx.borrow_and_update();
                match current {
                    RunStatus::Stopped => break 'sched,
                    RunStatus::Paused => {
                        if status_rx.changed().await.is_err() {
                            break 'sched;
                        }
                    }
                    _ => break,
                }
            }

            // Admission control: backfill free slots in input order
            while in_flight.len() < self.config.max_concurrency
                && *self.shared.status.borrow() == RunStatus::Running
            {
                let Some(case) = queue.pop_front() else { break };
                in_flight.push(self.spawn_case(case, on_progress.clone()));
            }

            if in_flight.is_empty() {
                continue;
            }

            // Wait for at least one execution to settle, or a control
            // transition that must be honored before the next dequeue
            tokio::select! {
                joined = in_flight.next() => {
                    if let Some(Err(err)) = joined {
                        warn!("execution task failed to join: {err}");
                    }
                }
                changed = status_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }

            if self.config.stop_on_error && self.has_failure() {
                debug!("failure observed with stop_on_error set, stopping run");
                self.shared.status.send_replace(RunStatus::Stopped);
                break;
            }
        }

        // Await all outstanding executions so none is abandoned mid-flight
        while let Some(joined) = in_flight.next().await {
            if let Err(err) = joined {
                warn!("execution task failed to join: {err}");
            }
        }

        if *self.shared.status.borrow() != RunStatus::Stopped {
            self.shared.status.send_replace(RunStatus::Completed);
        }

        let results = self.results();
        debug!(
            total = results.len(),
            status = %self.status(),
            "run finished"
        );
        results
    }

    /// Suspend admission of new cases. No-op unless the run is `Running`.
    pub fn pause(&self) {
        self.shared.status.send_if_modified(|status| {
            if *status == RunStatus::Running {
                *status = RunStatus::Paused;
                true
            } else {
                false
            }
        });
    }

    /// Resume a paused run. No-op unless the run is `Paused`.
    pub fn resume(&self) {
        self.shared.status.send_if_modified(|status| {
            if *status == RunStatus::Paused {
                *status = RunStatus::Running;
                true
            } else {
                false
            }
        });
    }

    /// Stop the run from any state. Queued cases are dropped; in-flight
    /// executions are not cancelled and are awaited before `run_tests`
    /// returns.
    pub fn stop(&self) {
        self.shared.status.send_replace(RunStatus::Stopped);
    }

    /// Current run status
    pub fn status(&self) -> RunStatus {
        *self.shared.status.borrow()
    }

    /// Snapshot of the in-flight executions
    pub fn active_threads(&self) -> Vec<ThreadInfo> {
        self.shared.active_snapshot()
    }

    /// Snapshot of the results recorded so far, in completion order
    pub fn results(&self) -> Vec<TestResult> {
        self.shared
            .results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn has_failure(&self) -> bool {
        self.shared
            .results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|r| !r.is_success())
    }

    fn spawn_case(&self, case: TestCase, on_progress: Option<ProgressFn>) -> JoinHandle<()> {
        let shared = self.shared.clone();
        let deadline = case.timeout().unwrap_or(self.config.timeout);
        let attempt_budget = 1 + case.retries().unwrap_or(self.config.retries);

        tokio::spawn(async move {
            execute_case(shared, case, deadline, attempt_budget, on_progress).await;
        })
    }
}

impl Default for TestRunner {
    fn default() -> Self {
        Self::new(RunnerConfig::default())
    }
}

impl Shared {
    fn reset(&self) {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.status.send_replace(RunStatus::Running);
    }

    fn active_snapshot(&self) -> Vec<ThreadInfo> {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    fn emit_progress(&self, on_progress: &Option<ProgressFn>) {
        if let Some(callback) = on_progress {
            let active = self.active_snapshot();
            let results = self
                .results
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone();
            callback(&active, &results);
        }
    }
}

/// Run one dequeued case to its final outcome: register the logical
/// thread, loop attempts across the retry budget, record exactly one
/// result, then release the thread.
async fn execute_case(
    shared: Arc<Shared>,
    case: TestCase,
    deadline: Duration,
    attempt_budget: u32,
    on_progress: Option<ProgressFn>,
) {
    let thread_id = shared.next_thread_id.fetch_add(1, Ordering::Relaxed);
    let logger = TestLogger::new(case.id());
    let start_time = Utc::now();

    shared
        .active
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(
            thread_id,
            ThreadInfo::active(thread_id, case.id(), case.name()),
        );
    shared.emit_progress(&on_progress);

    let mut attempts = 0u32;
    let result = loop {
        attempts += 1;
        let attempt_timer = Timer::start();
        logger.info(format!("attempt {attempts}/{attempt_budget} started"));
        debug!(test = case.id(), attempt = attempts, "starting attempt");

        match run_attempt(&case, &logger, deadline).await {
            Ok(()) => {
                logger.info("attempt passed");
                break TestResult::passed(
                    case.id(),
                    case.name(),
                    attempt_timer.elapsed_ms(),
                    start_time,
                    attempts - 1,
                    logger.entries(),
                );
            }
            Err(error) => {
                logger.error(format!("attempt failed: {error}"));
                if attempts >= attempt_budget {
                    break TestResult::failed(
                        case.id(),
                        case.name(),
                        attempt_timer.elapsed_ms(),
                        start_time,
                        error,
                        attempts - 1,
                        logger.entries(),
                    );
                }
                // Retries are immediate, no backoff
            }
        }
    };

    shared
        .results
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(result);
    shared
        .active
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(&thread_id);
    shared.emit_progress(&on_progress);
}

/// Race one attempt against its deadline.
///
/// The attempt runs on its own task: when the deadline fires the runner
/// stops waiting, but the attempt is not forcibly killed and may keep
/// running in the background. A panic inside the attempt surfaces as a
/// join error and is recorded as an ordinary failure.
async fn run_attempt(
    case: &TestCase,
    logger: &TestLogger,
    deadline: Duration,
) -> Result<(), TestError> {
    let handle = tokio::spawn(case.execute(logger.clone()));

    match tokio::time::timeout(deadline, handle).await {
        Err(_elapsed) => Err(TestError::timeout()),
        Ok(Err(join_err)) => Err(TestError::new(format!("attempt panicked: {join_err}"))),
        Ok(Ok(Ok(()))) => Ok(()),
        Ok(Ok(Err(err))) => Err(TestError::from_error(&err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runner_starts_idle() {
        let runner = TestRunner::default();
        assert_eq!(runner.status(), RunStatus::Idle);
        assert!(runner.active_threads().is_empty());
        assert!(runner.results().is_empty());
    }

    #[test]
    fn test_pause_requires_running() {
        let runner = TestRunner::default();
        runner.pause();
        assert_eq!(runner.status(), RunStatus::Idle);

        runner.resume();
        assert_eq!(runner.status(), RunStatus::Idle);
    }

    #[test]
    fn test_stop_is_unconditional() {
        let runner = TestRunner::default();
        runner.stop();
        assert_eq!(runner.status(), RunStatus::Stopped);

        // pause must not leave a stopped run
        runner.pause();
        assert_eq!(runner.status(), RunStatus::Stopped);
    }

    #[tokio::test]
    async fn test_empty_input_yields_empty_results() {
        let runner = TestRunner::default();
        let results = runner.run_tests(Vec::new(), None).await;
        assert!(results.is_empty());
        assert_eq!(runner.status(), RunStatus::Completed);
    }

    #[tokio::test]
    async fn test_attempt_timeout_is_distinguishable() {
        let case = TestCase::new("slow", "never settles", |_log| async {
            std::future::pending::<()>().await;
            Ok(())
        });
        let logger = TestLogger::new("slow");

        let outcome = run_attempt(&case, &logger, Duration::from_millis(20)).await;
        let err = outcome.unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_attempt_panic_is_captured() {
        let case = TestCase::new("boom", "panics", |_log| async {
            panic!("kaboom");
        });
        let logger = TestLogger::new("boom");

        let outcome = run_attempt(&case, &logger, Duration::from_secs(1)).await;
        let err = outcome.unwrap_err();
        assert!(!err.is_timeout());
        assert!(err.message.contains("panicked"));
    }
}
