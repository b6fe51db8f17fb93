//! Keyed collect-and-run coordination.
//!
//! Any number of callers contribute one keyed item apiece toward a named
//! operation. The caller whose contribution completes the expected set runs
//! the supplied function — exactly once per operation — and every caller,
//! including ones arriving after completion, converges on the same memoized
//! result or error by polling [`Barrier::contribute`].
//!
//! Timeouts are observed only when a caller invokes `contribute`; there is
//! no background sweep, so an operation that stops receiving contributions
//! stays collecting until [`Barrier::forget`] evicts it. Completed
//! operations are kept for replay and are likewise only released by
//! `forget`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use log::debug;
use thiserror::Error;

/// Validation failures reported through [`Outcome::Fail`]. None of them
/// mutate the operation's shared state.
#[derive(Debug, Error)]
pub enum BarrierError {
    #[error("expected item count must be nonzero")]
    ZeroExpectedCount,
    #[error("expected item count {given} does not match the declared {declared}")]
    ExpectedCountMismatch { declared: usize, given: usize },
    #[error("collection timeout {given:?} does not match the declared {declared:?}")]
    CollectTimeoutMismatch { declared: Duration, given: Duration },
}

/// The memoized product of one run: shared so every caller receives the
/// same value or error.
pub type RunResult<R> =
    std::result::Result<Arc<R>, Arc<dyn std::error::Error + Send + Sync>>;

/// Errors a run function may produce.
pub type RunError = Box<dyn std::error::Error + Send + Sync>;

/// What one `contribute` call observed.
#[derive(Debug)]
pub enum Outcome<R> {
    /// Recorded (or already knew) this item; the set is still incomplete.
    Waiting,
    /// The set is complete and another caller is executing the run function.
    Running,
    /// The operation finished; the payload is the memoized result or error.
    Done(RunResult<R>),
    /// The collection window elapsed before the set completed. The item was
    /// not recorded.
    CollectionTimeout,
    /// The caller's run-wait window elapsed while the run is still going.
    RunTimeout,
    /// The contribution disagreed with the operation's declared shape.
    Fail(BarrierError),
}

/// One caller's part in a named operation. A zero timeout disables that
/// check.
pub struct Contribution<T, F> {
    pub operation: String,
    pub item: String,
    pub expected: usize,
    pub payload: T,
    pub run: F,
    pub collect_timeout: Duration,
    pub run_timeout: Duration,
}

struct Operation<T, R> {
    expected: usize,
    collect_timeout: Duration,
    collected_at: Instant,
    items: HashMap<String, T>,
    /// Set while some caller is inside the run function.
    run_started: Option<Instant>,
    result: Option<RunResult<R>>,
}

impl<T, R> Operation<T, R> {
    fn new(expected: usize, collect_timeout: Duration) -> Self {
        Operation {
            expected,
            collect_timeout,
            collected_at: Instant::now(),
            items: HashMap::new(),
            run_started: None,
            result: None,
        }
    }
}

/// Keyed barrier state. Each operation has its own lock; the table lock is
/// held only to look a handle up, so unrelated operations never contend.
pub struct Barrier<T, R> {
    operations: Mutex<HashMap<String, Arc<Mutex<Operation<T, R>>>>>,
}

impl<T, R> Default for Barrier<T, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, R> Barrier<T, R> {
    pub fn new() -> Self {
        Barrier {
            operations: Mutex::new(HashMap::new()),
        }
    }

    pub fn contribute<F>(&self, contribution: Contribution<T, F>) -> Outcome<R>
    where
        T: Clone,
        F: FnOnce(&HashMap<String, T>) -> std::result::Result<R, RunError>,
    {
        let Contribution {
            operation,
            item,
            expected,
            payload,
            run,
            collect_timeout,
            run_timeout,
        } = contribution;

        if expected == 0 {
            return Outcome::Fail(BarrierError::ZeroExpectedCount);
        }

        let handle = {
            let mut operations = self
                .operations
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            operations
                .entry(operation.clone())
                .or_insert_with(|| Arc::new(Mutex::new(Operation::new(expected, collect_timeout))))
                .clone()
        };
        let mut state = handle.lock().unwrap_or_else(PoisonError::into_inner);

        if state.expected != expected {
            return Outcome::Fail(BarrierError::ExpectedCountMismatch {
                declared: state.expected,
                given: expected,
            });
        }
        // The first nonzero collection timeout declared for the operation
        // becomes canonical; zero expresses no opinion.
        if !collect_timeout.is_zero() {
            if state.collect_timeout.is_zero() {
                state.collect_timeout = collect_timeout;
            } else if state.collect_timeout != collect_timeout {
                return Outcome::Fail(BarrierError::CollectTimeoutMismatch {
                    declared: state.collect_timeout,
                    given: collect_timeout,
                });
            }
        }

        if state.items.len() < state.expected {
            if !state.collect_timeout.is_zero()
                && state.collected_at.elapsed() > state.collect_timeout
            {
                return Outcome::CollectionTimeout;
            }
            state.items.entry(item).or_insert(payload);
        }
        if state.items.len() < state.expected {
            return Outcome::Waiting;
        }

        if let Some(result) = &state.result {
            return Outcome::Done(result.clone());
        }
        if let Some(started) = state.run_started {
            if !run_timeout.is_zero() && started.elapsed() > run_timeout {
                return Outcome::RunTimeout;
            }
            return Outcome::Running;
        }

        // This contribution completed the set: claim the run under the
        // lock, then execute outside it so pollers stay unblocked.
        state.run_started = Some(Instant::now());
        let items = state.items.clone();
        drop(state);

        debug!(
            "operation '{}' collected {} items, running",
            operation, expected
        );
        let result: RunResult<R> = run(&items).map(Arc::new).map_err(Arc::from);

        let mut state = handle.lock().unwrap_or_else(PoisonError::into_inner);
        state.result = Some(result.clone());
        Outcome::Done(result)
    }

    /// Drops an operation's state and its lock. Completed results stop
    /// being replayable and a fresh collection may start under the same
    /// key.
    pub fn forget(&self, operation: &str) -> bool {
        self.operations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(operation)
            .is_some()
    }

    /// Number of operations currently held, completed ones included.
    pub fn len(&self) -> usize {
        self.operations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
