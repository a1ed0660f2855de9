//! Restartable, cancellable unit of asynchronous work.
//!
//! A [`ManagedAsyncTask`] wraps a zero-argument producer (for example "fetch the
//! bytes behind this image URL"). Presentation code decides *when* it runs:
//! [`start`](ManagedAsyncTask::start) when a cell becomes visible,
//! [`cancel`](ManagedAsyncTask::cancel) when it scrolls away. The owner of the
//! task (the worker's registry) only stores it.
//!
//! Guarantees:
//! - At most one computation is in flight per task. Starting a running task
//!   returns a handle to the same computation, so every awaiting caller sees
//!   the same outcome.
//! - Once `cancel()` has been committed, awaiting callers observe
//!   [`Error::Cancelled`], never a late success value.
//! - A cancelled or failed task can be started again; a successful task keeps
//!   its value and does not run the producer a second time.
//!
//! Cancellation and completion race under one lock. Whichever commits first
//! decides the outcome: if `cancel()` wins, the result is `Cancelled` even when
//! the producer had already produced its value.
//!
//! # Example
//!
//! ```no_run
//! use productlist_core::task::ManagedAsyncTask;
//!
//! # async fn example() -> productlist_core::Result<()> {
//! let task = ManagedAsyncTask::new(|| async { Ok::<_, productlist_core::Error>(42u32) });
//!
//! let first = task.start();
//! let second = task.start(); // attaches to the same computation
//! assert!(first.is_same_computation(&second));
//!
//! assert_eq!(task.await_result().await?, 42);
//! # Ok(())
//! # }
//! ```

use crate::error::{Error, Result};
use crate::utils::lock;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};


/// Boxed future returned by a task producer
pub type TaskFuture<T> = BoxFuture<'static, Result<T>>;

type Producer<T> = dyn Fn() -> TaskFuture<T> + Send + Sync;

/// Observable lifecycle of a managed task
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskStatus {
    /// Never started
    Idle,
    /// A computation is in flight
    Running,
    /// The last computation produced a value
    Succeeded,
    /// The last computation failed
    Failed,
    /// The last computation was cancelled
    Cancelled,
}

/// How a run ended, as committed under the task lock
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Settled {
    Succeeded,
    Failed,
    Cancelled,
}

struct Run<T: Clone> {
    generation: u64,
    token: CancellationToken,
    outcome: Shared<TaskFuture<T>>,
    settled: Option<Settled>,
}

struct TaskState<T: Clone> {
    run: Option<Run<T>>,
    generation: u64,
}

/// Handle to one computation of a [`ManagedAsyncTask`]
///
/// Cloning the handle does not start anything; every clone resolves to the
/// same outcome.
pub struct TaskHandle<T: Clone> {
    generation: u64,
    outcome: Shared<TaskFuture<T>>,
}

impl<T: Clone> Clone for TaskHandle<T> {
    fn clone(&self) -> Self {
        Self {
            generation: self.generation,
            outcome: self.outcome.clone(),
        }
    }
}

impl<T> TaskHandle<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Wait for this computation's outcome
    pub async fn await_result(&self) -> Result<T> {
        self.outcome.clone().await
    }

    /// Which run of the task this handle belongs to (1 for the first start)
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns true if both handles refer to the same computation
    pub fn is_same_computation(&self, other: &Self) -> bool {
        self.outcome.ptr_eq(&other.outcome)
    }
}

/// Restartable, cancellable wrapper around one asynchronous producer
///
/// Clones share the same underlying task: starting or cancelling through any
/// clone is visible through all of them.
pub struct ManagedAsyncTask<T: Clone> {
    name: Arc<str>,
    producer: Arc<Producer<T>>,
    state: Arc<Mutex<TaskState<T>>>,
}

impl<T: Clone> Clone for ManagedAsyncTask<T> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            producer: Arc::clone(&self.producer),
            state: Arc::clone(&self.state),
        }
    }
}

impl<T: Clone> std::fmt::Debug for ManagedAsyncTask<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagedAsyncTask")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<T> ManagedAsyncTask<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a task from a producer; nothing runs until [`start`](Self::start)
    pub fn new<F, Fut>(producer: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        Self {
            name: Arc::from("task"),
            producer: Arc::new(move || producer().boxed()),
            state: Arc::new(Mutex::new(TaskState {
                run: None,
                generation: 0,
            })),
        }
    }

    /// Create a task that resolves immediately to `value`
    pub fn ready(value: T) -> Self {
        Self::new(move || {
            let value = value.clone();
            async move { Ok(value) }
        })
    }

    /// Attach a name used in log output (e.g. the URL being fetched)
    #[must_use]
    pub fn named(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Name used in log output
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Start the producer, or attach to the computation already in flight
    ///
    /// - Running: returns a handle to the running computation.
    /// - Succeeded: returns a handle to the finished computation (value kept).
    /// - Idle, failed or cancelled: spawns a fresh computation.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self) -> TaskHandle<T> {
        if let Some(handle) = self.reusable_run(&lock(&self.state)) {
            return handle;
        }

        // Built outside the lock: the producer may inspect this task
        let producer = (self.producer)();

        let mut state = lock(&self.state);
        if let Some(handle) = self.reusable_run(&state) {
            // Another caller started a run meanwhile
            return handle;
        }

        state.generation += 1;
        let generation = state.generation;
        let token = CancellationToken::new();

        let join = tokio::spawn(drive(
            producer,
            token.clone(),
            Arc::clone(&self.state),
            generation,
        ));

        let name = Arc::clone(&self.name);
        let outcome: TaskFuture<T> = async move {
            match join.await {
                Ok(result) => result,
                Err(e) if e.is_cancelled() => Err(Error::Cancelled),
                Err(e) => {
                    tracing::error!(task = %name, error = %e, "Task computation panicked");
                    Err(Error::Other(format!("task panicked: {}", e)))
                }
            }
        }
        .boxed();
        let outcome = outcome.shared();

        debug!(task = %self.name, generation, "Started computation");

        state.run = Some(Run {
            generation,
            token,
            outcome: outcome.clone(),
            settled: None,
        });

        TaskHandle {
            generation,
            outcome,
        }
    }

    /// Handle to the current run if `start()` should attach to it
    fn reusable_run(&self, state: &TaskState<T>) -> Option<TaskHandle<T>> {
        let run = state.run.as_ref()?;
        match run.settled {
            None | Some(Settled::Succeeded) => {
                trace!(task = %self.name, generation = run.generation, "Attaching to existing computation");
                Some(TaskHandle {
                    generation: run.generation,
                    outcome: run.outcome.clone(),
                })
            }
            Some(Settled::Failed) | Some(Settled::Cancelled) => None,
        }
    }

    /// Wait for the current computation's outcome
    ///
    /// # Errors
    ///
    /// - The producer's error if it failed
    /// - [`Error::Cancelled`] if [`cancel`](Self::cancel) was committed first
    /// - [`Error::NotStarted`] if the task was never started
    pub async fn await_result(&self) -> Result<T> {
        let outcome = lock(&self.state)
            .run
            .as_ref()
            .map(|run| run.outcome.clone());

        match outcome {
            Some(outcome) => outcome.await,
            None => Err(Error::NotStarted),
        }
    }

    /// Request cooperative cancellation of the in-flight computation
    ///
    /// Idempotent. Has no effect on a task that is idle or already settled.
    /// The producer future is dropped at its next suspension point.
    pub fn cancel(&self) {
        let mut state = lock(&self.state);
        if let Some(run) = state.run.as_mut() {
            if run.settled.is_none() {
                run.settled = Some(Settled::Cancelled);
                run.token.cancel();
                debug!(task = %self.name, generation = run.generation, "Cancelled computation");
            }
        }
    }

    /// Current lifecycle status
    pub fn status(&self) -> TaskStatus {
        match lock(&self.state).run.as_ref().map(|run| run.settled) {
            None => TaskStatus::Idle,
            Some(None) => TaskStatus::Running,
            Some(Some(Settled::Succeeded)) => TaskStatus::Succeeded,
            Some(Some(Settled::Failed)) => TaskStatus::Failed,
            Some(Some(Settled::Cancelled)) => TaskStatus::Cancelled,
        }
    }

    /// Returns true while a computation is in flight
    pub fn is_running(&self) -> bool {
        self.status() == TaskStatus::Running
    }

    /// Returns true if the last computation was cancelled
    pub fn is_cancelled(&self) -> bool {
        self.status() == TaskStatus::Cancelled
    }
}

/// Run one computation to completion and commit its outcome
async fn drive<T>(
    producer: TaskFuture<T>,
    token: CancellationToken,
    state: Arc<Mutex<TaskState<T>>>,
    generation: u64,
) -> Result<T>
where
    T: Clone + Send + Sync + 'static,
{
    let result = tokio::select! {
        biased;
        _ = token.cancelled() => Err(Error::Cancelled),
        result = producer => result,
    };

    let mut guard = lock(&state);
    let Some(run) = guard.run.as_mut().filter(|run| run.generation == generation) else {
        // Superseded by a restart after cancellation
        return Err(Error::Cancelled);
    };

    if run.settled == Some(Settled::Cancelled) {
        return Err(Error::Cancelled);
    }

    run.settled = Some(match &result {
        Ok(_) => Settled::Succeeded,
        Err(Error::Cancelled) => Settled::Cancelled,
        Err(_) => Settled::Failed,
    });

    result
}
