//! External collaborator interfaces.
//!
//! The engine never owns a timer, a worker pool, or an uncaught-exception
//! handler — it is handed implementations of these traits at construction.
//! `sched_runtime` ships one Tokio-backed implementation of each; nothing in
//! this crate (or in `sched_core`) depends on an async runtime.

use std::time::Duration;

use sched_core::{BoxCompletion, CompletionError, TaskId};

/// A monotonic wall-clock timer: fires `callback` once, after `delay`.
///
/// Any implementation with a `schedule(callback, delay)` contract suffices —
/// a hashed-wheel timer is just as valid as a single `ScheduledExecutorService`-
/// style singleton.
pub trait TimerService: Send + Sync {
    /// Arrange for `callback` to run once, no sooner than `delay` from now.
    fn schedule(&self, delay: Duration, callback: Box<dyn FnOnce() + Send>);
}

/// Runs `Runnable`-shaped work off the calling thread, for `Async` task
/// bodies and for awaiting `Future` schedules.
pub trait WorkerPool: Send + Sync {
    /// Run `job` on the pool, in parallel with any other work already
    /// running there.
    fn spawn(&self, job: Box<dyn FnOnce() + Send>);

    /// Drive `future` to completion off the calling thread, then invoke
    /// `on_complete` with its result. Used for the `Future` schedule, which
    /// is itself an async value the engine has no executor of its own to
    /// poll.
    fn spawn_future(
        &self,
        future: BoxCompletion,
        on_complete: Box<dyn FnOnce(Result<(), CompletionError>) + Send>,
    );
}

/// Consumes out-of-band task failures — currently, `Future` schedules that
/// resolve to an error.
pub trait ExceptionSink: Send + Sync {
    /// Report an error that occurred outside the calling context that could
    /// observe it directly (e.g. inside a completion callback).
    fn report(&self, task: TaskId, error: CompletionError);
}
