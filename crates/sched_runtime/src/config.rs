//! Construction glue: wires a [`SchedulerEngine`] to the Tokio-backed
//! collaborator implementations in this crate.
//!
//! Mirrors the teacher's "construct with defaults, override with `with_*`"
//! builder idiom (`engine_system::SystemConfig`, `engine_app::tick::TickConfig`)
//! rather than a one-shot constructor function — a future collaborator swap
//! (a different timer, a custom exception sink) should not require touching
//! every call site.

use std::sync::Arc;

use sched_engine::{ExceptionSink, SchedulerEngine, TimerService, WorkerPool};
use tokio::runtime::Handle;

use crate::sink::TracingExceptionSink;
use crate::timer::TokioTimer;
use crate::worker::TokioWorkerPool;

/// Builds a [`SchedulerEngine`] backed by Tokio collaborators.
///
/// Defaults to [`TokioTimer`], [`TokioWorkerPool`], and
/// [`TracingExceptionSink`] on the calling task's current runtime handle;
/// any of the three may be overridden with a custom implementation before
/// calling [`build`](Self::build).
pub struct SchedulerBuilder {
    handle: Handle,
    timer: Option<Arc<dyn TimerService>>,
    workers: Option<Arc<dyn WorkerPool>>,
    exceptions: Option<Arc<dyn ExceptionSink>>,
}

impl SchedulerBuilder {
    /// Starts a builder bound to `handle`. Use [`Handle::current`] when
    /// called from within a Tokio runtime.
    #[must_use]
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            timer: None,
            workers: None,
            exceptions: None,
        }
    }

    /// Overrides the timer service. Defaults to [`TokioTimer`].
    #[must_use]
    pub fn with_timer(mut self, timer: Arc<dyn TimerService>) -> Self {
        self.timer = Some(timer);
        self
    }

    /// Overrides the worker pool. Defaults to [`TokioWorkerPool`].
    #[must_use]
    pub fn with_workers(mut self, workers: Arc<dyn WorkerPool>) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Overrides the exception sink. Defaults to [`TracingExceptionSink`].
    #[must_use]
    pub fn with_exceptions(mut self, exceptions: Arc<dyn ExceptionSink>) -> Self {
        self.exceptions = Some(exceptions);
        self
    }

    /// Builds the engine, falling back to the Tokio-backed defaults for any
    /// collaborator not explicitly overridden.
    #[must_use]
    pub fn build(self) -> SchedulerEngine {
        let timer = self
            .timer
            .unwrap_or_else(|| Arc::new(TokioTimer::new(self.handle.clone())));
        let workers = self
            .workers
            .unwrap_or_else(|| Arc::new(TokioWorkerPool::new(self.handle.clone())));
        let exceptions = self
            .exceptions
            .unwrap_or_else(|| Arc::new(TracingExceptionSink::new()));
        SchedulerEngine::new(timer, workers, exceptions)
    }
}
