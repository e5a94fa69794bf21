//! Per-task bookkeeping: identity, execution mode, body, and the back-reference
//! to the engine that owns it.

use std::sync::Weak;

use parking_lot::Mutex;
use sched_core::{ExecutionMode, Schedule, TaskId};

use crate::engine::{EngineInner, SchedulerEngine};

/// A task's body: called once per dispatch, returns the next schedule.
///
/// `FnMut` rather than `FnOnce` — a recurring task (`Tick`/`Duration`) is
/// invoked repeatedly from the same closure across passes.
pub type TaskBody = Box<dyn FnMut() -> Schedule + Send>;

/// The engine's internal record of a submitted task.
///
/// Holds a [`Weak`] back-reference to the engine rather than an `Arc` — the
/// engine owns its tasks (via the registry, the wheel, the parked set), never
/// the other way around. A task outliving the engine would otherwise form a
/// reference cycle.
pub struct TaskRecord {
    id: TaskId,
    mode: ExecutionMode,
    body: Mutex<TaskBody>,
    engine: Weak<EngineInner>,
}

impl TaskRecord {
    pub fn new(
        id: TaskId,
        mode: ExecutionMode,
        body: TaskBody,
        engine: Weak<EngineInner>,
    ) -> std::sync::Arc<Self> {
        std::sync::Arc::new(Self {
            id,
            mode,
            body: Mutex::new(body),
            engine,
        })
    }

    #[must_use]
    pub fn id(&self) -> TaskId {
        self.id
    }

    #[must_use]
    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    #[must_use]
    pub fn engine(&self) -> Weak<EngineInner> {
        self.engine.clone()
    }

    /// Invokes the task body, producing its next schedule.
    ///
    /// Locked for the duration of the call: a task's body never runs
    /// concurrently with itself, matching the "Sync" contract of a single
    /// `Runnable` and the fact that re-submission under `Async` only ever
    /// happens after the previous call has returned.
    pub fn run(&self) -> Schedule {
        let mut body = self.body.lock();
        (*body)()
    }
}

/// A handle returned to the caller on submission.
///
/// Distinct from [`TaskRecord`] so that callers only ever see the identity
/// and control operations, never the body or the raw engine back-reference.
#[derive(Clone)]
pub struct TaskHandle {
    id: TaskId,
    mode: ExecutionMode,
    engine: Weak<EngineInner>,
}

impl TaskHandle {
    pub(crate) fn new(id: TaskId, mode: ExecutionMode, engine: Weak<EngineInner>) -> Self {
        Self { id, mode, engine }
    }

    #[must_use]
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// The execution mode this task was submitted with. Fixed for the
    /// task's lifetime.
    #[must_use]
    pub fn execution_mode(&self) -> ExecutionMode {
        self.mode
    }

    /// The scheduler engine that owns this task, if it is still alive.
    /// `None` once every [`SchedulerEngine`] clone referencing the engine
    /// has been dropped.
    #[must_use]
    pub fn owner(&self) -> Option<SchedulerEngine> {
        self.engine.upgrade().map(SchedulerEngine::from_inner)
    }

    /// `true` while the task remains registered with a still-live engine.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.engine
            .upgrade()
            .is_some_and(|engine| engine.is_alive(self.id))
    }

    /// Unparks the task if it is currently parked. No-op (returns `Ok(())`
    /// is not guaranteed — see [`sched_core::SchedulerError::NotParked`]) if
    /// it is not parked, the engine has shut down, or the task has already
    /// stopped.
    pub fn unpark(&self) -> Result<(), sched_core::SchedulerError> {
        match self.engine.upgrade() {
            Some(engine) => engine.unpark(self.id),
            None => Err(sched_core::SchedulerError::NotScheduled(self.id)),
        }
    }

    /// Stops the task permanently, wherever it currently sits (wheel, parked
    /// set, or ready queue).
    ///
    /// # Errors
    ///
    /// Returns [`sched_core::SchedulerError::NotScheduled`] if the task is
    /// not currently registered — an already-stopped task, or one whose
    /// engine has shut down.
    pub fn stop(&self) -> Result<(), sched_core::SchedulerError> {
        match self.engine.upgrade() {
            Some(engine) => engine.stop(self.id),
            None => Err(sched_core::SchedulerError::NotScheduled(self.id)),
        }
    }
}
