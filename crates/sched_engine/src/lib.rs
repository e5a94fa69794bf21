//! # sched_engine
//!
//! The scheduler engine: a liveness registry, a tick wheel, a ready queue,
//! and a parked set, wired together into a single dispatch loop. A host
//! drives the loop by calling [`SchedulerEngine::process`] and
//! [`SchedulerEngine::process_tick`]; everything else — timers, the worker
//! pool, uncaught-exception reporting — is handed in at construction via the
//! traits in [`collaborators`].

mod collaborators;
mod engine;
mod parked;
mod record;
mod registry;
mod wheel;

pub use collaborators::{ExceptionSink, TimerService, WorkerPool};
pub use engine::SchedulerEngine;
pub use record::TaskHandle;

pub use sched_core::{BoxCompletion, CompletionError, ExecutionMode, Schedule, SchedulerError, TaskId};
