//! # sched_runtime
//!
//! Tokio-backed implementations of `sched_engine`'s collaborator traits:
//! a [`timer::TokioTimer`], a [`worker::TokioWorkerPool`], and a
//! [`sink::TracingExceptionSink`], plus a [`config::SchedulerBuilder`] that
//! wires the three together into a ready-to-embed [`sched_engine::SchedulerEngine`].
//!
//! Nothing in `sched_core` or `sched_engine` depends on Tokio — this crate
//! is the one place that opinion lives, so an embedder who wants a
//! different timer or a non-Tokio worker pool can depend on `sched_engine`
//! directly and skip this crate entirely.

mod config;
mod sink;
mod timer;
mod worker;

pub use config::SchedulerBuilder;
pub use sink::TracingExceptionSink;
pub use timer::TokioTimer;
pub use worker::TokioWorkerPool;
