//! Error types surfaced by the scheduler's public contract.

use crate::task_id::TaskId;

/// Errors that can occur while using the scheduler.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// A `Schedule::tick` construction used a non-positive tick delta.
    #[error("invalid tick delta {0}: tick schedules require n >= 1")]
    InvalidSchedule(i64),

    /// `unpark` was called on a task that is not in the parked set.
    #[error("task {0} is not parked")]
    NotParked(TaskId),

    /// `stop` was called on a task that is not in the liveness registry.
    #[error("task {0} is not scheduled")]
    NotScheduled(TaskId),
}
