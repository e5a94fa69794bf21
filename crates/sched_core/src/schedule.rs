//! The [`Schedule`] value — what a task wants to happen next.

use std::fmt;
use std::future::Future;
use std::num::NonZeroU64;
use std::pin::Pin;
use std::time::Duration;

use crate::error::SchedulerError;

/// The error type an external completion future resolves to on failure.
///
/// Boxed as a trait object since the scheduler has no opinion on what kind
/// of external signal a task is waiting on — only that it can fail.
pub type CompletionError = Box<dyn std::error::Error + Send + Sync>;

/// A boxed, type-erased future representing an external completion signal.
pub type BoxCompletion = Pin<Box<dyn Future<Output = Result<(), CompletionError>> + Send>>;

/// The tagged value a task returns to describe its next resume condition.
///
/// A task's body is consulted once per execution and always returns exactly
/// one of these five cases — there is no sixth "keep running now" case,
/// `Park` and `Stop` being the two terminal-for-now states.
pub enum Schedule {
    /// Resume after wall-clock time `d` elapses.
    Duration(Duration),
    /// Resume on tick `current + n`. `n` is guaranteed `>= 1` by construction.
    Tick(NonZeroU64),
    /// Resume when the external completion future resolves successfully.
    /// On failure the error is reported to the exception sink and the task
    /// is not resumed.
    Future(BoxCompletion),
    /// Move to the parked set; remain there until an external `unpark`.
    Park,
    /// Terminal: remove the task from the liveness registry.
    Stop,
}

impl fmt::Debug for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Duration(d) => f.debug_tuple("Duration").field(d).finish(),
            Self::Tick(n) => f.debug_tuple("Tick").field(n).finish(),
            Self::Future(_) => f.write_str("Future(..)"),
            Self::Park => f.write_str("Park"),
            Self::Stop => f.write_str("Stop"),
        }
    }
}

impl Schedule {
    /// Resume after wall-clock time `d` elapses.
    #[must_use]
    pub fn duration(d: Duration) -> Self {
        Self::Duration(d)
    }

    /// Resume on tick `current + n`. Fails if `n <= 0` — a non-positive
    /// tick delta would either re-run within the same processing pass
    /// forever (`n == 0`) or move backwards in time (`n < 0`), which this
    /// constructor rejects rather than letting callers build an infinite
    /// loop or an already-elapsed deadline.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidSchedule`] carrying the rejected
    /// value if `n <= 0`.
    pub fn tick(n: i64) -> Result<Self, SchedulerError> {
        if n < 1 {
            return Err(SchedulerError::InvalidSchedule(n));
        }
        // `n >= 1` was just checked, so the conversion to `u64` and the
        // `NonZeroU64` construction below cannot fail.
        Ok(Self::Tick(
            NonZeroU64::new(n as u64).expect("n >= 1 checked above"),
        ))
    }

    /// Resume when `f` resolves. On `Ok(())` the task is re-dispatched; on
    /// `Err` the error is forwarded to the exception sink and the task is
    /// left quiescent (still alive, not resumed).
    #[must_use]
    pub fn future<F>(f: F) -> Self
    where
        F: Future<Output = Result<(), CompletionError>> + Send + 'static,
    {
        Self::Future(Box::pin(f))
    }

    /// Move to the parked set; remain there until an external `unpark`.
    #[must_use]
    pub const fn park() -> Self {
        Self::Park
    }

    /// Terminal: remove the task from the liveness registry.
    #[must_use]
    pub const fn stop() -> Self {
        Self::Stop
    }
}
