//! The default [`ExceptionSink`]: forwards unhandled `Future`-schedule
//! failures into `tracing`, matching the teacher's convention of routing
//! every out-of-band failure through a `warn!`/`error!` span rather than a
//! bespoke error channel.

use sched_engine::ExceptionSink;
use sched_core::{CompletionError, TaskId};
use tracing::error;

/// Logs unhandled task failures at `error` level with the failing task's id
/// as a structured field.
#[derive(Debug, Default)]
pub struct TracingExceptionSink;

impl TracingExceptionSink {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ExceptionSink for TracingExceptionSink {
    fn report(&self, task: TaskId, error: CompletionError) {
        error!(task_id = %task, error = %error, "unhandled future completion failure");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Boom;

    impl std::fmt::Display for Boom {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("boom")
        }
    }

    impl std::error::Error for Boom {}

    #[test]
    fn report_does_not_panic() {
        let sink = TracingExceptionSink::new();
        sink.report(TaskId::from_raw(1), Box::new(Boom));
    }
}
