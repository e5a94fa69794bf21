//! A [`WorkerPool`] backed by Tokio's blocking-task pool and its async
//! executor.
//!
//! `Async` task bodies are typically bursty, non-blocking closures rather
//! than CPU-bound work, so plain bodies are spawned onto the runtime's
//! regular executor (`Handle::spawn`) rather than `spawn_blocking` — this
//! mirrors the teacher's own preference for `tokio::spawn` over a dedicated
//! thread pool throughout `engine_system`/`engine_app`.

use sched_engine::WorkerPool;
use sched_core::{BoxCompletion, CompletionError};
use tokio::runtime::Handle;
use tracing::warn;

/// Runs `Async` task bodies and `Future` schedules on a Tokio runtime.
pub struct TokioWorkerPool {
    handle: Handle,
}

impl TokioWorkerPool {
    #[must_use]
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }
}

impl WorkerPool for TokioWorkerPool {
    fn spawn(&self, job: Box<dyn FnOnce() + Send>) {
        // The job is a plain synchronous closure (the engine already
        // isolated it from the processing thread); run it on a blocking
        // thread so a body that does end up doing blocking I/O cannot stall
        // the runtime's async workers.
        let handle = self.handle.clone();
        self.handle.spawn_blocking(move || {
            let _enter = handle.enter();
            job();
        });
    }

    fn spawn_future(
        &self,
        future: BoxCompletion,
        on_complete: Box<dyn FnOnce(Result<(), CompletionError>) + Send>,
    ) {
        self.handle.spawn(async move {
            let result = future.await;
            if result.is_err() {
                warn!("external completion future resolved with an error");
            }
            on_complete(result);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn spawn_runs_the_job() {
        let pool = TokioWorkerPool::new(Handle::current());
        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        pool.spawn(Box::new(move || flag.store(true, Ordering::SeqCst)));

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn spawn_future_reports_success() {
        let pool = TokioWorkerPool::new(Handle::current());
        let (tx, rx) = tokio::sync::oneshot::channel();
        pool.spawn_future(
            Box::pin(async { Ok(()) }),
            Box::new(move |result| {
                let _ = tx.send(result.is_ok());
            }),
        );
        assert!(rx.await.unwrap());
    }
}
