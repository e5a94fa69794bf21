//! A [`TimerService`] backed by `tokio::time::sleep`, spawned on a handle.

use std::time::Duration;

use sched_engine::TimerService;
use tokio::runtime::Handle;

/// Schedules callbacks on a Tokio runtime via `sleep` + `spawn`.
///
/// Holds a [`Handle`] rather than capturing the ambient runtime implicitly —
/// `schedule` may be called from a thread with no Tokio context of its own
/// (e.g. the host's tick-processing thread), so the handle is what lets the
/// sleep task actually get driven.
pub struct TokioTimer {
    handle: Handle,
}

impl TokioTimer {
    #[must_use]
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }
}

impl TimerService for TokioTimer {
    fn schedule(&self, delay: Duration, callback: Box<dyn FnOnce() + Send>) {
        self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            callback();
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn schedule_fires_the_callback_after_the_delay() {
        let timer = TokioTimer::new(Handle::current());
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);

        timer.schedule(
            Duration::from_millis(10),
            Box::new(move || flag.store(true, Ordering::SeqCst)),
        );

        assert!(!fired.load(Ordering::SeqCst));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(fired.load(Ordering::SeqCst));
    }
}
