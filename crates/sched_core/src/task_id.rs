//! Task identity and allocation.
//!
//! A [`TaskId`] is a lightweight `u64` identifier with no inherent data,
//! mirroring the shape of an entity identifier in an ECS: it carries no
//! meaning of its own beyond "the thing the engine is tracking".

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// A process-wide unique task identifier.
///
/// Ids are allocated from a single monotonic counter and are never reused
/// while the allocator that produced them is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
    /// Create a task id from a raw `u64`. Only meant for tests and
    /// collaborator glue code — application code should never construct a
    /// `TaskId` itself, only receive one from [`TaskIdAllocator::allocate`].
    #[must_use]
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` identifier.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TaskId({})", self.0)
    }
}

/// Allocates monotonically increasing task ids.
///
/// Unlike a single-threaded entity allocator, submission can happen from any
/// thread, so allocation is a lock-free atomic increment rather than a
/// `&mut self` counter bump.
#[derive(Debug, Default)]
pub struct TaskIdAllocator {
    next_id: AtomicU64,
}

impl TaskIdAllocator {
    /// Creates a new allocator. Ids start at 0.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next_id: AtomicU64::new(0),
        }
    }

    /// Allocates a fresh task id. Safe to call concurrently from any thread.
    pub fn allocate(&self) -> TaskId {
        TaskId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_increasing() {
        let alloc = TaskIdAllocator::new();
        let a = alloc.allocate();
        let b = alloc.allocate();
        let c = alloc.allocate();
        assert!(a < b);
        assert!(b < c);
        assert_ne!(a, b);
    }

    #[test]
    fn allocation_is_thread_safe() {
        use std::sync::Arc;
        use std::thread;

        let alloc = Arc::new(TaskIdAllocator::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let alloc = Arc::clone(&alloc);
            handles.push(thread::spawn(move || {
                (0..100).map(|_| alloc.allocate()).collect::<Vec<_>>()
            }));
        }

        let mut all_ids: Vec<TaskId> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        all_ids.sort();
        let before_dedup = all_ids.len();
        all_ids.dedup();
        assert_eq!(before_dedup, all_ids.len(), "allocator produced a duplicate id");
        assert_eq!(before_dedup, 800);
    }
}
