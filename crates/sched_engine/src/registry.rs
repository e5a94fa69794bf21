//! Liveness registry — membership set + sparse liveness set.
//!
//! Kept as two fields behind one writer lock rather than a single map so
//! that `is_alive` never has to touch the (larger) task-record map — the
//! redundancy is deliberate, matching the source's bitmap-alongside-task-set
//! layout. A `HashSet<TaskId>` stands in for the sparse bitmap; task ids are
//! arbitrary sparse `u64`s here rather than small dense indices, so a hash
//! set is the more natural substitute than a literal bitmap.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;
use sched_core::TaskId;

use crate::record::TaskRecord;

#[derive(Default)]
struct Inner {
    tasks: HashMap<TaskId, Arc<TaskRecord>>,
    alive: HashSet<TaskId>,
}

/// Tracks which submitted tasks are still live.
///
/// Invariant: a task id is in `alive` if and only if it is in `tasks`. Both
/// are only ever mutated together, under the writer lock.
#[derive(Default)]
pub struct LivenessRegistry {
    inner: RwLock<Inner>,
}

impl LivenessRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a freshly-submitted task as alive.
    pub fn register(&self, record: Arc<TaskRecord>) {
        let mut inner = self.inner.write();
        inner.alive.insert(record.id());
        inner.tasks.insert(record.id(), record);
    }

    /// Returns `true` iff the liveness bit for `id` is set.
    #[must_use]
    pub fn is_alive(&self, id: TaskId) -> bool {
        self.inner.read().alive.contains(&id)
    }

    /// Clears the liveness bit and drops the task record. Returns `true` if
    /// the task was present (i.e. this was not a no-op on an already-removed
    /// id).
    pub fn remove(&self, id: TaskId) -> bool {
        let mut inner = self.inner.write();
        let was_alive = inner.alive.remove(&id);
        inner.tasks.remove(&id);
        was_alive
    }

    /// A weakly-consistent snapshot of the currently-live task ids.
    #[must_use]
    pub fn snapshot_ids(&self) -> Vec<TaskId> {
        self.inner.read().alive.iter().copied().collect()
    }

    /// A weakly-consistent snapshot of the currently-live task records.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Arc<TaskRecord>> {
        let inner = self.inner.read();
        inner
            .alive
            .iter()
            .filter_map(|id| inner.tasks.get(id).cloned())
            .collect()
    }
}
