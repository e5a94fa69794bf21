//! Parked set — tasks waiting on an external `unpark()` call.
//!
//! A [`DashMap`] rather than a map behind one lock: `park`/`unpark` calls
//! race freely against each other from any thread (a task can be unparked
//! from a network callback, a timer, or another task's body), and a
//! concurrent map gives each a lock-free-in-the-common-case path instead of
//! serializing them all behind the wheel's or registry's locks.

use std::sync::Arc;

use dashmap::DashMap;
use sched_core::TaskId;

use crate::record::TaskRecord;

#[derive(Default)]
pub struct ParkedSet {
    parked: DashMap<TaskId, Arc<TaskRecord>>,
}

impl ParkedSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn park(&self, record: Arc<TaskRecord>) {
        self.parked.insert(record.id(), record);
    }

    /// Removes and returns the record for `id`, if it was parked.
    #[must_use]
    pub fn take(&self, id: TaskId) -> Option<Arc<TaskRecord>> {
        self.parked.remove(&id).map(|(_, record)| record)
    }

    #[must_use]
    pub fn contains(&self, id: TaskId) -> bool {
        self.parked.contains_key(&id)
    }
}
