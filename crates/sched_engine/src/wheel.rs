//! Tick wheel — tasks parked against a future absolute tick count.
//!
//! An ordered map rather than a fixed-size ring: the scheduler has no upper
//! bound on how many ticks out a task may schedule itself, so a sparse
//! `BTreeMap` keyed by absolute tick beats a bounded ring that would need
//! periodic rehoming.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;
use sched_core::TaskId;

use crate::record::TaskRecord;

#[derive(Default)]
pub struct TickWheel {
    slots: Mutex<BTreeMap<u64, Vec<Arc<TaskRecord>>>>,
}

impl TickWheel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Places `record` into the slot for `at_tick`.
    pub fn insert(&self, at_tick: u64, record: Arc<TaskRecord>) {
        self.slots.lock().entry(at_tick).or_default().push(record);
    }

    /// Drains every slot at or before `current_tick`, in ascending tick
    /// order, and returns the records that fired.
    ///
    /// Slots are only ever drained up to and including `current_tick` — a
    /// missed pass (the host loop skipping a tick) still fires every task
    /// whose due tick has since elapsed, rather than silently dropping them.
    pub fn drain_due(&self, current_tick: u64) -> Vec<Arc<TaskRecord>> {
        let mut slots = self.slots.lock();
        let due_keys: Vec<u64> = slots.range(..=current_tick).map(|(&k, _)| k).collect();
        let mut due = Vec::new();
        for key in due_keys {
            if let Some(mut records) = slots.remove(&key) {
                due.append(&mut records);
            }
        }
        due
    }

    /// Removes every occurrence of `id` from the wheel, wherever it is
    /// slotted. Used when a task is stopped while still parked on a future
    /// tick.
    pub fn remove(&self, id: TaskId) {
        let mut slots = self.slots.lock();
        slots.retain(|_, records| {
            records.retain(|r| r.id() != id);
            !records.is_empty()
        });
    }
}
