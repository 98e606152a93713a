//! Deferred effects keyed on simulation time
//!
//! Reload completion, corpse removal, grenade fuses and staggered spawns all go
//! through one queue that the tick drains before anything else. Entries due at the
//! same instant come out in insertion order.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::Serialize;

use super::weapon::WeaponKind;

/// An effect waiting for its due time
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Deferred {
    /// Finish the reload of this weapon
    ReloadComplete(WeaponKind),
    /// Drop a dead agent from the active set
    RemoveAgent(u32),
    /// Spawn one agent for `wave`
    SpawnAgent { wave: u32 },
    /// Grenade fuse ran out
    FuseExpired(u32),
}

#[derive(Debug, Clone)]
struct Entry {
    due: f64,
    seq: u64,
    event: Deferred,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // Reversed: BinaryHeap is a max-heap and we want the earliest entry on top
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .total_cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Min-heap of deferred effects ordered by `(due, insertion order)`
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    heap: BinaryHeap<Entry>,
    next_seq: u64,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, due: f64, event: Deferred) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry { due, seq, event });
    }

    /// Pop the earliest entry if it is due at or before `now`
    pub fn pop_due(&mut self, now: f64) -> Option<Deferred> {
        if self.heap.peek()?.due > now {
            return None;
        }
        self.heap.pop().map(|entry| entry.event)
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
