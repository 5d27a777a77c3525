//! Stable open set for A*.
//!
//! Entries are ordered by `(f, seq)`: lower `f` first, ties broken by the
//! order in which cells *joined* the frontier (first in wins). A cell whose
//! score drops while queued keeps its original `seq`; the stale heap entry
//! is skipped lazily when it surfaces. The result is the same selection a
//! linear scan over an insertion-ordered list would make.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    f: i32,
    /// Monotonic counter assigned when the cell joined the frontier.
    seq: u64,
    idx: usize,
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.f.cmp(&other.f).then(self.seq.cmp(&other.seq))
    }
}

/// Membership record of a queued cell: its join order and current key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slot {
    seq: u64,
    f: i32,
}

/// The open set, keyed by cell index.
#[derive(Debug, Clone)]
pub struct Frontier {
    heap: BinaryHeap<Reverse<Entry>>,
    slots: Vec<Option<Slot>>,
    len: usize,
    seq: u64,
}

impl Frontier {
    /// An empty frontier over cell indices `0..capacity`.
    pub fn new(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::new(),
            slots: vec![None; capacity],
            len: 0,
            seq: 0,
        }
    }

    /// Add `idx` with key `f` unless it is already queued.
    ///
    /// Returns `true` if the cell joined the frontier.
    pub fn insert_if_absent(&mut self, idx: usize, f: i32) -> bool {
        if self.slots[idx].is_some() {
            return false;
        }
        let seq = self.seq;
        self.seq += 1;
        self.slots[idx] = Some(Slot { seq, f });
        self.len += 1;
        self.heap.push(Reverse(Entry { f, seq, idx }));
        true
    }

    /// Change the key of a queued cell without moving it in join order.
    ///
    /// Does nothing if `idx` is not queued.
    pub fn rescore(&mut self, idx: usize, f: i32) {
        let Some(slot) = self.slots[idx].as_mut() else {
            return;
        };
        if slot.f == f {
            return;
        }
        slot.f = f;
        let seq = slot.seq;
        self.heap.push(Reverse(Entry { f, seq, idx }));
    }

    /// Remove and return the queued cell with the lowest `(f, seq)`.
    pub fn pop_min(&mut self) -> Option<usize> {
        while let Some(Reverse(e)) = self.heap.pop() {
            // Skip entries superseded by a rescore or already popped.
            if self.slots[e.idx] != Some(Slot { seq: e.seq, f: e.f }) {
                continue;
            }
            self.slots[e.idx] = None;
            self.len -= 1;
            return Some(e.idx);
        }
        None
    }

    #[inline]
    pub fn contains(&self, idx: usize) -> bool {
        self.slots[idx].is_some()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
