//! All-to-all frontier exchange
//!
//! A `T × T` matrix of task slots. During the compute phase, producer thread
//! `p` appends newly-activated vertices into `slot(p, owner)`; during the
//! exchange phase, owner thread `o` drains column `o` into its local input
//! list for the next superstep. The two phases are separated by a full
//! barrier, so every slot has exactly one writer at any time. That is the
//! invariant that makes the interior mutability below sound.
//!
//! Merging sorts and deduplicates, so a vertex is active at most once per
//! superstep even when several producers emitted it (SSSP and WCC can emit
//! the same target from different relaxations in one compute phase).

use std::cell::UnsafeCell;

use crossbeam_utils::CachePadded;

use super::partition::owner;
use crate::storage::NodeId;

/// One task slot. Written only by its producer thread during compute,
/// drained only by its owner thread during exchange; the barrier between the
/// phases hands ownership over.
struct Slot(UnsafeCell<Vec<NodeId>>);

// SAFETY: access is single-writer per phase under the barrier discipline
// documented on the module; slots are never touched from two threads within
// one phase.
unsafe impl Sync for Slot {}

/// `T × T` frontier redistribution buffers.
pub struct FrontierExchange {
    threads: usize,
    /// Row-major: `slots[producer * threads + owner]`
    slots: Vec<CachePadded<Slot>>,
}

impl FrontierExchange {
    /// Create empty exchange buffers for `threads` workers.
    #[must_use]
    pub fn new(threads: usize) -> Self {
        Self {
            threads,
            slots: (0..threads * threads)
                .map(|_| CachePadded::new(Slot(UnsafeCell::new(Vec::new()))))
                .collect(),
        }
    }

    /// Seed the initial frontier with `v` before workers start.
    ///
    /// Takes `&mut self`: seeding happens single-threaded, before the pool
    /// spawns.
    pub fn seed(&mut self, v: NodeId) {
        let o = owner(v, self.threads);
        self.slots[o * self.threads + o].0.get_mut().push(v);
    }

    /// Emit `v` into the slot addressed to its owning thread.
    ///
    /// Must only be called by worker `tid` during a compute phase.
    pub fn emit(&self, tid: usize, v: NodeId) {
        let o = owner(v, self.threads);
        // SAFETY: slot row `tid` is written only by worker `tid` during
        // compute; owners read it only in the barrier-separated exchange
        // phase.
        unsafe {
            (*self.slots[tid * self.threads + o].0.get()).push(v);
        }
    }

    /// Drain every slot addressed to worker `tid` into `input`, sorted and
    /// deduplicated. Returns the number of merged tasks.
    ///
    /// Must only be called by worker `tid` during an exchange phase (or
    /// before the pool starts, to pick up seeds).
    pub fn drain_into(&self, tid: usize, input: &mut Vec<NodeId>) -> usize {
        for producer in 0..self.threads {
            // SAFETY: slot column `tid` is drained only by worker `tid`
            // during exchange; producers write it only in the
            // barrier-separated compute phase.
            unsafe {
                input.append(&mut *self.slots[producer * self.threads + tid].0.get());
            }
        }
        input.sort_unstable();
        input.dedup();
        input.len()
    }
}
