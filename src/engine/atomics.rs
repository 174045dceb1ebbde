//! Lock-free f64 atomics
//!
//! `std::sync::atomic` has no floating-point types, so the accumulators and
//! staged distances store f64 bit patterns in an `AtomicU64`. `fetch_add` and
//! `fetch_min` are compare-exchange loops; both are the lock-free form of the
//! per-vertex critical sections the kernels need (the SSSP relaxation is an
//! atomic-minimum, the `PageRank` scatter an atomic add).

use std::sync::atomic::{AtomicU64, Ordering};

/// An `f64` with atomic load/store/add/min, backed by its bit pattern.
#[derive(Debug)]
pub struct AtomicF64(AtomicU64);

impl AtomicF64 {
    /// Create with an initial value
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self(AtomicU64::new(value.to_bits()))
    }

    /// Atomic load
    #[must_use]
    pub fn load(&self, order: Ordering) -> f64 {
        f64::from_bits(self.0.load(order))
    }

    /// Atomic store
    pub fn store(&self, value: f64, order: Ordering) {
        self.0.store(value.to_bits(), order);
    }

    /// Atomically add `value`, returning the previous value.
    pub fn fetch_add(&self, value: f64, order: Ordering) -> f64 {
        let mut current = self.0.load(Ordering::Relaxed);
        loop {
            let next = (f64::from_bits(current) + value).to_bits();
            match self
                .0
                .compare_exchange_weak(current, next, order, Ordering::Relaxed)
            {
                Ok(_) => return f64::from_bits(current),
                Err(actual) => current = actual,
            }
        }
    }

    /// Atomically lower the stored value to `min(current, value)`, returning
    /// the previous value. The caller learns whether it strictly lowered the
    /// cell by comparing `value` against the return.
    pub fn fetch_min(&self, value: f64, order: Ordering) -> f64 {
        let mut current = self.0.load(Ordering::Relaxed);
        loop {
            let current_f = f64::from_bits(current);
            if current_f <= value {
                return current_f;
            }
            match self.0.compare_exchange_weak(
                current,
                value.to_bits(),
                order,
                Ordering::Relaxed,
            ) {
                Ok(_) => return current_f,
                Err(actual) => current = actual,
            }
        }
    }
}
