//! Barrier-synchronized worker pool
//!
//! One [`BspEngine`] drives a fixed pool of `T` scoped OS threads through a
//! bulk-synchronous superstep loop. All threads run identical kernel code;
//! the full barrier is the only blocking point. Per-superstep phases:
//!
//! ```text
//! Barrier₀ → Compute → Barrier₁ → Exchange → Barrier₂ → (loop | Terminate)
//! ```
//!
//! Thread 0 alone evaluates and publishes the shared stop flag after Barrier₂;
//! every other thread observes it after the next Barrier₀, so the flag is
//! never read while task buffers are still being mutated. The barrier's
//! synchronization makes `Relaxed` loads/stores on the flag and the activity
//! slots sufficient: all cross-phase visibility rides on the barrier edges.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Barrier;

use anyhow::{anyhow, Result};
use crossbeam_utils::CachePadded;
use tracing::trace;

/// Fixed worker pool executing one BSP run.
#[derive(Debug)]
pub struct BspEngine {
    threads: usize,
    barrier: Barrier,
    stop: AtomicBool,
    /// Per-thread task counts from the last exchange, read only by thread 0
    activity: Vec<CachePadded<AtomicUsize>>,
}

impl BspEngine {
    /// Create an engine for `threads` workers.
    #[must_use]
    pub fn new(threads: usize) -> Self {
        Self {
            threads,
            barrier: Barrier::new(threads),
            stop: AtomicBool::new(false),
            activity: (0..threads)
                .map(|_| CachePadded::new(AtomicUsize::new(0)))
                .collect(),
        }
    }

    /// Number of worker threads
    #[must_use]
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Spawn the pool and run `worker` once per thread.
    ///
    /// Returns when every worker has returned.
    ///
    /// # Errors
    ///
    /// Returns an error if a worker thread panicked.
    pub fn run<F>(&self, worker: F) -> Result<()>
    where
        F: Fn(WorkerCtx<'_>) + Sync,
    {
        crossbeam_utils::thread::scope(|scope| {
            for tid in 0..self.threads {
                let worker = &worker;
                scope.spawn(move |_| {
                    worker(WorkerCtx { tid, engine: self });
                });
            }
        })
        .map_err(|_| anyhow!("worker thread panicked"))
    }
}

/// Per-thread handle into the running [`BspEngine`].
#[derive(Debug, Clone, Copy)]
pub struct WorkerCtx<'e> {
    /// Worker thread id in `[0, threads)`
    pub tid: usize,
    engine: &'e BspEngine,
}

impl WorkerCtx<'_> {
    /// Number of worker threads
    #[must_use]
    pub fn threads(&self) -> usize {
        self.engine.threads
    }

    /// Wait at the full barrier until all workers arrive.
    pub fn barrier(&self) {
        self.engine.barrier.wait();
    }

    /// Whether the termination flag was published. Read only after a
    /// barrier following the publish.
    #[must_use]
    pub fn stopped(&self) -> bool {
        self.engine.stop.load(Ordering::Relaxed)
    }

    /// Record how many tasks this worker holds for the next superstep.
    /// Call during the exchange phase, before Barrier₂.
    pub fn report_activity(&self, tasks: usize) {
        self.engine.activity[self.tid].store(tasks, Ordering::Relaxed);
    }

    /// Frontier-exhaustion policy: thread 0 stops the loop once every
    /// worker reported an empty task list. Call between Barrier₂ and the
    /// next Barrier₀.
    pub fn publish_frontier_termination(&self) {
        if self.tid == 0 {
            let active: usize = self
                .engine
                .activity
                .iter()
                .map(|a| a.load(Ordering::Relaxed))
                .sum();
            trace!(active, "superstep exchange complete");
            self.engine.stop.store(active == 0, Ordering::Relaxed);
        }
    }

    /// Fixed-iteration policy: thread 0 stops the loop after `limit`
    /// supersteps. Every worker advances its own `step` copy; only thread 0
    /// publishes. Call between Barrier₂ and the next Barrier₀.
    pub fn publish_step_termination(&self, step: &mut usize, limit: usize) {
        *step += 1;
        if self.tid == 0 {
            trace!(step = *step, limit, "superstep complete");
            if *step >= limit {
                self.engine.stop.store(true, Ordering::Relaxed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_runs_every_worker_once() {
        let engine = BspEngine::new(4);
        let count = AtomicUsize::new(0);
        engine
            .run(|ctx| {
                assert!(ctx.tid < 4);
                assert_eq!(ctx.threads(), 4);
                count.fetch_add(1, Ordering::Relaxed);
            })
            .unwrap();
        assert_eq!(count.load(Ordering::Relaxed), 4);
    }

    #[test]
    fn test_frontier_termination_all_idle() {
        let engine = BspEngine::new(3);
        let supersteps = AtomicUsize::new(0);
        engine
            .run(|ctx| {
                loop {
                    ctx.barrier();
                    if ctx.stopped() {
                        break;
                    }
                    if ctx.tid == 0 {
                        supersteps.fetch_add(1, Ordering::Relaxed);
                    }
                    ctx.barrier();
                    // two supersteps of activity, then idle
                    let active = usize::from(supersteps.load(Ordering::Relaxed) < 2);
                    ctx.report_activity(active);
                    ctx.barrier();
                    ctx.publish_frontier_termination();
                }
            })
            .unwrap();
        // superstep 1 reports activity, superstep 2 reports idle
        assert_eq!(supersteps.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_step_termination_exact_count() {
        let engine = BspEngine::new(2);
        let supersteps = AtomicUsize::new(0);
        engine
            .run(|ctx| {
                let mut step = 0;
                loop {
                    ctx.barrier();
                    if ctx.stopped() {
                        break;
                    }
                    if ctx.tid == 0 {
                        supersteps.fetch_add(1, Ordering::Relaxed);
                    }
                    ctx.barrier();
                    ctx.barrier();
                    ctx.publish_step_termination(&mut step, 5);
                }
            })
            .unwrap();
        assert_eq!(supersteps.load(Ordering::Relaxed), 5);
    }

    #[test]
    fn test_worker_panic_is_error() {
        let engine = BspEngine::new(1);
        let result = engine.run(|_| panic!("boom"));
        assert!(result.is_err());
    }
}
