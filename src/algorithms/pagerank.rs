//! `PageRank`
//!
//! Based on Page et al. (1999) "The `PageRank` Citation Ranking: Bringing
//! Order to the Web". Push-style power iteration: each superstep every
//! vertex scatters `rank/out_degree` onto its out-neighbors' accumulators
//! (atomic f64 adds, since many sources may target the same vertex
//! concurrently),
//! dangling vertices pour their rank into a shared scalar redistributed
//! uniformly, and the rank update applies the damping factor. Runs exactly
//! the configured number of supersteps; there is no convergence check.
//!
//! Rank mass is conserved: after every superstep the ranks sum to 1 within
//! floating-point tolerance.

use std::sync::atomic::Ordering;

use anyhow::Result;
use tracing::debug;

use crate::engine::atomics::AtomicF64;
use crate::engine::partition::round_robin_tasks;
use crate::engine::worker::BspEngine;
use crate::engine::EngineError;
use crate::storage::{GraphStore, NodeId};

/// Final `PageRank` state: one score per vertex.
#[derive(Debug, Clone)]
pub struct PageRankResult {
    ranks: Vec<f64>,
}

impl PageRankResult {
    /// Number of vertices
    #[must_use]
    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    /// Whether the graph had zero vertices
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    /// `PageRank` score of `v`
    #[must_use]
    pub fn rank(&self, v: NodeId) -> f64 {
        self.ranks[v.index()]
    }

    /// Sum of all scores (≈ 1.0)
    #[must_use]
    pub fn total(&self) -> f64 {
        self.ranks.iter().sum()
    }
}

/// Run `iterations` supersteps of `PageRank` on `threads` workers.
///
/// # Arguments
///
/// * `graph` - graph store; out-edges and out-degrees are read
/// * `iterations` - exact superstep count (typically 10-50)
/// * `damping_factor` - probability of following a link, in `(0, 1)`
/// * `threads` - worker thread count
///
/// # Errors
///
/// Returns an error if `threads` or `iterations` is zero, `damping_factor`
/// is out of range, or a worker thread panicked.
///
/// # Example
///
/// ```
/// use graphsweep::{pagerank, CsrGraph, NodeId};
///
/// // Cycle: 0 → 1 → 2 → 0 converges to uniform rank
/// let edges = vec![
///     (NodeId(0), NodeId(1), 1.0),
///     (NodeId(1), NodeId(2), 1.0),
///     (NodeId(2), NodeId(0), 1.0),
/// ];
/// let graph = CsrGraph::from_edge_list(&edges).unwrap();
///
/// let result = pagerank(&graph, 30, 0.85, 2).unwrap();
/// assert!((result.total() - 1.0).abs() < 1e-9);
/// assert!((result.rank(NodeId(0)) - 1.0 / 3.0).abs() < 1e-6);
/// ```
pub fn pagerank<G: GraphStore>(
    graph: &G,
    iterations: usize,
    damping_factor: f64,
    threads: usize,
) -> Result<PageRankResult> {
    if threads == 0 {
        return Err(EngineError::ZeroThreads.into());
    }
    if iterations == 0 {
        return Err(EngineError::ZeroIterations.into());
    }
    if !(damping_factor > 0.0 && damping_factor < 1.0) {
        return Err(EngineError::InvalidDampingFactor(damping_factor).into());
    }
    let n = graph.vertex_count();
    debug!(threads, iterations, damping_factor, vertices = n, "pagerank start");
    if n == 0 {
        return Ok(PageRankResult { ranks: Vec::new() });
    }

    #[allow(clippy::cast_precision_loss)] // Graphs >2^52 vertices not supported
    let nf = n as f64;
    let ranks: Vec<AtomicF64> = (0..n).map(|_| AtomicF64::new(1.0 / nf)).collect();
    let sums: Vec<AtomicF64> = (0..n).map(|_| AtomicF64::new(0.0)).collect();
    let degrees: Vec<usize> = (0..n)
        .map(|vid| {
            #[allow(clippy::cast_possible_truncation)]
            let v = NodeId(vid as u32);
            graph.out_degree(v)
        })
        .collect();
    let dangling = AtomicF64::new(0.0);
    let tasks = round_robin_tasks(n, threads);

    let engine = BspEngine::new(threads);
    engine.run(|ctx| {
        let owned = &tasks[ctx.tid];
        let mut step = 0;

        loop {
            ctx.barrier();
            if ctx.stopped() {
                break;
            }

            // (a) collect the rank mass stuck on dangling vertices
            for &v in owned {
                if degrees[v.index()] == 0 {
                    dangling.fetch_add(ranks[v.index()].load(Ordering::Relaxed), Ordering::Relaxed);
                }
            }

            ctx.barrier();
            // (b) scatter rank shares along out-edges
            for &v in owned {
                let degree = degrees[v.index()];
                if degree > 0 {
                    #[allow(clippy::cast_precision_loss)]
                    let share = ranks[v.index()].load(Ordering::Relaxed) / degree as f64;
                    for &u in graph.out_neighbors(v) {
                        sums[u.index()].fetch_add(share, Ordering::Relaxed);
                    }
                }
            }

            ctx.barrier();
            // (c) apply damping and the uniform dangling redistribution
            let dangling_mass = dangling.load(Ordering::Relaxed);
            for &v in owned {
                let sum = sums[v.index()].load(Ordering::Relaxed);
                ranks[v.index()].store(
                    (1.0 - damping_factor) / nf + damping_factor * (sum + dangling_mass / nf),
                    Ordering::Relaxed,
                );
                sums[v.index()].store(0.0, Ordering::Relaxed);
            }

            ctx.barrier();
            if ctx.tid == 0 {
                dangling.store(0.0, Ordering::Relaxed);
            }
            ctx.publish_step_termination(&mut step, iterations);
        }
    })?;

    Ok(PageRankResult {
        ranks: ranks
            .into_iter()
            .map(|r| r.load(Ordering::Relaxed))
            .collect(),
    })
}
