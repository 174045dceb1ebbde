//! Single-source shortest paths
//!
//! Parallel relaxation to a fixpoint (Bellman-Ford style), not Dijkstra:
//! there is no priority ordering, just supersteps of edge relaxations until
//! no distance improves. Each relaxation lowers the target's *staged*
//! distance through a lock-free atomic-minimum; committed distances move from
//! the staging field only after the barrier, so the distance a thread relaxes
//! from is never mid-update.
//!
//! Weights must be non-negative; negative weights make convergence undefined
//! (but never unsafe). The core does not validate this: it is a caller
//! precondition.

use std::sync::atomic::Ordering;

use anyhow::Result;
use tracing::debug;

use crate::engine::atomics::AtomicF64;
use crate::engine::exchange::FrontierExchange;
use crate::engine::worker::BspEngine;
use crate::engine::{check_root, EngineError};
use crate::storage::{GraphStore, NodeId};

/// Final SSSP state: one path weight per vertex.
#[derive(Debug, Clone)]
pub struct SsspResult {
    distances: Vec<f64>,
}

impl SsspResult {
    /// Number of vertices
    #[must_use]
    pub fn len(&self) -> usize {
        self.distances.len()
    }

    /// Whether the graph had zero vertices
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    /// Shortest path weight from the root to `v`, or `None` if unreachable.
    #[must_use]
    pub fn distance(&self, v: NodeId) -> Option<f64> {
        let d = self.distances[v.index()];
        d.is_finite().then_some(d)
    }
}

/// Compute shortest path weights from `root` on `threads` workers.
///
/// # Arguments
///
/// * `graph` - graph store; out-edges and their weights are read
/// * `root` - source vertex, distance 0
/// * `threads` - worker thread count
///
/// # Errors
///
/// Returns an error if `threads` is zero, `root` is out of bounds, or a
/// worker thread panicked.
///
/// # Example
///
/// ```
/// use graphsweep::{sssp, CsrGraph, NodeId};
///
/// // Direct: 0 --5.0--> 2. Via 1: 0 --1.0--> 1 --2.0--> 2
/// let edges = vec![
///     (NodeId(0), NodeId(1), 1.0),
///     (NodeId(1), NodeId(2), 2.0),
///     (NodeId(0), NodeId(2), 5.0),
/// ];
/// let graph = CsrGraph::from_edge_list(&edges).unwrap();
///
/// let result = sssp(&graph, NodeId(0), 2).unwrap();
/// assert_eq!(result.distance(NodeId(2)), Some(3.0)); // not 5.0
/// ```
pub fn sssp<G: GraphStore>(graph: &G, root: NodeId, threads: usize) -> Result<SsspResult> {
    if threads == 0 {
        return Err(EngineError::ZeroThreads.into());
    }
    check_root(graph, root)?;
    let n = graph.vertex_count();
    debug!(root = %root, threads, vertices = n, "sssp start");

    let distance: Vec<AtomicF64> = (0..n).map(|_| AtomicF64::new(f64::INFINITY)).collect();
    let update: Vec<AtomicF64> = (0..n).map(|_| AtomicF64::new(f64::INFINITY)).collect();
    distance[root.index()].store(0.0, Ordering::Relaxed);
    update[root.index()].store(0.0, Ordering::Relaxed);

    let mut exchange = FrontierExchange::new(threads);
    exchange.seed(root);

    let engine = BspEngine::new(threads);
    engine.run(|ctx| {
        let mut input: Vec<NodeId> = Vec::new();
        exchange.drain_into(ctx.tid, &mut input);

        loop {
            ctx.barrier();
            if ctx.stopped() {
                break;
            }

            for &v in &input {
                let dist_v = distance[v.index()].load(Ordering::Relaxed);
                for (idx, &u) in graph.out_neighbors(v).iter().enumerate() {
                    let candidate = dist_v + graph.edge_weight(v, idx);
                    let previous = update[u.index()].fetch_min(candidate, Ordering::Relaxed);
                    if candidate < previous {
                        exchange.emit(ctx.tid, u);
                    }
                }
            }

            ctx.barrier();
            input.clear();
            let tasks = exchange.drain_into(ctx.tid, &mut input);
            ctx.report_activity(tasks);
            // commit staged distances for the vertices this worker now owns
            for &v in &input {
                distance[v.index()].store(update[v.index()].load(Ordering::Relaxed), Ordering::Relaxed);
            }
            ctx.barrier();
            ctx.publish_frontier_termination();
        }
    })?;

    Ok(SsspResult {
        distances: distance
            .into_iter()
            .map(|d| d.load(Ordering::Relaxed))
            .collect(),
    })
}
