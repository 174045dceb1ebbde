//! Breadth-first search level assignment
//!
//! Frontier-driven BFS in the Ligra tradition (Shun & Blelloch, `PPoPP`
//! 2013): each superstep expands the current frontier along out-edges, and a
//! single-writer-wins compare-and-swap claims each newly discovered vertex
//! exactly once. Because levels grow strictly superstep by superstep, the
//! first claim is the true shortest hop count and the final levels are
//! deterministic for any thread count.

use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Result;
use tracing::debug;

use crate::engine::exchange::FrontierExchange;
use crate::engine::worker::BspEngine;
use crate::engine::{check_root, EngineError};
use crate::storage::{GraphStore, NodeId};

/// Level sentinel for vertices never reached from the root
const UNREACHED: u64 = u64::MAX;

/// Final BFS state: one hop count per vertex.
#[derive(Debug, Clone)]
pub struct BfsResult {
    levels: Vec<u64>,
}

impl BfsResult {
    /// Number of vertices
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Whether the graph had zero vertices
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Hop count of `v` from the root, or `None` if unreachable.
    #[must_use]
    pub fn level(&self, v: NodeId) -> Option<u64> {
        let level = self.levels[v.index()];
        (level != UNREACHED).then_some(level)
    }

    /// Hop count in output form: unreachable vertices report `i64::MAX`.
    #[must_use]
    pub fn output_level(&self, v: NodeId) -> u64 {
        match self.levels[v.index()] {
            #[allow(clippy::cast_sign_loss)]
            UNREACHED => i64::MAX as u64,
            level => level,
        }
    }
}

/// Compute BFS levels from `root` on `threads` workers.
///
/// # Arguments
///
/// * `graph` - graph store (out-edges only are traversed)
/// * `root` - starting vertex, level 0
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
/// use graphsweep::{bfs, CsrGraph, NodeId};
///
/// // 0 → 1 → 2, and 0 → 2 as a shortcut
/// let edges = vec![
///     (NodeId(0), NodeId(1), 1.0),
///     (NodeId(1), NodeId(2), 1.0),
///     (NodeId(0), NodeId(2), 1.0),
/// ];
/// let graph = CsrGraph::from_edge_list(&edges).unwrap();
///
/// let result = bfs(&graph, NodeId(0), 2).unwrap();
/// assert_eq!(result.level(NodeId(2)), Some(1)); // shortcut wins
/// ```
pub fn bfs<G: GraphStore>(graph: &G, root: NodeId, threads: usize) -> Result<BfsResult> {
    if threads == 0 {
        return Err(EngineError::ZeroThreads.into());
    }
    check_root(graph, root)?;
    let n = graph.vertex_count();
    debug!(root = %root, threads, vertices = n, "bfs start");

    let levels: Vec<AtomicU64> = (0..n).map(|_| AtomicU64::new(UNREACHED)).collect();
    levels[root.index()].store(0, Ordering::Relaxed);

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
                let level = levels[v.index()].load(Ordering::Relaxed);
                for &u in graph.out_neighbors(v) {
                    // single CAS winner claims u at level + 1
                    if levels[u.index()]
                        .compare_exchange(UNREACHED, level + 1, Ordering::Relaxed, Ordering::Relaxed)
                        .is_ok()
                    {
                        exchange.emit(ctx.tid, u);
                    }
                }
            }

            ctx.barrier();
            input.clear();
            let tasks = exchange.drain_into(ctx.tid, &mut input);
            ctx.report_activity(tasks);
            ctx.barrier();
            ctx.publish_frontier_termination();
        }
    })?;

    Ok(BfsResult {
        levels: levels.into_iter().map(AtomicU64::into_inner).collect(),
    })
}
