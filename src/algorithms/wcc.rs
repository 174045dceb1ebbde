//! Weakly connected components
//!
//! Label propagation toward the component minimum: every vertex starts as its
//! own root, and each superstep pushes smaller roots across both in- and
//! out-edges (direction-agnostic reachability). A CAS-retry loop resolves
//! concurrent writers: the strictly-greater check and the swap are not
//! atomic together, so the loop re-reads and retries until it either wins or
//! the comparison no longer holds. Terminates when a superstep changes no
//! root; the surviving root of each component is its minimum vertex id.

use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Result;
use tracing::debug;

use crate::engine::exchange::FrontierExchange;
use crate::engine::worker::BspEngine;
use crate::engine::EngineError;
use crate::storage::{GraphStore, NodeId};

/// Final WCC state: one component root per vertex.
#[derive(Debug, Clone)]
pub struct WccResult {
    roots: Vec<u64>,
}

impl WccResult {
    /// Number of vertices
    #[must_use]
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Whether the graph had zero vertices
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Component identifier of `v`: the minimum vertex id in its component.
    #[must_use]
    pub fn component(&self, v: NodeId) -> u64 {
        self.roots[v.index()]
    }

    /// Number of distinct components
    #[must_use]
    pub fn component_count(&self) -> usize {
        let mut roots = self.roots.clone();
        roots.sort_unstable();
        roots.dedup();
        roots.len()
    }
}

/// Compute weakly connected components on `threads` workers.
///
/// # Errors
///
/// Returns an error if `threads` is zero or a worker thread panicked.
///
/// # Example
///
/// ```
/// use graphsweep::{wcc, CsrGraph, NodeId};
///
/// // Two components: {0, 1, 2} and {3, 4}
/// let edges = vec![
///     (NodeId(0), NodeId(1), 1.0),
///     (NodeId(2), NodeId(1), 1.0),
///     (NodeId(3), NodeId(4), 1.0),
/// ];
/// let graph = CsrGraph::from_edge_list(&edges).unwrap();
///
/// let result = wcc(&graph, 2).unwrap();
/// assert_eq!(result.component(NodeId(2)), 0);
/// assert_eq!(result.component(NodeId(4)), 3);
/// assert_eq!(result.component_count(), 2);
/// ```
pub fn wcc<G: GraphStore>(graph: &G, threads: usize) -> Result<WccResult> {
    if threads == 0 {
        return Err(EngineError::ZeroThreads.into());
    }
    let n = graph.vertex_count();
    debug!(threads, vertices = n, "wcc start");
    if n == 0 {
        return Ok(WccResult { roots: Vec::new() });
    }

    let roots: Vec<AtomicU64> = (0..n).map(|i| AtomicU64::new(i as u64)).collect();
    let exchange = FrontierExchange::new(threads);

    let engine = BspEngine::new(threads);
    engine.run(|ctx| {
        // every vertex is active in the first superstep
        let mut input: Vec<NodeId> = (ctx.tid..n)
            .step_by(threads)
            .map(|vid| {
                #[allow(clippy::cast_possible_truncation)]
                let v = NodeId(vid as u32);
                v
            })
            .collect();

        loop {
            ctx.barrier();
            if ctx.stopped() {
                break;
            }

            for &v in &input {
                let root_v = roots[v.index()].load(Ordering::Relaxed);
                let neighbors = graph
                    .in_neighbors(v)
                    .iter()
                    .chain(graph.out_neighbors(v).iter());
                for &u in neighbors {
                    let mut current = roots[u.index()].load(Ordering::Relaxed);
                    // retry until the swap lands or the comparison fails
                    while current > root_v {
                        match roots[u.index()].compare_exchange_weak(
                            current,
                            root_v,
                            Ordering::Relaxed,
                            Ordering::Relaxed,
                        ) {
                            Ok(_) => {
                                exchange.emit(ctx.tid, u);
                                break;
                            }
                            Err(actual) => current = actual,
                        }
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

    Ok(WccResult {
        roots: roots.into_iter().map(AtomicU64::into_inner).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::CsrGraph;

    #[test]
    fn test_directed_path_is_one_component() {
        // 0 → 1 → 2 → 3: weak connectivity ignores direction
        let edges = vec![
            (NodeId(0), NodeId(1), 1.0),
            (NodeId(1), NodeId(2), 1.0),
            (NodeId(2), NodeId(3), 1.0),
        ];
        let graph = CsrGraph::from_edge_list(&edges).unwrap();
        let result = wcc(&graph, 2).unwrap();

        for vid in 0..4 {
            assert_eq!(result.component(NodeId(vid)), 0);
        }
        assert_eq!(result.component_count(), 1);
    }

    #[test]
    fn test_reverse_edge_still_joins() {
        // component min is only reachable against edge direction
        let edges = vec![(NodeId(2), NodeId(0), 1.0), (NodeId(2), NodeId(1), 1.0)];
        let graph = CsrGraph::from_edge_list(&edges).unwrap();
        let result = wcc(&graph, 3).unwrap();

        assert_eq!(result.component(NodeId(0)), 0);
        assert_eq!(result.component(NodeId(1)), 0);
        assert_eq!(result.component(NodeId(2)), 0);
    }

    #[test]
    fn test_disjoint_components_disjoint_roots() {
        let edges = vec![
            (NodeId(0), NodeId(1), 1.0),
            (NodeId(2), NodeId(3), 1.0),
            (NodeId(5), NodeId(4), 1.0),
        ];
        let graph = CsrGraph::from_edge_list(&edges).unwrap();
        let result = wcc(&graph, 2).unwrap();

        assert_eq!(result.component(NodeId(0)), 0);
        assert_eq!(result.component(NodeId(1)), 0);
        assert_eq!(result.component(NodeId(2)), 2);
        assert_eq!(result.component(NodeId(3)), 2);
        assert_eq!(result.component(NodeId(4)), 4);
        assert_eq!(result.component(NodeId(5)), 4);
        assert_eq!(result.component_count(), 3);
    }

    #[test]
    fn test_isolated_vertex_is_own_component() {
        // vertex 2 has a self-loop only; vertex 3 appears in no edge but
        // exists because id 3 is mentioned
        let edges = vec![(NodeId(0), NodeId(1), 1.0), (NodeId(3), NodeId(3), 1.0)];
        let graph = CsrGraph::from_edge_list(&edges).unwrap();
        let result = wcc(&graph, 2).unwrap();

        assert_eq!(result.component(NodeId(2)), 2);
        assert_eq!(result.component(NodeId(3)), 3);
    }

    #[test]
    fn test_thread_count_invariance() {
        let edges = vec![
            (NodeId(9), NodeId(4), 1.0),
            (NodeId(4), NodeId(7), 1.0),
            (NodeId(7), NodeId(1), 1.0),
            (NodeId(2), NodeId(8), 1.0),
            (NodeId(8), NodeId(3), 1.0),
            (NodeId(5), NodeId(6), 1.0),
        ];
        let graph = CsrGraph::from_edge_list(&edges).unwrap();

        let reference = wcc(&graph, 1).unwrap();
        for threads in [2, 3, 4, 8] {
            let result = wcc(&graph, threads).unwrap();
            assert_eq!(result.roots, reference.roots, "threads={threads}");
        }
    }

    #[test]
    fn test_empty_graph() {
        let graph = CsrGraph::new();
        let result = wcc(&graph, 2).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.component_count(), 0);
    }
}
