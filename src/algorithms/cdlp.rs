//! Community detection by label propagation
//!
//! Raghavan et al. (2007) label propagation, synchronous variant: each
//! superstep every vertex adopts the most frequent label among its in- and
//! out-neighbors, ties broken by the smallest label value. New labels are
//! staged into a separate field and committed only after a full barrier, so
//! every vertex votes over the *previous* superstep's labels, and histogram
//! accumulation order cannot affect the result. Runs for exactly the
//! configured number of supersteps with no early exit, so the output is
//! deterministic given initial ids and topology.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Result;
use tracing::debug;

use crate::engine::partition::round_robin_tasks;
use crate::engine::worker::BspEngine;
use crate::engine::EngineError;
use crate::storage::{GraphStore, NodeId};

/// Final CDLP state: one community label per vertex.
#[derive(Debug, Clone)]
pub struct CdlpResult {
    labels: Vec<u64>,
}

impl CdlpResult {
    /// Number of vertices
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the graph had zero vertices
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Community label of `v`
    #[must_use]
    pub fn label(&self, v: NodeId) -> u64 {
        self.labels[v.index()]
    }
}

/// Select the winning label from a neighbor histogram: highest frequency,
/// ties to the smallest label. `None` for an empty histogram.
fn majority_label(histogram: &HashMap<u64, u64>) -> Option<u64> {
    let mut best: Option<(u64, u64)> = None; // (freq, label)
    for (&label, &freq) in histogram {
        let better = match best {
            None => true,
            Some((best_freq, best_label)) => {
                freq > best_freq || (freq == best_freq && label < best_label)
            }
        };
        if better {
            best = Some((freq, label));
        }
    }
    best.map(|(_, label)| label)
}

/// Run `iterations` supersteps of label propagation on `threads` workers.
///
/// Every vertex starts labeled with its own id. A vertex with no neighbors
/// keeps its current label.
///
/// # Errors
///
/// Returns an error if `threads` or `iterations` is zero, or a worker thread
/// panicked.
///
/// # Example
///
/// ```
/// use graphsweep::{cdlp, CsrGraph, NodeId};
///
/// // Two triangles joined by nothing: two communities
/// let edges = vec![
///     (NodeId(0), NodeId(1), 1.0),
///     (NodeId(1), NodeId(2), 1.0),
///     (NodeId(2), NodeId(0), 1.0),
///     (NodeId(3), NodeId(4), 1.0),
///     (NodeId(4), NodeId(5), 1.0),
///     (NodeId(5), NodeId(3), 1.0),
/// ];
/// let graph = CsrGraph::from_edge_list(&edges).unwrap();
///
/// let result = cdlp(&graph, 10, 2).unwrap();
/// assert_eq!(result.label(NodeId(1)), result.label(NodeId(2)));
/// assert_ne!(result.label(NodeId(0)), result.label(NodeId(3)));
/// ```
pub fn cdlp<G: GraphStore>(graph: &G, iterations: usize, threads: usize) -> Result<CdlpResult> {
    if threads == 0 {
        return Err(EngineError::ZeroThreads.into());
    }
    if iterations == 0 {
        return Err(EngineError::ZeroIterations.into());
    }
    let n = graph.vertex_count();
    debug!(threads, iterations, vertices = n, "cdlp start");
    if n == 0 {
        return Ok(CdlpResult { labels: Vec::new() });
    }

    let labels: Vec<AtomicU64> = (0..n).map(|i| AtomicU64::new(i as u64)).collect();
    let staged: Vec<AtomicU64> = (0..n).map(|i| AtomicU64::new(i as u64)).collect();
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

            for &v in owned {
                let mut histogram: HashMap<u64, u64> = HashMap::new();
                let neighbors = graph
                    .in_neighbors(v)
                    .iter()
                    .chain(graph.out_neighbors(v).iter());
                for &u in neighbors {
                    *histogram
                        .entry(labels[u.index()].load(Ordering::Relaxed))
                        .or_insert(0) += 1;
                }
                let winner = majority_label(&histogram)
                    .unwrap_or_else(|| labels[v.index()].load(Ordering::Relaxed));
                staged[v.index()].store(winner, Ordering::Relaxed);
            }

            // commit only after every vote is in
            ctx.barrier();
            for &v in owned {
                labels[v.index()].store(staged[v.index()].load(Ordering::Relaxed), Ordering::Relaxed);
            }
            ctx.barrier();
            ctx.publish_step_termination(&mut step, iterations);
        }
    })?;

    Ok(CdlpResult {
        labels: labels.into_iter().map(AtomicU64::into_inner).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::CsrGraph;

    #[test]
    fn test_majority_label_tie_break() {
        let histogram = HashMap::from([(5, 2), (3, 2), (9, 1)]);
        assert_eq!(majority_label(&histogram), Some(3));

        let histogram = HashMap::from([(5, 3), (3, 2)]);
        assert_eq!(majority_label(&histogram), Some(5));

        assert_eq!(majority_label(&HashMap::new()), None);
    }

    #[test]
    fn test_clique_converges_to_min_id() {
        // complete directed triangle: everyone sees everyone
        let edges = vec![
            (NodeId(0), NodeId(1), 1.0),
            (NodeId(1), NodeId(0), 1.0),
            (NodeId(1), NodeId(2), 1.0),
            (NodeId(2), NodeId(1), 1.0),
            (NodeId(0), NodeId(2), 1.0),
            (NodeId(2), NodeId(0), 1.0),
        ];
        let graph = CsrGraph::from_edge_list(&edges).unwrap();
        let result = cdlp(&graph, 10, 2).unwrap();

        for vid in 0..3 {
            assert_eq!(result.label(NodeId(vid)), 0);
        }
    }

    #[test]
    fn test_isolated_vertex_keeps_own_label() {
        let edges = vec![(NodeId(0), NodeId(1), 1.0), (NodeId(3), NodeId(3), 1.0)];
        let graph = CsrGraph::from_edge_list(&edges).unwrap();
        let result = cdlp(&graph, 5, 2).unwrap();
        assert_eq!(result.label(NodeId(2)), 2);
    }

    #[test]
    fn test_pair_oscillates_on_odd_iterations() {
        // two mutually linked vertices swap labels every superstep; after an
        // odd count each holds the other's id
        let edges = vec![(NodeId(0), NodeId(1), 1.0), (NodeId(1), NodeId(0), 1.0)];
        let graph = CsrGraph::from_edge_list(&edges).unwrap();

        let result = cdlp(&graph, 1, 2).unwrap();
        assert_eq!(result.label(NodeId(0)), 1);
        assert_eq!(result.label(NodeId(1)), 0);

        let result = cdlp(&graph, 2, 2).unwrap();
        assert_eq!(result.label(NodeId(0)), 0);
        assert_eq!(result.label(NodeId(1)), 1);
    }

    #[test]
    fn test_exact_iteration_count_no_early_exit() {
        // a stable graph still runs all supersteps; result must match the
        // one-superstep output because it is already a fixpoint
        let edges = vec![
            (NodeId(0), NodeId(1), 1.0),
            (NodeId(1), NodeId(0), 1.0),
            (NodeId(0), NodeId(2), 1.0),
            (NodeId(2), NodeId(0), 1.0),
            (NodeId(1), NodeId(2), 1.0),
            (NodeId(2), NodeId(1), 1.0),
        ];
        let graph = CsrGraph::from_edge_list(&edges).unwrap();
        let short = cdlp(&graph, 2, 2).unwrap();
        let long = cdlp(&graph, 10, 2).unwrap();
        assert_eq!(short.labels, long.labels);
    }

    #[test]
    fn test_thread_count_invariance() {
        let edges = vec![
            (NodeId(0), NodeId(1), 1.0),
            (NodeId(1), NodeId(2), 1.0),
            (NodeId(2), NodeId(0), 1.0),
            (NodeId(2), NodeId(3), 1.0),
            (NodeId(3), NodeId(4), 1.0),
            (NodeId(4), NodeId(5), 1.0),
            (NodeId(5), NodeId(3), 1.0),
        ];
        let graph = CsrGraph::from_edge_list(&edges).unwrap();

        let reference = cdlp(&graph, 10, 1).unwrap();
        for threads in [2, 3, 4, 8] {
            let result = cdlp(&graph, 10, threads).unwrap();
            assert_eq!(result.labels, reference.labels, "threads={threads}");
        }
    }

    #[test]
    fn test_rejects_zero_iterations() {
        let edges = vec![(NodeId(0), NodeId(1), 1.0)];
        let graph = CsrGraph::from_edge_list(&edges).unwrap();
        assert!(cdlp(&graph, 0, 2).is_err());
    }
}
