//! Local clustering coefficient
//!
//! Two phases, no supersteps. An init pass materializes each vertex's
//! neighbor set (the sorted, deduplicated union of in- and out-neighbors)
//! into disjoint edge-balanced slices, one per worker; the scope join is the
//! barrier that makes every set visible before any thread reads a neighbor's
//! set. The count pass is embarrassingly parallel: for each vertex `v` and
//! each `w` in its set, add `|set(v) ∩ set(w)|` to `v`'s triangle count,
//! then `coefficient = count / (deg * (deg - 1))` for `deg ≥ 2`, else 0,
//! with `deg = |set(v)|`. Each worker writes only its own slice of the
//! coefficient array, so the counters need no synchronization at all.

use anyhow::{anyhow, Result};
use tracing::debug;

use crate::engine::partition::{edge_balanced_boundaries, split_by_ranges};
use crate::engine::EngineError;
use crate::storage::{GraphStore, NodeId};

/// Final LCC state: one coefficient per vertex.
#[derive(Debug, Clone)]
pub struct LccResult {
    coefficients: Vec<f64>,
}

impl LccResult {
    /// Number of vertices
    #[must_use]
    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    /// Whether the graph had zero vertices
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// Clustering coefficient of `v`, in `[0, 1]`
    #[must_use]
    pub fn coefficient(&self, v: NodeId) -> f64 {
        self.coefficients[v.index()]
    }
}

/// Count common elements of two sorted, deduplicated id slices.
fn intersect_count(a: &[NodeId], b: &[NodeId]) -> u64 {
    let mut count = 0;
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                count += 1;
                i += 1;
                j += 1;
            }
        }
    }
    count
}

/// Compute local clustering coefficients on `threads` workers.
///
/// Edge direction is ignored: the neighborhood of a vertex is the union of
/// its in- and out-neighbors.
///
/// # Errors
///
/// Returns an error if `threads` is zero or a worker thread panicked.
///
/// # Example
///
/// ```
/// use graphsweep::{lcc, CsrGraph, NodeId};
///
/// // Triangle 0-1-2: every vertex fully clustered
/// let edges = vec![
///     (NodeId(0), NodeId(1), 1.0),
///     (NodeId(1), NodeId(2), 1.0),
///     (NodeId(2), NodeId(0), 1.0),
/// ];
/// let graph = CsrGraph::from_edge_list(&edges).unwrap();
///
/// let result = lcc(&graph, 2).unwrap();
/// assert_eq!(result.coefficient(NodeId(0)), 1.0);
/// ```
pub fn lcc<G: GraphStore>(graph: &G, threads: usize) -> Result<LccResult> {
    if threads == 0 {
        return Err(EngineError::ZeroThreads.into());
    }
    let n = graph.vertex_count();
    debug!(threads, vertices = n, "lcc start");
    if n == 0 {
        return Ok(LccResult {
            coefficients: Vec::new(),
        });
    }

    let boundaries = edge_balanced_boundaries(graph, threads);

    // init pass: build every neighbor set before any cross-vertex read
    let mut neighbor_sets: Vec<Vec<NodeId>> = vec![Vec::new(); n];
    {
        let chunks = split_by_ranges(&mut neighbor_sets, &boundaries);
        crossbeam_utils::thread::scope(|scope| {
            for (tid, chunk) in chunks.into_iter().enumerate() {
                let start = boundaries[tid];
                scope.spawn(move |_| {
                    for (offset, set) in chunk.iter_mut().enumerate() {
                        #[allow(clippy::cast_possible_truncation)]
                        let v = NodeId((start + offset) as u32);
                        set.reserve(graph.in_degree(v) + graph.out_degree(v));
                        set.extend_from_slice(graph.in_neighbors(v));
                        set.extend_from_slice(graph.out_neighbors(v));
                        set.sort_unstable();
                        set.dedup();
                    }
                });
            }
        })
        .map_err(|_| anyhow!("worker thread panicked"))?;
    }

    // count pass: sets are now read-only and shared
    let sets = &neighbor_sets;
    let mut coefficients = vec![0.0_f64; n];
    {
        let chunks = split_by_ranges(&mut coefficients, &boundaries);
        crossbeam_utils::thread::scope(|scope| {
            for (tid, chunk) in chunks.into_iter().enumerate() {
                let start = boundaries[tid];
                scope.spawn(move |_| {
                    for (offset, coefficient) in chunk.iter_mut().enumerate() {
                        let set = &sets[start + offset];
                        let degree = set.len();
                        if degree < 2 {
                            continue; // stays 0.0
                        }
                        let mut triangles = 0_u64;
                        for &w in set {
                            triangles += intersect_count(set, &sets[w.index()]);
                        }
                        #[allow(clippy::cast_precision_loss)]
                        let pairs = (degree * (degree - 1)) as f64;
                        #[allow(clippy::cast_precision_loss)]
                        let closed = triangles as f64;
                        *coefficient = closed / pairs;
                    }
                });
            }
        })
        .map_err(|_| anyhow!("worker thread panicked"))?;
    }

    Ok(LccResult { coefficients })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::CsrGraph;

    #[test]
    fn test_intersect_count() {
        let a = [NodeId(1), NodeId(3), NodeId(5), NodeId(7)];
        let b = [NodeId(2), NodeId(3), NodeId(7), NodeId(9)];
        assert_eq!(intersect_count(&a, &b), 2);
        assert_eq!(intersect_count(&a, &[]), 0);
        assert_eq!(intersect_count(&a, &a), 4);
    }

    #[test]
    fn test_triangle_fully_clustered() {
        let edges = vec![
            (NodeId(0), NodeId(1), 1.0),
            (NodeId(1), NodeId(2), 1.0),
            (NodeId(2), NodeId(0), 1.0),
        ];
        let graph = CsrGraph::from_edge_list(&edges).unwrap();
        let result = lcc(&graph, 2).unwrap();

        for vid in 0..3 {
            assert_eq!(result.coefficient(NodeId(vid)), 1.0, "vid={vid}");
        }
    }

    #[test]
    fn test_triangle_free_graph_is_zero() {
        // path: no triangles anywhere
        let edges = vec![
            (NodeId(0), NodeId(1), 1.0),
            (NodeId(1), NodeId(2), 1.0),
            (NodeId(2), NodeId(3), 1.0),
        ];
        let graph = CsrGraph::from_edge_list(&edges).unwrap();
        let result = lcc(&graph, 2).unwrap();

        for vid in 0..4 {
            assert_eq!(result.coefficient(NodeId(vid)), 0.0, "vid={vid}");
        }
    }

    #[test]
    fn test_complete_graph_all_ones() {
        // K5, one directed edge per unordered pair
        let mut edges = Vec::new();
        for i in 0..5_u32 {
            for j in (i + 1)..5 {
                edges.push((NodeId(i), NodeId(j), 1.0));
            }
        }
        let graph = CsrGraph::from_edge_list(&edges).unwrap();
        let result = lcc(&graph, 3).unwrap();

        for vid in 0..5 {
            assert!(
                (result.coefficient(NodeId(vid)) - 1.0).abs() < 1e-12,
                "vid={vid}"
            );
        }
    }

    #[test]
    fn test_low_degree_vertices_are_zero() {
        // 0-1 only: both have degree 1
        let edges = vec![(NodeId(0), NodeId(1), 1.0)];
        let graph = CsrGraph::from_edge_list(&edges).unwrap();
        let result = lcc(&graph, 2).unwrap();

        assert_eq!(result.coefficient(NodeId(0)), 0.0);
        assert_eq!(result.coefficient(NodeId(1)), 0.0);
    }

    #[test]
    fn test_partial_clustering() {
        // triangle 0-1-2 plus pendant 3 hanging off 0:
        // deg(0) = 3, neighbors {1,2,3}, one closed pair out of three
        let edges = vec![
            (NodeId(0), NodeId(1), 1.0),
            (NodeId(1), NodeId(2), 1.0),
            (NodeId(2), NodeId(0), 1.0),
            (NodeId(0), NodeId(3), 1.0),
        ];
        let graph = CsrGraph::from_edge_list(&edges).unwrap();
        let result = lcc(&graph, 2).unwrap();

        // count(0) = |{1,2,3}∩set(1)| + |{1,2,3}∩set(2)| + |{1,2,3}∩set(3)|
        //          = 1 + 1 + 0 = 2; coefficient = 2 / (3*2)
        assert!((result.coefficient(NodeId(0)) - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(result.coefficient(NodeId(1)), 1.0);
        assert_eq!(result.coefficient(NodeId(2)), 1.0);
        assert_eq!(result.coefficient(NodeId(3)), 0.0);
    }

    #[test]
    fn test_direction_agnostic() {
        // same triangle, edges all pointing "inward"
        let forward = vec![
            (NodeId(0), NodeId(1), 1.0),
            (NodeId(1), NodeId(2), 1.0),
            (NodeId(2), NodeId(0), 1.0),
        ];
        let inward = vec![
            (NodeId(1), NodeId(0), 1.0),
            (NodeId(2), NodeId(1), 1.0),
            (NodeId(0), NodeId(2), 1.0),
        ];
        let a = lcc(&CsrGraph::from_edge_list(&forward).unwrap(), 2).unwrap();
        let b = lcc(&CsrGraph::from_edge_list(&inward).unwrap(), 2).unwrap();
        assert_eq!(a.coefficients, b.coefficients);
    }

    #[test]
    fn test_thread_count_invariance() {
        let mut edges = Vec::new();
        for i in 0..6_u32 {
            for j in (i + 1)..6 {
                if (i + j) % 3 != 0 {
                    edges.push((NodeId(i), NodeId(j), 1.0));
                }
            }
        }
        let graph = CsrGraph::from_edge_list(&edges).unwrap();

        let reference = lcc(&graph, 1).unwrap();
        for threads in [2, 3, 4, 8] {
            let result = lcc(&graph, threads).unwrap();
            assert_eq!(result.coefficients, reference.coefficients, "threads={threads}");
        }
    }
}
