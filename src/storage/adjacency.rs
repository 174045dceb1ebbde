//! Adjacency-vector graph representation
//!
//! The second storage variant behind [`GraphStore`]: one owned neighbor
//! vector per vertex instead of the flat CSR arrays. Slower to scan, cheaper
//! to build; the engine treats both identically through the trait.

use anyhow::{anyhow, Result};

use super::{GraphStore, NodeId};

/// Per-vertex adjacency storage for one direction plus out-edge weights
#[derive(Debug, Clone, Default)]
struct VertexRow {
    out: Vec<NodeId>,
    out_weights: Vec<f64>,
    incoming: Vec<NodeId>,
}

/// Adjacency-vector graph.
///
/// # Example
///
/// ```
/// use graphsweep::{AdjacencyGraph, GraphStore, NodeId};
///
/// let edges = vec![(NodeId(0), NodeId(1), 2.0), (NodeId(1), NodeId(2), 3.0)];
/// let graph = AdjacencyGraph::from_edge_list(&edges).unwrap();
///
/// assert_eq!(graph.out_neighbors(NodeId(1)), &[NodeId(2)]);
/// assert_eq!(graph.edge_weight(NodeId(1), 0), 3.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct AdjacencyGraph {
    rows: Vec<VertexRow>,
    num_edges: usize,
}

impl AdjacencyGraph {
    /// Create an empty graph
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from a `(source, target, weight)` edge list.
    ///
    /// # Errors
    ///
    /// Returns an error if a weight is non-finite.
    pub fn from_edge_list(edges: &[(NodeId, NodeId, f64)]) -> Result<Self> {
        if edges.is_empty() {
            return Ok(Self::new());
        }

        if let Some((src, dst, w)) = edges.iter().find(|(_, _, w)| !w.is_finite()) {
            return Err(anyhow!("non-finite weight {w} on edge {src} -> {dst}"));
        }

        let max_node = edges
            .iter()
            .flat_map(|(src, dst, _)| [src.0, dst.0])
            .max()
            .ok_or_else(|| anyhow!("empty edge list"))?;

        let mut rows: Vec<VertexRow> = vec![VertexRow::default(); (max_node + 1) as usize];
        for (src, dst, weight) in edges {
            rows[src.index()].out.push(*dst);
            rows[src.index()].out_weights.push(*weight);
            rows[dst.index()].incoming.push(*src);
        }

        Ok(Self {
            rows,
            num_edges: edges.len(),
        })
    }
}

impl GraphStore for AdjacencyGraph {
    fn vertex_count(&self) -> usize {
        self.rows.len()
    }

    fn edge_count(&self) -> usize {
        self.num_edges
    }

    fn out_neighbors(&self, v: NodeId) -> &[NodeId] {
        &self.rows[v.index()].out
    }

    fn in_neighbors(&self, v: NodeId) -> &[NodeId] {
        &self.rows[v.index()].incoming
    }

    fn edge_weight(&self, v: NodeId, idx: usize) -> f64 {
        self.rows[v.index()].out_weights[idx]
    }
}
