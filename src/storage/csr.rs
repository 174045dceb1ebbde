//! CSR (Compressed Sparse Row) graph representation
//!
//! Based on `GraphBLAST` (Yang et al., ACM `ToMS` 2022) for cache-friendly
//! sparse traversal.
//!
//! # CSR Format
//!
//! ```text
//! Graph: 0 → 1, 0 → 2, 1 → 2
//!
//! CSR:
//!   row_offsets: [0, 2, 3, 3]  // Vertex 0: edges [0..2), Vertex 1: [2..3), Vertex 2: [3..3)
//!   col_indices: [1, 2, 2]     // Edge 0 → vertex 1, edge 1 → vertex 2, edge 2 → vertex 2
//!   edge_weights: [1.0, 1.0, 1.0]
//! ```

use anyhow::{anyhow, Result};

use super::{GraphStore, NodeId};

/// Flat CSR graph, forward and reverse.
///
/// Optimized for:
/// - O(1) slice access to outgoing edges (forward CSR)
/// - O(1) slice access to incoming edges (reverse CSR)
/// - concurrent traversal by many worker threads (immutable after build)
///
/// # Example
///
/// ```
/// use graphsweep::{CsrGraph, GraphStore, NodeId};
///
/// let edges = vec![(NodeId(0), NodeId(1), 1.0), (NodeId(0), NodeId(2), 1.0)];
/// let graph = CsrGraph::from_edge_list(&edges).unwrap();
///
/// assert_eq!(graph.out_neighbors(NodeId(0)).len(), 2);
/// assert_eq!(graph.in_neighbors(NodeId(2)), &[NodeId(0)]);
/// ```
#[derive(Debug, Clone)]
pub struct CsrGraph {
    /// Forward CSR: vertex i's out-edges occupy `col_indices[row_offsets[i]..row_offsets[i+1]]`
    row_offsets: Vec<u32>,
    col_indices: Vec<NodeId>,
    edge_weights: Vec<f64>,

    /// Reverse CSR: vertex i's in-edges occupy `rev_col_indices[rev_row_offsets[i]..rev_row_offsets[i+1]]`
    rev_row_offsets: Vec<u32>,
    rev_col_indices: Vec<NodeId>,

    /// Optional external (dataset) vertex ids, indexed by internal id
    external_ids: Option<Vec<u64>>,

    num_vertices: usize,
}

impl CsrGraph {
    /// Create an empty graph
    #[must_use]
    pub fn new() -> Self {
        Self {
            row_offsets: vec![0],
            col_indices: Vec::new(),
            edge_weights: Vec::new(),
            rev_row_offsets: vec![0],
            rev_col_indices: Vec::new(),
            external_ids: None,
            num_vertices: 0,
        }
    }

    /// Build a graph from a `(source, target, weight)` edge list.
    ///
    /// Vertex count is `max id + 1`; ids mentioned only as targets still get
    /// (empty) adjacency rows.
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
        let num_vertices = (max_node + 1) as usize;

        // Temporary adjacency lists, forward and reverse
        let mut adj: Vec<Vec<(NodeId, f64)>> = vec![Vec::new(); num_vertices];
        let mut rev_adj: Vec<Vec<NodeId>> = vec![Vec::new(); num_vertices];

        for (src, dst, weight) in edges {
            adj[src.index()].push((*dst, *weight));
            rev_adj[dst.index()].push(*src);
        }

        // Forward CSR
        let mut row_offsets = Vec::with_capacity(num_vertices + 1);
        let mut col_indices = Vec::with_capacity(edges.len());
        let mut edge_weights = Vec::with_capacity(edges.len());

        let mut offset = 0_u32;
        row_offsets.push(offset);
        for neighbors in &adj {
            #[allow(clippy::cast_possible_truncation)] // Graphs >4B edges not supported
            let len = neighbors.len() as u32;
            offset += len;
            row_offsets.push(offset);
            for (target, weight) in neighbors {
                col_indices.push(*target);
                edge_weights.push(*weight);
            }
        }

        // Reverse CSR
        let mut rev_row_offsets = Vec::with_capacity(num_vertices + 1);
        let mut rev_col_indices = Vec::with_capacity(edges.len());

        let mut rev_offset = 0_u32;
        rev_row_offsets.push(rev_offset);
        for sources in &rev_adj {
            #[allow(clippy::cast_possible_truncation)]
            let len = sources.len() as u32;
            rev_offset += len;
            rev_row_offsets.push(rev_offset);
            rev_col_indices.extend_from_slice(sources);
        }

        Ok(Self {
            row_offsets,
            col_indices,
            edge_weights,
            rev_row_offsets,
            rev_col_indices,
            external_ids: None,
            num_vertices,
        })
    }

    /// Attach an external-id table (`external_ids[internal]` = dataset id).
    ///
    /// # Errors
    ///
    /// Returns an error if the table length differs from the vertex count.
    pub fn with_external_ids(mut self, external_ids: Vec<u64>) -> Result<Self> {
        if external_ids.len() != self.num_vertices {
            return Err(anyhow!(
                "external id table has {} entries for {} vertices",
                external_ids.len(),
                self.num_vertices
            ));
        }
        self.external_ids = Some(external_ids);
        Ok(self)
    }

    /// Translate an external (dataset) vertex id to its internal dense id.
    ///
    /// Without an attached table this is the identity mapping over the valid
    /// id range. Returns `None` when the id resolves to nothing; callers
    /// treat that as a load error before any superstep runs.
    #[must_use]
    pub fn resolve_external(&self, external: u64) -> Option<NodeId> {
        match &self.external_ids {
            Some(table) => {
                let pos = table.iter().position(|&ext| ext == external)?;
                #[allow(clippy::cast_possible_truncation)]
                let id = pos as u32;
                Some(NodeId(id))
            }
            None => {
                let id = u32::try_from(external).ok()?;
                ((id as usize) < self.num_vertices).then_some(NodeId(id))
            }
        }
    }

    /// Weights of the outgoing edges of `v`, parallel to
    /// [`out_neighbors`](GraphStore::out_neighbors)
    #[must_use]
    pub fn out_weights(&self, v: NodeId) -> &[f64] {
        let start = self.row_offsets[v.index()] as usize;
        let end = self.row_offsets[v.index() + 1] as usize;
        &self.edge_weights[start..end]
    }
}

impl Default for CsrGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphStore for CsrGraph {
    fn vertex_count(&self) -> usize {
        self.num_vertices
    }

    fn edge_count(&self) -> usize {
        self.col_indices.len()
    }

    fn out_neighbors(&self, v: NodeId) -> &[NodeId] {
        let start = self.row_offsets[v.index()] as usize;
        let end = self.row_offsets[v.index() + 1] as usize;
        &self.col_indices[start..end]
    }

    fn in_neighbors(&self, v: NodeId) -> &[NodeId] {
        let start = self.rev_row_offsets[v.index()] as usize;
        let end = self.rev_row_offsets[v.index() + 1] as usize;
        &self.rev_col_indices[start..end]
    }

    fn edge_weight(&self, v: NodeId, idx: usize) -> f64 {
        self.out_weights(v)[idx]
    }

    fn external_id(&self, v: NodeId) -> u64 {
        match &self.external_ids {
            Some(table) => table[v.index()],
            None => u64::from(v.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_graph() {
        let graph = CsrGraph::new();
        assert_eq!(graph.vertex_count(), 0);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_from_edge_list_simple() {
        let edges = vec![
            (NodeId(0), NodeId(1), 1.0),
            (NodeId(0), NodeId(2), 1.0),
            (NodeId(1), NodeId(2), 1.0),
        ];

        let graph = CsrGraph::from_edge_list(&edges).unwrap();

        assert_eq!(graph.vertex_count(), 3);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.row_offsets, vec![0, 2, 3, 3]);
        assert_eq!(graph.col_indices, vec![NodeId(1), NodeId(2), NodeId(2)]);
        assert_eq!(graph.edge_weights, vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_out_neighbors_and_weights() {
        let edges = vec![(NodeId(0), NodeId(1), 1.0), (NodeId(0), NodeId(2), 2.5)];
        let graph = CsrGraph::from_edge_list(&edges).unwrap();

        assert_eq!(graph.out_neighbors(NodeId(0)), &[NodeId(1), NodeId(2)]);
        assert_eq!(graph.out_weights(NodeId(0)), &[1.0, 2.5]);
        assert_eq!(graph.edge_weight(NodeId(0), 1), 2.5);

        let empty: &[NodeId] = &[];
        assert_eq!(graph.out_neighbors(NodeId(1)), empty);
    }

    #[test]
    fn test_in_neighbors() {
        let edges = vec![(NodeId(0), NodeId(2), 1.0), (NodeId(1), NodeId(2), 1.0)];
        let graph = CsrGraph::from_edge_list(&edges).unwrap();

        let sources = graph.in_neighbors(NodeId(2));
        assert_eq!(sources.len(), 2);
        assert!(sources.contains(&NodeId(0)));
        assert!(sources.contains(&NodeId(1)));

        let empty: &[NodeId] = &[];
        assert_eq!(graph.in_neighbors(NodeId(0)), empty);
    }

    #[test]
    fn test_reverse_csr_multi_edges() {
        // Duplicate edges must appear once per occurrence in the reverse CSR
        let edges = vec![
            (NodeId(0), NodeId(1), 1.0),
            (NodeId(0), NodeId(1), 2.0),
            (NodeId(2), NodeId(1), 3.0),
        ];
        let graph = CsrGraph::from_edge_list(&edges).unwrap();

        let incoming = graph.in_neighbors(NodeId(1));
        assert_eq!(incoming.len(), 3);
        assert_eq!(incoming.iter().filter(|&&s| s == NodeId(0)).count(), 2);
        assert_eq!(incoming.iter().filter(|&&s| s == NodeId(2)).count(), 1);
    }

    #[test]
    fn test_rejects_non_finite_weight() {
        let edges = vec![(NodeId(0), NodeId(1), f64::NAN)];
        assert!(CsrGraph::from_edge_list(&edges).is_err());
    }

    #[test]
    fn test_external_id_table() {
        let edges = vec![(NodeId(0), NodeId(1), 1.0)];
        let graph = CsrGraph::from_edge_list(&edges)
            .unwrap()
            .with_external_ids(vec![100, 200])
            .unwrap();

        assert_eq!(graph.external_id(NodeId(1)), 200);
        assert_eq!(graph.resolve_external(100), Some(NodeId(0)));
        assert_eq!(graph.resolve_external(300), None);
    }

    #[test]
    fn test_external_id_table_wrong_len() {
        let edges = vec![(NodeId(0), NodeId(1), 1.0)];
        let graph = CsrGraph::from_edge_list(&edges).unwrap();
        assert!(graph.with_external_ids(vec![5]).is_err());
    }

    #[test]
    fn test_resolve_external_identity() {
        let edges = vec![(NodeId(0), NodeId(3), 1.0)];
        let graph = CsrGraph::from_edge_list(&edges).unwrap();
        assert_eq!(graph.resolve_external(3), Some(NodeId(3)));
        assert_eq!(graph.resolve_external(4), None);
    }

}
