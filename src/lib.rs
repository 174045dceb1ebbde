//! graphsweep: shared-memory bulk-synchronous parallel graph analytics
//!
//! # Overview
//!
//! graphsweep executes a fixed set of iterative vertex-centric algorithms
//! (breadth-first search, single-source shortest paths, weakly connected
//! components, community detection by label propagation, `PageRank`, and
//! local clustering coefficient) over a large, mostly-static directed graph.
//! Execution is bulk-synchronous parallel (BSP): a fixed pool of worker
//! threads alternates barrier-delimited compute and exchange phases until each
//! algorithm's termination predicate holds.
//!
//! # Quick Start
//!
//! ```
//! use graphsweep::{bfs, CsrGraph, NodeId};
//!
//! # fn example() -> graphsweep::Result<()> {
//! // Build graph from edge list: 0 → 1 → 2
//! let edges = vec![(NodeId(0), NodeId(1), 1.0), (NodeId(1), NodeId(2), 1.0)];
//! let graph = CsrGraph::from_edge_list(&edges)?;
//!
//! // Level-assignment BFS from vertex 0 on 2 worker threads
//! let result = bfs(&graph, NodeId(0), 2)?;
//! assert_eq!(result.level(NodeId(2)), Some(2));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! # Architecture
//!
//! - **Storage**: [`GraphStore`] contract with two variants, CSR
//!   ([`CsrGraph`]) and adjacency vectors ([`AdjacencyGraph`])
//! - **Engine**: barrier-synchronized superstep loop with all-to-all frontier
//!   exchange between worker threads
//! - **Kernels**: per-vertex state in flat atomic arrays, conflicts resolved
//!   by CAS / atomic-add / atomic-min only
//! - **Output**: per-vertex `(external_id, value)` rows in dense-id order

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod algorithms;
pub mod engine;
pub mod storage;

// Re-export core types
pub use algorithms::{
    bfs, cdlp, lcc, pagerank, sssp, wcc, BfsResult, CdlpResult, LccResult, PageRankResult,
    SsspResult, WccResult,
};
pub use engine::{run, AlgorithmKind, AlgorithmOutput, EngineError, ResultValue, RunConfig};
pub use storage::{AdjacencyGraph, CsrGraph, GraphStore, NodeId};

// Error type
pub use anyhow::{Error, Result};
