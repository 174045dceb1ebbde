//! Superstep engine: worker pool, partitioning, frontier exchange,
//! configuration, and the kernel dispatcher
//!
//! Execution model is bulk-synchronous parallel in the Pregel tradition
//! (Malewicz et al., SIGMOD 2010): barrier-delimited compute and exchange
//! phases over a fixed pool of worker threads, no task stealing, no async.

pub mod atomics;
pub mod exchange;
pub mod output;
pub mod partition;
pub mod worker;

pub use output::{AlgorithmOutput, ResultValue};

use anyhow::Result;
use thiserror::Error;
use tracing::debug;

use crate::algorithms;
use crate::storage::{GraphStore, NodeId};

/// Default CDLP / `PageRank` superstep count
pub const DEFAULT_ITERATIONS: usize = 10;

/// Default `PageRank` damping factor
pub const DEFAULT_DAMPING_FACTOR: f64 = 0.85;

/// Errors detected before any superstep executes.
///
/// Everything here is fatal: the run aborts without touching vertex state.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Root vertex id outside `[0, vertex_count)`
    #[error("root vertex {root} out of bounds for graph with {vertices} vertices")]
    RootOutOfBounds {
        /// Requested root id
        root: u64,
        /// Vertex count of the graph
        vertices: usize,
    },

    /// Worker pool cannot be empty
    #[error("thread count must be at least 1")]
    ZeroThreads,

    /// Fixed-iteration algorithms need at least one superstep
    #[error("iteration count must be at least 1")]
    ZeroIterations,

    /// Damping factor outside `(0, 1)`
    #[error("damping factor {0} not in (0, 1)")]
    InvalidDampingFactor(f64),
}

/// Algorithm selector for the [`run`] dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlgorithmKind {
    /// Breadth-first search level assignment
    Bfs,
    /// Single-source shortest paths
    Sssp,
    /// Weakly connected components
    Wcc,
    /// Community detection by label propagation
    Cdlp,
    /// `PageRank`
    PageRank,
    /// Local clustering coefficient
    Lcc,
}

/// Run parameters shared by all kernels.
///
/// `iterations` applies to CDLP and `PageRank`, `damping_factor` to
/// `PageRank`, `root` to BFS and SSSP; the rest ignore the unused fields.
#[derive(Debug, Clone, Copy)]
pub struct RunConfig {
    /// Worker thread count
    pub threads: usize,
    /// Superstep count for the fixed-iteration kernels
    pub iterations: usize,
    /// `PageRank` damping factor
    pub damping_factor: f64,
    /// Root vertex for BFS / SSSP
    pub root: NodeId,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            threads: num_cpus::get(),
            iterations: DEFAULT_ITERATIONS,
            damping_factor: DEFAULT_DAMPING_FACTOR,
            root: NodeId(0),
        }
    }
}

impl RunConfig {
    /// Check parameter ranges that apply to every kernel.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] for a zero thread count, zero iteration
    /// count, or out-of-range damping factor.
    pub fn validate(&self) -> Result<()> {
        if self.threads == 0 {
            return Err(EngineError::ZeroThreads.into());
        }
        if self.iterations == 0 {
            return Err(EngineError::ZeroIterations.into());
        }
        if !(self.damping_factor > 0.0 && self.damping_factor < 1.0) {
            return Err(EngineError::InvalidDampingFactor(self.damping_factor).into());
        }
        Ok(())
    }
}

/// Validate that `root` addresses a vertex of `graph`.
///
/// # Errors
///
/// Returns [`EngineError::RootOutOfBounds`] otherwise.
pub(crate) fn check_root<G: GraphStore>(graph: &G, root: NodeId) -> Result<()> {
    if root.index() >= graph.vertex_count() {
        return Err(EngineError::RootOutOfBounds {
            root: u64::from(root.0),
            vertices: graph.vertex_count(),
        }
        .into());
    }
    Ok(())
}

/// Execute the selected algorithm and collapse its state into a tagged
/// [`AlgorithmOutput`].
///
/// The kernel is chosen at configuration time; inside the superstep loops
/// there is no dynamic dispatch.
///
/// # Errors
///
/// Returns an error for invalid configuration, an out-of-bounds root
/// (BFS/SSSP), or a panicked worker thread.
///
/// # Example
///
/// ```
/// use graphsweep::{run, AlgorithmKind, CsrGraph, NodeId, RunConfig};
///
/// let edges = vec![(NodeId(0), NodeId(1), 1.0), (NodeId(1), NodeId(2), 1.0)];
/// let graph = CsrGraph::from_edge_list(&edges).unwrap();
///
/// let config = RunConfig { threads: 2, ..RunConfig::default() };
/// let output = run(&graph, AlgorithmKind::Wcc, &config).unwrap();
/// let rows: Vec<_> = output.rows(&graph).collect();
/// assert_eq!(rows.len(), 3);
/// ```
pub fn run<G: GraphStore>(
    graph: &G,
    kind: AlgorithmKind,
    config: &RunConfig,
) -> Result<AlgorithmOutput> {
    config.validate()?;
    debug!(
        ?kind,
        threads = config.threads,
        vertices = graph.vertex_count(),
        edges = graph.edge_count(),
        "starting run"
    );

    let output = match kind {
        AlgorithmKind::Bfs => {
            AlgorithmOutput::Bfs(algorithms::bfs(graph, config.root, config.threads)?)
        }
        AlgorithmKind::Sssp => {
            AlgorithmOutput::Sssp(algorithms::sssp(graph, config.root, config.threads)?)
        }
        AlgorithmKind::Wcc => AlgorithmOutput::Wcc(algorithms::wcc(graph, config.threads)?),
        AlgorithmKind::Cdlp => AlgorithmOutput::Cdlp(algorithms::cdlp(
            graph,
            config.iterations,
            config.threads,
        )?),
        AlgorithmKind::PageRank => AlgorithmOutput::PageRank(algorithms::pagerank(
            graph,
            config.iterations,
            config.damping_factor,
            config.threads,
        )?),
        AlgorithmKind::Lcc => AlgorithmOutput::Lcc(algorithms::lcc(graph, config.threads)?),
    };
    Ok(output)
}
