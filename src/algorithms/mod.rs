//! Vertex-centric algorithm kernels (BFS, SSSP, WCC, CDLP, `PageRank`, LCC)
//!
//! Each kernel owns its per-vertex state arrays, its per-superstep update
//! rule, and its termination policy; the shared superstep machinery lives in
//! [`crate::engine`].

pub mod bfs;
pub mod cdlp;
pub mod lcc;
pub mod pagerank;
pub mod sssp;
pub mod wcc;

pub use bfs::{bfs, BfsResult};
pub use cdlp::{cdlp, CdlpResult};
pub use lcc::{lcc, LccResult};
pub use pagerank::{pagerank, PageRankResult};
pub use sssp::{sssp, SsspResult};
pub use wcc::{wcc, WccResult};
