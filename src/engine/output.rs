//! Result-sink contract
//!
//! After the terminal superstep each kernel's state collapses into an
//! [`AlgorithmOutput`]; [`AlgorithmOutput::rows`] yields one
//! `(external_id, ResultValue)` pair per vertex in dense-id order, which is
//! all a downstream sink needs to serialize.
//!
//! Rendering follows the Graphalytics output conventions: an unreachable
//! BFS vertex reports `i64::MAX` hops, an unreachable SSSP vertex reports the
//! literal string `infinity`.

use std::fmt;

use crate::algorithms::{
    BfsResult, CdlpResult, LccResult, PageRankResult, SsspResult, WccResult,
};
use crate::storage::{GraphStore, NodeId};

/// Final per-vertex value, algorithm-specific.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResultValue {
    /// Hop count, component root, or community label
    Integer(u64),
    /// Distance, rank, or clustering coefficient
    Real(f64),
    /// Unreachable-distance sentinel, rendered as `infinity`
    Infinity,
}

impl fmt::Display for ResultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => v.fmt(f),
            Self::Real(v) => v.fmt(f),
            Self::Infinity => f.write_str("infinity"),
        }
    }
}

/// Tagged final state of a completed run, one variant per kernel.
#[derive(Debug, Clone)]
pub enum AlgorithmOutput {
    /// BFS levels
    Bfs(BfsResult),
    /// SSSP distances
    Sssp(SsspResult),
    /// WCC component roots
    Wcc(WccResult),
    /// CDLP community labels
    Cdlp(CdlpResult),
    /// `PageRank` scores
    PageRank(PageRankResult),
    /// Local clustering coefficients
    Lcc(LccResult),
}

impl AlgorithmOutput {
    /// Per-vertex `(external_id, value)` rows in dense-id order.
    pub fn rows<'a, G: GraphStore>(
        &'a self,
        graph: &'a G,
    ) -> impl Iterator<Item = (u64, ResultValue)> + 'a {
        (0..self.len()).map(move |vid| {
            #[allow(clippy::cast_possible_truncation)]
            let v = NodeId(vid as u32);
            (graph.external_id(v), self.value(v))
        })
    }

    /// Number of vertices covered by this output
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Bfs(r) => r.len(),
            Self::Sssp(r) => r.len(),
            Self::Wcc(r) => r.len(),
            Self::Cdlp(r) => r.len(),
            Self::PageRank(r) => r.len(),
            Self::Lcc(r) => r.len(),
        }
    }

    /// Whether the run covered zero vertices
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn value(&self, v: NodeId) -> ResultValue {
        match self {
            Self::Bfs(r) => ResultValue::Integer(r.output_level(v)),
            Self::Sssp(r) => match r.distance(v) {
                Some(d) => ResultValue::Real(d),
                None => ResultValue::Infinity,
            },
            Self::Wcc(r) => ResultValue::Integer(r.component(v)),
            Self::Cdlp(r) => ResultValue::Integer(r.label(v)),
            Self::PageRank(r) => ResultValue::Real(r.rank(v)),
            Self::Lcc(r) => ResultValue::Real(r.coefficient(v)),
        }
    }
}
