mod dynamic;
mod ek;
mod graph;
mod statistic;

pub use dynamic::DynamicMaxFlow;
pub use ek::EdmondsKarp;
pub use graph::DynamicGraph;
pub use statistic::FlowStatistic;

use std::fmt::Debug;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// An edge record of the collaborator graph. The reverse direction is
/// derived during search, never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edge {
    pub from: u32,
    pub to: u32,
    pub id: u32,
}

/// One endpoint of an adjacency list entry: the neighbour node and the id
/// of the edge reaching it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdjEdge {
    pub node: u32,
    pub id: u32,
}

/// One entry of the graph's mutation log.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EdgeEvent {
    pub id: u32,
    pub addition: bool,
}

/// Read-only view of an evolving directed multigraph. Node and edge ids are
/// dense non-negative integers. The monotone counters and the mutation log
/// let an engine decide between cache reuse, history replay and full
/// recomputation without owning the graph.
pub trait GraphIf {
    fn num_node(&self) -> u32;

    fn num_edge(&self) -> u32;

    fn is_edge(&self, edge: u32) -> bool;

    fn edge_enabled(&self, edge: u32) -> bool;

    fn edge(&self, edge: u32) -> Edge;

    fn num_incident(&self, node: u32) -> u32;

    fn incident(&self, node: u32, i: u32) -> AdjEdge;

    fn num_incoming(&self, node: u32) -> u32;

    fn incoming(&self, node: u32, i: u32) -> AdjEdge;

    fn history(&self) -> &[EdgeEvent];

    fn modifications(&self) -> u64;

    fn additions(&self) -> u64;

    fn deletions(&self) -> u64;

    fn history_clears(&self) -> u64;

    /// Whether the graph changed structurally (new nodes or edges) since the
    /// last history clear, forcing observers to resynchronize from scratch.
    fn changed(&self) -> bool;
}

/// Edge weights. Exact signed arithmetic with a total order; `INF` is a
/// sentinel that only ever flows through `min`, never through `+`/`-`.
pub trait Weight:
    Copy
    + Ord
    + Debug
    + Add<Output = Self>
    + Sub<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
{
    const ZERO: Self;
    const INF: Self;
}

macro_rules! impl_weight {
    ($($t:ty),*) => {
        $(impl Weight for $t {
            const ZERO: Self = 0;
            const INF: Self = <$t>::MAX;
        })*
    };
}

impl_weight!(i32, i64, i128);

/// Externally supplied per-edge capacity, constant for an edge's lifetime.
pub trait CapacityIf<W: Weight> {
    fn capacity(&self, edge: u32) -> W;
}

impl<W: Weight> CapacityIf<W> for Vec<W> {
    #[inline]
    fn capacity(&self, edge: u32) -> W {
        self[edge as usize]
    }
}

/// Predecessor record built during search on the residual graph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum Pred {
    #[default]
    Unvisited,
    Source,
    Via {
        from: u32,
        edge: u32,
        backward: bool,
    },
    /// The virtual arc used during flow repair; it has no edge id and no
    /// entry in the flow map.
    Shortcut { from: u32 },
}
