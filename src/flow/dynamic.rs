use super::statistic::FlowStatistic;
use super::{AdjEdge, CapacityIf, Edge, EdgeEvent, GraphIf, Pred, Weight};
use crate::config::FlowConfig;
use giputils::gvec::Gvec;
use log::{debug, trace};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct GraphStamp {
    modifications: u64,
    additions: u64,
    deletions: u64,
    history_clears: u64,
}

impl GraphStamp {
    fn of<G: GraphIf>(g: &G) -> Self {
        Self {
            modifications: g.modifications(),
            additions: g.additions(),
            deletions: g.deletions(),
            history_clears: g.history_clears(),
        }
    }
}

/// The virtual arc spliced into the residual graph during flow repair. It is
/// absent from the flow map and the capacity accessor; search reaches `to`
/// from `from` through it, and the augmentation walk jumps over it without
/// touching any flow entry.
#[derive(Clone, Copy, Debug)]
struct Shortcut<W> {
    from: u32,
    to: u32,
    capacity: W,
    flow: W,
}

/// Incremental maximum flow, following the dynamic variant of Edmonds-Karp:
/// the flow map survives across calls, graph mutations are replayed from the
/// collaborator's history, and deleting a flow-carrying edge triggers a local
/// repair instead of a recomputation from scratch.
///
/// The engine owns only its internal buffers; the graph and the capacity
/// accessor are borrowed read-only per call. A single instance serves a
/// single graph: the version stamps it keeps are only meaningful against the
/// collaborator they were taken from.
pub struct DynamicMaxFlow<W: Weight> {
    f: W,
    flow: Gvec<W>,
    prev: Gvec<Pred>,
    bottleneck: Gvec<W>,
    edge_enabled: Gvec<bool>,
    queue: Vec<u32>,
    seen: Gvec<bool>,
    last: Option<GraphStamp>,
    history_qhead: usize,
    #[allow(unused)]
    cfg: FlowConfig,
    pub statistic: FlowStatistic,
}

impl<W: Weight> DynamicMaxFlow<W> {
    pub fn new(cfg: FlowConfig) -> Self {
        Self {
            f: W::ZERO,
            flow: Default::default(),
            prev: Default::default(),
            bottleneck: Default::default(),
            edge_enabled: Default::default(),
            queue: Vec::new(),
            seen: Default::default(),
            last: None,
            history_qhead: 0,
            cfg,
            statistic: Default::default(),
        }
    }

    /// Maximum s-t flow over the currently enabled edges. Idempotent while
    /// the graph is unchanged; after the call the per-edge flow map is a
    /// valid maximum flow.
    pub fn max_flow<G: GraphIf, C: CapacityIf<W>>(
        &mut self,
        g: &G,
        cap: &C,
        s: u32,
        t: u32,
    ) -> W {
        assert!(s < g.num_node() && t < g.num_node() && s != t);
        self.statistic.num_maxflow += 1;
        let stamp = GraphStamp::of(g);
        if let Some(last) = self.last
            && last.modifications == stamp.modifications
        {
            self.statistic.num_cache_hit += 1;
            return self.f;
        }
        if self
            .last
            .is_none_or(|last| last.history_clears != stamp.history_clears)
            || g.changed()
        {
            self.statistic.num_full += 1;
            debug!(
                "maxflow: full recompute over {} nodes, {} edges",
                g.num_node(),
                g.num_edge()
            );
            self.reinit(g, s);
            self.saturate(g, cap, s, t);
            // Events recorded before this point were folded into the fresh
            // snapshot; replaying them over it would be a no-op.
            self.history_qhead = g.history().len();
        } else {
            self.statistic.num_incremental += 1;
            let mut added_edges = false;
            let mut needs_reflow = false;
            trace!(
                "maxflow: replaying {} graph events",
                g.history().len() - self.history_qhead
            );
            for i in self.history_qhead..g.history().len() {
                let EdgeEvent { id, addition } = g.history()[i];
                if addition && g.edge_enabled(id) {
                    added_edges = true;
                    self.edge_enabled[id] = true;
                } else if !addition && !g.edge_enabled(id) {
                    self.edge_enabled[id] = false;
                    let fv = self.flow[id];
                    if fv != W::ZERO {
                        needs_reflow |= self.repair(g, cap, id, fv, s, t);
                    }
                }
            }
            self.history_qhead = g.history().len();
            if needs_reflow {
                self.f = self.recount(g, s);
            }
            if added_edges {
                self.saturate(g, cap, s, t);
            }
        }
        #[cfg(debug_assertions)]
        self.check_flow(g, cap, s, t);
        self.last = Some(stamp);
        self.f
    }

    /// Returns the max-flow value and fills `cut` with the edges crossing
    /// the minimum cut: every enabled edge from a residual-reachable node to
    /// an unreachable one. Their removal disconnects s from t.
    pub fn min_cut<G: GraphIf, C: CapacityIf<W>>(
        &mut self,
        g: &G,
        cap: &C,
        s: u32,
        t: u32,
        cut: &mut Vec<Edge>,
    ) -> W {
        let f = self.max_flow(g, cap, s, t);
        cut.clear();
        self.seen.clear();
        self.seen.resize(g.num_node() as usize, false);
        self.seen[s] = true;
        self.queue.clear();
        self.queue.push(s);
        let mut qhead = 0;
        while qhead < self.queue.len() {
            let u = self.queue[qhead];
            qhead += 1;
            for i in 0..g.num_incident(u) {
                let AdjEdge { node: v, id } = g.incident(u, i);
                if !g.edge_enabled(id) {
                    continue;
                }
                if cap.capacity(id) - self.flow[id] == W::ZERO {
                    cut.push(Edge { from: u, to: v, id });
                } else if !self.seen[v] {
                    self.seen[v] = true;
                    self.queue.push(v);
                }
            }
            for i in 0..g.num_incoming(u) {
                let AdjEdge { node: v, id } = g.incoming(u, i);
                if !g.edge_enabled(id) {
                    continue;
                }
                if self.flow[id] != W::ZERO && !self.seen[v] {
                    self.seen[v] = true;
                    self.queue.push(v);
                }
            }
        }
        cut.retain(|e| self.seen[e.from] && !self.seen[e.to]);
        #[cfg(debug_assertions)]
        {
            let mut sum = W::ZERO;
            for e in cut.iter() {
                debug_assert!(self.flow[e.id] == cap.capacity(e.id));
                sum += self.flow[e.id];
            }
            debug_assert!(sum == f);
        }
        f
    }

    /// Flow value cached by the last `max_flow` call.
    #[inline]
    pub fn value(&self) -> W {
        self.f
    }

    #[inline]
    pub fn edge_flow(&self, edge: u32) -> W {
        assert!(self.edge_enabled[edge]);
        self.flow[edge]
    }

    #[inline]
    pub fn edge_capacity<C: CapacityIf<W>>(&self, cap: &C, edge: u32) -> W {
        assert!(self.edge_enabled[edge]);
        cap.capacity(edge)
    }

    #[inline]
    pub fn edge_residual_capacity<C: CapacityIf<W>>(&self, cap: &C, edge: u32) -> W {
        assert!(self.edge_enabled[edge]);
        cap.capacity(edge) - self.flow[edge]
    }

    fn reinit<G: GraphIf>(&mut self, g: &G, s: u32) {
        let n = g.num_node() as usize;
        let e = g.num_edge() as usize;
        self.f = W::ZERO;
        self.flow.clear();
        self.flow.resize(e, W::ZERO);
        self.prev.clear();
        self.prev.resize(n, Pred::Unvisited);
        self.bottleneck.clear();
        self.bottleneck.resize(n, W::ZERO);
        self.edge_enabled.clear();
        self.edge_enabled.resize(e, false);
        for i in 0..g.num_edge() {
            self.edge_enabled[i] = g.is_edge(i) && g.edge_enabled(i);
        }
        self.bottleneck[s] = W::INF;
    }

    /// Classical Edmonds-Karp rounds from s to t, accumulating into the
    /// cached flow value. Runs both the initial computation and the
    /// saturation of freshly enabled edges.
    fn saturate<G: GraphIf, C: CapacityIf<W>>(&mut self, g: &G, cap: &C, s: u32, t: u32) {
        loop {
            let m = self.bfs(g, cap, s, t, None);
            if m == W::ZERO {
                break;
            }
            self.f += m;
            self.augment(cap, s, t, m);
        }
    }

    /// Rebalances the flow after `edge` was disabled while carrying `fv`
    /// units. Returns whether the cached flow value must be recounted.
    fn repair<G: GraphIf, C: CapacityIf<W>>(
        &mut self,
        g: &G,
        cap: &C,
        edge: u32,
        fv: W,
        s: u32,
        t: u32,
    ) -> bool {
        self.statistic.num_repair += 1;
        let e = g.edge(edge);
        let (mut u, mut v, mut fv) = (e.from, e.to, fv);
        if fv < W::ZERO {
            (u, v) = (v, u);
            fv = -fv;
        }
        debug_assert!(fv > W::ZERO);
        trace!("maxflow: repairing deleted edge {edge} carrying {fv:?}");
        // First try to reroute the lost units through the residual graph;
        // whatever cannot be rerouted is drained back through a virtual s-t
        // arc, lowering the total flow.
        let rerouted = self.max_flow_residual(g, cap, u, v, fv);
        debug_assert!(rerouted <= fv);
        let needs_reflow = if rerouted == fv {
            false
        } else {
            let delta = fv - rerouted;
            debug_assert!(delta > W::ZERO);
            debug!("maxflow: edge {edge} deletion lowers the flow by up to {delta:?}");
            self.max_flow_shortcut(g, cap, u, v, s, t, delta);
            true
        };
        self.flow[edge] = W::ZERO;
        needs_reflow
    }

    /// Residual max flow from u to v bounded by `bound`, used to reroute the
    /// flow of a deleted edge.
    fn max_flow_residual<G: GraphIf, C: CapacityIf<W>>(
        &mut self,
        g: &G,
        cap: &C,
        u: u32,
        v: u32,
        bound: W,
    ) -> W {
        let mut new_flow = W::ZERO;
        loop {
            let mut m = self.bfs(g, cap, u, v, None);
            if new_flow + m > bound {
                m = bound - new_flow;
            }
            if m <= W::ZERO {
                break;
            }
            new_flow += m;
            self.augment(cap, u, v, m);
        }
        new_flow
    }

    /// Residual max flow from u to v with a virtual arc of capacity `bound`
    /// from s to t. Every augmenting path crosses the arc (direct u-v paths
    /// were exhausted beforehand), cancelling s-t flow that can no longer be
    /// delivered.
    #[allow(clippy::too_many_arguments)]
    fn max_flow_shortcut<G: GraphIf, C: CapacityIf<W>>(
        &mut self,
        g: &G,
        cap: &C,
        u: u32,
        v: u32,
        s: u32,
        t: u32,
        bound: W,
    ) -> W {
        let sc = Shortcut {
            from: s,
            to: t,
            capacity: bound,
            flow: W::ZERO,
        };
        let mut new_flow = W::ZERO;
        loop {
            let mut m = self.bfs(g, cap, u, v, Some(sc));
            if new_flow + m > bound {
                m = bound - new_flow;
            }
            if m == W::ZERO {
                break;
            }
            new_flow += m;
            self.augment(cap, u, v, m);
        }
        new_flow
    }

    /// Breadth-first search on the residual graph: forward residuals are
    /// capacity minus flow, backward residuals are flow. Returns the
    /// bottleneck at t, or zero when t is unreachable.
    fn bfs<G: GraphIf, C: CapacityIf<W>>(
        &mut self,
        g: &G,
        cap: &C,
        s: u32,
        t: u32,
        shortcut: Option<Shortcut<W>>,
    ) -> W {
        self.statistic.num_bfs += 1;
        for u in 0..g.num_node() {
            self.prev[u] = Pred::Unvisited;
        }
        self.prev[s] = Pred::Source;
        let old_m = self.bottleneck[s];
        self.bottleneck[s] = W::INF;
        self.queue.clear();
        self.queue.push(s);
        let mut found = false;
        let mut qhead = 0;
        'search: while qhead < self.queue.len() {
            let u = self.queue[qhead];
            qhead += 1;
            if let Some(sc) = shortcut
                && u == sc.from
            {
                let v = sc.to;
                let residual = sc.capacity - sc.flow;
                if residual > W::ZERO && self.prev[v] == Pred::Unvisited {
                    self.prev[v] = Pred::Shortcut { from: u };
                    self.bottleneck[v] = residual.min(self.bottleneck[u]);
                    if v == t {
                        found = true;
                        break 'search;
                    }
                    self.queue.push(v);
                }
            }
            for i in 0..g.num_incident(u) {
                let AdjEdge { node: v, id } = g.incident(u, i);
                if !self.edge_enabled[id] {
                    continue;
                }
                let residual = cap.capacity(id) - self.flow[id];
                if residual > W::ZERO && self.prev[v] == Pred::Unvisited {
                    self.prev[v] = Pred::Via {
                        from: u,
                        edge: id,
                        backward: false,
                    };
                    self.bottleneck[v] = residual.min(self.bottleneck[u]);
                    if v == t {
                        found = true;
                        break 'search;
                    }
                    self.queue.push(v);
                }
            }
            for i in 0..g.num_incoming(u) {
                let AdjEdge { node: v, id } = g.incoming(u, i);
                if !self.edge_enabled[id] {
                    continue;
                }
                let residual = self.flow[id];
                if residual > W::ZERO && self.prev[v] == Pred::Unvisited {
                    self.prev[v] = Pred::Via {
                        from: u,
                        edge: id,
                        backward: true,
                    };
                    self.bottleneck[v] = residual.min(self.bottleneck[u]);
                    if v == t {
                        found = true;
                        break 'search;
                    }
                    self.queue.push(v);
                }
            }
        }
        self.bottleneck[s] = old_m;
        if found { self.bottleneck[t] } else { W::ZERO }
    }

    /// Walks the predecessor chain from t back to s, applying `m` units:
    /// forward edges gain flow, backward edges lose it, the virtual arc is
    /// skipped over.
    fn augment<C: CapacityIf<W>>(&mut self, cap: &C, s: u32, t: u32, m: W) {
        let mut v = t;
        while v != s {
            match self.prev[v] {
                Pred::Via {
                    from,
                    edge,
                    backward,
                } => {
                    if backward {
                        self.flow[edge] -= m;
                    } else {
                        self.flow[edge] += m;
                    }
                    debug_assert!(
                        W::ZERO <= self.flow[edge] && self.flow[edge] <= cap.capacity(edge)
                    );
                    v = from;
                }
                Pred::Shortcut { from } => v = from,
                Pred::Unvisited | Pred::Source => unreachable!(),
            }
        }
    }

    /// Recounts the flow value after a repair lowered it: the sum over s's
    /// enabled outgoing edges. A maximum flow carries nothing back into s.
    fn recount<G: GraphIf>(&self, g: &G, s: u32) -> W {
        let mut f = W::ZERO;
        for i in 0..g.num_incident(s) {
            let AdjEdge { id, .. } = g.incident(s, i);
            if self.edge_enabled[id] {
                f += self.flow[id];
            } else {
                debug_assert!(self.flow[id] == W::ZERO);
            }
        }
        #[cfg(debug_assertions)]
        for i in 0..g.num_incoming(s) {
            let AdjEdge { id, .. } = g.incoming(s, i);
            debug_assert!(!self.edge_enabled[id] || self.flow[id] == W::ZERO);
        }
        f
    }

    #[cfg(debug_assertions)]
    fn check_flow<G: GraphIf, C: CapacityIf<W>>(&self, g: &G, cap: &C, s: u32, t: u32) {
        for e in 0..g.num_edge() {
            if self.edge_enabled[e] {
                debug_assert!(W::ZERO <= self.flow[e] && self.flow[e] <= cap.capacity(e));
            } else {
                debug_assert!(self.flow[e] == W::ZERO);
            }
        }
        for u in 0..g.num_node() {
            let mut inflow = W::ZERO;
            let mut outflow = W::ZERO;
            for i in 0..g.num_incoming(u) {
                let AdjEdge { id, .. } = g.incoming(u, i);
                if self.edge_enabled[id] {
                    inflow += self.flow[id];
                }
            }
            for i in 0..g.num_incident(u) {
                let AdjEdge { id, .. } = g.incident(u, i);
                if self.edge_enabled[id] {
                    outflow += self.flow[id];
                }
            }
            if u == s {
                debug_assert!(outflow == self.f);
            } else if u == t {
                debug_assert!(inflow == self.f);
            } else {
                debug_assert!(inflow == outflow);
            }
        }
        if self.cfg.double_check {
            let expect = super::EdmondsKarp::new().max_flow(g, cap, s, t);
            debug_assert!(self.f == expect);
        }
    }
}
