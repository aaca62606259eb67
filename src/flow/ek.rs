use super::{AdjEdge, CapacityIf, GraphIf, Pred, Weight};
use giputils::gvec::Gvec;

/// From-scratch Edmonds-Karp over the enabled subgraph. No caching, no
/// history: every call recomputes. Serves as the oracle the incremental
/// engine is checked against.
pub struct EdmondsKarp<W: Weight> {
    f: W,
    flow: Gvec<W>,
    prev: Gvec<Pred>,
    bottleneck: Gvec<W>,
    queue: Vec<u32>,
}

impl<W: Weight> EdmondsKarp<W> {
    pub fn new() -> Self {
        Self {
            f: W::ZERO,
            flow: Default::default(),
            prev: Default::default(),
            bottleneck: Default::default(),
            queue: Vec::new(),
        }
    }

    pub fn max_flow<G: GraphIf, C: CapacityIf<W>>(
        &mut self,
        g: &G,
        cap: &C,
        s: u32,
        t: u32,
    ) -> W {
        assert!(s < g.num_node() && t < g.num_node() && s != t);
        self.f = W::ZERO;
        self.flow.clear();
        self.flow.resize(g.num_edge() as usize, W::ZERO);
        self.prev.clear();
        self.prev.resize(g.num_node() as usize, Pred::Unvisited);
        self.bottleneck.clear();
        self.bottleneck.resize(g.num_node() as usize, W::ZERO);
        loop {
            let m = self.bfs(g, cap, s, t);
            if m == W::ZERO {
                break;
            }
            self.f += m;
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
                    _ => unreachable!(),
                }
            }
        }
        self.f
    }

    /// Flow assigned to `edge` by the last `max_flow` call.
    #[inline]
    pub fn edge_flow(&self, edge: u32) -> W {
        self.flow[edge]
    }

    fn bfs<G: GraphIf, C: CapacityIf<W>>(&mut self, g: &G, cap: &C, s: u32, t: u32) -> W {
        for u in 0..g.num_node() {
            self.prev[u] = Pred::Unvisited;
        }
        self.prev[s] = Pred::Source;
        self.bottleneck[s] = W::INF;
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
                let residual = cap.capacity(id) - self.flow[id];
                if residual > W::ZERO && self.prev[v] == Pred::Unvisited {
                    self.prev[v] = Pred::Via {
                        from: u,
                        edge: id,
                        backward: false,
                    };
                    self.bottleneck[v] = residual.min(self.bottleneck[u]);
                    if v == t {
                        return self.bottleneck[t];
                    }
                    self.queue.push(v);
                }
            }
            for i in 0..g.num_incoming(u) {
                let AdjEdge { node: v, id } = g.incoming(u, i);
                if !g.edge_enabled(id) {
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
                        return self.bottleneck[t];
                    }
                    self.queue.push(v);
                }
            }
        }
        W::ZERO
    }
}

impl<W: Weight> Default for EdmondsKarp<W> {
    fn default() -> Self {
        Self::new()
    }
}
