use super::{AdjEdge, Edge, EdgeEvent, GraphIf};

/// A directed multigraph whose edges can be enabled and disabled between
/// queries. Mutations are journalled: enabling or disabling an edge appends
/// an [`EdgeEvent`] to `history` and bumps the monotone counters, so engines
/// observing the graph through [`GraphIf`] can replay exactly the events they
/// missed. Structural growth (new nodes or edges) sets `changed`, which
/// forces observers to resynchronize; `clear_history` acknowledges it.
#[derive(Clone, Debug, Default)]
pub struct DynamicGraph {
    edges: Vec<Edge>,
    enabled: Vec<bool>,
    adj_out: Vec<Vec<AdjEdge>>,
    adj_in: Vec<Vec<AdjEdge>>,
    history: Vec<EdgeEvent>,
    modifications: u64,
    additions: u64,
    deletions: u64,
    history_clears: u64,
    changed: bool,
}

impl DynamicGraph {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn add_node(&mut self) -> u32 {
        let n = self.adj_out.len() as u32;
        self.adj_out.push(Vec::new());
        self.adj_in.push(Vec::new());
        self.changed = true;
        n
    }

    pub fn add_nodes(&mut self, n: u32) {
        for _ in 0..n {
            self.add_node();
        }
    }

    /// Adds an enabled edge and returns its id.
    pub fn add_edge(&mut self, from: u32, to: u32) -> u32 {
        assert!(from < self.num_node() && to < self.num_node());
        let id = self.edges.len() as u32;
        self.edges.push(Edge { from, to, id });
        self.enabled.push(true);
        self.adj_out[from as usize].push(AdjEdge { node: to, id });
        self.adj_in[to as usize].push(AdjEdge { node: from, id });
        self.changed = true;
        self.modifications += 1;
        self.additions += 1;
        self.history.push(EdgeEvent { id, addition: true });
        id
    }

    pub fn enable_edge(&mut self, edge: u32) {
        assert!(self.is_edge(edge));
        if !self.enabled[edge as usize] {
            self.enabled[edge as usize] = true;
            self.modifications += 1;
            self.additions += 1;
            self.history.push(EdgeEvent {
                id: edge,
                addition: true,
            });
        }
    }

    pub fn disable_edge(&mut self, edge: u32) {
        assert!(self.is_edge(edge));
        if self.enabled[edge as usize] {
            self.enabled[edge as usize] = false;
            self.modifications += 1;
            self.deletions += 1;
            self.history.push(EdgeEvent {
                id: edge,
                addition: false,
            });
        }
    }

    /// Drops the mutation log and acknowledges structural changes. Observers
    /// fully resynchronize on their next query and replay incrementally from
    /// there on.
    pub fn clear_history(&mut self) {
        self.history.clear();
        self.history_clears += 1;
        self.changed = false;
    }
}

impl GraphIf for DynamicGraph {
    #[inline]
    fn num_node(&self) -> u32 {
        self.adj_out.len() as u32
    }

    #[inline]
    fn num_edge(&self) -> u32 {
        self.edges.len() as u32
    }

    #[inline]
    fn is_edge(&self, edge: u32) -> bool {
        (edge as usize) < self.edges.len()
    }

    #[inline]
    fn edge_enabled(&self, edge: u32) -> bool {
        self.enabled[edge as usize]
    }

    #[inline]
    fn edge(&self, edge: u32) -> Edge {
        self.edges[edge as usize]
    }

    #[inline]
    fn num_incident(&self, node: u32) -> u32 {
        self.adj_out[node as usize].len() as u32
    }

    #[inline]
    fn incident(&self, node: u32, i: u32) -> AdjEdge {
        self.adj_out[node as usize][i as usize]
    }

    #[inline]
    fn num_incoming(&self, node: u32) -> u32 {
        self.adj_in[node as usize].len() as u32
    }

    #[inline]
    fn incoming(&self, node: u32, i: u32) -> AdjEdge {
        self.adj_in[node as usize][i as usize]
    }

    #[inline]
    fn history(&self) -> &[EdgeEvent] {
        &self.history
    }

    #[inline]
    fn modifications(&self) -> u64 {
        self.modifications
    }

    #[inline]
    fn additions(&self) -> u64 {
        self.additions
    }

    #[inline]
    fn deletions(&self) -> u64 {
        self.deletions
    }

    #[inline]
    fn history_clears(&self) -> u64 {
        self.history_clears
    }

    #[inline]
    fn changed(&self) -> bool {
        self.changed
    }
}
