use logicrs::{Lbool, Lit, LitMap, LitVec, Var, VarAssign};

/// A clause watching entry: the watched clause and a blocking literal whose
/// satisfaction lets scans skip the clause without touching it.
#[derive(Clone, Copy, Debug, Default)]
pub struct Watcher {
    pub clause: u32,
    pub blocker: Lit,
}

/// Read-only view of a satisfied SAT solver state, as much of it as cover
/// extraction needs: the assignment, the clause database, the trail with its
/// level-0 prefix, and MiniSat-style watch lists. Watch lists are keyed by
/// the falsified literal: `watches(l)` holds the clauses in which `!l` is
/// one of the two watched literals.
pub trait SolverIf {
    fn num_var(&self) -> usize;

    fn num_clause(&self) -> usize;

    fn clause(&self, cls: u32) -> &[Lit];

    fn value(&self, lit: Lit) -> Lbool;

    /// Assigned literals in assignment order.
    fn trail(&self) -> &[Lit];

    /// Length of the trail prefix assigned at decision level 0.
    fn trail_lim0(&self) -> u32;

    fn decision_level(&self) -> u32;

    fn watches(&self, lit: Lit) -> &[Watcher];
}

/// A minimal satisfying-assignment container implementing [`SolverIf`]: a
/// clause database with static two-watched-literal lists and a trail. It
/// performs no propagation; clauses of length one must be assigned at level
/// 0 for the fast cover scan to see them.
#[derive(Default)]
pub struct Cnf {
    num_var: usize,
    clauses: Vec<LitVec>,
    value: VarAssign,
    trail: Vec<Lit>,
    trail_lim: Vec<u32>,
    watches: LitMap<Vec<Watcher>>,
}

impl Cnf {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn new_var(&mut self) -> Var {
        let var = Var::new(self.num_var);
        self.num_var += 1;
        self.value.reserve(var);
        self.watches.reserve(var);
        var
    }

    pub fn add_clause(&mut self, cls: &[Lit]) -> u32 {
        debug_assert!(!cls.is_empty());
        let id = self.clauses.len() as u32;
        let cls = LitVec::from(cls);
        if cls.len() > 1 {
            self.watches[!cls[0]].push(Watcher {
                clause: id,
                blocker: cls[1],
            });
            self.watches[!cls[1]].push(Watcher {
                clause: id,
                blocker: cls[0],
            });
        }
        self.clauses.push(cls);
        id
    }

    /// Opens a new decision level; later assignments are no longer part of
    /// the level-0 prefix.
    pub fn new_level(&mut self) {
        self.trail_lim.push(self.trail.len() as u32);
    }

    /// Makes `lit` true. The variable must be unassigned.
    pub fn assign(&mut self, lit: Lit) {
        debug_assert!(self.value.v(lit).is_none());
        self.value.set(lit);
        self.trail.push(lit);
    }
}

impl SolverIf for Cnf {
    #[inline]
    fn num_var(&self) -> usize {
        self.num_var
    }

    #[inline]
    fn num_clause(&self) -> usize {
        self.clauses.len()
    }

    #[inline]
    fn clause(&self, cls: u32) -> &[Lit] {
        &self.clauses[cls as usize]
    }

    #[inline]
    fn value(&self, lit: Lit) -> Lbool {
        self.value.v(lit)
    }

    #[inline]
    fn trail(&self) -> &[Lit] {
        &self.trail
    }

    #[inline]
    fn trail_lim0(&self) -> u32 {
        if self.trail_lim.is_empty() {
            self.trail.len() as u32
        } else {
            self.trail_lim[0]
        }
    }

    #[inline]
    fn decision_level(&self) -> u32 {
        self.trail_lim.len() as u32
    }

    #[inline]
    fn watches(&self, lit: Lit) -> &[Watcher] {
        &self.watches[lit]
    }
}
