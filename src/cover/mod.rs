mod cnf;

pub use cnf::{Cnf, SolverIf, Watcher};

use crate::config::CoverConfig;
use log::debug;
use logicrs::{Lit, LitVec, Var, VarMap, VarSet};

/// Extracts a locally minimal cover from a satisfied solver state: a set of
/// true literals over the included variables such that every clause is
/// satisfied either by a cover literal or by a true literal of an excluded
/// variable. Adapted from the 2QBF certificate minimization of Ranjan, Tang
/// and Malik (SAT 2004).
///
/// Preconditions of `get_cover`: the current assignment satisfies every
/// clause, and every included variable is assigned. Violations are
/// programmer errors and fail loudly in debug builds.
pub struct CoverEngine {
    cfg: CoverConfig,
    excluded: VarMap<bool>,
    subset: Vec<Var>,
    in_cover: VarSet,
    score: VarMap<u32>,
    clauses_of: VarMap<Vec<u32>>,
    candidates: LitVec,
    cover_count: Vec<u32>,
    eligible: LitVec,
}

impl CoverEngine {
    pub fn new(cfg: CoverConfig) -> Self {
        Self {
            cfg,
            excluded: Default::default(),
            subset: Vec::new(),
            in_cover: Default::default(),
            score: Default::default(),
            clauses_of: Default::default(),
            candidates: LitVec::new(),
            cover_count: Vec::new(),
            eligible: LitVec::new(),
        }
    }

    /// Whether to keep `var` out of the cover (default: included). Must be
    /// decided before the first `get_cover` call.
    pub fn set_excluded(&mut self, var: Var, excluded: bool) {
        self.excluded.reserve(var);
        self.excluded[var] = excluded;
    }

    /// Fills `cover` with a locally minimal set of true literals covering
    /// every clause. Literals forced at decision level 0 are always part of
    /// the cover and are treated as trivially essential.
    pub fn get_cover(&mut self, solver: &impl SolverIf, cover: &mut LitVec) {
        let max = Var::new(solver.num_var());
        self.excluded.reserve(max);
        self.in_cover.reserve(max);
        self.score.reserve(max);
        self.clauses_of.reserve(max);
        if self.subset.is_empty() {
            for i in 0..solver.num_var() {
                let v = Var::new(i);
                if !self.excluded[v] {
                    self.subset.push(v);
                }
            }
        }
        cover.clear();
        while let Some(v) = self.in_cover.set.pop() {
            self.in_cover.has[v] = false;
        }

        // Level-0 assignments of included variables are part of every cover.
        let trail = solver.trail();
        let lim = if solver.decision_level() == 0 {
            trail.len()
        } else {
            solver.trail_lim0() as usize
        };
        for &l in &trail[..lim] {
            if !self.excluded[l.var()] {
                debug_assert!(!self.in_cover.has(l.var()));
                debug_assert!(!solver.value(l).is_false());
                self.in_cover.insert(l.var());
                cover.push(l);
            }
        }

        if self.cfg.fast_partial {
            self.fast_cover(solver, cover);
        } else {
            self.exact_cover(solver, cover);
        }
        debug!(
            "cover: {} literals cover {} clauses",
            cover.len(),
            solver.num_clause()
        );
    }

    /// Cheap partial mode: for each included variable not yet covering, scan
    /// the clauses watching its true literal. A clause already satisfied by
    /// an excluded or covering literal is skipped; otherwise the variable's
    /// true literal is picked, which covers every remaining clause in its
    /// watch list at once. Relies on the solver's watch invariant (a
    /// satisfied clause has a true literal among its watchers), so clauses
    /// may stay untouched if watches are stale.
    fn fast_cover(&mut self, solver: &impl SolverIf, cover: &mut LitVec) {
        for j in 0..self.subset.len() {
            let v = self.subset[j];
            debug_assert!(!self.excluded[v]);
            if self.in_cover.has(v) {
                continue;
            }
            let mut p = v.lit();
            if solver.value(p).is_false() {
                p = !p;
            }
            debug_assert!(solver.value(p).is_true());
            for w in solver.watches(!p) {
                let blocker = w.blocker;
                if solver.value(blocker).is_true()
                    && (self.excluded[blocker.var()] || self.in_cover.has(blocker.var()))
                {
                    continue;
                }
                let cls = solver.clause(w.clause);
                debug_assert!(cls.len() > 1);
                let other = if cls[0] == p { cls[1] } else { cls[0] };
                if solver.value(other).is_true()
                    && (self.excluded[other.var()] || self.in_cover.has(other.var()))
                {
                    continue;
                }
                // Either p is the sole true watcher, or both are true and
                // eligible and p is picked arbitrarily. Once p covers, so
                // does every other clause watching it.
                debug_assert!(!self.in_cover.has(v));
                self.in_cover.insert(v);
                cover.push(p);
                break;
            }
        }
    }

    /// Exact mode: a forced pass picking the sole eligible true literal of
    /// each clause, a greedy pass covering the rest by descending score, and
    /// an essentiality pass dropping literals all of whose clauses are
    /// covered at least twice.
    fn exact_cover(&mut self, solver: &impl SolverIf, cover: &mut LitVec) {
        let num_clause = solver.num_clause();
        #[cfg(debug_assertions)]
        for cls in 0..num_clause as u32 {
            debug_assert!(
                solver.clause(cls).iter().any(|&l| solver.value(l).is_true()),
                "input assignment does not satisfy the formula"
            );
        }
        self.candidates.clear();
        self.cover_count.clear();
        self.cover_count.resize(num_clause, 0);
        for i in 0..solver.num_var() {
            let v = Var::new(i);
            self.score[v] = 0;
            self.clauses_of[v].clear();
        }

        // Forced pass: a clause whose only non-false eligible literal is
        // unique makes that literal mandatory. A non-false excluded literal
        // means the clause may be satisfied for free, so nothing is forced.
        for cls in 0..num_clause as u32 {
            let mut eligible_true = 0u32;
            let mut forced = None;
            for &l in solver.clause(cls) {
                if !solver.value(l).is_false() {
                    if self.excluded[l.var()] {
                        eligible_true = 0;
                        break;
                    }
                    forced = Some(l);
                    eligible_true += 1;
                    if eligible_true > 1 {
                        break;
                    }
                }
            }
            if eligible_true == 1 {
                let l = forced.unwrap();
                debug_assert!(!self.excluded[l.var()]);
                self.cover_count[cls as usize] += 1;
                if !self.in_cover.has(l.var()) {
                    debug_assert!(!solver.value(l).is_false());
                    self.in_cover.insert(l.var());
                    cover.push(l);
                }
            }
        }

        // Scoring pass: clauses not already covered contribute one point per
        // eligible true literal; each candidate remembers the clauses it can
        // cover.
        for cls in 0..num_clause as u32 {
            let mut sat = false;
            self.eligible.clear();
            for &l in solver.clause(cls) {
                if solver.value(l).is_true() {
                    if self.excluded[l.var()] || self.in_cover.has(l.var()) {
                        self.cover_count[cls as usize] += 1;
                        sat = true;
                        break;
                    }
                    self.eligible.push(l);
                }
            }
            if sat {
                continue;
            }
            debug_assert!(self.cover_count[cls as usize] == 0);
            for &l in self.eligible.iter() {
                let v = l.var();
                debug_assert!(!self.excluded[v] && !self.in_cover.has(v));
                if self.score[v] == 0 {
                    self.candidates.push(l);
                }
                self.score[v] += 1;
                self.clauses_of[v].push(cls);
            }
        }

        // Greedy pass: highest score first; ties keep insertion order. A
        // candidate is taken only if it covers at least one new clause.
        self.candidates
            .sort_by(|a, b| self.score[b.var()].cmp(&self.score[a.var()]));
        let mut next = 0;
        let mut cls = 0;
        loop {
            while cls < num_clause && self.cover_count[cls] > 0 {
                cls += 1;
            }
            if cls == num_clause {
                break;
            }
            debug_assert!(next < self.candidates.len());
            let l = self.candidates[next];
            next += 1;
            let v = l.var();
            if self.clauses_of[v]
                .iter()
                .any(|&c| self.cover_count[c as usize] == 0)
            {
                debug_assert!(solver.value(l).is_true());
                self.in_cover.insert(v);
                cover.push(l);
                for &c in self.clauses_of[v].iter() {
                    self.cover_count[c as usize] += 1;
                }
            }
        }

        // Essentiality pass: walk the cover in selection order and drop any
        // literal whose clauses are all covered twice. Forced and level-0
        // literals have empty clause lists and stay.
        let mut start = cover.len();
        for (i, l) in cover.iter().enumerate() {
            if !self.clauses_of[l.var()].is_empty() {
                start = i;
                break;
            }
        }
        let mut kept = start;
        for i in start..cover.len() {
            let l = cover[i];
            let covered = &self.clauses_of[l.var()];
            debug_assert!(!covered.is_empty());
            let essential = covered.iter().any(|&c| {
                debug_assert!(self.cover_count[c as usize] >= 1);
                self.cover_count[c as usize] == 1
            });
            if essential {
                cover[kept] = l;
                kept += 1;
            } else {
                for &c in covered.iter() {
                    debug_assert!(self.cover_count[c as usize] >= 2);
                    self.cover_count[c as usize] -= 1;
                }
            }
        }
        cover.truncate(kept);
    }
}
