use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng, rngs::StdRng};
use satgraph::config::CoverConfig;
use satgraph::cover::{Cnf, CoverEngine, SolverIf};
use satgraph::logicrs::{Lit, LitVec, Var};

/// Every clause is satisfied by a true literal of an excluded variable or by
/// a cover literal.
fn covers(cnf: &Cnf, excluded: &[bool], cover: &[Lit]) -> bool {
    (0..cnf.num_clause() as u32).all(|c| {
        cnf.clause(c).iter().any(|&l| {
            let v: usize = l.var().into();
            (cnf.value(l).is_true() && excluded[v]) || cover.contains(&l)
        })
    })
}

fn without(cover: &[Lit], i: usize) -> Vec<Lit> {
    cover
        .iter()
        .enumerate()
        .filter(|&(j, _)| j != i)
        .map(|(_, &l)| l)
        .collect()
}

#[test]
fn forced_literals_cover() {
    let mut cnf = Cnf::new();
    let a = cnf.new_var();
    let b = cnf.new_var();
    let c = cnf.new_var();
    cnf.add_clause(&[a.lit(), b.lit()]);
    cnf.add_clause(&[!a.lit(), c.lit()]);
    cnf.add_clause(&[b.lit(), c.lit()]);
    cnf.new_level();
    cnf.assign(a.lit());
    cnf.assign(!b.lit());
    cnf.assign(c.lit());

    let mut engine = CoverEngine::new(CoverConfig::default());
    let mut cover = LitVec::new();
    engine.get_cover(&cnf, &mut cover);
    assert_eq!(&cover[..], &[a.lit(), c.lit()][..]);

    let none = vec![false; 3];
    assert!(covers(&cnf, &none, &cover));
    // dropping a leaves (a|b) uncovered, dropping c leaves (!a|c) uncovered
    assert!(!covers(&cnf, &none, &[c.lit()]));
    assert!(!covers(&cnf, &none, &[a.lit()]));
}

#[test]
fn excluded_variables_cover_for_free() {
    // level-0 assignment: included true literals of the prefix join the cover
    let mut cnf = Cnf::new();
    let a = cnf.new_var();
    let b = cnf.new_var();
    cnf.add_clause(&[a.lit(), b.lit()]);
    cnf.assign(a.lit());
    cnf.assign(b.lit());

    let mut engine = CoverEngine::new(CoverConfig::default());
    engine.set_excluded(b, true);
    let mut cover = LitVec::new();
    engine.get_cover(&cnf, &mut cover);
    assert_eq!(&cover[..], &[a.lit()][..]);
}

#[test]
fn excluded_true_literal_suffices() {
    let mut cnf = Cnf::new();
    let a = cnf.new_var();
    let b = cnf.new_var();
    cnf.add_clause(&[a.lit(), b.lit()]);
    cnf.new_level();
    cnf.assign(a.lit());
    cnf.assign(b.lit());

    let mut engine = CoverEngine::new(CoverConfig::default());
    engine.set_excluded(b, true);
    let mut cover = LitVec::new();
    engine.get_cover(&cnf, &mut cover);
    assert!(cover.is_empty());
    assert!(covers(&cnf, &[false, true], &cover));
}

#[test]
fn inessential_literals_are_pruned() {
    let mut cnf = Cnf::new();
    let a = cnf.new_var();
    let b = cnf.new_var();
    let c = cnf.new_var();
    let d = cnf.new_var();
    cnf.add_clause(&[a.lit(), b.lit()]);
    cnf.add_clause(&[a.lit(), c.lit()]);
    cnf.add_clause(&[b.lit(), d.lit()]);
    cnf.add_clause(&[c.lit(), d.lit()]);
    cnf.new_level();
    for v in [a, b, c, d] {
        cnf.assign(v.lit());
    }

    let mut engine = CoverEngine::new(CoverConfig::default());
    let mut cover = LitVec::new();
    engine.get_cover(&cnf, &mut cover);
    // greedy picks a first (it covers the first two clauses), then b and c
    // cover the rest; the essentiality pass finds a doubly covered
    assert_eq!(&cover[..], &[b.lit(), c.lit()][..]);

    // idempotent on an unchanged solver
    let mut again = LitVec::new();
    engine.get_cover(&cnf, &mut again);
    assert_eq!(&cover[..], &again[..]);
}

#[test]
fn fast_partial_covers() {
    let mut cnf = Cnf::new();
    let a = cnf.new_var();
    let b = cnf.new_var();
    let c = cnf.new_var();
    cnf.add_clause(&[a.lit(), !b.lit()]);
    cnf.add_clause(&[b.lit(), c.lit()]);
    cnf.add_clause(&[c.lit(), a.lit()]);
    cnf.new_level();
    for v in [a, b, c] {
        cnf.assign(v.lit());
    }

    let mut engine = CoverEngine::new(CoverConfig { fast_partial: true });
    let mut cover = LitVec::new();
    engine.get_cover(&cnf, &mut cover);
    assert_eq!(&cover[..], &[a.lit(), b.lit()][..]);
    assert!(covers(&cnf, &[false; 3], &cover));
}

fn random_cnf(rng: &mut StdRng, watched_true: bool) -> (Cnf, Vec<bool>, Vec<bool>) {
    let n = rng.random_range(4..10usize);
    let mut cnf = Cnf::new();
    let vars: Vec<Var> = (0..n).map(|_| cnf.new_var()).collect();
    let phase: Vec<bool> = (0..n).map(|_| rng.random()).collect();
    let excluded: Vec<bool> = (0..n).map(|_| rng.random_range(0..5u32) == 0).collect();
    cnf.new_level();
    for i in 0..n {
        cnf.assign(vars[i].lit().not_if(!phase[i]));
    }
    let mut order: Vec<usize> = (0..n).collect();
    let m = rng.random_range(3..20usize);
    for _ in 0..m {
        let min_size = if watched_true { 2 } else { 1 };
        let size = rng.random_range(min_size..=4usize).min(n);
        order.shuffle(rng);
        let mut lits: Vec<Lit> = order[..size]
            .iter()
            .map(|&j| vars[j].lit().not_if(rng.random()))
            .collect();
        if !lits.iter().any(|&l| cnf.value(l).is_true()) {
            let j = order[0];
            lits[0] = vars[j].lit().not_if(!phase[j]);
        } else if watched_true {
            // the fast scan only sees clauses through a true watched literal
            let k = lits.iter().position(|&l| cnf.value(l).is_true()).unwrap();
            lits.swap(0, k);
        }
        cnf.add_clause(&lits);
    }
    (cnf, phase, excluded)
}

#[test]
fn random_covers_are_locally_minimal() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..100 {
        let (cnf, _, excluded) = random_cnf(&mut rng, false);
        let mut engine = CoverEngine::new(CoverConfig::default());
        for (i, &e) in excluded.iter().enumerate() {
            engine.set_excluded(Var::new(i), e);
        }
        let mut cover = LitVec::new();
        engine.get_cover(&cnf, &mut cover);

        for &l in cover.iter() {
            let v: usize = l.var().into();
            assert!(cnf.value(l).is_true());
            assert!(!excluded[v]);
        }
        assert!(covers(&cnf, &excluded, &cover));
        for i in 0..cover.len() {
            assert!(!covers(&cnf, &excluded, &without(&cover, i)));
        }

        // deterministic across engines, idempotent across calls
        let mut fresh = CoverEngine::new(CoverConfig::default());
        for (i, &e) in excluded.iter().enumerate() {
            fresh.set_excluded(Var::new(i), e);
        }
        let mut other = LitVec::new();
        fresh.get_cover(&cnf, &mut other);
        assert_eq!(&cover[..], &other[..]);
        engine.get_cover(&cnf, &mut other);
        assert_eq!(&cover[..], &other[..]);
    }
}

#[test]
fn random_fast_covers_are_valid() {
    let mut rng = StdRng::seed_from_u64(17);
    for _ in 0..100 {
        let (cnf, _, excluded) = random_cnf(&mut rng, true);
        let mut engine = CoverEngine::new(CoverConfig { fast_partial: true });
        for (i, &e) in excluded.iter().enumerate() {
            engine.set_excluded(Var::new(i), e);
        }
        let mut cover = LitVec::new();
        engine.get_cover(&cnf, &mut cover);
        for &l in cover.iter() {
            let v: usize = l.var().into();
            assert!(cnf.value(l).is_true());
            assert!(!excluded[v]);
        }
        assert!(covers(&cnf, &excluded, &cover));
    }
}
