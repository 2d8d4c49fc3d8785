//! Property-based tests for the matching engine.
//!
//! This module tests:
//! - Canonicalisation idempotence of equation conjunctions
//! - Deduplication of instances across incremental fact updates
//! - Order-independence of the generated-instance set

use num_bigint::BigInt;
use proptest::prelude::*;
use quantor::formula::{
    ArithConj, Conjunction, EquationConj, NegatedConjunctions, PredConj, Quantifier,
};
use quantor::matcher::{ClauseMatcher, NullLogger};
use quantor::reduce::DistinctConstantsAlias;
use quantor::symbols::SymbolStore;
use quantor::term::atom::Atom;
use quantor::term::linear::LinearCombination;
use quantor::term::{Term, TermOrder};
use rustc_hash::FxHashSet;

struct Universe {
    order: TermOrder,
    atoms: Vec<Atom>,
    clauses: NegatedConjunctions,
}

/// p/1 and q/2 over constants {a, b}, with the clauses
/// `EX x. p(x) /\ q(x, a)` and `EX x y. p(x) /\ q(x, y)`.
fn universe() -> Universe {
    let mut store = SymbolStore::new();
    let a = store.constant("a");
    let b = store.constant("b");
    let order = TermOrder::with_constants([a, b]);
    let p = store.predicate("p", 1);
    let q = store.predicate("q", 2);

    let ca = LinearCombination::from_term(Term::Constant(a));
    let cb = LinearCombination::from_term(Term::Constant(b));
    let v0 = LinearCombination::from_term(Term::Variable(0));
    let v1 = LinearCombination::from_term(Term::Variable(1));

    let atoms = vec![
        Atom::new(p, [ca.clone()]),
        Atom::new(p, [cb.clone()]),
        Atom::new(q, [ca.clone(), ca.clone()]),
        Atom::new(q, [ca.clone(), cb.clone()]),
        Atom::new(q, [cb.clone(), ca.clone()]),
        Atom::new(q, [cb.clone(), cb]),
    ];

    let c1 = Conjunction::new(
        vec![Quantifier::Ex],
        ArithConj::true_(),
        PredConj::new(
            vec![Atom::new(p, [v0.clone()]), Atom::new(q, [v0.clone(), ca])],
            vec![],
            &order,
        ),
        NegatedConjunctions::empty(),
    );
    let c2 = Conjunction::new(
        vec![Quantifier::Ex, Quantifier::Ex],
        ArithConj::true_(),
        PredConj::new(
            vec![Atom::new(p, [v0.clone()]), Atom::new(q, [v0, v1])],
            vec![],
            &order,
        ),
        NegatedConjunctions::empty(),
    );

    Universe {
        order,
        atoms,
        clauses: NegatedConjunctions::new(vec![c1, c2]),
    }
}

/// The identity reducer: a valid projection that keeps instances apart, so
/// deduplication itself is what gets exercised.
fn identity(conj: &Conjunction) -> Conjunction {
    conj.clone()
}

fn load(universe: &Universe) -> ClauseMatcher {
    let mut logger = NullLogger;
    let (instances, matcher) = ClauseMatcher::empty(false)
        .update_clauses(
            universe.clauses.clone(),
            &DistinctConstantsAlias,
            &identity,
            &|_| false,
            &mut logger,
            &universe.order,
        )
        .unwrap();
    assert!(instances.is_empty());
    matcher
}

/// Feed the atoms one at a time, facts growing cumulatively, and return
/// every produced instance together with the final matcher.
fn feed_one_by_one(
    universe: &Universe,
    sequence: &[usize],
) -> (Vec<Conjunction>, ClauseMatcher) {
    let mut matcher = load(universe);
    let mut logger = NullLogger;
    let mut cumulative: Vec<Atom> = Vec::new();
    let mut produced = Vec::new();
    for &idx in sequence {
        cumulative.push(universe.atoms[idx].clone());
        let facts = PredConj::new(cumulative.clone(), vec![], &universe.order);
        let (instances, next) = matcher
            .update_facts(
                facts,
                &DistinctConstantsAlias,
                &identity,
                &|_| false,
                &mut logger,
                &universe.order,
            )
            .unwrap();
        produced.extend(instances);
        matcher = next;
    }
    (produced, matcher)
}

fn term_strategy() -> impl Strategy<Value = usize> {
    // index into [One, a, b, v0, v1]
    0usize..5
}

fn lc_from(parts: &[(i64, usize)], order: &TermOrder, store: &mut SymbolStore) -> LinearCombination {
    let a = store.constant("a");
    let b = store.constant("b");
    let terms = [
        Term::One,
        Term::Constant(a),
        Term::Constant(b),
        Term::Variable(0),
        Term::Variable(1),
    ];
    LinearCombination::sum(
        parts
            .iter()
            .map(|&(coeff, idx)| (BigInt::from(coeff), terms[idx])),
        order,
    )
}

proptest! {
    /// Normalising an already-normalised equation conjunction is a no-op.
    #[test]
    fn equation_conj_canonicalisation_is_idempotent(
        eqs in prop::collection::vec(
            prop::collection::vec((-5i64..5, term_strategy()), 0..4),
            0..4,
        )
    ) {
        let mut store = SymbolStore::new();
        let a = store.constant("a");
        let b = store.constant("b");
        let order = TermOrder::with_constants([a, b]);
        let lcs: Vec<LinearCombination> = eqs
            .iter()
            .map(|parts| lc_from(parts, &order, &mut store))
            .collect();
        let once = EquationConj::new(lcs, &order);
        let twice = EquationConj::new(once.eqs().to_vec(), &order);
        prop_assert_eq!(once, twice);
    }

    /// No instance is ever returned twice over a growing fact sequence.
    #[test]
    fn no_instance_is_produced_twice(
        sequence in Just((0..6usize).collect::<Vec<_>>()).prop_shuffle()
    ) {
        let universe = universe();
        let (produced, _) = feed_one_by_one(&universe, &sequence);
        let unique: FxHashSet<&Conjunction> = produced.iter().collect();
        prop_assert_eq!(unique.len(), produced.len());
    }

    /// Interleaving order does not change the final generated-instance set.
    #[test]
    fn generated_instances_are_order_independent(
        left in Just((0..6usize).collect::<Vec<_>>()).prop_shuffle(),
        right in Just((0..6usize).collect::<Vec<_>>()).prop_shuffle(),
    ) {
        let universe = universe();
        let (_, matcher_left) = feed_one_by_one(&universe, &left);
        let (_, matcher_right) = feed_one_by_one(&universe, &right);
        prop_assert_eq!(
            matcher_left.generated_instances(),
            matcher_right.generated_instances()
        );
    }

    /// Feeding the current facts again is a strict no-op.
    #[test]
    fn identical_facts_are_a_noop(
        subset in proptest::sample::subsequence(vec![0usize, 1, 2, 3, 4, 5], 0..=6)
    ) {
        let universe = universe();
        let matcher = load(&universe);
        let atoms: Vec<Atom> = subset.iter().map(|&i| universe.atoms[i].clone()).collect();
        let facts = PredConj::new(atoms, vec![], &universe.order);
        let mut logger = NullLogger;
        let (_, matcher) = matcher
            .update_facts(
                facts.clone(),
                &DistinctConstantsAlias,
                &identity,
                &|_| false,
                &mut logger,
                &universe.order,
            )
            .unwrap();
        let (instances, same) = matcher
            .update_facts(
                facts,
                &DistinctConstantsAlias,
                &identity,
                &|_| false,
                &mut logger,
                &universe.order,
            )
            .unwrap();
        prop_assert!(instances.is_empty());
        prop_assert_eq!(same, matcher);
    }
}
