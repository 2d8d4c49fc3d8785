//! Criterion benchmarks for the clause matcher
//!
//! These benchmarks can be run with:
//! ```bash
//! cargo bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use quantor::formula::{ArithConj, Conjunction, NegatedConjunctions, PredConj, Quantifier};
use quantor::matcher::{ClauseMatcher, NullLogger};
use quantor::reduce::{DistinctConstantsAlias, SimplifyingReducer};
use quantor::symbols::SymbolStore;
use quantor::term::atom::Atom;
use quantor::term::linear::LinearCombination;
use quantor::term::{Term, TermOrder};

struct Setup {
    order: TermOrder,
    clauses: NegatedConjunctions,
    atoms: Vec<Atom>,
}

/// `num_consts` constants, the clause `EX x. p(x) /\ q(x, c0)`, and the
/// fact pool `{p(ci)} u {q(ci, c0)}`.
fn build(num_consts: usize) -> Setup {
    let mut store = SymbolStore::new();
    let constants: Vec<_> = (0..num_consts)
        .map(|i| store.constant(&format!("c{i}")))
        .collect();
    let order = TermOrder::with_constants(constants.iter().copied());
    let p = store.predicate("p", 1);
    let q = store.predicate("q", 2);

    let c0 = LinearCombination::from_term(Term::Constant(constants[0]));
    let v0 = LinearCombination::from_term(Term::Variable(0));
    let clause = Conjunction::new(
        vec![Quantifier::Ex],
        ArithConj::true_(),
        PredConj::new(
            vec![Atom::new(p, [v0.clone()]), Atom::new(q, [v0, c0.clone()])],
            vec![],
            &order,
        ),
        NegatedConjunctions::empty(),
    );

    let mut atoms = Vec::new();
    for c in &constants {
        let lc = LinearCombination::from_term(Term::Constant(*c));
        atoms.push(Atom::new(p, [lc.clone()]));
        atoms.push(Atom::new(q, [lc, c0.clone()]));
    }

    Setup {
        order,
        clauses: NegatedConjunctions::new(vec![clause]),
        atoms,
    }
}

/// Feed all facts in one batch.
fn bench_batch_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_update");

    for num_consts in [4, 16, 64].iter() {
        let setup = build(*num_consts);
        group.bench_with_input(
            BenchmarkId::from_parameter(num_consts),
            num_consts,
            |b, _| {
                let reducer = SimplifyingReducer::new(setup.order.clone());
                b.iter(|| {
                    let mut logger = NullLogger;
                    let matcher = ClauseMatcher::empty(false);
                    let (_, matcher) = matcher
                        .update_clauses(
                            setup.clauses.clone(),
                            &DistinctConstantsAlias,
                            &reducer,
                            &|_| false,
                            &mut logger,
                            &setup.order,
                        )
                        .unwrap();
                    let facts = PredConj::new(setup.atoms.clone(), vec![], &setup.order);
                    let (instances, _) = matcher
                        .update_facts(
                            facts,
                            &DistinctConstantsAlias,
                            &reducer,
                            &|_| false,
                            &mut logger,
                            &setup.order,
                        )
                        .unwrap();
                    black_box(instances)
                });
            },
        );
    }

    group.finish();
}

/// Feed facts one at a time, the proof-search usage pattern.
fn bench_incremental_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("incremental_update");

    for num_consts in [4, 16].iter() {
        let setup = build(*num_consts);
        group.bench_with_input(
            BenchmarkId::from_parameter(num_consts),
            num_consts,
            |b, _| {
                let reducer = SimplifyingReducer::new(setup.order.clone());
                b.iter(|| {
                    let mut logger = NullLogger;
                    let (_, mut matcher) = ClauseMatcher::empty(false)
                        .update_clauses(
                            setup.clauses.clone(),
                            &DistinctConstantsAlias,
                            &reducer,
                            &|_| false,
                            &mut logger,
                            &setup.order,
                        )
                        .unwrap();
                    let mut cumulative = Vec::new();
                    let mut total = 0usize;
                    for atom in &setup.atoms {
                        cumulative.push(atom.clone());
                        let facts =
                            PredConj::new(cumulative.clone(), vec![], &setup.order);
                        let (instances, next) = matcher
                            .update_facts(
                                facts,
                                &DistinctConstantsAlias,
                                &reducer,
                                &|_| false,
                                &mut logger,
                                &setup.order,
                            )
                            .unwrap();
                        total += instances.len();
                        matcher = next;
                    }
                    black_box(total)
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_batch_update, bench_incremental_update);
criterion_main!(benches);
