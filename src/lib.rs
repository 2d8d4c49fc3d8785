//! Incremental quantifier instantiation over Presburger arithmetic with
//! uninterpreted predicates.
//!
//! This crate implements the clause-matching core of a theorem prover:
//! given a growing set of ground predicate facts and a set of
//! existentially-prefixed clauses, it derives every ground instance whose
//! matched literals unify with the current facts, without re-deriving an
//! instance it has produced before and supporting retraction as the proof
//! search backtracks.
//!
//! # Architecture
//!
//! - [`term`]: terms, the context [`TermOrder`](term::TermOrder), and
//!   canonical linear combinations
//! - [`formula`]: equation, predicate and quantified conjunctions
//! - [`matcher`]: clause compilation into instruction programs, the
//!   backtracking executor, and the persistent [`ClauseMatcher`] state
//! - [`reduce`]: the injected reducer/alias contracts plus reference
//!   implementations
//!
//! # Example
//!
//! ```
//! use quantor::formula::{ArithConj, Conjunction, NegatedConjunctions, PredConj, Quantifier};
//! use quantor::matcher::{ClauseMatcher, NullLogger};
//! use quantor::reduce::{DistinctConstantsAlias, SimplifyingReducer};
//! use quantor::symbols::SymbolStore;
//! use quantor::term::atom::Atom;
//! use quantor::term::linear::LinearCombination;
//! use quantor::term::{Term, TermOrder};
//!
//! let mut store = SymbolStore::new();
//! let p = store.predicate("p", 1);
//! let q = store.predicate("q", 2);
//! let a = store.constant("a");
//! let order = TermOrder::with_constants([a]);
//! let ca = LinearCombination::from_term(Term::Constant(a));
//! let v0 = LinearCombination::from_term(Term::Variable(0));
//!
//! // the clause  EX x. p(x) /\ q(x, a)
//! let clause = Conjunction::new(
//!     vec![Quantifier::Ex],
//!     ArithConj::true_(),
//!     PredConj::new(
//!         vec![Atom::new(p, [v0.clone()]), Atom::new(q, [v0, ca.clone()])],
//!         vec![],
//!         &order,
//!     ),
//!     NegatedConjunctions::empty(),
//! );
//!
//! let reducer = SimplifyingReducer::new(order.clone());
//! let mut logger = NullLogger;
//! let matcher = ClauseMatcher::empty(false);
//! let (_, matcher) = matcher
//!     .update_clauses(
//!         NegatedConjunctions::new(vec![clause]),
//!         &DistinctConstantsAlias,
//!         &reducer,
//!         &|_| false,
//!         &mut logger,
//!         &order,
//!     )
//!     .unwrap();
//!
//! // facts p(a) and q(a, a) produce exactly one instance
//! let facts = PredConj::new(
//!     vec![Atom::new(p, [ca.clone()]), Atom::new(q, [ca.clone(), ca])],
//!     vec![],
//!     &order,
//! );
//! let (instances, _) = matcher
//!     .update_facts(facts, &DistinctConstantsAlias, &reducer, &|_| false, &mut logger, &order)
//!     .unwrap();
//! assert_eq!(instances.len(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod formula;
pub mod matcher;
pub mod reduce;
pub mod symbols;
pub mod term;

pub use error::{MatcherError, Result};
pub use formula::{ArithConj, Conjunction, EquationConj, NegatedConjunctions, PredConj, Quantifier};
pub use matcher::{ClauseMatcher, ClauseState, MatchProgram, MatchStatement, PolarityPolicy};
pub use reduce::{AliasOracle, DistinctConstantsAlias, Reducer, SimplifyingReducer, UniversalAlias};
pub use symbols::{Constant, Predicate, SymbolStore};
pub use term::atom::Atom;
pub use term::linear::LinearCombination;
pub use term::{Term, TermOrder};
