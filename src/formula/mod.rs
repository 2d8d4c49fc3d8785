//! Formula layer: arithmetic conjunctions, predicate conjunctions, and
//! quantified clauses.

pub mod arith;
pub mod conjunction;
pub mod preds;

pub use arith::{ArithConj, EquationConj};
pub use conjunction::{Conjunction, NegatedConjunctions, Quantifier};
pub use preds::PredConj;
