//! Inference sinks for proof logging.

use crate::formula::{Conjunction, EquationConj};
use crate::term::atom::Atom;
use crate::term::linear::LinearCombination;
use crate::term::TermOrder;

/// Sink for the inference steps the executor performs.
///
/// When `is_logging` returns `false` the executor takes the cheaper
/// non-logging instantiation path and never calls the other methods.
pub trait ProofLogger {
    /// Whether inferences should be recorded.
    fn is_logging(&self) -> bool;

    /// A clause was ground-instantiated: `neg_clause` is the matched
    /// (negated) clause, `terms` the per-variable instantiation, `result`
    /// the reduced instance.
    fn ground_instantiate_quantifier(
        &mut self,
        neg_clause: &Conjunction,
        terms: &[LinearCombination],
        result: &Conjunction,
        order: &TermOrder,
    );

    /// Two literals of the same predicate were unified, yielding `eqs`.
    fn unify_predicates(&mut self, left: &Atom, right: &Atom, eqs: &EquationConj, order: &TermOrder);
}

/// The no-op logger.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl ProofLogger for NullLogger {
    fn is_logging(&self) -> bool {
        false
    }

    fn ground_instantiate_quantifier(
        &mut self,
        _neg_clause: &Conjunction,
        _terms: &[LinearCombination],
        _result: &Conjunction,
        _order: &TermOrder,
    ) {
    }

    fn unify_predicates(
        &mut self,
        _left: &Atom,
        _right: &Atom,
        _eqs: &EquationConj,
        _order: &TermOrder,
    ) {
    }
}

/// One recorded inference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inference {
    /// Ground instantiation of a quantified clause.
    GroundInstantiation {
        /// The matched clause.
        clause: Conjunction,
        /// The instantiation, one term per bound variable.
        terms: Vec<LinearCombination>,
        /// The reduced instance.
        result: Conjunction,
    },
    /// Unification of two predicate literals.
    PredUnification {
        /// First literal.
        left: Atom,
        /// Second literal.
        right: Atom,
        /// The unification equations.
        eqs: EquationConj,
    },
}

/// A logger that records every inference, mainly for tests and debugging.
#[derive(Debug, Clone, Default)]
pub struct RecordingLogger {
    inferences: Vec<Inference>,
}

impl RecordingLogger {
    /// A fresh, empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded inferences, in order.
    #[must_use]
    pub fn inferences(&self) -> &[Inference] {
        &self.inferences
    }
}

impl ProofLogger for RecordingLogger {
    fn is_logging(&self) -> bool {
        true
    }

    fn ground_instantiate_quantifier(
        &mut self,
        neg_clause: &Conjunction,
        terms: &[LinearCombination],
        result: &Conjunction,
        _order: &TermOrder,
    ) {
        self.inferences.push(Inference::GroundInstantiation {
            clause: neg_clause.clone(),
            terms: terms.to_vec(),
            result: result.clone(),
        });
    }

    fn unify_predicates(
        &mut self,
        left: &Atom,
        right: &Atom,
        eqs: &EquationConj,
        _order: &TermOrder,
    ) {
        self.inferences.push(Inference::PredUnification {
            left: left.clone(),
            right: right.clone(),
            eqs: eqs.clone(),
        });
    }
}
