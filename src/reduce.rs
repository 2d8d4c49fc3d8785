//! The reducer contract and a reference simplifier.
//!
//! The matching engine never builds a reducer itself; callers inject one per
//! call. The contract a reducer must satisfy:
//!
//! - **Projection**: `reduce(reduce(c)) == reduce(c)`.
//! - **Soundness**: the result is equivalent to the input in the caller's
//!   fact context.
//! - **False propagation**: the result is FALSE iff the input is
//!   unsatisfiable in context.
//! - **Order preservation**: a sorted input yields a sorted output.
//!
//! The projection law is re-checked by the executor in debug builds.
//!
//! [`SimplifyingReducer`] is the reference implementation shipped with the
//! crate: ground-equation propagation plus optional discharge of ground
//! literals against a fact context. It is deliberately small; the full
//! prover substitutes its own context reducer here.

use crate::formula::{Conjunction, NegatedConjunctions, PredConj};
use crate::term::linear::LinearCombination;
use crate::term::{Term, TermOrder};
use num_traits::One;

/// An idempotent, context-aware clause simplifier.
pub trait Reducer {
    /// Simplify a conjunction. See the module documentation for the laws
    /// implementations must uphold.
    fn reduce(&self, conj: &Conjunction) -> Conjunction;
}

impl<F> Reducer for F
where
    F: Fn(&Conjunction) -> Conjunction,
{
    fn reduce(&self, conj: &Conjunction) -> Conjunction {
        self(conj)
    }
}

/// Overapproximating alias test between two linear combinations: "may these
/// denote the same value in the current context?" Symmetric; `true` is
/// always a safe answer.
pub trait AliasOracle {
    /// Whether `a` and `b` may alias.
    fn may_alias(&self, a: &LinearCombination, b: &LinearCombination) -> bool;
}

impl<F> AliasOracle for F
where
    F: Fn(&LinearCombination, &LinearCombination) -> bool,
{
    fn may_alias(&self, a: &LinearCombination, b: &LinearCombination) -> bool {
        self(a, b)
    }
}

/// Alias oracle for free constants: ground combinations alias iff they are
/// equal, anything containing a variable may alias everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct DistinctConstantsAlias;

impl AliasOracle for DistinctConstantsAlias {
    fn may_alias(&self, a: &LinearCombination, b: &LinearCombination) -> bool {
        if a.has_variables() || b.has_variables() {
            return true;
        }
        a == b
    }
}

/// Alias oracle that never rules anything out. Useful when the context
/// provides no aliasing information, e.g. for predicate axiom matching.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniversalAlias;

impl AliasOracle for UniversalAlias {
    fn may_alias(&self, _a: &LinearCombination, _b: &LinearCombination) -> bool {
        true
    }
}

/// Reference reducer: propagates ground variable bindings out of the
/// positive equations and, when a fact context is attached, discharges
/// ground predicate literals against it.
#[derive(Debug, Clone)]
pub struct SimplifyingReducer {
    order: TermOrder,
    facts: Option<PredConj>,
}

impl SimplifyingReducer {
    /// A reducer with no fact context.
    #[must_use]
    pub fn new(order: TermOrder) -> Self {
        Self { order, facts: None }
    }

    /// A reducer discharging ground literals against `facts`.
    #[must_use]
    pub fn with_facts(facts: PredConj, order: TermOrder) -> Self {
        Self {
            order,
            facts: Some(facts),
        }
    }

    /// Find a positive equation of the shape `v + rest == 0` with ground
    /// `rest`, and return the binding `v := -rest`.
    fn ground_binding(conj: &Conjunction, order: &TermOrder) -> Option<(u32, LinearCombination)> {
        for eq in conj.arith().positive_eqs().eqs() {
            let Some((coeff, Term::Variable(v))) = eq.leading() else {
                continue;
            };
            if !coeff.is_one() {
                continue;
            }
            let rest: Vec<_> = eq.iter().skip(1).map(|(c, t)| (-c, t)).collect();
            if rest.iter().any(|(_, t)| t.is_variable()) {
                continue;
            }
            return Some((v, LinearCombination::sum(rest, order)));
        }
        None
    }

    fn discharge(&self, conj: &Conjunction, facts: &PredConj) -> Conjunction {
        let order = &self.order;
        let mut positive = Vec::new();
        for lit in conj.preds().positive_lits() {
            if lit.is_ground() {
                if facts.contains(lit, false) {
                    continue;
                }
                if facts.contains(lit, true) {
                    return Conjunction::false_();
                }
            }
            positive.push(lit.clone());
        }
        let mut negative = Vec::new();
        for lit in conj.preds().negative_lits() {
            if lit.is_ground() {
                if facts.contains(lit, true) {
                    continue;
                }
                if facts.contains(lit, false) {
                    return Conjunction::false_();
                }
            }
            negative.push(lit.clone());
        }
        let negated = NegatedConjunctions::new(
            conj.negated().iter().map(|sub| self.discharge(sub, facts)),
        );
        Conjunction::new(
            conj.quans().to_vec(),
            conj.arith().clone(),
            PredConj::new(positive, negative, order),
            negated,
        )
    }
}

impl Reducer for SimplifyingReducer {
    fn reduce(&self, conj: &Conjunction) -> Conjunction {
        if conj.is_true() || conj.is_false() {
            return conj.clone();
        }
        let mut current = conj.clone();
        while let Some((var, binding)) = Self::ground_binding(&current, &self.order) {
            current = current.replace_var(var, &binding, &self.order);
        }
        if let Some(facts) = &self.facts {
            current = self.discharge(&current, facts);
        }
        current
    }
}
