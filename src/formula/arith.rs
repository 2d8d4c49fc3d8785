//! Arithmetic literal conjunctions.
//!
//! Equations are stored as canonical linear combinations equated with zero:
//! gcd-reduced, sign-normalised (positive leading coefficient), sorted and
//! deduplicated. A conjunction that contains an unsatisfiable equation
//! collapses to the canonical FALSE, which is the single equation `1 == 0`.

use crate::symbols::Constant;
use crate::term::linear::LinearCombination;
use crate::term::{Term, TermOrder};
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Signed, Zero};
use std::cmp::Ordering;

/// Gcd-reduce and sign-normalise one equation `lc == 0`.
///
/// Returns `None` for the trivially true equation, `Err(())` for a
/// trivially false one (nonzero constant, or a constant part not divisible
/// by the gcd of the remaining coefficients).
fn normalize_eq(lc: &LinearCombination, order: &TermOrder) -> Result<Option<LinearCombination>, ()> {
    if lc.is_zero() {
        return Ok(None);
    }
    if lc.is_nonzero_constant() {
        return Err(());
    }
    let mut gcd = BigInt::zero();
    for (coeff, term) in lc.iter() {
        if term != Term::One {
            gcd = gcd.gcd(coeff);
        }
    }
    let constant = lc.constant_part();
    if !constant.is_zero() && !constant.mod_floor(&gcd).is_zero() {
        return Err(());
    }
    let mut scaled: Vec<(BigInt, Term)> =
        lc.iter().map(|(c, t)| (c.div_floor(&gcd), t)).collect();
    if let Some((leading, _)) = scaled.first() {
        if leading.is_negative() {
            for (c, _) in &mut scaled {
                *c = -std::mem::take(c);
            }
        }
    }
    Ok(Some(LinearCombination::sum(scaled, order)))
}

/// A canonical conjunction of equations `lc == 0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct EquationConj {
    eqs: Vec<LinearCombination>,
}

impl EquationConj {
    /// The empty (true) conjunction.
    #[must_use]
    pub fn true_() -> Self {
        Self::default()
    }

    /// The canonical false conjunction, `1 == 0`.
    #[must_use]
    pub fn false_() -> Self {
        Self {
            eqs: vec![LinearCombination::constant(1)],
        }
    }

    /// Build a canonical conjunction. Unsatisfiable members collapse the
    /// whole conjunction to FALSE.
    pub fn new<I>(eqs: I, order: &TermOrder) -> Self
    where
        I: IntoIterator<Item = LinearCombination>,
    {
        let mut normalized = Vec::new();
        for lc in eqs {
            match normalize_eq(&lc, order) {
                Ok(None) => {}
                Ok(Some(eq)) => normalized.push(eq),
                Err(()) => return Self::false_(),
            }
        }
        normalized.sort_by(|a, b| a.compare(b, order));
        normalized.dedup();
        Self { eqs: normalized }
    }

    /// Whether this is the empty conjunction.
    #[must_use]
    pub fn is_true(&self) -> bool {
        self.eqs.is_empty()
    }

    /// Whether this conjunction is unsatisfiable. Canonical form keeps at
    /// most the single constant equation `1 == 0`.
    #[must_use]
    pub fn is_false(&self) -> bool {
        self.eqs.iter().any(LinearCombination::is_nonzero_constant)
    }

    /// The equations, in sorted order.
    #[must_use]
    pub fn eqs(&self) -> &[LinearCombination] {
        &self.eqs
    }

    /// Number of equations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.eqs.len()
    }

    /// Whether the conjunction holds no equations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.eqs.is_empty()
    }

    /// The conjunction of `self` and `other`.
    #[must_use]
    pub fn union(&self, other: &Self, order: &TermOrder) -> Self {
        Self::new(
            self.eqs.iter().chain(other.eqs.iter()).cloned(),
            order,
        )
    }

    /// Whether any equation mentions a variable.
    #[must_use]
    pub fn has_variables(&self) -> bool {
        self.eqs.iter().any(LinearCombination::has_variables)
    }

    /// Constants mentioned by any equation.
    pub fn constants(&self) -> impl Iterator<Item = Constant> + '_ {
        self.eqs.iter().flat_map(LinearCombination::constants)
    }

    /// Shift every variable index up by `n`.
    #[must_use]
    pub fn shift_up(&self, n: u32) -> Self {
        Self {
            eqs: self.eqs.iter().map(|lc| lc.shift_up(n)).collect(),
        }
    }

    /// Prefix substitution over all equations; re-normalises.
    #[must_use]
    pub fn substitute_prefix(
        &self,
        bindings: &[LinearCombination],
        depth: u32,
        order: &TermOrder,
    ) -> Self {
        Self::new(
            self.eqs
                .iter()
                .map(|lc| lc.substitute_prefix(bindings, depth, order)),
            order,
        )
    }

    /// Single-variable replacement over all equations; re-normalises.
    #[must_use]
    pub fn replace_var(
        &self,
        var: u32,
        replacement: &LinearCombination,
        depth: u32,
        order: &TermOrder,
    ) -> Self {
        Self::new(
            self.eqs
                .iter()
                .map(|lc| lc.replace_var(var, replacement, depth, order)),
            order,
        )
    }

    /// Rebuild under a new order.
    #[must_use]
    pub fn sort_by(&self, order: &TermOrder) -> Self {
        Self::new(self.eqs.iter().cloned(), order)
    }

    /// Whether all equations are sorted under `order` and the collection
    /// itself is in sorted order.
    #[must_use]
    pub fn is_sorted_by(&self, order: &TermOrder) -> bool {
        self.eqs.iter().all(|lc| lc.is_sorted_by(order))
            && self
                .eqs
                .windows(2)
                .all(|w| w[0].compare(&w[1], order) != Ordering::Greater)
    }
}

/// Normalise one disequation `lc != 0`: trivially true members drop out,
/// a trivially false member (the zero combination) poisons the result.
fn normalize_diseq(
    lc: &LinearCombination,
    order: &TermOrder,
) -> Result<Option<LinearCombination>, ()> {
    if lc.is_zero() {
        return Err(());
    }
    match normalize_eq(lc, order) {
        // the corresponding equation is unsatisfiable, so `lc != 0` holds
        Err(()) => Ok(None),
        Ok(opt) => Ok(opt),
    }
}

/// The arithmetic part of a conjunction: positive equations and negated
/// equations. Only the positive equations participate in clause matching;
/// disequations are carried through instantiation untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ArithConj {
    positive_eqs: EquationConj,
    negative_eqs: EquationConj,
}

impl ArithConj {
    /// The empty (true) conjunction.
    #[must_use]
    pub fn true_() -> Self {
        Self::default()
    }

    /// The canonical false conjunction.
    #[must_use]
    pub fn false_() -> Self {
        Self {
            positive_eqs: EquationConj::false_(),
            negative_eqs: EquationConj::true_(),
        }
    }

    /// Build from positive equations and disequations.
    pub fn new<I, J>(positive: I, negative: J, order: &TermOrder) -> Self
    where
        I: IntoIterator<Item = LinearCombination>,
        J: IntoIterator<Item = LinearCombination>,
    {
        let positive_eqs = EquationConj::new(positive, order);
        if positive_eqs.is_false() {
            return Self::false_();
        }
        let mut diseqs = Vec::new();
        for lc in negative {
            match normalize_diseq(&lc, order) {
                Ok(None) => {}
                Ok(Some(d)) => diseqs.push(d),
                Err(()) => return Self::false_(),
            }
        }
        diseqs.sort_by(|a, b| a.compare(b, order));
        diseqs.dedup();
        Self {
            positive_eqs,
            negative_eqs: EquationConj { eqs: diseqs },
        }
    }

    /// Build from positive equations only.
    #[must_use]
    pub fn from_positive_eqs(eqs: EquationConj) -> Self {
        if eqs.is_false() {
            return Self::false_();
        }
        Self {
            positive_eqs: eqs,
            negative_eqs: EquationConj::true_(),
        }
    }

    /// The positive equations.
    #[must_use]
    pub fn positive_eqs(&self) -> &EquationConj {
        &self.positive_eqs
    }

    /// The disequations.
    #[must_use]
    pub fn negative_eqs(&self) -> &EquationConj {
        &self.negative_eqs
    }

    /// Replace the positive equations, keeping the disequations.
    #[must_use]
    pub fn with_positive_eqs(&self, eqs: EquationConj) -> Self {
        if eqs.is_false() {
            return Self::false_();
        }
        Self {
            positive_eqs: eqs,
            negative_eqs: self.negative_eqs.clone(),
        }
    }

    /// Whether both parts are empty.
    #[must_use]
    pub fn is_true(&self) -> bool {
        self.positive_eqs.is_true() && self.negative_eqs.is_true()
    }

    /// Whether the conjunction is unsatisfiable on its face.
    #[must_use]
    pub fn is_false(&self) -> bool {
        self.positive_eqs.is_false()
            || self.negative_eqs.eqs.iter().any(LinearCombination::is_zero)
    }

    /// Whether any literal mentions a variable.
    #[must_use]
    pub fn has_variables(&self) -> bool {
        self.positive_eqs.has_variables() || self.negative_eqs.has_variables()
    }

    /// Constants mentioned by any literal.
    pub fn constants(&self) -> impl Iterator<Item = Constant> + '_ {
        self.positive_eqs
            .constants()
            .chain(self.negative_eqs.constants())
    }

    /// Shift every variable index up by `n`.
    #[must_use]
    pub fn shift_up(&self, n: u32) -> Self {
        Self {
            positive_eqs: self.positive_eqs.shift_up(n),
            negative_eqs: self.negative_eqs.shift_up(n),
        }
    }

    /// Prefix substitution over both parts.
    #[must_use]
    pub fn substitute_prefix(
        &self,
        bindings: &[LinearCombination],
        depth: u32,
        order: &TermOrder,
    ) -> Self {
        Self::new(
            self.positive_eqs
                .eqs
                .iter()
                .map(|lc| lc.substitute_prefix(bindings, depth, order)),
            self.negative_eqs
                .eqs
                .iter()
                .map(|lc| lc.substitute_prefix(bindings, depth, order)),
            order,
        )
    }

    /// Single-variable replacement over both parts.
    #[must_use]
    pub fn replace_var(
        &self,
        var: u32,
        replacement: &LinearCombination,
        depth: u32,
        order: &TermOrder,
    ) -> Self {
        Self::new(
            self.positive_eqs
                .eqs
                .iter()
                .map(|lc| lc.replace_var(var, replacement, depth, order)),
            self.negative_eqs
                .eqs
                .iter()
                .map(|lc| lc.replace_var(var, replacement, depth, order)),
            order,
        )
    }

    /// Rebuild under a new order.
    #[must_use]
    pub fn sort_by(&self, order: &TermOrder) -> Self {
        Self::new(
            self.positive_eqs.eqs.iter().cloned(),
            self.negative_eqs.eqs.iter().cloned(),
            order,
        )
    }

    /// Whether both parts are sorted under `order`.
    #[must_use]
    pub fn is_sorted_by(&self, order: &TermOrder) -> bool {
        self.positive_eqs.is_sorted_by(order) && self.negative_eqs.is_sorted_by(order)
    }
}
