//! Canonical linear combinations over constants and variables.
//!
//! A [`LinearCombination`] is a sum of integer-coefficient monomials, kept
//! in strictly descending term order with no zero coefficients. Under a
//! fixed [`TermOrder`] two combinations are semantically equal iff they are
//! structurally equal, so the type derives `Eq` and `Hash` and all
//! set-like containers in the crate rely on that.

use crate::term::{Term, TermOrder};
use num_bigint::BigInt;
use num_traits::Zero;
use std::cmp::Ordering;

/// A canonical sum of integer-coefficient monomials plus a constant part.
///
/// The constant part is the coefficient of [`Term::One`], which sorts below
/// every other term and therefore always sits last.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct LinearCombination {
    terms: Vec<(BigInt, Term)>,
}

impl LinearCombination {
    /// The zero combination.
    #[must_use]
    pub fn zero() -> Self {
        Self::default()
    }

    /// A constant combination.
    #[must_use]
    pub fn constant(value: impl Into<BigInt>) -> Self {
        let value = value.into();
        if value.is_zero() {
            Self::zero()
        } else {
            Self {
                terms: vec![(value, Term::One)],
            }
        }
    }

    /// The combination `1 * term`.
    #[must_use]
    pub fn from_term(term: Term) -> Self {
        Self {
            terms: vec![(BigInt::from(1), term)],
        }
    }

    /// Build a canonical combination from arbitrary monomials: sorts under
    /// `order`, merges equal terms, and drops zero coefficients.
    pub fn sum<I>(monomials: I, order: &TermOrder) -> Self
    where
        I: IntoIterator<Item = (BigInt, Term)>,
    {
        let mut terms: Vec<(BigInt, Term)> = monomials.into_iter().collect();
        terms.sort_by(|(_, s), (_, t)| order.compare(*t, *s));
        let mut merged: Vec<(BigInt, Term)> = Vec::with_capacity(terms.len());
        for (coeff, term) in terms {
            match merged.last_mut() {
                Some((c, t)) if *t == term => *c += coeff,
                _ => merged.push((coeff, term)),
            }
        }
        merged.retain(|(c, _)| !c.is_zero());
        Self { terms: merged }
    }

    /// The monomials, largest term first.
    pub fn iter(&self) -> impl Iterator<Item = (&BigInt, Term)> {
        self.terms.iter().map(|(c, t)| (c, *t))
    }

    /// Number of monomials.
    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether this is the zero combination.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// The value of a constant combination; `None` if any non-unit monomial
    /// is present. The zero combination is the constant 0.
    #[must_use]
    pub fn constant_value(&self) -> Option<BigInt> {
        match self.terms.as_slice() {
            [] => Some(BigInt::zero()),
            [(c, Term::One)] => Some(c.clone()),
            _ => None,
        }
    }

    /// Whether this combination is a constant other than zero, i.e. the
    /// equation `self == 0` would be trivially false.
    #[must_use]
    pub fn is_nonzero_constant(&self) -> bool {
        matches!(self.terms.as_slice(), [(_, Term::One)])
    }

    /// The constant part (coefficient of the unit term).
    #[must_use]
    pub fn constant_part(&self) -> BigInt {
        match self.terms.last() {
            Some((c, Term::One)) => c.clone(),
            _ => BigInt::zero(),
        }
    }

    /// Leading monomial, if any.
    #[must_use]
    pub fn leading(&self) -> Option<(&BigInt, Term)> {
        self.terms.first().map(|(c, t)| (c, *t))
    }

    /// Whether any monomial is a variable.
    #[must_use]
    pub fn has_variables(&self) -> bool {
        self.terms.iter().any(|(_, t)| t.is_variable())
    }

    /// The variable indices occurring in this combination, descending.
    pub fn variables(&self) -> impl Iterator<Item = u32> + '_ {
        self.terms.iter().filter_map(|(_, t)| match t {
            Term::Variable(i) => Some(*i),
            _ => None,
        })
    }

    /// The constants occurring in this combination.
    pub fn constants(&self) -> impl Iterator<Item = crate::symbols::Constant> + '_ {
        self.terms.iter().filter_map(|(_, t)| match t {
            Term::Constant(c) => Some(*c),
            _ => None,
        })
    }

    /// The coefficient of `term`, zero if absent.
    #[must_use]
    pub fn coefficient(&self, term: Term) -> BigInt {
        self.terms
            .iter()
            .find(|(_, t)| *t == term)
            .map(|(c, _)| c.clone())
            .unwrap_or_else(BigInt::zero)
    }

    /// The negated combination. Negation preserves canonical form.
    #[must_use]
    pub fn negate(&self) -> Self {
        Self {
            terms: self.terms.iter().map(|(c, t)| (-c, *t)).collect(),
        }
    }

    /// `self - other`.
    #[must_use]
    pub fn difference(&self, other: &Self, order: &TermOrder) -> Self {
        Self::sum(
            self.terms
                .iter()
                .cloned()
                .chain(other.terms.iter().map(|(c, t)| (-c, *t))),
            order,
        )
    }

    /// `self + other`.
    #[must_use]
    pub fn add(&self, other: &Self, order: &TermOrder) -> Self {
        Self::sum(
            self.terms.iter().cloned().chain(other.terms.iter().cloned()),
            order,
        )
    }

    /// `factor * self`.
    #[must_use]
    pub fn scale(&self, factor: &BigInt) -> Self {
        if factor.is_zero() {
            return Self::zero();
        }
        Self {
            terms: self.terms.iter().map(|(c, t)| (c * factor, *t)).collect(),
        }
    }

    /// Shift every variable index up by `n`. Canonical form is preserved
    /// since the relative order of variables is their index order.
    #[must_use]
    pub fn shift_up(&self, n: u32) -> Self {
        if n == 0 || !self.has_variables() {
            return self.clone();
        }
        Self {
            terms: self
                .terms
                .iter()
                .map(|(c, t)| match t {
                    Term::Variable(i) => (c.clone(), Term::Variable(i + n)),
                    other => (c.clone(), *other),
                })
                .collect(),
        }
    }

    /// Substitute the `bindings.len()` outermost bound variables at binder
    /// depth `depth`: index `depth + j` becomes `bindings[j]` (shifted under
    /// the `depth` local binders); deeper indices are untouched and indices
    /// beyond the substituted prefix shift down by `bindings.len()`.
    #[must_use]
    pub fn substitute_prefix(
        &self,
        bindings: &[LinearCombination],
        depth: u32,
        order: &TermOrder,
    ) -> Self {
        if !self.has_variables() {
            return self.clone();
        }
        let n = bindings.len() as u32;
        let mut monomials: Vec<(BigInt, Term)> = Vec::with_capacity(self.terms.len());
        for (coeff, term) in &self.terms {
            match term {
                Term::Variable(i) if *i >= depth => {
                    let j = i - depth;
                    if j < n {
                        let replacement = bindings[j as usize].shift_up(depth);
                        monomials
                            .extend(replacement.scale(coeff).terms.iter().cloned());
                    } else {
                        monomials.push((coeff.clone(), Term::Variable(i - n)));
                    }
                }
                other => monomials.push((coeff.clone(), *other)),
            }
        }
        Self::sum(monomials, order)
    }

    /// Replace the variable with top-level index `var` (seen at binder depth
    /// `depth` as index `var + depth`) by `replacement`, without renumbering
    /// any other variable.
    #[must_use]
    pub fn replace_var(
        &self,
        var: u32,
        replacement: &LinearCombination,
        depth: u32,
        order: &TermOrder,
    ) -> Self {
        let target = var + depth;
        if !self.terms.iter().any(|(_, t)| *t == Term::Variable(target)) {
            return self.clone();
        }
        let mut monomials: Vec<(BigInt, Term)> = Vec::with_capacity(self.terms.len());
        for (coeff, term) in &self.terms {
            if *term == Term::Variable(target) {
                let shifted = replacement.shift_up(depth);
                monomials.extend(shifted.scale(coeff).terms.iter().cloned());
            } else {
                monomials.push((coeff.clone(), *term));
            }
        }
        Self::sum(monomials, order)
    }

    /// Re-establish canonical form under a (possibly different) order.
    #[must_use]
    pub fn sort_by(&self, order: &TermOrder) -> Self {
        Self::sum(self.terms.iter().cloned(), order)
    }

    /// Whether the monomials are strictly descending under `order`.
    #[must_use]
    pub fn is_sorted_by(&self, order: &TermOrder) -> bool {
        self.terms
            .windows(2)
            .all(|w| order.compare(w[0].1, w[1].1) == Ordering::Greater)
    }

    /// Lexicographic comparison under `order`, for sorting collections of
    /// combinations. Any total order would do; this one is stable across
    /// runs.
    #[must_use]
    pub fn compare(&self, other: &Self, order: &TermOrder) -> Ordering {
        for ((ca, ta), (cb, tb)) in self.terms.iter().zip(other.terms.iter()) {
            match order.compare(*ta, *tb) {
                Ordering::Equal => {}
                ord => return ord,
            }
            match ca.cmp(cb) {
                Ordering::Equal => {}
                ord => return ord,
            }
        }
        self.terms.len().cmp(&other.terms.len())
    }
}
