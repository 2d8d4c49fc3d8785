//! Predicate atoms.

use crate::formula::arith::EquationConj;
use crate::symbols::{Constant, Predicate};
use crate::term::linear::LinearCombination;
use crate::term::TermOrder;
use smallvec::SmallVec;
use std::cmp::Ordering;

/// A predicate symbol applied to linear-combination arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Atom {
    pred: Predicate,
    args: SmallVec<[LinearCombination; 4]>,
}

impl Atom {
    /// Create an atom. The argument count must match the predicate arity.
    #[must_use]
    pub fn new<I>(pred: Predicate, args: I) -> Self
    where
        I: IntoIterator<Item = LinearCombination>,
    {
        let args: SmallVec<[LinearCombination; 4]> = args.into_iter().collect();
        debug_assert_eq!(args.len(), pred.arity(), "atom arity mismatch");
        Self { pred, args }
    }

    /// The predicate symbol.
    #[must_use]
    pub fn pred(&self) -> Predicate {
        self.pred
    }

    /// The arguments.
    #[must_use]
    pub fn args(&self) -> &[LinearCombination] {
        &self.args
    }

    /// The `i`-th argument.
    #[must_use]
    pub fn arg(&self, i: usize) -> &LinearCombination {
        &self.args[i]
    }

    /// Whether no argument contains a variable.
    #[must_use]
    pub fn is_ground(&self) -> bool {
        !self.args.iter().any(LinearCombination::has_variables)
    }

    /// Variable indices occurring in the arguments.
    pub fn variables(&self) -> impl Iterator<Item = u32> + '_ {
        self.args.iter().flat_map(LinearCombination::variables)
    }

    /// Constants occurring in the arguments.
    pub fn constants(&self) -> impl Iterator<Item = Constant> + '_ {
        self.args.iter().flat_map(LinearCombination::constants)
    }

    /// The equations under which this atom and `other` denote the same
    /// ground literal, as argument differences. `None` if some argument
    /// pair differs by a nonzero constant, i.e. unification is trivially
    /// impossible. Both atoms must carry the same predicate.
    #[must_use]
    pub fn unification_conditions(
        &self,
        other: &Atom,
        order: &TermOrder,
    ) -> Option<Vec<LinearCombination>> {
        debug_assert_eq!(self.pred, other.pred, "unifying different predicates");
        let mut eqs = Vec::new();
        for (a, b) in self.args.iter().zip(other.args.iter()) {
            let diff = a.difference(b, order);
            if diff.is_nonzero_constant() {
                return None;
            }
            if !diff.is_zero() {
                eqs.push(diff);
            }
        }
        Some(eqs)
    }

    /// Unify with `other`, producing the canonical equation conjunction;
    /// the result is FALSE when the atoms cannot denote the same literal.
    #[must_use]
    pub fn unify(&self, other: &Atom, order: &TermOrder) -> EquationConj {
        match self.unification_conditions(other, order) {
            Some(eqs) => EquationConj::new(eqs, order),
            None => EquationConj::false_(),
        }
    }

    /// Shift every variable index up by `n`.
    #[must_use]
    pub fn shift_up(&self, n: u32) -> Self {
        Self {
            pred: self.pred,
            args: self.args.iter().map(|lc| lc.shift_up(n)).collect(),
        }
    }

    /// Argument-wise prefix substitution; see
    /// [`LinearCombination::substitute_prefix`].
    #[must_use]
    pub fn substitute_prefix(
        &self,
        bindings: &[LinearCombination],
        depth: u32,
        order: &TermOrder,
    ) -> Self {
        Self {
            pred: self.pred,
            args: self
                .args
                .iter()
                .map(|lc| lc.substitute_prefix(bindings, depth, order))
                .collect(),
        }
    }

    /// Argument-wise single-variable replacement; see
    /// [`LinearCombination::replace_var`].
    #[must_use]
    pub fn replace_var(
        &self,
        var: u32,
        replacement: &LinearCombination,
        depth: u32,
        order: &TermOrder,
    ) -> Self {
        Self {
            pred: self.pred,
            args: self
                .args
                .iter()
                .map(|lc| lc.replace_var(var, replacement, depth, order))
                .collect(),
        }
    }

    /// Re-sort all arguments under `order`.
    #[must_use]
    pub fn sort_by(&self, order: &TermOrder) -> Self {
        Self {
            pred: self.pred,
            args: self.args.iter().map(|lc| lc.sort_by(order)).collect(),
        }
    }

    /// Whether all arguments are sorted under `order`.
    #[must_use]
    pub fn is_sorted_by(&self, order: &TermOrder) -> bool {
        self.args.iter().all(|lc| lc.is_sorted_by(order))
    }

    /// Total order on atoms under `order`: predicate identity first, then
    /// arguments lexicographically.
    #[must_use]
    pub fn compare(&self, other: &Atom, order: &TermOrder) -> Ordering {
        self.pred
            .cmp(&other.pred)
            .then_with(|| {
                for (a, b) in self.args.iter().zip(other.args.iter()) {
                    match a.compare(b, order) {
                        Ordering::Equal => {}
                        ord => return ord,
                    }
                }
                Ordering::Equal
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::SymbolStore;
    use crate::term::Term;

    fn setup() -> (SymbolStore, TermOrder) {
        let mut store = SymbolStore::new();
        let a = store.constant("a");
        let b = store.constant("b");
        (store, TermOrder::with_constants([a, b]))
    }

    fn lc_const(store: &mut SymbolStore, name: &str) -> LinearCombination {
        let c = store.constant(name);
        LinearCombination::from_term(Term::Constant(c))
    }

    #[test]
    fn test_unification_conditions_ground_equal() {
        let (mut store, order) = setup();
        let p = store.predicate("p", 1);
        let lhs = Atom::new(p, [lc_const(&mut store, "a")]);
        let eqs = lhs.unification_conditions(&lhs.clone(), &order);
        assert_eq!(eqs, Some(vec![]));
    }

    #[test]
    fn test_unification_conditions_variable() {
        let (mut store, order) = setup();
        let p = store.predicate("p", 1);
        let pattern = Atom::new(p, [LinearCombination::from_term(Term::Variable(0))]);
        let fact = Atom::new(p, [lc_const(&mut store, "a")]);
        let eqs = pattern.unification_conditions(&fact, &order).unwrap();
        assert_eq!(eqs.len(), 1);
        // v0 - a == 0
        assert!(eqs[0].has_variables());
    }

    #[test]
    fn test_unify_distinct_offsets_is_false() {
        let (mut store, order) = setup();
        let p = store.predicate("p", 1);
        let a = lc_const(&mut store, "a");
        let a_plus_1 = a.add(&LinearCombination::constant(1), &order);
        let lhs = Atom::new(p, [a.clone()]);
        let rhs = Atom::new(p, [a_plus_1]);
        assert!(lhs.unify(&rhs, &order).is_false());
    }

    #[test]
    fn test_atom_ordering_by_predicate_then_args() {
        let (mut store, order) = setup();
        let p = store.predicate("p", 1);
        let q = store.predicate("q", 1);
        let pa = Atom::new(p, [lc_const(&mut store, "a")]);
        let qa = Atom::new(q, [lc_const(&mut store, "a")]);
        let pb = Atom::new(p, [lc_const(&mut store, "b")]);
        assert_eq!(pa.compare(&qa, &order), Ordering::Less);
        assert_eq!(pa.compare(&pb, &order), Ordering::Less);
        assert_eq!(pa.compare(&pa.clone(), &order), Ordering::Equal);
    }
}
