//! Conjunctions of predicate literals.

use crate::symbols::{Constant, Predicate};
use crate::term::atom::Atom;
use crate::term::linear::LinearCombination;
use crate::term::TermOrder;

/// A conjunction of positive and negative predicate literals, each polarity
/// kept sorted under the order and free of duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PredConj {
    positive: Vec<Atom>,
    negative: Vec<Atom>,
}

fn sort_lits(mut atoms: Vec<Atom>, order: &TermOrder) -> Vec<Atom> {
    atoms.sort_by(|a, b| a.compare(b, order));
    atoms.dedup();
    atoms
}

impl PredConj {
    /// The empty (true) conjunction.
    #[must_use]
    pub fn true_() -> Self {
        Self::default()
    }

    /// Build from positive and negative literals; sorts and deduplicates.
    pub fn new<I, J>(positive: I, negative: J, order: &TermOrder) -> Self
    where
        I: IntoIterator<Item = Atom>,
        J: IntoIterator<Item = Atom>,
    {
        Self {
            positive: sort_lits(positive.into_iter().collect(), order),
            negative: sort_lits(negative.into_iter().collect(), order),
        }
    }

    /// Whether no literal is present.
    #[must_use]
    pub fn is_true(&self) -> bool {
        self.positive.is_empty() && self.negative.is_empty()
    }

    /// The positive literals, in sorted order.
    #[must_use]
    pub fn positive_lits(&self) -> &[Atom] {
        &self.positive
    }

    /// The negative literals, in sorted order.
    #[must_use]
    pub fn negative_lits(&self) -> &[Atom] {
        &self.negative
    }

    /// The literals of the given polarity.
    #[must_use]
    pub fn lits(&self, negative: bool) -> &[Atom] {
        if negative {
            &self.negative
        } else {
            &self.positive
        }
    }

    /// Positive literals carrying predicate `pred`, in stable order.
    pub fn positive_lits_with_pred(&self, pred: Predicate) -> impl Iterator<Item = &Atom> {
        self.positive.iter().filter(move |a| a.pred() == pred)
    }

    /// Negative literals carrying predicate `pred`, in stable order.
    pub fn negative_lits_with_pred(&self, pred: Predicate) -> impl Iterator<Item = &Atom> {
        self.negative.iter().filter(move |a| a.pred() == pred)
    }

    /// Whether the given literal occurs with the given polarity.
    #[must_use]
    pub fn contains(&self, atom: &Atom, negative: bool) -> bool {
        self.lits(negative).contains(atom)
    }

    /// Total number of literals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positive.len() + self.negative.len()
    }

    /// Whether no literal is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.is_true()
    }

    /// All predicates occurring in this conjunction.
    pub fn predicates(&self) -> impl Iterator<Item = Predicate> + '_ {
        self.positive
            .iter()
            .chain(self.negative.iter())
            .map(Atom::pred)
    }

    /// Whether any literal is ground.
    #[must_use]
    pub fn has_ground_atoms(&self) -> bool {
        self.positive
            .iter()
            .chain(self.negative.iter())
            .any(Atom::is_ground)
    }

    /// Constants occurring anywhere in this conjunction.
    pub fn constants(&self) -> impl Iterator<Item = Constant> + '_ {
        self.positive
            .iter()
            .chain(self.negative.iter())
            .flat_map(Atom::constants)
    }

    /// Per-polarity set difference against an older conjunction: returns
    /// `(shared, added)` where `shared` holds the literals of `self` also
    /// present in `older` and `added` those that are new. Filtering a sorted
    /// literal list keeps it sorted, so no re-sort is needed.
    #[must_use]
    pub fn diff(&self, older: &PredConj) -> (PredConj, PredConj) {
        let split = |lits: &[Atom], old: &[Atom]| -> (Vec<Atom>, Vec<Atom>) {
            lits.iter().cloned().partition(|a| old.contains(a))
        };
        let (shared_pos, added_pos) = split(&self.positive, &older.positive);
        let (shared_neg, added_neg) = split(&self.negative, &older.negative);
        (
            PredConj {
                positive: shared_pos,
                negative: shared_neg,
            },
            PredConj {
                positive: added_pos,
                negative: added_neg,
            },
        )
    }

    /// Split the conjunction by a predicate test, preserving polarity:
    /// returns `(matching, rest)`.
    #[must_use]
    pub fn partition<F>(&self, test: F) -> (PredConj, PredConj)
    where
        F: Fn(Predicate) -> bool,
    {
        let (pos_in, pos_out): (Vec<Atom>, Vec<Atom>) =
            self.positive.iter().cloned().partition(|a| test(a.pred()));
        let (neg_in, neg_out): (Vec<Atom>, Vec<Atom>) =
            self.negative.iter().cloned().partition(|a| test(a.pred()));
        (
            PredConj {
                positive: pos_in,
                negative: neg_in,
            },
            PredConj {
                positive: pos_out,
                negative: neg_out,
            },
        )
    }

    /// Shift every variable index up by `n`.
    #[must_use]
    pub fn shift_up(&self, n: u32) -> Self {
        Self {
            positive: self.positive.iter().map(|a| a.shift_up(n)).collect(),
            negative: self.negative.iter().map(|a| a.shift_up(n)).collect(),
        }
    }

    /// Prefix substitution over all literals; re-sorts.
    #[must_use]
    pub fn substitute_prefix(
        &self,
        bindings: &[LinearCombination],
        depth: u32,
        order: &TermOrder,
    ) -> Self {
        Self::new(
            self.positive
                .iter()
                .map(|a| a.substitute_prefix(bindings, depth, order)),
            self.negative
                .iter()
                .map(|a| a.substitute_prefix(bindings, depth, order)),
            order,
        )
    }

    /// Single-variable replacement over all literals; re-sorts.
    #[must_use]
    pub fn replace_var(
        &self,
        var: u32,
        replacement: &LinearCombination,
        depth: u32,
        order: &TermOrder,
    ) -> Self {
        Self::new(
            self.positive
                .iter()
                .map(|a| a.replace_var(var, replacement, depth, order)),
            self.negative
                .iter()
                .map(|a| a.replace_var(var, replacement, depth, order)),
            order,
        )
    }

    /// Rebuild under a new order.
    #[must_use]
    pub fn sort_by(&self, order: &TermOrder) -> Self {
        Self::new(
            self.positive.iter().map(|a| a.sort_by(order)),
            self.negative.iter().map(|a| a.sort_by(order)),
            order,
        )
    }

    /// Whether both polarities are sorted under `order`.
    #[must_use]
    pub fn is_sorted_by(&self, order: &TermOrder) -> bool {
        let sorted = |lits: &[Atom]| {
            lits.iter().all(|a| a.is_sorted_by(order))
                && lits
                    .windows(2)
                    .all(|w| w[0].compare(&w[1], order) == std::cmp::Ordering::Less)
        };
        sorted(&self.positive) && sorted(&self.negative)
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

    fn atom(store: &mut SymbolStore, pred: &str, consts: &[&str]) -> Atom {
        let p = store.predicate(pred, consts.len());
        let args: Vec<LinearCombination> = consts
            .iter()
            .map(|n| LinearCombination::from_term(Term::Constant(store.constant(n))))
            .collect();
        Atom::new(p, args)
    }

    #[test]
    fn test_dedup_on_construction() {
        let (mut store, order) = setup();
        let pa = atom(&mut store, "p", &["a"]);
        let conj = PredConj::new(vec![pa.clone(), pa.clone()], vec![], &order);
        assert_eq!(conj.positive_lits().len(), 1);
    }

    #[test]
    fn test_diff_splits_shared_and_added() {
        let (mut store, order) = setup();
        let pa = atom(&mut store, "p", &["a"]);
        let pb = atom(&mut store, "p", &["b"]);
        let qa = atom(&mut store, "q", &["a"]);
        let old = PredConj::new(vec![pa.clone()], vec![], &order);
        let new = PredConj::new(vec![pa.clone(), pb.clone(), qa.clone()], vec![], &order);
        let (shared, added) = new.diff(&old);
        assert_eq!(shared.positive_lits(), &[pa]);
        assert_eq!(added.positive_lits().len(), 2);
        assert!(added.contains(&pb, false));
        assert!(added.contains(&qa, false));
    }

    #[test]
    fn test_diff_is_per_polarity() {
        let (mut store, order) = setup();
        let pa = atom(&mut store, "p", &["a"]);
        let old = PredConj::new(vec![pa.clone()], vec![], &order);
        let new = PredConj::new(vec![], vec![pa.clone()], &order);
        let (shared, added) = new.diff(&old);
        assert!(shared.is_true());
        assert_eq!(added.negative_lits(), &[pa]);
    }

    #[test]
    fn test_partition_by_predicate() {
        let (mut store, order) = setup();
        let pa = atom(&mut store, "p", &["a"]);
        let qa = atom(&mut store, "q", &["a"]);
        let p = pa.pred();
        let conj = PredConj::new(vec![pa.clone(), qa.clone()], vec![], &order);
        let (with_p, rest) = conj.partition(|pred| pred == p);
        assert_eq!(with_p.positive_lits(), &[pa]);
        assert_eq!(rest.positive_lits(), &[qa]);
    }

    #[test]
    fn test_lits_with_pred_stable_order() {
        let (mut store, order) = setup();
        let pa = atom(&mut store, "p", &["a"]);
        let pb = atom(&mut store, "p", &["b"]);
        let p = pa.pred();
        let conj = PredConj::new(vec![pb.clone(), pa.clone()], vec![], &order);
        let found: Vec<&Atom> = conj.positive_lits_with_pred(p).collect();
        assert_eq!(found, vec![&pa, &pb]);
    }
}
