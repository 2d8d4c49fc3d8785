//! Quantified conjunctions and negated-conjunction lists.
//!
//! A [`Conjunction`] is a quantifier prefix over an arithmetic part, a
//! predicate part and a list of negated sub-conjunctions. Construction
//! performs the cheap canonicalisation steps the rest of the crate relies
//! on: a false arithmetic part or a true negated sub-conjunction collapses
//! the whole value to the canonical FALSE, a fully empty body to TRUE, and
//! negated FALSE sub-conjunctions vanish.

use crate::formula::arith::{ArithConj, EquationConj};
use crate::formula::preds::PredConj;
use crate::symbols::{Constant, Predicate};
use crate::term::linear::LinearCombination;
use crate::term::TermOrder;
use rustc_hash::FxHashSet;

/// A quantifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantifier {
    /// Existential quantification.
    Ex,
    /// Universal quantification.
    All,
}

impl Quantifier {
    /// The dual quantifier.
    #[must_use]
    pub const fn dual(self) -> Self {
        match self {
            Quantifier::Ex => Quantifier::All,
            Quantifier::All => Quantifier::Ex,
        }
    }
}

/// A quantified conjunction of arithmetic literals, predicate literals and
/// negated sub-conjunctions. Quantifiers bind De Bruijn variables, index 0
/// innermost.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Conjunction {
    quans: Vec<Quantifier>,
    arith: ArithConj,
    preds: PredConj,
    negated: NegatedConjunctions,
}

impl Conjunction {
    /// The canonical true conjunction.
    #[must_use]
    pub fn true_() -> Self {
        Self::default()
    }

    /// The canonical false conjunction.
    #[must_use]
    pub fn false_() -> Self {
        Self {
            quans: Vec::new(),
            arith: ArithConj::false_(),
            preds: PredConj::true_(),
            negated: NegatedConjunctions::empty(),
        }
    }

    /// Build a conjunction, applying the canonical collapses.
    #[must_use]
    pub fn new(
        quans: Vec<Quantifier>,
        arith: ArithConj,
        preds: PredConj,
        negated: NegatedConjunctions,
    ) -> Self {
        if arith.is_false() || negated.iter().any(Conjunction::is_true) {
            return Self::false_();
        }
        let negated = negated.without_false();
        if arith.is_true() && preds.is_true() && negated.is_empty() {
            return Self::true_();
        }
        Self {
            quans,
            arith,
            preds,
            negated,
        }
    }

    /// A quantifier-free conjunction holding only equations.
    #[must_use]
    pub fn from_eqs(eqs: EquationConj) -> Self {
        Self::new(
            Vec::new(),
            ArithConj::from_positive_eqs(eqs),
            PredConj::true_(),
            NegatedConjunctions::empty(),
        )
    }

    /// A quantifier-free conjunction holding only an arithmetic part.
    #[must_use]
    pub fn from_arith(arith: ArithConj) -> Self {
        Self::new(
            Vec::new(),
            arith,
            PredConj::true_(),
            NegatedConjunctions::empty(),
        )
    }

    /// The quantifier prefix, outermost first.
    #[must_use]
    pub fn quans(&self) -> &[Quantifier] {
        &self.quans
    }

    /// The arithmetic part.
    #[must_use]
    pub fn arith(&self) -> &ArithConj {
        &self.arith
    }

    /// The predicate part.
    #[must_use]
    pub fn preds(&self) -> &PredConj {
        &self.preds
    }

    /// The negated sub-conjunctions.
    #[must_use]
    pub fn negated(&self) -> &NegatedConjunctions {
        &self.negated
    }

    /// Whether this is the canonical true conjunction.
    #[must_use]
    pub fn is_true(&self) -> bool {
        self.quans.is_empty()
            && self.arith.is_true()
            && self.preds.is_true()
            && self.negated.is_empty()
    }

    /// Whether this is the canonical false conjunction.
    #[must_use]
    pub fn is_false(&self) -> bool {
        self.arith.is_false()
    }

    /// Whether every quantifier in the prefix is existential.
    #[must_use]
    pub fn is_purely_existential(&self) -> bool {
        self.quans.iter().all(|q| *q == Quantifier::Ex)
    }

    /// All predicates occurring in this conjunction, including inside
    /// negated sub-conjunctions.
    #[must_use]
    pub fn predicates(&self) -> FxHashSet<Predicate> {
        let mut out = FxHashSet::default();
        self.collect_predicates(&mut out);
        out
    }

    fn collect_predicates(&self, out: &mut FxHashSet<Predicate>) {
        out.extend(self.preds.predicates());
        for sub in self.negated.iter() {
            sub.collect_predicates(out);
        }
    }

    /// Whether any predicate literal occurs, at any depth.
    #[must_use]
    pub fn has_predicates(&self) -> bool {
        !self.preds.is_true() || self.negated.iter().any(Conjunction::has_predicates)
    }

    /// All constants occurring in this conjunction, at any depth.
    #[must_use]
    pub fn constants(&self) -> FxHashSet<Constant> {
        let mut out = FxHashSet::default();
        self.collect_constants(&mut out);
        out
    }

    fn collect_constants(&self, out: &mut FxHashSet<Constant>) {
        out.extend(self.arith.constants());
        out.extend(self.preds.constants());
        for sub in self.negated.iter() {
            sub.collect_constants(out);
        }
    }

    /// Instantiate the quantifier prefix with concrete terms: variable `i`
    /// becomes `terms[i]`, the prefix is dropped. The caller supplies one
    /// term per quantifier, ground unless it deliberately re-binds.
    #[must_use]
    pub fn instantiate(&self, terms: &[LinearCombination], order: &TermOrder) -> Conjunction {
        debug_assert_eq!(terms.len(), self.quans.len(), "instantiation arity");
        Conjunction::new(
            Vec::new(),
            self.arith.substitute_prefix(terms, 0, order),
            self.preds.substitute_prefix(terms, 0, order),
            self.negated.substitute_prefix(terms, 0, order),
        )
    }

    /// Single-variable replacement, at depth 0 of this conjunction's own
    /// scope; descends below the local binders of negated sub-conjunctions.
    #[must_use]
    pub fn replace_var(
        &self,
        var: u32,
        replacement: &LinearCombination,
        order: &TermOrder,
    ) -> Conjunction {
        self.replace_var_at(var, replacement, 0, order)
    }

    fn replace_var_at(
        &self,
        var: u32,
        replacement: &LinearCombination,
        depth: u32,
        order: &TermOrder,
    ) -> Conjunction {
        Conjunction::new(
            self.quans.clone(),
            self.arith.replace_var(var, replacement, depth, order),
            self.preds.replace_var(var, replacement, depth, order),
            self.negated.replace_var_at(var, replacement, depth, order),
        )
    }

    fn substitute_prefix_at(
        &self,
        bindings: &[LinearCombination],
        depth: u32,
        order: &TermOrder,
    ) -> Conjunction {
        let inner = depth + self.quans.len() as u32;
        Conjunction::new(
            self.quans.clone(),
            self.arith.substitute_prefix(bindings, inner, order),
            self.preds.substitute_prefix(bindings, inner, order),
            self.negated.substitute_prefix_below(bindings, inner, order),
        )
    }

    /// Rebuild under a new order.
    #[must_use]
    pub fn sort_by(&self, order: &TermOrder) -> Conjunction {
        Conjunction::new(
            self.quans.clone(),
            self.arith.sort_by(order),
            self.preds.sort_by(order),
            self.negated.sort_by(order),
        )
    }

    /// Whether every component is sorted under `order`.
    #[must_use]
    pub fn is_sorted_by(&self, order: &TermOrder) -> bool {
        self.arith.is_sorted_by(order)
            && self.preds.is_sorted_by(order)
            && self.negated.is_sorted_by(order)
    }
}

/// An ordered, duplicate-free list of negated conjunctions. Preserves
/// insertion order; set operations mirror those of
/// [`PredConj`](crate::formula::preds::PredConj).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct NegatedConjunctions {
    conjs: Vec<Conjunction>,
}

impl NegatedConjunctions {
    /// The empty list.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from an iterator, dropping duplicates while keeping first-seen
    /// order.
    pub fn new<I>(conjs: I) -> Self
    where
        I: IntoIterator<Item = Conjunction>,
    {
        let mut seen = FxHashSet::default();
        let mut out = Vec::new();
        for c in conjs {
            if seen.insert(c.clone()) {
                out.push(c);
            }
        }
        Self { conjs: out }
    }

    /// The conjunctions, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Conjunction> {
        self.conjs.iter()
    }

    /// Number of conjunctions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.conjs.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conjs.is_empty()
    }

    /// Whether `conj` is present.
    #[must_use]
    pub fn contains(&self, conj: &Conjunction) -> bool {
        self.conjs.contains(conj)
    }

    /// Set difference against an older list: `(shared, added)`, both in the
    /// order of `self`.
    #[must_use]
    pub fn diff(&self, older: &NegatedConjunctions) -> (NegatedConjunctions, NegatedConjunctions) {
        let old: FxHashSet<&Conjunction> = older.conjs.iter().collect();
        let (shared, added): (Vec<Conjunction>, Vec<Conjunction>) = self
            .conjs
            .iter()
            .cloned()
            .partition(|c| old.contains(c));
        (Self { conjs: shared }, Self { conjs: added })
    }

    /// Split by a clause test: `(matching, rest)`.
    #[must_use]
    pub fn partition<F>(&self, test: F) -> (NegatedConjunctions, NegatedConjunctions)
    where
        F: Fn(&Conjunction) -> bool,
    {
        let (inside, outside): (Vec<Conjunction>, Vec<Conjunction>) =
            self.conjs.iter().cloned().partition(|c| test(c));
        (Self { conjs: inside }, Self { conjs: outside })
    }

    /// All predicates occurring in any member.
    #[must_use]
    pub fn predicates(&self) -> FxHashSet<Predicate> {
        let mut out = FxHashSet::default();
        for c in &self.conjs {
            c.collect_predicates(&mut out);
        }
        out
    }

    fn without_false(&self) -> Self {
        if self.conjs.iter().any(Conjunction::is_false) {
            Self {
                conjs: self
                    .conjs
                    .iter()
                    .filter(|c| !c.is_false())
                    .cloned()
                    .collect(),
            }
        } else {
            self.clone()
        }
    }

    /// Prefix substitution below `depth` enclosing binders, applied to
    /// every member underneath its own quantifier prefix.
    pub(crate) fn substitute_prefix_below(
        &self,
        bindings: &[LinearCombination],
        depth: u32,
        order: &TermOrder,
    ) -> Self {
        Self::new(
            self.conjs
                .iter()
                .map(|c| c.substitute_prefix_at(bindings, depth, order)),
        )
    }

    /// Prefix substitution at the scope directly enclosing the members.
    #[must_use]
    pub fn substitute_prefix(
        &self,
        bindings: &[LinearCombination],
        depth: u32,
        order: &TermOrder,
    ) -> Self {
        self.substitute_prefix_below(bindings, depth, order)
    }

    pub(crate) fn replace_var_at(
        &self,
        var: u32,
        replacement: &LinearCombination,
        depth: u32,
        order: &TermOrder,
    ) -> Self {
        Self::new(self.conjs.iter().map(|c| {
            let inner = depth + c.quans().len() as u32;
            c.replace_var_at(var, replacement, inner, order)
        }))
    }

    /// Rebuild every member under a new order; keeps list order.
    #[must_use]
    pub fn sort_by(&self, order: &TermOrder) -> Self {
        Self::new(self.conjs.iter().map(|c| c.sort_by(order)))
    }

    /// Whether every member is sorted under `order`.
    #[must_use]
    pub fn is_sorted_by(&self, order: &TermOrder) -> bool {
        self.conjs.iter().all(|c| c.is_sorted_by(order))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::SymbolStore;
    use crate::term::atom::Atom;
    use crate::term::Term;

    fn setup() -> (SymbolStore, TermOrder) {
        let mut store = SymbolStore::new();
        let a = store.constant("a");
        let b = store.constant("b");
        (store, TermOrder::with_constants([a, b]))
    }

    #[test]
    fn test_true_and_false_are_canonical() {
        assert!(Conjunction::true_().is_true());
        assert!(Conjunction::false_().is_false());
        assert_ne!(Conjunction::true_(), Conjunction::false_());
    }

    #[test]
    fn test_false_arith_collapses() {
        let (_, order) = setup();
        let arith = ArithConj::new(vec![LinearCombination::constant(1)], vec![], &order);
        let c = Conjunction::new(
            vec![Quantifier::Ex],
            arith,
            PredConj::true_(),
            NegatedConjunctions::empty(),
        );
        assert_eq!(c, Conjunction::false_());
    }

    #[test]
    fn test_empty_body_collapses_to_true() {
        let c = Conjunction::new(
            vec![Quantifier::Ex, Quantifier::Ex],
            ArithConj::true_(),
            PredConj::true_(),
            NegatedConjunctions::empty(),
        );
        assert!(c.is_true());
    }

    #[test]
    fn test_negated_true_collapses_to_false() {
        let c = Conjunction::new(
            vec![],
            ArithConj::true_(),
            PredConj::true_(),
            NegatedConjunctions::new(vec![Conjunction::true_()]),
        );
        assert!(c.is_false());
    }

    #[test]
    fn test_negated_false_drops_out() {
        let (mut store, order) = setup();
        let p = store.predicate("p", 1);
        let a = LinearCombination::from_term(Term::Constant(store.constant("a")));
        let preds = PredConj::new(vec![Atom::new(p, [a])], vec![], &order);
        let c = Conjunction::new(
            vec![],
            ArithConj::true_(),
            preds.clone(),
            NegatedConjunctions::new(vec![Conjunction::false_()]),
        );
        assert!(c.negated().is_empty());
        assert_eq!(c.preds(), &preds);
    }

    #[test]
    fn test_instantiate_strips_prefix() {
        let (mut store, order) = setup();
        let p = store.predicate("p", 1);
        let a = store.constant("a");
        let x = LinearCombination::from_term(Term::Variable(0));
        let preds = PredConj::new(vec![Atom::new(p, [x])], vec![], &order);
        let clause = Conjunction::new(
            vec![Quantifier::Ex],
            ArithConj::true_(),
            preds,
            NegatedConjunctions::empty(),
        );
        let ground = clause.instantiate(
            &[LinearCombination::from_term(Term::Constant(a))],
            &order,
        );
        assert!(ground.quans().is_empty());
        let lit = &ground.preds().positive_lits()[0];
        assert!(lit.is_ground());
    }

    #[test]
    fn test_negated_conjunctions_diff() {
        let (mut store, order) = setup();
        let p = store.predicate("p", 1);
        let a = LinearCombination::from_term(Term::Constant(store.constant("a")));
        let b = LinearCombination::from_term(Term::Constant(store.constant("b")));
        let mk = |arg: LinearCombination| {
            Conjunction::new(
                vec![],
                ArithConj::true_(),
                PredConj::new(vec![Atom::new(p, [arg])], vec![], &order),
                NegatedConjunctions::empty(),
            )
        };
        let one = NegatedConjunctions::new(vec![mk(a.clone())]);
        let two = NegatedConjunctions::new(vec![mk(a), mk(b)]);
        let (shared, added) = two.diff(&one);
        assert_eq!(shared.len(), 1);
        assert_eq!(added.len(), 1);
    }
}
