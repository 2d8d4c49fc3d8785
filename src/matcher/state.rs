//! The incremental clause-matching state.
//!
//! [`ClauseMatcher`] tracks the ground facts last seen, the matchable
//! clauses, a lazily built cache of compiled matcher programs, and the set
//! of instances produced so far. It is logically immutable: every mutator
//! returns a new state sharing structure with the old one, so a
//! backtracking caller simply keeps the previous value.
//!
//! The produced-instance set is persistent (`im::HashSet`), which makes the
//! per-update state handoff cheap even when the set is large. It always
//! contains the canonical FALSE, so FALSE is never reported as a new
//! instance.

use crate::error::Result;
use crate::formula::{Conjunction, NegatedConjunctions, PredConj};
use crate::matcher::exec::{execute_matcher, MatchContext};
use crate::matcher::logger::ProofLogger;
use crate::matcher::program::{
    construct_matcher, determine_matched_lits, MatchProgram, PolarityPolicy,
};
use crate::reduce::{AliasOracle, Reducer};
use crate::symbols::Predicate;
use crate::term::atom::Atom;
use crate::term::TermOrder;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::sync::Arc;
use tracing::{debug, trace};

/// The matching status of a clause, as seen by the proof-search driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClauseState {
    /// No literal is positively matched; the clause can never fire.
    Unmatchable,
    /// Instantiation produces a clause still containing predicate literals.
    ProducesLits,
    /// All predicate literals are matched and no nested negated conjunction
    /// carries predicates; instantiation produces pure arithmetic.
    Complete,
}

type ProgramCache = RefCell<FxHashMap<(Predicate, bool), Arc<MatchProgram>>>;

/// Incremental engine deriving ground clause instances from predicate
/// facts.
#[derive(Debug, Clone)]
pub struct ClauseMatcher {
    current_facts: PredConj,
    clauses: NegatedConjunctions,
    match_axioms: bool,
    polarity: PolarityPolicy,
    programs: ProgramCache,
    generated: im::HashSet<Conjunction>,
}

impl PartialEq for ClauseMatcher {
    fn eq(&self, other: &Self) -> bool {
        // the program cache is a memo over (clauses, polarity) and carries
        // no information of its own
        self.current_facts == other.current_facts
            && self.clauses == other.clauses
            && self.match_axioms == other.match_axioms
            && self.polarity == other.polarity
            && self.generated == other.generated
    }
}

impl Eq for ClauseMatcher {}

impl ClauseMatcher {
    /// An empty matcher: no facts, no clauses, FALSE pre-seeded into the
    /// generated-instance set.
    #[must_use]
    pub fn empty(match_axioms: bool) -> Self {
        Self::with_polarity(match_axioms, PolarityPolicy::default())
    }

    /// An empty matcher with an explicit polarity policy.
    #[must_use]
    pub fn with_polarity(match_axioms: bool, polarity: PolarityPolicy) -> Self {
        let mut generated = im::HashSet::new();
        generated.insert(Conjunction::false_());
        Self {
            current_facts: PredConj::true_(),
            clauses: NegatedConjunctions::empty(),
            match_axioms,
            polarity,
            programs: RefCell::new(FxHashMap::default()),
            generated,
        }
    }

    fn derived(
        &self,
        current_facts: PredConj,
        clauses: NegatedConjunctions,
        programs: ProgramCache,
        generated: im::HashSet<Conjunction>,
    ) -> Self {
        Self {
            current_facts,
            clauses,
            match_axioms: self.match_axioms,
            polarity: self.polarity.clone(),
            programs,
            generated,
        }
    }

    /// The clauses currently installed.
    #[must_use]
    pub fn clauses(&self) -> &NegatedConjunctions {
        &self.clauses
    }

    /// The facts of the last update.
    #[must_use]
    pub fn current_facts(&self) -> &PredConj {
        &self.current_facts
    }

    /// The set of instances produced over this state's history.
    #[must_use]
    pub fn generated_instances(&self) -> &im::HashSet<Conjunction> {
        &self.generated
    }

    /// Debug helper: whether the facts this matcher saw last differ from
    /// the caller's current facts.
    #[must_use]
    pub fn facts_are_outdated(&self, actual: &PredConj) -> bool {
        self.current_facts != *actual
    }

    /// Whether a clause can be handled by this matcher: purely existential
    /// prefix and at least one matched literal.
    #[must_use]
    pub fn is_matchable(&self, clause: &Conjunction, order: &TermOrder) -> bool {
        clause.is_purely_existential()
            && !determine_matched_lits(clause.preds(), &self.polarity, order)
                .matched
                .is_empty()
    }

    /// The matching status of a clause under this matcher's polarity
    /// policy.
    #[must_use]
    pub fn clause_state(&self, clause: &Conjunction, order: &TermOrder) -> ClauseState {
        let split = determine_matched_lits(clause.preds(), &self.polarity, order);
        if split.matched.is_empty() {
            return ClauseState::Unmatchable;
        }
        if split.remaining.is_true()
            && clause.negated().iter().all(|sub| !sub.has_predicates())
        {
            ClauseState::Complete
        } else {
            ClauseState::ProducesLits
        }
    }

    fn program_for(
        &self,
        pred: Predicate,
        negative: bool,
        order: &TermOrder,
    ) -> Result<Arc<MatchProgram>> {
        if let Some(program) = self.programs.borrow().get(&(pred, negative)) {
            return Ok(Arc::clone(program));
        }
        let program = Arc::new(construct_matcher(
            pred,
            negative,
            &self.clauses,
            self.match_axioms,
            &self.polarity,
            order,
        )?);
        self.programs
            .borrow_mut()
            .insert((pred, negative), Arc::clone(&program));
        Ok(program)
    }

    /// Feed a new fact conjunction to the matcher.
    ///
    /// Only atoms not present in the previous facts seed matching; within
    /// the batch, new atoms are also matched against each other, each pair
    /// exactly once. Instances already generated or deemed irrelevant are
    /// filtered out. Returns the fresh instances and the successor state.
    pub fn update_facts(
        &self,
        new_facts: PredConj,
        alias: &dyn AliasOracle,
        reducer: &dyn Reducer,
        is_irrelevant: &dyn Fn(&Conjunction) -> bool,
        logger: &mut dyn ProofLogger,
        order: &TermOrder,
    ) -> Result<(Vec<Conjunction>, Self)> {
        debug_assert!(new_facts.is_sorted_by(order), "facts not sorted");
        debug_assert!(self.is_sorted_by(order), "matcher not sorted");
        if new_facts == self.current_facts {
            return Ok((Vec::new(), self.clone()));
        }

        let (shared, added) = new_facts.diff(&self.current_facts);
        trace!(
            added_pos = added.positive_lits().len(),
            added_neg = added.negative_lits().len(),
            "updating facts"
        );

        let mut additional_pos: Vec<Atom> = Vec::new();
        let mut additional_neg: Vec<Atom> = Vec::new();
        let mut generated = self.generated.clone();
        let mut produced = Vec::new();

        for negative in [false, true] {
            for atom in added.lits(negative) {
                let program = self.program_for(atom.pred(), negative, order)?;
                let mut ctx = MatchContext {
                    alias,
                    reducer,
                    logger: &mut *logger,
                    order,
                };
                let instances = execute_matcher(
                    atom,
                    &program,
                    &shared,
                    &additional_pos,
                    &additional_neg,
                    &mut ctx,
                )?;
                for instance in instances {
                    if !generated.contains(&instance) && !is_irrelevant(&instance) {
                        generated.insert(instance.clone());
                        produced.push(instance);
                    }
                }
                if negative {
                    additional_neg.push(atom.clone());
                } else {
                    additional_pos.push(atom.clone());
                }
            }
        }

        debug!(instances = produced.len(), "fact update complete");
        let next = self.derived(
            new_facts,
            self.clauses.clone(),
            self.programs.clone(),
            generated,
        );
        Ok((produced, next))
    }

    /// Install a new clause set. Clauses already present are untouched;
    /// added clauses are immediately matched against the current facts.
    pub fn update_clauses(
        &self,
        new_clauses: NegatedConjunctions,
        alias: &dyn AliasOracle,
        reducer: &dyn Reducer,
        is_irrelevant: &dyn Fn(&Conjunction) -> bool,
        logger: &mut dyn ProofLogger,
        order: &TermOrder,
    ) -> Result<(Vec<Conjunction>, Self)> {
        if new_clauses == self.clauses {
            return Ok((Vec::new(), self.clone()));
        }
        let (_, added) = new_clauses.diff(&self.clauses);
        debug_assert!(
            added.iter().all(|c| self.is_matchable(c, order)),
            "clause with non-existential prefix or no matched literal"
        );
        debug!(added = added.len(), "updating clauses");

        // run the added clauses against the existing facts through a
        // throwaway matcher that shares our generated-instance set
        let temp = Self {
            current_facts: PredConj::true_(),
            clauses: added,
            match_axioms: false,
            polarity: self.polarity.clone(),
            programs: RefCell::new(FxHashMap::default()),
            generated: self.generated.clone(),
        };
        let (instances, matched_temp) = temp.update_facts(
            self.current_facts.clone(),
            alias,
            reducer,
            is_irrelevant,
            logger,
            order,
        )?;

        // the program cache is keyed by the clause set, start afresh
        let next = self.derived(
            self.current_facts.clone(),
            new_clauses,
            RefCell::new(FxHashMap::default()),
            matched_temp.generated,
        );
        Ok((instances, next))
    }

    /// Drop every clause and fact containing a predicate accepted by
    /// `remove_pred`. Returns the removed clauses. Generated instances are
    /// retained, so re-adding a removed clause does not re-emit its
    /// instances.
    #[must_use]
    pub fn remove<F>(&self, remove_pred: F) -> (Vec<Conjunction>, Self)
    where
        F: Fn(Predicate) -> bool,
    {
        let (removed_facts, kept_facts) = self.current_facts.partition(&remove_pred);
        let (removed_clauses, kept_clauses) = self
            .clauses
            .partition(|c| c.predicates().into_iter().any(&remove_pred));

        if removed_clauses.is_empty() {
            if removed_facts.is_true() {
                return (Vec::new(), self.clone());
            }
            let next = self.derived(
                kept_facts,
                self.clauses.clone(),
                self.programs.clone(),
                self.generated.clone(),
            );
            return (Vec::new(), next);
        }

        debug!(
            clauses = removed_clauses.len(),
            facts = removed_facts.len(),
            "removing predicates"
        );
        let removed: Vec<Conjunction> = removed_clauses.iter().cloned().collect();
        let next = self.derived(
            kept_facts,
            kept_clauses,
            RefCell::new(FxHashMap::default()),
            self.generated.clone(),
        );
        (removed, next)
    }

    /// Reduce every clause with the supplied reducer. Unchanged clauses are
    /// kept; clauses whose reduction differs are removed and returned so
    /// the caller can re-route them (a reduced clause may no longer be
    /// matchable). The generated-instance set is reduced as well, so later
    /// deduplication works modulo the new context.
    pub fn reduce_clauses(
        &self,
        reducer: &dyn Reducer,
        order: &TermOrder,
    ) -> Result<(Vec<Conjunction>, Self)> {
        let reduced_all = NegatedConjunctions::new(self.clauses.iter().map(|clause| {
            // a clause without constants or ground atoms has nothing a
            // context reducer could act on
            if clause.constants().is_empty() && !clause.preds().has_ground_atoms() {
                clause.clone()
            } else {
                reducer.reduce(clause)
            }
        }));
        let (kept, reductions) = reduced_all.diff(&self.clauses);
        let changed = !reductions.is_empty() || kept.len() != self.clauses.len();

        let generated: im::HashSet<Conjunction> = self
            .generated
            .iter()
            .map(|c| reducer.reduce(c))
            .chain(std::iter::once(Conjunction::false_()))
            .collect();

        let programs = if changed {
            RefCell::new(FxHashMap::default())
        } else {
            self.programs.clone()
        };
        let next = self.derived(self.current_facts.clone(), kept, programs, generated);
        Ok((reductions.iter().cloned().collect(), next))
    }

    /// Rebuild every component under a new term order. A fixed point when
    /// the matcher is already sorted by `order`.
    #[must_use]
    pub fn sort_by(&self, order: &TermOrder) -> Self {
        if self.is_sorted_by(order) {
            return self.clone();
        }
        let generated: im::HashSet<Conjunction> =
            self.generated.iter().map(|c| c.sort_by(order)).collect();
        self.derived(
            self.current_facts.sort_by(order),
            self.clauses.sort_by(order),
            RefCell::new(FxHashMap::default()),
            generated,
        )
    }

    /// Whether facts and clauses are sorted under `order`.
    #[must_use]
    pub fn is_sorted_by(&self, order: &TermOrder) -> bool {
        self.current_facts.is_sorted_by(order) && self.clauses.is_sorted_by(order)
    }
}
