//! Matcher programs and their compiler.
//!
//! A clause is compiled into a small instruction list that selects fact
//! literals for each matched clause literal, prunes impossible selections
//! early through may-alias checks, and ends in a terminal statement that
//! emits an instance. All programs for one `(predicate, polarity)` start
//! key are combined into a single tail [`MatchStatement::Choice`].

use crate::error::{MatcherError, Result};
use crate::formula::{ArithConj, Conjunction, NegatedConjunctions, PredConj, Quantifier};
use crate::symbols::Predicate;
use crate::term::atom::Atom;
use crate::term::linear::LinearCombination;
use crate::term::TermOrder;
use rustc_hash::FxHashMap;

/// Which polarity of a predicate's occurrences the matcher targets.
///
/// A positively matched predicate has its positive clause literals matched
/// against positive facts; a negatively matched one has its negative
/// literals matched against negative facts. Predicates absent from the map
/// are positively matched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PolarityPolicy {
    /// Every predicate is positively matched.
    #[default]
    AllPositive,
    /// Per-predicate override; missing entries are positively matched.
    PerPredicate(FxHashMap<Predicate, bool>),
}

impl PolarityPolicy {
    /// Whether `pred` is positively matched.
    #[must_use]
    pub fn positively_matched(&self, pred: Predicate) -> bool {
        match self {
            PolarityPolicy::AllPositive => true,
            PolarityPolicy::PerPredicate(map) => map.get(&pred).copied().unwrap_or(true),
        }
    }
}

/// One instruction of a matcher program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchStatement {
    /// Bind the next literal slot to some fact atom with the given
    /// predicate and polarity.
    SelectLiteral {
        /// Predicate of the atoms to select.
        pred: Predicate,
        /// Polarity of the fact pool to draw from.
        negative: bool,
    },
    /// Require that two arguments of already-selected literals may alias.
    CheckMayAlias {
        /// Earlier literal slot.
        lit_a: usize,
        /// Argument index within `lit_a`.
        arg_a: usize,
        /// Later literal slot.
        lit_b: usize,
        /// Argument index within `lit_b`.
        arg_b: usize,
    },
    /// Require that an argument of a selected literal may alias a fixed
    /// ground combination.
    CheckMayAliasUnary {
        /// Literal slot.
        lit: usize,
        /// Argument index.
        arg: usize,
        /// The fixed combination.
        lc: LinearCombination,
    },
    /// Terminal: emit an instance of the compiled clause.
    InstantiateClause {
        /// The clause being instantiated, as originally given.
        original: Conjunction,
        /// Clause literals aligned with the selected slots.
        matched_lits: Vec<Atom>,
        /// Quantifier prefix of the clause.
        quans: Vec<Quantifier>,
        /// Arithmetic part of the clause.
        arith: ArithConj,
        /// Clause literals not consumed by matching.
        remaining: PredConj,
        /// Negated sub-conjunctions of the clause.
        negated: NegatedConjunctions,
    },
    /// Terminal used by axiom matching: unify two selected literals of the
    /// same predicate.
    UnifyLiterals {
        /// First slot.
        lit_a: usize,
        /// Second slot.
        lit_b: usize,
    },
    /// Nondeterministic union of alternative programs. Only valid as the
    /// final statement of a program.
    Choice(Vec<MatchProgram>),
}

/// A validated matcher program.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MatchProgram {
    stmts: Vec<MatchStatement>,
}

impl MatchProgram {
    /// Validate and wrap a statement list. `Choice` must be in tail
    /// position, recursively.
    pub fn new(stmts: Vec<MatchStatement>) -> Result<Self> {
        for (i, stmt) in stmts.iter().enumerate() {
            if let MatchStatement::Choice(options) = stmt {
                if i + 1 != stmts.len() {
                    return Err(MatcherError::MalformedProgram(
                        "choice statement not in tail position".into(),
                    ));
                }
                // options are MatchPrograms, validated at their own construction
                let _ = options;
            }
        }
        Ok(Self { stmts })
    }

    /// The program that matches nothing.
    #[must_use]
    pub fn no_op() -> Self {
        Self {
            stmts: vec![MatchStatement::Choice(Vec::new())],
        }
    }

    /// The statements.
    #[must_use]
    pub fn statements(&self) -> &[MatchStatement] {
        &self.stmts
    }
}

/// The split of a clause's predicate literals into matched literals (with
/// their polarity) and the remaining, unmatched part.
#[derive(Debug, Clone)]
pub struct MatchedLits {
    /// Literals the matcher consumes, with `true` marking negative
    /// occurrences. Positive literals come first, in their sorted order.
    pub matched: Vec<(Atom, bool)>,
    /// Literals carried through into instances.
    pub remaining: PredConj,
}

/// Split `preds` according to the polarity policy.
#[must_use]
pub fn determine_matched_lits(
    preds: &PredConj,
    policy: &PolarityPolicy,
    order: &TermOrder,
) -> MatchedLits {
    let mut matched = Vec::new();
    let mut rest_pos = Vec::new();
    let mut rest_neg = Vec::new();
    for lit in preds.positive_lits() {
        if policy.positively_matched(lit.pred()) {
            matched.push((lit.clone(), false));
        } else {
            rest_pos.push(lit.clone());
        }
    }
    for lit in preds.negative_lits() {
        if policy.positively_matched(lit.pred()) {
            rest_neg.push(lit.clone());
        } else {
            matched.push((lit.clone(), true));
        }
    }
    MatchedLits {
        matched,
        remaining: PredConj::new(rest_pos, rest_neg, order),
    }
}

/// Compile the program that finds instances of `clause` whose first matched
/// literal is `matched.matched[start]`.
fn compile_clause(
    clause: &Conjunction,
    matched: &MatchedLits,
    start: usize,
) -> Result<MatchProgram> {
    let mut stmts = Vec::new();
    let mut occurrences: FxHashMap<LinearCombination, Vec<(usize, usize)>> = FxHashMap::default();

    let slots: Vec<&(Atom, bool)> = std::iter::once(&matched.matched[start])
        .chain(
            matched
                .matched
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != start)
                .map(|(_, lit)| lit),
        )
        .collect();

    for (slot, (atom, negative)) in slots.iter().enumerate() {
        if slot > 0 {
            stmts.push(MatchStatement::SelectLiteral {
                pred: atom.pred(),
                negative: *negative,
            });
        }
        for (arg, lc) in atom.args().iter().enumerate() {
            if let Some(earlier) = occurrences.get(lc) {
                for &(lit_a, arg_a) in earlier {
                    stmts.push(MatchStatement::CheckMayAlias {
                        lit_a,
                        arg_a,
                        lit_b: slot,
                        arg_b: arg,
                    });
                }
            }
            if !lc.has_variables() {
                stmts.push(MatchStatement::CheckMayAliasUnary {
                    lit: slot,
                    arg,
                    lc: lc.clone(),
                });
            }
            occurrences.entry(lc.clone()).or_default().push((slot, arg));
        }
    }

    stmts.push(MatchStatement::InstantiateClause {
        original: clause.clone(),
        matched_lits: slots.iter().map(|(a, _)| a.clone()).collect(),
        quans: clause.quans().to_vec(),
        arith: clause.arith().clone(),
        remaining: matched.remaining.clone(),
        negated: clause.negated().clone(),
    });
    MatchProgram::new(stmts)
}

/// The per-predicate axiom matcher: pair the start literal with every other
/// literal of the same predicate and polarity and emit their unification.
fn construct_axiom_matcher(pred: Predicate, negative: bool) -> Result<MatchProgram> {
    let mut stmts = vec![MatchStatement::SelectLiteral { pred, negative }];
    for arg in 0..pred.arity() {
        stmts.push(MatchStatement::CheckMayAlias {
            lit_a: 0,
            arg_a: arg,
            lit_b: 1,
            arg_b: arg,
        });
    }
    stmts.push(MatchStatement::UnifyLiterals { lit_a: 0, lit_b: 1 });
    MatchProgram::new(stmts)
}

/// Build the combined program for all instances whose first matched literal
/// has predicate `pred` and the given polarity.
pub fn construct_matcher(
    pred: Predicate,
    negative: bool,
    clauses: &NegatedConjunctions,
    include_axiom_matcher: bool,
    policy: &PolarityPolicy,
    order: &TermOrder,
) -> Result<MatchProgram> {
    let mut options = Vec::new();
    for clause in clauses.iter() {
        let matched = determine_matched_lits(clause.preds(), policy, order);
        for start in 0..matched.matched.len() {
            let (atom, neg) = &matched.matched[start];
            if atom.pred() == pred && *neg == negative {
                options.push(compile_clause(clause, &matched, start)?);
            }
        }
    }
    if include_axiom_matcher {
        options.push(construct_axiom_matcher(pred, negative)?);
    }
    MatchProgram::new(vec![MatchStatement::Choice(options)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::SymbolStore;
    use crate::term::{Term, TermOrder};

    fn setup() -> (SymbolStore, TermOrder) {
        let mut store = SymbolStore::new();
        let a = store.constant("a");
        (store, TermOrder::with_constants([a]))
    }

    fn var(i: u32) -> LinearCombination {
        LinearCombination::from_term(Term::Variable(i))
    }

    fn clause_p_q(store: &mut SymbolStore, order: &TermOrder) -> Conjunction {
        // EX v0. p(v0) /\ q(v0, a)
        let p = store.predicate("p", 1);
        let q = store.predicate("q", 2);
        let a = LinearCombination::from_term(Term::Constant(store.constant("a")));
        Conjunction::new(
            vec![Quantifier::Ex],
            ArithConj::true_(),
            PredConj::new(
                vec![Atom::new(p, [var(0)]), Atom::new(q, [var(0), a])],
                vec![],
                order,
            ),
            NegatedConjunctions::empty(),
        )
    }

    #[test]
    fn test_choice_must_be_tail() {
        let bad = vec![
            MatchStatement::Choice(Vec::new()),
            MatchStatement::UnifyLiterals { lit_a: 0, lit_b: 1 },
        ];
        assert!(MatchProgram::new(bad).is_err());
    }

    #[test]
    fn test_compile_emits_alias_checks_and_terminal() {
        let (mut store, order) = setup();
        let clause = clause_p_q(&mut store, &order);
        let p = store.predicate("p", 1);
        let program = construct_matcher(
            p,
            false,
            &NegatedConjunctions::new(vec![clause]),
            false,
            &PolarityPolicy::default(),
            &order,
        )
        .unwrap();
        let [MatchStatement::Choice(options)] = program.statements() else {
            panic!("expected a single choice");
        };
        assert_eq!(options.len(), 1);
        let stmts = options[0].statements();
        // select q, shared-variable alias check, ground-argument unary
        // check, terminal instantiation
        assert!(matches!(
            stmts[0],
            MatchStatement::SelectLiteral { negative: false, .. }
        ));
        assert!(stmts
            .iter()
            .any(|s| matches!(s, MatchStatement::CheckMayAlias { .. })));
        assert!(stmts
            .iter()
            .any(|s| matches!(s, MatchStatement::CheckMayAliasUnary { .. })));
        assert!(matches!(
            stmts.last(),
            Some(MatchStatement::InstantiateClause { .. })
        ));
    }

    #[test]
    fn test_one_option_per_start_literal() {
        let (mut store, order) = setup();
        let clause = clause_p_q(&mut store, &order);
        let q = store.predicate("q", 2);
        let program = construct_matcher(
            q,
            false,
            &NegatedConjunctions::new(vec![clause]),
            false,
            &PolarityPolicy::default(),
            &order,
        )
        .unwrap();
        let [MatchStatement::Choice(options)] = program.statements() else {
            panic!("expected a single choice");
        };
        assert_eq!(options.len(), 1);
    }

    #[test]
    fn test_axiom_matcher_shape() {
        let (mut store, order) = setup();
        let p = store.predicate("p", 2);
        let program = construct_matcher(
            p,
            false,
            &NegatedConjunctions::empty(),
            true,
            &PolarityPolicy::default(),
            &order,
        )
        .unwrap();
        let [MatchStatement::Choice(options)] = program.statements() else {
            panic!("expected a single choice");
        };
        let stmts = options[0].statements();
        assert!(matches!(
            stmts[0],
            MatchStatement::SelectLiteral { negative: false, .. }
        ));
        assert_eq!(
            stmts
                .iter()
                .filter(|s| matches!(s, MatchStatement::CheckMayAlias { .. }))
                .count(),
            2
        );
        assert!(matches!(
            stmts.last(),
            Some(MatchStatement::UnifyLiterals { lit_a: 0, lit_b: 1 })
        ));
    }

    #[test]
    fn test_negative_policy_matches_negative_lits() {
        let (mut store, order) = setup();
        let p = store.predicate("p", 1);
        let a = LinearCombination::from_term(Term::Constant(store.constant("a")));
        let preds = PredConj::new(vec![], vec![Atom::new(p, [a])], &order);
        let mut map = FxHashMap::default();
        map.insert(p, false);
        let policy = PolarityPolicy::PerPredicate(map);
        let split = determine_matched_lits(&preds, &policy, &order);
        assert_eq!(split.matched.len(), 1);
        assert!(split.matched[0].1);
        assert!(split.remaining.is_true());
    }
}
