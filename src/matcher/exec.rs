//! Backtracking interpreter for matcher programs.
//!
//! The executor walks a [`MatchProgram`] depth-first over the fact base,
//! maintaining a scratch buffer of selected fact literals. Selections are
//! drawn from the persistent facts *and* from the "additional" buffers that
//! carry the facts added earlier in the same update batch, so that new
//! facts can match each other exactly once (the batch driver appends each
//! atom to its buffer only after all of that atom's own matches have been
//! enumerated).
//!
//! Results are collected into an insertion-ordered set: the first witness
//! of an instance determines its position and, in logging mode, the logged
//! inference.

use crate::error::{MatcherError, Result};
use crate::formula::{ArithConj, Conjunction, EquationConj, NegatedConjunctions, PredConj, Quantifier};
use crate::matcher::logger::ProofLogger;
use crate::matcher::program::{MatchProgram, MatchStatement};
use crate::reduce::{AliasOracle, Reducer};
use crate::term::atom::Atom;
use crate::term::linear::LinearCombination;
use crate::term::{Term, TermOrder};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

/// Collaborators injected into one executor run.
pub struct MatchContext<'a> {
    /// May-alias oracle.
    pub alias: &'a dyn AliasOracle,
    /// Clause simplifier.
    pub reducer: &'a dyn Reducer,
    /// Inference sink.
    pub logger: &'a mut dyn ProofLogger,
    /// Term order everything is sorted under.
    pub order: &'a TermOrder,
}

/// Insertion-ordered instance set.
#[derive(Debug, Default)]
struct InstanceBuffer {
    seen: FxHashSet<Conjunction>,
    ordered: Vec<Conjunction>,
}

impl InstanceBuffer {
    fn insert(&mut self, conj: Conjunction) {
        if self.seen.insert(conj.clone()) {
            self.ordered.push(conj);
        }
    }
}

/// Run `program` for the given start literal against `facts` plus the
/// additional buffers, returning the produced instances in first-seen
/// order. Duplicate filtering against previously generated instances is the
/// caller's business.
pub fn execute_matcher(
    start_lit: &Atom,
    program: &MatchProgram,
    facts: &PredConj,
    additional_pos: &[Atom],
    additional_neg: &[Atom],
    ctx: &mut MatchContext<'_>,
) -> Result<Vec<Conjunction>> {
    debug_assert!(start_lit.is_sorted_by(ctx.order));
    let mut selected: SmallVec<[Atom; 8]> = SmallVec::new();
    selected.push(start_lit.clone());
    let mut out = InstanceBuffer::default();
    exec(
        program.statements(),
        facts,
        additional_pos,
        additional_neg,
        &mut selected,
        &mut out,
        ctx,
    )?;
    Ok(out.ordered)
}

fn selected_arg<'a>(
    selected: &'a [Atom],
    lit: usize,
    arg: usize,
) -> Result<&'a LinearCombination> {
    selected
        .get(lit)
        .and_then(|atom| atom.args().get(arg))
        .ok_or_else(|| {
            MatcherError::MalformedProgram(format!(
                "alias check references missing slot {lit} argument {arg}"
            ))
        })
}

#[allow(clippy::too_many_arguments)]
fn exec(
    stmts: &[MatchStatement],
    facts: &PredConj,
    additional_pos: &[Atom],
    additional_neg: &[Atom],
    selected: &mut SmallVec<[Atom; 8]>,
    out: &mut InstanceBuffer,
    ctx: &mut MatchContext<'_>,
) -> Result<()> {
    let Some((stmt, rest)) = stmts.split_first() else {
        return Ok(());
    };
    match stmt {
        MatchStatement::SelectLiteral { pred, negative } => {
            let additional = if *negative {
                additional_neg
            } else {
                additional_pos
            };
            let candidates: Vec<Atom> = facts
                .lits(*negative)
                .iter()
                .filter(|a| a.pred() == *pred)
                .chain(additional.iter().filter(|a| a.pred() == *pred))
                .cloned()
                .collect();
            for atom in candidates {
                selected.push(atom);
                exec(rest, facts, additional_pos, additional_neg, selected, out, ctx)?;
                selected.pop();
            }
            Ok(())
        }

        MatchStatement::CheckMayAlias {
            lit_a,
            arg_a,
            lit_b,
            arg_b,
        } => {
            let a = selected_arg(selected, *lit_a, *arg_a)?;
            let b = selected_arg(selected, *lit_b, *arg_b)?;
            if ctx.alias.may_alias(a, b) {
                exec(rest, facts, additional_pos, additional_neg, selected, out, ctx)
            } else {
                Ok(())
            }
        }

        MatchStatement::CheckMayAliasUnary { lit, arg, lc } => {
            let a = selected_arg(selected, *lit, *arg)?;
            if ctx.alias.may_alias(a, lc) {
                exec(rest, facts, additional_pos, additional_neg, selected, out, ctx)
            } else {
                Ok(())
            }
        }

        MatchStatement::InstantiateClause {
            original,
            matched_lits,
            quans,
            arith,
            remaining,
            negated,
        } => {
            instantiate(
                original,
                matched_lits,
                quans,
                arith,
                remaining,
                negated,
                selected,
                out,
                ctx,
            )?;
            exec(rest, facts, additional_pos, additional_neg, selected, out, ctx)
        }

        MatchStatement::UnifyLiterals { lit_a, lit_b } => {
            let (Some(left), Some(right)) = (selected.get(*lit_a), selected.get(*lit_b)) else {
                return Err(MatcherError::MalformedProgram(format!(
                    "unification references missing slots ({lit_a}, {lit_b})"
                )));
            };
            let eqs = left.unify(right, ctx.order);
            if !eqs.is_false() {
                if ctx.logger.is_logging() {
                    if (*lit_a, *lit_b) != (0, 1) {
                        return Err(MatcherError::IllegalUnification(*lit_a, *lit_b));
                    }
                    ctx.logger
                        .unify_predicates(&selected[0], &selected[1], &eqs, ctx.order);
                }
                let instance = reduce_checked(ctx, &Conjunction::from_eqs(eqs));
                out.insert(instance);
            }
            exec(rest, facts, additional_pos, additional_neg, selected, out, ctx)
        }

        MatchStatement::Choice(options) => {
            debug_assert!(rest.is_empty(), "choice must be the tail statement");
            for option in options {
                exec(
                    option.statements(),
                    facts,
                    additional_pos,
                    additional_neg,
                    selected,
                    out,
                    ctx,
                )?;
            }
            Ok(())
        }
    }
}

/// Apply the reducer, re-checking the projection law in debug builds.
fn reduce_checked(ctx: &mut MatchContext<'_>, conj: &Conjunction) -> Conjunction {
    let reduced = ctx.reducer.reduce(conj);
    #[cfg(debug_assertions)]
    {
        debug_assert_eq!(
            ctx.reducer.reduce(&reduced),
            reduced,
            "injected reducer is not a projection"
        );
    }
    reduced
}

#[allow(clippy::too_many_arguments)]
fn instantiate(
    original: &Conjunction,
    matched_lits: &[Atom],
    quans: &[Quantifier],
    arith: &ArithConj,
    remaining: &PredConj,
    negated: &NegatedConjunctions,
    selected: &[Atom],
    out: &mut InstanceBuffer,
    ctx: &mut MatchContext<'_>,
) -> Result<()> {
    debug_assert_eq!(matched_lits.len(), selected.len());

    let mut eqs: Vec<LinearCombination> = arith.positive_eqs().eqs().to_vec();
    for (pattern, fact) in matched_lits.iter().zip(selected.iter()) {
        match pattern.unification_conditions(fact, ctx.order) {
            Some(conditions) => eqs.extend(conditions),
            None => return Ok(()),
        }
    }
    let eq_conj = EquationConj::new(eqs, ctx.order);
    if eq_conj.is_false() {
        return Ok(());
    }

    if ctx.logger.is_logging() {
        if quans.iter().any(|q| *q != Quantifier::Ex) {
            return Err(MatcherError::UnsolvedInstantiation);
        }
        let Some(terms) = solve_to_ground(&eq_conj, quans.len(), ctx.order)? else {
            return Ok(());
        };
        let instance = original.instantiate(&terms, ctx.order);
        let reduced = reduce_checked(ctx, &instance);
        if !reduced.is_false() {
            ctx.logger
                .ground_instantiate_quantifier(original, &terms, &reduced, ctx.order);
            out.insert(reduced);
        }
    } else {
        let conj = Conjunction::new(
            quans.to_vec(),
            arith.with_positive_eqs(eq_conj),
            remaining.clone(),
            negated.clone(),
        );
        out.insert(reduce_checked(ctx, &conj));
    }
    Ok(())
}

/// Solve an equation conjunction into one ground term per quantified
/// variable. `Ok(None)` means the system turned out unsatisfiable during
/// elimination; an unsolved variable is an error because logged
/// instantiations must be fully ground.
fn solve_to_ground(
    eqs: &EquationConj,
    num_vars: usize,
    order: &TermOrder,
) -> Result<Option<Vec<LinearCombination>>> {
    let mut remaining: Vec<LinearCombination> = eqs.eqs().to_vec();
    let mut bindings: Vec<Option<LinearCombination>> = vec![None; num_vars];

    loop {
        let mut found = None;
        for (idx, eq) in remaining.iter().enumerate() {
            let Some((coeff, Term::Variable(v))) = eq.leading() else {
                continue;
            };
            // solvable shape: +-1 * v + ground rest == 0
            let positive = if num_traits::One::is_one(coeff) {
                true
            } else if num_traits::One::is_one(&-coeff) {
                false
            } else {
                continue;
            };
            if eq.iter().skip(1).any(|(_, t)| t.is_variable()) {
                continue;
            }
            let rest = LinearCombination::sum(
                eq.iter()
                    .skip(1)
                    .map(|(c, t)| (if positive { -c } else { c.clone() }, t)),
                order,
            );
            found = Some((idx, v, rest));
            break;
        }
        let Some((idx, var, binding)) = found else {
            break;
        };
        if var as usize >= num_vars {
            return Err(MatcherError::UnsolvedInstantiation);
        }
        remaining.swap_remove(idx);
        let mut next = Vec::with_capacity(remaining.len());
        for eq in &remaining {
            let replaced = eq.replace_var(var, &binding, 0, order);
            if replaced.is_nonzero_constant() {
                return Ok(None);
            }
            if !replaced.is_zero() {
                next.push(replaced);
            }
        }
        remaining = next;
        bindings[var as usize] = Some(binding);
    }

    let mut terms = Vec::with_capacity(num_vars);
    for binding in bindings {
        match binding {
            Some(lc) if !lc.has_variables() => terms.push(lc),
            _ => return Err(MatcherError::UnsolvedInstantiation),
        }
    }
    Ok(Some(terms))
}
