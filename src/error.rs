//! Error types for the matching engine.

use thiserror::Error;

/// Errors produced by the clause-matching engine.
///
/// Unsatisfiable intermediate equation systems are *not* errors; the executor
/// prunes them locally. The variants below indicate ill-formed matcher
/// programs or violations of the proof-logging restrictions, both of which
/// point at a bug in the clause compiler rather than at user input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatcherError {
    /// A statement list violated the program shape invariants, e.g. a
    /// `Choice` statement that is not in tail position.
    #[error("malformed match program: {0}")]
    MalformedProgram(String),

    /// In logging mode, `UnifyLiterals` was reached for a slot pair other
    /// than `(0, 1)`; the polarity of other pairs is not recorded, so no
    /// inference can be logged for them.
    #[error("literal unification on slots ({0}, {1}) cannot be logged")]
    IllegalUnification(usize, usize),

    /// Ground instantiation could not eliminate every quantified variable of
    /// a clause, which logging mode requires.
    #[error("ground instantiation left unsolved quantified variables")]
    UnsolvedInstantiation,
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, MatcherError>;
