//! The incremental clause-matching engine: compiled matcher programs, the
//! backtracking executor, and the persistent matcher state.

pub mod exec;
pub mod logger;
pub mod program;
pub mod state;

pub use exec::{execute_matcher, MatchContext};
pub use logger::{Inference, NullLogger, ProofLogger, RecordingLogger};
pub use program::{
    construct_matcher, determine_matched_lits, MatchProgram, MatchStatement, MatchedLits,
    PolarityPolicy,
};
pub use state::{ClauseMatcher, ClauseState};
