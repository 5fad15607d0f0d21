//! Compile and match errors.

use std::time::Duration;

use thiserror::Error;

/// Why a pattern could not be compiled.
#[derive(Debug, Error)]
pub enum PatternError {
    /// The pattern text is not valid syntax.
    #[error("invalid pattern syntax: {0}")]
    Syntax(#[from] regex_syntax::Error),

    /// The pattern parses but uses a construct the matcher does not run.
    #[error("unsupported pattern construct: {construct}")]
    Unsupported { construct: &'static str },

    /// The pattern is not valid in the host dialect.
    #[error("invalid pattern: {reason}")]
    Malformed { reason: &'static str },

    /// A backreference names a group the pattern does not define.
    #[error("reference to undefined group {group}")]
    UndefinedGroup { group: String },

    /// The compiled program exceeds the instruction limit.
    #[error("pattern program exceeds {limit} instructions")]
    TooLarge { limit: usize },
}

/// Why a match attempt produced no answer.
#[derive(Debug, Error, Copy, Clone, Eq, PartialEq)]
pub enum MatchError {
    /// The match ran past its time budget.
    #[error("match exceeded its {budget:?} budget")]
    Timeout { budget: Duration },
}
