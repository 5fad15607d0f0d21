//! Compiled patterns.

use std::fmt;
use std::time::Duration;

use crate::compile::compile;
use crate::error::{MatchError, PatternError};
use crate::exec::full_match;
use crate::options::PatternOptions;
use crate::program::Program;

/// A pattern compiled under a fixed option set and match budget.
///
/// Immutable once built and safe to share across threads.
pub struct CompiledPattern {
    text: Box<str>,
    options: PatternOptions,
    program: Program,
    group_count: usize,
    match_timeout: Duration,
}

impl CompiledPattern {
    /// Compile `text` under `options`.
    ///
    /// Options that only change performance or culture (`COMPILED`,
    /// `CULTURE_INVARIANT`, `NON_BACKTRACKING`, `ECMA_SCRIPT`) are accepted
    /// and do not alter matching. `RIGHT_TO_LEFT` does not change whether a
    /// full-string match exists, so it is accepted as well.
    ///
    /// Look-around, atomic groups, backreferences, `\Z`, and class
    /// subtraction are supported. Conditional and balancing groups are
    /// rejected as [`PatternError::Unsupported`].
    #[tracing::instrument(level = "trace", skip(options, match_timeout), fields(options = options.bits()))]
    pub fn new(
        text: &str,
        options: PatternOptions,
        match_timeout: Duration,
    ) -> Result<Self, PatternError> {
        let lowered = compile(text, options)?;
        tracing::trace!(
            insts = lowered.program.insts.len(),
            groups = lowered.explicit_groups,
            "pattern compiled"
        );

        Ok(CompiledPattern {
            text: text.into(),
            options,
            program: lowered.program,
            group_count: lowered.explicit_groups + 1,
            match_timeout,
        })
    }

    /// The source text.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn options(&self) -> PatternOptions {
        self.options
    }

    /// Number of groups, including the implicit whole-match group 0.
    pub fn group_count(&self) -> usize {
        self.group_count
    }

    pub fn match_timeout(&self) -> Duration {
        self.match_timeout
    }

    /// Whether the whole of `input` matches.
    ///
    /// Anchored at both ends: `[a-z]+` does not match `"ab1"`.
    pub fn is_full_match(&self, input: &str) -> Result<bool, MatchError> {
        full_match(&self.program, input, self.match_timeout)
    }
}

impl fmt::Debug for CompiledPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledPattern")
            .field("text", &self.text)
            .field("options", &self.options)
            .field("group_count", &self.group_count)
            .finish_non_exhaustive()
    }
}
