//! Match/validate engine and its diagnostic mapping.

use std::fmt;

use eam_diagnostic::{Diagnostic, ErrorCode};
use eam_ir::{Compilation, Span};
use eam_regex::{MatchError, PatternCache};

use crate::constant::resolve_constant;
use crate::constraint::Constraint;
use crate::mapper::Subject;

/// Result of validating one subject against one constraint.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum MatchOutcome {
    /// The value matches; nothing is reported.
    Passed,
    /// The value does not match.
    Failed,
    /// The value cannot be checked.
    Invalid(InvalidReason),
    /// Matching ran past its time budget.
    Timeout,
}

/// Why a value could not be checked.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum InvalidReason {
    /// The value is not a compile-time constant.
    NotConstant,
    /// The pattern does not compile or uses an unsupported construct.
    PatternUnusable,
}

impl fmt::Display for MatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MatchOutcome::Passed => "passed",
            MatchOutcome::Failed => "failed",
            MatchOutcome::Invalid(_) => "invalid",
            MatchOutcome::Timeout => "timeout",
        })
    }
}

/// Validate `subject` against `constraint`.
pub fn validate(
    cache: &PatternCache,
    compilation: &Compilation,
    subject: &Subject,
    constraint: &Constraint,
) -> MatchOutcome {
    let text = match subject {
        Subject::Expr(expr) => match resolve_constant(compilation, *expr) {
            Some(value) => value.to_text(),
            None => return MatchOutcome::Invalid(InvalidReason::NotConstant),
        },
        Subject::Text { text, .. } => text.clone(),
    };

    let Some(pattern) = cache.get(&constraint.pattern, constraint.options) else {
        return MatchOutcome::Invalid(InvalidReason::PatternUnusable);
    };

    match pattern.is_full_match(&text) {
        Ok(true) => MatchOutcome::Passed,
        Ok(false) => MatchOutcome::Failed,
        Err(MatchError::Timeout { .. }) => MatchOutcome::Timeout,
    }
}

/// The diagnostic an outcome produces, anchored at `span`.
pub fn outcome_diagnostic(
    outcome: MatchOutcome,
    constraint: &Constraint,
    span: Span,
) -> Option<Diagnostic> {
    let pattern = &constraint.pattern;
    let diagnostic = match outcome {
        MatchOutcome::Passed => return None,
        MatchOutcome::Failed => Diagnostic::new(ErrorCode::EAM001)
            .with_message(format!("argument does not match the pattern `{pattern}`"))
            .with_label(span, "fails the pattern"),
        MatchOutcome::Invalid(InvalidReason::NotConstant) => Diagnostic::new(ErrorCode::EAM002)
            .with_message(format!(
                "argument cannot be checked against the pattern `{pattern}`"
            ))
            .with_label(span, "not a compile-time constant")
            .with_note("the value must be a literal or constant"),
        MatchOutcome::Invalid(InvalidReason::PatternUnusable) => {
            Diagnostic::new(ErrorCode::EAM002)
                .with_message(format!(
                    "argument cannot be checked: the pattern `{pattern}` cannot be compiled"
                ))
                .with_label(span, "not checked")
                .with_note(
                    "the pattern is invalid or uses a construct the checker does not support",
                )
        }
        MatchOutcome::Timeout => Diagnostic::new(ErrorCode::EAM003)
            .with_message(format!("matching against the pattern `{pattern}` timed out"))
            .with_label(span, "match exceeded its time budget"),
    };

    Some(if constraint.span == Span::DUMMY {
        diagnostic
    } else {
        diagnostic.with_secondary_label(constraint.span, "pattern declared here")
    })
}
