//! Capture-arity validation.
//!
//! Destructuring accessors have the shape
//! `bool Match(this Regex regex, string input, out Group g1, ..., out Group gN)`.
//! A call binds `N` outputs, and the pattern it runs must produce exactly
//! `N` groups (group 0 included). The pattern is the receiver, or the first
//! argument when the accessor is called in static form, and is found as:
//!
//! 1. an invoked method carrying a generated-pattern attribute,
//! 2. a pattern constructed at the call site from constant arguments
//!    (`new Regex(..)` or target-typed `new(..)`),
//! 3. a symbol whose single initializer is one of the above.

use std::sync::Arc;

use eam_diagnostic::{Diagnostic, ErrorCode};
use eam_ir::{
    Argument, Compilation, ExprId, ExprKind, Parameter, RefKind, Span, Symbol, TypeId,
    GENERATED_PATTERN_ATTRIBUTE,
};
use eam_regex::{CompiledPattern, PatternCache, PatternOptions};

use crate::constant::resolve_constant;
use crate::constraint::Constraint;

/// Accessors are generated for `1..=MAX_DESTRUCTURE_ARITY` outputs.
pub const MAX_DESTRUCTURE_ARITY: usize = 15;

/// Name every destructuring accessor shares.
pub const DESTRUCTURE_METHOD: &str = "Match";

/// Expected group count (when known) against the outputs a call binds.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ArityCheck {
    /// Groups the pattern produces; `None` when the pattern is unknown.
    pub expected: Option<usize>,
    /// Outputs the call binds.
    pub actual: usize,
}

/// Number of `out` group outputs, if `symbol` is a destructuring accessor.
pub fn destructure_arity(symbol: &Symbol) -> Option<usize> {
    let method = symbol.as_method()?;
    if symbol.name != DESTRUCTURE_METHOD || method.return_type != TypeId::BOOL {
        return None;
    }
    let [regex, input, outputs @ ..] = method.params.as_slice() else {
        return None;
    };
    if !is_passed(regex, TypeId::REGEX, RefKind::Value)
        || !is_passed(input, TypeId::STRING, RefKind::Value)
    {
        return None;
    }
    let all_groups = outputs
        .iter()
        .all(|p| is_passed(p, TypeId::GROUP, RefKind::Out));
    (!outputs.is_empty() && all_groups).then_some(outputs.len())
}

fn is_passed(param: &Parameter, ty: TypeId, ref_kind: RefKind) -> bool {
    param.ty == ty && param.ref_kind == ref_kind
}

/// Check the invocation at `expr`, if it calls a destructuring accessor.
pub fn check_arity(
    compilation: &Compilation,
    cache: &PatternCache,
    expr: ExprId,
    max_arity: usize,
) -> Option<ArityCheck> {
    let ExprKind::Invoke {
        receiver,
        method: Some(method),
        args,
    } = &compilation.exprs.get(expr)?.kind
    else {
        return None;
    };
    let symbol = compilation.symbols.get(*method)?;
    let actual = destructure_arity(symbol)?;
    if actual > max_arity {
        return None;
    }
    // `Extensions.Match(regex, input, out ...)` passes the pattern first.
    let pattern = match receiver {
        Some(receiver) => *receiver,
        None if symbol.as_method()?.is_extension => args.first()?.expr,
        None => return None,
    };

    let expected = receiver_pattern(compilation, cache, pattern).map(|p| p.group_count());
    tracing::trace!(?expected, actual, "destructuring accessor checked");
    Some(ArityCheck { expected, actual })
}

/// The diagnostic an arity check produces, anchored at `span`.
pub fn arity_diagnostic(check: ArityCheck, span: Span) -> Option<Diagnostic> {
    match check.expected {
        Some(expected) if expected == check.actual => None,
        Some(expected) => Some(
            Diagnostic::new(ErrorCode::EAM004)
                .with_message(format!(
                    "pattern produces {expected} groups, but {} are destructured",
                    check.actual
                ))
                .with_label(span, format!("expected {expected} outputs"))
                .with_note("group 0, the whole match, counts as a group"),
        ),
        None => Some(
            Diagnostic::new(ErrorCode::EAM005)
                .with_message(format!(
                    "cannot determine the pattern destructured into {} outputs",
                    check.actual
                ))
                .with_label(span, "pattern is not statically known"),
        ),
    }
}

/// Rules 1 to 3 applied to the accessor's pattern expression.
fn receiver_pattern(
    compilation: &Compilation,
    cache: &PatternCache,
    receiver: ExprId,
) -> Option<Arc<CompiledPattern>> {
    let receiver = skip_parens(compilation, receiver)?;
    if let Some(pattern) = direct_pattern(compilation, cache, receiver) {
        return Some(pattern);
    }
    let symbol = match &compilation.exprs.get(receiver)?.kind {
        ExprKind::Ref(symbol)
        | ExprKind::Invoke {
            method: Some(symbol),
            ..
        } => compilation.symbols.get(*symbol)?,
        _ => return None,
    };
    let init = skip_parens(compilation, symbol.single_initializer()?)?;
    direct_pattern(compilation, cache, init)
}

/// Rules 1 and 2.
fn direct_pattern(
    compilation: &Compilation,
    cache: &PatternCache,
    expr: ExprId,
) -> Option<Arc<CompiledPattern>> {
    match &compilation.exprs.get(expr)?.kind {
        ExprKind::Invoke {
            method: Some(method),
            ..
        } => generated_pattern(compilation.symbols.get(*method)?, cache),
        ExprKind::New { ty, args, .. } if *ty == TypeId::REGEX => {
            constructed_pattern(compilation, cache, args)
        }
        ExprKind::ImplicitNew {
            ctor: Some(ctor),
            args,
        } if compilation
            .symbols
            .get(*ctor)
            .is_some_and(|s| s.containing_type == Some(TypeId::REGEX)) =>
        {
            constructed_pattern(compilation, cache, args)
        }
        _ => None,
    }
}

/// `new Regex(pattern)` or `new Regex(pattern, options)` from constants.
fn constructed_pattern(
    compilation: &Compilation,
    cache: &PatternCache,
    args: &[Argument],
) -> Option<Arc<CompiledPattern>> {
    let (pattern, rest) = args.split_first()?;
    let text = resolve_constant(compilation, pattern.expr)?;
    let options = rest
        .first()
        .and_then(|arg| resolve_constant(compilation, arg.expr))
        .and_then(|value| value.as_int())
        .map_or(PatternOptions::empty(), PatternOptions::from_raw);
    cache.get(text.as_str()?, options)
}

fn generated_pattern(method: &Symbol, cache: &PatternCache) -> Option<Arc<CompiledPattern>> {
    let declared = Constraint::from_attribute(method.attribute(GENERATED_PATTERN_ATTRIBUTE)?)?;
    cache.get(&declared.pattern, declared.options)
}

fn skip_parens(compilation: &Compilation, mut expr: ExprId) -> Option<ExprId> {
    while let ExprKind::Paren(inner) = &compilation.exprs.get(expr)?.kind {
        expr = *inner;
    }
    Some(expr)
}
