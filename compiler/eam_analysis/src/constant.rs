//! Constant resolution.
//!
//! Reduces an argument expression to a value known at compile time, or
//! reports that none exists. Nothing is evaluated: the resolver only reads
//! literals, values the host already folded, and `const` bindings.

use eam_ir::{Compilation, Constant, ExprId, ExprKind};

/// How many `const` references are followed before giving up.
const MAX_REF_DEPTH: u8 = 16;

/// The compile-time value of `expr`, if the host can prove one.
pub fn resolve_constant(compilation: &Compilation, expr: ExprId) -> Option<Constant> {
    resolve(compilation, expr, 0)
}

fn resolve(compilation: &Compilation, expr: ExprId, depth: u8) -> Option<Constant> {
    if let Some(folded) = compilation.folded_constant(expr) {
        return Some(folded.clone());
    }

    match &compilation.exprs.get(expr)?.kind {
        ExprKind::Literal(value) => Some(value.clone()),
        ExprKind::Paren(inner) => resolve(compilation, *inner, depth),
        ExprKind::Ref(symbol) => {
            if depth >= MAX_REF_DEPTH {
                return None;
            }
            let symbol = compilation.symbols.get(*symbol)?;
            if !symbol.is_const {
                return None;
            }
            resolve(compilation, symbol.single_initializer()?, depth + 1)
        }
        // Calls, slices, and unfolded arithmetic are runtime values.
        ExprKind::Invoke { .. }
        | ExprKind::Index { .. }
        | ExprKind::New { .. }
        | ExprKind::ImplicitNew { .. }
        | ExprKind::Interpolated(_)
        | ExprKind::Binary { .. }
        | ExprKind::Slice { .. }
        | ExprKind::OutVar(_) => None,
    }
}
