//! Call-site mapping.
//!
//! Turns one syntax node into the list of (subject, constraint) pairs that
//! need validating. A subject is either an argument expression or a literal
//! segment of an interpolated string.

use eam_ir::{
    Argument, Compilation, ExprId, ExprKind, InterpolatedPart, Parameter, Span, SyntaxNode,
    TypeId,
};

use crate::constraint::{
    capability, member_parameters, parameter_at, parameter_constraint, Capability, Constraint,
};
use crate::handler::{select_formatted, HandlerMethods, HoleTypes};

/// What a constraint is checked against.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Subject {
    /// An expression whose constant value is checked.
    Expr(ExprId),
    /// Literal text of an interpolated string.
    Text { text: String, span: Span },
}

impl Subject {
    /// Source location diagnostics anchor to.
    pub fn span(&self, compilation: &Compilation) -> Span {
        match self {
            Subject::Expr(id) => compilation
                .exprs
                .get(*id)
                .map_or(Span::DUMMY, |expr| expr.span),
            Subject::Text { span, .. } => *span,
        }
    }
}

/// One pending check.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Check {
    pub subject: Subject,
    pub constraint: Constraint,
}

/// Every check implied by `node`.
#[tracing::instrument(level = "trace", skip(compilation))]
pub fn map_node(compilation: &Compilation, node: SyntaxNode) -> Vec<Check> {
    let mut checks = Vec::new();
    match node {
        SyntaxNode::Expr(id) => map_expr(compilation, id, &mut checks),
        SyntaxNode::Declarator(id) => {
            if let Some(decl) = compilation.declarator(id) {
                map_declarator(compilation, decl.declared_type, decl.initializer, &mut checks);
            }
        }
        SyntaxNode::BaseInitializer(id) => {
            if let Some(base) = compilation.base_initializer(id) {
                let params = member_parameters(compilation, base.ctor);
                map_arguments(compilation, params, &base.args, &mut checks);
            }
        }
    }
    checks
}

fn map_expr(compilation: &Compilation, id: ExprId, checks: &mut Vec<Check>) {
    let Some(expr) = compilation.exprs.get(id) else {
        return;
    };
    match &expr.kind {
        ExprKind::Invoke {
            receiver,
            method,
            args,
        } => {
            let params = member_parameters(compilation, *method);
            let is_extension_call = receiver.is_some()
                && method
                    .and_then(|m| compilation.symbols.get(m))
                    .and_then(eam_ir::Symbol::as_method)
                    .is_some_and(|m| m.is_extension);
            // The receiver binds to an extension method's first parameter.
            let params = if is_extension_call {
                params.get(1..).unwrap_or_default()
            } else {
                params
            };
            map_arguments(compilation, params, args, checks);
        }
        ExprKind::Index { indexer, args, .. } => {
            map_arguments(compilation, member_parameters(compilation, *indexer), args, checks);
        }
        ExprKind::New { ctor, args, .. } | ExprKind::ImplicitNew { ctor, args } => {
            map_arguments(compilation, member_parameters(compilation, *ctor), args, checks);
        }
        ExprKind::Literal(_)
        | ExprKind::Ref(_)
        | ExprKind::Paren(_)
        | ExprKind::Interpolated(_)
        | ExprKind::Binary { .. }
        | ExprKind::Slice { .. }
        | ExprKind::OutVar(_) => {}
    }
}

/// `T name = "text";` where `T` converts from `string` through a
/// constrained operator.
fn map_declarator(
    compilation: &Compilation,
    declared_type: TypeId,
    initializer: Option<ExprId>,
    checks: &mut Vec<Check>,
) {
    let Some(init) = initializer else {
        return;
    };
    if compilation.type_of(init) != Some(TypeId::STRING) {
        return;
    }
    if let Capability::ConversionOperator(param) = capability(compilation, declared_type) {
        if let Some(constraint) = parameter_constraint(compilation, param) {
            checks.push(Check {
                subject: Subject::Expr(init),
                constraint,
            });
        }
    }
}

/// Pair arguments with the parameters that receive them.
///
/// Named arguments bind by name. Once a named argument appears, later
/// positional arguments are not mapped. Omitted arguments are not checked.
fn map_arguments(
    compilation: &Compilation,
    params: &[Parameter],
    args: &[Argument],
    checks: &mut Vec<Check>,
) {
    let mut seen_named = false;
    for (index, arg) in args.iter().enumerate() {
        let param = match &arg.name {
            Some(name) => {
                seen_named = true;
                params.iter().find(|p| p.name == *name)
            }
            None if seen_named => None,
            None => parameter_at(params, index),
        };
        if let Some(param) = param {
            map_argument(compilation, param, arg.expr, checks);
        }
    }
}

fn map_argument(compilation: &Compilation, param: &Parameter, arg: ExprId, checks: &mut Vec<Check>) {
    if let Some(parts) = interpolated_parts(compilation, arg) {
        if let Capability::HandlerMethods(handler) = capability(compilation, param.ty) {
            map_interpolation(compilation, &handler, parts, checks);
            return;
        }
    }
    if let Some(constraint) = parameter_constraint(compilation, param) {
        checks.push(Check {
            subject: Subject::Expr(arg),
            constraint,
        });
    }
}

fn interpolated_parts(compilation: &Compilation, mut expr: ExprId) -> Option<&[InterpolatedPart]> {
    loop {
        match &compilation.exprs.get(expr)?.kind {
            ExprKind::Paren(inner) => expr = *inner,
            ExprKind::Interpolated(parts) => return Some(parts),
            _ => return None,
        }
    }
}

fn map_interpolation(
    compilation: &Compilation,
    handler: &HandlerMethods<'_>,
    parts: &[InterpolatedPart],
    checks: &mut Vec<Check>,
) {
    let literal_constraint = handler
        .literal
        .and_then(|method| method.params.first())
        .and_then(|param| parameter_constraint(compilation, param));

    for part in parts {
        match part {
            InterpolatedPart::Literal { text, span } => {
                if let Some(constraint) = &literal_constraint {
                    checks.push(Check {
                        subject: Subject::Text {
                            text: text.clone(),
                            span: *span,
                        },
                        constraint: constraint.clone(),
                    });
                }
            }
            InterpolatedPart::Hole {
                value,
                alignment,
                format,
                ..
            } => {
                let Some(value_ty) = compilation.type_of(*value) else {
                    tracing::debug!(?value, "hole value has no type; skipped");
                    continue;
                };
                let hole = HoleTypes {
                    value: value_ty,
                    alignment: alignment.and_then(|e| compilation.type_of(e)),
                    format: format.and_then(|e| compilation.type_of(e)),
                };
                let Some((tier, slots)) = select_formatted(compilation, handler, hole) else {
                    tracing::debug!(?hole, "no formatted overload accepts the hole; skipped");
                    continue;
                };
                tracing::trace!(?tier, "formatted overload selected");

                let pieces = [
                    (Some(*value), Some(slots.value)),
                    (*alignment, slots.alignment),
                    (*format, slots.format),
                ];
                for (expr, param) in pieces {
                    let (Some(expr), Some(param)) = (expr, param) else {
                        continue;
                    };
                    if let Some(constraint) = parameter_constraint(compilation, param) {
                        checks.push(Check {
                            subject: Subject::Expr(expr),
                            constraint,
                        });
                    }
                }
            }
        }
    }
}
