//! Constraint resolution.
//!
//! A parameter is constrained when it carries a `Match` attribute, or when
//! its type has exactly one conversion operator from `string` and that
//! operator's parameter carries one. Only that single level of indirection
//! is followed.

use eam_ir::{
    Attribute, Compilation, Parameter, Span, SymbolId, TypeId, MATCH_ATTRIBUTE,
};
use eam_regex::PatternOptions;

use crate::handler::{discover_handler_methods, HandlerMethods};

/// A pattern and its options, as declared by an attribute.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Constraint {
    pub pattern: String,
    pub options: PatternOptions,
    /// Where the declaring attribute sits.
    pub span: Span,
}

impl Constraint {
    /// Read `(pattern)` or `(pattern, options)` from an attribute.
    ///
    /// Returns `None` when the first argument is not a string or the second
    /// is not an integer.
    pub fn from_attribute(attribute: &Attribute) -> Option<Self> {
        let (pattern, rest) = attribute.args.split_first()?;
        let options = match rest.first() {
            Some(raw) => PatternOptions::from_raw(raw.as_int()?),
            None => PatternOptions::empty(),
        };
        Some(Constraint {
            pattern: pattern.as_str()?.to_owned(),
            options,
            span: attribute.span,
        })
    }
}

/// What a parameter's type can do with a value that is not already of
/// that type.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Capability<'a> {
    None,
    /// The single conversion operator from `string`; holds its parameter.
    ConversionOperator(&'a Parameter),
    /// The type is an interpolated-string handler.
    HandlerMethods(HandlerMethods<'a>),
}

/// Ask the type table what `ty` offers.
pub fn capability(compilation: &Compilation, ty: TypeId) -> Capability<'_> {
    let Some(def) = compilation.types.get(ty) else {
        return Capability::None;
    };
    if def.is_interpolation_handler {
        return Capability::HandlerMethods(discover_handler_methods(compilation, ty));
    }

    let mut from_string = compilation
        .conversion_operators(ty)
        .filter_map(|(_, op)| match op.params.as_slice() {
            [param] if param.ty == TypeId::STRING => Some(param),
            _ => None,
        });
    match (from_string.next(), from_string.next()) {
        (Some(param), None) => Capability::ConversionOperator(param),
        _ => Capability::None,
    }
}

/// The constraint a parameter imposes on its argument, if any.
pub fn parameter_constraint(compilation: &Compilation, param: &Parameter) -> Option<Constraint> {
    if let Some(attribute) = param.attribute(MATCH_ATTRIBUTE) {
        return Constraint::from_attribute(attribute);
    }
    match capability(compilation, param.ty) {
        Capability::ConversionOperator(inner) => inner
            .attribute(MATCH_ATTRIBUTE)
            .and_then(Constraint::from_attribute),
        Capability::None | Capability::HandlerMethods(_) => None,
    }
}

/// The parameter that receives the argument at `index`.
///
/// A trailing variadic parameter receives every argument past the fixed
/// positions.
pub fn parameter_at(params: &[Parameter], index: usize) -> Option<&Parameter> {
    params
        .get(index)
        .or_else(|| params.last().filter(|last| last.is_params))
}

/// The declared parameters of a bound member.
pub(crate) fn member_parameters(compilation: &Compilation, member: Option<SymbolId>) -> &[Parameter] {
    member
        .and_then(|id| compilation.symbols.get(id))
        .map(eam_ir::Symbol::parameters)
        .unwrap_or_default()
}
