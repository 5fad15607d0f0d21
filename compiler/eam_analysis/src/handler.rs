//! Interpolated-string handler discovery and overload selection.
//!
//! A handler receives an interpolated string piecewise: literal segments go
//! to its `AppendLiteral` method and holes to one of its `AppendFormatted`
//! overloads. Constraints on those methods' parameters apply to the pieces.
//!
//! Overloads for a hole are chosen in [`Strictness`] tiers. Within a tier
//! the first candidate in declaration order wins.

use eam_ir::{Compilation, MethodSymbol, Parameter, TypeId};
use smallvec::SmallVec;

const LITERAL_METHOD: &str = "AppendLiteral";
const FORMATTED_METHOD: &str = "AppendFormatted";
const ALIGNMENT_PARAM: &str = "alignment";
const FORMAT_PARAM: &str = "format";

/// How closely an overload must fit a hole's types.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum Strictness {
    /// Every parameter type equals the supplied type.
    Exact,
    /// Implicitly convertible, through at least one constrained generic.
    ImplicitlyAndConstrained,
    /// Implicitly convertible, through at least one unconstrained generic.
    ImplicitlyAndUnconstrained,
    /// Implicitly convertible.
    Implicitly,
}

impl Strictness {
    /// Tiers in the order they are tried.
    pub const ALL: [Strictness; 4] = [
        Strictness::Exact,
        Strictness::ImplicitlyAndConstrained,
        Strictness::ImplicitlyAndUnconstrained,
        Strictness::Implicitly,
    ];
}

/// The append methods a handler type exposes.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct HandlerMethods<'a> {
    /// The preferred `AppendLiteral` overload.
    pub literal: Option<&'a MethodSymbol>,
    /// `AppendFormatted` overloads whose extra parameters are all optional
    /// `alignment`/`format` parameters, in declaration order.
    pub formatted: Vec<&'a MethodSymbol>,
}

/// Types supplied at one hole.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct HoleTypes {
    pub value: TypeId,
    pub alignment: Option<TypeId>,
    pub format: Option<TypeId>,
}

/// The parameters of a chosen `AppendFormatted` overload.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct FormattedSlots<'a> {
    pub value: &'a Parameter,
    pub alignment: Option<&'a Parameter>,
    pub format: Option<&'a Parameter>,
}

impl<'a> FormattedSlots<'a> {
    fn of(method: &'a MethodSymbol) -> Option<Self> {
        let (value, rest) = method.params.split_first()?;
        let mut slots = FormattedSlots {
            value,
            alignment: None,
            format: None,
        };
        for param in rest {
            if !param.may_be_omitted() {
                return None;
            }
            match param.name.as_str() {
                ALIGNMENT_PARAM => slots.alignment = Some(param),
                FORMAT_PARAM => slots.format = Some(param),
                _ => return None,
            }
        }
        Some(slots)
    }

    fn accepts(&self, compilation: &Compilation, hole: HoleTypes, tier: Strictness) -> bool {
        let supplied = [
            (Some(hole.value), Some(self.value)),
            (hole.alignment, self.alignment),
            (hole.format, self.format),
        ];

        let mut involved: SmallVec<[&Parameter; 3]> = SmallVec::new();
        for pair in supplied {
            match pair {
                (Some(ty), Some(param)) => {
                    let fits = if tier == Strictness::Exact {
                        ty == param.ty
                    } else {
                        compilation.is_implicitly_convertible(ty, param.ty)
                    };
                    if !fits {
                        return false;
                    }
                    involved.push(param);
                }
                (Some(_), None) => return false,
                (None, _) => {}
            }
        }

        let generic_constraints =
            |param: &&Parameter| compilation.types.get(param.ty).and_then(|t| t.generic_constraints());
        match tier {
            Strictness::Exact | Strictness::Implicitly => true,
            Strictness::ImplicitlyAndConstrained => involved
                .iter()
                .filter_map(generic_constraints)
                .any(|constraints| !constraints.is_empty()),
            Strictness::ImplicitlyAndUnconstrained => involved
                .iter()
                .filter_map(generic_constraints)
                .any(<[TypeId]>::is_empty),
        }
    }
}

/// Collect the append methods of handler type `ty`.
pub fn discover_handler_methods(compilation: &Compilation, ty: TypeId) -> HandlerMethods<'_> {
    let literal = compilation
        .methods_named(ty, LITERAL_METHOD)
        .map(|(_, method)| method)
        .filter(|method| match method.params.split_first() {
            Some((first, rest)) => {
                compilation.is_implicitly_convertible(TypeId::STRING, first.ty)
                    && rest.iter().all(Parameter::may_be_omitted)
            }
            None => false,
        })
        // Prefer an exact `string` parameter, then no trailing parameters.
        .min_by_key(|method| {
            let exact = method
                .params
                .first()
                .is_some_and(|p| p.ty == TypeId::STRING);
            (!exact, method.params.len() > 1)
        });

    let formatted = compilation
        .methods_named(ty, FORMATTED_METHOD)
        .map(|(_, method)| method)
        .filter(|method| FormattedSlots::of(method).is_some())
        .collect();

    HandlerMethods { literal, formatted }
}

/// Pick the `AppendFormatted` overload a hole binds to.
pub fn select_formatted<'a>(
    compilation: &Compilation,
    handler: &HandlerMethods<'a>,
    hole: HoleTypes,
) -> Option<(Strictness, FormattedSlots<'a>)> {
    Strictness::ALL.into_iter().find_map(|tier| {
        handler
            .formatted
            .iter()
            .copied()
            .filter_map(FormattedSlots::of)
            .find(|slots| slots.accepts(compilation, hole, tier))
            .map(|slots| (tier, slots))
    })
}
