//! EAM IR - the host compiler as seen by the pattern-constraint analyzer.
//!
//! The analyzer never parses source text. The host compiler lowers what it
//! knows into this crate's flat model and hands the analyzer one
//! [`SyntaxNode`] at a time:
//! - Spans for source locations
//! - Index newtypes (`ExprId`, `SymbolId`, `TypeId`, `DeclId`)
//! - Constants the host can fold
//! - An expression arena with call-site shapes already bound to symbols
//! - Symbol and type tables, including attributes and conversion operators
//! - A [`CompilationBuilder`] for assembling compilations by hand
//!
//! # Design Philosophy
//!
//! - **Flatten Everything**: no `Box<Expr>`, expressions live in an arena
//!   and refer to each other by `ExprId`
//! - **Bind Early**: every call-site shape carries the member the host
//!   resolved for it (`None` when resolution failed or was ambiguous)
//! - **Immutable Once Built**: a [`Compilation`] is shared read-only across
//!   analysis threads

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-allocated types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod builder;
mod compilation;
mod constant;
mod expr;
mod ids;
mod span;
mod symbol;
mod types;

pub use builder::CompilationBuilder;
pub use compilation::{BaseInitializer, Compilation, SyntaxNode, VariableDeclarator};
pub use constant::Constant;
pub use expr::{
    Argument, ArgumentList, BinaryOp, Expr, ExprArena, ExprKind, InterpolatedPart, RefKind,
};
pub use ids::{DeclId, ExprId, SymbolId, TypeId};
pub use span::Span;
pub use symbol::{
    Attribute, MethodKind, MethodSymbol, Parameter, PropertySymbol, Symbol, SymbolKind,
    SymbolTable, GENERATED_PATTERN_ATTRIBUTE, MATCH_ATTRIBUTE,
};
pub use types::{TypeDef, TypeKind, TypeTable};
