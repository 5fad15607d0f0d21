//! Expressions as bound by the host compiler.
//!
//! Only the call-site shapes the analyzer distinguishes get their own kind;
//! everything else the host lowers to `Binary`, `Slice`, or a `Ref` so the
//! constant resolver can see that it is *not* a literal.

use smallvec::SmallVec;

use crate::{Constant, ExprId, Span, SymbolId, TypeId};

/// How an argument is passed.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum RefKind {
    #[default]
    Value,
    Ref,
    Out,
    In,
}

/// One argument at a call site.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Argument {
    pub expr: ExprId,
    /// Set for named arguments (`name: value`).
    pub name: Option<String>,
    pub ref_kind: RefKind,
}

impl Argument {
    /// A positional by-value argument.
    pub fn positional(expr: ExprId) -> Self {
        Argument {
            expr,
            name: None,
            ref_kind: RefKind::Value,
        }
    }

    /// A named by-value argument.
    pub fn named(name: impl Into<String>, expr: ExprId) -> Self {
        Argument {
            expr,
            name: Some(name.into()),
            ref_kind: RefKind::Value,
        }
    }

    /// An `out` argument.
    pub fn out(expr: ExprId) -> Self {
        Argument {
            expr,
            name: None,
            ref_kind: RefKind::Out,
        }
    }
}

/// Argument lists are almost always short.
pub type ArgumentList = SmallVec<[Argument; 4]>;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Coalesce,
}

/// A segment of an interpolated string.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum InterpolatedPart {
    /// Literal text between holes.
    Literal { text: String, span: Span },
    /// `{value,alignment:format}`.
    Hole {
        value: ExprId,
        alignment: Option<ExprId>,
        format: Option<ExprId>,
        span: Span,
    },
}

impl InterpolatedPart {
    pub fn span(&self) -> Span {
        match self {
            InterpolatedPart::Literal { span, .. } | InterpolatedPart::Hole { span, .. } => *span,
        }
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum ExprKind {
    Literal(Constant),
    /// A name bound to a local, field, property, parameter, or method group.
    Ref(SymbolId),
    Paren(ExprId),
    /// `receiver.method(args)` or `method(args)`.
    ///
    /// For extension methods invoked with a receiver, `args` excludes the
    /// receiver; the method's first parameter binds to it.
    Invoke {
        receiver: Option<ExprId>,
        method: Option<SymbolId>,
        args: ArgumentList,
    },
    /// `receiver[args]`.
    Index {
        receiver: ExprId,
        indexer: Option<SymbolId>,
        args: ArgumentList,
    },
    /// `new T(args)`.
    New {
        ty: TypeId,
        ctor: Option<SymbolId>,
        args: ArgumentList,
    },
    /// Target-typed `new(args)`.
    ImplicitNew {
        ctor: Option<SymbolId>,
        args: ArgumentList,
    },
    Interpolated(Vec<InterpolatedPart>),
    Binary {
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
    },
    /// `target[..]` and other range slicing.
    Slice { target: ExprId },
    /// `out var name` declaration at an argument position.
    OutVar(SymbolId),
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
    /// The type the host inferred, if any.
    pub ty: Option<TypeId>,
}

/// Arena of all expressions in a compilation.
#[derive(Clone, Default, Debug)]
pub struct ExprArena {
    exprs: Vec<Expr>,
}

impl ExprArena {
    pub fn new() -> Self {
        ExprArena { exprs: Vec::new() }
    }

    /// Allocate an expression and return its id.
    pub fn alloc(&mut self, kind: ExprKind, span: Span, ty: Option<TypeId>) -> ExprId {
        let id = ExprId::from_len(self.exprs.len());
        self.exprs.push(Expr { kind, span, ty });
        id
    }

    #[inline]
    pub fn get(&self, id: ExprId) -> Option<&Expr> {
        self.exprs.get(id.index())
    }

    /// Iterate over every expression with its id.
    pub fn iter(&self) -> impl Iterator<Item = (ExprId, &Expr)> {
        self.exprs
            .iter()
            .enumerate()
            .map(|(i, expr)| (ExprId::from_len(i), expr))
    }

    /// Number of allocated expressions.
    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    /// Returns `true` if no expressions have been allocated.
    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }
}
