//! Incremental construction of a [`Compilation`].
//!
//! Hosts that lower their own syntax trees can fill a `Compilation`
//! directly; this builder covers the common shapes in a few calls each and
//! hands out increasing spans so diagnostics sort in creation order.

use crate::{
    Argument, ArgumentList, BaseInitializer, Compilation, Constant, DeclId, ExprId, ExprKind,
    InterpolatedPart, MethodKind, MethodSymbol, Parameter, PropertySymbol, Span, Symbol,
    SymbolId, SymbolKind, TypeDef, TypeId, TypeKind, VariableDeclarator,
};

/// Builder for [`Compilation`]s.
#[derive(Default, Debug)]
pub struct CompilationBuilder {
    compilation: Compilation,
    cursor: u32,
}

impl CompilationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(self) -> Compilation {
        self.compilation
    }

    pub fn compilation(&self) -> &Compilation {
        &self.compilation
    }

    pub fn compilation_mut(&mut self) -> &mut Compilation {
        &mut self.compilation
    }

    /// A fresh span of `len` bytes after every span handed out so far.
    pub fn next_span(&mut self, len: usize) -> Span {
        let len = u32::try_from(len.max(1)).unwrap_or(u32::MAX);
        let start = self.cursor;
        let end = start.saturating_add(len);
        // Leave a gap so adjacent spans never touch.
        self.cursor = end.saturating_add(1);
        Span::new(start, end)
    }

    // Types

    pub fn class(&mut self, name: &str) -> TypeId {
        self.compilation
            .types
            .add(TypeDef::new(name, TypeKind::Class))
    }

    /// A type marked as an interpolated-string handler.
    pub fn handler_type(&mut self, name: &str) -> TypeId {
        let mut def = TypeDef::new(name, TypeKind::Class);
        def.is_interpolation_handler = true;
        self.compilation.types.add(def)
    }

    pub fn generic_param(&mut self, name: &str, constraints: Vec<TypeId>) -> TypeId {
        self.compilation
            .types
            .add(TypeDef::new(name, TypeKind::GenericParam { constraints }))
    }

    pub fn array_of(&mut self, element: TypeId) -> TypeId {
        let name = format!(
            "{}[]",
            self.compilation
                .types
                .get(element)
                .map_or("?", |def| def.name.as_str())
        );
        self.compilation
            .types
            .add(TypeDef::new(name, TypeKind::Array(element)))
    }

    // Symbols

    /// Add a symbol, registering it as a member of `owner`.
    pub fn symbol(&mut self, owner: Option<TypeId>, mut symbol: Symbol) -> SymbolId {
        symbol.containing_type = owner;
        if symbol.span == Span::DUMMY {
            symbol.span = self.next_span(symbol.name.len());
        }
        let id = self.compilation.symbols.add(symbol);
        if let Some(def) = owner.and_then(|ty| self.compilation.types.get_mut(ty)) {
            def.members.push(id);
        }
        id
    }

    pub fn method(
        &mut self,
        owner: Option<TypeId>,
        name: &str,
        params: Vec<Parameter>,
        return_type: TypeId,
    ) -> SymbolId {
        self.add_method(owner, name, MethodKind::Ordinary, params, return_type, false)
    }

    /// A method invoked with its first parameter bound to the receiver.
    pub fn extension_method(
        &mut self,
        owner: Option<TypeId>,
        name: &str,
        params: Vec<Parameter>,
        return_type: TypeId,
    ) -> SymbolId {
        self.add_method(owner, name, MethodKind::Ordinary, params, return_type, true)
    }

    pub fn constructor(&mut self, owner: TypeId, params: Vec<Parameter>) -> SymbolId {
        self.add_method(
            Some(owner),
            ".ctor",
            MethodKind::Constructor,
            params,
            owner,
            false,
        )
    }

    /// `implicit operator Owner(param)`.
    pub fn implicit_operator(&mut self, owner: TypeId, param: Parameter) -> SymbolId {
        self.add_method(
            Some(owner),
            "op_Implicit",
            MethodKind::ImplicitConversion,
            vec![param],
            owner,
            false,
        )
    }

    /// `explicit operator Owner(param)`.
    pub fn explicit_operator(&mut self, owner: TypeId, param: Parameter) -> SymbolId {
        self.add_method(
            Some(owner),
            "op_Explicit",
            MethodKind::ExplicitConversion,
            vec![param],
            owner,
            false,
        )
    }

    pub fn indexer(&mut self, owner: TypeId, params: Vec<Parameter>, ty: TypeId) -> SymbolId {
        self.symbol(
            Some(owner),
            Symbol::new("this[]", SymbolKind::Property(PropertySymbol { ty, params })),
        )
    }

    fn add_method(
        &mut self,
        owner: Option<TypeId>,
        name: &str,
        kind: MethodKind,
        params: Vec<Parameter>,
        return_type: TypeId,
        is_extension: bool,
    ) -> SymbolId {
        let method = MethodSymbol {
            kind,
            params,
            return_type,
            is_extension,
        };
        self.symbol(owner, Symbol::new(name, SymbolKind::Method(method)))
    }

    /// A local, optionally `const`, with an optional initializer.
    pub fn local(
        &mut self,
        name: &str,
        ty: TypeId,
        initializer: Option<ExprId>,
        is_const: bool,
    ) -> SymbolId {
        let mut symbol = Symbol::new(name, SymbolKind::Local { ty });
        symbol.is_const = is_const;
        symbol.initializers.extend(initializer);
        self.symbol(None, symbol)
    }

    /// A field, with every initializer or assignment the host saw.
    pub fn field(
        &mut self,
        owner: TypeId,
        name: &str,
        ty: TypeId,
        initializers: &[ExprId],
    ) -> SymbolId {
        let mut symbol = Symbol::new(name, SymbolKind::Field { ty });
        symbol.initializers.extend_from_slice(initializers);
        self.symbol(Some(owner), symbol)
    }

    /// Record an expression that flows into `symbol` (a body, an
    /// assignment).
    pub fn add_initializer(&mut self, symbol: SymbolId, initializer: ExprId) {
        if let Some(symbol) = self.compilation.symbols.get_mut(symbol) {
            symbol.initializers.push(initializer);
        }
    }

    // Expressions

    pub fn expr(&mut self, kind: ExprKind, ty: Option<TypeId>) -> ExprId {
        let span = self.next_span(1);
        self.compilation.exprs.alloc(kind, span, ty)
    }

    /// A string literal.
    pub fn str(&mut self, text: &str) -> ExprId {
        let span = self.next_span(text.len() + 2);
        self.compilation.exprs.alloc(
            ExprKind::Literal(Constant::str(text)),
            span,
            Some(TypeId::STRING),
        )
    }

    pub fn lit(&mut self, value: Constant, ty: TypeId) -> ExprId {
        self.expr(ExprKind::Literal(value), Some(ty))
    }

    /// A reference typed by the symbol's value type.
    pub fn reference(&mut self, symbol: SymbolId) -> ExprId {
        let ty = self.compilation.symbols.get(symbol).map(Symbol::value_type);
        self.expr(ExprKind::Ref(symbol), ty)
    }

    pub fn paren(&mut self, inner: ExprId) -> ExprId {
        let ty = self.compilation.type_of(inner);
        self.expr(ExprKind::Paren(inner), ty)
    }

    /// `target[..]`, typed like `target`.
    pub fn slice(&mut self, target: ExprId) -> ExprId {
        let ty = self.compilation.type_of(target);
        self.expr(ExprKind::Slice { target }, ty)
    }

    pub fn invoke(
        &mut self,
        receiver: Option<ExprId>,
        method: SymbolId,
        args: impl IntoIterator<Item = Argument>,
    ) -> ExprId {
        let ty = self.compilation.symbols.get(method).map(Symbol::value_type);
        self.expr(
            ExprKind::Invoke {
                receiver,
                method: Some(method),
                args: args.into_iter().collect(),
            },
            ty,
        )
    }

    pub fn index(
        &mut self,
        receiver: ExprId,
        indexer: SymbolId,
        args: impl IntoIterator<Item = Argument>,
    ) -> ExprId {
        let ty = self.compilation.symbols.get(indexer).map(Symbol::value_type);
        self.expr(
            ExprKind::Index {
                receiver,
                indexer: Some(indexer),
                args: args.into_iter().collect(),
            },
            ty,
        )
    }

    /// `new T(args)`; `ctor` is `None` for types without a bound constructor.
    pub fn new_object(
        &mut self,
        ty: TypeId,
        ctor: Option<SymbolId>,
        args: impl IntoIterator<Item = Argument>,
    ) -> ExprId {
        self.expr(
            ExprKind::New {
                ty,
                ctor,
                args: args.into_iter().collect(),
            },
            Some(ty),
        )
    }

    /// Target-typed `new(args)`, typed by the constructor's owner.
    pub fn implicit_new(
        &mut self,
        ctor: SymbolId,
        args: impl IntoIterator<Item = Argument>,
    ) -> ExprId {
        let ty = self
            .compilation
            .symbols
            .get(ctor)
            .and_then(|s| s.containing_type);
        self.expr(
            ExprKind::ImplicitNew {
                ctor: Some(ctor),
                args: args.into_iter().collect(),
            },
            ty,
        )
    }

    /// `out var name`, declaring a local of type `ty`.
    pub fn out_var(&mut self, name: &str, ty: TypeId) -> Argument {
        let local = self.local(name, ty, None, false);
        let expr = self.expr(ExprKind::OutVar(local), Some(ty));
        Argument::out(expr)
    }

    /// An interpolated string typed as `string`.
    pub fn interpolated(&mut self, parts: Vec<InterpolatedPart>) -> ExprId {
        self.expr(ExprKind::Interpolated(parts), Some(TypeId::STRING))
    }

    pub fn literal_part(&mut self, text: &str) -> InterpolatedPart {
        InterpolatedPart::Literal {
            text: text.to_owned(),
            span: self.next_span(text.len()),
        }
    }

    pub fn hole(
        &mut self,
        value: ExprId,
        alignment: Option<ExprId>,
        format: Option<ExprId>,
    ) -> InterpolatedPart {
        InterpolatedPart::Hole {
            value,
            alignment,
            format,
            span: self.next_span(1),
        }
    }

    // Declarations

    /// `T name = initializer;`.
    pub fn declarator(&mut self, declared_type: TypeId, initializer: Option<ExprId>) -> DeclId {
        let span = self.next_span(1);
        self.compilation.add_declarator(VariableDeclarator {
            declared_type,
            initializer,
            span,
        })
    }

    /// `: Base(args)`.
    pub fn base_initializer(
        &mut self,
        ctor: Option<SymbolId>,
        args: impl IntoIterator<Item = Argument>,
    ) -> DeclId {
        let span = self.next_span(1);
        let args: ArgumentList = args.into_iter().collect();
        self.compilation
            .add_base_initializer(BaseInitializer { ctor, args, span })
    }
}
