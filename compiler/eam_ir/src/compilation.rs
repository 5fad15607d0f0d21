//! The compilation a host hands to the analyzer.

use rustc_hash::FxHashMap;

use crate::{
    ArgumentList, Constant, DeclId, ExprArena, ExprId, ExprKind, MethodKind, MethodSymbol, Span,
    SymbolId, SymbolTable, TypeId, TypeTable,
};

/// Generic constraints are followed at most this deep when deciding
/// convertibility, which also guards against cyclic constraint lists.
const MAX_CONSTRAINT_DEPTH: u8 = 4;

/// `T name = initializer;` for locals and fields.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct VariableDeclarator {
    pub declared_type: TypeId,
    pub initializer: Option<ExprId>,
    pub span: Span,
}

/// `: Base(args)` on a derived declaration's primary constructor.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct BaseInitializer {
    pub ctor: Option<SymbolId>,
    pub args: ArgumentList,
    pub span: Span,
}

/// A syntax node the analyzer is invoked on.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum SyntaxNode {
    /// An invocation, element access, or (implicit) object creation.
    Expr(ExprId),
    Declarator(DeclId),
    BaseInitializer(DeclId),
}

/// Everything the host compiler knows, frozen for analysis.
///
/// Shared read-only across analysis threads.
#[derive(Clone, Default, Debug)]
pub struct Compilation {
    pub exprs: ExprArena,
    pub symbols: SymbolTable,
    pub types: TypeTable,
    /// Values the host's constant folding produced for non-literal expressions.
    folded: FxHashMap<ExprId, Constant>,
    declarators: Vec<VariableDeclarator>,
    base_initializers: Vec<BaseInitializer>,
}

impl Compilation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the host's folded value for an expression.
    pub fn fold(&mut self, expr: ExprId, value: Constant) {
        self.folded.insert(expr, value);
    }

    pub fn folded_constant(&self, expr: ExprId) -> Option<&Constant> {
        self.folded.get(&expr)
    }

    pub fn add_declarator(&mut self, declarator: VariableDeclarator) -> DeclId {
        let id = DeclId::from_len(self.declarators.len());
        self.declarators.push(declarator);
        id
    }

    pub fn declarator(&self, id: DeclId) -> Option<&VariableDeclarator> {
        self.declarators.get(id.index())
    }

    pub fn add_base_initializer(&mut self, initializer: BaseInitializer) -> DeclId {
        let id = DeclId::from_len(self.base_initializers.len());
        self.base_initializers.push(initializer);
        id
    }

    pub fn base_initializer(&self, id: DeclId) -> Option<&BaseInitializer> {
        self.base_initializers.get(id.index())
    }

    /// Every node the analyzer should visit, in source-independent order.
    pub fn nodes(&self) -> Vec<SyntaxNode> {
        let exprs = self.exprs.iter().filter_map(|(id, expr)| {
            matches!(
                expr.kind,
                ExprKind::Invoke { .. }
                    | ExprKind::Index { .. }
                    | ExprKind::New { .. }
                    | ExprKind::ImplicitNew { .. }
            )
            .then_some(SyntaxNode::Expr(id))
        });
        let declarators =
            (0..self.declarators.len()).map(|i| SyntaxNode::Declarator(DeclId::from_len(i)));
        let bases = (0..self.base_initializers.len())
            .map(|i| SyntaxNode::BaseInitializer(DeclId::from_len(i)));
        exprs.chain(declarators).chain(bases).collect()
    }

    /// The type the host inferred for an expression.
    pub fn type_of(&self, expr: ExprId) -> Option<TypeId> {
        self.exprs.get(expr).and_then(|e| e.ty)
    }

    /// Methods declared on `ty` with the given name, in declaration order.
    pub fn methods_named<'a>(
        &'a self,
        ty: TypeId,
        name: &'a str,
    ) -> impl Iterator<Item = (SymbolId, &'a MethodSymbol)> + 'a {
        self.methods(ty)
            .filter(move |(id, _)| self.symbols.get(*id).is_some_and(|s| s.name == name))
    }

    /// User-defined conversion operators declared on `ty`.
    pub fn conversion_operators(
        &self,
        ty: TypeId,
    ) -> impl Iterator<Item = (SymbolId, &MethodSymbol)> + '_ {
        self.methods(ty).filter(|(_, m)| {
            matches!(
                m.kind,
                MethodKind::ImplicitConversion | MethodKind::ExplicitConversion
            )
        })
    }

    fn methods(&self, ty: TypeId) -> impl Iterator<Item = (SymbolId, &MethodSymbol)> + '_ {
        self.types
            .get(ty)
            .map(|def| def.members.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|id| Some((*id, self.symbols.get(*id)?.as_method()?)))
    }

    /// Whether a value of type `from` converts implicitly to `to`.
    ///
    /// Covers identity, conversion to `object`, generic parameters (when all
    /// their constraints are satisfied), host-declared conversions, and
    /// user-defined implicit operators on either type.
    pub fn is_implicitly_convertible(&self, from: TypeId, to: TypeId) -> bool {
        self.convertible(from, to, 0)
    }

    fn convertible(&self, from: TypeId, to: TypeId, depth: u8) -> bool {
        if from == to || to == TypeId::OBJECT {
            return true;
        }
        if depth >= MAX_CONSTRAINT_DEPTH {
            return false;
        }
        if let Some(constraints) = self.types.get(to).and_then(|t| t.generic_constraints()) {
            return constraints
                .iter()
                .all(|c| self.convertible(from, *c, depth + 1));
        }
        if self.types.has_declared_implicit(from, to) {
            return true;
        }
        [from, to].into_iter().any(|owner| {
            self.conversion_operators(owner).any(|(_, m)| {
                m.kind == MethodKind::ImplicitConversion
                    && m.return_type == to
                    && matches!(m.params.as_slice(), [p] if p.ty == from)
            })
        })
    }
}
