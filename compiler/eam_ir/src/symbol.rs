//! Symbols: methods, properties, fields, and locals with their attributes.

use smallvec::SmallVec;

use crate::{Constant, ExprId, RefKind, Span, SymbolId, TypeId};

/// Attribute declaring a pattern constraint on a parameter:
/// `Match(pattern, options = 0)`.
pub const MATCH_ATTRIBUTE: &str = "Match";

/// Attribute declaring that a method returns a pattern generated from
/// `GeneratedRegex(pattern, options = 0)`.
pub const GENERATED_PATTERN_ATTRIBUTE: &str = "GeneratedRegex";

/// An attribute application with its positional constant arguments.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Attribute {
    pub name: String,
    pub args: Vec<Constant>,
    pub span: Span,
}

impl Attribute {
    pub fn new(name: impl Into<String>, args: Vec<Constant>) -> Self {
        Attribute {
            name: name.into(),
            args,
            span: Span::DUMMY,
        }
    }

    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Check the attribute class name, with or without the `Attribute` suffix.
    pub fn is(&self, name: &str) -> bool {
        self.name == name
            || self
                .name
                .strip_suffix("Attribute")
                .is_some_and(|short| short == name)
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Parameter {
    pub name: String,
    pub ty: TypeId,
    pub ref_kind: RefKind,
    /// Trailing variadic parameter (`params T[]`).
    pub is_params: bool,
    /// Has a default value.
    pub is_optional: bool,
    pub attributes: Vec<Attribute>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: TypeId) -> Self {
        Parameter {
            name: name.into(),
            ty,
            ref_kind: RefKind::Value,
            is_params: false,
            is_optional: false,
            attributes: Vec::new(),
        }
    }

    #[must_use]
    pub fn variadic(mut self) -> Self {
        self.is_params = true;
        self
    }

    #[must_use]
    pub fn optional(mut self) -> Self {
        self.is_optional = true;
        self
    }

    #[must_use]
    pub fn out(mut self) -> Self {
        self.ref_kind = RefKind::Out;
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Optional and variadic parameters may be left out at a call site.
    pub fn may_be_omitted(&self) -> bool {
        self.is_optional || self.is_params
    }

    /// First attribute with the given class name.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.is(name))
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum MethodKind {
    Ordinary,
    Constructor,
    ImplicitConversion,
    ExplicitConversion,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct MethodSymbol {
    pub kind: MethodKind,
    pub params: Vec<Parameter>,
    pub return_type: TypeId,
    /// Invoked with the first parameter bound to the receiver.
    pub is_extension: bool,
}

/// A property; an indexer when `params` is non-empty.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct PropertySymbol {
    pub ty: TypeId,
    pub params: Vec<Parameter>,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum SymbolKind {
    Method(MethodSymbol),
    Property(PropertySymbol),
    Field { ty: TypeId },
    Local { ty: TypeId },
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub containing_type: Option<TypeId>,
    pub attributes: Vec<Attribute>,
    /// Declared `const`: its single initializer is a compile-time constant.
    pub is_const: bool,
    /// Every expression the host knows can flow into this symbol: field and
    /// local initializers, later assignments, property initializers, and
    /// expression bodies / returned expressions of methods and getters.
    pub initializers: SmallVec<[ExprId; 1]>,
    pub span: Span,
}

impl Symbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind) -> Self {
        Symbol {
            name: name.into(),
            kind,
            containing_type: None,
            attributes: Vec::new(),
            is_const: false,
            initializers: SmallVec::new(),
            span: Span::DUMMY,
        }
    }

    /// Declared parameters of a method or indexer; empty otherwise.
    pub fn parameters(&self) -> &[Parameter] {
        match &self.kind {
            SymbolKind::Method(m) => &m.params,
            SymbolKind::Property(p) => &p.params,
            SymbolKind::Field { .. } | SymbolKind::Local { .. } => &[],
        }
    }

    pub fn as_method(&self) -> Option<&MethodSymbol> {
        match &self.kind {
            SymbolKind::Method(m) => Some(m),
            _ => None,
        }
    }

    /// The value type: field/local/property type or method return type.
    pub fn value_type(&self) -> TypeId {
        match &self.kind {
            SymbolKind::Method(m) => m.return_type,
            SymbolKind::Property(p) => p.ty,
            SymbolKind::Field { ty } | SymbolKind::Local { ty } => *ty,
        }
    }

    /// First attribute with the given class name.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.is(name))
    }

    /// The initializer, when there is exactly one.
    pub fn single_initializer(&self) -> Option<ExprId> {
        match self.initializers.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }
}

/// All symbols of a compilation, addressed by [`SymbolId`].
#[derive(Clone, Default, Debug)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            symbols: Vec::new(),
        }
    }

    pub fn add(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId::from_len(self.symbols.len());
        self.symbols.push(symbol);
        id
    }

    #[inline]
    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.index())
    }

    #[inline]
    pub fn get_mut(&mut self, id: SymbolId) -> Option<&mut Symbol> {
        self.symbols.get_mut(id.index())
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_suffix_is_optional() {
        let attr = Attribute::new("MatchAttribute", vec![Constant::str("^a$")]);
        assert!(attr.is(MATCH_ATTRIBUTE));
        assert!(attr.is("MatchAttribute"));
        assert!(!attr.is("Matches"));
    }

    #[test]
    fn test_single_initializer() {
        let mut sym = Symbol::new("s_regex", SymbolKind::Field { ty: TypeId::REGEX });
        assert_eq!(sym.single_initializer(), None);

        sym.initializers.push(ExprId::new(4));
        assert_eq!(sym.single_initializer(), Some(ExprId::new(4)));

        sym.initializers.push(ExprId::new(9));
        assert_eq!(sym.single_initializer(), None);
    }

    #[test]
    fn test_parameters_by_kind() {
        let method = Symbol::new(
            "Static",
            SymbolKind::Method(MethodSymbol {
                kind: MethodKind::Ordinary,
                params: vec![Parameter::new("a", TypeId::STRING)],
                return_type: TypeId::STRING,
                is_extension: false,
            }),
        );
        assert_eq!(method.parameters().len(), 1);
        assert_eq!(method.value_type(), TypeId::STRING);

        let field = Symbol::new("f", SymbolKind::Field { ty: TypeId::INT });
        assert!(field.parameters().is_empty());
        assert!(field.as_method().is_none());
    }

    #[test]
    fn test_table_round_trip() {
        let mut table = SymbolTable::new();
        let id = table.add(Symbol::new("x", SymbolKind::Local { ty: TypeId::STRING }));
        assert_eq!(table.get(id).map(|s| s.name.as_str()), Some("x"));
        assert!(table.get(SymbolId::new(5)).is_none());
        assert_eq!(table.len(), 1);
    }
}
