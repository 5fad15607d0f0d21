//! Type table with pre-registered well-known types.

use rustc_hash::FxHashSet;

use crate::{SymbolId, TypeId};

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeKind {
    Object,
    String,
    /// Numeric, boolean, and character types.
    Primitive,
    Regex,
    Group,
    Enum,
    /// Classes, structs, and records.
    Class,
    Array(TypeId),
    /// A method's generic parameter with its constraint types.
    GenericParam { constraints: Vec<TypeId> },
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct TypeDef {
    pub name: String,
    pub kind: TypeKind,
    /// Methods (including constructors and conversion operators) and
    /// properties declared on the type.
    pub members: Vec<SymbolId>,
    /// Marked as an interpolated-string handler.
    pub is_interpolation_handler: bool,
}

impl TypeDef {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        TypeDef {
            name: name.into(),
            kind,
            members: Vec::new(),
            is_interpolation_handler: false,
        }
    }

    /// Generic parameter constraints, if this is a generic parameter.
    pub fn generic_constraints(&self) -> Option<&[TypeId]> {
        match &self.kind {
            TypeKind::GenericParam { constraints } => Some(constraints),
            _ => None,
        }
    }
}

/// All types of a compilation, addressed by [`TypeId`].
#[derive(Clone, Debug)]
pub struct TypeTable {
    types: Vec<TypeDef>,
    /// Host-declared implicit conversions beyond identity, `object`, and
    /// user-defined operators (numeric widening and the like).
    implicit: FxHashSet<(TypeId, TypeId)>,
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeTable {
    /// Create a table with the well-known types at their fixed ids.
    pub fn new() -> Self {
        let well_known = [
            ("object", TypeKind::Object),
            ("string", TypeKind::String),
            ("bool", TypeKind::Primitive),
            ("int", TypeKind::Primitive),
            ("char", TypeKind::Primitive),
            ("double", TypeKind::Primitive),
            ("Regex", TypeKind::Regex),
            ("Group", TypeKind::Group),
            ("RegexOptions", TypeKind::Enum),
        ];
        let mut table = TypeTable {
            types: Vec::with_capacity(32),
            implicit: FxHashSet::default(),
        };
        for (name, kind) in well_known {
            table.add(TypeDef::new(name, kind));
        }
        debug_assert_eq!(table.types.len(), TypeId::FIRST_USER as usize);
        table.declare_implicit(TypeId::CHAR, TypeId::INT);
        table.declare_implicit(TypeId::INT, TypeId::DOUBLE);
        table
    }

    pub fn add(&mut self, def: TypeDef) -> TypeId {
        let id = TypeId::from_len(self.types.len());
        self.types.push(def);
        id
    }

    #[inline]
    pub fn get(&self, id: TypeId) -> Option<&TypeDef> {
        self.types.get(id.index())
    }

    #[inline]
    pub fn get_mut(&mut self, id: TypeId) -> Option<&mut TypeDef> {
        self.types.get_mut(id.index())
    }

    /// Register `from` as implicitly convertible to `to`.
    pub fn declare_implicit(&mut self, from: TypeId, to: TypeId) {
        self.implicit.insert((from, to));
    }

    pub fn has_declared_implicit(&self, from: TypeId, to: TypeId) -> bool {
        self.implicit.contains(&(from, to))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
