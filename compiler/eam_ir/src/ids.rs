//! Index newtypes into the compilation's arenas and tables.
//!
//! - `ExprId(u32)` instead of `Box<Expr>`
//! - `SymbolId(u32)` / `TypeId(u32)` into the symbol and type tables
//! - `DeclId(u32)` into declarator and base-initializer lists

use std::fmt;

macro_rules! index_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Create from a raw index.
            #[inline]
            pub const fn new(index: u32) -> Self {
                $name(index)
            }

            /// Get the index into the owning table.
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }

            /// Get the raw u32 value.
            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }

            /// Create from a table length, saturating at `u32::MAX`.
            #[inline]
            pub(crate) fn from_len(len: usize) -> Self {
                $name(u32::try_from(len).unwrap_or(u32::MAX))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }
    };
}

index_newtype!(
    /// Index into the [`ExprArena`](crate::ExprArena).
    ExprId
);

index_newtype!(
    /// Index into the [`SymbolTable`](crate::SymbolTable).
    SymbolId
);

index_newtype!(
    /// Index into the [`TypeTable`](crate::TypeTable).
    ///
    /// The first few ids are pre-registered well-known types; see the
    /// associated constants.
    TypeId
);

index_newtype!(
    /// Index into a compilation's declarator or base-initializer list.
    DeclId
);

impl TypeId {
    pub const OBJECT: TypeId = TypeId(0);
    pub const STRING: TypeId = TypeId(1);
    pub const BOOL: TypeId = TypeId(2);
    pub const INT: TypeId = TypeId(3);
    pub const CHAR: TypeId = TypeId(4);
    pub const DOUBLE: TypeId = TypeId(5);
    /// The compiled pattern type (`Regex`).
    pub const REGEX: TypeId = TypeId(6);
    /// A single capture output of a destructuring match (`Group`).
    pub const GROUP: TypeId = TypeId(7);
    /// The option-flags enum accepted alongside pattern text.
    pub const PATTERN_OPTIONS: TypeId = TypeId(8);

    /// First index handed out to host-declared types.
    pub const FIRST_USER: u32 = 9;

    /// Check if this is one of the pre-registered types.
    #[inline]
    pub const fn is_well_known(self) -> bool {
        self.0 < Self::FIRST_USER
    }
}
