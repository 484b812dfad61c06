use core::any::{Any, TypeId, type_name};
use core::fmt;

use super::{ListDef, MapDef, OptionDef, PointerDef, ScalarKind, StructDef};

/// The runtime description of a type.
///
/// Shapes are small `Copy` values; building one is cheap, so they are produced
/// on demand by [`Shaped::shape`](crate::Shaped::shape) rather than stored.
/// Two shapes describe the same type exactly when their `id`s are equal.
#[derive(Clone, Copy)]
pub struct Shape {
    /// Identity of the described type.
    pub id: TypeId,
    /// Fully qualified type name, for diagnostics.
    pub type_name: &'static str,
    /// What kind of value this is.
    pub def: Def,
}

impl Shape {
    /// Builds the shape of `T` with the given definition.
    pub fn of<T: Any>(def: Def) -> Self {
        Self {
            id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            def,
        }
    }

    /// Returns true if this shape describes `T`.
    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for Shape {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Shape {}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shape")
            .field("type_name", &self.type_name)
            .field("def", &self.def)
            .finish()
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name)
    }
}

/// The kind of value a [`Shape`] describes, with the accessors needed to
/// reach into it.
#[derive(Clone, Copy)]
pub enum Def {
    /// A leaf value.
    Scalar(ScalarKind),
    /// A struct with named fields.
    Struct(StructDef),
    /// A growable sequence, like `Vec<T>`.
    List(ListDef),
    /// A keyed collection, like `HashMap<K, V>`.
    Map(MapDef),
    /// A value that may be absent, like `Option<T>`.
    Option(OptionDef),
    /// An owning pointer that is always set, like `Box<T>`.
    Pointer(PointerDef),
    /// A self-describing value whose concrete kind is only known at runtime.
    Dynamic,
}

impl Def {
    /// Short name of the definition kind.
    pub const fn kind(&self) -> &'static str {
        match self {
            Def::Scalar(_) => "scalar",
            Def::Struct(_) => "struct",
            Def::List(_) => "list",
            Def::Map(_) => "map",
            Def::Option(_) => "option",
            Def::Pointer(_) => "pointer",
            Def::Dynamic => "dynamic",
        }
    }
}

impl fmt::Debug for Def {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Def::Scalar(kind) => f.debug_tuple("Scalar").field(kind).finish(),
            Def::Struct(def) => f
                .debug_struct("Struct")
                .field(
                    "fields",
                    &def.fields.iter().map(|field| field.name).collect::<Vec<_>>(),
                )
                .finish(),
            Def::List(def) => f
                .debug_struct("List")
                .field("item", &(def.item)().type_name)
                .finish(),
            Def::Map(def) => f
                .debug_struct("Map")
                .field("key", &(def.key)().type_name)
                .field("value", &(def.value)().type_name)
                .finish(),
            Def::Option(def) => f
                .debug_struct("Option")
                .field("inner", &(def.inner)().type_name)
                .finish(),
            Def::Pointer(def) => f
                .debug_struct("Pointer")
                .field("pointee", &(def.pointee)().type_name)
                .finish(),
            Def::Dynamic => f.write_str("Dynamic"),
        }
    }
}
