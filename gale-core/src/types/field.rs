use core::any::Any;

use super::Shape;
use crate::Access;

/// Reads a field out of its containing struct.
pub type FieldGetFn = fn(&dyn Any) -> Access<&dyn Any>;

/// Mutably borrows a field out of its containing struct.
pub type FieldGetMutFn = fn(&mut dyn Any) -> Access<&mut dyn Any>;

/// Definition of a struct: its fields in declaration order.
#[derive(Clone, Copy, Debug)]
pub struct StructDef {
    /// Fields that take part in serialization.
    pub fields: &'static [Field],
}

/// A named field of a struct.
#[derive(Clone, Copy)]
pub struct Field {
    /// The Rust identifier of the field.
    pub name: &'static str,

    /// The raw `#[gale(tag = "...")]` text, if any.
    pub tag: Option<&'static str>,

    /// The field's own shape, resolved lazily so recursive types work.
    pub shape: fn() -> Shape,

    /// Borrows this field from a value of the containing type.
    pub get: FieldGetFn,

    /// Mutably borrows this field from a value of the containing type.
    pub get_mut: FieldGetMutFn,
}

impl Field {
    /// The name this field uses on the wire.
    ///
    /// That is the text of the tag up to the first comma when it is non-empty,
    /// otherwise the Rust name.
    pub fn wire_name(&self) -> &'static str {
        match self.tag {
            Some(tag) => match tag.split(',').next() {
                Some(name) if !name.is_empty() => name,
                _ => self.name,
            },
            None => self.name,
        }
    }

    /// Shape of the field's type.
    #[inline]
    pub fn shape(&self) -> Shape {
        (self.shape)()
    }
}

impl core::fmt::Debug for Field {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("tag", &self.tag)
            .field("shape", &self.shape().type_name)
            .finish_non_exhaustive()
    }
}
