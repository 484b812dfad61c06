use core::any::Any;

use super::Shape;
use crate::Access;

/// Boxed iterator over the entries of a map.
pub type MapIter<'a> = Box<dyn Iterator<Item = (&'a dyn Any, &'a dyn Any)> + 'a>;

/// Definition of a growable sequence.
///
/// Every accessor takes the list itself, type-erased, and fails with a
/// [`ShapeMismatch`](crate::ShapeMismatch) if handed anything else.
#[derive(Clone, Copy, Debug)]
pub struct ListDef {
    /// Shape of the elements.
    pub item: fn() -> Shape,

    /// Number of elements.
    pub len: fn(&dyn Any) -> Access<usize>,

    /// Allocated capacity. Zero means the list was never populated.
    pub capacity: fn(&dyn Any) -> Access<usize>,

    /// Borrows the element at `index`, if in bounds.
    pub get: fn(&dyn Any, usize) -> Access<Option<&dyn Any>>,

    /// Removes every element, keeping the allocation.
    pub clear: fn(&mut dyn Any) -> Access<()>,

    /// Replaces the list with a fresh, unallocated one.
    pub release: fn(&mut dyn Any) -> Access<()>,

    /// Ensures capacity for exactly `additional` more elements.
    pub reserve_exact: fn(&mut dyn Any, usize) -> Access<()>,

    /// Appends a default element and borrows it.
    pub push_default: fn(&mut dyn Any) -> Access<&mut dyn Any>,
}

/// Definition of a keyed collection.
#[derive(Clone, Copy, Debug)]
pub struct MapDef {
    /// Shape of the keys.
    pub key: fn() -> Shape,

    /// Shape of the values.
    pub value: fn() -> Shape,

    /// Number of entries.
    pub len: fn(&dyn Any) -> Access<usize>,

    /// True when the map has never been initialized, as opposed to merely empty.
    pub is_unset: fn(&dyn Any) -> Access<bool>,

    /// Initializes an unset map so that it is observably present.
    pub init: fn(&mut dyn Any) -> Access<()>,

    /// Replaces the map with a fresh, unset one.
    pub reset: fn(&mut dyn Any) -> Access<()>,

    /// Inserts `key` with a default value, replacing any previous entry, and
    /// borrows the value. The key must be of the key shape's type.
    pub insert_default: fn(&mut dyn Any, Box<dyn Any>) -> Access<&mut dyn Any>,

    /// Iterates the entries in the map's own order.
    pub iter: for<'a> fn(&'a dyn Any) -> Access<MapIter<'a>>,
}

/// Definition of an optional value.
#[derive(Clone, Copy, Debug)]
pub struct OptionDef {
    /// Shape of the contained value.
    pub inner: fn() -> Shape,

    /// Borrows the contained value, if present.
    pub get: fn(&dyn Any) -> Access<Option<&dyn Any>>,

    /// Clears the option.
    pub set_none: fn(&mut dyn Any) -> Access<()>,

    /// Borrows the contained value, inserting a default first if absent.
    pub get_or_insert_default: fn(&mut dyn Any) -> Access<&mut dyn Any>,
}

/// Definition of an owning pointer that always holds a value.
#[derive(Clone, Copy, Debug)]
pub struct PointerDef {
    /// Shape of the pointee.
    pub pointee: fn() -> Shape,

    /// Borrows the pointee.
    pub get: fn(&dyn Any) -> Access<&dyn Any>,

    /// Mutably borrows the pointee.
    pub get_mut: fn(&mut dyn Any) -> Access<&mut dyn Any>,
}
