#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

mod access;
pub use access::*;

mod types;
pub use types::*;

mod impls;

mod value;
pub use value::*;

/// A type that can describe its own shape.
///
/// The returned [`Shape`] is everything a format crate needs to build a
/// specialized codec for `Self`: which kind of value it is, and for containers
/// and structs, the bound accessors used to reach the values inside.
///
/// Structs normally get this through `#[derive(Shaped)]` from the `gale`
/// crate. Hand-written impls must make every accessor downcast to the exact
/// type the shape describes.
pub trait Shaped: core::any::Any {
    /// Returns the shape of this type.
    fn shape() -> Shape
    where
        Self: Sized;
}
