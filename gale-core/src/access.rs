use core::any::{Any, type_name};
use core::fmt;

/// An accessor was handed a value of a different type than its shape describes.
///
/// This only happens when a hand-written [`Shaped`](crate::Shaped) impl
/// disagrees with itself; derived impls never produce it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeMismatch {
    /// The type the accessor expected.
    pub expected: &'static str,
}

impl fmt::Display for ShapeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "value is not a `{}`", self.expected)
    }
}

impl std::error::Error for ShapeMismatch {}

/// Result of a checked accessor.
pub type Access<T> = Result<T, ShapeMismatch>;

/// Downcasts a type-erased reference, reporting the expected type on failure.
#[inline]
pub fn downcast_ref<T: Any>(value: &dyn Any) -> Access<&T> {
    value.downcast_ref::<T>().ok_or(ShapeMismatch {
        expected: type_name::<T>(),
    })
}

/// Downcasts a type-erased mutable reference, reporting the expected type on failure.
#[inline]
pub fn downcast_mut<T: Any>(value: &mut dyn Any) -> Access<&mut T> {
    value.downcast_mut::<T>().ok_or(ShapeMismatch {
        expected: type_name::<T>(),
    })
}
