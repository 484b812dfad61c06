#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

mod codec;
mod compile;
mod dynamic;
mod error;
mod registry;
mod tables;
mod tokenizer;
mod writer;

pub use codec::{Codec, DecodeOptions, TrailingPolicy};
pub use compile::{Decoder, Encoder};
pub use error::{ErrorCategory, JsonError, JsonErrorKind};
pub use gale_core::Value;
pub use registry::Registry;
pub use tokenizer::{DEFAULT_MAX_DEPTH, Tokenizer};
pub use writer::{PooledWriter, Writer, WriterPool};

use gale_core::Shaped;

/// Encodes `value` as JSON.
///
/// # Example
///
/// ```
/// use gale::Shaped;
///
/// #[derive(Shaped)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// let json = gale_json::encode_to_string(&Point { x: 1, y: -2 }).unwrap();
/// assert_eq!(json, r#"{"x":1,"y":-2}"#);
/// ```
pub fn encode<T: Shaped>(value: &T) -> Result<Vec<u8>, JsonError> {
    Codec::new().encode(value)
}

/// Encodes `value` as a JSON string.
pub fn encode_to_string<T: Shaped>(value: &T) -> Result<String, JsonError> {
    Codec::new().encode_to_string(value)
}

/// Decodes `input` into an existing value.
///
/// Keys that `T` does not know are skipped; fields the input leaves out keep
/// whatever `dst` held before.
pub fn decode<T: Shaped>(input: &[u8], dst: &mut T) -> Result<(), JsonError> {
    Codec::new().decode(input, dst)
}

/// Decodes JSON bytes into a new value.
pub fn from_slice<T: Shaped + Default>(input: &[u8]) -> Result<T, JsonError> {
    Codec::new().from_slice(input)
}

/// Decodes a JSON string into a new value.
///
/// # Example
///
/// ```
/// use gale::Shaped;
///
/// #[derive(Shaped, Default, Debug, PartialEq)]
/// struct Person {
///     name: String,
///     age: u32,
/// }
///
/// let person: Person = gale_json::from_str(r#"{"name": "Alice", "age": 30}"#).unwrap();
/// assert_eq!(person, Person { name: "Alice".into(), age: 30 });
/// ```
pub fn from_str<T: Shaped + Default>(input: &str) -> Result<T, JsonError> {
    Codec::new().from_str(input)
}

/// Decodes any JSON document into a [`Value`].
pub fn decode_value(input: &[u8]) -> Result<Value, JsonError> {
    Codec::new().decode_value(input)
}
