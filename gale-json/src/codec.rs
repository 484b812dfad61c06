use std::any::type_name;
use std::sync::LazyLock;

use gale_core::{Shaped, Value};
use tracing::trace;

use crate::{DEFAULT_MAX_DEPTH, JsonError, JsonErrorKind, Registry, Tokenizer, WriterPool};

/// Writers shared by every [`Codec`].
static WRITERS: LazyLock<WriterPool> = LazyLock::new(WriterPool::default);

/// What to do with input left over after the top-level value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrailingPolicy {
    /// Anything but whitespace is a [`TrailingCharacters`](JsonErrorKind::TrailingCharacters) error.
    #[default]
    Reject,
    /// Stop reading after the value.
    Ignore,
}

/// Options for decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Handling of bytes after the value (default: reject)
    pub trailing: TrailingPolicy,
    /// Deepest allowed container nesting (default: 128)
    pub max_depth: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            trailing: TrailingPolicy::Reject,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl DecodeOptions {
    /// Create new default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the trailing-bytes policy.
    pub const fn trailing(mut self, policy: TrailingPolicy) -> Self {
        self.trailing = policy;
        self
    }

    /// Set the nesting limit.
    pub const fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Encode and decode entry points bound to a registry and decode options.
///
/// The crate-level functions use `Codec::new()`.
///
/// ```
/// use gale_json::{Codec, DecodeOptions, TrailingPolicy};
///
/// let codec = Codec::new().with_options(DecodeOptions::new().trailing(TrailingPolicy::Ignore));
/// let n: u32 = codec.from_str("42 and then some").unwrap();
/// assert_eq!(n, 42);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Codec {
    registry: &'static Registry,
    options: DecodeOptions,
}

impl Default for Codec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec {
    /// A codec over the global registry with default options.
    pub fn new() -> Self {
        Self {
            registry: Registry::global(),
            options: DecodeOptions::default(),
        }
    }

    /// Use `registry` instead of the global one.
    pub fn with_registry(mut self, registry: &'static Registry) -> Self {
        self.registry = registry;
        self
    }

    /// Replace the decode options.
    pub fn with_options(mut self, options: DecodeOptions) -> Self {
        self.options = options;
        self
    }

    /// The registry this codec compiles into.
    pub fn registry(&self) -> &'static Registry {
        self.registry
    }

    /// The decode options.
    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Decodes `input` into `dst`.
    ///
    /// Fields missing from the input keep their current value in `dst`. After
    /// an error, the content of `dst` is unspecified.
    pub fn decode<T: Shaped>(&self, input: &[u8], dst: &mut T) -> Result<(), JsonError> {
        trace!(target_type = type_name::<T>(), len = input.len(), "decode");
        self.decode_inner(input, dst)
            .map_err(|err| err.with_source(input))
    }

    fn decode_inner<T: Shaped>(&self, input: &[u8], dst: &mut T) -> Result<(), JsonError> {
        let decoder = self.registry.decoder_for::<T>()?;
        let mut tok = Tokenizer::with_max_depth(input, self.options.max_depth);
        decoder.decode(&mut tok, dst)?;
        match self.options.trailing {
            TrailingPolicy::Reject => tok.expect_end(),
            TrailingPolicy::Ignore => Ok(()),
        }
    }

    /// Decodes `input` into a fresh `T::default()`.
    pub fn from_slice<T: Shaped + Default>(&self, input: &[u8]) -> Result<T, JsonError> {
        let mut value = T::default();
        self.decode(input, &mut value)?;
        Ok(value)
    }

    /// Decodes `input` into a fresh `T::default()`.
    pub fn from_str<T: Shaped + Default>(&self, input: &str) -> Result<T, JsonError> {
        self.from_slice(input.as_bytes())
    }

    /// Decodes any JSON value.
    pub fn decode_value(&self, input: &[u8]) -> Result<Value, JsonError> {
        self.from_slice(input)
    }

    /// Encodes `value` into a new buffer.
    pub fn encode<T: Shaped>(&self, value: &T) -> Result<Vec<u8>, JsonError> {
        trace!(source_type = type_name::<T>(), "encode");
        let encoder = self.registry.encoder_for::<T>()?;
        let mut writer = WRITERS.acquire();
        encoder.encode(&mut writer, value)?;
        Ok(writer.as_bytes().to_vec())
    }

    /// Encodes `value` into a new string.
    pub fn encode_to_string<T: Shaped>(&self, value: &T) -> Result<String, JsonError> {
        String::from_utf8(self.encode(value)?).map_err(|_| JsonError::new(JsonErrorKind::InvalidUtf8))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorCategory;

    #[test]
    fn trailing_policy() {
        let strict = Codec::new();
        let err = strict.from_str::<bool>("true false").unwrap_err();
        assert_eq!(err.kind(), &JsonErrorKind::TrailingCharacters);
        assert_eq!(err.offset(), Some(5));
        assert!(strict.from_str::<bool>("true \n").unwrap());

        let lenient = strict.with_options(DecodeOptions::new().trailing(TrailingPolicy::Ignore));
        assert!(lenient.from_str::<bool>("true false").unwrap());
    }

    #[test]
    fn depth_limit_is_configurable() {
        let codec = Codec::new().with_options(DecodeOptions::new().max_depth(2));
        assert!(codec.from_str::<Vec<Vec<u8>>>("[[1]]").is_ok());
        let err = codec.from_str::<Vec<Vec<Vec<u8>>>>("[[[1]]]").unwrap_err();
        assert!(matches!(err.kind(), JsonErrorKind::DepthLimitExceeded { limit: 2 }));
        assert_eq!(err.category(), ErrorCategory::Range);
    }

    #[test]
    fn isolated_registry() {
        let registry = Registry::isolated();
        let codec = Codec::new().with_registry(registry);
        assert_eq!(codec.encode_to_string(&vec![1_u8, 2]).unwrap(), "[1,2]");
        assert!(registry.has_encoder(std::any::TypeId::of::<Vec<u8>>()));
    }

    #[test]
    fn errors_carry_the_input() {
        let err = Codec::new().from_str::<u8>("[").unwrap_err();
        assert_eq!(err.source_code.as_deref(), Some("["));
    }
}
