//! Error types for JSON encoding and decoding.

use std::error::Error;
use std::fmt::{self, Display};

use gale_core::ShapeMismatch;

/// Error type for JSON encoding, decoding and codec compilation.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonError {
    /// The specific kind of error
    pub(crate) kind: JsonErrorKind,
    /// Byte offset into the input where the error was detected
    pub(crate) offset: Option<usize>,
    /// The input being decoded, for diagnostics
    pub(crate) source_code: Option<String>,
}

impl JsonError {
    /// Create a new error with the given kind and no location.
    pub(crate) fn new(kind: impl Into<JsonErrorKind>) -> Self {
        JsonError {
            kind: kind.into(),
            offset: None,
            source_code: None,
        }
    }

    /// Create a new error located at `offset`.
    pub(crate) fn at(kind: impl Into<JsonErrorKind>, offset: usize) -> Self {
        JsonError {
            kind: kind.into(),
            offset: Some(offset),
            source_code: None,
        }
    }

    /// Attach the decoded input for diagnostics.
    pub(crate) fn with_source(mut self, input: &[u8]) -> Self {
        self.source_code = Some(String::from_utf8_lossy(input).into_owned());
        self
    }

    /// The specific kind of error.
    pub fn kind(&self) -> &JsonErrorKind {
        &self.kind
    }

    /// Byte offset into the input, for errors found while decoding.
    pub fn offset(&self) -> Option<usize> {
        self.offset
    }

    /// Broad class of the error.
    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }
}

impl Display for JsonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.offset {
            Some(offset) => write!(f, "{} at byte {offset}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl Error for JsonError {}

impl<K: Into<JsonErrorKind>> From<K> for JsonError {
    fn from(value: K) -> Self {
        JsonError::new(value)
    }
}

/// Broad classes of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The input is not well-formed JSON, or has trailing bytes.
    Syntax,
    /// The Rust type cannot be handled by this codec.
    Type,
    /// A value is well-formed but cannot be represented.
    Range,
    /// The input ended while more was expected.
    TruncatedInput,
}

impl Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorCategory::Syntax => "syntax",
            ErrorCategory::Type => "type",
            ErrorCategory::Range => "range",
            ErrorCategory::TruncatedInput => "truncated input",
        })
    }
}

/// Detailed classification of JSON errors.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum JsonErrorKind {
    /// A byte that does not fit the grammar at this position.
    UnexpectedByte {
        /// What the grammar allows here.
        expected: &'static str,
        /// The byte found instead.
        found: u8,
    },
    /// The input ended early.
    UnexpectedEof {
        /// What the grammar needed next.
        expected: &'static str,
    },
    /// A number literal that breaks the JSON number grammar.
    InvalidNumber {
        /// What is wrong with it.
        reason: &'static str,
    },
    /// A well-formed number that does not fit the target type.
    NumberOutOfRange {
        /// The target type.
        target: &'static str,
    },
    /// An unknown escape sequence in a string.
    InvalidEscape {
        /// The byte after the backslash.
        found: u8,
    },
    /// A non-hex byte inside a `\u` escape.
    InvalidHexDigit {
        /// The offending byte.
        found: u8,
    },
    /// A `\u` escape naming an unpaired surrogate.
    InvalidSurrogate,
    /// An unescaped control byte inside a string.
    ControlCharacter {
        /// The offending byte.
        byte: u8,
    },
    /// String bytes that are not valid UTF-8.
    InvalidUtf8,
    /// Non-whitespace bytes after the top-level value.
    TrailingCharacters,
    /// Containers nested deeper than the configured limit.
    DepthLimitExceeded {
        /// The configured limit.
        limit: usize,
    },
    /// No codec can be compiled for this type.
    UnsupportedType {
        /// The Rust type.
        type_name: &'static str,
        /// Why it is unsupported.
        reason: String,
    },
    /// A shape's accessor was handed a value of another type.
    ShapeMismatch(ShapeMismatch),
    /// NaN or an infinity, which JSON cannot represent.
    NonFiniteFloat,
}

impl JsonErrorKind {
    /// Returns an error code for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            JsonErrorKind::UnexpectedByte { .. } => "json::unexpected_byte",
            JsonErrorKind::UnexpectedEof { .. } => "json::unexpected_eof",
            JsonErrorKind::InvalidNumber { .. } => "json::invalid_number",
            JsonErrorKind::NumberOutOfRange { .. } => "json::number_out_of_range",
            JsonErrorKind::InvalidEscape { .. } => "json::invalid_escape",
            JsonErrorKind::InvalidHexDigit { .. } => "json::invalid_hex_digit",
            JsonErrorKind::InvalidSurrogate => "json::invalid_surrogate",
            JsonErrorKind::ControlCharacter { .. } => "json::control_character",
            JsonErrorKind::InvalidUtf8 => "json::invalid_utf8",
            JsonErrorKind::TrailingCharacters => "json::trailing_characters",
            JsonErrorKind::DepthLimitExceeded { .. } => "json::depth_limit_exceeded",
            JsonErrorKind::UnsupportedType { .. } => "json::unsupported_type",
            JsonErrorKind::ShapeMismatch(_) => "json::shape_mismatch",
            JsonErrorKind::NonFiniteFloat => "json::non_finite_float",
        }
    }

    /// Broad class of this error kind.
    pub fn category(&self) -> ErrorCategory {
        match self {
            JsonErrorKind::UnexpectedByte { .. }
            | JsonErrorKind::InvalidNumber { .. }
            | JsonErrorKind::ControlCharacter { .. }
            | JsonErrorKind::InvalidUtf8
            | JsonErrorKind::TrailingCharacters => ErrorCategory::Syntax,
            JsonErrorKind::UnsupportedType { .. } | JsonErrorKind::ShapeMismatch(_) => {
                ErrorCategory::Type
            }
            JsonErrorKind::NumberOutOfRange { .. }
            | JsonErrorKind::InvalidEscape { .. }
            | JsonErrorKind::InvalidHexDigit { .. }
            | JsonErrorKind::InvalidSurrogate
            | JsonErrorKind::DepthLimitExceeded { .. }
            | JsonErrorKind::NonFiniteFloat => ErrorCategory::Range,
            JsonErrorKind::UnexpectedEof { .. } => ErrorCategory::TruncatedInput,
        }
    }
}

/// Prints a byte as a quoted character when printable, hex otherwise.
struct ByteRepr(u8);

impl Display for ByteRepr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_ascii_graphic() {
            write!(f, "'{}'", self.0 as char)
        } else {
            write!(f, "0x{:02x}", self.0)
        }
    }
}

impl Display for JsonErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonErrorKind::UnexpectedByte { expected, found } => {
                write!(f, "expected {expected}, found {}", ByteRepr(*found))
            }
            JsonErrorKind::UnexpectedEof { expected } => {
                write!(f, "unexpected end of input, expected {expected}")
            }
            JsonErrorKind::InvalidNumber { reason } => write!(f, "invalid number: {reason}"),
            JsonErrorKind::NumberOutOfRange { target } => {
                write!(f, "number out of range for {target}")
            }
            JsonErrorKind::InvalidEscape { found } => {
                write!(f, "invalid escape sequence \\{}", ByteRepr(*found))
            }
            JsonErrorKind::InvalidHexDigit { found } => {
                write!(f, "invalid hex digit {} in \\u escape", ByteRepr(*found))
            }
            JsonErrorKind::InvalidSurrogate => write!(f, "unpaired surrogate in \\u escape"),
            JsonErrorKind::ControlCharacter { byte } => {
                write!(f, "unescaped control character 0x{byte:02x} in string")
            }
            JsonErrorKind::InvalidUtf8 => write!(f, "invalid UTF-8 in string"),
            JsonErrorKind::TrailingCharacters => write!(f, "trailing characters after value"),
            JsonErrorKind::DepthLimitExceeded { limit } => {
                write!(f, "nesting deeper than {limit} levels")
            }
            JsonErrorKind::UnsupportedType { type_name, reason } => {
                write!(f, "unsupported type `{type_name}`: {reason}")
            }
            JsonErrorKind::ShapeMismatch(mismatch) => write!(f, "{mismatch}"),
            JsonErrorKind::NonFiniteFloat => write!(f, "cannot encode NaN or infinity"),
        }
    }
}

impl From<ShapeMismatch> for JsonErrorKind {
    fn from(value: ShapeMismatch) -> Self {
        Self::ShapeMismatch(value)
    }
}

// ============================================================================
// Diagnostic Implementation
// ============================================================================

impl miette::Diagnostic for JsonError {
    fn code<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        Some(Box::new(self.kind.code()))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        self.source_code
            .as_ref()
            .map(|s| s as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = miette::LabeledSpan> + '_>> {
        let offset = self.offset?;
        let len = match &self.source_code {
            Some(source) if offset < source.len() => 1,
            _ => 0,
        };
        let label = match &self.kind {
            JsonErrorKind::UnexpectedByte { expected, .. } => format!("expected {expected}"),
            JsonErrorKind::UnexpectedEof { expected } => format!("expected {expected}"),
            JsonErrorKind::TrailingCharacters => "value ends before this".to_string(),
            _ => "error occurred here".to_string(),
        };
        Some(Box::new(std::iter::once(miette::LabeledSpan::at(
            offset..offset + len,
            label,
        ))))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        match &self.kind {
            JsonErrorKind::TrailingCharacters => Some(Box::new(
                "use TrailingPolicy::Ignore to accept bytes after the value",
            )),
            JsonErrorKind::DepthLimitExceeded { .. } => {
                Some(Box::new("raise DecodeOptions::max_depth for deeper input"))
            }
            JsonErrorKind::InvalidNumber { .. } => Some(Box::new(
                "JSON numbers have no leading `+` and no leading zeros",
            )),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use miette::Diagnostic;

    #[test]
    fn categories() {
        let syntax = JsonError::at(JsonErrorKind::InvalidNumber { reason: "leading zero" }, 1);
        assert_eq!(syntax.category(), ErrorCategory::Syntax);

        let range = JsonError::new(JsonErrorKind::InvalidEscape { found: b'x' });
        assert_eq!(range.category(), ErrorCategory::Range);

        let eof = JsonError::new(JsonErrorKind::UnexpectedEof { expected: "a value" });
        assert_eq!(eof.category(), ErrorCategory::TruncatedInput);

        let ty: JsonError = ShapeMismatch { expected: "u8" }.into();
        assert_eq!(ty.category(), ErrorCategory::Type);
    }

    #[test]
    fn display_includes_offset_and_byte() {
        let err = JsonError::at(
            JsonErrorKind::UnexpectedByte {
                expected: "`:`",
                found: b'x',
            },
            7,
        );
        assert_eq!(err.to_string(), "expected `:`, found 'x' at byte 7");

        let err = JsonError::at(JsonErrorKind::ControlCharacter { byte: 0x0a }, 3);
        assert_eq!(
            err.to_string(),
            "unescaped control character 0x0a in string at byte 3"
        );
    }

    #[test]
    fn diagnostic_labels_the_offset() {
        let err = JsonError::at(JsonErrorKind::TrailingCharacters, 4).with_source(b"123 x");
        assert_eq!(
            err.code().map(|c| c.to_string()).as_deref(),
            Some("json::trailing_characters")
        );
        let labels: Vec<_> = err.labels().into_iter().flatten().collect();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].offset(), 4);
        assert_eq!(labels[0].len(), 1);
        assert!(err.source_code().is_some());
    }
}
