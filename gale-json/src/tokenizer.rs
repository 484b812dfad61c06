//! Cursor over a JSON byte buffer.
//!
//! The tokenizer reads primitive tokens on demand: the compiled decoders know
//! what they expect next and ask for exactly that, so there is no token enum
//! and no lookahead beyond one significant byte. Every error carries the byte
//! offset at which it was detected.

use std::borrow::Cow;

use lexical_parse_float::FromLexical as _;

use crate::tables::{self, ARRAY_END, ARRAY_START, NUMBER, OBJECT_END, OBJECT_START, PARSE, STRING};
use crate::{JsonError, JsonErrorKind};

/// Nesting limit used when none is configured.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// A forward-only reader over an immutable JSON buffer.
#[derive(Debug, Clone)]
pub struct Tokenizer<'de> {
    input: &'de [u8],
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl<'de> Tokenizer<'de> {
    /// Creates a tokenizer at the start of `input` with the default depth limit.
    pub fn new(input: &'de [u8]) -> Self {
        Self::with_max_depth(input, DEFAULT_MAX_DEPTH)
    }

    /// Creates a tokenizer at the start of `input` with a custom depth limit.
    pub fn with_max_depth(input: &'de [u8], max_depth: usize) -> Self {
        Self {
            input,
            pos: 0,
            depth: 0,
            max_depth,
        }
    }

    /// Points the tokenizer at a new buffer, keeping the depth limit.
    pub fn reset(&mut self, input: &'de [u8]) {
        self.input = input;
        self.pos = 0;
        self.depth = 0;
    }

    /// Current byte offset.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Current container nesting depth.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The unread part of the buffer.
    pub fn remaining(&self) -> &'de [u8] {
        &self.input[self.pos.min(self.input.len())..]
    }

    #[inline]
    fn skip_whitespace(&mut self) {
        while let Some(&b) = self.input.get(self.pos) {
            if !tables::is_whitespace(b) {
                break;
            }
            self.pos += 1;
        }
    }

    /// Error for whatever sits at the cursor when `expected` was wanted.
    pub(crate) fn unexpected(&self, expected: &'static str) -> JsonError {
        match self.input.get(self.pos) {
            Some(&found) => JsonError::at(JsonErrorKind::UnexpectedByte { expected, found }, self.pos),
            None => JsonError::at(JsonErrorKind::UnexpectedEof { expected }, self.pos),
        }
    }

    /// Returns the next significant byte without consuming it.
    #[inline]
    pub fn peek(&mut self) -> Option<u8> {
        self.skip_whitespace();
        self.input.get(self.pos).copied()
    }

    /// Consumes the next significant byte if it is `byte`.
    #[inline]
    pub fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    #[inline]
    fn expect_byte(&mut self, byte: u8, expected: &'static str) -> Result<(), JsonError> {
        if self.eat(byte) {
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    /// Consumes `{`.
    pub fn expect_object_start(&mut self) -> Result<(), JsonError> {
        self.expect_byte(b'{', "`{`")
    }

    /// Consumes `}`.
    pub fn expect_object_end(&mut self) -> Result<(), JsonError> {
        self.expect_byte(b'}', "`}`")
    }

    /// Consumes `[`.
    pub fn expect_array_start(&mut self) -> Result<(), JsonError> {
        self.expect_byte(b'[', "`[`")
    }

    /// Consumes `]`.
    pub fn expect_array_end(&mut self) -> Result<(), JsonError> {
        self.expect_byte(b']', "`]`")
    }

    /// Consumes `,`.
    pub fn expect_comma(&mut self) -> Result<(), JsonError> {
        self.expect_byte(b',', "`,`")
    }

    /// Consumes `:`.
    pub fn expect_colon(&mut self) -> Result<(), JsonError> {
        self.expect_byte(b':', "`:`")
    }

    /// After an object entry: consumes `,` and returns true, or `}` and returns false.
    pub fn object_comma_or_end(&mut self) -> Result<bool, JsonError> {
        match self.peek() {
            Some(b',') => {
                self.pos += 1;
                Ok(true)
            }
            Some(b'}') => {
                self.pos += 1;
                Ok(false)
            }
            _ => Err(self.unexpected("`,` or `}`")),
        }
    }

    /// After an array element: consumes `,` and returns true, or `]` and returns false.
    pub fn array_comma_or_end(&mut self) -> Result<bool, JsonError> {
        match self.peek() {
            Some(b',') => {
                self.pos += 1;
                Ok(true)
            }
            Some(b']') => {
                self.pos += 1;
                Ok(false)
            }
            _ => Err(self.unexpected("`,` or `]`")),
        }
    }

    /// Enters a container, failing once the depth limit is exceeded.
    pub fn descend(&mut self) -> Result<(), JsonError> {
        if self.depth >= self.max_depth {
            return Err(JsonError::at(
                JsonErrorKind::DepthLimitExceeded {
                    limit: self.max_depth,
                },
                self.pos,
            ));
        }
        self.depth += 1;
        Ok(())
    }

    /// Leaves a container.
    pub fn ascend(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Succeeds only if nothing but whitespace is left.
    pub fn expect_end(&mut self) -> Result<(), JsonError> {
        match self.peek() {
            None => Ok(()),
            Some(_) => Err(JsonError::at(JsonErrorKind::TrailingCharacters, self.pos)),
        }
    }

    fn expect_literal(&mut self, literal: &'static [u8], expected: &'static str) -> Result<(), JsonError> {
        self.skip_whitespace();
        for &want in literal {
            match self.input.get(self.pos) {
                Some(&b) if b == want => self.pos += 1,
                _ => return Err(self.unexpected(expected)),
            }
        }
        Ok(())
    }

    /// Reads `true` or `false`.
    pub fn read_bool(&mut self) -> Result<bool, JsonError> {
        match self.peek() {
            Some(b't') => self.expect_literal(b"true", "`true`").map(|()| true),
            Some(b'f') => self.expect_literal(b"false", "`false`").map(|()| false),
            _ => Err(self.unexpected("`true` or `false`")),
        }
    }

    /// Reads `null`.
    pub fn read_null(&mut self) -> Result<(), JsonError> {
        self.expect_literal(b"null", "`null`")
    }

    /// Consumes `null` if it is next, returning whether it did.
    pub fn eat_null(&mut self) -> Result<bool, JsonError> {
        if self.peek() == Some(b'n') {
            self.read_null()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    // ------------------------------------------------------------------
    // Numbers
    // ------------------------------------------------------------------

    /// Reads an integer literal as sign and magnitude.
    ///
    /// Returns `(negative, magnitude, start)`. Overflow of the magnitude is
    /// reported against `target` at the start of the literal.
    fn read_integer_parts(&mut self, target: &'static str) -> Result<(bool, u64, usize), JsonError> {
        self.skip_whitespace();
        let input = self.input;
        let start = self.pos;

        let negative = match input.get(self.pos) {
            Some(b'-') => {
                self.pos += 1;
                true
            }
            Some(b'+') => {
                return Err(JsonError::at(
                    JsonErrorKind::InvalidNumber {
                        reason: "leading `+`",
                    },
                    start,
                ));
            }
            _ => false,
        };

        match input.get(self.pos) {
            Some(b'0') if input.get(self.pos + 1).is_some_and(u8::is_ascii_digit) => {
                return Err(JsonError::at(
                    JsonErrorKind::InvalidNumber {
                        reason: "leading zero",
                    },
                    self.pos,
                ));
            }
            Some(b) if b.is_ascii_digit() => {}
            _ => return Err(self.unexpected("a digit")),
        }

        let mut magnitude = 0_u64;
        let mut overflow = false;
        while let Some(&b) = input.get(self.pos) {
            if !b.is_ascii_digit() {
                break;
            }
            if !overflow {
                match magnitude
                    .checked_mul(10)
                    .and_then(|m| m.checked_add(u64::from(b - b'0')))
                {
                    Some(m) => magnitude = m,
                    None => overflow = true,
                }
            }
            self.pos += 1;
        }

        if matches!(input.get(self.pos), Some(b'.' | b'e' | b'E')) {
            return Err(JsonError::at(
                JsonErrorKind::InvalidNumber {
                    reason: "fraction or exponent in an integer",
                },
                self.pos,
            ));
        }
        if overflow {
            return Err(JsonError::at(
                JsonErrorKind::NumberOutOfRange { target },
                start,
            ));
        }

        Ok((negative, magnitude, start))
    }

    /// Reads a signed integer, with overflow checking.
    pub fn read_i64(&mut self) -> Result<i64, JsonError> {
        let (negative, magnitude, start) = self.read_integer_parts("i64")?;
        let value = if negative {
            0_i64.checked_sub_unsigned(magnitude)
        } else {
            i64::try_from(magnitude).ok()
        };
        value.ok_or_else(|| JsonError::at(JsonErrorKind::NumberOutOfRange { target: "i64" }, start))
    }

    /// Reads an unsigned integer, with overflow checking. `-0` reads as zero.
    pub fn read_u64(&mut self) -> Result<u64, JsonError> {
        let (negative, magnitude, start) = self.read_integer_parts("u64")?;
        if negative && magnitude != 0 {
            return Err(JsonError::at(
                JsonErrorKind::NumberOutOfRange { target: "u64" },
                start,
            ));
        }
        Ok(magnitude)
    }

    /// Scans the maximal run of number bytes and checks it against the JSON
    /// number grammar.
    fn scan_number(&mut self) -> Result<(&'de [u8], usize), JsonError> {
        self.skip_whitespace();
        let input = self.input;
        let start = self.pos;
        while input.get(self.pos).copied().is_some_and(tables::is_number) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.unexpected("a number"));
        }
        let text = &input[start..self.pos];
        validate_number(text).map_err(|(reason, at)| {
            JsonError::at(JsonErrorKind::InvalidNumber { reason }, start + at)
        })?;
        Ok((text, start))
    }

    /// Reads any JSON number as `f64`.
    pub fn read_f64(&mut self) -> Result<f64, JsonError> {
        let (text, start) = self.scan_number()?;
        let value = f64::from_lexical(text).map_err(|_| {
            JsonError::at(JsonErrorKind::InvalidNumber { reason: "malformed float" }, start)
        })?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(JsonError::at(JsonErrorKind::NumberOutOfRange { target: "f64" }, start))
        }
    }

    /// Reads any JSON number as `f32`.
    pub fn read_f32(&mut self) -> Result<f32, JsonError> {
        let (text, start) = self.scan_number()?;
        let value = f32::from_lexical(text).map_err(|_| {
            JsonError::at(JsonErrorKind::InvalidNumber { reason: "malformed float" }, start)
        })?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(JsonError::at(JsonErrorKind::NumberOutOfRange { target: "f32" }, start))
        }
    }

    // ------------------------------------------------------------------
    // Strings
    // ------------------------------------------------------------------

    /// Reads a string, borrowing from the input when it has no escapes.
    pub fn read_string(&mut self) -> Result<Cow<'de, str>, JsonError> {
        if !self.eat(b'"') {
            return Err(self.unexpected("a string"));
        }
        let input = self.input;
        let start = self.pos;

        let mut i = start;
        while i < input.len() && !tables::is_string_special(input[i]) {
            i += 1;
        }

        match input.get(i) {
            Some(b'"') => {
                let s = std::str::from_utf8(&input[start..i]).map_err(|e| {
                    JsonError::at(JsonErrorKind::InvalidUtf8, start + e.valid_up_to())
                })?;
                self.pos = i + 1;
                Ok(Cow::Borrowed(s))
            }
            Some(b'\\') => {
                self.pos = i;
                self.read_string_slow(start).map(Cow::Owned)
            }
            Some(&byte) => Err(JsonError::at(JsonErrorKind::ControlCharacter { byte }, i)),
            None => Err(JsonError::at(
                JsonErrorKind::UnexpectedEof {
                    expected: "closing `\"`",
                },
                i,
            )),
        }
    }

    /// Continues a string from its first backslash, copying what was already scanned.
    fn read_string_slow(&mut self, start: usize) -> Result<String, JsonError> {
        let input = self.input;
        let mut buf = Vec::with_capacity((self.pos - start) + 16);
        buf.extend_from_slice(&input[start..self.pos]);

        loop {
            let run_start = self.pos;
            while self.pos < input.len() && !tables::is_string_special(input[self.pos]) {
                self.pos += 1;
            }
            buf.extend_from_slice(&input[run_start..self.pos]);

            match input.get(self.pos) {
                Some(b'"') => {
                    self.pos += 1;
                    break;
                }
                Some(b'\\') => {
                    let escape_at = self.pos;
                    self.pos += 1;
                    let unescaped = match input.get(self.pos) {
                        Some(b'"') => b'"',
                        Some(b'\\') => b'\\',
                        Some(b'/') => b'/',
                        Some(b'b') => 0x08,
                        Some(b'f') => 0x0c,
                        Some(b'n') => b'\n',
                        Some(b'r') => b'\r',
                        Some(b't') => b'\t',
                        Some(b'u') => {
                            self.pos += 1;
                            let c = self.read_unicode_escape(escape_at)?;
                            let mut utf8 = [0_u8; 4];
                            buf.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
                            continue;
                        }
                        Some(&found) => {
                            return Err(JsonError::at(
                                JsonErrorKind::InvalidEscape { found },
                                self.pos,
                            ));
                        }
                        None => {
                            return Err(JsonError::at(
                                JsonErrorKind::UnexpectedEof {
                                    expected: "an escape sequence",
                                },
                                self.pos,
                            ));
                        }
                    };
                    buf.push(unescaped);
                    self.pos += 1;
                }
                Some(&byte) => {
                    return Err(JsonError::at(
                        JsonErrorKind::ControlCharacter { byte },
                        self.pos,
                    ));
                }
                None => {
                    return Err(JsonError::at(
                        JsonErrorKind::UnexpectedEof {
                            expected: "closing `\"`",
                        },
                        self.pos,
                    ));
                }
            }
        }

        String::from_utf8(buf).map_err(|_| JsonError::at(JsonErrorKind::InvalidUtf8, start))
    }

    /// Reads the four hex digits after `\u`.
    fn read_hex4(&mut self) -> Result<u16, JsonError> {
        let mut value = 0_u16;
        for _ in 0..4 {
            let byte = match self.input.get(self.pos) {
                Some(&b) => b,
                None => {
                    return Err(JsonError::at(
                        JsonErrorKind::UnexpectedEof {
                            expected: "four hex digits",
                        },
                        self.pos,
                    ));
                }
            };
            let digit = match byte {
                b'0'..=b'9' => byte - b'0',
                b'a'..=b'f' => byte - b'a' + 10,
                b'A'..=b'F' => byte - b'A' + 10,
                found => {
                    return Err(JsonError::at(
                        JsonErrorKind::InvalidHexDigit { found },
                        self.pos,
                    ));
                }
            };
            value = (value << 4) | u16::from(digit);
            self.pos += 1;
        }
        Ok(value)
    }

    /// Decodes a `\u` escape, combining surrogate pairs. The cursor sits just
    /// past the `u`.
    fn read_unicode_escape(&mut self, escape_at: usize) -> Result<char, JsonError> {
        let surrogate = || JsonError::at(JsonErrorKind::InvalidSurrogate, escape_at);
        let first = self.read_hex4()?;
        let code_point = match first {
            0xD800..=0xDBFF => {
                if !self.remaining().starts_with(b"\\u") {
                    return Err(surrogate());
                }
                self.pos += 2;
                let second = self.read_hex4()?;
                if !(0xDC00..=0xDFFF).contains(&second) {
                    return Err(surrogate());
                }
                0x10000 + ((u32::from(first) - 0xD800) << 10) + (u32::from(second) - 0xDC00)
            }
            0xDC00..=0xDFFF => return Err(surrogate()),
            _ => u32::from(first),
        };
        char::from_u32(code_point).ok_or_else(surrogate)
    }

    // ------------------------------------------------------------------
    // Skipping
    // ------------------------------------------------------------------

    /// Consumes exactly one value of any shape, checking its grammar.
    ///
    /// Iterative, so hostile nesting is bounded by the depth limit rather
    /// than the call stack.
    pub fn skip_value(&mut self) -> Result<(), JsonError> {
        let mut stack: Vec<Container> = Vec::new();
        let mut state = SkipState::ExpectOpenOrValue;

        loop {
            state = match state {
                SkipState::ExpectOpenOrValue | SkipState::ExpectValue => {
                    let Some(byte) = self.peek() else {
                        return Err(self.unexpected("a value"));
                    };
                    let flags = PARSE[byte as usize];
                    if flags & OBJECT_START != 0 {
                        self.descend()?;
                        self.pos += 1;
                        stack.push(Container::Object);
                        SkipState::ExpectKeyOrClose
                    } else if flags & ARRAY_START != 0 {
                        self.descend()?;
                        self.pos += 1;
                        stack.push(Container::Array);
                        if self.eat(b']') {
                            stack.pop();
                            self.ascend();
                            SkipState::after_value(&stack)
                        } else {
                            SkipState::ExpectValue
                        }
                    } else {
                        self.skip_scalar(byte)?;
                        SkipState::after_value(&stack)
                    }
                }
                SkipState::ExpectKeyOrClose => {
                    if self.eat(b'}') {
                        stack.pop();
                        self.ascend();
                        SkipState::after_value(&stack)
                    } else if self.peek() == Some(b'"') {
                        self.read_string()?;
                        SkipState::ExpectColon
                    } else {
                        return Err(self.unexpected("a key or `}`"));
                    }
                }
                SkipState::ExpectKey => {
                    if self.peek() != Some(b'"') {
                        return Err(self.unexpected("a key"));
                    }
                    self.read_string()?;
                    SkipState::ExpectColon
                }
                SkipState::ExpectColon => {
                    self.expect_colon()?;
                    SkipState::ExpectValue
                }
                SkipState::ExpectCommaOrClose => {
                    let Some(&top) = stack.last() else {
                        return Ok(());
                    };
                    let byte = self.peek();
                    let flags = byte.map_or(0, |b| PARSE[b as usize]);
                    if byte == Some(b',') {
                        self.pos += 1;
                        match top {
                            Container::Object => SkipState::ExpectKey,
                            Container::Array => SkipState::ExpectValue,
                        }
                    } else if flags & top.close_flag() != 0 {
                        self.pos += 1;
                        stack.pop();
                        self.ascend();
                        SkipState::after_value(&stack)
                    } else {
                        return Err(self.unexpected(top.expected_after_item()));
                    }
                }
                SkipState::Done => return Ok(()),
            };
        }
    }

    fn skip_scalar(&mut self, byte: u8) -> Result<(), JsonError> {
        let flags = PARSE[byte as usize];
        if flags & STRING != 0 {
            self.read_string().map(drop)
        } else if flags & NUMBER != 0 {
            self.scan_number().map(drop)
        } else {
            match byte {
                b't' | b'f' => self.read_bool().map(drop),
                b'n' => self.read_null(),
                _ => Err(self.unexpected("a value")),
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Container {
    Object,
    Array,
}

impl Container {
    fn close_flag(self) -> u8 {
        match self {
            Container::Object => OBJECT_END,
            Container::Array => ARRAY_END,
        }
    }

    fn expected_after_item(self) -> &'static str {
        match self {
            Container::Object => "`,` or `}`",
            Container::Array => "`,` or `]`",
        }
    }
}

/// Where `skip_value` is within the value being skipped.
#[derive(Debug, Clone, Copy)]
enum SkipState {
    ExpectOpenOrValue,
    ExpectKeyOrClose,
    ExpectKey,
    ExpectColon,
    ExpectValue,
    ExpectCommaOrClose,
    Done,
}

impl SkipState {
    fn after_value(stack: &[Container]) -> Self {
        if stack.is_empty() {
            SkipState::Done
        } else {
            SkipState::ExpectCommaOrClose
        }
    }
}

/// Checks `text` against the JSON number grammar.
///
/// On failure returns a reason and the offset within `text`.
fn validate_number(text: &[u8]) -> Result<(), (&'static str, usize)> {
    let digits_from = |mut i: usize| {
        while text.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        i
    };

    let mut i = 0;
    match text.first() {
        Some(b'-') => i += 1,
        Some(b'+') => return Err(("leading `+`", 0)),
        _ => {}
    }

    match text.get(i) {
        Some(b'0') => {
            i += 1;
            if text.get(i).is_some_and(u8::is_ascii_digit) {
                return Err(("leading zero", i - 1));
            }
        }
        Some(b'1'..=b'9') => i = digits_from(i),
        _ => return Err(("expected a digit", i)),
    }

    if text.get(i) == Some(&b'.') {
        i += 1;
        if !text.get(i).is_some_and(u8::is_ascii_digit) {
            return Err(("expected a digit after `.`", i));
        }
        i = digits_from(i);
    }

    if matches!(text.get(i), Some(b'e' | b'E')) {
        i += 1;
        if matches!(text.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        if !text.get(i).is_some_and(u8::is_ascii_digit) {
            return Err(("expected a digit in the exponent", i));
        }
        i = digits_from(i);
    }

    if i == text.len() {
        Ok(())
    } else {
        Err(("unexpected character in number", i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorCategory;

    fn kind_of(err: JsonError) -> JsonErrorKind {
        err.kind
    }

    #[test]
    fn string_escapes() {
        let mut t = Tokenizer::new(br#""a\"b\\c\/d\n\t\u0041""#);
        assert_eq!(t.read_string().unwrap(), "a\"b\\c/d\n\tA");
        t.expect_end().unwrap();
    }

    #[test]
    fn plain_string_is_borrowed() {
        let mut t = Tokenizer::new("  \"héllo\" ".as_bytes());
        assert!(matches!(t.read_string().unwrap(), Cow::Borrowed("héllo")));
    }

    #[test]
    fn unicode_escapes_and_surrogates() {
        let mut t = Tokenizer::new(br#""\u00e9\ud83d\ude00x""#);
        assert_eq!(t.read_string().unwrap(), "é😀x");

        let err = Tokenizer::new(br#""\uDE00""#).read_string().unwrap_err();
        assert_eq!(err.kind, JsonErrorKind::InvalidSurrogate);
        assert_eq!(err.category(), ErrorCategory::Range);

        let err = Tokenizer::new(br#""\u12G4""#).read_string().unwrap_err();
        assert_eq!(err.kind, JsonErrorKind::InvalidHexDigit { found: b'G' });
        assert_eq!(err.offset(), Some(5));
    }

    #[test]
    fn string_errors() {
        let err = Tokenizer::new(b"\"ab\ncd\"").read_string().unwrap_err();
        assert_eq!(err.kind, JsonErrorKind::ControlCharacter { byte: b'\n' });
        assert_eq!(err.category(), ErrorCategory::Syntax);

        let err = Tokenizer::new(br#""abc"#).read_string().unwrap_err();
        assert_eq!(err.category(), ErrorCategory::TruncatedInput);

        let err = Tokenizer::new(br#""a\qb""#).read_string().unwrap_err();
        assert_eq!(err.kind, JsonErrorKind::InvalidEscape { found: b'q' });

        let err = Tokenizer::new(b"\"\xff\"").read_string().unwrap_err();
        assert_eq!(err.kind, JsonErrorKind::InvalidUtf8);
    }

    #[test]
    fn integers() {
        assert_eq!(Tokenizer::new(b"0").read_i64().unwrap(), 0);
        assert_eq!(Tokenizer::new(b" -42 ").read_i64().unwrap(), -42);
        assert_eq!(
            Tokenizer::new(b"-9223372036854775808").read_i64().unwrap(),
            i64::MIN
        );
        assert_eq!(
            Tokenizer::new(b"18446744073709551615").read_u64().unwrap(),
            u64::MAX
        );
        assert_eq!(Tokenizer::new(b"-0").read_u64().unwrap(), 0);
    }

    #[test]
    fn integer_errors() {
        let err = Tokenizer::new(b"01").read_i64().unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Syntax);
        assert_eq!(err.offset(), Some(0));

        let err = Tokenizer::new(b"+1").read_i64().unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Syntax);

        let err = Tokenizer::new(b"12.3").read_i64().unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Syntax);
        assert_eq!(err.offset(), Some(2));

        let err = Tokenizer::new(b"9223372036854775808").read_i64().unwrap_err();
        assert_eq!(kind_of(err), JsonErrorKind::NumberOutOfRange { target: "i64" });

        let err = Tokenizer::new(b"99999999999999999999").read_u64().unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Range);

        let err = Tokenizer::new(b"-1").read_u64().unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Range);

        let err = Tokenizer::new(b"").read_i64().unwrap_err();
        assert_eq!(err.category(), ErrorCategory::TruncatedInput);
    }

    #[test]
    fn floats() {
        assert_eq!(Tokenizer::new(b"12.3").read_f64().unwrap(), 12.3);
        assert_eq!(Tokenizer::new(b"-0.5e2").read_f64().unwrap(), -50.0);
        assert_eq!(Tokenizer::new(b"1E-2").read_f64().unwrap(), 0.01);
        assert_eq!(Tokenizer::new(b"7").read_f32().unwrap(), 7.0);

        for bad in [&b"01.5"[..], b"+1.0", b"1.", b".5", b"1e", b"1e+", b"--1", b"1.2.3"] {
            let err = Tokenizer::new(bad).read_f64().unwrap_err();
            assert_eq!(
                err.category(),
                ErrorCategory::Syntax,
                "{}",
                String::from_utf8_lossy(bad)
            );
        }

        let err = Tokenizer::new(b"1e400").read_f64().unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Range);
        let err = Tokenizer::new(b"1e39").read_f32().unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Range);
    }

    #[test]
    fn literals() {
        let mut t = Tokenizer::new(b"true false null");
        assert!(t.read_bool().unwrap());
        assert!(!t.read_bool().unwrap());
        t.read_null().unwrap();
        t.expect_end().unwrap();

        let err = Tokenizer::new(b"tru").read_bool().unwrap_err();
        assert_eq!(err.category(), ErrorCategory::TruncatedInput);
        let err = Tokenizer::new(b"nul!").read_null().unwrap_err();
        assert_eq!(err.offset(), Some(3));
    }

    #[test]
    fn skip_nested_values() {
        let mut t = Tokenizer::new(br#"{"a":[1,2,{"b":null}],"c":"x\"y"} , 5"#);
        t.skip_value().unwrap();
        assert_eq!(t.depth(), 0);
        t.expect_comma().unwrap();
        assert_eq!(t.read_i64().unwrap(), 5);

        let mut t = Tokenizer::new(b"[[], {}, [[]]]");
        t.skip_value().unwrap();
        t.expect_end().unwrap();
    }

    #[test]
    fn skip_rejects_bad_grammar() {
        for bad in [
            &br#"{"a" 1}"#[..],
            br#"{"a":1,}"#,
            b"[1 2]",
            b"[1,]",
            br#"{1:2}"#,
            b"[01]",
            b"{",
        ] {
            let mut t = Tokenizer::new(bad);
            assert!(t.skip_value().is_err(), "{}", String::from_utf8_lossy(bad));
        }
    }

    #[test]
    fn depth_limit() {
        let deep = "[".repeat(10) + &"]".repeat(10);
        let mut t = Tokenizer::with_max_depth(deep.as_bytes(), 9);
        let err = t.skip_value().unwrap_err();
        assert_eq!(err.kind, JsonErrorKind::DepthLimitExceeded { limit: 9 });

        let mut t = Tokenizer::with_max_depth(deep.as_bytes(), 10);
        t.skip_value().unwrap();
    }

    #[test]
    fn trailing_bytes() {
        let mut t = Tokenizer::new(b"1 x");
        t.read_i64().unwrap();
        let err = t.expect_end().unwrap_err();
        assert_eq!(err.kind, JsonErrorKind::TrailingCharacters);
        assert_eq!(err.offset(), Some(2));
    }
}
