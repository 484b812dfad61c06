//! Byte classification tables, built at compile time.

/// Space, tab, carriage return, line feed.
pub(crate) const WHITESPACE: u8 = 1 << 0;
/// Any byte that may appear inside a number literal: digits, `-`, `+`, `.`, `e`, `E`.
pub(crate) const NUMBER: u8 = 1 << 1;
/// `"`
pub(crate) const STRING: u8 = 1 << 2;
/// `{`
pub(crate) const OBJECT_START: u8 = 1 << 3;
/// `}`
pub(crate) const OBJECT_END: u8 = 1 << 4;
/// `[`
pub(crate) const ARRAY_START: u8 = 1 << 5;
/// `]`
pub(crate) const ARRAY_END: u8 = 1 << 6;

/// Flags for every byte value outside of strings.
pub(crate) static PARSE: [u8; 256] = build_parse_table();

/// True for bytes that end a plain run inside a string: `"`, `\` and
/// control bytes below 0x20.
pub(crate) static STRING_SPECIAL: [bool; 256] = build_string_table();

const fn build_parse_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        let c = i as u8;
        let mut flags = 0;
        if matches!(c, b' ' | b'\t' | b'\r' | b'\n') {
            flags |= WHITESPACE;
        }
        if c.is_ascii_digit() || matches!(c, b'-' | b'+' | b'.' | b'e' | b'E') {
            flags |= NUMBER;
        }
        flags |= match c {
            b'"' => STRING,
            b'{' => OBJECT_START,
            b'}' => OBJECT_END,
            b'[' => ARRAY_START,
            b']' => ARRAY_END,
            _ => 0,
        };
        table[i] = flags;
        i += 1;
    }
    table
}

const fn build_string_table() -> [bool; 256] {
    let mut table = [false; 256];
    let mut i = 0;
    while i < 256 {
        let c = i as u8;
        table[i] = c == b'"' || c == b'\\' || c < 0x20;
        i += 1;
    }
    table
}

#[inline(always)]
pub(crate) fn is_whitespace(byte: u8) -> bool {
    PARSE[byte as usize] & WHITESPACE != 0
}

#[inline(always)]
pub(crate) fn is_number(byte: u8) -> bool {
    PARSE[byte as usize] & NUMBER != 0
}

#[inline(always)]
pub(crate) fn is_string_special(byte: u8) -> bool {
    STRING_SPECIAL[byte as usize]
}
