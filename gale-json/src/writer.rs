//! Output buffer for the encoders, and a pool to reuse buffers across calls.

use std::ops::{Deref, DerefMut};

use parking_lot::Mutex;

use crate::tables;
use crate::{JsonError, JsonErrorKind};

/// Append-only JSON output buffer.
#[derive(Debug, Default, Clone)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    /// Creates an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty writer that can hold `capacity` bytes without growing.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// The bytes written so far.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Number of bytes written.
    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// True if nothing has been written.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Allocated capacity of the buffer.
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Discards the content, keeping the allocation.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Takes the buffer.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Appends one byte.
    #[inline]
    pub fn write_byte(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    /// Appends raw bytes, which must already be valid JSON text.
    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Writes `null`.
    #[inline]
    pub fn write_null(&mut self) {
        self.buf.extend_from_slice(b"null");
    }

    /// Writes `true` or `false`.
    #[inline]
    pub fn write_bool(&mut self, value: bool) {
        let literal: &[u8] = if value { b"true" } else { b"false" };
        self.buf.extend_from_slice(literal);
    }

    /// Writes an integer in decimal.
    #[inline]
    pub fn write_int<I: itoa::Integer>(&mut self, value: I) {
        let mut buffer = itoa::Buffer::new();
        self.buf.extend_from_slice(buffer.format(value).as_bytes());
    }

    /// Writes the shortest representation that reads back as the same `f64`.
    pub fn write_f64(&mut self, value: f64) -> Result<(), JsonError> {
        if !value.is_finite() {
            return Err(JsonError::new(JsonErrorKind::NonFiniteFloat));
        }
        let mut buffer = ryu::Buffer::new();
        self.buf
            .extend_from_slice(buffer.format_finite(value).as_bytes());
        Ok(())
    }

    /// Writes the shortest representation that reads back as the same `f32`.
    pub fn write_f32(&mut self, value: f32) -> Result<(), JsonError> {
        if !value.is_finite() {
            return Err(JsonError::new(JsonErrorKind::NonFiniteFloat));
        }
        let mut buffer = ryu::Buffer::new();
        self.buf
            .extend_from_slice(buffer.format_finite(value).as_bytes());
        Ok(())
    }

    /// Writes `value` as a quoted JSON string.
    ///
    /// Runs of bytes that need no escaping are copied in bulk.
    pub fn write_str_escaped(&mut self, value: &str) {
        let bytes = value.as_bytes();
        self.buf.reserve(bytes.len() + 2);
        self.buf.push(b'"');

        let mut run_start = 0;
        for (i, &byte) in bytes.iter().enumerate() {
            if !tables::is_string_special(byte) {
                continue;
            }
            self.buf.extend_from_slice(&bytes[run_start..i]);
            self.write_escape(byte);
            run_start = i + 1;
        }
        self.buf.extend_from_slice(&bytes[run_start..]);

        self.buf.push(b'"');
    }

    fn write_escape(&mut self, byte: u8) {
        const HEX: &[u8; 16] = b"0123456789abcdef";
        let short = match byte {
            b'"' => b'"',
            b'\\' => b'\\',
            0x08 => b'b',
            0x0c => b'f',
            b'\n' => b'n',
            b'\r' => b'r',
            b'\t' => b't',
            _ => {
                self.buf.extend_from_slice(&[
                    b'\\',
                    b'u',
                    b'0',
                    b'0',
                    HEX[(byte >> 4) as usize],
                    HEX[(byte & 0xf) as usize],
                ]);
                return;
            }
        };
        self.buf.extend_from_slice(&[b'\\', short]);
    }
}

/// Buffers bigger than this are dropped instead of returned to the pool.
const MAX_POOLED_CAPACITY: usize = 1 << 20;

/// Initial capacity of a freshly created pooled writer.
const INITIAL_CAPACITY: usize = 512;

/// Number of idle writers kept by default.
const DEFAULT_MAX_IDLE: usize = 64;

/// A bounded stack of idle writers.
#[derive(Debug)]
pub struct WriterPool {
    idle: Mutex<Vec<Writer>>,
    max_idle: usize,
}

impl Default for WriterPool {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_IDLE)
    }
}

impl WriterPool {
    /// Creates a pool keeping at most `max_idle` writers.
    pub fn new(max_idle: usize) -> Self {
        Self {
            idle: Mutex::new(Vec::new()),
            max_idle,
        }
    }

    /// Hands out an empty writer; it goes back to the pool when the guard drops.
    pub fn acquire(&self) -> PooledWriter<'_> {
        let writer = match self.idle.lock().pop() {
            Some(writer) => {
                tracing::trace!(capacity = writer.capacity(), "reusing pooled writer");
                writer
            }
            None => Writer::with_capacity(INITIAL_CAPACITY),
        };
        PooledWriter { pool: self, writer }
    }

    /// Number of idle writers.
    pub fn idle(&self) -> usize {
        self.idle.lock().len()
    }

    fn release(&self, mut writer: Writer) {
        if writer.capacity() > MAX_POOLED_CAPACITY {
            return;
        }
        writer.clear();
        let mut idle = self.idle.lock();
        if idle.len() < self.max_idle {
            idle.push(writer);
        }
    }
}

/// A writer borrowed from a [`WriterPool`].
#[derive(Debug)]
pub struct PooledWriter<'pool> {
    pool: &'pool WriterPool,
    writer: Writer,
}

impl Deref for PooledWriter<'_> {
    type Target = Writer;

    fn deref(&self) -> &Writer {
        &self.writer
    }
}

impl DerefMut for PooledWriter<'_> {
    fn deref_mut(&mut self) -> &mut Writer {
        &mut self.writer
    }
}

impl Drop for PooledWriter<'_> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.writer));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn escaped(s: &str) -> String {
        let mut w = Writer::new();
        w.write_str_escaped(s);
        String::from_utf8(w.into_bytes()).unwrap()
    }

    #[test]
    fn escapes() {
        assert_eq!(escaped("plain"), r#""plain""#);
        assert_eq!(escaped("a\"b\\c"), r#""a\"b\\c""#);
        assert_eq!(escaped("\n\r\t\u{8}\u{c}"), r#""\n\r\t\b\f""#);
        assert_eq!(escaped("\u{1}x\u{1f}"), r#""\u0001x\u001f""#);
        assert_eq!(escaped("slash / stays"), r#""slash / stays""#);
        assert_eq!(escaped("héllo 😀"), "\"héllo 😀\"");
    }

    #[test]
    fn numbers() {
        let mut w = Writer::new();
        w.write_int(-42_i64);
        w.write_byte(b' ');
        w.write_int(u64::MAX);
        w.write_byte(b' ');
        w.write_f64(1.5).unwrap();
        w.write_byte(b' ');
        w.write_f64(1e300).unwrap();
        w.write_byte(b' ');
        w.write_f32(0.1).unwrap();
        assert_eq!(
            std::str::from_utf8(w.as_bytes()).unwrap(),
            "-42 18446744073709551615 1.5 1e300 0.1"
        );

        let err = w.write_f64(f64::NAN).unwrap_err();
        assert_eq!(err.kind(), &JsonErrorKind::NonFiniteFloat);
        assert!(w.write_f32(f32::INFINITY).is_err());
    }

    #[test]
    fn pool_reuses_and_bounds() {
        let pool = WriterPool::new(1);
        {
            let mut a = pool.acquire();
            a.write_bytes(b"hello");
            let mut b = pool.acquire();
            b.write_bytes(b"world");
        }
        assert_eq!(pool.idle(), 1);

        let w = pool.acquire();
        assert!(w.is_empty());
        assert!(w.capacity() >= INITIAL_CAPACITY);
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn oversized_buffers_are_dropped() {
        let pool = WriterPool::new(4);
        {
            let mut w = pool.acquire();
            w.write_bytes(&vec![b'x'; MAX_POOLED_CAPACITY + 1]);
        }
        assert_eq!(pool.idle(), 0);
    }
}
