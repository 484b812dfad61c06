//! Codec for [`Value`], the type whose JSON kind is only known at run time.

use std::any::Any;
use std::collections::HashMap;

use gale_core::{Shaped, Value, downcast_mut, downcast_ref};

use crate::compile::{Decoder, Encoder};
use crate::{JsonError, Registry, Tokenizer, Writer};

pub(crate) struct ValueDecoder;

impl Decoder for ValueDecoder {
    fn decode(&self, tok: &mut Tokenizer<'_>, dst: &mut dyn Any) -> Result<(), JsonError> {
        *downcast_mut::<Value>(dst)? = read_value(tok)?;
        Ok(())
    }
}

/// Reads whatever value comes next, choosing the variant from its first byte.
/// Every number becomes a `f64`.
pub(crate) fn read_value(tok: &mut Tokenizer<'_>) -> Result<Value, JsonError> {
    match tok.peek() {
        Some(b'"') => Ok(Value::String(tok.read_string()?.into_owned())),
        Some(b'{') => read_object(tok),
        Some(b'[') => read_array(tok),
        Some(b't' | b'f') => Ok(Value::Bool(tok.read_bool()?)),
        Some(b'n') => {
            tok.read_null()?;
            Ok(Value::Null)
        }
        Some(b'-' | b'0'..=b'9') => Ok(Value::Number(tok.read_f64()?)),
        _ => Err(tok.unexpected("a JSON value")),
    }
}

fn read_object(tok: &mut Tokenizer<'_>) -> Result<Value, JsonError> {
    tok.expect_object_start()?;
    tok.descend()?;
    let mut map = HashMap::new();
    if !tok.eat(b'}') {
        loop {
            let key = tok.read_string()?.into_owned();
            tok.expect_colon()?;
            let value = read_value(tok)?;
            map.insert(key, value);
            if !tok.object_comma_or_end()? {
                break;
            }
        }
    }
    tok.ascend();
    Ok(Value::Object(map))
}

fn read_array(tok: &mut Tokenizer<'_>) -> Result<Value, JsonError> {
    tok.expect_array_start()?;
    tok.descend()?;
    let mut items = Vec::new();
    if !tok.eat(b']') {
        loop {
            items.push(read_value(tok)?);
            if !tok.array_comma_or_end()? {
                break;
            }
        }
    }
    tok.ascend();
    Ok(Value::Array(items))
}

/// Looks up the encoder of the payload's concrete type on every call.
pub(crate) struct ValueEncoder {
    registry: &'static Registry,
}

impl ValueEncoder {
    pub(crate) fn new(registry: &'static Registry) -> Self {
        Self { registry }
    }

    fn delegate<T: Shaped>(&self, w: &mut Writer, payload: &T) -> Result<(), JsonError> {
        self.registry.encoder_for::<T>()?.encode(w, payload)
    }
}

impl Encoder for ValueEncoder {
    fn encode(&self, w: &mut Writer, src: &dyn Any) -> Result<(), JsonError> {
        match downcast_ref::<Value>(src)? {
            Value::Null => {
                w.write_null();
                Ok(())
            }
            Value::Bool(b) => self.delegate(w, b),
            Value::Number(n) => self.delegate(w, n),
            Value::String(s) => self.delegate(w, s),
            // `Null` is how a dynamic value says nothing, so an empty
            // container is always written as one.
            Value::Array(items) if items.is_empty() => {
                w.write_bytes(b"[]");
                Ok(())
            }
            Value::Object(map) if map.is_empty() => {
                w.write_bytes(b"{}");
                Ok(())
            }
            Value::Array(items) => self.delegate(w, items),
            Value::Object(map) => self.delegate(w, map),
        }
    }
}
