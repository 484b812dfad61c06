//! Builds specialized codecs from shapes.
//!
//! Each shape compiles once into a tree of [`Decoder`] or [`Encoder`] objects
//! that close over the accessors and sub-routines they need, so a call never
//! inspects the shape again. Nested shapes reach the registry together with
//! the outermost shape, and not at all if any part of it fails.

use std::any::{Any, TypeId};
use std::sync::Arc;

use gale_core::{ScalarKind, Shape};

use crate::{JsonError, JsonErrorKind, Tokenizer, Writer};

mod decode;
mod encode;

pub(crate) use decode::DecoderCompiler;
pub(crate) use encode::EncoderCompiler;

/// Reads one JSON value into a destination of the type it was compiled for.
pub trait Decoder: Send + Sync {
    /// Decodes the next value of `tok` into `dst`.
    fn decode(&self, tok: &mut Tokenizer<'_>, dst: &mut dyn Any) -> Result<(), JsonError>;
}

/// Writes a value of the type it was compiled for as JSON.
pub trait Encoder: Send + Sync {
    /// Appends `src` to `w`.
    fn encode(&self, w: &mut Writer, src: &dyn Any) -> Result<(), JsonError>;
}

/// Type ids of the shapes currently being compiled, innermost last.
///
/// A shape that refers back to one of these gets a deferred routine instead
/// of recursing forever.
#[derive(Debug, Default)]
struct InProgress(Vec<TypeId>);

impl InProgress {
    fn contains(&self, shape: &Shape) -> bool {
        self.0.contains(&shape.id)
    }

    fn push(&mut self, shape: &Shape) {
        self.0.push(shape.id);
    }

    fn pop(&mut self) {
        self.0.pop();
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Nested routines finished while an enclosing shape is still compiling.
///
/// They may hold deferred references to that enclosing shape, so they are
/// published only once the outermost compilation succeeds.
struct Pending<R: ?Sized>(Vec<(Shape, Arc<R>)>);

impl<R: ?Sized> Default for Pending<R> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<R: ?Sized> Pending<R> {
    fn get(&self, shape: &Shape) -> Option<Arc<R>> {
        self.0
            .iter()
            .find(|(pending, _)| pending.id == shape.id)
            .map(|(_, routine)| Arc::clone(routine))
    }

    fn push(&mut self, shape: Shape, routine: Arc<R>) {
        self.0.push((shape, routine));
    }

    fn take(&mut self) -> Vec<(Shape, Arc<R>)> {
        std::mem::take(&mut self.0)
    }

    fn clear(&mut self) {
        self.0.clear();
    }
}

fn unsupported(shape: &Shape, reason: impl Into<String>) -> JsonError {
    JsonError::new(JsonErrorKind::UnsupportedType {
        type_name: shape.type_name,
        reason: reason.into(),
    })
}

/// Scalar kinds that have no JSON spelling in this codec.
fn rejected_scalar(shape: &Shape, kind: ScalarKind) -> JsonError {
    unsupported(shape, format!("`{}` values have no JSON mapping", kind.name()))
}
