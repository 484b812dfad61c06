//! Process-wide cache of compiled codecs.
//!
//! Routines are keyed by `TypeId` and published once: when two threads compile
//! the same type concurrently, the first one to take the write lock wins and
//! the other discards its copy. Compilation never happens under a lock, and a
//! type that fails to compile is not recorded, so the next call tries again.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use gale_core::{Shape, Shaped};
use parking_lot::RwLock;
use tracing::debug;

use crate::JsonError;
use crate::compile::{Decoder, DecoderCompiler, Encoder, EncoderCompiler};

type RoutineMap<R> = RwLock<HashMap<TypeId, Arc<R>>>;

/// A set of compiled decoders and encoders.
///
/// Registries live for the rest of the process: the global one is created on
/// first use, and [`Registry::isolated`] leaks a fresh one.
#[derive(Default)]
pub struct Registry {
    decoders: RoutineMap<dyn Decoder>,
    encoders: RoutineMap<dyn Encoder>,
}

static GLOBAL: OnceLock<Registry> = OnceLock::new();

impl Registry {
    /// The registry used by the crate-level functions.
    pub fn global() -> &'static Registry {
        GLOBAL.get_or_init(Registry::default)
    }

    /// A new, empty registry that shares nothing with the global one.
    pub fn isolated() -> &'static Registry {
        Box::leak(Box::new(Registry::default()))
    }

    /// Returns the decoder for `shape`, compiling it on first use.
    pub fn decoder(&'static self, shape: &Shape) -> Result<Arc<dyn Decoder>, JsonError> {
        DecoderCompiler::new(self).decoder(shape)
    }

    /// Returns the encoder for `shape`, compiling it on first use.
    pub fn encoder(&'static self, shape: &Shape) -> Result<Arc<dyn Encoder>, JsonError> {
        EncoderCompiler::new(self).encoder(shape)
    }

    /// Shorthand for `self.decoder(&T::shape())`.
    pub fn decoder_for<T: Shaped>(&'static self) -> Result<Arc<dyn Decoder>, JsonError> {
        self.decoder(&T::shape())
    }

    /// Shorthand for `self.encoder(&T::shape())`.
    pub fn encoder_for<T: Shaped>(&'static self) -> Result<Arc<dyn Encoder>, JsonError> {
        self.encoder(&T::shape())
    }

    /// True if a decoder for `id` has been published.
    pub fn has_decoder(&self, id: TypeId) -> bool {
        self.decoders.read().contains_key(&id)
    }

    /// True if an encoder for `id` has been published.
    pub fn has_encoder(&self, id: TypeId) -> bool {
        self.encoders.read().contains_key(&id)
    }

    /// Number of published decoders.
    pub fn decoder_count(&self) -> usize {
        self.decoders.read().len()
    }

    /// Number of published encoders.
    pub fn encoder_count(&self) -> usize {
        self.encoders.read().len()
    }

    pub(crate) fn cached_decoder(&self, id: TypeId) -> Option<Arc<dyn Decoder>> {
        self.decoders.read().get(&id).cloned()
    }

    pub(crate) fn cached_encoder(&self, id: TypeId) -> Option<Arc<dyn Encoder>> {
        self.encoders.read().get(&id).cloned()
    }

    /// Stores `decoder` unless another thread got there first, and returns
    /// whichever one is now published.
    pub(crate) fn publish_decoder(&self, shape: &Shape, decoder: Arc<dyn Decoder>) -> Arc<dyn Decoder> {
        let mut decoders = self.decoders.write();
        let published = decoders.entry(shape.id).or_insert(decoder).clone();
        debug!(shape = shape.type_name, total = decoders.len(), "published decoder");
        published
    }

    /// Stores `encoder` unless another thread got there first, and returns
    /// whichever one is now published.
    pub(crate) fn publish_encoder(&self, shape: &Shape, encoder: Arc<dyn Encoder>) -> Arc<dyn Encoder> {
        let mut encoders = self.encoders.write();
        let published = encoders.entry(shape.id).or_insert(encoder).clone();
        debug!(shape = shape.type_name, total = encoders.len(), "published encoder");
        published
    }
}

impl core::fmt::Debug for Registry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Registry")
            .field("decoders", &self.decoder_count())
            .field("encoders", &self.encoder_count())
            .finish()
    }
}
