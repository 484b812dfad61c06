use std::any::Any;
use std::marker::PhantomData;
use std::sync::{Arc, OnceLock};

use gale_core::{
    Def, FieldGetFn, ListDef, MapDef, OptionDef, PointerDef, ScalarKind, Shape, StructDef,
    downcast_ref,
};
use tracing::{debug, trace};

use super::{Encoder, InProgress, Pending, rejected_scalar, unsupported};
use crate::{JsonError, Registry, Writer, dynamic};

/// Compiles encoders for one top-level request.
pub(crate) struct EncoderCompiler {
    registry: &'static Registry,
    in_progress: InProgress,
    pending: Pending<dyn Encoder>,
}

impl EncoderCompiler {
    pub(crate) fn new(registry: &'static Registry) -> Self {
        Self {
            registry,
            in_progress: InProgress::default(),
            pending: Pending::default(),
        }
    }

    /// Looks `shape` up in the registry, compiling and publishing it if needed.
    pub(crate) fn encoder(&mut self, shape: &Shape) -> Result<Arc<dyn Encoder>, JsonError> {
        if let Some(encoder) = self.registry.cached_encoder(shape.id) {
            return Ok(encoder);
        }
        if let Some(encoder) = self.pending.get(shape) {
            return Ok(encoder);
        }
        if self.in_progress.contains(shape) {
            trace!(shape = shape.type_name, "deferring recursive encoder");
            return Ok(Arc::new(DeferredEncoder {
                registry: self.registry,
                shape: *shape,
                resolved: OnceLock::new(),
            }));
        }

        match self.compile_uncached(shape) {
            Ok(encoder) => {
                debug!(shape = shape.type_name, kind = shape.def.kind(), "compiled encoder");
                if !self.in_progress.is_empty() {
                    self.pending.push(*shape, Arc::clone(&encoder));
                    return Ok(encoder);
                }
                for (nested, routine) in self.pending.take() {
                    self.registry.publish_encoder(&nested, routine);
                }
                Ok(self.registry.publish_encoder(shape, encoder))
            }
            Err(err) => {
                debug!(shape = shape.type_name, error = %err, "encoder compilation failed");
                if self.in_progress.is_empty() {
                    self.pending.clear();
                }
                Err(err)
            }
        }
    }

    /// Compiles `shape` without publishing it. Nested routines stay pending
    /// and are dropped with the compiler.
    pub(crate) fn compile_uncached(&mut self, shape: &Shape) -> Result<Arc<dyn Encoder>, JsonError> {
        self.in_progress.push(shape);
        let compiled = self.compile(shape);
        self.in_progress.pop();
        compiled
    }

    fn compile(&mut self, shape: &Shape) -> Result<Arc<dyn Encoder>, JsonError> {
        match shape.def {
            Def::Scalar(kind) => scalar_encoder(shape, kind),
            Def::Struct(def) => self.compile_struct(def),
            Def::List(def) => Ok(Arc::new(ListEncoder {
                item: self.encoder(&(def.item)())?,
                def,
            })),
            Def::Map(def) => {
                let key = (def.key)();
                if !key.is::<String>() {
                    return Err(unsupported(
                        shape,
                        format!("map keys must be `String`, not `{}`", key.type_name),
                    ));
                }
                Ok(Arc::new(MapEncoder {
                    value: self.encoder(&(def.value)())?,
                    def,
                }))
            }
            Def::Option(def) => Ok(Arc::new(OptionEncoder {
                inner: self.encoder(&(def.inner)())?,
                def,
            })),
            Def::Pointer(def) => Ok(Arc::new(PointerEncoder {
                pointee: self.encoder(&(def.pointee)())?,
                def,
            })),
            Def::Dynamic => Ok(Arc::new(dynamic::ValueEncoder::new(self.registry))),
        }
    }

    fn compile_struct(&mut self, def: StructDef) -> Result<Arc<dyn Encoder>, JsonError> {
        let mut plans = Vec::with_capacity(def.fields.len());
        for field in def.fields {
            if field.tag == Some("-") {
                continue;
            }
            let mut prefix = Writer::new();
            if !plans.is_empty() {
                prefix.write_byte(b',');
            }
            prefix.write_str_escaped(field.wire_name());
            prefix.write_byte(b':');
            plans.push(FieldPlan {
                prefix: prefix.into_bytes().into_boxed_slice(),
                get: field.get,
                encoder: self.encoder(&field.shape())?,
            });
        }
        Ok(Arc::new(StructEncoder { plans }))
    }
}

fn scalar_encoder(shape: &Shape, kind: ScalarKind) -> Result<Arc<dyn Encoder>, JsonError> {
    let encoder: Arc<dyn Encoder> = match kind {
        ScalarKind::Bool => Arc::new(BoolEncoder),
        ScalarKind::String => Arc::new(StringEncoder),
        ScalarKind::I8 => Arc::new(IntEncoder::<i8>::new()),
        ScalarKind::I16 => Arc::new(IntEncoder::<i16>::new()),
        ScalarKind::I32 => Arc::new(IntEncoder::<i32>::new()),
        ScalarKind::I64 => Arc::new(IntEncoder::<i64>::new()),
        ScalarKind::ISize => Arc::new(IntEncoder::<isize>::new()),
        ScalarKind::U8 => Arc::new(IntEncoder::<u8>::new()),
        ScalarKind::U16 => Arc::new(IntEncoder::<u16>::new()),
        ScalarKind::U32 => Arc::new(IntEncoder::<u32>::new()),
        ScalarKind::U64 => Arc::new(IntEncoder::<u64>::new()),
        ScalarKind::USize => Arc::new(IntEncoder::<usize>::new()),
        ScalarKind::F32 => Arc::new(F32Encoder),
        ScalarKind::F64 => Arc::new(F64Encoder),
        other => return Err(rejected_scalar(shape, other)),
    };
    Ok(encoder)
}

// ----------------------------------------------------------------------------
// Scalars
// ----------------------------------------------------------------------------

struct BoolEncoder;

impl Encoder for BoolEncoder {
    fn encode(&self, w: &mut Writer, src: &dyn Any) -> Result<(), JsonError> {
        w.write_bool(*downcast_ref::<bool>(src)?);
        Ok(())
    }
}

struct StringEncoder;

impl Encoder for StringEncoder {
    fn encode(&self, w: &mut Writer, src: &dyn Any) -> Result<(), JsonError> {
        w.write_str_escaped(downcast_ref::<String>(src)?);
        Ok(())
    }
}

struct IntEncoder<T>(PhantomData<fn() -> T>);

impl<T> IntEncoder<T> {
    fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T: itoa::Integer + Copy + Any> Encoder for IntEncoder<T> {
    fn encode(&self, w: &mut Writer, src: &dyn Any) -> Result<(), JsonError> {
        w.write_int(*downcast_ref::<T>(src)?);
        Ok(())
    }
}

struct F32Encoder;

impl Encoder for F32Encoder {
    fn encode(&self, w: &mut Writer, src: &dyn Any) -> Result<(), JsonError> {
        w.write_f32(*downcast_ref::<f32>(src)?)
    }
}

struct F64Encoder;

impl Encoder for F64Encoder {
    fn encode(&self, w: &mut Writer, src: &dyn Any) -> Result<(), JsonError> {
        w.write_f64(*downcast_ref::<f64>(src)?)
    }
}

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

struct FieldPlan {
    /// `"name":`, with a leading comma on every field but the first.
    prefix: Box<[u8]>,
    get: FieldGetFn,
    encoder: Arc<dyn Encoder>,
}

struct StructEncoder {
    plans: Vec<FieldPlan>,
}

impl Encoder for StructEncoder {
    fn encode(&self, w: &mut Writer, src: &dyn Any) -> Result<(), JsonError> {
        w.write_byte(b'{');
        for plan in &self.plans {
            w.write_bytes(&plan.prefix);
            plan.encoder.encode(w, (plan.get)(src)?)?;
        }
        w.write_byte(b'}');
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Containers
// ----------------------------------------------------------------------------

/// A list that never allocated is written as `null`.
struct ListEncoder {
    def: ListDef,
    item: Arc<dyn Encoder>,
}

impl Encoder for ListEncoder {
    fn encode(&self, w: &mut Writer, src: &dyn Any) -> Result<(), JsonError> {
        let def = &self.def;
        if (def.capacity)(src)? == 0 {
            w.write_null();
            return Ok(());
        }
        w.write_byte(b'[');
        let mut index = 0;
        while let Some(item) = (def.get)(src, index)? {
            if index > 0 {
                w.write_byte(b',');
            }
            self.item.encode(w, item)?;
            index += 1;
        }
        w.write_byte(b']');
        Ok(())
    }
}

/// An unset map is written as `null`.
struct MapEncoder {
    def: MapDef,
    value: Arc<dyn Encoder>,
}

impl Encoder for MapEncoder {
    fn encode(&self, w: &mut Writer, src: &dyn Any) -> Result<(), JsonError> {
        let def = &self.def;
        if (def.is_unset)(src)? {
            w.write_null();
            return Ok(());
        }
        w.write_byte(b'{');
        for (index, (key, value)) in (def.iter)(src)?.enumerate() {
            if index > 0 {
                w.write_byte(b',');
            }
            w.write_str_escaped(downcast_ref::<String>(key)?);
            w.write_byte(b':');
            self.value.encode(w, value)?;
        }
        w.write_byte(b'}');
        Ok(())
    }
}

struct OptionEncoder {
    def: OptionDef,
    inner: Arc<dyn Encoder>,
}

impl Encoder for OptionEncoder {
    fn encode(&self, w: &mut Writer, src: &dyn Any) -> Result<(), JsonError> {
        match (self.def.get)(src)? {
            Some(inner) => self.inner.encode(w, inner),
            None => {
                w.write_null();
                Ok(())
            }
        }
    }
}

struct PointerEncoder {
    def: PointerDef,
    pointee: Arc<dyn Encoder>,
}

impl Encoder for PointerEncoder {
    fn encode(&self, w: &mut Writer, src: &dyn Any) -> Result<(), JsonError> {
        self.pointee.encode(w, (self.def.get)(src)?)
    }
}

/// Stands in for a shape that was still being compiled when something inside
/// it referred back to it. The finished encoder is fetched on first use.
struct DeferredEncoder {
    registry: &'static Registry,
    shape: Shape,
    resolved: OnceLock<Arc<dyn Encoder>>,
}

impl DeferredEncoder {
    fn target(&self) -> Result<&Arc<dyn Encoder>, JsonError> {
        if let Some(encoder) = self.resolved.get() {
            return Ok(encoder);
        }
        let encoder = self.registry.encoder(&self.shape)?;
        Ok(self.resolved.get_or_init(|| encoder))
    }
}

impl Encoder for DeferredEncoder {
    fn encode(&self, w: &mut Writer, src: &dyn Any) -> Result<(), JsonError> {
        self.target()?.encode(w, src)
    }
}
