use std::any::{Any, type_name};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, OnceLock};

use gale_core::{
    Def, FieldGetMutFn, ListDef, MapDef, OptionDef, PointerDef, ScalarKind, Shape, StructDef,
    downcast_mut,
};
use tracing::{debug, trace};

use super::{Decoder, InProgress, Pending, rejected_scalar, unsupported};
use crate::{JsonError, JsonErrorKind, Registry, Tokenizer, dynamic};

/// First allocation for a list that starts out empty.
const INITIAL_LIST_CAPACITY: usize = 8;

/// Compiles decoders for one top-level request.
pub(crate) struct DecoderCompiler {
    registry: &'static Registry,
    in_progress: InProgress,
    pending: Pending<dyn Decoder>,
}

impl DecoderCompiler {
    pub(crate) fn new(registry: &'static Registry) -> Self {
        Self {
            registry,
            in_progress: InProgress::default(),
            pending: Pending::default(),
        }
    }

    /// Looks `shape` up in the registry, compiling and publishing it if needed.
    pub(crate) fn decoder(&mut self, shape: &Shape) -> Result<Arc<dyn Decoder>, JsonError> {
        if let Some(decoder) = self.registry.cached_decoder(shape.id) {
            return Ok(decoder);
        }
        if let Some(decoder) = self.pending.get(shape) {
            return Ok(decoder);
        }
        if self.in_progress.contains(shape) {
            trace!(shape = shape.type_name, "deferring recursive decoder");
            return Ok(Arc::new(DeferredDecoder {
                registry: self.registry,
                shape: *shape,
                resolved: OnceLock::new(),
            }));
        }

        self.in_progress.push(shape);
        let compiled = self.compile(shape);
        self.in_progress.pop();

        match compiled {
            Ok(decoder) => {
                debug!(shape = shape.type_name, kind = shape.def.kind(), "compiled decoder");
                if !self.in_progress.is_empty() {
                    self.pending.push(*shape, Arc::clone(&decoder));
                    return Ok(decoder);
                }
                for (nested, routine) in self.pending.take() {
                    self.registry.publish_decoder(&nested, routine);
                }
                Ok(self.registry.publish_decoder(shape, decoder))
            }
            Err(err) => {
                debug!(shape = shape.type_name, error = %err, "decoder compilation failed");
                if self.in_progress.is_empty() {
                    self.pending.clear();
                }
                Err(err)
            }
        }
    }

    fn compile(&mut self, shape: &Shape) -> Result<Arc<dyn Decoder>, JsonError> {
        match shape.def {
            Def::Scalar(kind) => scalar_decoder(shape, kind),
            Def::Struct(def) => self.compile_struct(shape, def),
            Def::List(def) => Ok(Arc::new(ListDecoder {
                item: self.decoder(&(def.item)())?,
                def,
            })),
            Def::Map(def) => self.compile_map(shape, def),
            Def::Option(def) => Ok(Arc::new(OptionDecoder {
                inner: self.decoder(&(def.inner)())?,
                def,
            })),
            Def::Pointer(def) => Ok(Arc::new(PointerDecoder {
                pointee: self.decoder(&(def.pointee)())?,
                def,
            })),
            Def::Dynamic => Ok(Arc::new(dynamic::ValueDecoder)),
        }
    }

    fn compile_struct(&mut self, shape: &Shape, def: StructDef) -> Result<Arc<dyn Decoder>, JsonError> {
        let mut fields = HashMap::with_capacity(def.fields.len());
        for field in def.fields {
            if field.tag == Some("-") {
                continue;
            }
            let name = field.wire_name();
            let plan = FieldPlan {
                get_mut: field.get_mut,
                decoder: self.decoder(&field.shape())?,
            };
            if fields.insert(name, plan).is_some() {
                return Err(unsupported(
                    shape,
                    format!("more than one field is named `{name}` on the wire"),
                ));
            }
        }
        Ok(Arc::new(StructDecoder { fields }))
    }

    fn compile_map(&mut self, shape: &Shape, def: MapDef) -> Result<Arc<dyn Decoder>, JsonError> {
        let key = (def.key)();
        if !key.is::<String>() {
            return Err(unsupported(
                shape,
                format!("map keys must be `String`, not `{}`", key.type_name),
            ));
        }
        Ok(Arc::new(MapDecoder {
            value: self.decoder(&(def.value)())?,
            def,
        }))
    }
}

fn scalar_decoder(shape: &Shape, kind: ScalarKind) -> Result<Arc<dyn Decoder>, JsonError> {
    let decoder: Arc<dyn Decoder> = match kind {
        ScalarKind::Bool => Arc::new(BoolDecoder),
        ScalarKind::String => Arc::new(StringDecoder),
        ScalarKind::I8 => Arc::new(SignedDecoder::<i8>::new()),
        ScalarKind::I16 => Arc::new(SignedDecoder::<i16>::new()),
        ScalarKind::I32 => Arc::new(SignedDecoder::<i32>::new()),
        ScalarKind::I64 => Arc::new(SignedDecoder::<i64>::new()),
        ScalarKind::ISize => Arc::new(SignedDecoder::<isize>::new()),
        ScalarKind::U8 => Arc::new(UnsignedDecoder::<u8>::new()),
        ScalarKind::U16 => Arc::new(UnsignedDecoder::<u16>::new()),
        ScalarKind::U32 => Arc::new(UnsignedDecoder::<u32>::new()),
        ScalarKind::U64 => Arc::new(UnsignedDecoder::<u64>::new()),
        ScalarKind::USize => Arc::new(UnsignedDecoder::<usize>::new()),
        ScalarKind::F32 => Arc::new(F32Decoder),
        ScalarKind::F64 => Arc::new(F64Decoder),
        other => return Err(rejected_scalar(shape, other)),
    };
    Ok(decoder)
}

// ----------------------------------------------------------------------------
// Scalars
// ----------------------------------------------------------------------------

struct BoolDecoder;

impl Decoder for BoolDecoder {
    fn decode(&self, tok: &mut Tokenizer<'_>, dst: &mut dyn Any) -> Result<(), JsonError> {
        *downcast_mut::<bool>(dst)? = tok.read_bool()?;
        Ok(())
    }
}

struct StringDecoder;

impl Decoder for StringDecoder {
    fn decode(&self, tok: &mut Tokenizer<'_>, dst: &mut dyn Any) -> Result<(), JsonError> {
        let value = tok.read_string()?;
        let dst = downcast_mut::<String>(dst)?;
        dst.clear();
        dst.push_str(&value);
        Ok(())
    }
}

/// Reads an `i64` and narrows it to `T`.
struct SignedDecoder<T>(PhantomData<fn() -> T>);

impl<T> SignedDecoder<T> {
    fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T: TryFrom<i64> + Any> Decoder for SignedDecoder<T> {
    fn decode(&self, tok: &mut Tokenizer<'_>, dst: &mut dyn Any) -> Result<(), JsonError> {
        let start = number_start(tok);
        let wide = tok.read_i64()?;
        *downcast_mut::<T>(dst)? = narrow(wide, start)?;
        Ok(())
    }
}

/// Reads a `u64` and narrows it to `T`.
struct UnsignedDecoder<T>(PhantomData<fn() -> T>);

impl<T> UnsignedDecoder<T> {
    fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T: TryFrom<u64> + Any> Decoder for UnsignedDecoder<T> {
    fn decode(&self, tok: &mut Tokenizer<'_>, dst: &mut dyn Any) -> Result<(), JsonError> {
        let start = number_start(tok);
        let wide = tok.read_u64()?;
        *downcast_mut::<T>(dst)? = narrow(wide, start)?;
        Ok(())
    }
}

/// Offset of the next significant byte, where a number literal would begin.
fn number_start(tok: &mut Tokenizer<'_>) -> usize {
    let _ = tok.peek();
    tok.position()
}

fn narrow<W, T: TryFrom<W>>(wide: W, start: usize) -> Result<T, JsonError> {
    T::try_from(wide).map_err(|_| {
        JsonError::at(
            JsonErrorKind::NumberOutOfRange {
                target: type_name::<T>(),
            },
            start,
        )
    })
}

struct F32Decoder;

impl Decoder for F32Decoder {
    fn decode(&self, tok: &mut Tokenizer<'_>, dst: &mut dyn Any) -> Result<(), JsonError> {
        *downcast_mut::<f32>(dst)? = tok.read_f32()?;
        Ok(())
    }
}

struct F64Decoder;

impl Decoder for F64Decoder {
    fn decode(&self, tok: &mut Tokenizer<'_>, dst: &mut dyn Any) -> Result<(), JsonError> {
        *downcast_mut::<f64>(dst)? = tok.read_f64()?;
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

struct FieldPlan {
    get_mut: FieldGetMutFn,
    decoder: Arc<dyn Decoder>,
}

/// Fills the fields whose wire names appear in the object. Unknown keys are
/// skipped, and fields missing from the input are left alone.
struct StructDecoder {
    fields: HashMap<&'static str, FieldPlan>,
}

impl Decoder for StructDecoder {
    fn decode(&self, tok: &mut Tokenizer<'_>, dst: &mut dyn Any) -> Result<(), JsonError> {
        tok.expect_object_start()?;
        tok.descend()?;
        if !tok.eat(b'}') {
            loop {
                let key = tok.read_string()?;
                tok.expect_colon()?;
                match self.fields.get(&*key) {
                    Some(plan) => plan.decoder.decode(tok, (plan.get_mut)(dst)?)?,
                    None => tok.skip_value()?,
                }
                if !tok.object_comma_or_end()? {
                    break;
                }
            }
        }
        tok.ascend();
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Containers
// ----------------------------------------------------------------------------

struct ListDecoder {
    def: ListDef,
    item: Arc<dyn Decoder>,
}

impl Decoder for ListDecoder {
    fn decode(&self, tok: &mut Tokenizer<'_>, dst: &mut dyn Any) -> Result<(), JsonError> {
        let def = &self.def;
        if tok.eat_null()? {
            (def.release)(dst)?;
            return Ok(());
        }

        tok.expect_array_start()?;
        tok.descend()?;
        (def.clear)(dst)?;
        if !tok.eat(b']') {
            loop {
                let len = (def.len)(dst)?;
                let capacity = (def.capacity)(dst)?;
                if len == capacity {
                    let additional = if capacity == 0 {
                        INITIAL_LIST_CAPACITY
                    } else {
                        capacity
                    };
                    (def.reserve_exact)(dst, additional)?;
                }
                let item = (def.push_default)(dst)?;
                self.item.decode(tok, item)?;
                if !tok.array_comma_or_end()? {
                    break;
                }
            }
        }
        tok.ascend();
        Ok(())
    }
}

/// Decodes objects into maps keyed by `String`.
struct MapDecoder {
    def: MapDef,
    value: Arc<dyn Decoder>,
}

impl Decoder for MapDecoder {
    fn decode(&self, tok: &mut Tokenizer<'_>, dst: &mut dyn Any) -> Result<(), JsonError> {
        let def = &self.def;
        if tok.eat_null()? {
            (def.reset)(dst)?;
            return Ok(());
        }

        tok.expect_object_start()?;
        tok.descend()?;
        if (def.is_unset)(dst)? {
            (def.init)(dst)?;
        }
        if !tok.eat(b'}') {
            loop {
                let key = tok.read_string()?.into_owned();
                tok.expect_colon()?;
                let slot = (def.insert_default)(dst, Box::new(key))?;
                self.value.decode(tok, slot)?;
                if !tok.object_comma_or_end()? {
                    break;
                }
            }
        }
        tok.ascend();
        Ok(())
    }
}

struct OptionDecoder {
    def: OptionDef,
    inner: Arc<dyn Decoder>,
}

impl Decoder for OptionDecoder {
    fn decode(&self, tok: &mut Tokenizer<'_>, dst: &mut dyn Any) -> Result<(), JsonError> {
        if tok.eat_null()? {
            (self.def.set_none)(dst)?;
            return Ok(());
        }
        let inner = (self.def.get_or_insert_default)(dst)?;
        self.inner.decode(tok, inner)
    }
}

struct PointerDecoder {
    def: PointerDef,
    pointee: Arc<dyn Decoder>,
}

impl Decoder for PointerDecoder {
    fn decode(&self, tok: &mut Tokenizer<'_>, dst: &mut dyn Any) -> Result<(), JsonError> {
        self.pointee.decode(tok, (self.def.get_mut)(dst)?)
    }
}

/// Stands in for a shape that was still being compiled when something inside
/// it referred back to it. The finished decoder is fetched on first use.
struct DeferredDecoder {
    registry: &'static Registry,
    shape: Shape,
    resolved: OnceLock<Arc<dyn Decoder>>,
}

impl DeferredDecoder {
    fn target(&self) -> Result<&Arc<dyn Decoder>, JsonError> {
        if let Some(decoder) = self.resolved.get() {
            return Ok(decoder);
        }
        let decoder = self.registry.decoder(&self.shape)?;
        Ok(self.resolved.get_or_init(|| decoder))
    }
}

impl Decoder for DeferredDecoder {
    fn decode(&self, tok: &mut Tokenizer<'_>, dst: &mut dyn Any) -> Result<(), JsonError> {
        self.target()?.decode(tok, dst)
    }
}
