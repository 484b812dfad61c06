use crate::{Def, ScalarKind, Shape, Shaped};

macro_rules! impl_shaped_for_scalar {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Shaped for $ty {
                fn shape() -> Shape {
                    Shape::of::<$ty>(Def::Scalar(ScalarKind::$kind))
                }
            }
        )*
    };
}

impl_shaped_for_scalar! {
    () => Unit,
    bool => Bool,
    String => String,
    char => Char,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    i128 => I128,
    isize => ISize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    u128 => U128,
    usize => USize,
    f32 => F32,
    f64 => F64,
}
