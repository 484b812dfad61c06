/// Leaf value kinds.
///
/// Not every format supports every kind; gale-json, for instance, refuses to
/// compile a codec for `char` or 128-bit integers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ScalarKind {
    /// `()`
    Unit,
    /// `bool`
    Bool,
    /// `String`
    String,
    /// `char`
    Char,
    /// `i8`
    I8,
    /// `i16`
    I16,
    /// `i32`
    I32,
    /// `i64`
    I64,
    /// `i128`
    I128,
    /// `isize`
    ISize,
    /// `u8`
    U8,
    /// `u16`
    U16,
    /// `u32`
    U32,
    /// `u64`
    U64,
    /// `u128`
    U128,
    /// `usize`
    USize,
    /// `f32`
    F32,
    /// `f64`
    F64,
}

impl ScalarKind {
    /// The Rust spelling of the type.
    pub const fn name(self) -> &'static str {
        match self {
            ScalarKind::Unit => "()",
            ScalarKind::Bool => "bool",
            ScalarKind::String => "String",
            ScalarKind::Char => "char",
            ScalarKind::I8 => "i8",
            ScalarKind::I16 => "i16",
            ScalarKind::I32 => "i32",
            ScalarKind::I64 => "i64",
            ScalarKind::I128 => "i128",
            ScalarKind::ISize => "isize",
            ScalarKind::U8 => "u8",
            ScalarKind::U16 => "u16",
            ScalarKind::U32 => "u32",
            ScalarKind::U64 => "u64",
            ScalarKind::U128 => "u128",
            ScalarKind::USize => "usize",
            ScalarKind::F32 => "f32",
            ScalarKind::F64 => "f64",
        }
    }

    /// Returns true for the integer kinds.
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            ScalarKind::I8
                | ScalarKind::I16
                | ScalarKind::I32
                | ScalarKind::I64
                | ScalarKind::I128
                | ScalarKind::ISize
                | ScalarKind::U8
                | ScalarKind::U16
                | ScalarKind::U32
                | ScalarKind::U64
                | ScalarKind::U128
                | ScalarKind::USize
        )
    }

    /// Returns true for `f32` and `f64`.
    pub const fn is_float(self) -> bool {
        matches!(self, ScalarKind::F32 | ScalarKind::F64)
    }
}
