use half::{bf16, f16};
use serde::{Deserialize, Serialize};

use crate::dtype::{DType, DTypeKind};

/// A single host value tagged with its dtype.
///
/// Scalars double as numeric literals for creation functions: an integer-valued
/// scalar passed to `full` or `arange` is classified as an int literal regardless
/// of its width, a float-valued one as a float literal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum NumericScalar {
    F64(f64),
    F32(f32),
    BF16(bf16),
    F16(f16),
    U64(u64),
    I64(i64),
    U32(u32),
    I32(i32),
    U16(u16),
    I16(i16),
    U8(u8),
    I8(i8),
    BOOL(bool),
}

/// Widest lossless form of an element, kept in its integer or float domain so
/// 64-bit integers convert without passing through `f64`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum WideValue {
    Int(i128),
    Float(f64),
}

impl WideValue {
    pub(crate) fn is_nonzero(&self) -> bool {
        match self {
            WideValue::Int(i) => *i != 0,
            WideValue::Float(f) => *f != 0.0,
        }
    }
}

impl NumericScalar {
    pub fn dtype(&self) -> DType {
        match self {
            NumericScalar::F64(_) => DType::F64,
            NumericScalar::F32(_) => DType::F32,
            NumericScalar::BF16(_) => DType::BF16,
            NumericScalar::F16(_) => DType::F16,
            NumericScalar::U64(_) => DType::U64,
            NumericScalar::I64(_) => DType::I64,
            NumericScalar::U32(_) => DType::U32,
            NumericScalar::I32(_) => DType::I32,
            NumericScalar::U16(_) => DType::U16,
            NumericScalar::I16(_) => DType::I16,
            NumericScalar::U8(_) => DType::U8,
            NumericScalar::I8(_) => DType::I8,
            NumericScalar::BOOL(_) => DType::BOOL,
        }
    }

    pub fn kind(&self) -> DTypeKind {
        self.dtype().kind()
    }

    pub fn zero_of(dtype: DType) -> Self {
        Self::from_f64(0.0, dtype)
    }

    /// Lossy conversion through `f64`, saturating like an `as` cast.
    /// Complex dtypes have no scalar form and collapse to `f64`.
    pub fn from_f64(value: f64, dtype: DType) -> Self {
        match dtype {
            DType::F64 | DType::C64 | DType::C128 => NumericScalar::F64(value),
            DType::F32 => NumericScalar::F32(value as f32),
            DType::BF16 => NumericScalar::BF16(bf16::from_f64(value)),
            DType::F16 => NumericScalar::F16(f16::from_f64(value)),
            DType::U64 => NumericScalar::U64(value as u64),
            DType::I64 => NumericScalar::I64(value as i64),
            DType::U32 => NumericScalar::U32(value as u32),
            DType::I32 => NumericScalar::I32(value as i32),
            DType::U16 => NumericScalar::U16(value as u16),
            DType::I16 => NumericScalar::I16(value as i16),
            DType::U8 => NumericScalar::U8(value as u8),
            DType::I8 => NumericScalar::I8(value as i8),
            DType::BOOL => NumericScalar::BOOL(value != 0.0),
        }
    }

    pub fn to_f64(&self) -> f64 {
        match self {
            NumericScalar::F64(x) => *x,
            NumericScalar::F32(x) => *x as f64,
            NumericScalar::BF16(x) => x.to_f64(),
            NumericScalar::F16(x) => x.to_f64(),
            NumericScalar::U64(x) => *x as f64,
            NumericScalar::I64(x) => *x as f64,
            NumericScalar::U32(x) => *x as f64,
            NumericScalar::I32(x) => *x as f64,
            NumericScalar::U16(x) => *x as f64,
            NumericScalar::I16(x) => *x as f64,
            NumericScalar::U8(x) => *x as f64,
            NumericScalar::I8(x) => *x as f64,
            NumericScalar::BOOL(x) => {
                if *x {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    pub(crate) fn to_wide(&self) -> WideValue {
        match self {
            NumericScalar::F64(x) => WideValue::Float(*x),
            NumericScalar::F32(x) => WideValue::Float(*x as f64),
            NumericScalar::BF16(x) => WideValue::Float(x.to_f64()),
            NumericScalar::F16(x) => WideValue::Float(x.to_f64()),
            NumericScalar::U64(x) => WideValue::Int(*x as i128),
            NumericScalar::I64(x) => WideValue::Int(*x as i128),
            NumericScalar::U32(x) => WideValue::Int(*x as i128),
            NumericScalar::I32(x) => WideValue::Int(*x as i128),
            NumericScalar::U16(x) => WideValue::Int(*x as i128),
            NumericScalar::I16(x) => WideValue::Int(*x as i128),
            NumericScalar::U8(x) => WideValue::Int(*x as i128),
            NumericScalar::I8(x) => WideValue::Int(*x as i128),
            NumericScalar::BOOL(x) => WideValue::Int(*x as i128),
        }
    }

    /// Integers wrap into range and floats saturate, like an `as` cast.
    pub fn cast(&self, dtype: DType) -> Self {
        if self.dtype() == dtype {
            return *self;
        }
        match self.to_wide() {
            WideValue::Float(f) => Self::from_f64(f, dtype),
            WideValue::Int(i) => match dtype {
                DType::U64 => NumericScalar::U64(i as u64),
                DType::I64 => NumericScalar::I64(i as i64),
                DType::U32 => NumericScalar::U32(i as u32),
                DType::I32 => NumericScalar::I32(i as i32),
                DType::U16 => NumericScalar::U16(i as u16),
                DType::I16 => NumericScalar::I16(i as i16),
                DType::U8 => NumericScalar::U8(i as u8),
                DType::I8 => NumericScalar::I8(i as i8),
                DType::BOOL => NumericScalar::BOOL(i != 0),
                _ => Self::from_f64(i as f64, dtype),
            },
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            NumericScalar::BOOL(x) => serde_json::Value::Bool(*x),
            NumericScalar::U64(x) => serde_json::Value::from(*x),
            NumericScalar::I64(x) => serde_json::Value::from(*x),
            NumericScalar::U32(x) => serde_json::Value::from(*x),
            NumericScalar::I32(x) => serde_json::Value::from(*x),
            NumericScalar::U16(x) => serde_json::Value::from(*x),
            NumericScalar::I16(x) => serde_json::Value::from(*x),
            NumericScalar::U8(x) => serde_json::Value::from(*x),
            NumericScalar::I8(x) => serde_json::Value::from(*x),
            _ => serde_json::Number::from_f64(self.to_f64())
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
        }
    }
}

impl std::fmt::Display for NumericScalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NumericScalar::F64(x) => write!(f, "{x}"),
            NumericScalar::F32(x) => write!(f, "{x}"),
            NumericScalar::BF16(x) => write!(f, "{x}"),
            NumericScalar::F16(x) => write!(f, "{x}"),
            NumericScalar::U64(x) => write!(f, "{x}"),
            NumericScalar::I64(x) => write!(f, "{x}"),
            NumericScalar::U32(x) => write!(f, "{x}"),
            NumericScalar::I32(x) => write!(f, "{x}"),
            NumericScalar::U16(x) => write!(f, "{x}"),
            NumericScalar::I16(x) => write!(f, "{x}"),
            NumericScalar::U8(x) => write!(f, "{x}"),
            NumericScalar::I8(x) => write!(f, "{x}"),
            NumericScalar::BOOL(x) => write!(f, "{x}"),
        }
    }
}

macro_rules! impl_scalar_from {
    ($t:ty, $variant:ident) => {
        impl From<$t> for NumericScalar {
            fn from(value: $t) -> Self {
                NumericScalar::$variant(value)
            }
        }
    };
}

impl_scalar_from!(f64, F64);
impl_scalar_from!(f32, F32);
impl_scalar_from!(bf16, BF16);
impl_scalar_from!(f16, F16);
impl_scalar_from!(u64, U64);
impl_scalar_from!(i64, I64);
impl_scalar_from!(u32, U32);
impl_scalar_from!(i32, I32);
impl_scalar_from!(u16, U16);
impl_scalar_from!(i16, I16);
impl_scalar_from!(u8, U8);
impl_scalar_from!(i8, I8);
impl_scalar_from!(bool, BOOL);
