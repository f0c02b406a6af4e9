use std::str::FromStr;

use half::{bf16, f16};
use serde::{Deserialize, Serialize};

use crate::error::ArrayError;

#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, PartialOrd, Serialize, Deserialize)]
pub enum DType {
    F64,
    F32,
    BF16,
    F16,
    U64,
    I64,
    U32,
    I32,
    U16,
    I16,
    U8,
    I8,
    BOOL,
    C64,
    C128,
}

/// Coarse classification used by literal-based dtype inference and promotion.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, PartialOrd, Ord, strum_macros::Display)]
pub enum DTypeKind {
    Bool,
    UnsignedInt,
    SignedInt,
    Float,
    Complex,
}

impl DType {
    pub const ALL: [DType; 15] = [
        DType::F64,
        DType::F32,
        DType::BF16,
        DType::F16,
        DType::U64,
        DType::I64,
        DType::U32,
        DType::I32,
        DType::U16,
        DType::I16,
        DType::U8,
        DType::I8,
        DType::BOOL,
        DType::C64,
        DType::C128,
    ];

    pub fn size(&self) -> usize {
        match self {
            DType::F64 => 8,
            DType::F32 => 4,
            DType::BF16 => 2,
            DType::F16 => 2,
            DType::U64 => 8,
            DType::I64 => 8,
            DType::U32 => 4,
            DType::I32 => 4,
            DType::U16 => 2,
            DType::I16 => 2,
            DType::U8 => 1,
            DType::I8 => 1,
            DType::BOOL => 1,
            DType::C64 => 8,
            DType::C128 => 16,
        }
    }

    pub fn kind(&self) -> DTypeKind {
        match self {
            DType::F64 | DType::F32 | DType::BF16 | DType::F16 => DTypeKind::Float,
            DType::I64 | DType::I32 | DType::I16 | DType::I8 => DTypeKind::SignedInt,
            DType::U64 | DType::U32 | DType::U16 | DType::U8 => DTypeKind::UnsignedInt,
            DType::BOOL => DTypeKind::Bool,
            DType::C64 | DType::C128 => DTypeKind::Complex,
        }
    }

    pub fn is_float(&self) -> bool {
        self.kind() == DTypeKind::Float
    }

    pub fn is_int(&self) -> bool {
        matches!(self.kind(), DTypeKind::SignedInt | DTypeKind::UnsignedInt)
    }

    pub fn is_uint(&self) -> bool {
        self.kind() == DTypeKind::UnsignedInt
    }

    pub fn is_complex(&self) -> bool {
        self.kind() == DTypeKind::Complex
    }

    pub fn is_bool(&self) -> bool {
        *self == DType::BOOL
    }

    fn signed_of_size(size: usize) -> Option<DType> {
        match size {
            1 => Some(DType::I8),
            2 => Some(DType::I16),
            4 => Some(DType::I32),
            8 => Some(DType::I64),
            _ => None,
        }
    }

    /// Result dtype of a binary operation between `a` and `b`.
    ///
    /// Follows the array-API lattice: bool < integers < floats < complex. Mixed
    /// signed/unsigned integers go to the smallest signed type holding both, and
    /// `u64` mixed with any signed type promotes to `f64`.
    pub fn promote_types(a: DType, b: DType) -> DType {
        if a == b {
            return a;
        }
        let (ka, kb) = (a.kind(), b.kind());
        match (ka, kb) {
            (DTypeKind::Bool, _) => b,
            (_, DTypeKind::Bool) => a,
            (DTypeKind::Complex, _) | (_, DTypeKind::Complex) => {
                if a == DType::C128 || b == DType::C128 || a == DType::F64 || b == DType::F64 {
                    DType::C128
                } else {
                    DType::C64
                }
            }
            (DTypeKind::Float, DTypeKind::Float) => {
                if a.size() == b.size() {
                    // bf16 and f16 only meet in f32
                    DType::F32
                } else if a.size() > b.size() {
                    a
                } else {
                    b
                }
            }
            (DTypeKind::Float, _) => a,
            (_, DTypeKind::Float) => b,
            (ka, kb) if ka == kb => {
                if a.size() >= b.size() {
                    a
                } else {
                    b
                }
            }
            _ => {
                let (signed, unsigned) = if ka == DTypeKind::SignedInt { (a, b) } else { (b, a) };
                if unsigned.size() < signed.size() {
                    signed
                } else {
                    DType::signed_of_size(unsigned.size() * 2).unwrap_or(DType::F64)
                }
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DType::F64 => "float64",
            DType::F32 => "float32",
            DType::BF16 => "bfloat16",
            DType::F16 => "float16",
            DType::U64 => "uint64",
            DType::I64 => "int64",
            DType::U32 => "uint32",
            DType::I32 => "int32",
            DType::U16 => "uint16",
            DType::I16 => "int16",
            DType::U8 => "uint8",
            DType::I8 => "int8",
            DType::BOOL => "bool",
            DType::C64 => "complex64",
            DType::C128 => "complex128",
        }
    }
}

impl std::fmt::Display for DType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DType::F64 => write!(f, "Float64"),
            DType::F32 => write!(f, "Float32"),
            DType::BF16 => write!(f, "BFloat16"),
            DType::F16 => write!(f, "Float16"),
            DType::I64 => write!(f, "Int64"),
            DType::I32 => write!(f, "Int32"),
            DType::U64 => write!(f, "UInt64"),
            DType::U32 => write!(f, "UInt32"),
            DType::I16 => write!(f, "Int16"),
            DType::U16 => write!(f, "UInt16"),
            DType::U8 => write!(f, "UInt8"),
            DType::I8 => write!(f, "Int8"),
            DType::BOOL => write!(f, "Bool"),
            DType::C64 => write!(f, "Complex64"),
            DType::C128 => write!(f, "Complex128"),
        }
    }
}

impl FromStr for DType {
    type Err = ArrayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Ok(match lowered.as_str() {
            "float64" | "f64" | "double" => DType::F64,
            "float32" | "f32" | "float" => DType::F32,
            "bfloat16" | "bf16" => DType::BF16,
            "float16" | "f16" | "half" => DType::F16,
            "uint64" | "u64" => DType::U64,
            "int64" | "i64" => DType::I64,
            "uint32" | "u32" => DType::U32,
            "int32" | "i32" | "int" => DType::I32,
            "uint16" | "u16" => DType::U16,
            "int16" | "i16" => DType::I16,
            "uint8" | "u8" => DType::U8,
            "int8" | "i8" => DType::I8,
            "bool" => DType::BOOL,
            "complex64" | "c64" => DType::C64,
            "complex128" | "c128" => DType::C128,
            _ => return Err(ArrayError::Value(format!("unknown dtype {s:?}"))),
        })
    }
}

#[cfg(feature = "candle")]
impl TryFrom<DType> for candle_core::DType {
    type Error = ArrayError;
    fn try_from(value: DType) -> Result<Self, Self::Error> {
        Ok(match value {
            DType::F64 => candle_core::DType::F64,
            DType::F32 => candle_core::DType::F32,
            DType::BF16 => candle_core::DType::BF16,
            DType::F16 => candle_core::DType::F16,
            DType::I64 => candle_core::DType::I64,
            DType::U32 => candle_core::DType::U32,
            DType::U8 => candle_core::DType::U8,
            _ => Err(ArrayError::UnsupportedDtype {
                dtype: value,
                backend: "candle".to_string(),
            })?,
        })
    }
}

#[cfg(feature = "candle")]
impl From<candle_core::DType> for DType {
    #[allow(unreachable_patterns)]
    fn from(value: candle_core::DType) -> Self {
        match value {
            candle_core::DType::F64 => DType::F64,
            candle_core::DType::F32 => DType::F32,
            candle_core::DType::BF16 => DType::BF16,
            candle_core::DType::F16 => DType::F16,
            candle_core::DType::I64 => DType::I64,
            candle_core::DType::U8 => DType::U8,
            candle_core::DType::U32 => DType::U32,
            // 8-bit float storage formats surface as the narrowest unified float
            _ => DType::F16,
        }
    }
}

pub trait DTypeOfPrimitive {
    const DTYPE: DType;
}

impl DTypeOfPrimitive for f64 { const DTYPE: DType = DType::F64; }
impl DTypeOfPrimitive for f32 { const DTYPE: DType = DType::F32; }
impl DTypeOfPrimitive for bf16 { const DTYPE: DType = DType::BF16; }
impl DTypeOfPrimitive for f16 { const DTYPE: DType = DType::F16; }
impl DTypeOfPrimitive for i64 { const DTYPE: DType = DType::I64; }
impl DTypeOfPrimitive for u64 { const DTYPE: DType = DType::U64; }
impl DTypeOfPrimitive for i32 { const DTYPE: DType = DType::I32; }
impl DTypeOfPrimitive for u32 { const DTYPE: DType = DType::U32; }
impl DTypeOfPrimitive for i16 { const DTYPE: DType = DType::I16; }
impl DTypeOfPrimitive for u16 { const DTYPE: DType = DType::U16; }
impl DTypeOfPrimitive for i8 { const DTYPE: DType = DType::I8; }
impl DTypeOfPrimitive for u8 { const DTYPE: DType = DType::U8; }
impl DTypeOfPrimitive for bool { const DTYPE: DType = DType::BOOL; }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn promotion_follows_lattice() {
        assert_eq!(DType::promote_types(DType::I32, DType::F32), DType::F32);
        assert_eq!(DType::promote_types(DType::U8, DType::I8), DType::I16);
        assert_eq!(DType::promote_types(DType::U8, DType::I32), DType::I32);
        assert_eq!(DType::promote_types(DType::U64, DType::I64), DType::F64);
        assert_eq!(DType::promote_types(DType::BF16, DType::F16), DType::F32);
        assert_eq!(DType::promote_types(DType::BOOL, DType::U16), DType::U16);
        assert_eq!(DType::promote_types(DType::C64, DType::F64), DType::C128);
    }

    #[test]
    fn parses_common_spellings() {
        assert_eq!("float32".parse::<DType>().unwrap(), DType::F32);
        assert_eq!("UInt16".parse::<DType>().unwrap(), DType::U16);
        assert_eq!("bf16".parse::<DType>().unwrap(), DType::BF16);
        assert!("float8".parse::<DType>().is_err());
    }
}
