use std::fmt::{Display, Formatter};

use half::{bf16, f16};
use ndarray::{ArcArray, Array, IxDyn};

use super::ops::{self, BinaryOp, Element, FloatUnaryOp, ReduceOp};
use crate::dtype::DType;
use crate::numeric_scalar::{NumericScalar, WideValue};

#[derive(Debug, Clone, thiserror::Error)]
pub enum NDArrayNumericTensorError {
    #[error("Requested dtype {0}, but had dtype {1}")]
    WrongDTypeError(DType, DType),
    #[error("Cannot reshape tensor from {0:?} to {1:?}")]
    InvalidReshapeError(Vec<usize>, Vec<usize>),
    #[error("Unsupported operation {0} for dtypes {1:?}")]
    UnsupportedOperationForDTypes(String, Vec<DType>),
    #[error("Shapes {0:?} and {1:?} are not broadcast-compatible")]
    IncompatibleShapes(Vec<usize>, Vec<usize>),
    #[error("Axis {0} is out of range for a tensor of rank {1}")]
    AxisOutOfRange(i64, usize),
    #[error("Invalid element operation: {0}")]
    InvalidElementOperation(String),
    #[error("Cannot reduce an empty axis with {0}")]
    EmptyReduction(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error(transparent)]
    ShapeError(#[from] ndarray::ShapeError),
}

/// Host tensor of any supported element type, always dynamically ranked.
#[derive(Debug, Clone, PartialEq)]
pub enum NDArrayNumericTensor {
    F64(ArcArray<f64, IxDyn>),
    F32(ArcArray<f32, IxDyn>),
    BF16(ArcArray<bf16, IxDyn>),
    F16(ArcArray<f16, IxDyn>),
    U64(ArcArray<u64, IxDyn>),
    I64(ArcArray<i64, IxDyn>),
    U32(ArcArray<u32, IxDyn>),
    I32(ArcArray<i32, IxDyn>),
    U16(ArcArray<u16, IxDyn>),
    I16(ArcArray<i16, IxDyn>),
    U8(ArcArray<u8, IxDyn>),
    I8(ArcArray<i8, IxDyn>),
    BOOL(ArcArray<bool, IxDyn>),
}

/// Evaluate `$body` with `$x` bound to the inner array, whatever its dtype.
macro_rules! with_inner {
    ($value:expr, $x:ident => $body:expr) => {
        match $value {
            NDArrayNumericTensor::F64($x) => $body,
            NDArrayNumericTensor::F32($x) => $body,
            NDArrayNumericTensor::BF16($x) => $body,
            NDArrayNumericTensor::F16($x) => $body,
            NDArrayNumericTensor::U64($x) => $body,
            NDArrayNumericTensor::I64($x) => $body,
            NDArrayNumericTensor::U32($x) => $body,
            NDArrayNumericTensor::I32($x) => $body,
            NDArrayNumericTensor::U16($x) => $body,
            NDArrayNumericTensor::I16($x) => $body,
            NDArrayNumericTensor::U8($x) => $body,
            NDArrayNumericTensor::I8($x) => $body,
            NDArrayNumericTensor::BOOL($x) => $body,
        }
    };
}

/// Rebuild a tensor of the same dtype from `$body`, over every dtype.
macro_rules! map_all {
    ($value:expr, $x:ident => $body:expr) => {
        match $value {
            NDArrayNumericTensor::F64($x) => NDArrayNumericTensor::F64($body),
            NDArrayNumericTensor::F32($x) => NDArrayNumericTensor::F32($body),
            NDArrayNumericTensor::BF16($x) => NDArrayNumericTensor::BF16($body),
            NDArrayNumericTensor::F16($x) => NDArrayNumericTensor::F16($body),
            NDArrayNumericTensor::U64($x) => NDArrayNumericTensor::U64($body),
            NDArrayNumericTensor::I64($x) => NDArrayNumericTensor::I64($body),
            NDArrayNumericTensor::U32($x) => NDArrayNumericTensor::U32($body),
            NDArrayNumericTensor::I32($x) => NDArrayNumericTensor::I32($body),
            NDArrayNumericTensor::U16($x) => NDArrayNumericTensor::U16($body),
            NDArrayNumericTensor::I16($x) => NDArrayNumericTensor::I16($body),
            NDArrayNumericTensor::U8($x) => NDArrayNumericTensor::U8($body),
            NDArrayNumericTensor::I8($x) => NDArrayNumericTensor::I8($body),
            NDArrayNumericTensor::BOOL($x) => NDArrayNumericTensor::BOOL($body),
        }
    };
}

/// Like `map_all!`, but bool tensors are rejected for operation `$op`.
macro_rules! map_numeric {
    ($value:expr, $op:expr, $x:ident => $body:expr) => {
        match $value {
            NDArrayNumericTensor::F64($x) => NDArrayNumericTensor::F64($body),
            NDArrayNumericTensor::F32($x) => NDArrayNumericTensor::F32($body),
            NDArrayNumericTensor::BF16($x) => NDArrayNumericTensor::BF16($body),
            NDArrayNumericTensor::F16($x) => NDArrayNumericTensor::F16($body),
            NDArrayNumericTensor::U64($x) => NDArrayNumericTensor::U64($body),
            NDArrayNumericTensor::I64($x) => NDArrayNumericTensor::I64($body),
            NDArrayNumericTensor::U32($x) => NDArrayNumericTensor::U32($body),
            NDArrayNumericTensor::I32($x) => NDArrayNumericTensor::I32($body),
            NDArrayNumericTensor::U16($x) => NDArrayNumericTensor::U16($body),
            NDArrayNumericTensor::I16($x) => NDArrayNumericTensor::I16($body),
            NDArrayNumericTensor::U8($x) => NDArrayNumericTensor::U8($body),
            NDArrayNumericTensor::I8($x) => NDArrayNumericTensor::I8($body),
            NDArrayNumericTensor::BOOL(_) => Err(
                NDArrayNumericTensorError::UnsupportedOperationForDTypes(
                    $op.to_string(),
                    vec![DType::BOOL],
                ),
            )?,
        }
    };
}

/// Pairwise dispatch over two tensors already cast to a common dtype.
macro_rules! zip_numeric {
    ($a:expr, $b:expr, $op:expr, $x:ident, $y:ident => $body:expr) => {
        match ($a, $b) {
            (NDArrayNumericTensor::F64($x), NDArrayNumericTensor::F64($y)) => NDArrayNumericTensor::F64($body),
            (NDArrayNumericTensor::F32($x), NDArrayNumericTensor::F32($y)) => NDArrayNumericTensor::F32($body),
            (NDArrayNumericTensor::BF16($x), NDArrayNumericTensor::BF16($y)) => NDArrayNumericTensor::BF16($body),
            (NDArrayNumericTensor::F16($x), NDArrayNumericTensor::F16($y)) => NDArrayNumericTensor::F16($body),
            (NDArrayNumericTensor::U64($x), NDArrayNumericTensor::U64($y)) => NDArrayNumericTensor::U64($body),
            (NDArrayNumericTensor::I64($x), NDArrayNumericTensor::I64($y)) => NDArrayNumericTensor::I64($body),
            (NDArrayNumericTensor::U32($x), NDArrayNumericTensor::U32($y)) => NDArrayNumericTensor::U32($body),
            (NDArrayNumericTensor::I32($x), NDArrayNumericTensor::I32($y)) => NDArrayNumericTensor::I32($body),
            (NDArrayNumericTensor::U16($x), NDArrayNumericTensor::U16($y)) => NDArrayNumericTensor::U16($body),
            (NDArrayNumericTensor::I16($x), NDArrayNumericTensor::I16($y)) => NDArrayNumericTensor::I16($body),
            (NDArrayNumericTensor::U8($x), NDArrayNumericTensor::U8($y)) => NDArrayNumericTensor::U8($body),
            (NDArrayNumericTensor::I8($x), NDArrayNumericTensor::I8($y)) => NDArrayNumericTensor::I8($body),
            (a, b) => Err(NDArrayNumericTensorError::UnsupportedOperationForDTypes(
                $op.to_string(),
                vec![a.dtype(), b.dtype()],
            ))?,
        }
    };
}

impl Display for NDArrayNumericTensor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        with_inner!(self, x => x.fmt(f))
    }
}

fn from_wide_values<T: Element>(
    values: &[WideValue],
    shape: &[usize],
) -> Result<ArcArray<T, IxDyn>, NDArrayNumericTensorError> {
    let data = values.iter().map(|&v| T::from_wide(v)).collect();
    Ok(Array::from_shape_vec(IxDyn(shape), data)?.into_shared())
}

fn cast_elements<S: Element>(
    x: &ArcArray<S, IxDyn>,
    dtype: DType,
) -> Result<NDArrayNumericTensor, NDArrayNumericTensorError> {
    fn convert<S: Element, T: Element>(x: &ArcArray<S, IxDyn>) -> ArcArray<T, IxDyn> {
        x.mapv(|v| T::from_wide(v.to_wide())).into_shared()
    }
    Ok(match dtype {
        DType::F64 => NDArrayNumericTensor::F64(convert(x)),
        DType::F32 => NDArrayNumericTensor::F32(convert(x)),
        DType::BF16 => NDArrayNumericTensor::BF16(convert(x)),
        DType::F16 => NDArrayNumericTensor::F16(convert(x)),
        DType::U64 => NDArrayNumericTensor::U64(convert(x)),
        DType::I64 => NDArrayNumericTensor::I64(convert(x)),
        DType::U32 => NDArrayNumericTensor::U32(convert(x)),
        DType::I32 => NDArrayNumericTensor::I32(convert(x)),
        DType::U16 => NDArrayNumericTensor::U16(convert(x)),
        DType::I16 => NDArrayNumericTensor::I16(convert(x)),
        DType::U8 => NDArrayNumericTensor::U8(convert(x)),
        DType::I8 => NDArrayNumericTensor::I8(convert(x)),
        DType::BOOL => NDArrayNumericTensor::BOOL(x.mapv(|v| v.to_wide().is_nonzero()).into_shared()),
        DType::C64 | DType::C128 => Err(NDArrayNumericTensorError::UnsupportedOperationForDTypes(
            "cast".to_string(),
            vec![dtype],
        ))?,
    })
}

impl NDArrayNumericTensor {
    pub fn dtype(&self) -> DType {
        match self {
            NDArrayNumericTensor::F64(_) => DType::F64,
            NDArrayNumericTensor::F32(_) => DType::F32,
            NDArrayNumericTensor::BF16(_) => DType::BF16,
            NDArrayNumericTensor::F16(_) => DType::F16,
            NDArrayNumericTensor::U64(_) => DType::U64,
            NDArrayNumericTensor::I64(_) => DType::I64,
            NDArrayNumericTensor::U32(_) => DType::U32,
            NDArrayNumericTensor::I32(_) => DType::I32,
            NDArrayNumericTensor::U16(_) => DType::U16,
            NDArrayNumericTensor::I16(_) => DType::I16,
            NDArrayNumericTensor::U8(_) => DType::U8,
            NDArrayNumericTensor::I8(_) => DType::I8,
            NDArrayNumericTensor::BOOL(_) => DType::BOOL,
        }
    }

    pub fn shape(&self) -> Vec<usize> {
        with_inner!(self, x => x.shape().to_vec())
    }

    pub fn rank(&self) -> usize {
        with_inner!(self, x => x.ndim())
    }

    pub fn num_elements(&self) -> usize {
        with_inner!(self, x => x.len())
    }

    /// Address of the first element; stable for as long as the storage is not
    /// reallocated, which makes it usable as a buffer identity.
    pub fn data_ptr(&self) -> usize {
        with_inner!(self, x => x.as_ptr() as usize)
    }

    /// Build a tensor of `dtype` from host values, converting each through `f64`.
    pub fn from_f64_slice(
        values: &[f64],
        shape: &[usize],
        dtype: DType,
    ) -> Result<Self, NDArrayNumericTensorError> {
        let values: Vec<WideValue> = values.iter().map(|&v| WideValue::Float(v)).collect();
        Self::from_wide_slice(&values, shape, dtype)
    }

    fn from_wide_slice(
        values: &[WideValue],
        shape: &[usize],
        dtype: DType,
    ) -> Result<Self, NDArrayNumericTensorError> {
        Ok(match dtype {
            DType::F64 => NDArrayNumericTensor::F64(from_wide_values(values, shape)?),
            DType::F32 => NDArrayNumericTensor::F32(from_wide_values(values, shape)?),
            DType::BF16 => NDArrayNumericTensor::BF16(from_wide_values(values, shape)?),
            DType::F16 => NDArrayNumericTensor::F16(from_wide_values(values, shape)?),
            DType::U64 => NDArrayNumericTensor::U64(from_wide_values(values, shape)?),
            DType::I64 => NDArrayNumericTensor::I64(from_wide_values(values, shape)?),
            DType::U32 => NDArrayNumericTensor::U32(from_wide_values(values, shape)?),
            DType::I32 => NDArrayNumericTensor::I32(from_wide_values(values, shape)?),
            DType::U16 => NDArrayNumericTensor::U16(from_wide_values(values, shape)?),
            DType::I16 => NDArrayNumericTensor::I16(from_wide_values(values, shape)?),
            DType::U8 => NDArrayNumericTensor::U8(from_wide_values(values, shape)?),
            DType::I8 => NDArrayNumericTensor::I8(from_wide_values(values, shape)?),
            DType::BOOL => NDArrayNumericTensor::BOOL(
                Array::from_shape_vec(
                    IxDyn(shape),
                    values.iter().map(|v| v.is_nonzero()).collect(),
                )?
                .into_shared(),
            ),
            DType::C64 | DType::C128 => Err(
                NDArrayNumericTensorError::UnsupportedOperationForDTypes(
                    "create".to_string(),
                    vec![dtype],
                ),
            )?,
        })
    }

    /// Build a tensor from scalars, each cast to `dtype` without leaving its
    /// integer or float domain first.
    pub fn from_scalars(
        values: &[NumericScalar],
        shape: &[usize],
        dtype: DType,
    ) -> Result<Self, NDArrayNumericTensorError> {
        let values: Vec<WideValue> = values.iter().map(|v| v.to_wide()).collect();
        Self::from_wide_slice(&values, shape, dtype)
    }

    pub fn full(
        shape: &[usize],
        value: NumericScalar,
        dtype: DType,
    ) -> Result<Self, NDArrayNumericTensorError> {
        let count = shape.iter().product();
        Self::from_wide_slice(&vec![value.to_wide(); count], shape, dtype)
    }

    pub fn zeros(shape: &[usize], dtype: DType) -> Result<Self, NDArrayNumericTensorError> {
        Self::full(shape, NumericScalar::F64(0.0), dtype)
    }

    pub fn ones(shape: &[usize], dtype: DType) -> Result<Self, NDArrayNumericTensorError> {
        Self::full(shape, NumericScalar::F64(1.0), dtype)
    }

    /// Half-open range `[start, stop)` with the given step.
    pub fn arange(
        start: f64,
        stop: f64,
        step: f64,
        dtype: DType,
    ) -> Result<Self, NDArrayNumericTensorError> {
        if step == 0.0 {
            return Err(NDArrayNumericTensorError::InvalidArgument(
                "arange step must be non-zero".to_string(),
            ));
        }
        let count = ((stop - start) / step).ceil().max(0.0) as usize;
        let values: Vec<f64> = (0..count).map(|i| start + i as f64 * step).collect();
        Self::from_f64_slice(&values, &[count], dtype)
    }

    pub fn linspace(
        start: f64,
        stop: f64,
        num: usize,
        endpoint: bool,
        dtype: DType,
    ) -> Result<Self, NDArrayNumericTensorError> {
        let divisor = if endpoint { num.saturating_sub(1) } else { num };
        let step = if divisor == 0 { 0.0 } else { (stop - start) / divisor as f64 };
        let mut values: Vec<f64> = (0..num).map(|i| start + i as f64 * step).collect();
        if endpoint && num > 1 {
            values[num - 1] = stop;
        }
        Self::from_f64_slice(&values, &[num], dtype)
    }

    /// Ones on the `k`-th diagonal of an `rows x cols` matrix.
    pub fn eye(
        rows: usize,
        cols: usize,
        k: i64,
        dtype: DType,
    ) -> Result<Self, NDArrayNumericTensorError> {
        let mut values = vec![0.0; rows * cols];
        for i in 0..rows {
            let j = i as i64 + k;
            if j >= 0 && (j as usize) < cols {
                values[i * cols + j as usize] = 1.0;
            }
        }
        Self::from_f64_slice(&values, &[rows, cols], dtype)
    }

    pub fn cast(&self, dtype: DType) -> Result<Self, NDArrayNumericTensorError> {
        if self.dtype() == dtype {
            return Ok(self.clone());
        }
        match self {
            NDArrayNumericTensor::F64(x) => cast_elements(x, dtype),
            NDArrayNumericTensor::F32(x) => cast_elements(x, dtype),
            NDArrayNumericTensor::BF16(x) => cast_elements(x, dtype),
            NDArrayNumericTensor::F16(x) => cast_elements(x, dtype),
            NDArrayNumericTensor::U64(x) => cast_elements(x, dtype),
            NDArrayNumericTensor::I64(x) => cast_elements(x, dtype),
            NDArrayNumericTensor::U32(x) => cast_elements(x, dtype),
            NDArrayNumericTensor::I32(x) => cast_elements(x, dtype),
            NDArrayNumericTensor::U16(x) => cast_elements(x, dtype),
            NDArrayNumericTensor::I16(x) => cast_elements(x, dtype),
            NDArrayNumericTensor::U8(x) => cast_elements(x, dtype),
            NDArrayNumericTensor::I8(x) => cast_elements(x, dtype),
            NDArrayNumericTensor::BOOL(x) => {
                cast_elements(&x.mapv(|v| v as u8).into_shared(), dtype)
            }
        }
    }

    pub fn reshape(&self, new_shape: &[usize]) -> Result<Self, NDArrayNumericTensorError> {
        let old_shape = self.shape();
        if old_shape.iter().product::<usize>() != new_shape.iter().product::<usize>() {
            return Err(NDArrayNumericTensorError::InvalidReshapeError(
                old_shape,
                new_shape.to_vec(),
            ));
        }
        Ok(map_all!(self, x => x.to_shape(IxDyn(new_shape))?.to_owned().into_shared()))
    }

    /// A copy backed by freshly allocated storage.
    pub fn deep_copy(&self) -> Self {
        map_all!(self, x => x.to_owned().into_shared())
    }

    /// Materialize a broadcast of this tensor to `shape`.
    pub fn broadcast_to(&self, shape: &[usize]) -> Result<Self, NDArrayNumericTensorError> {
        let incompatible =
            || NDArrayNumericTensorError::IncompatibleShapes(self.shape(), shape.to_vec());
        Ok(map_all!(self, x => x
            .broadcast(IxDyn(shape))
            .ok_or_else(incompatible)?
            .to_owned()
            .into_shared()))
    }

    pub fn tril(&self, k: i64) -> Result<Self, NDArrayNumericTensorError> {
        Ok(map_all!(self, x => ops::triangle(x, k, false)?))
    }

    pub fn triu(&self, k: i64) -> Result<Self, NDArrayNumericTensorError> {
        Ok(map_all!(self, x => ops::triangle(x, k, true)?))
    }

    pub fn neg(&self) -> Result<Self, NDArrayNumericTensorError> {
        if self.dtype().is_uint() {
            return Err(NDArrayNumericTensorError::UnsupportedOperationForDTypes(
                "Neg".to_string(),
                vec![self.dtype()],
            ));
        }
        Ok(map_numeric!(self, "Neg", x => x.mapv(|v| Element::sub_elem(Default::default(), v)).into_shared()))
    }

    pub fn abs(&self) -> Result<Self, NDArrayNumericTensorError> {
        Ok(map_numeric!(self, "Abs", x => x.mapv(|v| v.abs_elem()).into_shared()))
    }

    fn float_unary(&self, op: FloatUnaryOp) -> Result<Self, NDArrayNumericTensorError> {
        Ok(match self {
            NDArrayNumericTensor::F64(x) => NDArrayNumericTensor::F64(op.apply(x)),
            NDArrayNumericTensor::F32(x) => NDArrayNumericTensor::F32(op.apply(x)),
            NDArrayNumericTensor::BF16(x) => NDArrayNumericTensor::BF16(op.apply(x)),
            NDArrayNumericTensor::F16(x) => NDArrayNumericTensor::F16(op.apply(x)),
            _ => Err(NDArrayNumericTensorError::UnsupportedOperationForDTypes(
                op.to_string(),
                vec![self.dtype()],
            ))?,
        })
    }

    pub fn exp(&self) -> Result<Self, NDArrayNumericTensorError> {
        self.float_unary(FloatUnaryOp::Exp)
    }

    pub fn ln(&self) -> Result<Self, NDArrayNumericTensorError> {
        self.float_unary(FloatUnaryOp::Ln)
    }

    pub fn sqrt(&self) -> Result<Self, NDArrayNumericTensorError> {
        self.float_unary(FloatUnaryOp::Sqrt)
    }

    fn binary_op(a: &Self, b: &Self, op: BinaryOp) -> Result<Self, NDArrayNumericTensorError> {
        let dtype = DType::promote_types(a.dtype(), b.dtype());
        let (a, b) = (a.cast(dtype)?, b.cast(dtype)?);
        Ok(zip_numeric!(&a, &b, op, x, y => op.apply(x, y)?))
    }

    pub fn add(a: &Self, b: &Self) -> Result<Self, NDArrayNumericTensorError> {
        Self::binary_op(a, b, BinaryOp::Add)
    }

    pub fn sub(a: &Self, b: &Self) -> Result<Self, NDArrayNumericTensorError> {
        Self::binary_op(a, b, BinaryOp::Sub)
    }

    pub fn mul(a: &Self, b: &Self) -> Result<Self, NDArrayNumericTensorError> {
        Self::binary_op(a, b, BinaryOp::Mul)
    }

    pub fn div(a: &Self, b: &Self) -> Result<Self, NDArrayNumericTensorError> {
        Self::binary_op(a, b, BinaryOp::Div)
    }

    pub fn pow(a: &Self, b: &Self) -> Result<Self, NDArrayNumericTensorError> {
        Self::binary_op(a, b, BinaryOp::Pow)
    }

    pub fn matmul(a: &Self, b: &Self) -> Result<Self, NDArrayNumericTensorError> {
        let dtype = DType::promote_types(a.dtype(), b.dtype());
        let (a, b) = (a.cast(dtype)?, b.cast(dtype)?);
        Ok(zip_numeric!(&a, &b, "MatMul", x, y => ops::matmul(x, y)?))
    }

    pub(crate) fn reduce_op(
        &self,
        axes: Option<&[i64]>,
        keepdims: bool,
        op: ReduceOp,
    ) -> Result<Self, NDArrayNumericTensorError> {
        let axes = ops::normalize_axes(axes, self.rank())?;
        Ok(map_numeric!(self, op, x => op.apply(x, &axes, keepdims)?))
    }

    pub fn reduce_sum(&self, axes: Option<&[i64]>, keepdims: bool) -> Result<Self, NDArrayNumericTensorError> {
        self.reduce_op(axes, keepdims, ReduceOp::Sum)
    }

    pub fn reduce_prod(&self, axes: Option<&[i64]>, keepdims: bool) -> Result<Self, NDArrayNumericTensorError> {
        self.reduce_op(axes, keepdims, ReduceOp::Prod)
    }

    pub fn reduce_mean(&self, axes: Option<&[i64]>, keepdims: bool) -> Result<Self, NDArrayNumericTensorError> {
        self.reduce_op(axes, keepdims, ReduceOp::Mean)
    }

    pub fn reduce_max(&self, axes: Option<&[i64]>, keepdims: bool) -> Result<Self, NDArrayNumericTensorError> {
        self.reduce_op(axes, keepdims, ReduceOp::Max)
    }

    pub fn reduce_min(&self, axes: Option<&[i64]>, keepdims: bool) -> Result<Self, NDArrayNumericTensorError> {
        self.reduce_op(axes, keepdims, ReduceOp::Min)
    }

    /// Overwrite the contents of `self` with `value`, broadcasting `value` and
    /// casting it to this tensor's dtype. The storage is written in place when
    /// it is not shared, otherwise `ArcArray` copies on write.
    pub fn assign(&mut self, value: &Self) -> Result<(), NDArrayNumericTensorError> {
        let target_shape = self.shape();
        let value = value.cast(self.dtype())?.broadcast_to(&target_shape)?;
        let value_dtype = value.dtype();
        match (self, value) {
            (NDArrayNumericTensor::F64(x), NDArrayNumericTensor::F64(y)) => x.assign(&y),
            (NDArrayNumericTensor::F32(x), NDArrayNumericTensor::F32(y)) => x.assign(&y),
            (NDArrayNumericTensor::BF16(x), NDArrayNumericTensor::BF16(y)) => x.assign(&y),
            (NDArrayNumericTensor::F16(x), NDArrayNumericTensor::F16(y)) => x.assign(&y),
            (NDArrayNumericTensor::U64(x), NDArrayNumericTensor::U64(y)) => x.assign(&y),
            (NDArrayNumericTensor::I64(x), NDArrayNumericTensor::I64(y)) => x.assign(&y),
            (NDArrayNumericTensor::U32(x), NDArrayNumericTensor::U32(y)) => x.assign(&y),
            (NDArrayNumericTensor::I32(x), NDArrayNumericTensor::I32(y)) => x.assign(&y),
            (NDArrayNumericTensor::U16(x), NDArrayNumericTensor::U16(y)) => x.assign(&y),
            (NDArrayNumericTensor::I16(x), NDArrayNumericTensor::I16(y)) => x.assign(&y),
            (NDArrayNumericTensor::U8(x), NDArrayNumericTensor::U8(y)) => x.assign(&y),
            (NDArrayNumericTensor::I8(x), NDArrayNumericTensor::I8(y)) => x.assign(&y),
            (NDArrayNumericTensor::BOOL(x), NDArrayNumericTensor::BOOL(y)) => x.assign(&y),
            (x, _) => {
                return Err(NDArrayNumericTensorError::WrongDTypeError(x.dtype(), value_dtype));
            }
        }
        Ok(())
    }

    /// Every element in logical (row-major) order.
    pub fn to_scalars(&self) -> Vec<NumericScalar> {
        with_inner!(self, x => x.iter().map(|v| NumericScalar::from(*v)).collect())
    }

    pub fn to_f64_vec(&self) -> Vec<f64> {
        self.to_scalars().iter().map(|v| v.to_f64()).collect()
    }

    pub fn first_element(&self) -> Option<NumericScalar> {
        with_inner!(self, x => x.iter().next().map(|v| NumericScalar::from(*v)))
    }

    /// Nested JSON lists mirroring the tensor's shape; rank 0 becomes a bare
    /// number.
    pub fn to_json(&self) -> serde_json::Value {
        fn nest(values: &[serde_json::Value], shape: &[usize]) -> serde_json::Value {
            match shape.split_first() {
                None => values.first().cloned().unwrap_or(serde_json::Value::Null),
                Some((&len, rest)) => {
                    let stride: usize = rest.iter().product();
                    serde_json::Value::Array(
                        (0..len)
                            .map(|i| nest(&values[i * stride..(i + 1) * stride], rest))
                            .collect(),
                    )
                }
            }
        }
        let values: Vec<serde_json::Value> = self.to_scalars().iter().map(|v| v.to_json()).collect();
        nest(&values, &self.shape())
    }
}
