use half::{bf16, f16};
use ndarray::{ArcArray, Array, Array3, ArrayView1, Axis, IxDyn, LinalgScalar, Zip};
use num_traits::{Float, Zero};

use crate::backends::ndarray_backend::NDArrayNumericTensorError;
use crate::numeric_scalar::WideValue;

/// Element behaviour shared by every numeric dtype the ndarray backend stores.
///
/// Integer arithmetic wraps on overflow, matching the usual array-library
/// semantics rather than panicking in debug builds.
pub(crate) trait Element:
    Copy + PartialOrd + Default + LinalgScalar + std::fmt::Debug + Send + Sync + 'static
{
    fn to_f64_lossy(self) -> f64;
    fn from_f64_lossy(v: f64) -> Self;
    fn to_wide(self) -> WideValue;
    /// Integers wrap into range and floats saturate, like an `as` cast.
    fn from_wide(v: WideValue) -> Self;
    fn add_elem(self, rhs: Self) -> Self;
    fn sub_elem(self, rhs: Self) -> Self;
    fn mul_elem(self, rhs: Self) -> Self;
    fn div_elem(self, rhs: Self) -> Option<Self>;
    fn pow_elem(self, rhs: Self) -> Option<Self>;
    fn abs_elem(self) -> Self;
}

macro_rules! impl_float_element {
    ($t:ty) => {
        impl Element for $t {
            fn to_f64_lossy(self) -> f64 {
                self as f64
            }
            fn from_f64_lossy(v: f64) -> Self {
                v as $t
            }
            fn to_wide(self) -> WideValue {
                WideValue::Float(self as f64)
            }
            fn from_wide(v: WideValue) -> Self {
                match v {
                    WideValue::Int(i) => i as $t,
                    WideValue::Float(f) => f as $t,
                }
            }
            fn add_elem(self, rhs: Self) -> Self {
                self + rhs
            }
            fn sub_elem(self, rhs: Self) -> Self {
                self - rhs
            }
            fn mul_elem(self, rhs: Self) -> Self {
                self * rhs
            }
            fn div_elem(self, rhs: Self) -> Option<Self> {
                Some(self / rhs)
            }
            fn pow_elem(self, rhs: Self) -> Option<Self> {
                Some(self.powf(rhs))
            }
            fn abs_elem(self) -> Self {
                self.abs()
            }
        }
    };
}

macro_rules! impl_half_element {
    ($t:ty) => {
        impl Element for $t {
            fn to_f64_lossy(self) -> f64 {
                self.to_f64()
            }
            fn from_f64_lossy(v: f64) -> Self {
                <$t>::from_f64(v)
            }
            fn to_wide(self) -> WideValue {
                WideValue::Float(self.to_f64())
            }
            fn from_wide(v: WideValue) -> Self {
                match v {
                    WideValue::Int(i) => <$t>::from_f64(i as f64),
                    WideValue::Float(f) => <$t>::from_f64(f),
                }
            }
            fn add_elem(self, rhs: Self) -> Self {
                self + rhs
            }
            fn sub_elem(self, rhs: Self) -> Self {
                self - rhs
            }
            fn mul_elem(self, rhs: Self) -> Self {
                self * rhs
            }
            fn div_elem(self, rhs: Self) -> Option<Self> {
                Some(self / rhs)
            }
            fn pow_elem(self, rhs: Self) -> Option<Self> {
                Some(Float::powf(self, rhs))
            }
            fn abs_elem(self) -> Self {
                Float::abs(self)
            }
        }
    };
}

macro_rules! impl_int_element {
    ($t:ty, $abs:expr) => {
        impl Element for $t {
            fn to_f64_lossy(self) -> f64 {
                self as f64
            }
            fn from_f64_lossy(v: f64) -> Self {
                v as $t
            }
            fn to_wide(self) -> WideValue {
                WideValue::Int(self as i128)
            }
            fn from_wide(v: WideValue) -> Self {
                match v {
                    WideValue::Int(i) => i as $t,
                    WideValue::Float(f) => f as $t,
                }
            }
            fn add_elem(self, rhs: Self) -> Self {
                self.wrapping_add(rhs)
            }
            fn sub_elem(self, rhs: Self) -> Self {
                self.wrapping_sub(rhs)
            }
            fn mul_elem(self, rhs: Self) -> Self {
                self.wrapping_mul(rhs)
            }
            fn div_elem(self, rhs: Self) -> Option<Self> {
                self.checked_div(rhs)
            }
            fn pow_elem(self, rhs: Self) -> Option<Self> {
                // negative integer exponents have no integer result
                u32::try_from(rhs).ok().map(|e| self.wrapping_pow(e))
            }
            fn abs_elem(self) -> Self {
                let abs: fn($t) -> $t = $abs;
                abs(self)
            }
        }
    };
}

impl_float_element!(f64);
impl_float_element!(f32);
impl_half_element!(bf16);
impl_half_element!(f16);
impl_int_element!(u64, |x| x);
impl_int_element!(i64, |x| x.wrapping_abs());
impl_int_element!(u32, |x| x);
impl_int_element!(i32, |x| x.wrapping_abs());
impl_int_element!(u16, |x| x);
impl_int_element!(i16, |x| x.wrapping_abs());
impl_int_element!(u8, |x| x);
impl_int_element!(i8, |x| x.wrapping_abs());

/// Right-aligned broadcasting of two shapes.
pub(crate) fn broadcast_shapes(
    a: &[usize],
    b: &[usize],
) -> Result<Vec<usize>, NDArrayNumericTensorError> {
    let rank = a.len().max(b.len());
    let mut out = vec![0; rank];
    for i in 0..rank {
        let da = if i < rank - a.len() { 1 } else { a[i - (rank - a.len())] };
        let db = if i < rank - b.len() { 1 } else { b[i - (rank - b.len())] };
        out[i] = if da == db || db == 1 {
            da
        } else if da == 1 {
            db
        } else {
            return Err(NDArrayNumericTensorError::IncompatibleShapes(
                a.to_vec(),
                b.to_vec(),
            ));
        };
    }
    Ok(out)
}

/// Resolve possibly negative axes against `rank`, deduplicated and sorted.
/// `None` selects every axis.
pub(crate) fn normalize_axes(
    axes: Option<&[i64]>,
    rank: usize,
) -> Result<Vec<usize>, NDArrayNumericTensorError> {
    let Some(axes) = axes else {
        return Ok((0..rank).collect());
    };
    let mut out = Vec::with_capacity(axes.len());
    for &axis in axes {
        let resolved = if axis < 0 { axis + rank as i64 } else { axis };
        if resolved < 0 || resolved >= rank as i64 {
            return Err(NDArrayNumericTensorError::AxisOutOfRange(axis, rank));
        }
        out.push(resolved as usize);
    }
    out.sort_unstable();
    out.dedup();
    Ok(out)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub(crate) enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinaryOp {
    pub(crate) fn apply<T: Element>(
        &self,
        a: &ArcArray<T, IxDyn>,
        b: &ArcArray<T, IxDyn>,
    ) -> Result<ArcArray<T, IxDyn>, NDArrayNumericTensorError> {
        let shape = broadcast_shapes(a.shape(), b.shape())?;
        let incompatible =
            || NDArrayNumericTensorError::IncompatibleShapes(a.shape().to_vec(), b.shape().to_vec());
        let av = a.broadcast(IxDyn(&shape)).ok_or_else(incompatible)?;
        let bv = b.broadcast(IxDyn(&shape)).ok_or_else(incompatible)?;
        let out = Zip::from(av).and(bv).map_collect(|&x, &y| match self {
            BinaryOp::Add => Ok(x.add_elem(y)),
            BinaryOp::Sub => Ok(x.sub_elem(y)),
            BinaryOp::Mul => Ok(x.mul_elem(y)),
            BinaryOp::Div => x.div_elem(y).ok_or(if y == T::zero() {
                "integer division by zero"
            } else {
                "integer division overflow"
            }),
            BinaryOp::Pow => x.pow_elem(y).ok_or("negative integer exponent"),
        });
        let mut values = Vec::with_capacity(out.len());
        for v in out.iter() {
            match v {
                Ok(v) => values.push(*v),
                Err(reason) => {
                    return Err(NDArrayNumericTensorError::InvalidElementOperation(reason.to_string()));
                }
            }
        }
        Ok(Array::from_shape_vec(IxDyn(&shape), values)?.into_shared())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub(crate) enum FloatUnaryOp {
    Exp,
    Ln,
    Sqrt,
}

impl FloatUnaryOp {
    pub(crate) fn apply<T: Float>(&self, x: &ArcArray<T, IxDyn>) -> ArcArray<T, IxDyn> {
        match self {
            FloatUnaryOp::Exp => x.mapv(|v| v.exp()),
            FloatUnaryOp::Ln => x.mapv(|v| v.ln()),
            FloatUnaryOp::Sqrt => x.mapv(|v| v.sqrt()),
        }
        .into_shared()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub(crate) enum ReduceOp {
    Sum,
    Prod,
    Mean,
    Max,
    Min,
}

impl ReduceOp {
    /// Reduce `x` over the (already normalized) `axes`.
    ///
    /// The reduced axes are moved to the back and flattened so every output
    /// element folds exactly one lane.
    pub(crate) fn apply<T: Element>(
        &self,
        x: &ArcArray<T, IxDyn>,
        axes: &[usize],
        keepdims: bool,
    ) -> Result<ArcArray<T, IxDyn>, NDArrayNumericTensorError> {
        let shape = x.shape().to_vec();
        let kept: Vec<usize> = (0..shape.len()).filter(|i| !axes.contains(i)).collect();
        let permutation: Vec<usize> = kept.iter().chain(axes.iter()).copied().collect();
        let permuted = x.view().permuted_axes(IxDyn(&permutation));

        let mut flat_shape: Vec<usize> = kept.iter().map(|&i| shape[i]).collect();
        flat_shape.push(axes.iter().map(|&i| shape[i]).product());
        let flat = Array::from_shape_vec(IxDyn(&flat_shape), permuted.iter().copied().collect())?;

        let lanes = flat.map_axis(Axis(flat_shape.len() - 1), |lane| self.fold(lane));
        let mut values = Vec::with_capacity(lanes.len());
        for v in lanes.iter() {
            values.push(v.ok_or_else(|| NDArrayNumericTensorError::EmptyReduction(self.to_string()))?);
        }

        let out_shape: Vec<usize> = if keepdims {
            shape
                .iter()
                .enumerate()
                .map(|(i, &d)| if axes.contains(&i) { 1 } else { d })
                .collect()
        } else {
            kept.iter().map(|&i| shape[i]).collect()
        };
        Ok(Array::from_shape_vec(IxDyn(&out_shape), values)?.into_shared())
    }

    fn fold<T: Element>(&self, lane: ArrayView1<T>) -> Option<T> {
        match self {
            ReduceOp::Sum => Some(lane.iter().fold(T::zero(), |acc, &v| acc.add_elem(v))),
            ReduceOp::Prod => Some(lane.iter().fold(T::one(), |acc, &v| acc.mul_elem(v))),
            ReduceOp::Mean => {
                let total: f64 = lane.iter().map(|v| v.to_f64_lossy()).sum();
                Some(T::from_f64_lossy(total / lane.len() as f64))
            }
            ReduceOp::Max => lane.iter().copied().reduce(|acc, v| if v > acc { v } else { acc }),
            ReduceOp::Min => lane.iter().copied().reduce(|acc, v| if v < acc { v } else { acc }),
        }
    }
}

/// Matrix product with numpy semantics: 1-D operands are promoted to a
/// row/column and the promoted axis is dropped again, leading axes broadcast.
pub(crate) fn matmul<T: Element>(
    a: &ArcArray<T, IxDyn>,
    b: &ArcArray<T, IxDyn>,
) -> Result<ArcArray<T, IxDyn>, NDArrayNumericTensorError> {
    let incompatible =
        || NDArrayNumericTensorError::IncompatibleShapes(a.shape().to_vec(), b.shape().to_vec());
    if a.ndim() == 0 || b.ndim() == 0 {
        return Err(incompatible());
    }
    let mut a_shape = a.shape().to_vec();
    let mut b_shape = b.shape().to_vec();
    let a_vector = a_shape.len() == 1;
    let b_vector = b_shape.len() == 1;
    if a_vector {
        a_shape.insert(0, 1);
    }
    if b_vector {
        b_shape.push(1);
    }
    let (m, k) = (a_shape[a_shape.len() - 2], a_shape[a_shape.len() - 1]);
    let (k2, n) = (b_shape[b_shape.len() - 2], b_shape[b_shape.len() - 1]);
    if k != k2 {
        return Err(incompatible());
    }
    let batch = broadcast_shapes(&a_shape[..a_shape.len() - 2], &b_shape[..b_shape.len() - 2])?;
    let batch_len: usize = batch.iter().product();

    let a = Array::from_shape_vec(IxDyn(&a_shape), a.iter().copied().collect())?;
    let b = Array::from_shape_vec(IxDyn(&b_shape), b.iter().copied().collect())?;
    let a_full: Vec<usize> = batch.iter().copied().chain([m, k]).collect();
    let b_full: Vec<usize> = batch.iter().copied().chain([k, n]).collect();
    let a = a.broadcast(IxDyn(&a_full)).ok_or_else(incompatible)?;
    let b = b.broadcast(IxDyn(&b_full)).ok_or_else(incompatible)?;
    let a = Array3::from_shape_vec((batch_len, m, k), a.iter().copied().collect())?;
    let b = Array3::from_shape_vec((batch_len, k, n), b.iter().copied().collect())?;

    let mut values = Vec::with_capacity(batch_len * m * n);
    for i in 0..batch_len {
        let product = a.index_axis(Axis(0), i).dot(&b.index_axis(Axis(0), i));
        values.extend(product.iter().copied());
    }

    let mut out_shape = batch;
    if !a_vector {
        out_shape.push(m);
    }
    if !b_vector {
        out_shape.push(n);
    }
    Ok(Array::from_shape_vec(IxDyn(&out_shape), values)?.into_shared())
}

/// Zero everything outside the band selected by `k` over the last two axes.
pub(crate) fn triangle<T: Copy + Default>(
    x: &ArcArray<T, IxDyn>,
    k: i64,
    upper: bool,
) -> Result<ArcArray<T, IxDyn>, NDArrayNumericTensorError> {
    let rank = x.ndim();
    if rank < 2 {
        return Err(NDArrayNumericTensorError::InvalidArgument(format!(
            "expected at least 2 dimensions, got {rank}"
        )));
    }
    let mut out = x.to_owned();
    for (index, v) in out.indexed_iter_mut() {
        let offset = index[rank - 1] as i64 - index[rank - 2] as i64;
        let keep = if upper { offset >= k } else { offset <= k };
        if !keep {
            *v = T::default();
        }
    }
    Ok(out.into_shared())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_shapes_right_aligns() {
        assert_eq!(broadcast_shapes(&[2, 1, 3], &[4, 1]).unwrap(), vec![2, 4, 3]);
        assert_eq!(broadcast_shapes(&[], &[5]).unwrap(), vec![5]);
        assert!(broadcast_shapes(&[2, 3], &[4]).is_err());
    }

    #[test]
    fn normalize_axes_handles_negatives() {
        assert_eq!(normalize_axes(Some(&[-1, 0, 0]), 3).unwrap(), vec![0, 2]);
        assert_eq!(normalize_axes(None, 2).unwrap(), vec![0, 1]);
        assert!(normalize_axes(Some(&[3]), 3).is_err());
    }
}
