use super::{CallOptions, Operand, invoke};
use crate::array::Array;
use crate::error::ArrayError;
use crate::func_wrapper::invocation::{Invocation, Value};
use crate::numeric_scalar::NumericScalar;

fn shape_call(name: &'static str, shape: &[usize], options: CallOptions<'_>) -> Result<Array, ArrayError> {
    invoke(name, Invocation::new(vec![Value::Shape(shape.to_vec())]), options)
}

/// Zero-filled array, in the default float dtype unless one is given.
pub fn zeros(shape: &[usize], options: CallOptions<'_>) -> Result<Array, ArrayError> {
    shape_call("zeros", shape, options)
}

pub fn ones(shape: &[usize], options: CallOptions<'_>) -> Result<Array, ArrayError> {
    shape_call("ones", shape, options)
}

/// An array whose contents are unspecified. Backends currently zero-fill.
pub fn empty(shape: &[usize], options: CallOptions<'_>) -> Result<Array, ArrayError> {
    shape_call("empty", shape, options)
}

/// Array filled with `fill_value`. Without an explicit dtype, a float fill
/// gives the default float dtype, an integer fill the default int dtype and a
/// bool fill bool.
pub fn full(
    shape: &[usize],
    fill_value: impl Into<NumericScalar>,
    options: CallOptions<'_>,
) -> Result<Array, ArrayError> {
    let inv = Invocation::new(vec![Value::Shape(shape.to_vec()), Value::Scalar(fill_value.into())]);
    invoke("full", inv, options)
}

/// Values from `start` up to (excluding) `stop` in increments of `step`.
pub fn arange(
    start: impl Into<NumericScalar>,
    stop: impl Into<NumericScalar>,
    step: impl Into<NumericScalar>,
    options: CallOptions<'_>,
) -> Result<Array, ArrayError> {
    let inv = Invocation::new(vec![
        Value::Scalar(start.into()),
        Value::Scalar(stop.into()),
        Value::Scalar(step.into()),
    ]);
    invoke("arange", inv, options)
}

pub fn linspace(
    start: f64,
    stop: f64,
    num: usize,
    endpoint: bool,
    options: CallOptions<'_>,
) -> Result<Array, ArrayError> {
    let inv = Invocation::new(vec![
        Value::Scalar(NumericScalar::F64(start)),
        Value::Scalar(NumericScalar::F64(stop)),
        Value::Int(num as i64),
    ])
    .with_param("endpoint", endpoint);
    invoke("linspace", inv, options)
}

/// Ones on the `k`-th diagonal. `n_cols` defaults to `n_rows`.
pub fn eye(n_rows: usize, n_cols: Option<usize>, k: i64, options: CallOptions<'_>) -> Result<Array, ArrayError> {
    let inv = Invocation::new(vec![
        Value::Int(n_rows as i64),
        Value::Int(n_cols.unwrap_or(n_rows) as i64),
    ])
    .with_param("k", k);
    invoke("eye", inv, options)
}

/// Array from nested host data (a [`Value::List`] of scalars) or a copy of an
/// existing array.
pub fn asarray(data: impl Into<Value>, options: CallOptions<'_>) -> Result<Array, ArrayError> {
    invoke("asarray", Invocation::new(vec![data.into()]), options)
}

pub fn zeros_like<X: Operand>(x: X, options: CallOptions<'_>) -> Result<X::Output, ArrayError> {
    invoke("zeros_like", Invocation::new(vec![x.into()]), options)
}

pub fn ones_like<X: Operand>(x: X, options: CallOptions<'_>) -> Result<X::Output, ArrayError> {
    invoke("ones_like", Invocation::new(vec![x.into()]), options)
}

pub fn empty_like<X: Operand>(x: X, options: CallOptions<'_>) -> Result<X::Output, ArrayError> {
    invoke("empty_like", Invocation::new(vec![x.into()]), options)
}

pub fn full_like<X: Operand>(
    x: X,
    fill_value: impl Into<NumericScalar>,
    options: CallOptions<'_>,
) -> Result<X::Output, ArrayError> {
    invoke(
        "full_like",
        Invocation::new(vec![x.into(), Value::Scalar(fill_value.into())]),
        options,
    )
}

/// Lower triangle, zeroing elements above the `k`-th diagonal.
pub fn tril<X: Operand>(x: X, k: i64, options: CallOptions<'_>) -> Result<X::Output, ArrayError> {
    invoke("tril", Invocation::new(vec![x.into()]).with_param("k", k), options)
}

/// Upper triangle, zeroing elements below the `k`-th diagonal.
pub fn triu<X: Operand>(x: X, k: i64, options: CallOptions<'_>) -> Result<X::Output, ArrayError> {
    invoke("triu", Invocation::new(vec![x.into()]).with_param("k", k), options)
}
