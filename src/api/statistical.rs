use super::{CallOptions, Operand, invoke};
use crate::error::ArrayError;
use crate::func_wrapper::invocation::{Invocation, Value};

fn reduction<X: Operand>(
    name: &'static str,
    x: X,
    axis: Option<&[i64]>,
    keepdims: bool,
    options: CallOptions<'_>,
) -> Result<X::Output, ArrayError> {
    let axis = match axis {
        Some(axes) => Value::Axes(axes.to_vec()),
        None => Value::None,
    };
    let inv = Invocation::new(vec![x.into()])
        .with_param("axis", axis)
        .with_param("keepdims", keepdims);
    invoke(name, inv, options)
}

/// Sum over `axis` (every axis when `None`). Negative axes count from the end.
pub fn sum<X: Operand>(
    x: X,
    axis: Option<&[i64]>,
    keepdims: bool,
    options: CallOptions<'_>,
) -> Result<X::Output, ArrayError> {
    reduction("sum", x, axis, keepdims, options)
}

pub fn prod<X: Operand>(
    x: X,
    axis: Option<&[i64]>,
    keepdims: bool,
    options: CallOptions<'_>,
) -> Result<X::Output, ArrayError> {
    reduction("prod", x, axis, keepdims, options)
}

/// Integer inputs are averaged in the default float dtype.
pub fn mean<X: Operand>(
    x: X,
    axis: Option<&[i64]>,
    keepdims: bool,
    options: CallOptions<'_>,
) -> Result<X::Output, ArrayError> {
    reduction("mean", x, axis, keepdims, options)
}

pub fn max<X: Operand>(
    x: X,
    axis: Option<&[i64]>,
    keepdims: bool,
    options: CallOptions<'_>,
) -> Result<X::Output, ArrayError> {
    reduction("max", x, axis, keepdims, options)
}

pub fn min<X: Operand>(
    x: X,
    axis: Option<&[i64]>,
    keepdims: bool,
    options: CallOptions<'_>,
) -> Result<X::Output, ArrayError> {
    reduction("min", x, axis, keepdims, options)
}
