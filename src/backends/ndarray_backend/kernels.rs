use crate::backends::Kernel;
use crate::backends::ndarray_backend::NDArrayNumericTensor;
use crate::checks;
use crate::context;
use crate::error::CallError;
use crate::func_wrapper::invocation::{Invocation, Value};
use crate::native_array::NativeArray;

fn arg(inv: &Invocation<'_>, index: usize) -> Result<NDArrayNumericTensor, CallError> {
    inv.operand(index)?.to_ndarray()
}

fn typed_arg(inv: &Invocation<'_>, index: usize) -> Result<NDArrayNumericTensor, CallError> {
    Ok(arg(inv, index)?.cast(inv.resolved_dtype()?)?)
}

/// Integer and bool inputs of float-only functions compute in the default float dtype.
fn float_arg(inv: &Invocation<'_>, index: usize) -> Result<NDArrayNumericTensor, CallError> {
    let x = typed_arg(inv, index)?;
    if x.dtype().is_float() {
        Ok(x)
    } else {
        Ok(x.cast(context::default_float_dtype())?)
    }
}

fn native(value: NDArrayNumericTensor) -> Result<Value, CallError> {
    Ok(Value::Native(NativeArray::NDArray(value)))
}

fn zeros(inv: &Invocation<'_>) -> Result<Value, CallError> {
    native(NDArrayNumericTensor::zeros(&inv.shape_arg(0)?, inv.resolved_dtype()?)?)
}

fn ones(inv: &Invocation<'_>) -> Result<Value, CallError> {
    native(NDArrayNumericTensor::ones(&inv.shape_arg(0)?, inv.resolved_dtype()?)?)
}

fn full(inv: &Invocation<'_>) -> Result<Value, CallError> {
    let (fill, dtype) = (inv.scalar(1)?, inv.resolved_dtype()?);
    checks::check_fill_value_and_dtype_are_compatible(fill, dtype)?;
    native(NDArrayNumericTensor::full(&inv.shape_arg(0)?, fill, dtype)?)
}

fn arange(inv: &Invocation<'_>) -> Result<Value, CallError> {
    native(NDArrayNumericTensor::arange(
        inv.scalar(0)?.to_f64(),
        inv.scalar(1)?.to_f64(),
        inv.scalar(2)?.to_f64(),
        inv.resolved_dtype()?,
    )?)
}

fn linspace(inv: &Invocation<'_>) -> Result<Value, CallError> {
    native(NDArrayNumericTensor::linspace(
        inv.scalar(0)?.to_f64(),
        inv.scalar(1)?.to_f64(),
        inv.int_arg(2)?.max(0) as usize,
        inv.param_bool("endpoint", true)?,
        inv.resolved_dtype()?,
    )?)
}

fn eye(inv: &Invocation<'_>) -> Result<Value, CallError> {
    native(NDArrayNumericTensor::eye(
        inv.int_arg(0)?.max(0) as usize,
        inv.int_arg(1)?.max(0) as usize,
        inv.param_int("k", 0)?,
        inv.resolved_dtype()?,
    )?)
}

fn asarray(inv: &Invocation<'_>) -> Result<Value, CallError> {
    let dtype = inv.resolved_dtype()?;
    match inv.arg(0)?.as_native() {
        Some(x) => native(x.to_ndarray()?.cast(dtype)?.deep_copy()),
        None => {
            let (values, shape) = inv.arg(0)?.flatten_numeric()?;
            native(NDArrayNumericTensor::from_scalars(&values, &shape, dtype)?)
        }
    }
}

fn zeros_like(inv: &Invocation<'_>) -> Result<Value, CallError> {
    native(NDArrayNumericTensor::zeros(&inv.native(0)?.shape(), inv.resolved_dtype()?)?)
}

fn ones_like(inv: &Invocation<'_>) -> Result<Value, CallError> {
    native(NDArrayNumericTensor::ones(&inv.native(0)?.shape(), inv.resolved_dtype()?)?)
}

fn full_like(inv: &Invocation<'_>) -> Result<Value, CallError> {
    let (fill, dtype) = (inv.scalar(1)?, inv.resolved_dtype()?);
    checks::check_fill_value_and_dtype_are_compatible(fill, dtype)?;
    native(NDArrayNumericTensor::full(&inv.native(0)?.shape(), fill, dtype)?)
}

fn tril(inv: &Invocation<'_>) -> Result<Value, CallError> {
    checks::check_dimensions(&inv.native(0)?.shape())?;
    native(typed_arg(inv, 0)?.tril(inv.param_int("k", 0)?)?)
}

fn triu(inv: &Invocation<'_>) -> Result<Value, CallError> {
    checks::check_dimensions(&inv.native(0)?.shape())?;
    native(typed_arg(inv, 0)?.triu(inv.param_int("k", 0)?)?)
}

fn copy_array(inv: &Invocation<'_>) -> Result<Value, CallError> {
    native(typed_arg(inv, 0)?.deep_copy())
}

fn reshape(inv: &Invocation<'_>) -> Result<Value, CallError> {
    native(typed_arg(inv, 0)?.reshape(&inv.param_shape("shape")?)?)
}

fn to_device(inv: &Invocation<'_>) -> Result<Value, CallError> {
    native(arg(inv, 0)?.deep_copy())
}

fn add(inv: &Invocation<'_>) -> Result<Value, CallError> {
    native(NDArrayNumericTensor::add(&typed_arg(inv, 0)?, &typed_arg(inv, 1)?)?)
}

fn subtract(inv: &Invocation<'_>) -> Result<Value, CallError> {
    native(NDArrayNumericTensor::sub(&typed_arg(inv, 0)?, &typed_arg(inv, 1)?)?)
}

fn multiply(inv: &Invocation<'_>) -> Result<Value, CallError> {
    native(NDArrayNumericTensor::mul(&typed_arg(inv, 0)?, &typed_arg(inv, 1)?)?)
}

fn divide(inv: &Invocation<'_>) -> Result<Value, CallError> {
    native(NDArrayNumericTensor::div(&typed_arg(inv, 0)?, &typed_arg(inv, 1)?)?)
}

fn pow(inv: &Invocation<'_>) -> Result<Value, CallError> {
    native(NDArrayNumericTensor::pow(&typed_arg(inv, 0)?, &typed_arg(inv, 1)?)?)
}

fn negative(inv: &Invocation<'_>) -> Result<Value, CallError> {
    native(typed_arg(inv, 0)?.neg()?)
}

fn abs(inv: &Invocation<'_>) -> Result<Value, CallError> {
    native(typed_arg(inv, 0)?.abs()?)
}

fn exp(inv: &Invocation<'_>) -> Result<Value, CallError> {
    native(float_arg(inv, 0)?.exp()?)
}

fn log(inv: &Invocation<'_>) -> Result<Value, CallError> {
    native(float_arg(inv, 0)?.ln()?)
}

fn sqrt(inv: &Invocation<'_>) -> Result<Value, CallError> {
    native(float_arg(inv, 0)?.sqrt()?)
}

fn sum(inv: &Invocation<'_>) -> Result<Value, CallError> {
    let axes = inv.param_axes("axis")?;
    native(typed_arg(inv, 0)?.reduce_sum(axes.as_deref(), inv.param_bool("keepdims", false)?)?)
}

fn prod(inv: &Invocation<'_>) -> Result<Value, CallError> {
    let axes = inv.param_axes("axis")?;
    native(typed_arg(inv, 0)?.reduce_prod(axes.as_deref(), inv.param_bool("keepdims", false)?)?)
}

fn mean(inv: &Invocation<'_>) -> Result<Value, CallError> {
    let axes = inv.param_axes("axis")?;
    native(float_arg(inv, 0)?.reduce_mean(axes.as_deref(), inv.param_bool("keepdims", false)?)?)
}

fn max(inv: &Invocation<'_>) -> Result<Value, CallError> {
    let axes = inv.param_axes("axis")?;
    native(typed_arg(inv, 0)?.reduce_max(axes.as_deref(), inv.param_bool("keepdims", false)?)?)
}

fn min(inv: &Invocation<'_>) -> Result<Value, CallError> {
    let axes = inv.param_axes("axis")?;
    native(typed_arg(inv, 0)?.reduce_min(axes.as_deref(), inv.param_bool("keepdims", false)?)?)
}

fn matmul(inv: &Invocation<'_>) -> Result<Value, CallError> {
    checks::check_matmul_shapes(&inv.native(0)?.shape(), &inv.native(1)?.shape())?;
    native(NDArrayNumericTensor::matmul(&typed_arg(inv, 0)?, &typed_arg(inv, 1)?)?)
}

pub(crate) fn kernels() -> Vec<(&'static str, Kernel)> {
    kernel_table![
        ("zeros", zeros),
        ("ones", ones),
        // freshly allocated storage is zero-filled; there is no uninitialized allocation
        ("empty", zeros),
        ("full", full),
        ("arange", arange),
        ("linspace", linspace),
        ("eye", eye),
        ("asarray", asarray),
        ("zeros_like", zeros_like),
        ("ones_like", ones_like),
        ("empty_like", zeros_like),
        ("full_like", full_like),
        ("tril", tril),
        ("triu", triu),
        ("copy_array", copy_array),
        ("reshape", reshape),
        ("astype", copy_array),
        ("to_device", to_device),
        ("add", add),
        ("subtract", subtract),
        ("multiply", multiply),
        ("divide", divide),
        ("pow", pow),
        ("negative", negative),
        ("abs", abs),
        ("exp", exp),
        ("log", log),
        ("sqrt", sqrt),
        ("sum", sum),
        ("prod", prod),
        ("mean", mean),
        ("max", max),
        ("min", min),
        ("matmul", matmul),
    ]
}
