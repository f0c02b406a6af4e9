use candle_core::{Device, Tensor};

use crate::backends::ndarray_backend::NDArrayNumericTensorError;
use crate::backends::ndarray_backend::ops::{broadcast_shapes, normalize_axes};
use crate::backends::{BackendKind, Kernel};
use crate::checks;
use crate::context;
use crate::error::{ArrayError, CallError};
use crate::func_wrapper::invocation::{Invocation, Value};
use crate::native_array::NativeArray;

use super::load_to_device;

fn to_host(value: &Value) -> Result<Value, CallError> {
    Ok(match value {
        Value::Native(x) => Value::Native(NativeArray::NDArray(x.to_ndarray()?)),
        Value::List(items) => Value::List(items.iter().map(to_host).collect::<Result<_, _>>()?),
        other => other.clone(),
    })
}

fn from_host(value: Value) -> Result<Value, CallError> {
    Ok(match value {
        Value::Native(x) => {
            let host = x.to_ndarray()?;
            let dtype = BackendKind::Candle.descriptor()?.closest_valid_dtype(host.dtype())?;
            Value::Native(NativeArray::Candle(load_to_device(&host.cast(dtype)?, &Device::Cpu)?))
        }
        other => other,
    })
}

/// Run the ndarray implementation of `function` on host copies of the
/// arguments and load the result back into candle.
fn via_host(inv: &Invocation<'_>, function: &'static str) -> Result<Value, CallError> {
    let host = BackendKind::NDArray.descriptor()?;
    let kernel = host.kernel(function).ok_or_else(|| ArrayError::UnimplementedFunction {
        function: function.to_string(),
        backend: host.name().to_string(),
    })?;
    let args = inv.args.iter().map(to_host).collect::<Result<Vec<_>, _>>()?;
    from_host(kernel(&inv.detached(args))?)
}

fn arg(inv: &Invocation<'_>, index: usize) -> Result<Tensor, CallError> {
    match inv.operand(index)? {
        NativeArray::Candle(x) => Ok(x),
        other => other.to_candle(&Device::Cpu),
    }
}

fn resolved_dtype(inv: &Invocation<'_>) -> Result<candle_core::DType, CallError> {
    Ok(candle_core::DType::try_from(inv.resolved_dtype()?)?)
}

fn typed_arg(inv: &Invocation<'_>, index: usize) -> Result<Tensor, CallError> {
    Ok(arg(inv, index)?.to_dtype(resolved_dtype(inv)?)?)
}

/// Integer inputs of float-only functions compute in the default float dtype.
fn float_arg(inv: &Invocation<'_>, index: usize) -> Result<Tensor, CallError> {
    let x = typed_arg(inv, index)?;
    if x.dtype().is_float() {
        return Ok(x);
    }
    let descriptor = BackendKind::Candle.descriptor()?;
    let float = descriptor.closest_valid_dtype(context::default_float_dtype())?;
    Ok(x.to_dtype(candle_core::DType::try_from(float)?)?)
}

/// Both operands, cast to the call dtype. Incompatible shapes are rejected
/// before candle sees them.
fn binary_args(inv: &Invocation<'_>) -> Result<(Tensor, Tensor), CallError> {
    let (a, b) = (typed_arg(inv, 0)?, typed_arg(inv, 1)?);
    broadcast_shapes(a.dims(), b.dims())?;
    Ok((a, b))
}

fn is_float_call(inv: &Invocation<'_>) -> Result<bool, CallError> {
    Ok(inv.resolved_dtype()?.is_float())
}

fn native(value: Tensor) -> Result<Value, CallError> {
    Ok(Value::Native(NativeArray::Candle(value)))
}

fn zeros(inv: &Invocation<'_>) -> Result<Value, CallError> {
    native(Tensor::zeros(inv.shape_arg(0)?, resolved_dtype(inv)?, &Device::Cpu)?)
}

fn ones(inv: &Invocation<'_>) -> Result<Value, CallError> {
    native(Tensor::ones(inv.shape_arg(0)?, resolved_dtype(inv)?, &Device::Cpu)?)
}

fn zeros_like(inv: &Invocation<'_>) -> Result<Value, CallError> {
    native(Tensor::zeros(inv.native(0)?.shape(), resolved_dtype(inv)?, &Device::Cpu)?)
}

fn ones_like(inv: &Invocation<'_>) -> Result<Value, CallError> {
    native(Tensor::ones(inv.native(0)?.shape(), resolved_dtype(inv)?, &Device::Cpu)?)
}

fn full(inv: &Invocation<'_>) -> Result<Value, CallError> {
    via_host(inv, "full")
}

fn full_like(inv: &Invocation<'_>) -> Result<Value, CallError> {
    via_host(inv, "full_like")
}

fn arange(inv: &Invocation<'_>) -> Result<Value, CallError> {
    via_host(inv, "arange")
}

fn linspace(inv: &Invocation<'_>) -> Result<Value, CallError> {
    via_host(inv, "linspace")
}

fn eye(inv: &Invocation<'_>) -> Result<Value, CallError> {
    via_host(inv, "eye")
}

fn asarray(inv: &Invocation<'_>) -> Result<Value, CallError> {
    via_host(inv, "asarray")
}

fn tril(inv: &Invocation<'_>) -> Result<Value, CallError> {
    via_host(inv, "tril")
}

fn triu(inv: &Invocation<'_>) -> Result<Value, CallError> {
    via_host(inv, "triu")
}

fn copy_array(inv: &Invocation<'_>) -> Result<Value, CallError> {
    native(typed_arg(inv, 0)?.copy()?)
}

fn reshape(inv: &Invocation<'_>) -> Result<Value, CallError> {
    let (x, shape) = (typed_arg(inv, 0)?, inv.param_shape("shape")?);
    if x.elem_count() != shape.iter().product::<usize>() {
        return Err(NDArrayNumericTensorError::InvalidReshapeError(x.dims().to_vec(), shape).into());
    }
    native(x.reshape(shape)?)
}

fn to_device(inv: &Invocation<'_>) -> Result<Value, CallError> {
    native(arg(inv, 0)?.copy()?)
}

fn add(inv: &Invocation<'_>) -> Result<Value, CallError> {
    let (a, b) = binary_args(inv)?;
    native(a.broadcast_add(&b)?)
}

fn subtract(inv: &Invocation<'_>) -> Result<Value, CallError> {
    let (a, b) = binary_args(inv)?;
    native(a.broadcast_sub(&b)?)
}

fn multiply(inv: &Invocation<'_>) -> Result<Value, CallError> {
    let (a, b) = binary_args(inv)?;
    native(a.broadcast_mul(&b)?)
}

fn divide(inv: &Invocation<'_>) -> Result<Value, CallError> {
    // integer division by zero must surface as an error, not a panic
    if !is_float_call(inv)? {
        return via_host(inv, "divide");
    }
    let (a, b) = binary_args(inv)?;
    native(a.broadcast_div(&b)?)
}

fn pow(inv: &Invocation<'_>) -> Result<Value, CallError> {
    via_host(inv, "pow")
}

fn negative(inv: &Invocation<'_>) -> Result<Value, CallError> {
    if !is_float_call(inv)? {
        return via_host(inv, "negative");
    }
    native(typed_arg(inv, 0)?.neg()?)
}

fn abs(inv: &Invocation<'_>) -> Result<Value, CallError> {
    if !is_float_call(inv)? {
        return via_host(inv, "abs");
    }
    native(typed_arg(inv, 0)?.abs()?)
}

fn exp(inv: &Invocation<'_>) -> Result<Value, CallError> {
    native(float_arg(inv, 0)?.exp()?)
}

fn log(inv: &Invocation<'_>) -> Result<Value, CallError> {
    native(float_arg(inv, 0)?.log()?)
}

fn sqrt(inv: &Invocation<'_>) -> Result<Value, CallError> {
    native(float_arg(inv, 0)?.sqrt()?)
}

fn reduction_axes(inv: &Invocation<'_>, x: &Tensor) -> Result<(Vec<usize>, bool), CallError> {
    let axes = inv.param_axes("axis")?;
    Ok((normalize_axes(axes.as_deref(), x.rank())?, inv.param_bool("keepdims", false)?))
}

fn sum(inv: &Invocation<'_>) -> Result<Value, CallError> {
    let x = typed_arg(inv, 0)?;
    let (axes, keepdims) = reduction_axes(inv, &x)?;
    if keepdims {
        native(x.sum_keepdim(axes)?)
    } else {
        native(x.sum(axes)?)
    }
}

fn mean(inv: &Invocation<'_>) -> Result<Value, CallError> {
    let x = float_arg(inv, 0)?;
    let (axes, keepdims) = reduction_axes(inv, &x)?;
    if keepdims {
        native(x.mean_keepdim(axes)?)
    } else {
        native(x.mean(axes)?)
    }
}

/// candle's max/min reduce one axis at a time; fold the axes from the back so
/// earlier indices stay valid.
fn extremum(inv: &Invocation<'_>, maximum: bool) -> Result<Value, CallError> {
    let mut x = typed_arg(inv, 0)?;
    let (axes, keepdims) = reduction_axes(inv, &x)?;
    for &axis in axes.iter().rev() {
        x = if maximum { x.max_keepdim(axis)? } else { x.min_keepdim(axis)? };
    }
    if !keepdims {
        for &axis in axes.iter().rev() {
            x = x.squeeze(axis)?;
        }
    }
    native(x)
}

fn max(inv: &Invocation<'_>) -> Result<Value, CallError> {
    extremum(inv, true)
}

fn min(inv: &Invocation<'_>) -> Result<Value, CallError> {
    extremum(inv, false)
}

fn prod(inv: &Invocation<'_>) -> Result<Value, CallError> {
    via_host(inv, "prod")
}

fn matmul(inv: &Invocation<'_>) -> Result<Value, CallError> {
    // candle's gemm only covers float element types
    if !is_float_call(inv)? {
        return via_host(inv, "matmul");
    }
    let (mut a, mut b) = (typed_arg(inv, 0)?, typed_arg(inv, 1)?);
    checks::check_matmul_shapes(a.dims(), b.dims())?;
    let (a_vector, b_vector) = (a.rank() == 1, b.rank() == 1);
    if a_vector {
        a = a.unsqueeze(0)?;
    }
    if b_vector {
        b = b.unsqueeze(1)?;
    }
    let mut out = a.broadcast_matmul(&b)?;
    if b_vector {
        out = out.squeeze(out.rank() - 1)?;
    }
    if a_vector {
        out = out.squeeze(out.rank() - if b_vector { 1 } else { 2 })?;
    }
    native(out)
}

pub(crate) fn kernels() -> Vec<(&'static str, Kernel)> {
    kernel_table![
        ("zeros", zeros),
        ("ones", ones),
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
