use super::{CallOptions, Operand, invoke};
use crate::array::{Array, InplaceMode};
use crate::backends::BackendKind;
use crate::device::Device;
use crate::dtype::DType;
use crate::error::ArrayError;
use crate::func_wrapper::invocation::{Invocation, Value};
use crate::native_array::NativeArray;

/// A fresh copy that shares no storage with `x`.
pub fn copy_array<X: Operand>(x: X, options: CallOptions<'_>) -> Result<X::Output, ArrayError> {
    invoke("copy_array", Invocation::new(vec![x.into()]), options)
}

pub fn reshape<X: Operand>(x: X, shape: &[usize], options: CallOptions<'_>) -> Result<X::Output, ArrayError> {
    let inv = Invocation::new(vec![x.into()]).with_param("shape", Value::Shape(shape.to_vec()));
    invoke("reshape", inv, options)
}

pub fn astype<X: Operand>(x: X, dtype: DType) -> Result<X::Output, ArrayError> {
    invoke("astype", Invocation::new(vec![x.into()]), CallOptions::new().dtype(dtype))
}

pub fn to_device<X: Operand>(x: X, device: Device) -> Result<X::Output, ArrayError> {
    invoke("to_device", Invocation::new(vec![x.into()]), CallOptions::new().device(device))
}

/// Whether `x` is a bare backend-native array rather than a wrapper.
pub fn is_native_array(x: impl Into<Value>) -> Result<bool, ArrayError> {
    invoke("is_native_array", Invocation::new(vec![x.into()]), CallOptions::new())
}

/// Whether `x` is a native array belonging to `backend`.
pub fn is_native_array_of(x: &Value, backend: BackendKind) -> bool {
    matches!(x, Value::Native(native) if native.backend_kind() == backend)
}

/// Same shape and equal values, compared as `f64`.
pub fn array_equal(x: impl Into<Value>, y: impl Into<Value>) -> Result<bool, ArrayError> {
    invoke("array_equal", Invocation::new(vec![x.into(), y.into()]), CallOptions::new())
}

pub fn to_native(x: &Array) -> NativeArray {
    x.to_native()
}

pub fn from_native(native: NativeArray) -> Array {
    Array::from_native(native)
}

pub fn supports_inplace_updates(x: &Array) -> Result<bool, ArrayError> {
    x.supports_inplace_updates()
}

pub fn inplace_update(x: &mut Array, value: &Array, mode: InplaceMode) -> Result<(), ArrayError> {
    x.inplace_update(value, mode)
}

pub fn inplace_increment(x: &mut Array, value: &Array, mode: InplaceMode) -> Result<(), ArrayError> {
    x.inplace_increment(value, mode)
}

pub fn inplace_decrement(x: &mut Array, value: &Array, mode: InplaceMode) -> Result<(), ArrayError> {
    x.inplace_decrement(value, mode)
}
