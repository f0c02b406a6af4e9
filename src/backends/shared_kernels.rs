//! Backend-independent query functions, registered on every backend.

use crate::backends::Kernel;
use crate::dtype::DType;
use crate::error::CallError;
use crate::func_wrapper::invocation::{Invocation, Value};

fn is_native_array(inv: &Invocation<'_>) -> Result<Value, CallError> {
    Ok(Value::Bool(matches!(inv.arg(0)?, Value::Native(_))))
}

fn array_equal(inv: &Invocation<'_>) -> Result<Value, CallError> {
    let (a, b) = (inv.native(0)?, inv.native(1)?);
    if a.shape() != b.shape() {
        return Ok(Value::Bool(false));
    }
    // compare in the promoted dtype so wide integers keep every bit
    let dtype = DType::promote_types(a.dtype(), b.dtype());
    let a = a.to_ndarray()?.cast(dtype)?.to_scalars();
    let b = b.to_ndarray()?.cast(dtype)?.to_scalars();
    Ok(Value::Bool(a == b))
}

pub(crate) fn kernels() -> Vec<(&'static str, Kernel)> {
    kernel_table![("is_native_array", is_native_array), ("array_equal", array_equal)]
}
