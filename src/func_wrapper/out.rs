use std::sync::Arc;

use log::debug;

use super::invocation::{OutArg, Value};
use super::{Call, FunctionSpec, Middleware, make_call};
use crate::array::{Array, InplaceMode};
use crate::checks;
use crate::error::{ArrayError, CallError};

/// Layer 6: with an `out` buffer, the result is written into the buffer's
/// existing storage and a copy of the written buffer is returned.
///
/// The result must broadcast into the buffer's shape; the buffer is never
/// resized. The returned copy never co-owns the buffer's storage, so later
/// writes keep landing in the same allocation. Backends that cannot write in
/// place rebind the buffer instead.
pub(crate) struct OutArgument;

impl Middleware for OutArgument {
    fn wrap(&self, spec: Arc<FunctionSpec>, next: Call) -> Call {
        make_call(move |mut inv| {
            let Some(out) = inv.out.take() else {
                return next(inv);
            };
            let result = next(inv)?;
            let Some(native) = result.as_native() else {
                return Err(ArrayError::Value(format!(
                    "{} returned a {}, which cannot be written to an out buffer",
                    spec.name,
                    result.type_name()
                ))
                .into());
            };
            match out {
                OutArg::Array(buffer) => {
                    checks::check_inplace_sizes_valid(&buffer.shape(), &native.shape())?;
                    debug!("Writing the result of {} into its out buffer", spec.name);
                    let value = Array::from_native(native.clone());
                    buffer.inplace_update(&value, InplaceMode::BestEffort)?;
                    Ok(Value::Native(buffer.native().deep_copy()))
                }
                OutArg::Container(_) => Err(CallError::Array(ArrayError::Value(format!(
                    "{} was given a container out buffer for array arguments",
                    spec.name
                )))),
            }
        })
    }
}
