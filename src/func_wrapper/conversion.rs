use std::sync::Arc;

use log::debug;

use super::invocation::Value;
use super::{Call, FunctionSpec, Middleware, make_call};
use crate::array::Array;
use crate::backends::BackendDescriptor;
use crate::context;
use crate::error::CallError;

/// Layer 5: arrays go into the backend as its native type and come back out
/// as [`Array`]s.
///
/// Arguments owned by another backend are adopted into the current one, the
/// requested dtype is replaced by the backend's closest valid dtype, and an
/// explicitly requested device must be one the backend supports.
pub(crate) struct NativeArrayConversion;

fn to_native(backend: &BackendDescriptor, value: Value) -> Result<Value, CallError> {
    Ok(match value {
        Value::Array(x) => Value::Native(backend.adopt(x.native())?),
        Value::Native(x) => Value::Native(backend.adopt(&x)?),
        Value::List(items) => Value::List(
            items
                .into_iter()
                .map(|v| to_native(backend, v))
                .collect::<Result<_, _>>()?,
        ),
        other => other,
    })
}

fn from_native(value: Value) -> Value {
    match value {
        Value::Native(x) => Value::Array(Array::from_native(x)),
        Value::List(items) => Value::List(items.into_iter().map(from_native).collect()),
        other => other,
    }
}

impl Middleware for NativeArrayConversion {
    fn wrap(&self, spec: Arc<FunctionSpec>, next: Call) -> Call {
        make_call(move |mut inv| {
            let backend = context::current_backend(inv.array_args().first().copied())?;
            if let Some(dtype) = inv.dtype {
                let valid = backend.closest_valid_dtype(dtype)?;
                if valid != dtype {
                    debug!("{} on {} computes in {valid} instead of {dtype}", spec.name, backend.kind);
                }
                inv.dtype = Some(valid);
            }
            if let Some(device) = inv.device {
                backend.check_device(device)?;
            }
            let args = std::mem::take(&mut inv.args);
            inv.args = args
                .into_iter()
                .map(|v| to_native(&backend, v))
                .collect::<Result<_, _>>()?;
            Ok(from_native(next(inv)?))
        })
    }
}
