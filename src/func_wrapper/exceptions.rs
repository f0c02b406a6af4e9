use std::sync::Arc;

use log::debug;

use super::{Call, FunctionSpec, Middleware, make_call};
use crate::backends::BackendKind;
use crate::backends::ndarray_backend::NDArrayNumericTensorError;
use crate::error::{ArrayError, CallError};

impl From<NDArrayNumericTensorError> for ArrayError {
    fn from(err: NDArrayNumericTensorError) -> Self {
        match err {
            NDArrayNumericTensorError::IncompatibleShapes(..)
            | NDArrayNumericTensorError::InvalidReshapeError(..)
            | NDArrayNumericTensorError::ShapeError(_) => ArrayError::ShapeMismatch(err.to_string()),
            NDArrayNumericTensorError::WrongDTypeError(dtype, _) => ArrayError::UnsupportedDtype {
                dtype,
                backend: BackendKind::NDArray.to_string(),
            },
            NDArrayNumericTensorError::UnsupportedOperationForDTypes(_, ref dtypes) => match dtypes.first() {
                Some(&dtype) => ArrayError::UnsupportedDtype {
                    dtype,
                    backend: BackendKind::NDArray.to_string(),
                },
                None => ArrayError::Value(err.to_string()),
            },
            NDArrayNumericTensorError::AxisOutOfRange(..)
            | NDArrayNumericTensorError::InvalidElementOperation(_)
            | NDArrayNumericTensorError::EmptyReduction(_)
            | NDArrayNumericTensorError::InvalidArgument(_) => ArrayError::Value(err.to_string()),
        }
    }
}

#[cfg(feature = "candle")]
impl From<candle_core::Error> for ArrayError {
    fn from(err: candle_core::Error) -> Self {
        match err {
            candle_core::Error::UnsupportedDTypeForOp(dtype, _) => ArrayError::UnsupportedDtype {
                dtype: dtype.into(),
                backend: BackendKind::Candle.to_string(),
            },
            candle_core::Error::ShapeMismatchBinaryOp { .. }
            | candle_core::Error::BroadcastIncompatibleShapes { .. } => ArrayError::ShapeMismatch(err.to_string()),
            other => ArrayError::Value(format!("candle: {other}")),
        }
    }
}

impl From<CallError> for ArrayError {
    fn from(err: CallError) -> Self {
        match err {
            CallError::Array(err) => err,
            CallError::NDArray(err) => err.into(),
            #[cfg(feature = "candle")]
            CallError::Candle(err) => err.into(),
        }
    }
}

/// Layer 1: nothing but [`ArrayError`]s leave a wrapped function.
pub(crate) struct ExceptionTranslation;

impl Middleware for ExceptionTranslation {
    fn wrap(&self, spec: Arc<FunctionSpec>, next: Call) -> Call {
        make_call(move |inv| {
            next(inv).map_err(|err| {
                let translated = ArrayError::from(err);
                debug!("{} failed with {}: {translated}", spec.name, translated.kind());
                CallError::Array(translated)
            })
        })
    }
}
