use crate::backends::ndarray_backend::NDArrayNumericTensorError;
use crate::device::Device;
use crate::dtype::DType;

/// The unified error taxonomy. Every public entry point reports failures as one
/// of these; backend-native error types never cross the API boundary.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ArrayError {
    #[error("Unknown backend {0:?}, expected one of \"ndarray\", \"candle\"")]
    UnknownBackend(String),
    #[error("Backend {backend} is recognized but could not be loaded: {reason}")]
    BackendImport { backend: String, reason: String },
    #[error("Cannot pop the {0} stack below its default entry")]
    StackUnderflow(&'static str),
    #[error("No backend available: {0}")]
    NoBackendAvailable(String),
    #[error("The {backend} backend does not support the dtype {dtype}")]
    UnsupportedDtype { dtype: DType, backend: String },
    #[error("The {backend} backend does not support the device {device}")]
    UnsupportedDevice { device: Device, backend: String },
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),
    #[error("Container structure mismatch at {path:?}: {detail}")]
    StructureMismatch { path: String, detail: String },
    #[error("{0}")]
    Value(String),
    #[error("Not supported: {0}")]
    NotSupported(String),
    #[error("Function {function} is not implemented by the {backend} backend")]
    UnimplementedFunction { function: String, backend: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum ErrorKind {
    UnknownBackendError,
    BackendImportError,
    StackUnderflowError,
    NoBackendAvailableError,
    UnsupportedDtypeError,
    UnsupportedDeviceError,
    ShapeMismatchError,
    ValueError,
    NotSupportedError,
}

impl ArrayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ArrayError::UnknownBackend(_) => ErrorKind::UnknownBackendError,
            ArrayError::BackendImport { .. } => ErrorKind::BackendImportError,
            ArrayError::StackUnderflow(_) => ErrorKind::StackUnderflowError,
            ArrayError::NoBackendAvailable(_) => ErrorKind::NoBackendAvailableError,
            ArrayError::UnsupportedDtype { .. } => ErrorKind::UnsupportedDtypeError,
            ArrayError::UnsupportedDevice { .. } => ErrorKind::UnsupportedDeviceError,
            ArrayError::ShapeMismatch(_) | ArrayError::StructureMismatch { .. } => {
                ErrorKind::ShapeMismatchError
            }
            ArrayError::Value(_) => ErrorKind::ValueError,
            ArrayError::NotSupported(_) | ArrayError::UnimplementedFunction { .. } => {
                ErrorKind::NotSupportedError
            }
        }
    }
}

/// Error flowing between pipeline layers and backend kernels.
///
/// The exception-translation layer turns every variant into an [`ArrayError`].
#[derive(Debug, thiserror::Error)]
pub enum CallError {
    #[error(transparent)]
    Array(#[from] ArrayError),
    #[error(transparent)]
    NDArray(#[from] NDArrayNumericTensorError),
    #[cfg(feature = "candle")]
    #[error(transparent)]
    Candle(#[from] candle_core::Error),
}
