use std::fmt::{Display, Formatter};

use crate::backends::BackendKind;
#[cfg(feature = "candle")]
use crate::backends::candle_backend;
use crate::backends::ndarray_backend::NDArrayNumericTensor;
use crate::device::Device;
use crate::dtype::DType;
use crate::error::CallError;
#[cfg(feature = "candle")]
use crate::error::ArrayError;

/// A backend-native array: whatever tensor type the owning backend computes on.
#[derive(Debug, Clone)]
pub enum NativeArray {
    NDArray(NDArrayNumericTensor),
    #[cfg(feature = "candle")]
    Candle(candle_core::Tensor),
}

impl NativeArray {
    pub fn backend_kind(&self) -> BackendKind {
        match self {
            NativeArray::NDArray(_) => BackendKind::NDArray,
            #[cfg(feature = "candle")]
            NativeArray::Candle(_) => BackendKind::Candle,
        }
    }

    pub fn dtype(&self) -> DType {
        match self {
            NativeArray::NDArray(x) => x.dtype(),
            #[cfg(feature = "candle")]
            NativeArray::Candle(x) => x.dtype().into(),
        }
    }

    pub fn shape(&self) -> Vec<usize> {
        match self {
            NativeArray::NDArray(x) => x.shape(),
            #[cfg(feature = "candle")]
            NativeArray::Candle(x) => x.dims().to_vec(),
        }
    }

    pub fn rank(&self) -> usize {
        self.shape().len()
    }

    pub fn num_elements(&self) -> usize {
        self.shape().iter().product()
    }

    pub fn device(&self) -> Device {
        match self {
            NativeArray::NDArray(_) => Device::Cpu,
            #[cfg(feature = "candle")]
            NativeArray::Candle(x) => x.device().into(),
        }
    }

    /// Whether the storage of this array can be overwritten in place.
    pub fn supports_inplace(&self) -> bool {
        match self {
            NativeArray::NDArray(_) => true,
            #[cfg(feature = "candle")]
            NativeArray::Candle(_) => false,
        }
    }

    pub fn to_ndarray(&self) -> Result<NDArrayNumericTensor, CallError> {
        match self {
            NativeArray::NDArray(x) => Ok(x.clone()),
            #[cfg(feature = "candle")]
            NativeArray::Candle(x) => Ok(NDArrayNumericTensor::try_from(x)?),
        }
    }

    #[cfg(feature = "candle")]
    pub fn to_candle(&self, device: &candle_core::Device) -> Result<candle_core::Tensor, CallError> {
        match self {
            NativeArray::Candle(x) => Ok(x.to_device(device)?),
            NativeArray::NDArray(x) => candle_backend::load_to_device(x, device),
        }
    }

    /// Buffer identity, where the backend exposes one.
    pub fn data_ptr(&self) -> Option<usize> {
        match self {
            NativeArray::NDArray(x) => Some(x.data_ptr()),
            #[cfg(feature = "candle")]
            NativeArray::Candle(_) => None,
        }
    }

    /// A copy that shares no storage with `self`. Candle tensors are
    /// immutable, so sharing them is already safe.
    pub fn deep_copy(&self) -> NativeArray {
        match self {
            NativeArray::NDArray(x) => NativeArray::NDArray(x.deep_copy()),
            #[cfg(feature = "candle")]
            NativeArray::Candle(x) => NativeArray::Candle(x.clone()),
        }
    }

    /// Overwrite this array's storage with `value`, which is converted,
    /// cast and broadcast as needed.
    pub fn assign(&mut self, value: &NativeArray) -> Result<(), CallError> {
        match self {
            NativeArray::NDArray(x) => {
                x.assign(&value.to_ndarray()?)?;
                Ok(())
            }
            #[cfg(feature = "candle")]
            NativeArray::Candle(_) => Err(ArrayError::NotSupported(
                "candle tensors are immutable and cannot be updated in place".to_string(),
            )
            .into()),
        }
    }
}

impl From<NDArrayNumericTensor> for NativeArray {
    fn from(value: NDArrayNumericTensor) -> Self {
        NativeArray::NDArray(value)
    }
}

#[cfg(feature = "candle")]
impl From<candle_core::Tensor> for NativeArray {
    fn from(value: candle_core::Tensor) -> Self {
        NativeArray::Candle(value)
    }
}

impl Display for NativeArray {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            NativeArray::NDArray(x) => x.fmt(f),
            #[cfg(feature = "candle")]
            NativeArray::Candle(x) => x.fmt(f),
        }
    }
}
