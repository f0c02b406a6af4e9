use candle_core::Device;

use crate::backends::ndarray_backend::NDArrayNumericTensor;
use crate::dtype::DType;
use crate::error::{ArrayError, CallError};

pub(crate) fn load_to_device(
    value: &NDArrayNumericTensor,
    device: &Device,
) -> Result<candle_core::Tensor, CallError> {
    let shape = value.shape();
    Ok(match value {
        NDArrayNumericTensor::F32(x) => {
            candle_core::Tensor::from_vec(x.iter().copied().collect::<Vec<_>>(), shape, device)?
        }
        NDArrayNumericTensor::F64(x) => {
            candle_core::Tensor::from_vec(x.iter().copied().collect::<Vec<_>>(), shape, device)?
        }
        NDArrayNumericTensor::F16(x) => {
            candle_core::Tensor::from_vec(x.iter().copied().collect::<Vec<_>>(), shape, device)?
        }
        NDArrayNumericTensor::BF16(x) => {
            candle_core::Tensor::from_vec(x.iter().copied().collect::<Vec<_>>(), shape, device)?
        }
        NDArrayNumericTensor::U32(x) => {
            candle_core::Tensor::from_vec(x.iter().copied().collect::<Vec<_>>(), shape, device)?
        }
        NDArrayNumericTensor::I64(x) => {
            candle_core::Tensor::from_vec(x.iter().copied().collect::<Vec<_>>(), shape, device)?
        }
        NDArrayNumericTensor::U8(x) => {
            candle_core::Tensor::from_vec(x.iter().copied().collect::<Vec<_>>(), shape, device)?
        }
        _ => Err(ArrayError::UnsupportedDtype {
            dtype: value.dtype(),
            backend: "candle".to_string(),
        })?,
    })
}

impl TryFrom<&NDArrayNumericTensor> for candle_core::Tensor {
    type Error = CallError;
    fn try_from(value: &NDArrayNumericTensor) -> Result<Self, Self::Error> {
        load_to_device(value, &Device::Cpu)
    }
}

impl TryFrom<&candle_core::Tensor> for NDArrayNumericTensor {
    type Error = CallError;
    #[allow(unreachable_patterns)]
    fn try_from(value: &candle_core::Tensor) -> Result<Self, Self::Error> {
        let shape = value.dims().to_vec();
        let tensor_flat = value.flatten_all()?;
        Ok(match value.dtype() {
            candle_core::DType::F64 => {
                NDArrayNumericTensor::from_vec_shape(tensor_flat.to_vec1::<f64>()?, &shape)?
            }
            candle_core::DType::F32 => {
                NDArrayNumericTensor::from_vec_shape(tensor_flat.to_vec1::<f32>()?, &shape)?
            }
            candle_core::DType::BF16 => {
                NDArrayNumericTensor::from_vec_shape(tensor_flat.to_vec1::<half::bf16>()?, &shape)?
            }
            candle_core::DType::F16 => {
                NDArrayNumericTensor::from_vec_shape(tensor_flat.to_vec1::<half::f16>()?, &shape)?
            }
            candle_core::DType::I64 => {
                NDArrayNumericTensor::from_vec_shape(tensor_flat.to_vec1::<i64>()?, &shape)?
            }
            candle_core::DType::U32 => {
                NDArrayNumericTensor::from_vec_shape(tensor_flat.to_vec1::<u32>()?, &shape)?
            }
            candle_core::DType::U8 => {
                NDArrayNumericTensor::from_vec_shape(tensor_flat.to_vec1::<u8>()?, &shape)?
            }
            // narrow float storage formats are read back through f32
            _ => NDArrayNumericTensor::from_vec_shape(
                tensor_flat.to_dtype(candle_core::DType::F32)?.to_vec1::<f32>()?,
                &shape,
            )?
            .cast(DType::F16)?,
        })
    }
}
