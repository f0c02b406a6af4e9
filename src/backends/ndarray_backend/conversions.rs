use half::{bf16, f16};
use ndarray::{ArcArray, ArrayD, IxDyn};

use crate::backends::ndarray_backend::{NDArrayNumericTensor, NDArrayNumericTensorError};
use crate::dtype::DTypeOfPrimitive;

/// Host element types that map one-to-one onto an [`NDArrayNumericTensor`] variant.
pub trait NDArrayNumericTensorType: Sized + DTypeOfPrimitive + Clone {
    fn ndarray_numeric_tensor_from_vec_shape(
        v: Vec<Self>,
        shape: &[usize],
    ) -> Result<NDArrayNumericTensor, NDArrayNumericTensorError>;
    fn ndarray_numeric_tensor_inner(
        tensor: &NDArrayNumericTensor,
    ) -> Result<&ArcArray<Self, IxDyn>, NDArrayNumericTensorError>;
    fn ndarray_numeric_tensor_from_ndarray(value: ArcArray<Self, IxDyn>) -> NDArrayNumericTensor;
}

impl NDArrayNumericTensor {
    pub fn from_vec_shape<T: NDArrayNumericTensorType>(
        v: Vec<T>,
        shape: &[usize],
    ) -> Result<Self, NDArrayNumericTensorError> {
        T::ndarray_numeric_tensor_from_vec_shape(v, shape)
    }

    pub fn from_vec<T: NDArrayNumericTensorType>(v: Vec<T>) -> Self {
        T::ndarray_numeric_tensor_from_ndarray(ArcArray::from_vec(v).into_dyn())
    }

    pub fn as_inner<T: NDArrayNumericTensorType>(
        &self,
    ) -> Result<&ArcArray<T, IxDyn>, NDArrayNumericTensorError> {
        T::ndarray_numeric_tensor_inner(self)
    }

    /// Elements in logical order. The tensor must already hold `T`.
    pub fn try_to_vec<T: NDArrayNumericTensorType>(&self) -> Result<Vec<T>, NDArrayNumericTensorError> {
        Ok(self.as_inner::<T>()?.iter().cloned().collect())
    }

    /// An owned `ndarray` copy, casting to `T` first when the dtype differs.
    pub fn to_ndarray<T: NDArrayNumericTensorType>(&self) -> Result<ArrayD<T>, NDArrayNumericTensorError> {
        let cast = self.cast(T::DTYPE)?;
        Ok(cast.as_inner::<T>()?.to_owned())
    }
}

impl<T: NDArrayNumericTensorType> From<Vec<T>> for NDArrayNumericTensor {
    fn from(value: Vec<T>) -> Self {
        NDArrayNumericTensor::from_vec(value)
    }
}

impl<T: NDArrayNumericTensorType> From<ArrayD<T>> for NDArrayNumericTensor {
    fn from(value: ArrayD<T>) -> Self {
        T::ndarray_numeric_tensor_from_ndarray(value.into_shared())
    }
}

macro_rules! impl_type_ndarray_backend {
    ($a:ident, $b:ident) => {
        impl NDArrayNumericTensorType for $a {
            fn ndarray_numeric_tensor_from_vec_shape(
                v: Vec<Self>,
                shape: &[usize],
            ) -> Result<NDArrayNumericTensor, NDArrayNumericTensorError> {
                Ok(NDArrayNumericTensor::$b(ArcArray::from_shape_vec(IxDyn(shape), v)?))
            }

            fn ndarray_numeric_tensor_inner(
                tensor: &NDArrayNumericTensor,
            ) -> Result<&ArcArray<Self, IxDyn>, NDArrayNumericTensorError> {
                if let NDArrayNumericTensor::$b(x) = tensor {
                    Ok(x)
                } else {
                    Err(NDArrayNumericTensorError::WrongDTypeError(Self::DTYPE, tensor.dtype()))
                }
            }

            fn ndarray_numeric_tensor_from_ndarray(value: ArcArray<Self, IxDyn>) -> NDArrayNumericTensor {
                NDArrayNumericTensor::$b(value)
            }
        }
    };
}

impl_type_ndarray_backend!(f64, F64);
impl_type_ndarray_backend!(f32, F32);
impl_type_ndarray_backend!(bf16, BF16);
impl_type_ndarray_backend!(f16, F16);
impl_type_ndarray_backend!(u64, U64);
impl_type_ndarray_backend!(i64, I64);
impl_type_ndarray_backend!(u32, U32);
impl_type_ndarray_backend!(i32, I32);
impl_type_ndarray_backend!(u16, U16);
impl_type_ndarray_backend!(i16, I16);
impl_type_ndarray_backend!(u8, U8);
impl_type_ndarray_backend!(i8, I8);
impl_type_ndarray_backend!(bool, BOOL);
