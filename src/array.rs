use std::fmt::{Display, Formatter};
use std::ops::{Add, Div, Mul, Neg, Sub};

use log::debug;
use ndarray::ArrayD;

use crate::api::{self, CallOptions};
use crate::backends::BackendKind;
use crate::backends::ndarray_backend::NDArrayNumericTensor;
use crate::backends::ndarray_backend::conversions::NDArrayNumericTensorType;
use crate::checks;
use crate::context;
use crate::device::Device;
use crate::dtype::DType;
use crate::error::ArrayError;
use crate::native_array::NativeArray;
use crate::numeric_scalar::NumericScalar;

/// How an in-place update behaves on a backend whose arrays cannot be
/// written in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InplaceMode {
    /// Fail with a NotSupported error.
    #[default]
    Required,
    /// Compute a fresh value and rebind the wrapper to it.
    BestEffort,
}

/// Backend-independent handle on exactly one native array.
///
/// Shape, dtype and device are always read from the native value.
#[derive(Debug, Clone)]
pub struct Array {
    native: NativeArray,
}

impl Array {
    pub fn from_native(native: NativeArray) -> Self {
        Self { native }
    }

    /// Build an array on the current backend from row-major host values.
    pub fn from_vec<T: NDArrayNumericTensorType>(values: Vec<T>, shape: &[usize]) -> Result<Self, ArrayError> {
        let host = NDArrayNumericTensor::from_vec_shape(values, shape)?;
        Self::from_host(host)
    }

    /// Load a host tensor into the current backend.
    pub fn from_host(host: NDArrayNumericTensor) -> Result<Self, ArrayError> {
        let backend = context::current_backend(None)?;
        Ok(Self::from_native(backend.adopt(&NativeArray::NDArray(host))?))
    }

    pub fn native(&self) -> &NativeArray {
        &self.native
    }

    pub(crate) fn native_mut(&mut self) -> &mut NativeArray {
        &mut self.native
    }

    pub fn to_native(&self) -> NativeArray {
        self.native.clone()
    }

    pub fn into_native(self) -> NativeArray {
        self.native
    }

    pub fn shape(&self) -> Vec<usize> {
        self.native.shape()
    }

    pub fn rank(&self) -> usize {
        self.native.rank()
    }

    pub fn size(&self) -> usize {
        self.native.num_elements()
    }

    pub fn dtype(&self) -> DType {
        self.native.dtype()
    }

    pub fn device(&self) -> Device {
        self.native.device()
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.native.backend_kind()
    }

    pub fn data_ptr(&self) -> Option<usize> {
        self.native.data_ptr()
    }

    /// Host copy of the values.
    pub fn to_host(&self) -> Result<NDArrayNumericTensor, ArrayError> {
        Ok(self.native.to_ndarray()?)
    }

    pub fn to_ndarray<T: NDArrayNumericTensorType>(&self) -> Result<ArrayD<T>, ArrayError> {
        Ok(self.to_host()?.to_ndarray::<T>()?)
    }

    pub fn to_vec<T: NDArrayNumericTensorType>(&self) -> Result<Vec<T>, ArrayError> {
        Ok(self.to_host()?.cast(T::DTYPE)?.try_to_vec::<T>()?)
    }

    /// Nested lists mirroring the shape.
    pub fn to_list(&self) -> Result<serde_json::Value, ArrayError> {
        Ok(self.to_host()?.to_json())
    }

    /// The single element of a one-element array.
    pub fn to_scalar(&self) -> Result<NumericScalar, ArrayError> {
        checks::check_true(
            self.size() == 1,
            &format!(
                "only arrays with exactly one element can be converted to a scalar, got shape {:?}",
                self.shape()
            ),
        )?;
        self.to_host()?
            .first_element()
            .ok_or_else(|| ArrayError::Value("array has no elements".to_string()))
    }

    /// Whether `inplace_update` can write into this array's storage under the
    /// current backend.
    pub fn supports_inplace_updates(&self) -> Result<bool, ArrayError> {
        let backend = context::current_backend(Some(&self.native))?;
        Ok(backend.native_inplace_support && self.native.supports_inplace())
    }

    /// Overwrite the values of `self` with `value`, broadcast and cast to this
    /// array's shape and dtype.
    pub fn inplace_update(&mut self, value: &Array, mode: InplaceMode) -> Result<(), ArrayError> {
        checks::check_inplace_sizes_valid(&self.shape(), &value.shape())?;
        if self.supports_inplace_updates()? {
            self.native.assign(&value.native)?;
            return Ok(());
        }
        match mode {
            InplaceMode::Required => Err(ArrayError::NotSupported(format!(
                "the {} backend cannot update arrays in place",
                self.backend_kind()
            ))),
            InplaceMode::BestEffort => {
                debug!("Rebinding a {} array instead of updating it in place", self.backend_kind());
                let mut host = self.to_host()?;
                host.assign(&value.to_host()?)?;
                let backend = self.backend_kind().descriptor()?;
                self.native = backend.adopt(&NativeArray::NDArray(host))?;
                Ok(())
            }
        }
    }

    pub fn inplace_increment(&mut self, value: &Array, mode: InplaceMode) -> Result<(), ArrayError> {
        let sum = api::add(&*self, value, CallOptions::new())?;
        self.inplace_update(&sum, mode)
    }

    pub fn inplace_decrement(&mut self, value: &Array, mode: InplaceMode) -> Result<(), ArrayError> {
        let difference = api::subtract(&*self, value, CallOptions::new())?;
        self.inplace_update(&difference, mode)
    }

    pub fn matmul(&self, rhs: &Array) -> Result<Array, ArrayError> {
        api::matmul(self, rhs, CallOptions::new())
    }

    pub fn pow(&self, rhs: &Array) -> Result<Array, ArrayError> {
        api::pow(self, rhs, CallOptions::new())
    }

    pub fn reshape(&self, shape: &[usize]) -> Result<Array, ArrayError> {
        api::reshape(self, shape, CallOptions::new())
    }

    pub fn astype(&self, dtype: DType) -> Result<Array, ArrayError> {
        api::astype(self, dtype)
    }

    pub fn sum(&self) -> Result<Array, ArrayError> {
        api::sum(self, None, false, CallOptions::new())
    }

    pub fn mean(&self) -> Result<Array, ArrayError> {
        api::mean(self, None, false, CallOptions::new())
    }
}

macro_rules! impl_binary_operator {
    ($trait:ident, $method:ident, $function:path) => {
        impl $trait<&Array> for &Array {
            type Output = Result<Array, ArrayError>;

            fn $method(self, rhs: &Array) -> Self::Output {
                $function(self, rhs, CallOptions::new())
            }
        }

        impl $trait<Array> for Array {
            type Output = Result<Array, ArrayError>;

            fn $method(self, rhs: Array) -> Self::Output {
                $function(&self, &rhs, CallOptions::new())
            }
        }
    };
}

impl_binary_operator!(Add, add, api::add);
impl_binary_operator!(Sub, sub, api::subtract);
impl_binary_operator!(Mul, mul, api::multiply);
impl_binary_operator!(Div, div, api::divide);

impl Neg for &Array {
    type Output = Result<Array, ArrayError>;

    fn neg(self) -> Self::Output {
        api::negative(self, CallOptions::new())
    }
}

impl Neg for Array {
    type Output = Result<Array, ArrayError>;

    fn neg(self) -> Self::Output {
        api::negative(&self, CallOptions::new())
    }
}

impl From<NativeArray> for Array {
    fn from(value: NativeArray) -> Self {
        Array::from_native(value)
    }
}

impl From<Array> for NativeArray {
    fn from(value: Array) -> Self {
        value.native
    }
}

impl Display for Array {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "array(shape={:?}, dtype={}, backend={})",
            self.shape(),
            self.dtype(),
            self.backend_kind()
        )
    }
}
