//! The typed unified API. Each function builds an [`Invocation`] and sends it
//! through the registered pipeline of the same name.

mod creation;
mod elementwise;
mod general;
mod linalg;
mod statistical;

pub use creation::*;
pub use elementwise::*;
pub use general::*;
pub use linalg::*;
pub use statistical::*;

use crate::array::Array;
use crate::container::Container;
use crate::device::Device;
use crate::dtype::DType;
use crate::error::ArrayError;
use crate::func_wrapper::invocation::{Invocation, OutArg, Value};
use crate::func_wrapper::registry;
use crate::native_array::NativeArray;

/// The configuration surface every unified function accepts.
#[derive(Debug, Default)]
pub struct CallOptions<'a> {
    pub dtype: Option<DType>,
    pub device: Option<Device>,
    pub out: Option<OutArg<'a>>,
}

impl<'a> CallOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dtype(mut self, dtype: DType) -> Self {
        self.dtype = Some(dtype);
        self
    }

    pub fn device(mut self, device: Device) -> Self {
        self.device = Some(device);
        self
    }

    pub fn out(mut self, out: &'a mut Array) -> Self {
        self.out = Some(OutArg::Array(out));
        self
    }

    pub fn out_container(mut self, out: &'a mut Container) -> Self {
        self.out = Some(OutArg::Container(out));
        self
    }
}

/// Conversion of a pipeline result into the caller's expected type.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, ArrayError>;
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, ArrayError> {
        Ok(value)
    }
}

impl FromValue for Array {
    fn from_value(value: Value) -> Result<Self, ArrayError> {
        value.into_array()
    }
}

impl FromValue for Container {
    fn from_value(value: Value) -> Result<Self, ArrayError> {
        value.into_container()
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self, ArrayError> {
        value.into_bool()
    }
}

/// A primary argument of a nestable function. Arrays produce arrays and
/// containers produce containers.
pub trait Operand: Into<Value> {
    type Output: FromValue;
}

impl Operand for Array {
    type Output = Array;
}

impl Operand for &Array {
    type Output = Array;
}

impl Operand for NativeArray {
    type Output = Array;
}

impl Operand for Container {
    type Output = Container;
}

impl Operand for &Container {
    type Output = Container;
}

impl Operand for Value {
    type Output = Value;
}

pub(crate) fn invoke<'a, T: FromValue>(
    name: &'static str,
    inv: Invocation<'a>,
    options: CallOptions<'a>,
) -> Result<T, ArrayError> {
    let inv = inv
        .with_dtype(options.dtype)
        .with_device(options.device)
        .with_out(options.out);
    T::from_value(registry::call(name, inv)?)
}
