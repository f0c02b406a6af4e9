use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::device::{Device, DeviceKind};
use crate::dtype::DType;
use crate::error::{ArrayError, CallError};
use crate::func_wrapper::invocation::{Invocation, Value};
use crate::native_array::NativeArray;

/// Build a `(name, kernel)` list, coercing each function item to [`Kernel`].
macro_rules! kernel_table {
    ($(($name:literal, $kernel:path)),* $(,)?) => {
        vec![$(($name, $kernel as $crate::backends::Kernel)),*]
    };
}

#[cfg(feature = "candle")]
pub mod candle_backend;
pub mod ndarray_backend;
mod shared_kernels;

/// A backend implementation of one named function. Arguments arrive already
/// converted to this backend's native arrays.
pub type Kernel = for<'a> fn(&Invocation<'a>) -> Result<Value, CallError>;

#[derive(
    Copy,
    Clone,
    Debug,
    Hash,
    Eq,
    PartialEq,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::IntoStaticStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    NDArray,
    Candle,
}

impl BackendKind {
    pub const ALL: [BackendKind; 2] = [BackendKind::NDArray, BackendKind::Candle];

    pub fn name(&self) -> &'static str {
        (*self).into()
    }

    /// Parse a backend name, reporting unrecognized names as
    /// [`ArrayError::UnknownBackend`].
    pub fn from_name(name: &str) -> Result<Self, ArrayError> {
        BackendKind::from_str(name.trim()).map_err(|_| ArrayError::UnknownBackend(name.to_string()))
    }

    /// Whether this backend was compiled into the crate.
    pub fn is_available(&self) -> bool {
        match self {
            BackendKind::NDArray => true,
            BackendKind::Candle => cfg!(feature = "candle"),
        }
    }

    /// Load (once per process) and return the backend's descriptor.
    pub fn descriptor(&self) -> Result<Arc<BackendDescriptor>, ArrayError> {
        static NDARRAY: OnceLock<Arc<BackendDescriptor>> = OnceLock::new();
        match self {
            BackendKind::NDArray => {
                Ok(NDARRAY.get_or_init(|| Arc::new(ndarray_backend::descriptor())).clone())
            }
            #[cfg(feature = "candle")]
            BackendKind::Candle => {
                static CANDLE: OnceLock<Arc<BackendDescriptor>> = OnceLock::new();
                Ok(CANDLE.get_or_init(|| Arc::new(candle_backend::descriptor())).clone())
            }
            #[cfg(not(feature = "candle"))]
            BackendKind::Candle => Err(candle_unavailable()),
        }
    }
}

#[cfg(not(feature = "candle"))]
fn candle_unavailable() -> ArrayError {
    ArrayError::BackendImport {
        backend: BackendKind::Candle.to_string(),
        reason: "this build was compiled without the `candle` feature".to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DTypeTable {
    pub valid: Vec<DType>,
    pub invalid: Vec<DType>,
    /// Substitutions applied when an invalid dtype is requested.
    pub fallbacks: Vec<(DType, DType)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeviceTable {
    pub valid: Vec<DeviceKind>,
    pub invalid: Vec<DeviceKind>,
}

/// Everything the dispatch machinery needs to know about one backend.
pub struct BackendDescriptor {
    pub kind: BackendKind,
    pub dtypes: DTypeTable,
    pub devices: DeviceTable,
    pub native_inplace_support: bool,
    kernels: HashMap<&'static str, Kernel>,
}

impl std::fmt::Debug for BackendDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendDescriptor")
            .field("kind", &self.kind)
            .field("dtypes", &self.dtypes)
            .field("devices", &self.devices)
            .field("native_inplace_support", &self.native_inplace_support)
            .field("functions", &self.function_names())
            .finish()
    }
}

impl BackendDescriptor {
    pub(crate) fn new(
        kind: BackendKind,
        dtypes: DTypeTable,
        devices: DeviceTable,
        native_inplace_support: bool,
        kernels: Vec<(&'static str, Kernel)>,
    ) -> Self {
        let mut table: HashMap<&'static str, Kernel> = shared_kernels::kernels().into_iter().collect();
        table.extend(kernels);
        debug!("Loaded {kind} backend with {} functions", table.len());
        Self {
            kind,
            dtypes,
            devices,
            native_inplace_support,
            kernels: table,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn kernel(&self, function: &str) -> Option<Kernel> {
        self.kernels.get(function).copied()
    }

    pub fn function_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.kernels.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn is_valid_dtype(&self, dtype: DType) -> bool {
        self.dtypes.valid.contains(&dtype)
    }

    /// The dtype this backend will actually use for `dtype`: the dtype itself
    /// when valid, else its registered fallback.
    pub fn closest_valid_dtype(&self, dtype: DType) -> Result<DType, ArrayError> {
        if self.is_valid_dtype(dtype) {
            return Ok(dtype);
        }
        match self.dtypes.fallbacks.iter().find(|(from, _)| *from == dtype) {
            Some((_, to)) => {
                warn!("The {} backend does not support {dtype}, using {to} instead", self.kind);
                Ok(*to)
            }
            None => Err(ArrayError::UnsupportedDtype {
                dtype,
                backend: self.kind.to_string(),
            }),
        }
    }

    pub fn check_device(&self, device: Device) -> Result<(), ArrayError> {
        if self.devices.valid.contains(&device.kind()) {
            Ok(())
        } else {
            Err(ArrayError::UnsupportedDevice {
                device,
                backend: self.kind.to_string(),
            })
        }
    }

    pub fn owns(&self, native: &NativeArray) -> bool {
        native.backend_kind() == self.kind
    }

    /// Convert a native array of any backend into one of this backend,
    /// applying dtype fallbacks on the way in.
    pub fn adopt(&self, native: &NativeArray) -> Result<NativeArray, CallError> {
        if self.owns(native) {
            return Ok(native.clone());
        }
        debug!("Converting a {} array into the {} backend", native.backend_kind(), self.kind);
        let host = native.to_ndarray()?;
        let host = host.cast(self.closest_valid_dtype(host.dtype())?)?;
        match self.kind {
            BackendKind::NDArray => Ok(NativeArray::NDArray(host)),
            #[cfg(feature = "candle")]
            BackendKind::Candle => Ok(NativeArray::Candle(candle_backend::load_to_device(
                &host,
                &candle_core::Device::Cpu,
            )?)),
            #[cfg(not(feature = "candle"))]
            BackendKind::Candle => Err(candle_unavailable().into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_names_parse_case_insensitively() {
        assert_eq!(BackendKind::from_name("NDArray").unwrap(), BackendKind::NDArray);
        assert_eq!(BackendKind::from_name("candle").unwrap(), BackendKind::Candle);
        assert_eq!(BackendKind::NDArray.to_string(), "ndarray");
        assert!(matches!(
            BackendKind::from_name("tensorflow"),
            Err(ArrayError::UnknownBackend(_))
        ));
    }

    #[test]
    fn ndarray_descriptor_rejects_complex() {
        let descriptor = BackendKind::NDArray.descriptor().unwrap();
        assert_eq!(descriptor.closest_valid_dtype(DType::U16).unwrap(), DType::U16);
        assert!(matches!(
            descriptor.closest_valid_dtype(DType::C64),
            Err(ArrayError::UnsupportedDtype { .. })
        ));
        assert!(descriptor.check_device(Device::Gpu(0)).is_err());
    }
}
