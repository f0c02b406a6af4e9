use std::str::FromStr;
use std::sync::OnceLock;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::backends::BackendKind;
use crate::checks;
use crate::device::Device;
use crate::dtype::DType;
use crate::error::ArrayError;

pub const BACKEND_VAR: &str = "WHISPER_ARRAY_BACKEND";
pub const DEVICE_VAR: &str = "WHISPER_ARRAY_DEVICE";
pub const FLOAT_DTYPE_VAR: &str = "WHISPER_ARRAY_FLOAT_DTYPE";
pub const INT_DTYPE_VAR: &str = "WHISPER_ARRAY_INT_DTYPE";

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Process-wide defaults every thread's context starts from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: BackendKind,
    pub device: Device,
    #[serde(with = "dtype_name")]
    pub float_dtype: DType,
    #[serde(with = "dtype_name")]
    pub int_dtype: DType,
}

/// Dtypes are spelled by their array-API names (`"float32"`) in configuration.
mod dtype_name {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::dtype::DType;

    pub fn serialize<S: Serializer>(dtype: &DType, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(dtype.name())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DType, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendKind::NDArray,
            device: Device::Cpu,
            float_dtype: DType::F32,
            int_dtype: DType::I32,
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring unparseable value {raw:?} for {name}");
            None
        }
    }
}

impl Config {
    /// Defaults overridden by any `WHISPER_ARRAY_*` environment variables.
    pub fn from_env() -> Self {
        let mut config = Config::default();
        if let Some(backend) = parse_var::<BackendKind>(BACKEND_VAR) {
            config.backend = backend;
        }
        if let Some(device) = parse_var::<Device>(DEVICE_VAR) {
            config.device = device;
        }
        if let Some(dtype) = parse_var::<DType>(FLOAT_DTYPE_VAR) {
            config.float_dtype = dtype;
        }
        if let Some(dtype) = parse_var::<DType>(INT_DTYPE_VAR) {
            config.int_dtype = dtype;
        }
        config
    }

    pub fn from_json(json: &str) -> Result<Self, ArrayError> {
        serde_json::from_str(json).map_err(|e| ArrayError::Value(format!("invalid configuration: {e}")))
    }

    pub fn to_json(&self) -> Result<String, ArrayError> {
        serde_json::to_string(self).map_err(|e| ArrayError::Value(e.to_string()))
    }

    /// Reject defaults whose kinds do not match their role.
    pub fn validate(&self) -> Result<(), ArrayError> {
        checks::check_true(
            self.float_dtype.is_float(),
            &format!("default float dtype must be a float dtype, got {}", self.float_dtype),
        )?;
        checks::check_true(
            self.int_dtype.is_int() || self.int_dtype.is_uint(),
            &format!("default int dtype must be an integer dtype, got {}", self.int_dtype),
        )?;
        let backend = self.backend.descriptor()?;
        checks::check_elem_in_list(&self.device.kind(), &backend.devices.valid)
    }
}

/// Install the process configuration. Must happen before the first thread
/// touches the context; the configuration is immutable afterwards.
pub fn install(config: Config) -> Result<(), ArrayError> {
    config.validate()?;
    debug!("Installing configuration {config:?}");
    CONFIG
        .set(config)
        .map_err(|_| ArrayError::Value("the configuration has already been initialized".to_string()))
}

/// The installed configuration, read from the environment on first access
/// when nothing was installed.
pub fn get() -> &'static Config {
    CONFIG.get_or_init(|| {
        let config = Config::from_env();
        match config.validate() {
            Ok(()) => config,
            Err(err) => {
                warn!("Ignoring environment configuration: {err}");
                Config::default()
            }
        }
    })
}
