use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ArrayError;

/// Symbolic device tag, spelled `"cpu"`, `"gpu:N"` or `"tpu:N"`.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Device {
    #[default]
    Cpu,
    Gpu(usize),
    Tpu(usize),
}

#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum DeviceKind {
    Cpu,
    Gpu,
    Tpu,
}

impl Device {
    pub fn kind(&self) -> DeviceKind {
        match self {
            Device::Cpu => DeviceKind::Cpu,
            Device::Gpu(_) => DeviceKind::Gpu,
            Device::Tpu(_) => DeviceKind::Tpu,
        }
    }
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Device::Cpu => write!(f, "cpu"),
            Device::Gpu(i) => write!(f, "gpu:{i}"),
            Device::Tpu(i) => write!(f, "tpu:{i}"),
        }
    }
}

impl FromStr for Device {
    type Err = ArrayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        let (kind, index) = match lowered.split_once(':') {
            Some((kind, index)) => {
                let index = index
                    .parse::<usize>()
                    .map_err(|_| ArrayError::Value(format!("invalid device index in {s:?}")))?;
                (kind.to_string(), index)
            }
            None => (lowered.clone(), 0),
        };
        match kind.as_str() {
            "cpu" if index == 0 => Ok(Device::Cpu),
            "gpu" | "cuda" => Ok(Device::Gpu(index)),
            "tpu" => Ok(Device::Tpu(index)),
            _ => Err(ArrayError::Value(format!("unknown device {s:?}"))),
        }
    }
}

impl TryFrom<String> for Device {
    type Error = ArrayError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Device> for String {
    fn from(value: Device) -> Self {
        value.to_string()
    }
}

#[cfg(feature = "candle")]
impl From<&candle_core::Device> for Device {
    fn from(value: &candle_core::Device) -> Self {
        match value.location() {
            candle_core::DeviceLocation::Cpu => Device::Cpu,
            candle_core::DeviceLocation::Cuda { gpu_id } => Device::Gpu(gpu_id),
            candle_core::DeviceLocation::Metal { gpu_id } => Device::Gpu(gpu_id),
        }
    }
}
