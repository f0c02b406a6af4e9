pub mod conversions;
mod kernels;
pub mod numeric_tensor;
pub(crate) mod ops;

pub use numeric_tensor::{NDArrayNumericTensor, NDArrayNumericTensorError};

use crate::backends::{BackendDescriptor, BackendKind, DTypeTable, DeviceTable};
use crate::device::DeviceKind;
use crate::dtype::DType;

pub(crate) fn descriptor() -> BackendDescriptor {
    let invalid = vec![DType::C64, DType::C128];
    BackendDescriptor::new(
        BackendKind::NDArray,
        DTypeTable {
            valid: DType::ALL.into_iter().filter(|d| !invalid.contains(d)).collect(),
            invalid,
            fallbacks: vec![],
        },
        DeviceTable {
            valid: vec![DeviceKind::Cpu],
            invalid: vec![DeviceKind::Gpu, DeviceKind::Tpu],
        },
        true,
        kernels::kernels(),
    )
}
