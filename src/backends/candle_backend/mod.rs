mod conversions;
mod kernels;

pub(crate) use conversions::load_to_device;

use crate::backends::{BackendDescriptor, BackendKind, DTypeTable, DeviceTable};
use crate::device::DeviceKind;
use crate::dtype::DType;

/// candle tensors are immutable: in-place updates rebind the wrapper instead
/// of writing into storage.
pub(crate) fn descriptor() -> BackendDescriptor {
    let valid = vec![
        DType::U8,
        DType::U32,
        DType::I64,
        DType::BF16,
        DType::F16,
        DType::F32,
        DType::F64,
    ];
    BackendDescriptor::new(
        BackendKind::Candle,
        DTypeTable {
            invalid: DType::ALL.into_iter().filter(|d| !valid.contains(d)).collect(),
            valid,
            fallbacks: vec![
                (DType::U16, DType::U8),
                (DType::U64, DType::U32),
                (DType::I8, DType::I64),
                (DType::I16, DType::I64),
                (DType::I32, DType::I64),
                (DType::BOOL, DType::U8),
            ],
        },
        DeviceTable {
            valid: vec![DeviceKind::Cpu],
            invalid: vec![DeviceKind::Gpu, DeviceKind::Tpu],
        },
        false,
        kernels::kernels(),
    )
}
