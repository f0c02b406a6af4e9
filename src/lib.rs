pub mod api;
pub mod array;
pub mod backends;
pub mod checks;
pub mod config;
pub mod container;
pub mod context;
pub mod device;
pub mod dtype;
pub mod error;
pub mod func_wrapper;
pub mod native_array;
pub mod numeric_scalar;

pub use api::CallOptions;
pub use array::{Array, InplaceMode};
pub use backends::ndarray_backend::NDArrayNumericTensor;
pub use backends::{BackendDescriptor, BackendKind};
pub use config::Config;
pub use container::{Container, Item, KeyChainFilter, Leaf, MapOptions};
pub use context::{
    ContextGuard, current_backend, current_backend_name, set_backend, unset_backend, use_backend, with_backend,
};
pub use device::Device;
pub use dtype::DType;
pub use error::{ArrayError, ErrorKind};
pub use func_wrapper::invocation::Value;
pub use native_array::NativeArray;
pub use numeric_scalar::NumericScalar;
