use std::collections::HashMap;
use std::sync::OnceLock;

use log::debug;

use super::invocation::{Invocation, Value};
use super::{Call, DTypeRule, FunctionSpec, Layer, compose};
use crate::error::ArrayError;

/// Every unified function, composed once per process.
pub struct FunctionRegistry {
    functions: HashMap<&'static str, (FunctionSpec, Call)>,
}

impl std::fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionRegistry").field("functions", &self.names()).finish()
    }
}

const ALL_LAYERS: &[Layer] = &Layer::ALL;
const ARRAY_LAYERS: &[Layer] = &[Layer::Exceptions, Layer::Nestable, Layer::NativeArrays, Layer::Out];
const DEVICE_LAYERS: &[Layer] = &[
    Layer::Exceptions,
    Layer::Nestable,
    Layer::DeviceInference,
    Layer::NativeArrays,
    Layer::Out,
];

fn unified_functions() -> Vec<FunctionSpec> {
    let mut specs = Vec::new();
    for name in ["zeros", "ones", "empty", "linspace", "eye"] {
        specs.push(FunctionSpec::new(name, ALL_LAYERS).with_dtype_rule(DTypeRule::DefaultFloat));
    }
    for name in ["full", "arange", "asarray"] {
        specs.push(FunctionSpec::new(name, ALL_LAYERS).with_dtype_rule(DTypeRule::Literals));
    }
    for name in ["zeros_like", "ones_like", "full_like", "empty_like"] {
        specs.push(FunctionSpec::new(name, ALL_LAYERS).with_dtype_rule(DTypeRule::FromInputs));
    }
    for name in [
        "tril", "triu", "copy_array", "reshape", "astype", "add", "subtract", "multiply", "divide", "pow",
        "negative", "abs", "exp", "log", "sqrt", "sum", "prod", "mean", "max", "min", "matmul",
    ] {
        specs.push(FunctionSpec::new(name, ARRAY_LAYERS));
    }
    specs.push(FunctionSpec::new("to_device", DEVICE_LAYERS));
    specs.push(FunctionSpec::new("is_native_array", &[Layer::Exceptions]));
    specs.push(FunctionSpec::new("array_equal", &[Layer::Exceptions, Layer::NativeArrays]));
    specs
}

impl FunctionRegistry {
    fn new() -> Self {
        let functions: HashMap<_, _> = unified_functions()
            .into_iter()
            .map(|spec| (spec.name, (spec.clone(), compose(spec))))
            .collect();
        debug!("Registered {} unified functions", functions.len());
        Self { functions }
    }

    pub fn global() -> &'static FunctionRegistry {
        static REGISTRY: OnceLock<FunctionRegistry> = OnceLock::new();
        REGISTRY.get_or_init(FunctionRegistry::new)
    }

    pub fn spec(&self, name: &str) -> Option<&FunctionSpec> {
        self.functions.get(name).map(|(spec, _)| spec)
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.functions.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn call(&self, name: &str, inv: Invocation<'_>) -> Result<Value, ArrayError> {
        let (_, call) = self
            .functions
            .get(name)
            .ok_or_else(|| ArrayError::Value(format!("unknown function {name:?}")))?;
        call(inv).map_err(ArrayError::from)
    }
}

/// Call a unified function by name through its composed pipeline.
pub fn call(name: &str, inv: Invocation<'_>) -> Result<Value, ArrayError> {
    FunctionRegistry::global().call(name, inv)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_function_has_kernels_on_ndarray() {
        let backend = crate::backends::BackendKind::NDArray.descriptor().unwrap();
        for name in FunctionRegistry::global().names() {
            assert!(backend.kernel(name).is_some(), "{name} has no ndarray kernel");
        }
    }

    #[test]
    fn query_functions_skip_conversion() {
        let spec = FunctionRegistry::global().spec("is_native_array").unwrap();
        assert!(!spec.has_layer(Layer::NativeArrays));
        assert!(FunctionRegistry::global().spec("zeros").unwrap().has_layer(Layer::DtypeInference));
    }
}
