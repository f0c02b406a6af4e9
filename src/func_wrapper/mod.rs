//! The function-wrapping pipeline.
//!
//! Every unified function is a [`FunctionSpec`]: a name, the layers it opts
//! into and a dtype rule. [`compose`] wraps the backend call in those layers
//! once, at registration, always in the order of [`Layer`] (outermost first).

mod conversion;
mod exceptions;
mod inference;
pub mod invocation;
mod nestable;
mod out;
pub mod registry;

use std::sync::Arc;

use log::trace;

use crate::context;
use crate::error::CallError;
use invocation::{Invocation, Value};

/// A composed (or partially composed) function.
pub type Call = Arc<dyn for<'a> Fn(Invocation<'a>) -> Result<Value, CallError> + Send + Sync>;

pub(crate) fn make_call<F>(f: F) -> Call
where
    F: for<'a> Fn(Invocation<'a>) -> Result<Value, CallError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// One cross-cutting concern of the pipeline.
pub trait Middleware: Send + Sync {
    fn wrap(&self, spec: Arc<FunctionSpec>, next: Call) -> Call;
}

/// The pipeline layers, declared outermost first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, strum_macros::Display)]
pub enum Layer {
    Exceptions,
    Nestable,
    DeviceInference,
    DtypeInference,
    NativeArrays,
    Out,
}

impl Layer {
    pub const ALL: [Layer; 6] = [
        Layer::Exceptions,
        Layer::Nestable,
        Layer::DeviceInference,
        Layer::DtypeInference,
        Layer::NativeArrays,
        Layer::Out,
    ];

    fn middleware(&self) -> &'static dyn Middleware {
        match self {
            Layer::Exceptions => &exceptions::ExceptionTranslation,
            Layer::Nestable => &nestable::NestableDispatch,
            Layer::DeviceInference => &inference::DeviceInference,
            Layer::DtypeInference => &inference::DtypeInference,
            Layer::NativeArrays => &conversion::NativeArrayConversion,
            Layer::Out => &out::OutArgument,
        }
    }
}

/// How the dtype-inference layer picks a dtype when none was given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DTypeRule {
    /// The default float dtype.
    DefaultFloat,
    /// Promotion of the array arguments, else classification of the numeric
    /// literals among the arguments.
    Literals,
    /// Promotion of the array arguments.
    FromInputs,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSpec {
    pub name: &'static str,
    pub layers: Vec<Layer>,
    pub dtype_rule: DTypeRule,
}

impl FunctionSpec {
    pub fn new(name: &'static str, layers: &[Layer]) -> Self {
        Self {
            name,
            layers: layers.to_vec(),
            dtype_rule: DTypeRule::FromInputs,
        }
    }

    pub fn with_dtype_rule(mut self, rule: DTypeRule) -> Self {
        self.dtype_rule = rule;
        self
    }

    pub fn has_layer(&self, layer: Layer) -> bool {
        self.layers.contains(&layer)
    }
}

/// Dispatch to the current backend's kernel for `name`.
fn backend_call(name: &'static str) -> Call {
    make_call(move |inv| {
        let backend = context::current_backend(inv.array_args().first().copied())?;
        let kernel = context::resolve_kernel(&backend, name)?;
        trace!("Calling {name} on the {} backend", backend.kind);
        kernel(&inv)
    })
}

/// Wrap the backend call in the layers `spec` opts into. Layers are applied in
/// their fixed order whatever order `spec` lists them in.
pub fn compose(spec: FunctionSpec) -> Call {
    let spec = Arc::new(spec);
    let mut layers = spec.layers.clone();
    layers.sort();
    layers.dedup();
    layers
        .iter()
        .rev()
        .fold(backend_call(spec.name), |next, layer| layer.middleware().wrap(spec.clone(), next))
}
