//! Per-thread dispatch state: the backend stack, the default device and dtype
//! stacks, and the kernel resolution cache.
//!
//! Every thread starts from the process [`Config`](crate::config::Config) the
//! first time it touches any of these, so a backend selected on one thread is
//! never observed by another.

use std::cell::RefCell;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use log::{debug, trace};

use crate::backends::{BackendDescriptor, BackendKind, Kernel};
use crate::checks;
use crate::config::{self, Config};
use crate::device::Device;
use crate::dtype::DType;
use crate::error::ArrayError;
use crate::native_array::NativeArray;

struct ContextState {
    /// Index 0 is the configured default and is never popped.
    backends: Vec<BackendKind>,
    devices: Vec<Device>,
    float_dtypes: Vec<DType>,
    int_dtypes: Vec<DType>,
    resolved: HashMap<(BackendKind, String), Kernel>,
}

impl ContextState {
    fn from_config(config: &Config) -> Self {
        Self {
            backends: vec![config.backend],
            devices: vec![config.device],
            float_dtypes: vec![config.float_dtype],
            int_dtypes: vec![config.int_dtype],
            resolved: HashMap::new(),
        }
    }
}

thread_local! {
    static CONTEXT: RefCell<ContextState> = RefCell::new(ContextState::from_config(config::get()));
}

fn with_state<R>(f: impl FnOnce(&mut ContextState) -> R) -> R {
    CONTEXT.with(|state| f(&mut state.borrow_mut()))
}

/// Pop one entry, refusing to pop the default at the bottom.
fn pop_stack<T: Copy>(stack: &mut Vec<T>, name: &'static str) -> Result<T, ArrayError> {
    if stack.len() <= 1 {
        return Err(ArrayError::StackUnderflow(name));
    }
    stack.pop().ok_or(ArrayError::StackUnderflow(name))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stack {
    Backend,
    Device,
    FloatDType,
    IntDType,
}

/// Scoped entry on one of the context stacks, popped when dropped.
///
/// Guards pop the stack of the thread that created them and therefore cannot
/// be sent to another thread.
#[must_use = "the entry is popped as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ContextGuard {
    stack: Stack,
    _not_send: PhantomData<*const ()>,
}

impl ContextGuard {
    fn new(stack: Stack) -> Self {
        Self {
            stack,
            _not_send: PhantomData,
        }
    }
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        let popped = match self.stack {
            Stack::Backend => unset_backend().map(|_| ()),
            Stack::Device => unset_default_device().map(|_| ()),
            Stack::FloatDType => unset_default_float_dtype().map(|_| ()),
            Stack::IntDType => unset_default_int_dtype().map(|_| ()),
        };
        if let Err(err) = popped {
            debug!("Scoped {:?} entry was already popped: {err}", self.stack);
        }
    }
}

/// Push a backend by name, making it current for this thread.
pub fn set_backend(name: &str) -> Result<(), ArrayError> {
    set_backend_kind(BackendKind::from_name(name)?)
}

pub fn set_backend_kind(kind: BackendKind) -> Result<(), ArrayError> {
    // loading surfaces a missing native library before anything is pushed
    kind.descriptor()?;
    with_state(|state| {
        state.backends.push(kind);
        state.resolved.clear();
        debug!("Pushed backend {kind} (stack depth {})", state.backends.len());
    });
    Ok(())
}

/// Pop the most recently pushed backend and return it.
pub fn unset_backend() -> Result<BackendKind, ArrayError> {
    with_state(|state| {
        let kind = pop_stack(&mut state.backends, "backend")?;
        state.resolved.clear();
        debug!("Popped backend {kind} (stack depth {})", state.backends.len());
        Ok(kind)
    })
}

pub fn use_backend(name: &str) -> Result<ContextGuard, ArrayError> {
    set_backend(name)?;
    Ok(ContextGuard::new(Stack::Backend))
}

pub fn use_backend_kind(kind: BackendKind) -> Result<ContextGuard, ArrayError> {
    set_backend_kind(kind)?;
    Ok(ContextGuard::new(Stack::Backend))
}

/// Run `f` with `name` as the current backend.
pub fn with_backend<R>(name: &str, f: impl FnOnce() -> R) -> Result<R, ArrayError> {
    let _guard = use_backend(name)?;
    Ok(f())
}

/// Drop every explicitly pushed backend, leaving only the default.
pub fn clear_backend_stack() {
    with_state(|state| {
        state.backends.truncate(1);
        state.resolved.clear();
    });
}

pub fn backend_stack_depth() -> usize {
    with_state(|state| state.backends.len())
}

/// The backend a call should dispatch to.
///
/// An explicitly pushed backend always wins; otherwise the backend owning
/// `hint` is used, and failing that the configured default.
pub fn current_backend(hint: Option<&NativeArray>) -> Result<Arc<BackendDescriptor>, ArrayError> {
    let (kind, explicit) = with_state(|state| {
        let explicit = state.backends.len() > 1;
        let top = state.backends.last().copied().unwrap_or(BackendKind::NDArray);
        (top, explicit)
    });
    if explicit {
        return kind.descriptor();
    }
    if let Some(native) = hint {
        return native.backend_kind().descriptor();
    }
    kind.descriptor().map_err(|err| {
        ArrayError::NoBackendAvailable(format!("the default backend {kind} could not be loaded: {err}"))
    })
}

pub fn current_backend_kind() -> Result<BackendKind, ArrayError> {
    Ok(current_backend(None)?.kind)
}

pub fn current_backend_name() -> Result<&'static str, ArrayError> {
    Ok(current_backend(None)?.name())
}

/// Look up `function` on `backend`, consulting this thread's cache first.
pub fn resolve_kernel(backend: &BackendDescriptor, function: &str) -> Result<Kernel, ArrayError> {
    let key = (backend.kind, function.to_string());
    if let Some(kernel) = with_state(|state| state.resolved.get(&key).copied()) {
        trace!("Resolved {function} on {} from cache", backend.kind);
        return Ok(kernel);
    }
    let kernel = backend.kernel(function).ok_or_else(|| ArrayError::UnimplementedFunction {
        function: function.to_string(),
        backend: backend.name().to_string(),
    })?;
    trace!("Resolved {function} on {}", backend.kind);
    with_state(|state| state.resolved.insert(key, kernel));
    Ok(kernel)
}

pub fn resolution_cache_len() -> usize {
    with_state(|state| state.resolved.len())
}

pub fn default_device() -> Device {
    with_state(|state| state.devices.last().copied().unwrap_or_default())
}

pub fn set_default_device(device: Device) {
    with_state(|state| state.devices.push(device));
    debug!("Default device is now {device}");
}

pub fn unset_default_device() -> Result<Device, ArrayError> {
    with_state(|state| pop_stack(&mut state.devices, "device"))
}

pub fn use_default_device(device: Device) -> ContextGuard {
    set_default_device(device);
    ContextGuard::new(Stack::Device)
}

pub fn default_float_dtype() -> DType {
    with_state(|state| state.float_dtypes.last().copied().unwrap_or(DType::F32))
}

pub fn set_default_float_dtype(dtype: DType) -> Result<(), ArrayError> {
    checks::check_true(dtype.is_float(), &format!("{dtype} is not a float dtype"))?;
    with_state(|state| state.float_dtypes.push(dtype));
    debug!("Default float dtype is now {dtype}");
    Ok(())
}

pub fn unset_default_float_dtype() -> Result<DType, ArrayError> {
    with_state(|state| pop_stack(&mut state.float_dtypes, "float dtype"))
}

pub fn use_default_float_dtype(dtype: DType) -> Result<ContextGuard, ArrayError> {
    set_default_float_dtype(dtype)?;
    Ok(ContextGuard::new(Stack::FloatDType))
}

pub fn default_int_dtype() -> DType {
    with_state(|state| state.int_dtypes.last().copied().unwrap_or(DType::I32))
}

pub fn set_default_int_dtype(dtype: DType) -> Result<(), ArrayError> {
    checks::check_true(dtype.is_int() || dtype.is_uint(), &format!("{dtype} is not an integer dtype"))?;
    with_state(|state| state.int_dtypes.push(dtype));
    debug!("Default int dtype is now {dtype}");
    Ok(())
}

pub fn unset_default_int_dtype() -> Result<DType, ArrayError> {
    with_state(|state| pop_stack(&mut state.int_dtypes, "int dtype"))
}

pub fn use_default_int_dtype(dtype: DType) -> Result<ContextGuard, ArrayError> {
    set_default_int_dtype(dtype)?;
    Ok(ContextGuard::new(Stack::IntDType))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guards_restore_previous_backend() {
        let before = current_backend_name().unwrap();
        {
            let _outer = use_backend("ndarray").unwrap();
            assert_eq!(backend_stack_depth(), 2);
        }
        assert_eq!(backend_stack_depth(), 1);
        assert_eq!(current_backend_name().unwrap(), before);
    }

    #[test]
    fn default_entries_cannot_be_popped() {
        assert!(matches!(unset_backend(), Err(ArrayError::StackUnderflow("backend"))));
        assert!(matches!(unset_default_device(), Err(ArrayError::StackUnderflow("device"))));
    }

    #[test]
    fn dtype_stacks_validate_kind() {
        assert!(set_default_float_dtype(DType::I64).is_err());
        let guard = use_default_float_dtype(DType::F64).unwrap();
        assert_eq!(default_float_dtype(), DType::F64);
        drop(guard);
        assert_eq!(default_float_dtype(), config::get().float_dtype);
    }
}
