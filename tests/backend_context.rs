use whisper_array::api::{self, CallOptions};
use whisper_array::backends::BackendKind;
use whisper_array::context;
use whisper_array::device::Device;
use whisper_array::dtype::DType;
use whisper_array::error::{ArrayError, ErrorKind};
use whisper_array::func_wrapper::registry;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn push_pop_is_lifo() {
    init_logging();
    let default = context::current_backend_kind().unwrap();
    context::set_backend("ndarray").unwrap();
    assert_eq!(context::backend_stack_depth(), 2);
    context::set_backend("NDArray").unwrap();
    assert_eq!(context::backend_stack_depth(), 3);
    assert_eq!(context::unset_backend().unwrap(), BackendKind::NDArray);
    assert_eq!(context::unset_backend().unwrap(), BackendKind::NDArray);
    assert_eq!(context::backend_stack_depth(), 1);
    assert_eq!(context::current_backend_kind().unwrap(), default);
}

#[test]
fn pop_below_default_underflows() {
    init_logging();
    let err = context::unset_backend().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StackUnderflowError);
    assert_eq!(context::backend_stack_depth(), 1);
    assert!(context::current_backend(None).is_ok());

    assert_eq!(context::unset_default_device().unwrap_err().kind(), ErrorKind::StackUnderflowError);
    assert_eq!(context::unset_default_float_dtype().unwrap_err().kind(), ErrorKind::StackUnderflowError);
}

#[test]
fn unknown_backend_is_rejected_without_pushing() {
    init_logging();
    let err = context::set_backend("tensorflow").unwrap_err();
    assert!(matches!(err, ArrayError::UnknownBackend(ref name) if name == "tensorflow"));
    assert_eq!(context::backend_stack_depth(), 1);
}

#[cfg(not(feature = "candle"))]
#[test]
fn backend_without_its_feature_fails_to_import() {
    init_logging();
    let err = context::set_backend("candle").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BackendImportError);
    assert_eq!(context::backend_stack_depth(), 1);
}

#[test]
fn scoped_backend_is_restored() {
    init_logging();
    {
        let _guard = context::use_backend("ndarray").unwrap();
        assert_eq!(context::backend_stack_depth(), 2);
    }
    assert_eq!(context::backend_stack_depth(), 1);

    let name = context::with_backend("ndarray", || context::current_backend_name().unwrap()).unwrap();
    assert_eq!(name, "ndarray");
    assert_eq!(context::backend_stack_depth(), 1);
}

#[test]
fn clearing_the_stack_keeps_the_default() {
    init_logging();
    context::set_backend("ndarray").unwrap();
    context::set_backend("ndarray").unwrap();
    context::clear_backend_stack();
    assert_eq!(context::backend_stack_depth(), 1);
}

#[test]
fn stacks_are_thread_local() {
    init_logging();
    let _guard = context::use_backend("ndarray").unwrap();
    let _device = context::use_default_device(Device::Gpu(1));
    let other = std::thread::spawn(|| (context::backend_stack_depth(), context::default_device()))
        .join()
        .unwrap();
    assert_eq!(other, (1, Device::Cpu));
    assert_eq!(context::backend_stack_depth(), 2);
    assert_eq!(context::default_device(), Device::Gpu(1));
}

#[cfg(feature = "candle")]
#[test]
fn nested_scopes_dispatch_to_the_innermost_backend() {
    init_logging();
    let _outer = context::use_backend("ndarray").unwrap();
    {
        let _inner = context::use_backend("candle").unwrap();
        let x = api::zeros(&[2], CallOptions::new()).unwrap();
        assert_eq!(x.backend_kind(), BackendKind::Candle);
    }
    let y = api::zeros(&[2], CallOptions::new()).unwrap();
    assert_eq!(y.backend_kind(), BackendKind::NDArray);
}

#[cfg(feature = "candle")]
#[test]
fn arrays_select_their_own_backend_without_a_push() {
    init_logging();
    let x = context::with_backend("candle", || api::ones(&[3], CallOptions::new()))
        .unwrap()
        .unwrap();
    assert_eq!(context::backend_stack_depth(), 1);
    let y = api::add(&x, &x, CallOptions::new()).unwrap();
    assert_eq!(y.backend_kind(), BackendKind::Candle);

    // an explicit push overrides the arguments' backend
    let _guard = context::use_backend("ndarray").unwrap();
    let z = api::add(&x, &x, CallOptions::new()).unwrap();
    assert_eq!(z.backend_kind(), BackendKind::NDArray);
    assert_eq!(z.to_vec::<f32>().unwrap(), vec![2.0, 2.0, 2.0]);
}

#[test]
fn pushing_clears_the_resolution_cache() {
    init_logging();
    let x = api::ones(&[2], CallOptions::new()).unwrap();
    api::add(&x, &x, CallOptions::new()).unwrap();
    assert!(context::resolution_cache_len() > 0);
    let _guard = context::use_backend("ndarray").unwrap();
    assert_eq!(context::resolution_cache_len(), 0);
    api::add(&x, &x, CallOptions::new()).unwrap();
    assert_eq!(context::resolution_cache_len(), 1);
}

#[test]
fn default_dtype_stacks() {
    init_logging();
    assert_eq!(context::default_float_dtype(), DType::F32);
    {
        let _guard = context::use_default_float_dtype(DType::F64).unwrap();
        let x = api::zeros(&[1], CallOptions::new()).unwrap();
        assert_eq!(x.dtype(), DType::F64);
    }
    assert_eq!(context::default_float_dtype(), DType::F32);

    let err = context::set_default_float_dtype(DType::I64).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValueError);
    let err = context::set_default_int_dtype(DType::F16).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValueError);

    let _guard = context::use_default_int_dtype(DType::I64).unwrap();
    let y = api::full(&[1], 3i64, CallOptions::new()).unwrap();
    assert_eq!(y.dtype(), DType::I64);
}

#[test]
fn default_device_feeds_creation() {
    init_logging();
    let guard = context::use_default_device(Device::Gpu(0));
    let err = api::zeros(&[1], CallOptions::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedDeviceError);
    drop(guard);
    assert!(api::zeros(&[1], CallOptions::new()).is_ok());
}

#[test]
fn registry_rejects_unknown_functions() {
    init_logging();
    let inv = whisper_array::func_wrapper::invocation::Invocation::new(vec![]);
    let err = registry::call("frobnicate", inv).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValueError);
}
