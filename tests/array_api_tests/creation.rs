use whisper_array::api::{self, CallOptions};
use whisper_array::backends::BackendKind;
use whisper_array::context;
use whisper_array::device::Device;
use whisper_array::dtype::DType;
use whisper_array::error::ErrorKind;
use whisper_array::func_wrapper::invocation::Value;

use super::{f32_array, stored_dtype, test_eq_exact, test_eq_f32};

pub fn test_zeros_default_dtype_and_device(backend: BackendKind) {
    let x = api::zeros(&[2, 3], CallOptions::new()).unwrap();
    assert_eq!(x.shape(), vec![2, 3]);
    assert_eq!(x.dtype(), DType::F32);
    assert_eq!(x.device(), Device::Cpu);
    assert_eq!(x.backend_kind(), backend);
    test_eq_f32(&x, &[2, 3], &[0.0; 6]);
}

pub fn test_ones_explicit_dtype(backend: BackendKind) {
    let x = api::ones(&[3], CallOptions::new().dtype(DType::F64)).unwrap();
    assert_eq!(x.dtype(), DType::F64);
    test_eq_exact(&x, &[3], &[1.0, 1.0, 1.0]);

    let y = api::empty(&[2, 2], CallOptions::new().dtype(DType::I64)).unwrap();
    assert_eq!(y.dtype(), stored_dtype(backend, DType::I64));
    assert_eq!(y.shape(), vec![2, 2]);
}

pub fn test_full_int_literal(backend: BackendKind) {
    let x = api::full(&[2], 7i64, CallOptions::new()).unwrap();
    assert_eq!(x.dtype(), stored_dtype(backend, context::default_int_dtype()));
    test_eq_exact(&x, &[2], &[7.0, 7.0]);

    let b = api::full(&[1], true, CallOptions::new()).unwrap();
    assert_eq!(b.dtype(), stored_dtype(backend, DType::BOOL));
}

pub fn test_full_float_literal(_backend: BackendKind) {
    let x = api::full(&[2, 2], 0.5f64, CallOptions::new()).unwrap();
    test_eq_f32(&x, &[2, 2], &[0.5; 4]);
}

pub fn test_full_rejects_incompatible_fill(_backend: BackendKind) {
    let err = api::full(&[2], 1.5f64, CallOptions::new().dtype(DType::I32)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValueError);
}

pub fn test_arange_int(backend: BackendKind) {
    let x = api::arange(0i64, 5i64, 1i64, CallOptions::new()).unwrap();
    assert_eq!(x.dtype(), stored_dtype(backend, DType::I32));
    test_eq_exact(&x, &[5], &[0.0, 1.0, 2.0, 3.0, 4.0]);

    let empty = api::arange(3i64, 0i64, 1i64, CallOptions::new()).unwrap();
    assert_eq!(empty.shape(), vec![0]);

    let err = api::arange(0i64, 3i64, 0i64, CallOptions::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValueError);
}

pub fn test_arange_float_step(_backend: BackendKind) {
    let x = api::arange(0i64, 1i64, 0.25f64, CallOptions::new()).unwrap();
    test_eq_f32(&x, &[4], &[0.0, 0.25, 0.5, 0.75]);
}

pub fn test_linspace_endpoint(_backend: BackendKind) {
    let x = api::linspace(0.0, 1.0, 5, true, CallOptions::new()).unwrap();
    test_eq_f32(&x, &[5], &[0.0, 0.25, 0.5, 0.75, 1.0]);

    let y = api::linspace(0.0, 1.0, 4, false, CallOptions::new()).unwrap();
    test_eq_f32(&y, &[4], &[0.0, 0.25, 0.5, 0.75]);
}

pub fn test_eye_offset(_backend: BackendKind) {
    let x = api::eye(2, Some(3), 1, CallOptions::new()).unwrap();
    test_eq_f32(&x, &[2, 3], &[0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);

    let square = api::eye(2, None, 0, CallOptions::new()).unwrap();
    test_eq_f32(&square, &[2, 2], &[1.0, 0.0, 0.0, 1.0]);
}

pub fn test_asarray_nested_literals(backend: BackendKind) {
    let data = Value::List(vec![Value::from_vec(vec![1i64, 2, 3]), Value::from_vec(vec![4i64, 5, 6])]);
    let x = api::asarray(data, CallOptions::new()).unwrap();
    assert_eq!(x.dtype(), stored_dtype(backend, DType::I32));
    test_eq_exact(&x, &[2, 3], &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);

    let mixed = Value::List(vec![Value::Int(1), Value::Scalar(2.5f64.into())]);
    let y = api::asarray(mixed, CallOptions::new()).unwrap();
    test_eq_f32(&y, &[2], &[1.0, 2.5]);
}

pub fn test_asarray_ragged_fails(_backend: BackendKind) {
    let data = Value::List(vec![Value::from_vec(vec![1i64, 2]), Value::from_vec(vec![3i64])]);
    let err = api::asarray(data, CallOptions::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ShapeMismatchError);
}

pub fn test_like_functions_follow_input(backend: BackendKind) {
    let x = api::asarray(Value::from_vec(vec![1i64, 2, 3]), CallOptions::new()).unwrap();
    let zeros = api::zeros_like(&x, CallOptions::new()).unwrap();
    assert_eq!(zeros.dtype(), x.dtype());
    test_eq_exact(&zeros, &[3], &[0.0; 3]);

    let ones = api::ones_like(&x, CallOptions::new().dtype(DType::F32)).unwrap();
    test_eq_f32(&ones, &[3], &[1.0; 3]);

    let full = api::full_like(&x, 9i64, CallOptions::new()).unwrap();
    assert_eq!(full.dtype(), stored_dtype(backend, DType::I32));
    test_eq_exact(&full, &[3], &[9.0; 3]);
}

pub fn test_tril_triu(_backend: BackendKind) {
    let x = f32_array((1..=9).map(|v| v as f32).collect(), &[3, 3]);
    let lower = api::tril(&x, 0, CallOptions::new()).unwrap();
    test_eq_f32(&lower, &[3, 3], &[1.0, 0.0, 0.0, 4.0, 5.0, 0.0, 7.0, 8.0, 9.0]);
    let upper = api::triu(&x, 1, CallOptions::new()).unwrap();
    test_eq_f32(&upper, &[3, 3], &[0.0, 2.0, 3.0, 0.0, 0.0, 6.0, 0.0, 0.0, 0.0]);

    let vector = f32_array(vec![1.0, 2.0], &[2]);
    let err = api::tril(&vector, 0, CallOptions::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValueError);
}

pub fn test_creation_on_unsupported_device(_backend: BackendKind) {
    let err = api::zeros(&[2], CallOptions::new().device(Device::Gpu(0))).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedDeviceError);
}

pub fn test_literal_dtype_is_idempotent(_backend: BackendKind) {
    let first = api::full(&[2], 3i64, CallOptions::new()).unwrap();
    let second = api::full(&[2], 3i64, CallOptions::new().dtype(first.dtype())).unwrap();
    assert_eq!(first.dtype(), second.dtype());
    assert!(api::array_equal(&first, &second).unwrap());
}
