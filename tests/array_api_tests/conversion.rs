use serde_json::json;
use whisper_array::api::{self, CallOptions};
use whisper_array::array::{Array, InplaceMode};
use whisper_array::backends::BackendKind;
use whisper_array::dtype::DType;
use whisper_array::error::ErrorKind;
use whisper_array::func_wrapper::invocation::Value;
use whisper_array::numeric_scalar::NumericScalar;

use super::{f32_array, stored_dtype, test_eq_exact, test_eq_f32};

pub fn test_matmul_2_3(_backend: BackendKind) {
    let a = f32_array(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
    let b = f32_array(vec![7.0, 8.0, 9.0, 10.0, 11.0, 12.0], &[3, 2]);
    let c = a.matmul(&b).unwrap();
    test_eq_f32(&c, &[2, 2], &[58.0, 64.0, 139.0, 154.0]);

    let err = api::matmul(&a, &a, CallOptions::new()).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::ShapeMismatchError | ErrorKind::ValueError));
}

pub fn test_matmul_vector(_backend: BackendKind) {
    let m = f32_array(vec![1.0, 2.0, 3.0, 4.0], &[2, 2]);
    let v = f32_array(vec![1.0, 1.0], &[2]);
    test_eq_f32(&api::matmul(&m, &v, CallOptions::new()).unwrap(), &[2], &[3.0, 7.0]);
    test_eq_f32(&api::matmul(&v, &m, CallOptions::new()).unwrap(), &[2], &[4.0, 6.0]);
    test_eq_f32(&api::matmul(&v, &v, CallOptions::new()).unwrap(), &[], &[2.0]);
}

pub fn test_matmul_batched(_backend: BackendKind) {
    let a = f32_array((0..8).map(|v| v as f32).collect(), &[2, 2, 2]);
    let identity = api::eye(2, None, 0, CallOptions::new()).unwrap();
    let c = api::matmul(&a, &identity, CallOptions::new()).unwrap();
    test_eq_f32(&c, &[2, 2, 2], &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
}

pub fn test_native_round_trip(backend: BackendKind) {
    let x = f32_array(vec![1.0, 2.0], &[2]);
    let native = api::to_native(&x);
    assert_eq!(native.backend_kind(), backend);
    assert!(api::is_native_array_of(&Value::Native(native.clone()), backend));
    let back = api::from_native(native);
    assert!(api::array_equal(&x, &back).unwrap());
    assert_eq!(back.to_vec::<f32>().unwrap(), vec![1.0, 2.0]);
}

pub fn test_to_scalar(_backend: BackendKind) {
    let x = api::full(&[1, 1], 4.0f64, CallOptions::new()).unwrap();
    assert_eq!(x.to_scalar().unwrap(), NumericScalar::F32(4.0));

    let y = f32_array(vec![1.0, 2.0], &[2]);
    assert_eq!(y.to_scalar().unwrap_err().kind(), ErrorKind::ValueError);
}

pub fn test_to_list(_backend: BackendKind) {
    let x = api::asarray(
        Value::List(vec![Value::from_vec(vec![1i64, 2]), Value::from_vec(vec![3i64, 4])]),
        CallOptions::new(),
    )
    .unwrap();
    assert_eq!(x.to_list().unwrap(), json!([[1, 2], [3, 4]]));
}

pub fn test_reshape_and_astype(backend: BackendKind) {
    let x = f32_array(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
    let y = x.reshape(&[3, 2]).unwrap();
    test_eq_f32(&y, &[3, 2], &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    let err = x.reshape(&[4]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ShapeMismatchError);

    let z = x.astype(DType::I32).unwrap();
    assert_eq!(z.dtype(), stored_dtype(backend, DType::I32));
    test_eq_exact(&z, &[2, 3], &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
}

pub fn test_copy_array_is_independent(_backend: BackendKind) {
    let x = f32_array(vec![1.0, 2.0], &[2]);
    let mut copy = api::copy_array(&x, CallOptions::new()).unwrap();
    let ones = api::ones(&[2], CallOptions::new()).unwrap();
    copy.inplace_update(&ones, InplaceMode::BestEffort).unwrap();
    test_eq_f32(&copy, &[2], &[1.0, 1.0]);
    test_eq_f32(&x, &[2], &[1.0, 2.0]);
}

pub fn test_is_native_array(_backend: BackendKind) {
    let x = f32_array(vec![1.0], &[1]);
    assert!(!api::is_native_array(&x).unwrap());
    assert!(api::is_native_array(x.to_native()).unwrap());
    assert!(!api::is_native_array(Value::Int(3)).unwrap());
}

pub fn test_array_equal(_backend: BackendKind) {
    let a = f32_array(vec![1.0, 2.0], &[2]);
    let b = f32_array(vec![1.0, 2.0], &[1, 2]);
    let c = f32_array(vec![1.0, 3.0], &[2]);
    assert!(api::array_equal(&a, &a).unwrap());
    assert!(!api::array_equal(&a, &b).unwrap());
    assert!(!api::array_equal(&a, &c).unwrap());
}

pub fn test_inplace_increment(_backend: BackendKind) {
    let mut x: Array = f32_array(vec![1.0, 2.0], &[2]);
    let step = f32_array(vec![0.5, 0.5], &[2]);
    x.inplace_increment(&step, InplaceMode::BestEffort).unwrap();
    test_eq_f32(&x, &[2], &[1.5, 2.5]);
    x.inplace_decrement(&step, InplaceMode::BestEffort).unwrap();
    test_eq_f32(&x, &[2], &[1.0, 2.0]);
}

pub fn test_wide_int64_values_stay_exact(_backend: BackendKind) {
    let big = (1i64 << 53) + 1;
    let int64 = || CallOptions::new().dtype(DType::I64);

    let x = api::asarray(Value::from_vec(vec![big, -big, i64::MAX]), int64()).unwrap();
    assert_eq!(x.to_vec::<i64>().unwrap(), vec![big, -big, i64::MAX]);

    let filled = api::full(&[2], big, int64()).unwrap();
    assert_eq!(filled.to_vec::<i64>().unwrap(), vec![big, big]);

    let recast = x.astype(DType::I64).unwrap();
    assert_eq!(recast.to_vec::<i64>().unwrap(), vec![big, -big, i64::MAX]);
}

pub fn test_array_equal_distinguishes_wide_ints(_backend: BackendKind) {
    let int64 = || CallOptions::new().dtype(DType::I64);
    let a = api::asarray(Value::from_vec(vec![(1i64 << 53) + 1]), int64()).unwrap();
    let b = api::asarray(Value::from_vec(vec![1i64 << 53]), int64()).unwrap();
    assert!(!api::array_equal(&a, &b).unwrap());
    assert!(api::array_equal(&a, &a).unwrap());
}
