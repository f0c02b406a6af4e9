use whisper_array::api::{self, CallOptions};
use whisper_array::backends::BackendKind;
use whisper_array::dtype::DType;
use whisper_array::error::ErrorKind;
use whisper_array::func_wrapper::invocation::Value;

use super::{f32_array, test_eq_exact, test_eq_f32};

pub fn test_sum_axes(_backend: BackendKind) {
    let x = f32_array(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
    test_eq_f32(&api::sum(&x, None, false, CallOptions::new()).unwrap(), &[], &[21.0]);
    test_eq_f32(&api::sum(&x, Some(&[0]), false, CallOptions::new()).unwrap(), &[3], &[5.0, 7.0, 9.0]);
    test_eq_f32(&api::sum(&x, Some(&[1]), false, CallOptions::new()).unwrap(), &[2], &[6.0, 15.0]);
    test_eq_f32(&x.sum().unwrap(), &[], &[21.0]);
}

pub fn test_sum_keepdims(_backend: BackendKind) {
    let x = f32_array(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
    let y = api::sum(&x, Some(&[1]), true, CallOptions::new()).unwrap();
    test_eq_f32(&y, &[2, 1], &[6.0, 15.0]);
    let z = api::sum(&x, Some(&[0, 1]), true, CallOptions::new()).unwrap();
    test_eq_f32(&z, &[1, 1], &[21.0]);
}

pub fn test_prod_all(_backend: BackendKind) {
    let x = f32_array(vec![1.0, 2.0, 3.0, 4.0], &[2, 2]);
    test_eq_f32(&api::prod(&x, None, false, CallOptions::new()).unwrap(), &[], &[24.0]);
    test_eq_f32(&api::prod(&x, Some(&[1]), false, CallOptions::new()).unwrap(), &[2], &[2.0, 12.0]);
}

pub fn test_mean_of_ints(_backend: BackendKind) {
    let x = api::asarray(Value::from_vec(vec![1i64, 2, 3, 4]), CallOptions::new()).unwrap();
    let m = api::mean(&x, None, false, CallOptions::new()).unwrap();
    assert_eq!(m.dtype(), DType::F32);
    test_eq_f32(&m, &[], &[2.5]);

    let y = f32_array(vec![1.0, 2.0, 3.0, 4.0], &[2, 2]);
    test_eq_f32(&y.mean().unwrap(), &[], &[2.5]);
}

pub fn test_max_min_negative_axis(_backend: BackendKind) {
    let x = f32_array(vec![3.0, -1.0, 7.0, 2.0, 8.0, -5.0], &[2, 3]);
    test_eq_f32(&api::max(&x, Some(&[-1]), false, CallOptions::new()).unwrap(), &[2], &[7.0, 8.0]);
    test_eq_f32(&api::min(&x, Some(&[-1]), false, CallOptions::new()).unwrap(), &[2], &[-1.0, -5.0]);
    test_eq_f32(&api::max(&x, None, false, CallOptions::new()).unwrap(), &[], &[8.0]);
    test_eq_f32(&api::min(&x, Some(&[0]), true, CallOptions::new()).unwrap(), &[1, 3], &[2.0, -1.0, -5.0]);

    let ints = api::asarray(Value::from_vec(vec![4i64, 9, 2]), CallOptions::new()).unwrap();
    test_eq_exact(&api::max(&ints, None, false, CallOptions::new()).unwrap(), &[], &[9.0]);
}

pub fn test_axis_out_of_range(_backend: BackendKind) {
    let x = f32_array(vec![1.0, 2.0], &[2]);
    let err = api::sum(&x, Some(&[3]), false, CallOptions::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValueError);
}
