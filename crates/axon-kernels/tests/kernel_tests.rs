//! End-to-end kernel tests against the reference executor.
//! Run with: cargo test -p axon-kernels

use axon_core::{AxonError, DType, Scalar, Tensor};
use axon_kernels::{
    concat, concat_grad, elementwise_div, elementwise_div_grad, fill_constant, full, full_like,
};
use axon_runtime::NpuContext;

fn assert_close(a: &[f32], b: &[f32], tol: f32) {
    assert_eq!(a.len(), b.len(), "length mismatch: {} vs {}", a.len(), b.len());
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        assert!(
            (x - y).abs() < tol,
            "element {} differs: {} vs {} (tol={})",
            i, x, y, tol
        );
    }
}

// ============================================================================
// Concat forward / gradient
// ============================================================================

#[test]
fn test_concat_then_grad_recovers_inputs() {
    let ctx = NpuContext::new();
    let a = Tensor::from_f32(&[1.0, 2.0, 3.0, 4.0], &[2, 2]);
    let b = Tensor::from_f32(&[5.0, 6.0], &[2, 1]);
    let c = Tensor::from_f32(&[7.0, 8.0, 9.0, 10.0, 11.0, 12.0], &[2, 3]);
    let inputs = [a.clone(), b.clone(), c.clone()];

    let out = concat(&ctx, &inputs, 1).unwrap();
    assert_eq!(out.dims(), &[2, 6]);

    // Slicing the forward result with the gradient plan must hand back
    // exactly the original inputs.
    let grads = concat_grad(&ctx, &inputs, &out, 1, &[true, true, true]).unwrap();
    for (g, x) in grads.iter().zip([&a, &b, &c]) {
        let g = g.as_ref().unwrap();
        assert_eq!(g.dims(), x.dims());
        assert_eq!(g.as_f32_slice().unwrap(), x.as_f32_slice().unwrap());
    }
}

#[test]
fn test_concat_i64_axis0() {
    let ctx = NpuContext::new();
    let a = Tensor::from_i64(&[1, 2], &[2]);
    let b = Tensor::from_i64(&[3], &[1]);
    let out = concat(&ctx, &[a, b], 0).unwrap();
    assert_eq!(out.as_i64_slice().unwrap(), &[1, 2, 3]);
}

#[test]
fn test_concat_grad_skips_empty_input() {
    let ctx = NpuContext::new();
    let a = Tensor::from_f32(&[1.0, 2.0], &[2, 1]);
    let empty = Tensor::zeros(&[0, 1], DType::F32);
    let b = Tensor::from_f32(&[3.0], &[1, 1]);
    let inputs = [a, empty, b];

    let dout = Tensor::from_f32(&[10.0, 20.0, 30.0], &[3, 1]);
    let grads = concat_grad(&ctx, &inputs, &dout, 0, &[true, true, true]).unwrap();

    assert_eq!(grads[0].as_ref().unwrap().as_f32_slice().unwrap(), &[10.0, 20.0]);
    // The empty input still gets its (empty) gradient, with no device work,
    // and the offset it does not occupy goes to the next input.
    assert_eq!(grads[1].as_ref().unwrap().numel(), 0);
    assert_eq!(grads[2].as_ref().unwrap().as_f32_slice().unwrap(), &[30.0]);
}

#[test]
fn test_concat_all_empty_is_silent() {
    let ctx = NpuContext::new();
    let a = Tensor::zeros(&[0, 4], DType::I32);
    let b = Tensor::zeros(&[0, 4], DType::I32);
    let out = concat(&ctx, &[a, b], 0).unwrap();
    assert_eq!(out.dims(), &[0, 4]);
    assert_eq!(out.numel(), 0);
    assert!(ctx.stream().issued_ops().is_empty());
}

#[test]
fn test_concat_bad_axis() {
    let ctx = NpuContext::new();
    let a = Tensor::from_f32(&[1.0], &[1, 1]);
    let err = concat(&ctx, &[a], 2).unwrap_err();
    assert!(matches!(err, AxonError::InvalidArgument(_)));
    assert!(err.to_string().contains("[-2, 2)"));
}

// ============================================================================
// Elementwise division gradients
// ============================================================================

#[test]
fn test_div_grad_dx_equals_dout_over_y() {
    let ctx = NpuContext::new();
    let x = Tensor::from_f32(&[3.0, 8.0, 5.0], &[3]);
    let y = Tensor::from_f32(&[2.0, 4.0, 10.0], &[3]);
    let out = elementwise_div(&ctx, &x, &y).unwrap();
    let dout = Tensor::from_f32(&[1.0, 2.0, 4.0], &[3]);

    let (dx, dy) = elementwise_div_grad(&ctx, &x, &y, &out, &dout, true, true).unwrap();
    assert_close(dx.unwrap().as_f32_slice().unwrap(), &[0.5, 0.5, 0.4], 1e-6);
    // dy = -x/y^2 * dout
    assert_close(dy.unwrap().as_f32_slice().unwrap(), &[-0.75, -1.0, -0.2], 1e-6);
}

#[test]
fn test_div_grad_masks_zero_numerator_positions() {
    let ctx = NpuContext::new();
    let x = Tensor::from_f32(&[0.0, 2.0, 0.0, 6.0], &[4]);
    let y = Tensor::from_f32(&[1.0, 2.0, 3.0, 4.0], &[4]);
    let out = elementwise_div(&ctx, &x, &y).unwrap();
    let dout = Tensor::from_f32(&[1.0, 1.0, 1.0, 1.0], &[4]);

    let (dx, _) = elementwise_div_grad(&ctx, &x, &y, &out, &dout, true, false).unwrap();
    assert_close(dx.unwrap().as_f32_slice().unwrap(), &[0.0, 0.5, 0.0, 0.25], 1e-6);
}

#[test]
fn test_div_grad_primitive_sequence() {
    let ctx = NpuContext::new();
    let x = Tensor::from_f32(&[1.0], &[1]);
    let y = Tensor::from_f32(&[2.0], &[1]);
    let out = elementwise_div(&ctx, &x, &y).unwrap();
    let dout = Tensor::from_f32(&[1.0], &[1]);
    ctx.stream().clear_log();

    elementwise_div_grad(&ctx, &x, &y, &out, &dout, true, true).unwrap();
    assert_eq!(
        ctx.stream().issued_ops(),
        vec![
            "Div", "ZerosLike", "Equal", "LogicalNot", "Cast", "Mul", "Mul", // dx
            "Neg", "Div", "Mul", // dy
        ]
    );
}

// ============================================================================
// Constant fills
// ============================================================================

#[test]
fn test_fill_constant_variants_agree_bitwise() {
    // The same request must produce identical bytes whichever primitive the
    // driver version selects.
    let old = NpuContext::with_version(502_000);
    let windowed = NpuContext::with_version(503_003);
    let a = fill_constant(&old, &[2, 3], Scalar::from(0.125), DType::F64).unwrap();
    let b = fill_constant(&windowed, &[2, 3], Scalar::from(0.125), DType::F64).unwrap();
    assert_eq!(a.as_bytes(), b.as_bytes());

    assert_eq!(old.stream().issued_ops(), vec!["Fill"]);
    assert_eq!(windowed.stream().issued_ops(), vec!["FillD"]);
}

#[test]
fn test_fill_constant_idempotent() {
    let ctx = NpuContext::new();
    let a = fill_constant(&ctx, &[4], Scalar::from(-7i32), DType::I32).unwrap();
    let b = fill_constant(&ctx, &[4], Scalar::from(-7i32), DType::I32).unwrap();
    assert_eq!(a.as_bytes(), b.as_bytes());
    assert_eq!(a.as_i32_slice().unwrap(), &[-7, -7, -7, -7]);
}

#[test]
fn test_bool_fill_true_and_false() {
    let ctx = NpuContext::new();
    let t = full(&ctx, &[2], Scalar::from(true), DType::Bool).unwrap();
    assert_eq!(t.dtype(), DType::Bool);
    assert_eq!(t.as_u8_slice().unwrap(), &[1, 1]);

    let f = full(&ctx, &[2], Scalar::from(false), DType::Bool).unwrap();
    assert_eq!(f.as_u8_slice().unwrap(), &[0, 0]);
}

#[test]
fn test_full_like_out_of_range_value() {
    let ctx = NpuContext::new();
    let x = Tensor::zeros(&[2], DType::F32);
    let err = full_like(&ctx, &x, Scalar::from(200.0), DType::I8).unwrap_err();
    assert!(matches!(err, AxonError::InvalidArgument(_)));
    // validation fails before any device work
    assert_eq!(ctx.stream().issued_count(), 0);
}

#[test]
fn test_full_like_nan_always_rejected() {
    let ctx = NpuContext::new();
    let x = Tensor::zeros(&[2], DType::F32);
    for dtype in [DType::F16, DType::F32, DType::F64] {
        let err = full_like(&ctx, &x, Scalar::from(f64::NAN), dtype).unwrap_err();
        assert!(matches!(err, AxonError::InvalidArgument(_)));
    }
}

#[test]
fn test_full_like_f16_bounds() {
    let ctx = NpuContext::new();
    let x = Tensor::zeros(&[1], DType::F32);
    assert!(full_like(&ctx, &x, Scalar::from(65504.0), DType::F16).is_ok());
    assert!(full_like(&ctx, &x, Scalar::from(70000.0), DType::F16).is_err());
}

#[test]
fn test_full_like_always_uses_shape_tensor() {
    let ctx = NpuContext::new();
    let x = Tensor::zeros(&[3], DType::F32);
    full_like(&ctx, &x, Scalar::from(1.0), DType::F32).unwrap();
    assert_eq!(ctx.stream().issued_ops(), vec!["Fill"]);
}
