//! Elementwise division and its gradients.
//!
//! The forward pass is a single `Div`. The gradients are decomposed into
//! device primitives:
//!
//! - `dx = dout * (x != 0) * (1 / y)`
//! - `dy = dout * (-out / y)`
//!
//! using the forward output `out = x / y` so `dy` costs no extra division
//! chain.

use axon_core::{AxonError, DType, Result, Scalar, Tensor};
use axon_runtime::{NpuContext, OpCommand};

fn check_float_operands(op: &str, tensors: &[&Tensor]) -> Result<()> {
    let first = tensors[0];
    if !first.dtype().is_float() {
        return Err(AxonError::UnsupportedDType(first.dtype()));
    }
    for t in &tensors[1..] {
        if t.dtype() != first.dtype() {
            return Err(AxonError::DTypeMismatch {
                expected: first.dtype(),
                got: t.dtype(),
            });
        }
        if t.dims() != first.dims() {
            return Err(AxonError::ShapeMismatch {
                expected: first.dims().to_vec(),
                got: t.dims().to_vec(),
            });
        }
    }
    log::trace!("{op}: {} operand(s) of {} {:?}", tensors.len(), first.dtype(), first.dims());
    Ok(())
}

/// `out = x / y`, elementwise.
pub fn elementwise_div(ctx: &NpuContext, x: &Tensor, y: &Tensor) -> Result<Tensor> {
    check_float_operands("elementwise_div", &[x, y])?;
    let mut out = ctx.alloc_like(x);
    OpCommand::new("Div")
        .input(x)
        .input(y)
        .output(&mut out)
        .run(ctx)?;
    Ok(out)
}

/// Gradients of [`elementwise_div`].
///
/// `out` is the forward result and `dout` the upstream gradient; both must
/// match the operand shape and dtype. Returns `(dx, dy)`, each present only
/// when the corresponding `want_*` flag is set.
pub fn elementwise_div_grad(
    ctx: &NpuContext,
    x: &Tensor,
    y: &Tensor,
    out: &Tensor,
    dout: &Tensor,
    want_dx: bool,
    want_dy: bool,
) -> Result<(Option<Tensor>, Option<Tensor>)> {
    check_float_operands("elementwise_div_grad", &[x, y, out, dout])?;

    let mut dx = None;
    if want_dx {
        let mut one = ctx.alloc(&[1], y.dtype());
        ctx.fill_with_scalar(&mut one, Scalar::from(1.0))?;

        // 1/y via `Div` rather than `Power`: `Power` raises the device
        // float_status overflow flag on this input pattern.
        let mut y_recip = ctx.alloc_like(y);
        OpCommand::new("Div")
            .input(&one)
            .input(y)
            .output(&mut y_recip)
            .run(ctx)?;

        // Mask out positions where x itself is zero.
        let mut zeros = ctx.alloc_like(x);
        OpCommand::new("ZerosLike")
            .input(x)
            .output(&mut zeros)
            .run(ctx)?;

        let mut x_zero = ctx.alloc(x.dims(), DType::Bool);
        OpCommand::new("Equal")
            .input(x)
            .input(&zeros)
            .output(&mut x_zero)
            .run(ctx)?;

        let mut x_nonzero = ctx.alloc(x.dims(), DType::Bool);
        OpCommand::new("LogicalNot")
            .input(&x_zero)
            .output(&mut x_nonzero)
            .run(ctx)?;

        let mut mask = ctx.alloc(x.dims(), x.dtype());
        OpCommand::new("Cast")
            .input(&x_nonzero)
            .output(&mut mask)
            .attr("dst_type", x.dtype().type_code())
            .run(ctx)?;

        let mut weight = ctx.alloc_like(x);
        OpCommand::new("Mul")
            .input(&mask)
            .input(&y_recip)
            .output(&mut weight)
            .run(ctx)?;

        let mut g = ctx.alloc_like(x);
        OpCommand::new("Mul")
            .input(&weight)
            .input(dout)
            .output(&mut g)
            .run(ctx)?;
        dx = Some(g);
    }

    let mut dy = None;
    if want_dy {
        let mut neg_out = ctx.alloc_like(y);
        OpCommand::new("Neg")
            .input(out)
            .output(&mut neg_out)
            .run(ctx)?;

        let mut weight = ctx.alloc_like(y);
        OpCommand::new("Div")
            .input(&neg_out)
            .input(y)
            .output(&mut weight)
            .run(ctx)?;

        let mut g = ctx.alloc_like(y);
        OpCommand::new("Mul")
            .input(&weight)
            .input(dout)
            .output(&mut g)
            .run(ctx)?;
        dy = Some(g);
    }

    Ok((dx, dy))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward() {
        let ctx = NpuContext::new();
        let x = Tensor::from_f32(&[6.0, 9.0], &[2]);
        let y = Tensor::from_f32(&[2.0, 3.0], &[2]);
        let out = elementwise_div(&ctx, &x, &y).unwrap();
        assert_eq!(out.as_f32_slice().unwrap(), &[3.0, 3.0]);
    }

    #[test]
    fn test_forward_rejects_integers() {
        let ctx = NpuContext::new();
        let x = Tensor::from_i32(&[6], &[1]);
        let y = Tensor::from_i32(&[2], &[1]);
        let err = elementwise_div(&ctx, &x, &y).unwrap_err();
        assert!(matches!(err, AxonError::UnsupportedDType(DType::I32)));
    }

    #[test]
    fn test_grad_dx_masks_zero_numerator() {
        let ctx = NpuContext::new();
        let x = Tensor::from_f32(&[4.0, 0.0], &[2]);
        let y = Tensor::from_f32(&[2.0, 2.0], &[2]);
        let out = elementwise_div(&ctx, &x, &y).unwrap();
        let dout = Tensor::from_f32(&[1.0, 1.0], &[2]);
        let (dx, dy) = elementwise_div_grad(&ctx, &x, &y, &out, &dout, true, false).unwrap();
        assert!(dy.is_none());
        // dx = dout / y, except zeroed where x == 0
        assert_eq!(dx.unwrap().as_f32_slice().unwrap(), &[0.5, 0.0]);
    }

    #[test]
    fn test_grad_dy() {
        let ctx = NpuContext::new();
        let x = Tensor::from_f64(&[6.0], &[1]);
        let y = Tensor::from_f64(&[2.0], &[1]);
        let out = elementwise_div(&ctx, &x, &y).unwrap();
        let dout = Tensor::from_f64(&[1.0], &[1]);
        let (dx, dy) = elementwise_div_grad(&ctx, &x, &y, &out, &dout, false, true).unwrap();
        assert!(dx.is_none());
        // dy = -out/y * dout = -(6/2)/2 = -1.5
        assert_eq!(dy.unwrap().as_f64_slice().unwrap(), &[-1.5]);
    }

    #[test]
    fn test_grad_never_issues_power() {
        let ctx = NpuContext::new();
        let x = Tensor::from_f32(&[1.0], &[1]);
        let y = Tensor::from_f32(&[4.0], &[1]);
        let out = elementwise_div(&ctx, &x, &y).unwrap();
        let dout = Tensor::from_f32(&[1.0], &[1]);
        elementwise_div_grad(&ctx, &x, &y, &out, &dout, true, true).unwrap();
        assert!(!ctx.stream().issued_ops().iter().any(|op| op == "Power"));
    }

    #[test]
    fn test_grad_shape_mismatch() {
        let ctx = NpuContext::new();
        let x = Tensor::from_f32(&[1.0, 2.0], &[2]);
        let y = Tensor::from_f32(&[1.0], &[1]);
        let err = elementwise_div(&ctx, &x, &y).unwrap_err();
        assert!(matches!(err, AxonError::ShapeMismatch { .. }));
    }
}
