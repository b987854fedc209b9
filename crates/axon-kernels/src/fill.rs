//! Constant-fill kernels.
//!
//! Three entry points share the same machinery:
//!
//! - [`fill_constant`] and [`full`] build a tensor of a requested shape,
//!   selecting between the `FillD` (dims attribute) and `Fill` (shape
//!   tensor input) primitives by driver version.
//! - [`full_like`] takes shape from an existing tensor, always uses the
//!   shape-tensor form, and validates the value against the destination
//!   type's representable range before any device work.
//!
//! The fill primitives reject bool outputs, so bool fills stage through a
//! `U8` view of the destination and reinterpret the bytes.

use axon_core::{AxonError, DType, Result, Scalar, Tensor};
use axon_runtime::{with_retyped_output, NpuContext, OpCommand};

/// First driver version whose primitive set includes `FillD`.
pub const FILLD_MIN_VERSION: u32 = 503_003;
/// Driver version at which `FillD` was retired again.
pub const FILLD_RETIRED_VERSION: u32 = 504_001;

/// Which fill primitive a kernel will issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillVariant {
    /// `FillD`: target shape passed as a `dims` attribute.
    WithDims,
    /// `Fill`: target shape passed as a 1-D i64 tensor input.
    WithShapeTensor,
}

/// Variant selection for [`fill_constant`]: `FillD` only in the window
/// where the driver shipped it.
pub fn fill_variant_for_constant(version: u32) -> FillVariant {
    if (FILLD_MIN_VERSION..FILLD_RETIRED_VERSION).contains(&version) {
        FillVariant::WithDims
    } else {
        FillVariant::WithShapeTensor
    }
}

/// Variant selection for [`full`]: `FillD` from its introduction onward.
pub fn fill_variant_for_full(version: u32) -> FillVariant {
    if version >= FILLD_MIN_VERSION {
        FillVariant::WithDims
    } else {
        FillVariant::WithShapeTensor
    }
}

/// Validate a requested shape; every extent must be non-negative.
fn resolve_shape(shape: &[i64]) -> Result<Vec<usize>> {
    shape
        .iter()
        .map(|&d| {
            if d < 0 {
                Err(AxonError::InvalidArgument(format!(
                    "fill shape has negative dimension {d}"
                )))
            } else {
                Ok(d as usize)
            }
        })
        .collect()
}

/// Issue the selected fill primitive into `out`. The seed value is
/// materialized as a singleton of the output dtype first.
fn fill_numeric(
    ctx: &NpuContext,
    out: &mut Tensor,
    dims: &[i64],
    value: Scalar,
    variant: FillVariant,
) -> Result<()> {
    let mut seed = ctx.alloc(&[1], out.dtype());
    ctx.fill_with_scalar(&mut seed, value)?;
    match variant {
        FillVariant::WithDims => OpCommand::new("FillD")
            .input(&seed)
            .output(out)
            .attr("dims", dims.to_vec())
            .run(ctx),
        FillVariant::WithShapeTensor => {
            let shape_t = Tensor::from_i64(dims, &[dims.len()]);
            OpCommand::new("Fill")
                .input(&shape_t)
                .input(&seed)
                .output(out)
                .run(ctx)
        }
    }
}

/// Bool fill: the device fill primitives refuse bool outputs, so run the
/// shape-tensor form against a `U8` view of the destination.
fn fill_bool(ctx: &NpuContext, out: &mut Tensor, dims: &[i64], value: Scalar) -> Result<()> {
    let byte_value = Scalar::from(value.to_bool() as i64);
    with_retyped_output(ctx, out, DType::U8, |ctx, staged| {
        fill_numeric(ctx, staged, dims, byte_value, FillVariant::WithShapeTensor)
    })
}

fn fill_into_new(
    ctx: &NpuContext,
    shape: &[i64],
    value: Scalar,
    dtype: DType,
    variant: FillVariant,
) -> Result<Tensor> {
    let resolved = resolve_shape(shape)?;
    let mut out = ctx.alloc(&resolved, dtype);
    if dtype.is_bool() {
        fill_bool(ctx, &mut out, shape, value)?;
    } else {
        fill_numeric(ctx, &mut out, shape, value, variant)?;
    }
    Ok(out)
}

/// Build a `shape`-d tensor of `dtype` holding `value` everywhere.
pub fn fill_constant(
    ctx: &NpuContext,
    shape: &[i64],
    value: Scalar,
    dtype: DType,
) -> Result<Tensor> {
    fill_into_new(ctx, shape, value, dtype, fill_variant_for_constant(ctx.version()))
}

/// Same contract as [`fill_constant`] with its own variant gate.
pub fn full(ctx: &NpuContext, shape: &[i64], value: Scalar, dtype: DType) -> Result<Tensor> {
    fill_into_new(ctx, shape, value, dtype, fill_variant_for_full(ctx.version()))
}

/// Range/NaN validation for [`full_like`]. Comparison happens in f64 so the
/// check itself never loses precision.
fn validate_fill_value(value: Scalar, dtype: DType) -> Result<()> {
    let v = value.to_f64();
    if v.is_nan() {
        return Err(AxonError::InvalidArgument("the fill value is NaN".into()));
    }
    let (lo, hi) = dtype.finite_bounds();
    if v < lo || v > hi {
        return Err(AxonError::InvalidArgument(format!(
            "fill value {v} is out of range for {dtype}, expected [{lo}, {hi}]"
        )));
    }
    Ok(())
}

/// Build a tensor shaped like `x`, of `dtype`, holding `value` everywhere.
///
/// Unlike [`full`], the value is validated against the destination type
/// first: out-of-range and NaN values fail with `InvalidArgument` instead
/// of silently wrapping or clamping.
pub fn full_like(ctx: &NpuContext, x: &Tensor, value: Scalar, dtype: DType) -> Result<Tensor> {
    validate_fill_value(value, dtype)?;
    let dims: Vec<i64> = x.dims().iter().map(|&d| d as i64).collect();
    let mut out = ctx.alloc(x.dims(), dtype);
    if dtype.is_bool() {
        fill_bool(ctx, &mut out, &dims, value)?;
    } else {
        fill_numeric(ctx, &mut out, &dims, value, FillVariant::WithShapeTensor)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_gates() {
        assert_eq!(fill_variant_for_constant(502_000), FillVariant::WithShapeTensor);
        assert_eq!(fill_variant_for_constant(503_003), FillVariant::WithDims);
        assert_eq!(fill_variant_for_constant(504_001), FillVariant::WithShapeTensor);

        assert_eq!(fill_variant_for_full(502_000), FillVariant::WithShapeTensor);
        assert_eq!(fill_variant_for_full(503_003), FillVariant::WithDims);
        assert_eq!(fill_variant_for_full(504_001), FillVariant::WithDims);
    }

    #[test]
    fn test_fill_constant_f32() {
        let ctx = NpuContext::new();
        let out = fill_constant(&ctx, &[2, 2], Scalar::from(1.5f32), DType::F32).unwrap();
        assert_eq!(out.dims(), &[2, 2]);
        assert_eq!(out.as_f32_slice().unwrap(), &[1.5; 4]);
        // default driver is past the FillD window
        assert_eq!(ctx.stream().issued_ops(), vec!["Fill"]);
    }

    #[test]
    fn test_fill_constant_filld_window() {
        let ctx = NpuContext::with_version(503_003);
        let out = fill_constant(&ctx, &[3], Scalar::from(7i64), DType::I64).unwrap();
        assert_eq!(out.as_i64_slice().unwrap(), &[7, 7, 7]);
        assert_eq!(ctx.stream().issued_ops(), vec!["FillD"]);
    }

    #[test]
    fn test_full_uses_filld_on_current_driver() {
        let ctx = NpuContext::new();
        let out = full(&ctx, &[2], Scalar::from(-3i32), DType::I32).unwrap();
        assert_eq!(out.as_i32_slice().unwrap(), &[-3, -3]);
        assert_eq!(ctx.stream().issued_ops(), vec!["FillD"]);
    }

    #[test]
    fn test_negative_dimension_rejected() {
        let ctx = NpuContext::new();
        let err = fill_constant(&ctx, &[2, -1], Scalar::from(0.0), DType::F32).unwrap_err();
        assert!(matches!(err, AxonError::InvalidArgument(_)));
    }

    #[test]
    fn test_bool_fill_routes_through_u8() {
        let ctx = NpuContext::new();
        let out = fill_constant(&ctx, &[3], Scalar::from(true), DType::Bool).unwrap();
        assert_eq!(out.dtype(), DType::Bool);
        assert_eq!(out.as_u8_slice().unwrap(), &[1, 1, 1]);
        // bool path always takes the shape-tensor primitive
        assert_eq!(ctx.stream().issued_ops(), vec!["Fill"]);
    }

    #[test]
    fn test_full_like_copies_shape() {
        let ctx = NpuContext::new();
        let x = Tensor::zeros(&[2, 3], DType::F32);
        let out = full_like(&ctx, &x, Scalar::from(4.0), DType::F64).unwrap();
        assert_eq!(out.dims(), &[2, 3]);
        assert_eq!(out.as_f64_slice().unwrap(), &[4.0; 6]);
    }

    #[test]
    fn test_full_like_range_check() {
        let ctx = NpuContext::new();
        let x = Tensor::zeros(&[1], DType::F32);
        let err = full_like(&ctx, &x, Scalar::from(200.0), DType::I8).unwrap_err();
        assert!(matches!(err, AxonError::InvalidArgument(_)));
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_full_like_nan_check() {
        let ctx = NpuContext::new();
        let x = Tensor::zeros(&[1], DType::F32);
        let err = full_like(&ctx, &x, Scalar::from(f64::NAN), DType::F32).unwrap_err();
        assert!(matches!(err, AxonError::InvalidArgument(_)));
        assert!(err.to_string().contains("NaN"));
    }
}
