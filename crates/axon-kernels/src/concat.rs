//! Concat forward and gradient kernels.
//!
//! The forward pass issues a single `ConcatD` over the non-empty inputs.
//! The gradient pass extracts one `SliceD` of the upstream gradient per
//! wanted input, using offsets accumulated over the non-empty inputs in
//! forward order.

use axon_core::{AxonError, Result, Shape, Tensor};
use axon_runtime::{NpuContext, OpCommand};

use crate::axis::normalize_axis;

/// Validate the inputs of a concat along (already normalized) `axis` and
/// compute the output shape.
///
/// All inputs must share rank and dtype. Empty inputs contribute nothing:
/// non-axis dimensions are compared across the non-empty inputs only, and
/// the output's `axis` dimension is the sum of theirs.
pub fn concat_output_shape(inputs: &[Tensor], axis: usize) -> Result<Shape> {
    let first = inputs
        .first()
        .ok_or_else(|| AxonError::InvalidArgument("concat requires at least one input".into()))?;
    let ndim = first.ndim();
    if axis >= ndim {
        return Err(AxonError::InvalidArgument(format!(
            "axis {axis} out of range for rank {ndim}"
        )));
    }

    let mut base: Option<&Tensor> = None;
    let mut axis_sum = 0usize;
    for t in inputs {
        if t.dtype() != first.dtype() {
            return Err(AxonError::DTypeMismatch {
                expected: first.dtype(),
                got: t.dtype(),
            });
        }
        if t.ndim() != ndim {
            return Err(AxonError::ShapeMismatch {
                expected: first.dims().to_vec(),
                got: t.dims().to_vec(),
            });
        }
        if t.numel() == 0 {
            continue;
        }
        if let Some(b) = base {
            for d in 0..ndim {
                if d != axis && t.dims()[d] != b.dims()[d] {
                    return Err(AxonError::ShapeMismatch {
                        expected: b.dims().to_vec(),
                        got: t.dims().to_vec(),
                    });
                }
            }
        } else {
            base = Some(t);
        }
        axis_sum += t.dims()[axis];
    }

    let mut dims = base.unwrap_or(first).dims().to_vec();
    dims[axis] = axis_sum;
    Ok(Shape::from(dims))
}

/// Concatenate `inputs` along `axis` (negative axes count from the end).
///
/// Empty inputs (zero elements) keep their slot in the positional input
/// names but are not passed to the device; if every input is empty no
/// primitive is issued at all and the (empty) output is returned as
/// allocated.
pub fn concat(ctx: &NpuContext, inputs: &[Tensor], axis: i64) -> Result<Tensor> {
    let first = inputs
        .first()
        .ok_or_else(|| AxonError::InvalidArgument("concat requires at least one input".into()))?;
    let axis = normalize_axis(axis, first.ndim() as i64)?;
    let out_shape = concat_output_shape(inputs, axis)?;
    let mut out = ctx.alloc(out_shape.dims(), first.dtype());

    let mut cmd = OpCommand::new("ConcatD");
    let mut kept = 0usize;
    for (i, t) in inputs.iter().enumerate() {
        if t.numel() == 0 {
            continue;
        }
        cmd = cmd.input_named(format!("x{i}"), t);
        kept += 1;
    }
    if kept == 0 {
        return Ok(out);
    }

    cmd.output(&mut out)
        .attr("concat_dim", axis as i64)
        .attr("N", kept as i64)
        .run(ctx)?;
    Ok(out)
}

/// The region of the concatenated tensor occupied by one input: a per-dim
/// start offset and extent, in the attribute form `SliceD` takes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceSpan {
    pub offsets: Vec<i64>,
    pub sizes: Vec<i64>,
}

/// Compute the slice span of every input within the concat output.
///
/// Spans are produced for empty inputs too (their extent along `axis` is
/// whatever the input declares), but only non-empty inputs advance the
/// running offset, matching how the forward pass packs the output.
pub fn slice_plan(inputs: &[Tensor], axis: usize) -> Vec<SliceSpan> {
    let mut offset = 0i64;
    inputs
        .iter()
        .map(|t| {
            let mut offsets = vec![0i64; t.ndim()];
            let sizes: Vec<i64> = t.dims().iter().map(|&d| d as i64).collect();
            if axis < t.ndim() {
                offsets[axis] = offset;
            }
            if t.numel() != 0 {
                offset += t.dims()[axis] as i64;
            }
            SliceSpan { offsets, sizes }
        })
        .collect()
}

/// Gradient of [`concat`]: slice `dout` back into per-input gradients.
///
/// `wants[j]` marks whether input `j` needs a gradient; unwanted slots get
/// `None`. A wanted empty input gets its zero-sized gradient without any
/// device work.
pub fn concat_grad(
    ctx: &NpuContext,
    inputs: &[Tensor],
    dout: &Tensor,
    axis: i64,
    wants: &[bool],
) -> Result<Vec<Option<Tensor>>> {
    let first = inputs
        .first()
        .ok_or_else(|| AxonError::InvalidArgument("concat_grad requires at least one input".into()))?;
    if wants.len() != inputs.len() {
        return Err(AxonError::InvalidArgument(format!(
            "wants mask has {} entries for {} inputs",
            wants.len(),
            inputs.len()
        )));
    }
    let axis = normalize_axis(axis, first.ndim() as i64)?;

    let expected = concat_output_shape(inputs, axis)?;
    if dout.dims() != expected.dims() {
        return Err(AxonError::ShapeMismatch {
            expected: expected.dims().to_vec(),
            got: dout.dims().to_vec(),
        });
    }
    if dout.dtype() != first.dtype() {
        return Err(AxonError::DTypeMismatch {
            expected: first.dtype(),
            got: dout.dtype(),
        });
    }

    let plan = slice_plan(inputs, axis);
    let mut grads = Vec::with_capacity(inputs.len());
    for ((t, span), &want) in inputs.iter().zip(&plan).zip(wants) {
        if !want {
            grads.push(None);
            continue;
        }
        let mut g = ctx.alloc_like(t);
        if t.numel() != 0 {
            OpCommand::new("SliceD")
                .input(dout)
                .output(&mut g)
                .attr("offsets", span.offsets.clone())
                .attr("size", span.sizes.clone())
                .run(ctx)?;
        }
        grads.push(Some(g));
    }
    Ok(grads)
}
