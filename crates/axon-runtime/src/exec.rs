//! Host-side reference executor for the primitive operator set.
//!
//! Dispatch is by primitive name, mirroring how the device stack resolves
//! operator invocations. Layout-only primitives (`ConcatD`, `SliceD`,
//! `ZerosLike`, `Fill`, `FillD`) are byte-level and dtype-agnostic;
//! arithmetic primitives cover the float types the kernels register for.
//!
//! The executor runs eagerly on the issuing thread. A real device would
//! execute asynchronously, with the stream enforcing order; eager execution
//! satisfies the same observable contract.

use axon_core::{AxonError, DType, Result, Scalar, Tensor};

use crate::context::NpuContext;
use crate::op::OpCommand;

type OpResult = std::result::Result<(), String>;

pub(crate) fn dispatch(mut cmd: OpCommand, _ctx: &NpuContext) -> Result<()> {
    let name = cmd.name.clone();
    let outcome = match name.as_str() {
        "Div" => binary_float(&mut cmd, |a, b| a / b),
        "Mul" => binary_float(&mut cmd, |a, b| a * b),
        "Neg" => unary_float(&mut cmd, |v| -v),
        "Equal" => equal(&mut cmd),
        "LogicalNot" => logical_not(&mut cmd),
        "Cast" => cast(&mut cmd),
        "ZerosLike" => zeros_like(&mut cmd),
        "ConcatD" => concat_d(&mut cmd),
        "SliceD" => slice_d(&mut cmd),
        "Fill" => fill(&mut cmd),
        "FillD" => fill_d(&mut cmd),
        other => Err(format!("unknown primitive '{other}'")),
    };
    outcome.map_err(|msg| AxonError::Dispatch { op: name, msg })
}

// =============================================================================
// Element access helpers
// =============================================================================

/// Encode a host scalar as the byte representation of one element.
pub(crate) fn scalar_bytes(dtype: DType, value: Scalar) -> Result<Vec<u8>> {
    let bytes = match dtype {
        DType::Bool => vec![value.to_bool() as u8],
        DType::U8 => vec![value.to_i64() as u8],
        DType::I8 => (value.to_i64() as i8).to_ne_bytes().to_vec(),
        DType::I16 => (value.to_i64() as i16).to_ne_bytes().to_vec(),
        DType::I32 => (value.to_i64() as i32).to_ne_bytes().to_vec(),
        DType::I64 => value.to_i64().to_ne_bytes().to_vec(),
        DType::F16 => half::f16::from_f64(value.to_f64()).to_ne_bytes().to_vec(),
        DType::F32 => value.to_f32().to_ne_bytes().to_vec(),
        DType::F64 => value.to_f64().to_ne_bytes().to_vec(),
    };
    Ok(bytes)
}

/// Read element `i` of a tensor, widened to f64.
fn read_f64(t: &Tensor, i: usize) -> f64 {
    let esize = t.dtype().element_size();
    let chunk = &t.as_bytes()[i * esize..(i + 1) * esize];
    match t.dtype() {
        DType::Bool | DType::U8 => chunk[0] as f64,
        DType::I8 => chunk[0] as i8 as f64,
        DType::I16 => i16::from_ne_bytes([chunk[0], chunk[1]]) as f64,
        DType::I32 => i32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]) as f64,
        DType::I64 => i64::from_ne_bytes([
            chunk[0], chunk[1], chunk[2], chunk[3], chunk[4], chunk[5], chunk[6], chunk[7],
        ]) as f64,
        DType::F16 => half::f16::from_ne_bytes([chunk[0], chunk[1]]).to_f64(),
        DType::F32 => f32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]) as f64,
        DType::F64 => f64::from_ne_bytes([
            chunk[0], chunk[1], chunk[2], chunk[3], chunk[4], chunk[5], chunk[6], chunk[7],
        ]),
    }
}

/// Write a widened f64 value into element `i` of a tensor.
fn write_f64(t: &mut Tensor, i: usize, v: f64) {
    let dtype = t.dtype();
    let elem = match dtype {
        DType::Bool => vec![(v != 0.0) as u8],
        DType::U8 => vec![v as u8],
        DType::I8 => (v as i8).to_ne_bytes().to_vec(),
        DType::I16 => (v as i16).to_ne_bytes().to_vec(),
        DType::I32 => (v as i32).to_ne_bytes().to_vec(),
        DType::I64 => (v as i64).to_ne_bytes().to_vec(),
        DType::F16 => half::f16::from_f64(v).to_ne_bytes().to_vec(),
        DType::F32 => (v as f32).to_ne_bytes().to_vec(),
        DType::F64 => v.to_ne_bytes().to_vec(),
    };
    let esize = dtype.element_size();
    t.as_bytes_mut()[i * esize..(i + 1) * esize].copy_from_slice(&elem);
}

fn one_in_one_out(cmd: &OpCommand) -> std::result::Result<(), String> {
    if cmd.inputs.len() != 1 || cmd.outputs.len() != 1 {
        return Err(format!(
            "expected 1 input and 1 output, got {} and {}",
            cmd.inputs.len(),
            cmd.outputs.len()
        ));
    }
    Ok(())
}

// =============================================================================
// Elementwise primitives
// =============================================================================

/// Binary elementwise op on F32/F64. Either operand may be a singleton,
/// which broadcasts against the other.
fn binary_float(cmd: &mut OpCommand, f: impl Fn(f64, f64) -> f64) -> OpResult {
    if cmd.inputs.len() != 2 || cmd.outputs.len() != 1 {
        return Err(format!(
            "expected 2 inputs and 1 output, got {} and {}",
            cmd.inputs.len(),
            cmd.outputs.len()
        ));
    }
    let a = cmd.inputs[0].1.clone();
    let b = cmd.inputs[1].1.clone();
    let out = &mut cmd.outputs[0];

    let dtype = a.dtype();
    if !matches!(dtype, DType::F32 | DType::F64) {
        return Err(format!("unsupported dtype {dtype}"));
    }
    if b.dtype() != dtype || out.dtype() != dtype {
        return Err(format!(
            "operand dtypes differ: {} vs {} -> {}",
            dtype,
            b.dtype(),
            out.dtype()
        ));
    }
    let n = a.numel().max(b.numel());
    if (a.numel() != n && a.numel() != 1) || (b.numel() != n && b.numel() != 1) {
        return Err(format!(
            "operand element counts {} and {} are incompatible",
            a.numel(),
            b.numel()
        ));
    }
    if out.numel() != n {
        return Err(format!(
            "output has {} elements, expected {}",
            out.numel(),
            n
        ));
    }

    let av = |i: usize| read_f64(&a, if a.numel() == 1 { 0 } else { i });
    let bv = |i: usize| read_f64(&b, if b.numel() == 1 { 0 } else { i });
    for i in 0..n {
        write_f64(out, i, f(av(i), bv(i)));
    }
    Ok(())
}

fn unary_float(cmd: &mut OpCommand, f: impl Fn(f64) -> f64) -> OpResult {
    one_in_one_out(cmd)?;
    let x = cmd.inputs[0].1.clone();
    let out = &mut cmd.outputs[0];
    let dtype = x.dtype();
    if !matches!(dtype, DType::F32 | DType::F64) {
        return Err(format!("unsupported dtype {dtype}"));
    }
    if out.dtype() != dtype || out.numel() != x.numel() {
        return Err("output shape/dtype does not match input".into());
    }
    for i in 0..x.numel() {
        write_f64(out, i, f(read_f64(&x, i)));
    }
    Ok(())
}

/// Elementwise equality; output is Bool. Floats compare by value, other
/// dtypes by raw element bytes.
fn equal(cmd: &mut OpCommand) -> OpResult {
    if cmd.inputs.len() != 2 || cmd.outputs.len() != 1 {
        return Err("expected 2 inputs and 1 output".into());
    }
    let a = cmd.inputs[0].1.clone();
    let b = cmd.inputs[1].1.clone();
    let out = &mut cmd.outputs[0];

    if a.dtype() != b.dtype() {
        return Err(format!("operand dtypes differ: {} vs {}", a.dtype(), b.dtype()));
    }
    if out.dtype() != DType::Bool {
        return Err(format!("output must be bool, got {}", out.dtype()));
    }
    if a.numel() != b.numel() || out.numel() != a.numel() {
        return Err("operand element counts differ".into());
    }

    let n = a.numel();
    if a.dtype().is_float() {
        for i in 0..n {
            let eq = read_f64(&a, i) == read_f64(&b, i);
            out.as_bytes_mut()[i] = eq as u8;
        }
    } else {
        let esize = a.dtype().element_size();
        let ab = a.as_bytes();
        let bb = b.as_bytes();
        for i in 0..n {
            let eq = ab[i * esize..(i + 1) * esize] == bb[i * esize..(i + 1) * esize];
            out.as_bytes_mut()[i] = eq as u8;
        }
    }
    Ok(())
}

fn logical_not(cmd: &mut OpCommand) -> OpResult {
    one_in_one_out(cmd)?;
    let x = cmd.inputs[0].1.clone();
    let out = &mut cmd.outputs[0];
    if x.dtype() != DType::Bool || out.dtype() != DType::Bool {
        return Err("LogicalNot operates on bool tensors".into());
    }
    if out.numel() != x.numel() {
        return Err("output element count does not match input".into());
    }
    let src = x.as_bytes().to_vec();
    let dst = out.as_bytes_mut();
    for (d, s) in dst.iter_mut().zip(src.iter()) {
        *d = (*s == 0) as u8;
    }
    Ok(())
}

/// Cast to the dtype named by the `dst_type` attribute (vendor type code).
/// Values pass through a widened f64; bool inputs become 0/1.
fn cast(cmd: &mut OpCommand) -> OpResult {
    one_in_one_out(cmd)?;
    let code = cmd
        .get_int_attr("dst_type")
        .ok_or_else(|| "missing 'dst_type' attribute".to_string())?;
    let dst = DType::from_type_code(code).ok_or_else(|| format!("unknown type code {code}"))?;

    let x = cmd.inputs[0].1.clone();
    let out = &mut cmd.outputs[0];
    if out.dtype() != dst {
        return Err(format!(
            "output dtype {} does not match dst_type {}",
            out.dtype(),
            dst
        ));
    }
    if out.numel() != x.numel() {
        return Err("output element count does not match input".into());
    }
    for i in 0..x.numel() {
        let v = read_f64(&x, i);
        write_f64(out, i, v);
    }
    Ok(())
}

fn zeros_like(cmd: &mut OpCommand) -> OpResult {
    one_in_one_out(cmd)?;
    let x = cmd.inputs[0].1.clone();
    let out = &mut cmd.outputs[0];
    if out.dtype() != x.dtype() || out.numel() != x.numel() {
        return Err("output shape/dtype does not match input".into());
    }
    out.as_bytes_mut().fill(0);
    Ok(())
}

// =============================================================================
// Layout primitives (byte-level, dtype-agnostic)
// =============================================================================

/// Concatenate the inputs along the `concat_dim` attribute. All inputs must
/// be non-empty; the kernel layer filters empties before dispatch.
fn concat_d(cmd: &mut OpCommand) -> OpResult {
    if cmd.inputs.is_empty() || cmd.outputs.len() != 1 {
        return Err("expected at least 1 input and exactly 1 output".into());
    }
    let axis = cmd
        .get_int_attr("concat_dim")
        .ok_or_else(|| "missing 'concat_dim' attribute".to_string())?;
    if let Some(n) = cmd.get_int_attr("N") {
        if n as usize != cmd.inputs.len() {
            return Err(format!("attribute N={} but {} inputs", n, cmd.inputs.len()));
        }
    }
    let inputs: Vec<Tensor> = cmd.inputs.iter().map(|(_, t)| t.clone()).collect();
    let out = &mut cmd.outputs[0];

    let ndim = out.ndim();
    if axis < 0 || axis as usize >= ndim {
        return Err(format!("concat_dim {axis} out of range for rank {ndim}"));
    }
    let axis = axis as usize;
    let dtype = out.dtype();
    let esize = dtype.element_size();

    let out_dims = out.dims().to_vec();
    let axis_total: usize = inputs.iter().map(|t| t.dims()[axis]).sum();
    if axis_total != out_dims[axis] {
        return Err(format!(
            "inputs cover {} along dim {}, output expects {}",
            axis_total, axis, out_dims[axis]
        ));
    }
    for t in &inputs {
        if t.dtype() != dtype || t.ndim() != ndim {
            return Err("input dtype/rank does not match output".into());
        }
    }

    let outer: usize = out_dims[..axis].iter().product();
    let inner_bytes: usize = out_dims[axis + 1..].iter().product::<usize>() * esize;

    let mut cat_offset = 0usize;
    for t in &inputs {
        let t_axis = t.dims()[axis];
        let src = t.as_bytes();
        for o in 0..outer {
            let src_start = o * t_axis * inner_bytes;
            let dst_start = (o * out_dims[axis] + cat_offset) * inner_bytes;
            let len = t_axis * inner_bytes;
            cmd.outputs[0].as_bytes_mut()[dst_start..dst_start + len]
                .copy_from_slice(&src[src_start..src_start + len]);
        }
        cat_offset += t_axis;
    }
    Ok(())
}

/// Copy the sub-block described by the `offsets`/`size` attributes out of
/// the input into the output.
fn slice_d(cmd: &mut OpCommand) -> OpResult {
    one_in_one_out(cmd)?;
    let offsets = cmd
        .get_int_list_attr("offsets")
        .ok_or_else(|| "missing 'offsets' attribute".to_string())?
        .to_vec();
    let sizes = cmd
        .get_int_list_attr("size")
        .ok_or_else(|| "missing 'size' attribute".to_string())?
        .to_vec();

    let src = cmd.inputs[0].1.clone();
    let out = &mut cmd.outputs[0];
    let ndim = src.ndim();
    if offsets.len() != ndim || sizes.len() != ndim {
        return Err(format!(
            "offsets/size rank {}/{} does not match input rank {}",
            offsets.len(),
            sizes.len(),
            ndim
        ));
    }
    if src.dtype() != out.dtype() {
        return Err("input/output dtypes differ".into());
    }
    let src_dims = src.dims().to_vec();
    for d in 0..ndim {
        if offsets[d] < 0 || sizes[d] < 0 {
            return Err("offsets/size must be non-negative".into());
        }
        if (offsets[d] + sizes[d]) as usize > src_dims[d] {
            return Err(format!(
                "slice [{}, {}) exceeds dim {} of size {}",
                offsets[d],
                offsets[d] + sizes[d],
                d,
                src_dims[d]
            ));
        }
        if out.dims()[d] != sizes[d] as usize {
            return Err("output dims do not match requested sizes".into());
        }
    }
    if out.numel() == 0 {
        return Ok(());
    }

    let esize = src.dtype().element_size();
    if ndim == 0 {
        let bytes = src.as_bytes().to_vec();
        out.as_bytes_mut().copy_from_slice(&bytes);
        return Ok(());
    }

    let src_strides = src.shape().contiguous_strides();
    let out_strides = out.shape().contiguous_strides();
    let row_elems = sizes[ndim - 1] as usize;
    let row_bytes = row_elems * esize;

    // Walk every row of the output block (all dims but the last), mapping it
    // to the offset row in the source.
    let mut idx = vec![0usize; ndim - 1];
    let src_bytes = src.as_bytes().to_vec();
    loop {
        let mut src_elem = offsets[ndim - 1] as usize;
        let mut dst_elem = 0usize;
        for d in 0..ndim - 1 {
            src_elem += (offsets[d] as usize + idx[d]) * src_strides[d];
            dst_elem += idx[d] * out_strides[d];
        }
        out.as_bytes_mut()[dst_elem * esize..dst_elem * esize + row_bytes]
            .copy_from_slice(&src_bytes[src_elem * esize..src_elem * esize + row_bytes]);

        // odometer increment over the leading dims
        let mut d = ndim - 1;
        loop {
            if d == 0 {
                return Ok(());
            }
            d -= 1;
            idx[d] += 1;
            if idx[d] < sizes[d] as usize {
                break;
            }
            idx[d] = 0;
        }
    }
}

// =============================================================================
// Fill primitives
// =============================================================================

fn splat_seed(seed: &Tensor, out: &mut Tensor, dims: &[i64]) -> OpResult {
    if out.dtype().is_bool() {
        // Bool is not fillable by the device primitive; callers retype to U8.
        return Err("fill does not support bool output".into());
    }
    if seed.numel() != 1 {
        return Err(format!("fill value must be a singleton, got {} elements", seed.numel()));
    }
    if seed.dtype() != out.dtype() {
        return Err(format!(
            "fill value dtype {} does not match output {}",
            seed.dtype(),
            out.dtype()
        ));
    }
    let expected: Vec<i64> = out.dims().iter().map(|&d| d as i64).collect();
    if dims != expected.as_slice() {
        return Err(format!(
            "requested dims {:?} do not match output dims {:?}",
            dims, expected
        ));
    }
    let elem = seed.as_bytes().to_vec();
    for chunk in out.as_bytes_mut().chunks_exact_mut(elem.len()) {
        chunk.copy_from_slice(&elem);
    }
    Ok(())
}

/// `Fill`: inputs are a 1-D i64 shape tensor and a singleton value.
fn fill(cmd: &mut OpCommand) -> OpResult {
    if cmd.inputs.len() != 2 || cmd.outputs.len() != 1 {
        return Err("expected 2 inputs (shape, value) and 1 output".into());
    }
    let shape_t = cmd.inputs[0].1.clone();
    let seed = cmd.inputs[1].1.clone();
    let dims = shape_t
        .as_i64_slice()
        .ok_or_else(|| format!("shape input must be i64, got {}", shape_t.dtype()))?
        .to_vec();
    if shape_t.ndim() != 1 {
        return Err("shape input must be 1-D".into());
    }
    splat_seed(&seed, &mut cmd.outputs[0], &dims)
}

/// `FillD`: a singleton value input and a `dims` attribute.
fn fill_d(cmd: &mut OpCommand) -> OpResult {
    one_in_one_out(cmd)?;
    let dims = cmd
        .get_int_list_attr("dims")
        .ok_or_else(|| "missing 'dims' attribute".to_string())?
        .to_vec();
    let seed = cmd.inputs[0].1.clone();
    splat_seed(&seed, &mut cmd.outputs[0], &dims)
}
