use axon_core::{DType, Result, Tensor};

use crate::context::NpuContext;
use crate::exec;

/// Attribute value attached to a primitive operator invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    IntList(Vec<i64>),
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Int(v)
    }
}

impl From<i32> for AttrValue {
    fn from(v: i32) -> Self {
        AttrValue::Int(v as i64)
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        AttrValue::Float(v)
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        AttrValue::Bool(v)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::Str(v.to_string())
    }
}

impl From<Vec<i64>> for AttrValue {
    fn from(v: Vec<i64>) -> Self {
        AttrValue::IntList(v)
    }
}

/// A primitive operator invocation: name, ordered inputs, ordered outputs,
/// named attributes.
///
/// Built immediately before dispatch and consumed by `run`; never retained.
/// Inputs are cheap clones (shared storage, read-only); outputs are mutable
/// borrows of caller-owned tensors.
///
/// ```
/// use axon_core::{DType, Tensor};
/// use axon_runtime::{NpuContext, OpCommand};
///
/// let ctx = NpuContext::new();
/// let x = Tensor::from_f32(&[6.0, 9.0], &[2]);
/// let y = Tensor::from_f32(&[2.0, 3.0], &[2]);
/// let mut out = ctx.alloc(&[2], DType::F32);
/// OpCommand::new("Div").input(&x).input(&y).output(&mut out).run(&ctx).unwrap();
/// assert_eq!(out.as_f32_slice().unwrap(), &[3.0, 3.0]);
/// ```
pub struct OpCommand<'a> {
    pub(crate) name: String,
    pub(crate) inputs: Vec<(String, Tensor)>,
    pub(crate) outputs: Vec<&'a mut Tensor>,
    pub(crate) attrs: Vec<(String, AttrValue)>,
}

impl<'a> OpCommand<'a> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            attrs: Vec::new(),
        }
    }

    /// Append an input with an auto-assigned positional name.
    pub fn input(mut self, t: &Tensor) -> Self {
        let name = format!("x{}", self.inputs.len());
        self.inputs.push((name, t.clone()));
        self
    }

    /// Append an input under an explicit name.
    pub fn input_named(mut self, name: impl Into<String>, t: &Tensor) -> Self {
        self.inputs.push((name.into(), t.clone()));
        self
    }

    /// Append an output.
    pub fn output(mut self, t: &'a mut Tensor) -> Self {
        self.outputs.push(t);
        self
    }

    /// Attach a named attribute.
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attrs.push((key.into(), value.into()));
        self
    }

    /// The primitive's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Issue this invocation on the context's stream.
    pub fn run(self, ctx: &NpuContext) -> Result<()> {
        log::trace!(
            "npu op {}: {} input(s), {} output(s), {} attr(s)",
            self.name,
            self.inputs.len(),
            self.outputs.len(),
            self.attrs.len()
        );
        ctx.stream().record(&self.name);
        exec::dispatch(self, ctx)
    }

    pub(crate) fn get_int_attr(&self, key: &str) -> Option<i64> {
        self.attrs.iter().find_map(|(k, v)| match v {
            AttrValue::Int(i) if k == key => Some(*i),
            _ => None,
        })
    }

    pub(crate) fn get_int_list_attr(&self, key: &str) -> Option<&[i64]> {
        self.attrs.iter().find_map(|(k, v)| match v {
            AttrValue::IntList(l) if k == key => Some(l.as_slice()),
            _ => None,
        })
    }
}

/// Run `body` with `out` temporarily retyped to `adapter_dtype`, then
/// reinterpret the written bytes under the tensor's declared dtype.
///
/// This is the bounded type-adaptation path used when a primitive does not
/// support the declared element type (the fill primitive rejects bool, so
/// bool fills run in `U8` and the destination's declared type reinterprets
/// the result). Element sizes of the two dtypes must agree.
pub fn with_retyped_output<F>(
    ctx: &NpuContext,
    out: &mut Tensor,
    adapter_dtype: DType,
    body: F,
) -> Result<()>
where
    F: FnOnce(&NpuContext, &mut Tensor) -> Result<()>,
{
    let declared = out.dtype();
    let mut staged = out.retyped(adapter_dtype)?;
    body(ctx, &mut staged)?;
    *out = staged.retyped(declared)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let x = Tensor::from_f32(&[1.0], &[1]);
        let mut out = Tensor::zeros(&[1], DType::F32);
        let cmd = OpCommand::new("Neg")
            .input(&x)
            .output(&mut out)
            .attr("k", 3i64);
        assert_eq!(cmd.name(), "Neg");
        assert_eq!(cmd.inputs[0].0, "x0");
        assert_eq!(cmd.get_int_attr("k"), Some(3));
        assert_eq!(cmd.get_int_attr("missing"), None);
    }

    #[test]
    fn test_named_inputs() {
        let x = Tensor::from_f32(&[1.0], &[1]);
        let cmd = OpCommand::new("ConcatD")
            .input_named("x0", &x)
            .input_named("x2", &x);
        assert_eq!(cmd.inputs[1].0, "x2");
    }

    #[test]
    fn test_retyped_output_scope() {
        let ctx = NpuContext::new();
        let mut out = Tensor::zeros(&[3], DType::Bool);
        with_retyped_output(&ctx, &mut out, DType::U8, |ctx, staged| {
            assert_eq!(staged.dtype(), DType::U8);
            ctx.fill_with_scalar(staged, axon_core::Scalar::from(1i64))
        })
        .unwrap();
        assert_eq!(out.dtype(), DType::Bool);
        assert_eq!(out.as_u8_slice().unwrap(), &[1, 1, 1]);
    }
}
