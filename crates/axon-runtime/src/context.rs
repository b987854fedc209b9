use axon_core::{DType, Result, Scalar, Tensor};

use crate::exec;
use crate::stream::Stream;

/// Default driver/capability version reported by a fresh context.
///
/// Encoded the vendor way: major*100_000 + minor*10_000 + patch*1_000 + build.
pub const DEFAULT_DRIVER_VERSION: u32 = 504_001;

/// NPU execution context.
///
/// Supplies device memory allocation, the execution stream, and the
/// driver/capability version used to select between primitive variants.
/// One stream per context; kernels issue all their primitives onto it in
/// program order.
#[derive(Debug)]
pub struct NpuContext {
    stream: Stream,
    version: u32,
}

impl NpuContext {
    pub fn new() -> Self {
        Self::with_version(DEFAULT_DRIVER_VERSION)
    }

    /// Create a context reporting a specific driver version. Used to exercise
    /// capability-gated code paths.
    pub fn with_version(version: u32) -> Self {
        Self {
            stream: Stream::new(),
            version,
        }
    }

    /// The driver/capability version of the device software stack.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// The context's execution stream.
    pub fn stream(&self) -> &Stream {
        &self.stream
    }

    /// Allocate a zero-initialized device tensor.
    pub fn alloc(&self, dims: &[usize], dtype: DType) -> Tensor {
        Tensor::zeros(dims, dtype)
    }

    /// Allocate a zero-initialized device tensor shaped and typed like `t`.
    pub fn alloc_like(&self, t: &Tensor) -> Tensor {
        Tensor::zeros(t.dims(), t.dtype())
    }

    /// Write a host scalar into every element of a device tensor.
    ///
    /// This is a host-to-device constant write, not a stream primitive; it
    /// is how kernels materialize singleton constants (fill seeds, the `1`
    /// used for reciprocal-by-division) before issuing ops that consume them.
    pub fn fill_with_scalar(&self, t: &mut Tensor, value: Scalar) -> Result<()> {
        let elem = exec::scalar_bytes(t.dtype(), value)?;
        let esize = t.dtype().element_size();
        let bytes = t.as_bytes_mut();
        for chunk in bytes.chunks_exact_mut(esize) {
            chunk.copy_from_slice(&elem);
        }
        Ok(())
    }
}

impl Default for NpuContext {
    fn default() -> Self {
        Self::new()
    }
}
