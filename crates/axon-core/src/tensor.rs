use std::fmt;

use crate::dtype::DType;
use crate::device::Device;
use crate::shape::Shape;
use crate::storage::Storage;
use crate::Result;

/// A contiguous multi-dimensional array resident in (simulated) device memory.
///
/// Kernels either own temporary tensors they allocate (dropped at the end of
/// the invocation) or borrow caller-owned inputs/outputs. Cloning is cheap:
/// storage is shared and copy-on-write.
///
/// # Examples
///
/// ```
/// use axon_core::Tensor;
///
/// let t = Tensor::from_f32(&[1.0, 2.0, 3.0, 4.0], &[2, 2]);
/// assert_eq!(t.shape().dims(), &[2, 2]);
/// assert_eq!(t.numel(), 4);
/// ```
#[derive(Clone)]
pub struct Tensor {
    storage: Storage,
    shape: Shape,
}

impl Tensor {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Create a tensor from f32 data with the given shape.
    pub fn from_f32(data: &[f32], shape: &[usize]) -> Self {
        let s = Shape::new(shape);
        assert_eq!(
            s.numel(),
            data.len(),
            "shape {:?} requires {} elements, got {}",
            shape,
            s.numel(),
            data.len()
        );
        Self {
            storage: Storage::from_f32(data),
            shape: s,
        }
    }

    /// Create a tensor from f64 data with the given shape.
    pub fn from_f64(data: &[f64], shape: &[usize]) -> Self {
        let s = Shape::new(shape);
        assert_eq!(s.numel(), data.len());
        Self {
            storage: Storage::from_f64(data),
            shape: s,
        }
    }

    /// Create a tensor from i32 data with the given shape.
    pub fn from_i32(data: &[i32], shape: &[usize]) -> Self {
        let s = Shape::new(shape);
        assert_eq!(s.numel(), data.len());
        Self {
            storage: Storage::from_i32(data),
            shape: s,
        }
    }

    /// Create a tensor from i64 data with the given shape.
    pub fn from_i64(data: &[i64], shape: &[usize]) -> Self {
        let s = Shape::new(shape);
        assert_eq!(s.numel(), data.len());
        Self {
            storage: Storage::from_i64(data),
            shape: s,
        }
    }

    /// Create a tensor of zeros with the given shape and dtype.
    pub fn zeros(shape: &[usize], dtype: DType) -> Self {
        let s = Shape::new(shape);
        let storage = Storage::zeros(dtype, s.numel());
        Self { storage, shape: s }
    }

    /// Create a tensor from pre-built storage and shape.
    pub fn from_storage(storage: Storage, shape: Shape) -> Self {
        assert_eq!(storage.numel(), shape.numel());
        Self { storage, shape }
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Shape of the tensor.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Dimension sizes as a slice.
    pub fn dims(&self) -> &[usize] {
        self.shape.dims()
    }

    /// Number of dimensions.
    pub fn ndim(&self) -> usize {
        self.shape.ndim()
    }

    /// Total number of elements.
    pub fn numel(&self) -> usize {
        self.shape.numel()
    }

    /// Data type.
    pub fn dtype(&self) -> DType {
        self.storage.dtype()
    }

    /// Device.
    pub fn device(&self) -> Device {
        self.storage.device()
    }

    /// Get a reference to the underlying storage (for dispatch).
    pub fn storage_ref(&self) -> &Storage {
        &self.storage
    }

    /// Get a mutable reference to the underlying storage (for dispatch).
    pub fn storage_mut(&mut self) -> &mut Storage {
        &mut self.storage
    }

    // =========================================================================
    // Data access
    // =========================================================================

    /// Raw bytes of the tensor buffer.
    pub fn as_bytes(&self) -> &[u8] {
        self.storage.as_bytes()
    }

    /// Mutable raw bytes (copy-on-write).
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        self.storage.as_bytes_mut()
    }

    /// Get the underlying f32 data as a slice.
    pub fn as_f32_slice(&self) -> Option<&[f32]> {
        self.storage.as_f32_slice()
    }

    /// Get a mutable f32 slice (copy-on-write).
    pub fn as_f32_slice_mut(&mut self) -> Option<&mut [f32]> {
        self.storage.as_f32_slice_mut()
    }

    /// Get the underlying f64 data as a slice.
    pub fn as_f64_slice(&self) -> Option<&[f64]> {
        self.storage.as_f64_slice()
    }

    /// Get the underlying i32 data as a slice.
    pub fn as_i32_slice(&self) -> Option<&[i32]> {
        self.storage.as_i32_slice()
    }

    /// Get the underlying i64 data as a slice.
    pub fn as_i64_slice(&self) -> Option<&[i64]> {
        self.storage.as_i64_slice()
    }

    /// Get the underlying single-byte data as a slice (U8 or Bool).
    pub fn as_u8_slice(&self) -> Option<&[u8]> {
        self.storage.as_u8_slice()
    }

    /// Reinterpret this tensor under a different dtype of the same element
    /// size, sharing the underlying bytes. Used by the type-adapter path
    /// where a primitive runs in one representation and the result is read
    /// back under the tensor's declared type.
    pub fn retyped(&self, dtype: DType) -> Result<Tensor> {
        Ok(Tensor {
            storage: self.storage.retyped(dtype)?,
            shape: self.shape.clone(),
        })
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Tensor(shape={}, dtype={}, device={})",
            self.shape,
            self.dtype(),
            self.device(),
        )
    }
}

impl fmt::Display for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(data) = self.as_f32_slice() {
            if self.numel() <= 20 {
                write!(f, "tensor({:?}, shape={})", data, self.shape)
            } else {
                write!(
                    f,
                    "tensor([{:.4}, {:.4}, ..., {:.4}], shape={})",
                    data[0],
                    data[1],
                    data[self.numel() - 1],
                    self.shape
                )
            }
        } else {
            write!(f, "tensor(shape={}, dtype={})", self.shape, self.dtype())
        }
    }
}
