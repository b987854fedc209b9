use std::sync::Arc;

use crate::{AxonError, DType, Device, Result};

/// Backing storage for tensor data.
///
/// Storage is reference-counted (`Arc`) so multiple tensors can share the
/// same underlying bytes; mutation is copy-on-write. In this reference
/// runtime "device memory" is host memory tagged with the device, so the
/// executor reads and writes these buffers directly.
#[derive(Debug, Clone)]
pub struct Storage {
    data: Arc<Vec<u8>>,
    dtype: DType,
    device: Device,
    /// Number of logical elements (not bytes).
    numel: usize,
}

impl Storage {
    /// Allocate new zeroed storage for `numel` elements of the given dtype.
    pub fn zeros(dtype: DType, numel: usize) -> Self {
        let nbytes = dtype.storage_bytes(numel);
        Self {
            data: Arc::new(vec![0u8; nbytes]),
            dtype,
            device: Device::Npu(0),
            numel,
        }
    }

    /// Create storage from raw bytes.
    pub fn from_bytes(dtype: DType, numel: usize, bytes: Vec<u8>) -> Result<Self> {
        let expected = dtype.storage_bytes(numel);
        if bytes.len() != expected {
            return Err(AxonError::StorageError(format!(
                "expected {} bytes for {} elements of {}, got {}",
                expected,
                numel,
                dtype,
                bytes.len()
            )));
        }
        Ok(Self {
            data: Arc::new(bytes),
            dtype,
            device: Device::Npu(0),
            numel,
        })
    }

    /// Create storage from a slice of f32 values.
    pub fn from_f32(data: &[f32]) -> Self {
        let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_ne_bytes()).collect();
        Self {
            data: Arc::new(bytes),
            dtype: DType::F32,
            device: Device::Npu(0),
            numel: data.len(),
        }
    }

    /// Create storage from a slice of f64 values.
    pub fn from_f64(data: &[f64]) -> Self {
        let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_ne_bytes()).collect();
        Self {
            data: Arc::new(bytes),
            dtype: DType::F64,
            device: Device::Npu(0),
            numel: data.len(),
        }
    }

    /// Create storage from a slice of i32 values.
    pub fn from_i32(data: &[i32]) -> Self {
        let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_ne_bytes()).collect();
        Self {
            data: Arc::new(bytes),
            dtype: DType::I32,
            device: Device::Npu(0),
            numel: data.len(),
        }
    }

    /// Create storage from a slice of i64 values.
    pub fn from_i64(data: &[i64]) -> Self {
        let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_ne_bytes()).collect();
        Self {
            data: Arc::new(bytes),
            dtype: DType::I64,
            device: Device::Npu(0),
            numel: data.len(),
        }
    }

    /// Get the dtype of this storage.
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Get the device of this storage.
    pub fn device(&self) -> Device {
        self.device
    }

    /// Number of logical elements.
    pub fn numel(&self) -> usize {
        self.numel
    }

    /// Size in bytes.
    pub fn nbytes(&self) -> usize {
        self.data.len()
    }

    /// Get a read-only reference to the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Get a mutable reference to the raw bytes.
    /// Clones the underlying data if there are other references (copy-on-write).
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        Arc::make_mut(&mut self.data).as_mut_slice()
    }

    /// Reinterpret this storage under a different dtype of the same element
    /// size. The bytes are untouched; only the declared type changes.
    pub fn retyped(&self, dtype: DType) -> Result<Storage> {
        if dtype.element_size() != self.dtype.element_size() {
            return Err(AxonError::DTypeMismatch {
                expected: self.dtype,
                got: dtype,
            });
        }
        Ok(Storage {
            data: Arc::clone(&self.data),
            dtype,
            device: self.device,
            numel: self.numel,
        })
    }

    /// Whether this storage is uniquely owned (no other Arc references).
    pub fn is_unique(&self) -> bool {
        Arc::strong_count(&self.data) == 1
    }

    /// Interpret storage as a slice of f32 values.
    pub fn as_f32_slice(&self) -> Option<&[f32]> {
        if self.dtype != DType::F32 {
            return None;
        }
        Some(cast_or_empty(self.as_bytes()))
    }

    /// Interpret storage as a mutable slice of f32 values (copy-on-write).
    pub fn as_f32_slice_mut(&mut self) -> Option<&mut [f32]> {
        if self.dtype != DType::F32 {
            return None;
        }
        Some(cast_mut_or_empty(self.as_bytes_mut()))
    }

    /// Interpret storage as a slice of f64 values.
    pub fn as_f64_slice(&self) -> Option<&[f64]> {
        if self.dtype != DType::F64 {
            return None;
        }
        Some(cast_or_empty(self.as_bytes()))
    }

    /// Interpret storage as a mutable slice of f64 values (copy-on-write).
    pub fn as_f64_slice_mut(&mut self) -> Option<&mut [f64]> {
        if self.dtype != DType::F64 {
            return None;
        }
        Some(cast_mut_or_empty(self.as_bytes_mut()))
    }

    /// Interpret storage as a slice of i32 values.
    pub fn as_i32_slice(&self) -> Option<&[i32]> {
        if self.dtype != DType::I32 {
            return None;
        }
        Some(cast_or_empty(self.as_bytes()))
    }

    /// Interpret storage as a slice of i64 values.
    pub fn as_i64_slice(&self) -> Option<&[i64]> {
        if self.dtype != DType::I64 {
            return None;
        }
        Some(cast_or_empty(self.as_bytes()))
    }

    /// Interpret storage as a slice of single-byte unsigned values.
    /// Valid for both `U8` and `Bool` (bool is stored as 0/1 bytes).
    pub fn as_u8_slice(&self) -> Option<&[u8]> {
        if !matches!(self.dtype, DType::U8 | DType::Bool) {
            return None;
        }
        Some(self.as_bytes())
    }
}

/// `bytemuck::cast_slice` with an explicit empty-slice path: an empty Vec's
/// dangling pointer is only 1-aligned and would fail the alignment check.
fn cast_or_empty<T: bytemuck::Pod>(bytes: &[u8]) -> &[T] {
    if bytes.is_empty() {
        &[]
    } else {
        bytemuck::cast_slice(bytes)
    }
}

fn cast_mut_or_empty<T: bytemuck::Pod>(bytes: &mut [u8]) -> &mut [T] {
    if bytes.is_empty() {
        &mut []
    } else {
        bytemuck::cast_slice_mut(bytes)
    }
}
