//! # axon-core
//!
//! Core tensor primitives for the Axon NPU kernel library.
//!
//! Provides the foundational `Tensor` type with:
//! - The dtype set covered by the device kernels (Bool, U8, I8, I16, I32,
//!   I64, F16, F32, F64)
//! - Contiguous, reference-counted byte storage standing in for device memory
//! - Typed scalar values for fill/attribute plumbing

pub mod device;
pub mod dtype;
pub mod error;
pub mod scalar;
pub mod shape;
pub mod storage;
pub mod tensor;

pub use device::Device;
pub use dtype::DType;
pub use error::AxonError;
pub use scalar::Scalar;
pub use shape::Shape;
pub use storage::Storage;
pub use tensor::Tensor;

pub type Result<T> = std::result::Result<T, AxonError>;
