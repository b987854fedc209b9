//! # axon-kernels
//!
//! NPU operator kernels for Axon, expressed over the device primitive set.
//!
//! Provides:
//! - Axis normalization shared by dimension-taking operators
//! - Concat forward and gradient (per-input slice extraction)
//! - Elementwise division and its gradients, decomposed into primitives
//! - Constant fills with capability-gated primitive selection
//! - The kernel registry (stable names and supported element types)

pub mod axis;
pub mod concat;
pub mod div;
pub mod fill;
pub mod registry;

pub use axis::normalize_axis;
pub use concat::{concat, concat_grad, slice_plan, SliceSpan};
pub use div::{elementwise_div, elementwise_div_grad};
pub use fill::{fill_constant, full, full_like, FillVariant};
pub use registry::KernelDef;
