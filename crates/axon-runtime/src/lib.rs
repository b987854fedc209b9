//! # axon-runtime
//!
//! Reference NPU runtime for the Axon kernel library.
//!
//! Provides:
//! - Device context with allocation and capability/version queries
//! - A single in-order execution stream per context
//! - The `OpCommand` builder for primitive operator invocations
//!   (name + ordered inputs/outputs + named attributes)
//! - A host-side reference executor that interprets the primitive set
//!
//! Kernels build `OpCommand`s and run them on the context's stream; the
//! stream preserves program order, so a later primitive always observes the
//! effects of earlier ones.

pub mod context;
pub mod exec;
pub mod op;
pub mod stream;

pub use context::{NpuContext, DEFAULT_DRIVER_VERSION};
pub use op::{with_retyped_output, AttrValue, OpCommand};
pub use stream::Stream;
