use crate::dtype::DType;

/// Errors surfaced by tensor construction and kernel invocation.
#[derive(Debug, thiserror::Error)]
pub enum AxonError {
    /// A caller-supplied value failed validation (axis range, fill range,
    /// NaN fill, negative dims). Raised before any device work is issued.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    #[error("dtype mismatch: expected {expected}, got {got}")]
    DTypeMismatch { expected: DType, got: DType },

    #[error("unsupported dtype: {0}")]
    UnsupportedDType(DType),

    #[error("storage error: {0}")]
    StorageError(String),

    /// Opaque failure from the primitive operator dispatch. Not recovered
    /// locally; aborts the whole kernel invocation.
    #[error("dispatch of '{op}' failed: {msg}")]
    Dispatch { op: String, msg: String },
}
