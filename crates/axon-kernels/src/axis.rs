use axon_core::{AxonError, Result};

/// Normalize a possibly-negative axis against an operand rank.
///
/// Accepts any axis in `[-rank, rank)`; negative values count back from the
/// last dimension, so `-1` names the innermost one. Anything outside the
/// range is an `InvalidArgument`.
///
/// ```
/// use axon_kernels::normalize_axis;
///
/// assert_eq!(normalize_axis(-1, 3).unwrap(), 2);
/// assert_eq!(normalize_axis(1, 3).unwrap(), 1);
/// assert!(normalize_axis(3, 3).is_err());
/// ```
pub fn normalize_axis(axis: i64, rank: i64) -> Result<usize> {
    if axis < -rank || axis >= rank {
        return Err(AxonError::InvalidArgument(format!(
            "axis is expected to be in range of [{}, {}), but got {}",
            -rank, rank, axis
        )));
    }
    let resolved = if axis < 0 { axis + rank } else { axis };
    Ok(resolved.max(0) as usize)
}
