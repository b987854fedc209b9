use std::fmt;

/// Data types covered by the Axon device kernels.
///
/// The set matches what the kernels register for: standard IEEE floats,
/// signed/unsigned integers, and bool (stored one byte per element).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    /// Boolean, one byte per element (0 or 1)
    Bool,
    /// 8-bit unsigned integer
    U8,
    /// 8-bit signed integer
    I8,
    /// 16-bit signed integer
    I16,
    /// 32-bit signed integer
    I32,
    /// 64-bit signed integer
    I64,
    /// 16-bit IEEE 754 half-precision float
    F16,
    /// 32-bit IEEE 754 single-precision float
    F32,
    /// 64-bit IEEE 754 double-precision float
    F64,
}

impl DType {
    /// Size in bytes of a single element.
    pub fn element_size(&self) -> usize {
        match self {
            DType::Bool | DType::U8 | DType::I8 => 1,
            DType::I16 | DType::F16 => 2,
            DType::I32 | DType::F32 => 4,
            DType::I64 | DType::F64 => 8,
        }
    }

    /// Number of bytes needed to store `n` elements of this dtype.
    pub fn storage_bytes(&self, n: usize) -> usize {
        self.element_size() * n
    }

    /// Whether this dtype is a floating-point type.
    pub fn is_float(&self) -> bool {
        matches!(self, DType::F16 | DType::F32 | DType::F64)
    }

    /// Whether this dtype is an integer type.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            DType::U8 | DType::I8 | DType::I16 | DType::I32 | DType::I64
        )
    }

    /// Whether this dtype is bool.
    pub fn is_bool(&self) -> bool {
        matches!(self, DType::Bool)
    }

    /// Vendor wire code for this dtype, used as the `dst_type` attribute of
    /// the `Cast` primitive.
    pub fn type_code(&self) -> i64 {
        match self {
            DType::F32 => 0,
            DType::F16 => 1,
            DType::I8 => 2,
            DType::I32 => 3,
            DType::U8 => 4,
            DType::I16 => 6,
            DType::I64 => 9,
            DType::F64 => 11,
            DType::Bool => 12,
        }
    }

    /// Inverse of [`type_code`](Self::type_code).
    pub fn from_type_code(code: i64) -> Option<DType> {
        match code {
            0 => Some(DType::F32),
            1 => Some(DType::F16),
            2 => Some(DType::I8),
            3 => Some(DType::I32),
            4 => Some(DType::U8),
            6 => Some(DType::I16),
            9 => Some(DType::I64),
            11 => Some(DType::F64),
            12 => Some(DType::Bool),
            _ => None,
        }
    }

    /// The `[lowest, max]` range representable by this dtype, widened to f64
    /// for comparison. Fill values outside this range are rejected.
    pub fn finite_bounds(&self) -> (f64, f64) {
        match self {
            DType::Bool => (0.0, 1.0),
            DType::U8 => (u8::MIN as f64, u8::MAX as f64),
            DType::I8 => (i8::MIN as f64, i8::MAX as f64),
            DType::I16 => (i16::MIN as f64, i16::MAX as f64),
            DType::I32 => (i32::MIN as f64, i32::MAX as f64),
            DType::I64 => (i64::MIN as f64, i64::MAX as f64),
            DType::F16 => {
                let m = half::f16::MAX.to_f64();
                (-m, m)
            }
            DType::F32 => (f32::MIN as f64, f32::MAX as f64),
            DType::F64 => (f64::MIN, f64::MAX),
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DType::Bool => write!(f, "bool"),
            DType::U8 => write!(f, "u8"),
            DType::I8 => write!(f, "i8"),
            DType::I16 => write!(f, "i16"),
            DType::I32 => write!(f, "i32"),
            DType::I64 => write!(f, "i64"),
            DType::F16 => write!(f, "f16"),
            DType::F32 => write!(f, "f32"),
            DType::F64 => write!(f, "f64"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_sizes() {
        assert_eq!(DType::F32.element_size(), 4);
        assert_eq!(DType::F64.element_size(), 8);
        assert_eq!(DType::F16.element_size(), 2);
        assert_eq!(DType::I8.element_size(), 1);
        assert_eq!(DType::Bool.element_size(), 1);
    }

    #[test]
    fn test_dtype_categories() {
        assert!(DType::F32.is_float());
        assert!(!DType::F32.is_integer());
        assert!(DType::I32.is_integer());
        assert!(DType::Bool.is_bool());
        assert!(!DType::Bool.is_integer());
    }

    #[test]
    fn test_type_code_round_trip() {
        for dt in [
            DType::Bool,
            DType::U8,
            DType::I8,
            DType::I16,
            DType::I32,
            DType::I64,
            DType::F16,
            DType::F32,
            DType::F64,
        ] {
            assert_eq!(DType::from_type_code(dt.type_code()), Some(dt));
        }
        assert_eq!(DType::from_type_code(99), None);
    }

    #[test]
    fn test_finite_bounds() {
        assert_eq!(DType::I8.finite_bounds(), (-128.0, 127.0));
        assert_eq!(DType::Bool.finite_bounds(), (0.0, 1.0));
        let (lo, hi) = DType::F16.finite_bounds();
        assert_eq!(hi, 65504.0);
        assert_eq!(lo, -65504.0);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", DType::F32), "f32");
        assert_eq!(format!("{}", DType::Bool), "bool");
    }
}
