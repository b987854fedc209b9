use std::fmt;

/// A typed scalar value, used for fill values and kernel attributes.
///
/// Conversions are lossy in the same way the framework scalar is: `to_i64`
/// truncates floats, `to_bool` is a non-zero test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Bool(bool),
    I64(i64),
    F64(f64),
}

impl Scalar {
    pub fn to_f64(self) -> f64 {
        match self {
            Scalar::Bool(b) => b as u8 as f64,
            Scalar::I64(v) => v as f64,
            Scalar::F64(v) => v,
        }
    }

    pub fn to_f32(self) -> f32 {
        self.to_f64() as f32
    }

    pub fn to_i64(self) -> i64 {
        match self {
            Scalar::Bool(b) => b as i64,
            Scalar::I64(v) => v,
            Scalar::F64(v) => v as i64,
        }
    }

    pub fn to_bool(self) -> bool {
        match self {
            Scalar::Bool(b) => b,
            Scalar::I64(v) => v != 0,
            Scalar::F64(v) => v != 0.0,
        }
    }

    /// Whether this scalar holds a floating-point NaN.
    pub fn is_nan(self) -> bool {
        matches!(self, Scalar::F64(v) if v.is_nan())
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::I64(v) => write!(f, "{v}"),
            Scalar::F64(v) => write!(f, "{v}"),
        }
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::I64(v as i64)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::I64(v)
    }
}

impl From<f32> for Scalar {
    fn from(v: f32) -> Self {
        Scalar::F64(v as f64)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::F64(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        assert_eq!(Scalar::from(3.7f64).to_i64(), 3);
        assert_eq!(Scalar::from(-2i32).to_f64(), -2.0);
        assert_eq!(Scalar::from(true).to_f64(), 1.0);
        assert!(Scalar::from(1i64).to_bool());
        assert!(!Scalar::from(0.0f32).to_bool());
    }

    #[test]
    fn test_nan() {
        assert!(Scalar::from(f64::NAN).is_nan());
        assert!(!Scalar::from(1.0f64).is_nan());
        assert!(!Scalar::from(1i64).is_nan());
    }
}
