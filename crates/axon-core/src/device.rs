use std::fmt;

/// Compute device a tensor lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Device {
    /// Host memory
    #[default]
    Host,
    /// NPU device with index
    Npu(usize),
}

impl Device {
    /// Whether this is the host.
    pub fn is_host(&self) -> bool {
        matches!(self, Device::Host)
    }

    /// Whether this is an NPU device.
    pub fn is_npu(&self) -> bool {
        matches!(self, Device::Npu(_))
    }

    /// Get the NPU device index, if applicable.
    pub fn npu_index(&self) -> Option<usize> {
        match self {
            Device::Npu(idx) => Some(*idx),
            _ => None,
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Host => write!(f, "host"),
            Device::Npu(idx) => write!(f, "npu:{idx}"),
        }
    }
}
