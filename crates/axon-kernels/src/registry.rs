//! Kernel registry: the framework-facing names of the kernels in this
//! crate and the element types each is registered for.

use axon_core::DType;

/// One registered kernel: stable name plus supported element types.
#[derive(Debug, Clone, Copy)]
pub struct KernelDef {
    pub name: &'static str,
    pub dtypes: &'static [DType],
}

use DType::*;

pub static KERNELS: &[KernelDef] = &[
    KernelDef { name: "concat", dtypes: &[I32, I64, F32, F64] },
    KernelDef { name: "concat_grad", dtypes: &[I32, I64, F32, F64] },
    KernelDef { name: "elementwise_div", dtypes: &[F32, F64] },
    KernelDef { name: "elementwise_div_grad", dtypes: &[F32, F64] },
    KernelDef { name: "fill_constant", dtypes: &[I8, I32, I64, F32, F64, Bool] },
    KernelDef { name: "full", dtypes: &[I8, I32, I64, F32, F64, Bool] },
    KernelDef { name: "full_like", dtypes: &[F32, F64, I16, I32, I64, Bool, F16] },
];

/// Look a kernel up by its registered name.
pub fn lookup(name: &str) -> Option<&'static KernelDef> {
    KERNELS.iter().find(|k| k.name == name)
}

/// Whether `name` is registered for `dtype`.
pub fn supports(name: &str, dtype: DType) -> bool {
    lookup(name).is_some_and(|k| k.dtypes.contains(&dtype))
}
