//! Compiler passes for graph transformation.

mod reduce_transposes;
mod type_inference;

pub use reduce_transposes::{
    AxisUpdate, AxisUpdateRegistry, BINARY_OP_TYPES, BinaryUpdate, ConcatUpdate, PadUpdate,
    ReduceTransposesConfig, ReduceTransposesPass, ReduceUpdate,
};
pub use type_inference::{TypeInferencePass, infer_block_types};
