//! Common test utilities for operator tests.

use tessel_core::{Block, DataType, OpId, OpSpec, Result, TensorValue, ValueId, ValueType};
use tessel_operators::core_operator_registry;

pub use tessel_core::InferenceCtx;

pub fn f32_type(dims: &[usize]) -> ValueType {
    ValueType::new(DataType::F32, dims.to_vec())
}

/// Create a block with one fp32 input named `x`.
pub fn block_with_input(dims: &[usize]) -> (Block, ValueId) {
    let mut block = Block::new("main");
    let x = block.add_input("x", f32_type(dims)).unwrap();
    (block, x)
}

/// Append an int64 constant.
pub fn push_ints(block: &mut Block, name: &str, values: &[i64]) -> ValueId {
    block
        .push_const(name, TensorValue::from_i64s(values.to_vec()))
        .unwrap()
}

/// Append `spec` with a single output of unknown type and return the op.
pub fn push_untyped(block: &mut Block, spec: OpSpec, output: &str) -> OpId {
    block
        .push_op(spec.output(output, ValueType::unknown(DataType::F32)))
        .unwrap()
}

/// Run the registered operator's type inference for `op`.
pub fn infer(block: &Block, op: OpId) -> Result<Vec<ValueType>> {
    let registry = core_operator_registry();
    let op = block.op(op)?;
    let operator = registry
        .get(&op.op_type)
        .unwrap_or_else(|| panic!("no operator registered for {}", op.op_type));
    operator.infer_output_types(&InferenceCtx::new(op, block))
}
