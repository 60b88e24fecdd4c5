//! Type inference pass.
//!
//! Forward pass in topological order that calls
//! `operator.infer_output_types()` for each op and overwrites the cached
//! output types.

use tessel_core::{
    Block, Error, InferenceCtx, OpId, OperatorRegistry, Pass, Result, Stage, ValueType,
};
use tracing::trace;

/// Pass that infers output types for all operations in a block.
///
/// Op types with no registered operator keep their cached output types.
pub struct TypeInferencePass;

impl TypeInferencePass {
    /// Create a new type inference pass.
    pub fn new() -> Self {
        Self
    }
}

impl Pass for TypeInferencePass {
    fn name(&self) -> &str {
        "type_inference"
    }

    fn stage(&self) -> Stage {
        Stage::Inference
    }

    fn run(&self, block: &mut Block, registry: &OperatorRegistry) -> Result<bool> {
        infer_block_types(block, registry)
    }
}

impl Default for TypeInferencePass {
    fn default() -> Self {
        Self::new()
    }
}

/// Re-run type inference over every op of `block`, in order.
///
/// Returns `true` if any output type changed.
pub fn infer_block_types(block: &mut Block, registry: &OperatorRegistry) -> Result<bool> {
    let order: Vec<OpId> = block.operations().to_vec();
    let mut changed = false;
    for op_id in order {
        changed |= infer_op(block, op_id, registry)?;
    }
    Ok(changed)
}

/// Infer types for a single op.
fn infer_op(block: &mut Block, op_id: OpId, registry: &OperatorRegistry) -> Result<bool> {
    let op = block.op(op_id)?;
    let Some(operator) = registry.get(&op.op_type) else {
        trace!(op = %op.name, op_type = %op.op_type, "no operator registered, keeping cached types");
        return Ok(false);
    };

    let types: Vec<ValueType> = operator
        .infer_output_types(&InferenceCtx::new(op, block))
        .map_err(|e| {
            Error::TypeInference(format!(
                "Failed to infer types for op '{}' (op_type: {}): {}",
                op.name, op.op_type, e
            ))
        })?;

    if types.len() != op.outputs.len() {
        return Err(Error::TypeInference(format!(
            "Operator {} returned {} output types but op '{}' has {} outputs",
            op.op_type,
            types.len(),
            op.name,
            op.outputs.len()
        )));
    }

    let outputs = op.outputs.clone();
    let mut changed = false;
    for (value, ty) in outputs.into_iter().zip(types) {
        if block.value(value)?.ty != ty {
            block.set_value_type(value, ty)?;
            changed = true;
        }
    }
    Ok(changed)
}
