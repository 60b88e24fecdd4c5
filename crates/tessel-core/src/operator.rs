//! Operator trait for per-op-type type inference.

use crate::Result;
use crate::context::InferenceCtx;
use crate::types::ValueType;

/// Trait for implementing operation semantics the compiler needs.
///
/// Passes that mutate a block re-run type inference afterwards; each op type
/// registers an `Operator` that computes its output types from its inputs.
///
/// # Example
///
/// ```ignore
/// struct ReluOperator;
///
/// impl Operator for ReluOperator {
///     fn name(&self) -> &str {
///         "relu"
///     }
///
///     fn infer_output_types(&self, ctx: &InferenceCtx) -> Result<Vec<ValueType>> {
///         Ok(vec![ctx.input_type("x")?.clone()])
///     }
/// }
/// ```
pub trait Operator: Send + Sync {
    /// Get the operation type this operator implements (e.g. "relu", "concat").
    fn name(&self) -> &str;

    /// Compute the output types of an operation, one per declared output.
    fn infer_output_types(&self, ctx: &InferenceCtx) -> Result<Vec<ValueType>>;
}
