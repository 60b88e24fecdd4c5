//! Context passed to operators during type inference.
//!
//! Gives read-only, slot-addressed access to an operation's input types,
//! constant input payloads, and attributes.

use crate::ir::{Block, Operation};
use crate::types::{TensorValue, ValueType};
use crate::{Error, Result};

/// Context for type inference.
pub struct InferenceCtx<'a> {
    /// The operation being processed.
    pub op: &'a Operation,

    /// The block containing the operation.
    pub block: &'a Block,
}

impl<'a> InferenceCtx<'a> {
    /// Create a new inference context.
    pub fn new(op: &'a Operation, block: &'a Block) -> Self {
        Self { op, block }
    }

    /// Get the type of the single value bound to `slot`.
    pub fn input_type(&self, slot: &str) -> Result<&'a ValueType> {
        let value = self.op.single_input(slot)?;
        Ok(&self.block.value(value)?.ty)
    }

    /// Get the types of a list slot, in order.
    pub fn list_input_types(&self, slot: &str) -> Result<Vec<&'a ValueType>> {
        self.op
            .list_input(slot)?
            .iter()
            .map(|&value| self.block.value(value).map(|v| &v.ty))
            .collect()
    }

    /// Get the constant payload bound to `slot`, if the slot holds a constant.
    pub fn input_value(&self, slot: &str) -> Option<&'a TensorValue> {
        let value = self.op.single_input(slot).ok()?;
        self.block.constant_value(value)
    }

    /// Check whether `slot` is bound.
    pub fn has_input(&self, slot: &str) -> bool {
        self.op.input(slot).is_some()
    }

    /// Number of outputs the operation declares.
    pub fn output_count(&self) -> usize {
        self.op.outputs.len()
    }

    /// Get a boolean attribute with a default.
    pub fn attr_bool_or(&self, key: &str, default: bool) -> bool {
        self.op.attr_bool(key).unwrap_or(default)
    }

    /// Get a string attribute with a default.
    pub fn attr_string_or(&self, key: &str, default: &'a str) -> &'a str {
        self.op.attr_string(key).unwrap_or(default)
    }

    /// Build a type inference error tagged with the operation.
    pub fn type_error(&self, message: impl Into<String>) -> Error {
        Error::TypeInference(format!(
            "{} ('{}'): {}",
            self.op.op_type,
            self.op.name,
            message.into()
        ))
    }
}
