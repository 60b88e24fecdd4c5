//! Operator registry for dynamic dispatch.

use crate::operator::Operator;
use std::collections::HashMap;

/// Registry for operator implementations.
///
/// Maps operation type names (e.g. "relu", "reduce_mean") to their
/// `Operator` implementations, so passes can re-run type inference on any op
/// without knowing its type statically.
///
/// # Example
///
/// ```ignore
/// let mut registry = OperatorRegistry::new();
/// registry
///     .register("add", BinaryElementwiseOp::add())
///     .register("mul", BinaryElementwiseOp::mul());
///
/// let op = registry.get("add").unwrap();
/// ```
pub struct OperatorRegistry {
    /// Map from op_type string to operator implementation.
    operators: HashMap<String, Box<dyn Operator>>,
}

impl OperatorRegistry {
    /// Create a new empty operator registry.
    pub fn new() -> Self {
        Self {
            operators: HashMap::new(),
        }
    }

    /// Register an operator, replacing any previous one for `name`.
    ///
    /// Returns `self` for method chaining.
    pub fn register<O>(&mut self, name: &str, operator: O) -> &mut Self
    where
        O: Operator + 'static,
    {
        self.operators.insert(name.to_string(), Box::new(operator));
        self
    }

    /// Look up an operator by op type.
    pub fn get(&self, name: &str) -> Option<&dyn Operator> {
        self.operators.get(name).map(|op| op.as_ref())
    }

    /// Check if an operator is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.operators.contains_key(name)
    }

    /// Get the number of registered operators.
    pub fn len(&self) -> usize {
        self.operators.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    /// Iterate over all registered op types.
    pub fn operator_names(&self) -> impl Iterator<Item = &str> {
        self.operators.keys().map(|s| s.as_str())
    }
}

impl Default for OperatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
