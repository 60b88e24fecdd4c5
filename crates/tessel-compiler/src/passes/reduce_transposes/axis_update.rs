//! Axis update strategies.
//!
//! An axis update op can be re-parameterized so that a transpose on its
//! inputs moves to its output:
//!
//! ```text
//! op(transpose(x, perm)) == transpose(op'(x), perm)
//! ```
//!
//! For example, with `perm = [1, 0]`:
//!
//! ```text
//! reduce_mean[axes=[1]](transpose(x)) == transpose(reduce_mean[axes=[0]](x))
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use tessel_core::{Block, Error, OpId, Result};
use tessel_operators::ReductionOp;

use super::strategies::{BinaryUpdate, ConcatUpdate, PadUpdate, ReduceUpdate};

/// Binary elementwise op types that share `BinaryUpdate`.
pub const BINARY_OP_TYPES: &[&str] = &["add", "mul", "sub", "real_div", "maximum", "minimum"];

/// Re-parameterization rule for one family of axis-sensitive ops.
pub trait AxisUpdate: Send + Sync {
    /// Check whether a transpose by `perm` on the non-constant inputs of `op`
    /// can move past it. Must not mutate anything.
    fn can_pass_through(&self, block: &Block, op: OpId, perm: &[usize]) -> Result<bool>;

    /// Rewrite the constant operands of `op` so that it computes the
    /// un-transposed result. Only called after `can_pass_through` accepted
    /// the same `perm`.
    fn apply(&self, block: &mut Block, op: OpId, perm: &[usize]) -> Result<()>;
}

/// Registry of axis update strategies keyed by op type.
///
/// Several op types may share one strategy (aliases).
///
/// # Example
///
/// ```ignore
/// let mut registry = AxisUpdateRegistry::new();
/// registry
///     .register("reduce_mean", ReduceUpdate)?
///     .register_alias("reduce_sum", "reduce_mean")?;
/// ```
pub struct AxisUpdateRegistry {
    strategies: HashMap<String, Arc<dyn AxisUpdate>>,
}

impl AxisUpdateRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }

    /// Create a registry with the built-in strategies: concat, pad, the
    /// reduction family and the binary elementwise family.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.insert("concat", Arc::new(ConcatUpdate));
        registry.insert("pad", Arc::new(PadUpdate));

        let reduce: Arc<dyn AxisUpdate> = Arc::new(ReduceUpdate);
        for &op_type in ReductionOp::OP_TYPES {
            registry.insert(op_type, reduce.clone());
        }
        let binary: Arc<dyn AxisUpdate> = Arc::new(BinaryUpdate);
        for &op_type in BINARY_OP_TYPES {
            registry.insert(op_type, binary.clone());
        }
        registry
    }

    fn insert(&mut self, op_type: &str, strategy: Arc<dyn AxisUpdate>) {
        self.strategies.insert(op_type.to_string(), strategy);
    }

    /// Register a strategy for `op_type`.
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateStrategy` if `op_type` already has one.
    pub fn register<S>(&mut self, op_type: &str, strategy: S) -> Result<&mut Self>
    where
        S: AxisUpdate + 'static,
    {
        if self.contains(op_type) {
            return Err(Error::DuplicateStrategy(op_type.to_string()));
        }
        self.insert(op_type, Arc::new(strategy));
        Ok(self)
    }

    /// Make `alias` share the strategy registered for `op_type`.
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateStrategy` if `alias` is already registered and
    /// `Error::MissingStrategy` if `op_type` is not.
    pub fn register_alias(&mut self, alias: &str, op_type: &str) -> Result<&mut Self> {
        if self.contains(alias) {
            return Err(Error::DuplicateStrategy(alias.to_string()));
        }
        let strategy = self
            .strategies
            .get(op_type)
            .cloned()
            .ok_or_else(|| Error::MissingStrategy(op_type.to_string()))?;
        self.insert(alias, strategy);
        Ok(self)
    }

    /// Look up the strategy for an op type.
    pub fn get(&self, op_type: &str) -> Option<&dyn AxisUpdate> {
        self.strategies.get(op_type).map(|s| s.as_ref())
    }

    /// Check if an op type has a strategy.
    pub fn contains(&self, op_type: &str) -> bool {
        self.strategies.contains_key(op_type)
    }

    /// Look up the strategy for an op type, failing if there is none.
    pub(super) fn require(&self, op_type: &str) -> Result<&dyn AxisUpdate> {
        self.get(op_type)
            .ok_or_else(|| Error::MissingStrategy(op_type.to_string()))
    }

    /// Get the number of registered op types.
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl Default for AxisUpdateRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
