//! Transpose reduction pass.
//!
//! Moves transposes through shape-preserving and axis-aware ops until they
//! meet a transpose that undoes them, then removes both. A transpose that
//! cannot be cancelled everywhere is re-inserted right before the ops that
//! need the permuted layout.
//!
//! ```text
//! x ─ transpose[1,0] ─ relu ─ transpose[1,0] ─ log      =>   x ─ relu ─ log
//! ```
//!
//! The pass runs in four steps:
//! 1. Route block outputs through temporary sinks (`sinks`)
//! 2. Walk the block and classify every op (`lattice`)
//! 3. Keep only the connected components whose removal is profitable
//!    (`decision`)
//! 4. Rewrite the kept components and re-infer types (`rewrite`)

mod axis_update;
mod decision;
mod lattice;
mod rewrite;
mod sinks;
mod strategies;

use std::collections::HashSet;

use tessel_core::{Block, OpId, OperatorRegistry, Pass, Result, Stage, ValueId};
use tracing::debug;

pub use axis_update::{AxisUpdate, AxisUpdateRegistry, BINARY_OP_TYPES};
pub use strategies::{BinaryUpdate, ConcatUpdate, PadUpdate, ReduceUpdate};

use super::type_inference::infer_block_types;
use rewrite::Rewriter;
use sinks::OutputSinks;

/// Options for `ReduceTransposesPass`.
#[derive(Debug, Clone, Default)]
pub struct ReduceTransposesConfig {
    /// Log the block at `debug` level before and after the rewrite.
    pub dump_blocks: bool,
}

/// Pass that cancels pairs of inverse transposes.
pub struct ReduceTransposesPass {
    config: ReduceTransposesConfig,
    strategies: AxisUpdateRegistry,
}

impl ReduceTransposesPass {
    /// Create the pass with the built-in axis update strategies.
    pub fn new(config: ReduceTransposesConfig) -> Self {
        Self::with_registry(config, AxisUpdateRegistry::with_defaults())
    }

    /// Create the pass with a custom strategy registry.
    pub fn with_registry(config: ReduceTransposesConfig, strategies: AxisUpdateRegistry) -> Self {
        Self { config, strategies }
    }

    /// The axis update strategies used by this pass.
    pub fn strategies(&self) -> &AxisUpdateRegistry {
        &self.strategies
    }

    /// Run the transform with the output sinks installed.
    ///
    /// The sinks are removed again whether or not the transform succeeds.
    fn transform(&self, block: &mut Block) -> Result<usize> {
        let sinks = OutputSinks::insert(block)?;
        let removed = self.transform_with_sinks(block, &sinks);
        let restored = sinks.remove(block);
        let removed = removed?;
        restored?;
        Ok(removed)
    }

    fn transform_with_sinks(&self, block: &mut Block, sinks: &OutputSinks) -> Result<usize> {
        let mut analysis = lattice::classify(block, sinks, &self.strategies)?;
        let feeds_output = |op: OpId| {
            block
                .single_output(op)
                .is_ok_and(|output| sinks.is_original_output(output))
        };
        decision::prune(&mut analysis, feeds_output);

        let starts: Vec<OpId> = analysis.cancel.keys().copied().collect();
        let mut rewriter = Rewriter::new(block, sinks, &self.strategies);
        for &start in &starts {
            rewriter.rewrite(start, &analysis)?;
        }
        Ok(starts.len())
    }
}

impl Default for ReduceTransposesPass {
    fn default() -> Self {
        Self::new(ReduceTransposesConfig::default())
    }
}

impl Pass for ReduceTransposesPass {
    fn name(&self) -> &str {
        "reduce_transposes"
    }

    fn stage(&self) -> Stage {
        Stage::Optimization
    }

    fn run(&self, block: &mut Block, registry: &OperatorRegistry) -> Result<bool> {
        if block.has_nested_blocks() {
            debug!(block = block.name(), "skipping block with nested blocks");
            return Ok(false);
        }
        if block.find_ops("transpose").is_empty() {
            return Ok(false);
        }
        if self.config.dump_blocks {
            debug!("block before reduce_transposes:\n{block}");
        }

        let used_constants = used_constants(block);
        let removed = self.transform(block)?;
        if removed > 0 {
            remove_orphaned_constants(block, &used_constants)?;
        }
        let retyped = infer_block_types(block, registry)?;

        if self.config.dump_blocks {
            debug!("block after reduce_transposes:\n{block}");
        }
        debug!(block = block.name(), removed, "reduce_transposes finished");
        Ok(removed > 0 || retyped)
    }
}

/// Constants that currently have at least one consumer.
fn used_constants(block: &Block) -> HashSet<ValueId> {
    block
        .iter_ops()
        .filter(|(_, op)| op.op_type == "const")
        .flat_map(|(_, op)| op.outputs.iter().copied())
        .filter(|&value| !block.consumers(value).is_empty())
        .collect()
}

/// Delete `const` ops whose outputs were in use before the rewrite and no
/// longer are.
fn remove_orphaned_constants(block: &mut Block, used_before: &HashSet<ValueId>) -> Result<()> {
    let orphaned: Vec<OpId> = block
        .iter_ops()
        .filter(|(_, op)| op.op_type == "const")
        .filter(|(_, op)| {
            op.outputs.iter().all(|&value| {
                used_before.contains(&value)
                    && block.consumers(value).is_empty()
                    && !block.is_block_output(value)
            })
        })
        .map(|(id, _)| id)
        .collect();
    block.remove_ops(&orphaned)
}
