//! Graph optimization passes for tessel programs.
//!
//! The compiler is organized as a pipeline of passes that run in stages:
//! 1. **Inference** - Propagate value types through every block
//! 2. **Optimization** - Rewrite blocks (transpose reduction, custom passes)
//!
//! Each pass runs once per function of the program.
//!
//! # Example
//!
//! ```ignore
//! use tessel_compiler::CompilerPipeline;
//! use tessel_operators::core_operator_registry;
//!
//! let registry = core_operator_registry();
//! let mut pipeline = CompilerPipeline::new();
//! let changed = pipeline.run(&mut program, &registry)?;
//! ```

pub mod passes;

pub use passes::{
    AxisUpdate, AxisUpdateRegistry, BinaryUpdate, ConcatUpdate, PadUpdate, ReduceTransposesConfig,
    ReduceTransposesPass, ReduceUpdate, TypeInferencePass, infer_block_types,
};

// Re-export commonly used types from tessel-core
pub use tessel_core::{Error, Pass, Program, Result, Stage};

use tessel_core::OperatorRegistry;

/// Compiler pipeline with pluggable passes.
///
/// Passes run in stage order (Inference → Optimization); within a stage they
/// run in registration order. Built-in passes are registered by `new()`, and
/// custom passes can be added via `add_pass()`.
pub struct CompilerPipeline {
    /// All passes to run, ordered by (stage, registration order) before each run.
    passes: Vec<Box<dyn Pass>>,
}

impl CompilerPipeline {
    /// Create a pipeline with the built-in passes:
    /// - `TypeInferencePass` (Inference stage)
    /// - `ReduceTransposesPass` (Optimization stage)
    pub fn new() -> Self {
        let mut pipeline = Self::empty();
        pipeline
            .add_pass(TypeInferencePass::new())
            .add_pass(ReduceTransposesPass::default());
        pipeline
    }

    /// Create a pipeline with no passes.
    pub fn empty() -> Self {
        Self { passes: Vec::new() }
    }

    /// Add a pass to the pipeline.
    ///
    /// The pass will run in the stage reported by `pass.stage()`.
    ///
    /// # Returns
    ///
    /// Returns a mutable reference to self for method chaining.
    pub fn add_pass(&mut self, pass: impl Pass + 'static) -> &mut Self {
        self.passes.push(Box::new(pass));
        self
    }

    /// Names of the registered passes, in execution order.
    pub fn pass_names(&mut self) -> Vec<&str> {
        self.passes.sort_by_key(|p| p.stage());
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Run every pass over every function of `program`.
    ///
    /// Returns `true` if any pass changed any function.
    ///
    /// # Errors
    ///
    /// Stops at the first failing pass; functions visited before the failure
    /// keep their changes.
    #[tracing::instrument(skip_all, fields(num_functions = program.functions.len()))]
    pub fn run(&mut self, program: &mut Program, registry: &OperatorRegistry) -> Result<bool> {
        // `sort_by_key` is stable, so registration order survives within a stage
        self.passes.sort_by_key(|p| p.stage());

        let mut changed = false;
        for pass in &self.passes {
            let _span =
                tracing::debug_span!("pass", name = pass.name(), stage = ?pass.stage()).entered();
            for (name, block) in program.functions.iter_mut() {
                let block_changed = pass.run(block, registry)?;
                tracing::trace!(function = %name, changed = block_changed, "pass finished");
                changed |= block_changed;
            }
        }
        Ok(changed)
    }
}

impl Default for CompilerPipeline {
    fn default() -> Self {
        Self::new()
    }
}
