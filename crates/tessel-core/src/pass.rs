//! Compiler pass trait and stage definitions.

use crate::Result;
use crate::ir::Block;
use crate::registry::OperatorRegistry;

/// Compilation stage for organizing passes.
///
/// Passes are grouped into stages and run in a fixed order. Within each stage,
/// passes run in the order they were registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// Type inference (propagate value types through each block).
    ///
    /// Passes in this stage call `Operator::infer_output_types()` for each
    /// op in topological order.
    Inference,

    /// Graph rewriting and optimization (transpose reduction, fusion, etc.).
    ///
    /// Passes in this stage mutate blocks and are responsible for leaving
    /// output types consistent with the rewritten graph.
    Optimization,
}

/// Trait for implementing compiler passes.
///
/// A pass transforms one block at a time; the pipeline runs it over every
/// function of a program.
///
/// # Return Value
///
/// `run()` returns `Ok(true)` if the pass changed the block and `Ok(false)`
/// otherwise.
///
/// # Example
///
/// ```ignore
/// struct NoOpPass;
///
/// impl Pass for NoOpPass {
///     fn name(&self) -> &str {
///         "noop"
///     }
///
///     fn stage(&self) -> Stage {
///         Stage::Optimization
///     }
///
///     fn run(&self, block: &mut Block, registry: &OperatorRegistry) -> Result<bool> {
///         Ok(false)
///     }
/// }
/// ```
pub trait Pass: Send + Sync {
    /// Get the pass name (used for logging and debugging).
    fn name(&self) -> &str;

    /// Get the compilation stage this pass belongs to.
    fn stage(&self) -> Stage;

    /// Run the pass on one block.
    fn run(&self, block: &mut Block, registry: &OperatorRegistry) -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoOpPass;

    impl Pass for NoOpPass {
        fn name(&self) -> &str {
            "noop"
        }

        fn stage(&self) -> Stage {
            Stage::Optimization
        }

        fn run(&self, _block: &mut Block, _registry: &OperatorRegistry) -> Result<bool> {
            Ok(false)
        }
    }

    #[test]
    fn test_pass_trait() {
        let pass: Box<dyn Pass> = Box::new(NoOpPass);
        assert_eq!(pass.name(), "noop");
        assert_eq!(pass.stage(), Stage::Optimization);
        let mut block = Block::new("main");
        assert!(!pass.run(&mut block, &OperatorRegistry::new()).unwrap());
    }

    #[test]
    fn test_stage_ordering() {
        assert!(Stage::Inference < Stage::Optimization);
    }
}
