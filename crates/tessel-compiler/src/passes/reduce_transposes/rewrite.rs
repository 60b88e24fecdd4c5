//! Graph surgery for the starting transposes that survived the decision.

use std::collections::HashSet;

use tessel_core::{Block, Error, OpId, OpSpec, Result, TensorValue, ValueId};
use tracing::debug;

use super::axis_update::AxisUpdateRegistry;
use super::lattice::{TransposeAnalysis, transpose_perm};
use super::sinks::OutputSinks;

/// Applies the rewrite for one starting transpose at a time.
///
/// The guard sets persist across starting transposes: an op reached from two
/// starts of the same component is rewritten once.
pub(super) struct Rewriter<'a> {
    block: &'a mut Block,
    sinks: &'a OutputSinks,
    strategies: &'a AxisUpdateRegistry,
    ops_updated: HashSet<OpId>,
    removed: HashSet<OpId>,
    materialized: HashSet<(OpId, ValueId)>,
    /// Values that already took over the name of a block output.
    renamed: HashSet<ValueId>,
}

impl<'a> Rewriter<'a> {
    pub(super) fn new(
        block: &'a mut Block,
        sinks: &'a OutputSinks,
        strategies: &'a AxisUpdateRegistry,
    ) -> Self {
        Self {
            block,
            sinks,
            strategies,
            ops_updated: HashSet::new(),
            removed: HashSet::new(),
            materialized: HashSet::new(),
            renamed: HashSet::new(),
        }
    }

    /// Remove `start` and its cancels, re-parameterize the axis updates it
    /// passes through and insert transposes at its materialization points.
    pub(super) fn rewrite(&mut self, start: OpId, analysis: &TransposeAnalysis) -> Result<()> {
        let start_op = self.block.op(start)?;
        let perm = transpose_perm(self.block, start)?.ok_or_else(|| {
            Error::InvalidGraph(format!(
                "Starting transpose '{}' has no constant permutation",
                start_op.name
            ))
        })?;
        let start_input = start_op.single_input("x")?;
        let start_output = self.block.single_output(start)?;

        for &op in analysis.axis_update.get(&start).into_iter().flatten() {
            if !self.ops_updated.insert(op) {
                continue;
            }
            let updated = self.block.op(op)?;
            let op_type = updated.op_type.clone();
            debug!(op = %updated.name, %op_type, ?perm, "update axes");
            self.strategies
                .require(&op_type)?
                .apply(self.block, op, &perm)?;
        }

        let cancels = analysis.cancel.get(&start).into_iter().flatten().copied();
        let mut doomed = Vec::new();
        for op in std::iter::once(start).chain(cancels) {
            if !self.removed.insert(op) {
                continue;
            }
            self.splice(op)?;
            doomed.push(op);
        }

        for &(consumer, value) in analysis.materialize.get(&start).into_iter().flatten() {
            if !self.materialized.insert((consumer, value)) {
                continue;
            }
            let source = if value == start_output {
                if self.sinks.contains(consumer) {
                    continue;
                }
                start_input
            } else {
                value
            };
            self.materialize(consumer, source, &perm)?;
        }

        self.block.remove_ops(&doomed)
    }

    /// Route every use of a transpose's output to its input.
    ///
    /// If the output was a block output, the input takes over its name. When
    /// the input has no producer, already carries an output name or is a
    /// block output itself, an identity op is inserted to carry the name.
    fn splice(&mut self, op: OpId) -> Result<()> {
        let transpose = self.block.op(op)?;
        let op_name = transpose.name.clone();
        let input = transpose.single_input("x")?;
        let output = self.block.single_output(op)?;
        debug!(op = %op_name, "remove transpose");

        let (replacement, anchor) = if self.sinks.is_original_output(output) {
            let name = self.block.value_name(output)?.to_string();
            let released = self.block.unique_value_name(&format!("{name}_spliced"));
            self.block.rename_value(output, released)?;

            match self.block.producer(input) {
                Some(producer)
                    if !self.renamed.contains(&input) && !self.sinks.is_original_output(input) =>
                {
                    self.block.rename_value(input, name)?;
                    self.block.rename_op(producer, op_name)?;
                    self.renamed.insert(input);
                    (input, Some(producer))
                }
                _ => {
                    let ty = self.block.value(output)?.ty.clone();
                    let identity = self.block.insert_op_before(
                        op,
                        OpSpec::new("identity", name.clone())
                            .input("x", input)
                            .output(name, ty),
                    )?;
                    (self.block.single_output(identity)?, Some(identity))
                }
            }
        } else {
            (input, self.block.producer(input))
        };

        self.block
            .replace_uses_after(anchor, None, output, replacement, false)?;
        Ok(())
    }

    /// Insert `transpose(source, perm)` right before `consumer` and rewire
    /// the consumer to it.
    fn materialize(&mut self, consumer: OpId, source: ValueId, perm: &[usize]) -> Result<()> {
        let source_name = self.block.value_name(source)?.to_string();
        let name = if !self.sinks.contains(consumer) {
            self.block
                .unique_value_name(&format!("{source_name}_transposed"))
        } else if !self.renamed.contains(&source) {
            // the new transpose becomes the block output, so it takes the name
            let released = self
                .block
                .unique_value_name(&format!("_before_transpose_op_{source_name}"));
            self.block.rename_value(source, released.clone())?;
            if let Some(producer) = self.block.producer(source) {
                self.block.rename_op(producer, released)?;
            }
            source_name
        } else {
            match self.sinks.original_name(source) {
                Some(original) => self.block.unique_value_name(original),
                None => self
                    .block
                    .unique_value_name(&format!("{source_name}_transposed")),
            }
        };
        let consumer_name = &self.block.op(consumer)?.name;
        debug!(transpose = %name, consumer = %consumer_name, ?perm, "materialize");

        let ty = self.block.value(source)?.ty.transposed(perm);
        let perm_name = self.block.unique_value_name(&format!("{name}_perm"));
        let perm_value = self.block.insert_const_before(
            consumer,
            perm_name,
            TensorValue::from_i64s(perm.iter().map(|&p| p as i64).collect()),
        )?;
        let transpose = self.block.insert_op_before(
            consumer,
            OpSpec::new("transpose", name.clone())
                .input("x", source)
                .input("perm", perm_value)
                .output(name, ty),
        )?;
        let transposed = self.block.single_output(transpose)?;
        self.block
            .replace_uses_after(Some(transpose), Some(consumer), source, transposed, false)?;
        Ok(())
    }
}
