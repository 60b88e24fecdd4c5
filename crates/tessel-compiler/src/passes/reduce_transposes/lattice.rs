//! Abstract interpretation of transposes over a block.
//!
//! Every value gets a `HypotheticalValue` while the block is walked in
//! topological order. A value is either plain, or it equals some plain value
//! with a permutation logically applied by transposes that have not been
//! materialized yet. Each op is classified on the way, and the walk records
//! which starting transposes each op cancels, materializes or re-parameterizes.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tessel_core::permutation::{perm_from_value, transposes_cancel};
use tessel_core::{Block, Error, OpId, Result, ValueId};
use tessel_operators::UNARY_OP_TYPES;
use tracing::trace;

use super::axis_update::AxisUpdateRegistry;
use super::sinks::OutputSinks;

/// The abstract value of a single value during the walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum HypotheticalValue {
    /// Not a pending transpose.
    Plain(ValueId),

    /// `wrapped` with `perm` logically applied by the transposes in `origins`.
    ///
    /// Every origin is a starting transpose with this exact `perm`, and
    /// `wrapped` is always plain.
    LazyTranspose {
        wrapped: ValueId,
        origins: BTreeSet<OpId>,
        perm: Vec<usize>,
    },
}

/// Per-starting-transpose findings of the walk.
///
/// Keys are starting transposes. Maps are ordered so the rewrite visits
/// starting transposes deterministically.
#[derive(Debug, Default)]
pub(super) struct TransposeAnalysis {
    /// Downstream transposes that undo the starting transpose.
    pub(super) cancel: BTreeMap<OpId, Vec<OpId>>,

    /// `(consumer, value)` edges where the permutation must be made concrete.
    pub(super) materialize: BTreeMap<OpId, Vec<(OpId, ValueId)>>,

    /// Axis update ops the permutation passes through.
    pub(super) axis_update: BTreeMap<OpId, Vec<OpId>>,
}

/// Read the constant permutation of a `transpose` op.
///
/// Returns `None` for a runtime or malformed `perm`.
pub(super) fn transpose_perm(block: &Block, op: OpId) -> Result<Option<Vec<usize>>> {
    let perm = block.op(op)?.single_input("perm")?;
    Ok(block.constant_value(perm).and_then(perm_from_value))
}

/// Walk `block` and collect the transpose analysis.
///
/// `sinks` must already be installed.
pub(super) fn classify(
    block: &Block,
    sinks: &OutputSinks,
    strategies: &AxisUpdateRegistry,
) -> Result<TransposeAnalysis> {
    let mut classifier = Classifier {
        block,
        sinks,
        strategies,
        values: HashMap::new(),
        analysis: TransposeAnalysis::default(),
    };
    for &input in block.inputs() {
        classifier.values.insert(input, HypotheticalValue::Plain(input));
    }
    for &op in block.operations() {
        classifier.visit(op)?;
    }
    Ok(classifier.analysis)
}

struct Classifier<'a> {
    block: &'a Block,
    sinks: &'a OutputSinks,
    strategies: &'a AxisUpdateRegistry,
    values: HashMap<ValueId, HypotheticalValue>,
    analysis: TransposeAnalysis,
}

impl Classifier<'_> {
    fn hypothetical(&self, value: ValueId) -> &HypotheticalValue {
        self.values.get(&value).unwrap_or_else(|| {
            panic!("value {value:?} is consumed before it has an abstract value")
        })
    }

    fn visit(&mut self, op: OpId) -> Result<()> {
        let op_type = self.block.op(op)?.op_type.as_str();
        if self.sinks.contains(op) {
            self.visit_materialize(op)
        } else if UNARY_OP_TYPES.contains(&op_type) {
            self.visit_unary(op)
        } else if self.strategies.contains(op_type) {
            self.visit_axis_update(op)
        } else if op_type == "transpose" {
            self.visit_transpose(op)
        } else if op_type == "const" {
            self.set_plain_outputs(op)
        } else {
            self.visit_materialize(op)
        }
    }

    fn set_plain_outputs(&mut self, op: OpId) -> Result<()> {
        for &output in &self.block.op(op)?.outputs {
            self.values.insert(output, HypotheticalValue::Plain(output));
        }
        Ok(())
    }

    fn visit_unary(&mut self, op: OpId) -> Result<()> {
        let operation = self.block.op(op)?;
        let [output] = operation.outputs[..] else {
            return Err(Error::InvalidGraph(format!(
                "Unary op '{}' ({}) has {} outputs, expected 1",
                operation.name,
                operation.op_type,
                operation.outputs.len()
            )));
        };
        let input = operation.single_input("x")?;
        let value = match self.hypothetical(input) {
            HypotheticalValue::Plain(_) => HypotheticalValue::Plain(output),
            lazy => lazy.clone(),
        };
        let lazy = matches!(value, HypotheticalValue::LazyTranspose { .. });
        trace!(op = %operation.name, lazy, "unary");
        self.values.insert(output, value);
        Ok(())
    }

    fn visit_axis_update(&mut self, op: OpId) -> Result<()> {
        let operation = self.block.op(op)?;
        let mut lazy: Option<(ValueId, BTreeSet<OpId>, Vec<usize>)> = None;
        let mut mismatch = false;
        for input in operation.input_values() {
            if self.block.is_constant(input) {
                continue;
            }
            let HypotheticalValue::LazyTranspose {
                wrapped,
                origins,
                perm,
            } = self.hypothetical(input)
            else {
                mismatch = true;
                break;
            };
            if let Some((last, union, seen)) = &mut lazy {
                if seen.as_slice() != perm.as_slice() {
                    mismatch = true;
                    break;
                }
                *last = *wrapped;
                union.extend(origins.iter().copied());
            } else {
                lazy = Some((*wrapped, origins.clone(), perm.clone()));
            }
        }

        let Some((wrapped, origins, perm)) = lazy.filter(|_| !mismatch) else {
            return self.visit_materialize(op);
        };
        let strategy = self.strategies.require(&operation.op_type)?;
        if !strategy.can_pass_through(self.block, op, &perm)? {
            trace!(op = %operation.name, ?perm, "axis update cannot pass permutation");
            return self.visit_materialize(op);
        }

        trace!(op = %operation.name, ?perm, origins = origins.len(), "axis update");
        for &origin in &origins {
            self.analysis.axis_update.entry(origin).or_default().push(op);
        }
        let value = HypotheticalValue::LazyTranspose {
            wrapped,
            origins,
            perm,
        };
        for &output in &operation.outputs {
            self.values.insert(output, value.clone());
        }
        Ok(())
    }

    fn visit_transpose(&mut self, op: OpId) -> Result<()> {
        let operation = self.block.op(op)?;
        let input = operation.single_input("x")?;
        let output = self.block.single_output(op)?;

        let Some(perm) = transpose_perm(self.block, op)? else {
            trace!(op = %operation.name, "transpose with unknown permutation");
            return self.visit_materialize(op);
        };
        if let Some(rank) = self.block.value(input)?.ty.rank() {
            if rank != perm.len() {
                return self.visit_materialize(op);
            }
        }

        match self.hypothetical(input).clone() {
            HypotheticalValue::Plain(wrapped) => {
                if self.sinks.is_original_output(output) {
                    return self.visit_materialize(op);
                }
                trace!(op = %operation.name, ?perm, "starting transpose");
                self.values.insert(
                    output,
                    HypotheticalValue::LazyTranspose {
                        wrapped,
                        origins: BTreeSet::from([op]),
                        perm,
                    },
                );
            }
            HypotheticalValue::LazyTranspose {
                wrapped,
                origins,
                perm: pending,
            } => {
                if !transposes_cancel(&pending, &perm) {
                    return self.visit_materialize(op);
                }
                trace!(op = %operation.name, origins = origins.len(), "cancelling transpose");
                for origin in origins {
                    self.analysis.cancel.entry(origin).or_default().push(op);
                }
                self.values.insert(output, HypotheticalValue::Plain(wrapped));
            }
        }
        Ok(())
    }

    fn visit_materialize(&mut self, op: OpId) -> Result<()> {
        let operation = self.block.op(op)?;
        for input in operation.input_values() {
            let hypothetical = self.hypothetical(input).clone();
            if let HypotheticalValue::LazyTranspose { origins, .. } = hypothetical {
                for origin in origins {
                    self.analysis
                        .materialize
                        .entry(origin)
                        .or_default()
                        .push((op, input));
                }
            }
        }
        trace!(op = %operation.name, op_type = %operation.op_type, "materialize");
        self.set_plain_outputs(op)
    }
}
