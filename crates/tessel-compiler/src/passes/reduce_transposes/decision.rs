//! Which starting transposes are worth removing.
//!
//! Starting, cancelling and materializing ops form an undirected graph with
//! an edge from every starting transpose to each of its cancelling
//! transposes and materializing consumers. Connected components are removed
//! together or not at all: dropping one start of a component would leave its
//! cancels and axis updates referring to a transpose that still exists.

use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

use tessel_core::{OpId, ValueId};
use tracing::debug;

use super::lattice::TransposeAnalysis;

/// One connected component of the start / cancel / materialize graph.
#[derive(Debug, Default, PartialEq, Eq)]
pub(super) struct Component {
    pub(super) starts: BTreeSet<OpId>,
    pub(super) cancels: BTreeSet<OpId>,
    pub(super) materializes: BTreeSet<OpId>,

    /// Distinct `(consumer, value)` pairs that get a transpose inserted.
    /// One consumer reading several lazy values counts once per value.
    pub(super) materialized_edges: BTreeSet<(OpId, ValueId)>,
}

impl Component {
    /// Removing the component is a net win: every materialized edge
    /// re-inserts one transpose, every start and cancel removes one.
    fn is_profitable(&self) -> bool {
        self.materialized_edges.len() < self.starts.len() + self.cancels.len()
    }
}

/// Split the analysis into connected components.
///
/// # Panics
///
/// Panics if a transpose is both a starting and a cancelling transpose.
pub(super) fn components(analysis: &TransposeAnalysis) -> Vec<Component> {
    let starts: BTreeSet<OpId> = analysis
        .cancel
        .keys()
        .chain(analysis.materialize.keys())
        .copied()
        .collect();

    let mut cancelled_by: BTreeMap<OpId, BTreeSet<OpId>> = BTreeMap::new();
    for (&start, cancels) in &analysis.cancel {
        for &cancel in cancels {
            assert!(
                !starts.contains(&cancel),
                "transpose {cancel:?} is both a starting and a cancelling transpose"
            );
            cancelled_by.entry(cancel).or_default().insert(start);
        }
    }
    let mut materialized_by: BTreeMap<OpId, BTreeSet<OpId>> = BTreeMap::new();
    for (&start, edges) in &analysis.materialize {
        for &(consumer, _) in edges {
            materialized_by.entry(consumer).or_default().insert(start);
        }
    }

    let mut visited: HashSet<OpId> = HashSet::new();
    let mut result = Vec::new();
    for &seed in &starts {
        if !visited.insert(seed) {
            continue;
        }
        let mut component = Component::default();
        let mut queue = VecDeque::from([seed]);
        while let Some(op) = queue.pop_front() {
            let neighbours: Vec<OpId> = if starts.contains(&op) {
                component.starts.insert(op);
                let edges = analysis.materialize.get(&op).into_iter().flatten();
                component.materialized_edges.extend(edges.clone().copied());
                let cancels = analysis.cancel.get(&op).into_iter().flatten().copied();
                cancels.chain(edges.map(|&(consumer, _)| consumer)).collect()
            } else if let Some(origins) = cancelled_by.get(&op) {
                component.cancels.insert(op);
                origins.iter().copied().collect()
            } else {
                component.materializes.insert(op);
                materialized_by
                    .get(&op)
                    .into_iter()
                    .flatten()
                    .copied()
                    .collect()
            };
            for next in neighbours {
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        result.push(component);
    }
    result
}

/// Keep only the starting transposes whose component should be rewritten.
///
/// A component is rewritten iff none of its starting transposes feeds a
/// block output and it is profitable. Dropped starts are removed from every
/// map; kept starts all get a (possibly empty) cancel entry.
///
/// Returns the number of components kept.
pub(super) fn prune(
    analysis: &mut TransposeAnalysis,
    feeds_output: impl Fn(OpId) -> bool,
) -> usize {
    let mut kept = 0;
    for component in components(analysis) {
        let touches_output = component.starts.iter().any(|&op| feeds_output(op));
        let keep = !touches_output && component.is_profitable();
        debug!(
            starts = component.starts.len(),
            cancels = component.cancels.len(),
            materializes = component.materialized_edges.len(),
            touches_output,
            keep,
            "transpose component"
        );

        for start in component.starts {
            if keep {
                analysis.cancel.entry(start).or_default();
            } else {
                analysis.cancel.remove(&start);
                analysis.materialize.remove(&start);
                analysis.axis_update.remove(&start);
            }
        }
        kept += usize::from(keep);
    }
    kept
}
