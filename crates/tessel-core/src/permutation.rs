//! Axis permutation helpers.
//!
//! A permutation `perm` of rank `n` maps output axis `i` to input axis
//! `perm[i]`, matching the semantics of the `transpose` op.

use crate::types::TensorValue;

/// Check that `perm` is a permutation of `0..rank`.
pub fn is_permutation(perm: &[usize], rank: usize) -> bool {
    if perm.len() != rank {
        return false;
    }
    let mut seen = vec![false; rank];
    for &p in perm {
        if p >= rank || seen[p] {
            return false;
        }
        seen[p] = true;
    }
    true
}

/// Check that `perm` is the identity permutation.
pub fn is_identity(perm: &[usize]) -> bool {
    perm.iter().enumerate().all(|(i, &p)| i == p)
}

/// Invert a permutation, so that `inverse(perm)[perm[i]] == i`.
pub fn inverse(perm: &[usize]) -> Vec<usize> {
    let mut inv = vec![0; perm.len()];
    for (i, &p) in perm.iter().enumerate() {
        inv[p] = i;
    }
    inv
}

/// Compose two permutations: transposing by `first` and then by `second`
/// equals a single transpose by the returned permutation.
pub fn compose(first: &[usize], second: &[usize]) -> Vec<usize> {
    second.iter().map(|&s| first[s]).collect()
}

/// Check whether transposing by `first` and then by `second` is a no-op.
///
/// Permutations of different lengths never cancel.
pub fn transposes_cancel(first: &[usize], second: &[usize]) -> bool {
    first.len() == second.len()
        && is_permutation(first, first.len())
        && is_permutation(second, second.len())
        && is_identity(&compose(first, second))
}

/// Normalize a possibly negative axis against `rank`.
pub fn normalize_axis(axis: i64, rank: usize) -> Option<usize> {
    let rank = rank as i64;
    let axis = if axis < 0 { axis + rank } else { axis };
    (0..rank).contains(&axis).then_some(axis as usize)
}

/// Read a constant permutation payload.
///
/// Negative entries are normalized against the permutation length. Returns
/// `None` when the payload is not an integer vector or not a valid permutation.
pub fn perm_from_value(value: &TensorValue) -> Option<Vec<usize>> {
    let raw = value.to_i64_vec()?;
    let rank = raw.len();
    let perm = raw
        .into_iter()
        .map(|axis| normalize_axis(axis, rank))
        .collect::<Option<Vec<_>>>()?;
    is_permutation(&perm, rank).then_some(perm)
}
