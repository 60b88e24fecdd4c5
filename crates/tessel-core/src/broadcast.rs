//! Broadcasting shape helper for elementwise type inference.

use crate::{Error, Result};

/// Compute the NumPy-style broadcast of two static shapes.
///
/// Shapes are aligned from the trailing dimension; a missing or unit
/// dimension stretches to match the other side.
///
/// ```text
/// broadcast_shape(&[1, 2, 3, 4], &[2])       -> error (4 vs 2)
/// broadcast_shape(&[1, 2, 3, 4], &[1, 2, 1, 1]) -> [1, 2, 3, 4]
/// broadcast_shape(&[8, 1, 6, 1], &[7, 1, 5]) -> [8, 7, 6, 5]
/// ```
pub fn broadcast_shape(a: &[usize], b: &[usize]) -> Result<Vec<usize>> {
    let rank = a.len().max(b.len());
    let dim_at = |shape: &[usize], i: usize| {
        let offset = rank - shape.len();
        if i < offset { 1 } else { shape[i - offset] }
    };

    (0..rank)
        .map(|i| match (dim_at(a, i), dim_at(b, i)) {
            (x, y) if x == y => Ok(x),
            (1, y) => Ok(y),
            (x, 1) => Ok(x),
            (x, y) => Err(Error::Shape(format!(
                "Cannot broadcast shapes {:?} and {:?} at dimension {i} ({x} vs {y})",
                a, b
            ))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcast_missing_dims() {
        assert_eq!(broadcast_shape(&[2, 3, 4], &[3, 4]).unwrap(), vec![2, 3, 4]);
    }

    #[test]
    fn test_broadcast_unit_dims() {
        assert_eq!(
            broadcast_shape(&[1, 2, 3, 4], &[1, 2, 1, 1]).unwrap(),
            vec![1, 2, 3, 4]
        );
        assert_eq!(
            broadcast_shape(&[8, 1, 6, 1], &[7, 1, 5]).unwrap(),
            vec![8, 7, 6, 5]
        );
    }

    #[test]
    fn test_broadcast_scalar() {
        assert_eq!(broadcast_shape(&[], &[3, 4]).unwrap(), vec![3, 4]);
    }

    #[test]
    fn test_broadcast_incompatible() {
        assert!(broadcast_shape(&[1, 2, 3, 4], &[2]).is_err());
    }
}
