//! Distance primitives
//!
//! The retrieval engine ranks by L2 distance in every feature space; the
//! normalized similarity score is derived from these distances in the engine.

/// Euclidean (L2) distance between two equal-length vectors.
///
/// Callers are responsible for dimension checks; the index and engine layers
/// reject mismatched queries before distances are computed.
pub fn euclidean(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum::<f32>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_euclidean_basic() {
        assert_eq!(euclidean(&[0.0, 0.0], &[3.0, 4.0]), 5.0);
        assert_eq!(euclidean(&[1.0, 1.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_euclidean_single_axis() {
        assert_eq!(euclidean(&[0.0, 0.0], &[1.0, 0.0]), 1.0);
    }
}
