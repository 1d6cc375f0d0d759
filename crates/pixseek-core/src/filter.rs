//! Coarse pre-filter for two-stage (hierarchical) search
//!
//! Built over one cheap, low-dimension feature space (color by convention).
//! The filter only produces a candidate shortlist; the exact re-rank in the
//! target space happens in the engine.

use crate::catalog::FeatureSpace;
use crate::error::Result;
use crate::index::{FlatIndex, VectorIndex};

/// Coarse shortlist index over the designated cheap feature space
pub struct HierarchicalFilter {
    coarse: FlatIndex,
}

impl HierarchicalFilter {
    /// Build the filter from the coarse space's vectors
    pub fn build(space: &FeatureSpace) -> Result<Self> {
        let mut coarse = FlatIndex::new(space.dimension);
        coarse.add_batch(space.vectors.clone())?;
        tracing::info!(
            "Built coarse filter over '{}': {} vectors, {} dimensions",
            space.name,
            coarse.len(),
            space.dimension
        );
        Ok(Self { coarse })
    }

    /// Dimension of the coarse space
    pub fn dimension(&self) -> usize {
        self.coarse.dimension()
    }

    /// Whether the query carries at least the coarse sub-range as a prefix.
    ///
    /// When this is false the engine degrades to direct search; a short query
    /// is never an error on the hierarchical path.
    pub fn covers(&self, query: &[f32]) -> bool {
        query.len() >= self.coarse.dimension()
    }

    /// Shortlist candidate positions for one query.
    ///
    /// Retains `filter_k = max(10*k, round(filter_ratio * corpus))` coarse
    /// neighbors, clamped to `[k, corpus]`. Only the query's leading coarse
    /// sub-range is compared.
    pub fn shortlist(&self, query: &[f32], filter_ratio: f32, k: usize) -> Result<Vec<usize>> {
        let corpus = self.coarse.len();
        let by_ratio = (filter_ratio * corpus as f32).round() as usize;
        let filter_k = (10 * k).max(by_ratio).max(k).min(corpus);

        let prefix = &query[..self.coarse.dimension()];
        let hits = self.coarse.search(prefix, filter_k)?;
        Ok(hits.into_iter().map(|(pos, _)| pos).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{FlatIndex, IndexKind, VectorIndex};

    fn coarse_space(vectors: Vec<Vec<f32>>) -> FeatureSpace {
        let dimension = vectors[0].len();
        let mut index = FlatIndex::new(dimension);
        index.add_batch(vectors.clone()).unwrap();
        let ids = (0..vectors.len()).map(|i| format!("img_{i}")).collect();
        FeatureSpace {
            name: "color".to_string(),
            dimension,
            vectors,
            ids,
            index: Box::new(index),
        }
    }

    #[test]
    fn test_shortlist_orders_by_coarse_distance() {
        let filter =
            HierarchicalFilter::build(&coarse_space(vec![
                vec![5.0, 5.0],
                vec![0.0, 0.0],
                vec![1.0, 0.0],
            ]))
            .unwrap();
        // filter_k saturates at the corpus size here, so everything shortlists
        let positions = filter.shortlist(&[0.0, 0.0], 0.1, 1).unwrap();
        assert_eq!(positions, vec![1, 2, 0]);
    }

    #[test]
    fn test_shortlist_respects_filter_ratio() {
        let vectors: Vec<Vec<f32>> = (0..100).map(|i| vec![i as f32]).collect();
        let filter = HierarchicalFilter::build(&coarse_space(vectors)).unwrap();
        // max(10*1, round(0.2 * 100)) = 20
        let positions = filter.shortlist(&[0.0], 0.2, 1).unwrap();
        assert_eq!(positions.len(), 20);
        assert_eq!(positions[0], 0);
    }

    #[test]
    fn test_shortlist_uses_query_prefix() {
        let filter =
            HierarchicalFilter::build(&coarse_space(vec![vec![0.0, 0.0], vec![9.0, 9.0]]))
                .unwrap();
        assert!(filter.covers(&[0.1, 0.1, 7.0, 7.0]));
        assert!(!filter.covers(&[0.1]));
        // Trailing elements beyond the coarse dimension are ignored
        let positions = filter.shortlist(&[0.1, 0.1, 7.0, 7.0], 1.0, 1).unwrap();
        assert_eq!(positions[0], 0);
    }

    #[test]
    fn test_filter_kind_is_flat() {
        let filter = HierarchicalFilter::build(&coarse_space(vec![vec![0.0]])).unwrap();
        assert_eq!(filter.coarse.kind(), IndexKind::Flat);
    }
}
