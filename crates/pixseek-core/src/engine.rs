//! Retrieval engine orchestration
//!
//! Composes the catalog, the result cache and the hierarchical filter into
//! the public search surface: single query, batch, stats and index
//! optimization.

use crate::cache::{QueryFingerprint, ResultCache};
use crate::catalog::{Catalog, FeatureSpace};
use crate::distance::euclidean;
use crate::error::{PixseekError, Result};
use crate::filter::HierarchicalFilter;
use crate::types::{EngineConfig, SearchResponse, SpaceStats};
use std::collections::BTreeMap;
use std::time::Instant;

/// Normalize distances to similarity scores in `[0, 1]`.
///
/// The minimum distance maps to 1.0. When every distance is equal (including
/// a single result), every score is 1.0. Empty in, empty out.
pub fn similarity_scores(distances: &[f32]) -> Vec<f32> {
    let Some(&first) = distances.first() else {
        return Vec::new();
    };
    let (dmin, dmax) = distances
        .iter()
        .fold((first, first), |(lo, hi), &d| (lo.min(d), hi.max(d)));
    if dmax > dmin {
        distances
            .iter()
            .map(|d| 1.0 - (d - dmin) / (dmax - dmin))
            .collect()
    } else {
        vec![1.0; distances.len()]
    }
}

/// Multi-representation nearest-neighbor retrieval engine
pub struct RetrievalEngine {
    config: EngineConfig,
    catalog: Catalog,
    filter: Option<HierarchicalFilter>,
    cache: ResultCache,
}

impl RetrievalEngine {
    /// Load the catalog from `config.index_dir` and assemble the engine.
    ///
    /// Missing spaces never fail construction. If hierarchical mode is on but
    /// the coarse space did not load, the engine falls back to direct search
    /// for every query.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let catalog = Catalog::load(&config.index_dir, &config.spaces);
        let filter = if config.hierarchical {
            match catalog.get(&config.coarse_space) {
                Some(space) => Some(HierarchicalFilter::build(space)?),
                None => {
                    tracing::warn!(
                        "Coarse space '{}' not loaded, hierarchical search disabled",
                        config.coarse_space
                    );
                    None
                }
            }
        } else {
            None
        };
        let cache = ResultCache::new(config.cache_capacity);
        Ok(Self {
            config,
            catalog,
            filter,
            cache,
        })
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Search `space` for the `k` nearest neighbors of `query`.
    ///
    /// An absent or empty space yields an empty response with
    /// `total_vectors == 0`, not an error. A query whose length disagrees
    /// with the target space's dimension is a contract violation and returns
    /// [`PixseekError::DimensionMismatch`].
    pub fn search(
        &self,
        query: &[f32],
        space: &str,
        k: usize,
        use_cache: bool,
    ) -> Result<SearchResponse> {
        if k == 0 {
            return Err(PixseekError::InvalidParameter(
                "k must be at least 1".to_string(),
            ));
        }
        let started = Instant::now();

        let fingerprint = QueryFingerprint::compute(query, space, k);
        if use_cache {
            if let Some(mut hit) = self.cache.get(&fingerprint) {
                hit.cache_hit = true;
                hit.elapsed = started.elapsed();
                return Ok(hit);
            }
        }

        let mut response = match self.catalog.get(space) {
            None => SearchResponse::empty(space),
            Some(target) => {
                let ranked = match self.filter.as_ref().filter(|f| f.covers(query)) {
                    Some(filter) => self.rerank(target, filter, query, k)?,
                    None => self.direct(target, query, k)?,
                };
                let (distances, ids): (Vec<f32>, Vec<String>) = ranked.into_iter().unzip();
                let scores = similarity_scores(&distances);
                SearchResponse {
                    space: space.to_string(),
                    distances,
                    ids,
                    scores,
                    elapsed: started.elapsed(),
                    cache_hit: false,
                    total_vectors: target.vectors.len(),
                }
            }
        };

        if use_cache {
            self.cache.put(fingerprint, response.clone());
        }
        response.elapsed = started.elapsed();
        Ok(response)
    }

    /// Search `space` once per query vector, preserving input order.
    ///
    /// Sequential by design; each query flows through the cache like a
    /// single-query search.
    pub fn batch_search(
        &self,
        queries: &[Vec<f32>],
        space: &str,
        k: usize,
    ) -> Result<Vec<SearchResponse>> {
        queries
            .iter()
            .map(|query| self.search(query, space, k, true))
            .collect()
    }

    /// Diagnostic summary per loaded feature space
    pub fn stats(&self) -> BTreeMap<String, SpaceStats> {
        self.catalog.stats()
    }

    /// Best-effort index tuning for one space.
    ///
    /// Trains the space's index on its own vectors when the index kind
    /// supports training; otherwise a no-op. Never fails the caller.
    pub fn optimize(&mut self, space: &str) {
        let Some(feature_space) = self.catalog.get_mut(space) else {
            tracing::warn!("Cannot optimize '{}': space not loaded", space);
            return;
        };
        if !feature_space.index.kind().is_trainable() {
            tracing::debug!(
                "Index for '{}' is {}, nothing to optimize",
                space,
                feature_space.index.kind()
            );
            return;
        }
        let FeatureSpace {
            ref mut index,
            ref vectors,
            ..
        } = *feature_space;
        match index.train(vectors) {
            Ok(()) => tracing::info!("Optimized index for '{}'", space),
            Err(e) => tracing::warn!("Optimizing '{}' failed: {}", space, e),
        }
    }

    /// Exact query against the target space's own index
    fn direct(
        &self,
        target: &FeatureSpace,
        query: &[f32],
        k: usize,
    ) -> Result<Vec<(f32, String)>> {
        let hits = target.index.search(query, k)?;
        Ok(hits
            .into_iter()
            .map(|(pos, distance)| (distance, target.ids[pos].clone()))
            .collect())
    }

    /// Two-stage query: coarse shortlist, then exact re-rank in the target
    /// space restricted to the shortlisted positions
    fn rerank(
        &self,
        target: &FeatureSpace,
        filter: &HierarchicalFilter,
        query: &[f32],
        k: usize,
    ) -> Result<Vec<(f32, String)>> {
        if query.len() != target.dimension {
            return Err(PixseekError::DimensionMismatch {
                expected: target.dimension,
                actual: query.len(),
            });
        }
        let shortlist = filter.shortlist(query, self.config.filter_ratio, k)?;

        let mut ranked: Vec<(usize, f32)> = shortlist
            .into_iter()
            .filter(|&pos| pos < target.vectors.len())
            .map(|pos| (pos, euclidean(query, &target.vectors[pos])))
            .collect();
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        ranked.truncate(k);

        Ok(ranked
            .into_iter()
            .map(|(pos, distance)| (distance, target.ids[pos].clone()))
            .collect())
    }
}
