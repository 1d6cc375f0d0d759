//! Core types for the retrieval engine

use crate::index::IndexKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Engine configuration, fixed at construction time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Directory holding the persisted per-space artifacts
    pub index_dir: PathBuf,
    /// Result cache capacity in entries; 0 disables caching entirely
    pub cache_capacity: usize,
    /// Enable two-stage search (coarse shortlist, then exact re-rank)
    pub hierarchical: bool,
    /// Fraction of the corpus retained by the coarse pre-filter
    pub filter_ratio: f32,
    /// Feature-space names to load from `index_dir`
    pub spaces: Vec<String>,
    /// Space used for the coarse pre-filter (lowest-dimension by convention)
    pub coarse_space: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            index_dir: PathBuf::from("./pixseek_index"),
            cache_capacity: 1000,
            hierarchical: true,
            filter_ratio: 0.1,
            spaces: ["color", "texture", "shape", "resnet", "vgg", "fusion"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            coarse_space: "color".to_string(),
        }
    }
}

/// Outcome of one search invocation
///
/// `distances`, `ids` and `scores` are index-aligned and sorted by ascending
/// distance. A cached copy differs from the original only in `cache_hit` and
/// `elapsed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Feature space the search ran against
    pub space: String,
    /// Raw L2 distances, ascending
    pub distances: Vec<f32>,
    /// Item identifiers (image paths), aligned with `distances`
    pub ids: Vec<String>,
    /// Normalized similarity scores in [0, 1], aligned with `distances`
    pub scores: Vec<f32>,
    /// Wall time spent answering this call
    pub elapsed: Duration,
    /// Whether the payload came out of the result cache
    pub cache_hit: bool,
    /// Corpus size of the feature space (0 if the space is not loaded)
    pub total_vectors: usize,
}

impl SearchResponse {
    /// An empty response for a space that is absent or holds no vectors
    pub(crate) fn empty(space: &str) -> Self {
        Self {
            space: space.to_string(),
            distances: Vec::new(),
            ids: Vec::new(),
            scores: Vec::new(),
            elapsed: Duration::ZERO,
            cache_hit: false,
            total_vectors: 0,
        }
    }
}

/// Diagnostic summary for one loaded feature space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceStats {
    /// Number of stored vectors
    pub count: usize,
    /// Vector dimension
    pub dimension: usize,
    /// Kind of the index serving this space
    pub kind: IndexKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.cache_capacity, 1000);
        assert!(config.hierarchical);
        assert_eq!(config.filter_ratio, 0.1);
        assert_eq!(config.spaces.len(), 6);
        assert_eq!(config.coarse_space, "color");
    }

    #[test]
    fn test_empty_response() {
        let resp = SearchResponse::empty("texture");
        assert_eq!(resp.space, "texture");
        assert!(resp.ids.is_empty());
        assert_eq!(resp.total_vectors, 0);
        assert!(!resp.cache_hit);
    }
}
