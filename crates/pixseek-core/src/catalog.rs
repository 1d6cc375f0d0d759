//! Feature space catalog
//!
//! Loads every configured feature space's vectors, index and identifier list
//! at startup and exposes read access to them. A space whose artifacts are
//! missing or damaged is simply not in the catalog; partial deployments
//! (say, only three of six spaces built) keep working.

use crate::artifact::{self, ArtifactLoad};
use crate::index::VectorIndex;
use crate::types::SpaceStats;
use std::collections::BTreeMap;
use std::path::Path;

/// One loaded feature space.
///
/// `vectors`, `ids` and the index are position-aligned:
/// `vectors.len() == ids.len() == index.len()`, enforced at load time.
pub struct FeatureSpace {
    /// Space name ("color", "fusion", ...)
    pub name: String,
    /// Vector dimension
    pub dimension: usize,
    /// Stored vectors in corpus order
    pub vectors: Vec<Vec<f32>>,
    /// Item identifiers (image paths), position-aligned with `vectors`
    pub ids: Vec<String>,
    /// Nearest-neighbor index over `vectors`
    pub index: Box<dyn VectorIndex>,
}

/// Read-only registry of loaded feature spaces
pub struct Catalog {
    spaces: BTreeMap<String, FeatureSpace>,
}

impl Catalog {
    /// Load the named spaces from `dir`.
    ///
    /// Missing or corrupt artifacts are logged and skipped, never fatal.
    pub fn load(dir: &Path, names: &[String]) -> Self {
        let mut spaces = BTreeMap::new();
        for name in names {
            match artifact::load_space(dir, name) {
                ArtifactLoad::Loaded(space) => {
                    tracing::info!(
                        "Loaded feature space '{}': {} vectors, {} dimensions, {} index",
                        name,
                        space.vectors.len(),
                        space.dimension,
                        space.index.kind()
                    );
                    spaces.insert(name.clone(), space);
                }
                ArtifactLoad::Absent => {
                    tracing::warn!("Feature space '{}' has no artifacts, skipping", name);
                }
                ArtifactLoad::Corrupt(reason) => {
                    tracing::warn!("Feature space '{}' unreadable ({}), skipping", name, reason);
                }
            }
        }
        Self { spaces }
    }

    /// Look up a loaded space by name
    pub fn get(&self, name: &str) -> Option<&FeatureSpace> {
        self.spaces.get(name)
    }

    /// Mutable lookup, used by index optimization
    pub fn get_mut(&mut self, name: &str) -> Option<&mut FeatureSpace> {
        self.spaces.get_mut(name)
    }

    /// Number of loaded spaces
    pub fn len(&self) -> usize {
        self.spaces.len()
    }

    /// Whether no space loaded
    pub fn is_empty(&self) -> bool {
        self.spaces.is_empty()
    }

    /// Diagnostic summary per loaded space
    pub fn stats(&self) -> BTreeMap<String, SpaceStats> {
        self.spaces
            .iter()
            .map(|(name, space)| {
                (
                    name.clone(),
                    SpaceStats {
                        count: space.vectors.len(),
                        dimension: space.dimension,
                        kind: space.index.kind(),
                    },
                )
            })
            .collect()
    }
}
