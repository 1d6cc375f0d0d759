//! Nearest-neighbor index layer
//!
//! Every feature space is served by one [`VectorIndex`]: either an exact
//! [`FlatIndex`] or a trainable [`IvfIndex`](ivf::IvfIndex). The engine never
//! inspects index internals; capability questions ("can this be optimized?")
//! are answered by [`IndexKind`], resolved once at load time.

pub mod ivf;

pub use ivf::IvfIndex;

use crate::distance::euclidean;
use crate::error::{PixseekError, Result};
use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index capability tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub enum IndexKind {
    /// Exhaustive exact scan; nothing to train
    Flat,
    /// Inverted-file index with a k-means-trained coarse quantizer
    Ivf,
}

impl IndexKind {
    /// Whether [`VectorIndex::train`] does useful work for this kind
    pub fn is_trainable(self) -> bool {
        matches!(self, IndexKind::Ivf)
    }

    /// Stable name for stats and logs
    pub fn as_str(self) -> &'static str {
        match self {
            IndexKind::Flat => "flat",
            IndexKind::Ivf => "ivf",
        }
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Nearest-neighbor query primitive over a fixed-dimension vector collection
///
/// Positions returned by `search` are insertion positions, aligned with the
/// feature space's identifier list.
pub trait VectorIndex: Send + Sync {
    /// Add one vector, returning its position
    fn add(&mut self, vector: Vec<f32>) -> Result<usize>;

    /// Add many vectors in insertion order
    fn add_batch(&mut self, vectors: Vec<Vec<f32>>) -> Result<()> {
        for vector in vectors {
            self.add(vector)?;
        }
        Ok(())
    }

    /// Return up to `k` nearest neighbors as `(position, distance)` pairs,
    /// ascending by distance
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>>;

    /// Number of stored vectors
    fn len(&self) -> usize;

    /// Whether the index holds no vectors
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Vector dimension
    fn dimension(&self) -> usize;

    /// Capability tag of this index
    fn kind(&self) -> IndexKind;

    /// Train auxiliary structures on a sample of the corpus.
    ///
    /// A no-op returning `Ok(())` for kinds where `kind().is_trainable()` is
    /// false.
    fn train(&mut self, _sample: &[Vec<f32>]) -> Result<()> {
        Ok(())
    }

    /// Snapshot the index for persistence
    fn state(&self) -> IndexState;
}

/// Serializable index snapshot, one variant per [`IndexKind`]
#[derive(Encode, Decode)]
pub enum IndexState {
    /// Flat index payload
    Flat {
        /// Vector dimension
        dimension: usize,
        /// Stored vectors in insertion order
        vectors: Vec<Vec<f32>>,
    },
    /// IVF index payload
    Ivf {
        /// Vector dimension
        dimension: usize,
        /// Configured number of inverted lists
        nlist: usize,
        /// Lists probed per query
        nprobe: usize,
        /// Trained centroids (empty when untrained)
        centroids: Vec<Vec<f32>>,
        /// Per-centroid member positions
        lists: Vec<Vec<usize>>,
        /// Stored vectors in insertion order
        vectors: Vec<Vec<f32>>,
    },
}

impl IndexState {
    /// Rebuild a queryable index from the snapshot
    pub fn into_index(self) -> Box<dyn VectorIndex> {
        match self {
            IndexState::Flat { dimension, vectors } => {
                Box::new(FlatIndex::from_parts(dimension, vectors))
            }
            IndexState::Ivf {
                dimension,
                nlist,
                nprobe,
                centroids,
                lists,
                vectors,
            } => Box::new(IvfIndex::from_parts(
                dimension, nlist, nprobe, centroids, lists, vectors,
            )),
        }
    }
}

/// Exhaustive exact scan over all stored vectors, ties broken by position.
pub(crate) fn exact_scan(vectors: &[Vec<f32>], query: &[f32], k: usize) -> Vec<(usize, f32)> {
    let mut hits: Vec<(usize, f32)> = vectors
        .iter()
        .enumerate()
        .map(|(pos, v)| (pos, euclidean(query, v)))
        .collect();
    hits.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
    hits.truncate(k);
    hits
}

/// Exact (brute-force) Euclidean index
pub struct FlatIndex {
    dimension: usize,
    vectors: Vec<Vec<f32>>,
}

impl FlatIndex {
    /// Create an empty flat index for `dimension`-length vectors
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: Vec::new(),
        }
    }

    fn from_parts(dimension: usize, vectors: Vec<Vec<f32>>) -> Self {
        Self { dimension, vectors }
    }

    fn check_dimension(&self, len: usize) -> Result<()> {
        if len != self.dimension {
            return Err(PixseekError::DimensionMismatch {
                expected: self.dimension,
                actual: len,
            });
        }
        Ok(())
    }
}

impl VectorIndex for FlatIndex {
    fn add(&mut self, vector: Vec<f32>) -> Result<usize> {
        self.check_dimension(vector.len())?;
        let pos = self.vectors.len();
        self.vectors.push(vector);
        Ok(pos)
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
        self.check_dimension(query.len())?;
        Ok(exact_scan(&self.vectors, query, k))
    }

    fn len(&self) -> usize {
        self.vectors.len()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn kind(&self) -> IndexKind {
        IndexKind::Flat
    }

    fn state(&self) -> IndexState {
        IndexState::Flat {
            dimension: self.dimension,
            vectors: self.vectors.clone(),
        }
    }
}
