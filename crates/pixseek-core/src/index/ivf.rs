//! Inverted-file (IVF) index with a k-means coarse quantizer
//!
//! Untrained, the index answers queries with an exact scan so that a freshly
//! loaded deployment works before anyone calls `optimize`. Training
//! partitions the corpus into `nlist` cells; queries then probe the `nprobe`
//! nearest cells, widening as needed until `k` candidates are found.

use super::{exact_scan, IndexKind, IndexState, VectorIndex};
use crate::distance::euclidean;
use crate::error::{PixseekError, Result};

/// Default number of inverted lists
pub const DEFAULT_NLIST: usize = 64;
/// Default number of lists probed per query
pub const DEFAULT_NPROBE: usize = 8;

const KMEANS_ITERATIONS: usize = 10;

/// IVF index; the only [`IndexKind::is_trainable`] kind
pub struct IvfIndex {
    dimension: usize,
    nlist: usize,
    nprobe: usize,
    centroids: Vec<Vec<f32>>,
    lists: Vec<Vec<usize>>,
    vectors: Vec<Vec<f32>>,
}

impl IvfIndex {
    /// Create an empty, untrained IVF index
    pub fn new(dimension: usize, nlist: usize, nprobe: usize) -> Self {
        Self {
            dimension,
            nlist: nlist.max(1),
            nprobe: nprobe.max(1),
            centroids: Vec::new(),
            lists: Vec::new(),
            vectors: Vec::new(),
        }
    }

    /// Create with the default `nlist`/`nprobe` parameters
    pub fn with_defaults(dimension: usize) -> Self {
        Self::new(dimension, DEFAULT_NLIST, DEFAULT_NPROBE)
    }

    pub(super) fn from_parts(
        dimension: usize,
        nlist: usize,
        nprobe: usize,
        centroids: Vec<Vec<f32>>,
        lists: Vec<Vec<usize>>,
        vectors: Vec<Vec<f32>>,
    ) -> Self {
        Self {
            dimension,
            nlist,
            nprobe,
            centroids,
            lists,
            vectors,
        }
    }

    /// Whether the coarse quantizer has been trained
    pub fn is_trained(&self) -> bool {
        !self.centroids.is_empty()
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

    fn nearest_centroid(&self, vector: &[f32]) -> usize {
        let mut best = 0;
        let mut best_dist = f32::MAX;
        for (i, centroid) in self.centroids.iter().enumerate() {
            let d = euclidean(vector, centroid);
            if d < best_dist {
                best_dist = d;
                best = i;
            }
        }
        best
    }

    /// Rebuild the inverted lists from the current centroids
    fn assign_all(&mut self) {
        let mut lists = vec![Vec::new(); self.centroids.len()];
        for (pos, vector) in self.vectors.iter().enumerate() {
            lists[self.nearest_centroid(vector)].push(pos);
        }
        self.lists = lists;
    }
}

impl VectorIndex for IvfIndex {
    fn add(&mut self, vector: Vec<f32>) -> Result<usize> {
        self.check_dimension(vector.len())?;
        let pos = self.vectors.len();
        if self.is_trained() {
            let cell = self.nearest_centroid(&vector);
            self.lists[cell].push(pos);
        }
        self.vectors.push(vector);
        Ok(pos)
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
        self.check_dimension(query.len())?;
        if !self.is_trained() {
            return Ok(exact_scan(&self.vectors, query, k));
        }

        // Rank cells by centroid distance, then probe ascending. Keep probing
        // past nprobe until k candidates are gathered or cells run out.
        let mut cells: Vec<(usize, f32)> = self
            .centroids
            .iter()
            .enumerate()
            .map(|(i, c)| (i, euclidean(query, c)))
            .collect();
        cells.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));

        let mut candidates: Vec<usize> = Vec::new();
        for (probed, (cell, _)) in cells.iter().enumerate() {
            if probed >= self.nprobe && candidates.len() >= k {
                break;
            }
            candidates.extend_from_slice(&self.lists[*cell]);
        }

        let mut hits: Vec<(usize, f32)> = candidates
            .into_iter()
            .map(|pos| (pos, euclidean(query, &self.vectors[pos])))
            .collect();
        hits.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        hits.truncate(k);
        Ok(hits)
    }

    fn len(&self) -> usize {
        self.vectors.len()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn kind(&self) -> IndexKind {
        IndexKind::Ivf
    }

    fn train(&mut self, sample: &[Vec<f32>]) -> Result<()> {
        if sample.is_empty() {
            return Ok(());
        }
        for vector in sample {
            self.check_dimension(vector.len())?;
        }

        let nlist = self.nlist.min(sample.len());

        // Seed centroids with evenly spaced sample vectors, then run a
        // bounded Lloyd's pass. Empty cells keep their previous centroid.
        let mut centroids: Vec<Vec<f32>> = (0..nlist)
            .map(|i| sample[i * sample.len() / nlist].clone())
            .collect();

        for _ in 0..KMEANS_ITERATIONS {
            let mut sums = vec![vec![0.0f32; self.dimension]; nlist];
            let mut counts = vec![0usize; nlist];
            for vector in sample {
                let mut best = 0;
                let mut best_dist = f32::MAX;
                for (i, centroid) in centroids.iter().enumerate() {
                    let d = euclidean(vector, centroid);
                    if d < best_dist {
                        best_dist = d;
                        best = i;
                    }
                }
                counts[best] += 1;
                for (acc, v) in sums[best].iter_mut().zip(vector.iter()) {
                    *acc += v;
                }
            }
            for (i, centroid) in centroids.iter_mut().enumerate() {
                if counts[i] > 0 {
                    *centroid = sums[i].iter().map(|s| s / counts[i] as f32).collect();
                }
            }
        }

        self.centroids = centroids;
        self.assign_all();
        Ok(())
    }

    fn state(&self) -> IndexState {
        IndexState::Ivf {
            dimension: self.dimension,
            nlist: self.nlist,
            nprobe: self.nprobe,
            centroids: self.centroids.clone(),
            lists: self.lists.clone(),
            vectors: self.vectors.clone(),
        }
    }
}
