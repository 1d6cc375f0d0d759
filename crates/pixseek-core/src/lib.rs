//! # Pixseek Core
//!
//! Multi-representation nearest-neighbor image retrieval engine: given a
//! query feature vector, return the most similar items from a precomputed
//! corpus, using one of several independently built feature spaces (color,
//! texture, shape, learned embeddings, fusion).
//!
//! ## What this crate does
//!
//! - **Catalog**: loads per-space vector sets, index snapshots and identifier
//!   lists from read-only on-disk artifacts; partial deployments work
//! - **Search**: direct (per-space index) or hierarchical (coarse shortlist
//!   over a cheap space, exact re-rank in the target space)
//! - **Scoring**: distances normalized to similarity scores in `[0, 1]`
//! - **Caching**: LRU result cache keyed by a blake3 query fingerprint
//! - **Stats & optimization**: per-space diagnostics, best-effort IVF
//!   quantizer training
//!
//! ## What this crate is NOT
//!
//! - No feature extraction: callers hand the engine already-extracted vectors
//! - No index build pipeline: artifacts are produced elsewhere and consumed
//!   read-only (the [`artifact`] write helpers exist for that pipeline and
//!   for tests)
//! - No HTTP or CLI front end

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod artifact;
pub mod cache;
pub mod catalog;
pub mod distance;
pub mod engine;
pub mod error;
pub mod filter;
pub mod index;
pub mod types;

pub use cache::{QueryFingerprint, ResultCache};
pub use catalog::{Catalog, FeatureSpace};
pub use engine::{similarity_scores, RetrievalEngine};
pub use error::{PixseekError, Result};
pub use filter::HierarchicalFilter;
pub use index::{FlatIndex, IndexKind, IndexState, IvfIndex, VectorIndex};
pub use types::{EngineConfig, SearchResponse, SpaceStats};
