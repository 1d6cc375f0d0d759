//! Persisted per-space artifacts
//!
//! Each feature space is a triple of files under the index directory:
//! `vectors_{name}.bin` (bincode vector set), `index_{name}.idx` (bincode
//! index snapshot) and `ids_{name}.txt` (newline-delimited identifiers).
//!
//! The engine only reads these; writing is the index-build pipeline's job.
//! [`write_space`] exists for that pipeline and for test fixtures.

use crate::catalog::FeatureSpace;
use crate::error::{PixseekError, Result};
use crate::index::{FlatIndex, IndexKind, IndexState, IvfIndex, VectorIndex};
use bincode::{config, Decode, Encode};
use std::fs;
use std::path::{Path, PathBuf};

/// Serialized vector collection for one feature space
#[derive(Encode, Decode)]
pub struct VectorSetState {
    /// Vector dimension
    pub dimension: usize,
    /// Stored vectors in corpus order
    pub vectors: Vec<Vec<f32>>,
}

/// Outcome of loading one space's artifacts.
///
/// Distinguishes "nothing there yet" from "something is broken" so callers
/// never have to infer the difference from an error message.
pub enum ArtifactLoad {
    /// All three artifacts present and consistent
    Loaded(FeatureSpace),
    /// At least one artifact file does not exist
    Absent,
    /// Artifacts exist but are unreadable or mutually inconsistent
    Corrupt(String),
}

/// Path of the vector collection for `name`
pub fn vectors_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("vectors_{name}.bin"))
}

/// Path of the index snapshot for `name`
pub fn index_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("index_{name}.idx"))
}

/// Path of the identifier list for `name`
pub fn ids_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("ids_{name}.txt"))
}

/// Load one feature space's artifact triple from `dir`.
///
/// Never returns an error for missing or damaged files; those conditions are
/// reported through [`ArtifactLoad`] so partial deployments keep working.
pub fn load_space(dir: &Path, name: &str) -> ArtifactLoad {
    let vectors_file = vectors_path(dir, name);
    let index_file = index_path(dir, name);
    let ids_file = ids_path(dir, name);
    if !vectors_file.exists() || !index_file.exists() || !ids_file.exists() {
        return ArtifactLoad::Absent;
    }

    let vector_set: VectorSetState = match fs::read(&vectors_file) {
        Ok(bytes) => match bincode::decode_from_slice(&bytes, config::standard()) {
            Ok((state, _)) => state,
            Err(e) => return ArtifactLoad::Corrupt(format!("vector set: {e}")),
        },
        Err(e) => return ArtifactLoad::Corrupt(format!("vector set: {e}")),
    };

    let index: Box<dyn VectorIndex> = match fs::read(&index_file) {
        Ok(bytes) => match bincode::decode_from_slice::<IndexState, _>(&bytes, config::standard())
        {
            Ok((state, _)) => state.into_index(),
            Err(e) => return ArtifactLoad::Corrupt(format!("index: {e}")),
        },
        Err(e) => return ArtifactLoad::Corrupt(format!("index: {e}")),
    };

    let ids: Vec<String> = match fs::read_to_string(&ids_file) {
        Ok(text) => text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect(),
        Err(e) => return ArtifactLoad::Corrupt(format!("identifier list: {e}")),
    };

    // Alignment invariant: vectors, identifiers and index must agree
    let count = vector_set.vectors.len();
    if ids.len() != count || index.len() != count {
        return ArtifactLoad::Corrupt(format!(
            "misaligned artifacts: {count} vectors, {} ids, {} indexed",
            ids.len(),
            index.len()
        ));
    }
    if index.dimension() != vector_set.dimension {
        return ArtifactLoad::Corrupt(format!(
            "index dimension {} disagrees with vector set dimension {}",
            index.dimension(),
            vector_set.dimension
        ));
    }
    if let Some(bad) = vector_set
        .vectors
        .iter()
        .find(|v| v.len() != vector_set.dimension)
    {
        return ArtifactLoad::Corrupt(format!(
            "vector of length {} in a {}-dimensional set",
            bad.len(),
            vector_set.dimension
        ));
    }

    ArtifactLoad::Loaded(FeatureSpace {
        name: name.to_string(),
        dimension: vector_set.dimension,
        vectors: vector_set.vectors,
        ids,
        index,
    })
}

/// Write one feature space's artifact triple, building a fresh index of
/// `kind` over `vectors`.
pub fn write_space(
    dir: &Path,
    name: &str,
    dimension: usize,
    vectors: Vec<Vec<f32>>,
    ids: &[String],
    kind: IndexKind,
) -> Result<()> {
    if vectors.len() != ids.len() {
        return Err(PixseekError::InvalidParameter(format!(
            "{} vectors but {} ids",
            vectors.len(),
            ids.len()
        )));
    }

    let mut index: Box<dyn VectorIndex> = match kind {
        IndexKind::Flat => Box::new(FlatIndex::new(dimension)),
        IndexKind::Ivf => Box::new(IvfIndex::with_defaults(dimension)),
    };
    index.add_batch(vectors.clone())?;

    fs::create_dir_all(dir)?;

    let vector_set = VectorSetState { dimension, vectors };
    let encoded = bincode::encode_to_vec(&vector_set, config::standard())
        .map_err(|e| PixseekError::SerializationError(e.to_string()))?;
    fs::write(vectors_path(dir, name), encoded)?;

    let encoded = bincode::encode_to_vec(index.state(), config::standard())
        .map_err(|e| PixseekError::SerializationError(e.to_string()))?;
    fs::write(index_path(dir, name), encoded)?;

    fs::write(ids_path(dir, name), ids.join("\n"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_write_then_load_roundtrip() {
        let dir = tempdir().unwrap();
        write_space(
            dir.path(),
            "color",
            2,
            vec![vec![0.0, 0.0], vec![1.0, 0.0]],
            &ids(&["a.jpg", "b.jpg"]),
            IndexKind::Flat,
        )
        .unwrap();

        match load_space(dir.path(), "color") {
            ArtifactLoad::Loaded(space) => {
                assert_eq!(space.name, "color");
                assert_eq!(space.dimension, 2);
                assert_eq!(space.ids, ids(&["a.jpg", "b.jpg"]));
                assert_eq!(space.index.len(), 2);
                assert_eq!(space.index.kind(), IndexKind::Flat);
            }
            _ => panic!("expected Loaded"),
        }
    }

    #[test]
    fn test_missing_artifacts_are_absent() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            load_space(dir.path(), "texture"),
            ArtifactLoad::Absent
        ));
    }

    #[test]
    fn test_partial_triple_is_absent() {
        let dir = tempdir().unwrap();
        fs::write(vectors_path(dir.path(), "shape"), b"whatever").unwrap();
        assert!(matches!(
            load_space(dir.path(), "shape"),
            ArtifactLoad::Absent
        ));
    }

    #[test]
    fn test_corrupt_vector_set() {
        let dir = tempdir().unwrap();
        write_space(
            dir.path(),
            "color",
            2,
            vec![vec![0.0, 0.0]],
            &ids(&["a.jpg"]),
            IndexKind::Flat,
        )
        .unwrap();
        fs::write(vectors_path(dir.path(), "color"), b"\xff\xff\xff").unwrap();
        assert!(matches!(
            load_space(dir.path(), "color"),
            ArtifactLoad::Corrupt(_)
        ));
    }

    #[test]
    fn test_misaligned_ids_are_corrupt() {
        let dir = tempdir().unwrap();
        write_space(
            dir.path(),
            "color",
            2,
            vec![vec![0.0, 0.0], vec![1.0, 0.0]],
            &ids(&["a.jpg", "b.jpg"]),
            IndexKind::Flat,
        )
        .unwrap();
        fs::write(ids_path(dir.path(), "color"), "only_one.jpg\n").unwrap();
        assert!(matches!(
            load_space(dir.path(), "color"),
            ArtifactLoad::Corrupt(_)
        ));
    }

    #[test]
    fn test_ivf_artifacts_roundtrip() {
        let dir = tempdir().unwrap();
        write_space(
            dir.path(),
            "resnet",
            3,
            vec![vec![0.0; 3], vec![1.0; 3], vec![2.0; 3]],
            &ids(&["a", "b", "c"]),
            IndexKind::Ivf,
        )
        .unwrap();

        match load_space(dir.path(), "resnet") {
            ArtifactLoad::Loaded(space) => {
                assert_eq!(space.index.kind(), IndexKind::Ivf);
                let hits = space.index.search(&[1.0, 1.0, 1.0], 1).unwrap();
                assert_eq!(hits[0].0, 1);
            }
            _ => panic!("expected Loaded"),
        }
    }
}
