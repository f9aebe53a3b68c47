//! Hand artifacts to the user as files.
//!
//! The native counterpart of a browser download: each artifact is written
//! into a target directory under its suggested filename. Filenames must be
//! plain names; anything that would escape the directory is refused.

use crate::artifact::{ArtifactPair, ExtractedArtifact};
use log::info;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("artifact has no filename")]
    MissingFilename,
    #[error("refusing to write outside the output directory: {0}")]
    InvalidFilename(String),
}

/// Paths written for a pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedPair {
    pub left: PathBuf,
    pub right: PathBuf,
}

fn target_path(dir: &Path, filename: &str) -> Result<PathBuf, DeliveryError> {
    if filename.trim().is_empty() {
        return Err(DeliveryError::MissingFilename);
    }
    let mut components = Path::new(filename).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(dir.join(filename)),
        _ => Err(DeliveryError::InvalidFilename(filename.to_string())),
    }
}

/// Write one artifact into `dir`, creating the directory if needed.
pub fn save_artifact(dir: &Path, artifact: &ExtractedArtifact) -> Result<PathBuf, DeliveryError> {
    let path = target_path(dir, &artifact.filename)?;
    std::fs::create_dir_all(dir)?;
    std::fs::write(&path, artifact.bytes())?;
    info!(
        "saved {} ({} bytes) to {}",
        artifact.handle,
        artifact.len(),
        path.display()
    );
    Ok(path)
}

/// Write both halves into `dir`. Both names are checked before anything is written.
pub fn save_pair(dir: &Path, pair: &ArtifactPair) -> Result<SavedPair, DeliveryError> {
    target_path(dir, &pair.left.filename)?;
    target_path(dir, &pair.right.filename)?;
    Ok(SavedPair {
        left: save_artifact(dir, &pair.left)?,
        right: save_artifact(dir, &pair.right)?,
    })
}
