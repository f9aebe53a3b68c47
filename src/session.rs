//! Dual export: one crop commit → two artifacts.
//!
//! A [`Session`] holds the current source image and a single
//! [`SessionState`]. Committing a crop extracts the selected region
//! ("left", offset 0) and then the equally-sized region directly to its
//! right ("right", offset = crop width), one after the other.
//!
//! ```text
//! Idle ──commit──▶ Committing ──both ok──▶ Ready(pair)
//!                      │
//!                      └──either fails──▶ Errored(message)
//! Ready / Errored ──commit──▶ Committing
//! ```
//!
//! ## Rules
//!
//! - No image, or a crop with zero width or height or a non-finite origin:
//!   the commit is skipped.
//!   Nothing is extracted and the current state (and artifacts) stay as they are.
//! - A commit while another one is running is rejected with [`CommitError::Busy`].
//! - Entering `Committing` drops the previous pair. A failed commit never
//!   exposes a half-finished pair: if the left half fails the right half is
//!   not attempted, and either failure leaves no artifacts.
//! - Dropping a commit future mid-flight leaves the session `Errored`, never
//!   stuck in `Committing`.
//!
//! The state lives behind a `std::sync::Mutex` that is only held for short,
//! synchronous updates, never across an `.await`.

use crate::artifact::ArtifactPair;
use crate::config::ExportConfig;
use crate::geometry::CropRegion;
use crate::imaging::{ExtractError, RasterBackend, extract};
use crate::presets;
use crate::source::SourceImage;
use log::{debug, info, warn};
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;

/// Which half of the split an extraction produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Half {
    Left,
    Right,
}

impl fmt::Display for Half {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Half::Left => f.write_str("left"),
            Half::Right => f.write_str("right"),
        }
    }
}

#[derive(Error, Debug)]
pub enum CommitError {
    #[error("a commit is already in progress")]
    Busy,
    #[error("extracting the {half} half failed: {source}")]
    Extract {
        half: Half,
        #[source]
        source: ExtractError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Committing,
    Ready(ArtifactPair),
    Errored(String),
}

/// What a commit call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Preconditions unmet; nothing extracted, state untouched.
    Skipped,
    Committed(ArtifactPair),
}

struct Inner {
    image: Option<SourceImage>,
    state: SessionState,
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Moves the session out of `Committing` even if the commit is dropped.
struct CommitGuard<'a> {
    inner: &'a Mutex<Inner>,
    finished: bool,
}

impl<'a> CommitGuard<'a> {
    fn new(inner: &'a Mutex<Inner>) -> Self {
        Self {
            inner,
            finished: false,
        }
    }

    fn finish(mut self, state: SessionState) {
        lock(self.inner).state = state;
        self.finished = true;
    }
}

impl Drop for CommitGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            warn!("commit dropped before completion");
            lock(self.inner).state = SessionState::Errored("commit cancelled".to_string());
        }
    }
}

/// One crop session over a backend.
pub struct Session<B: RasterBackend> {
    backend: B,
    config: ExportConfig,
    inner: Mutex<Inner>,
}

impl<B: RasterBackend> Session<B> {
    pub fn new(backend: B, config: ExportConfig) -> Self {
        Self {
            backend,
            config,
            inner: Mutex::new(Inner {
                image: None,
                state: SessionState::Idle,
            }),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Replace the source image. Resets to `Idle` and releases any artifacts.
    pub fn load_image(&self, image: SourceImage) -> Result<(), CommitError> {
        let mut inner = lock(&self.inner);
        if inner.state == SessionState::Committing {
            return Err(CommitError::Busy);
        }
        inner.image = Some(image);
        inner.state = SessionState::Idle;
        Ok(())
    }

    /// End the session: back to `Idle`, artifacts released, image kept.
    pub fn reset(&self) -> Result<(), CommitError> {
        let mut inner = lock(&self.inner);
        if inner.state == SessionState::Committing {
            return Err(CommitError::Busy);
        }
        inner.state = SessionState::Idle;
        Ok(())
    }

    pub fn image(&self) -> Option<SourceImage> {
        lock(&self.inner).image.clone()
    }

    pub fn state(&self) -> SessionState {
        lock(&self.inner).state.clone()
    }

    /// True while a commit is running (the loading indicator).
    pub fn is_busy(&self) -> bool {
        lock(&self.inner).state == SessionState::Committing
    }

    /// The current pair, only when the last commit succeeded.
    pub fn artifacts(&self) -> Option<ArtifactPair> {
        match &lock(&self.inner).state {
            SessionState::Ready(pair) => Some(pair.clone()),
            _ => None,
        }
    }

    /// Extract both halves of `crop` and make them the current pair.
    pub async fn commit(&self, crop: &CropRegion) -> Result<CommitOutcome, CommitError> {
        let (image, crop) = {
            let mut inner = lock(&self.inner);
            let Some(image) = inner.image.clone() else {
                debug!("commit skipped: no image loaded");
                return Ok(CommitOutcome::Skipped);
            };
            let crop = crop.to_pixels(image.dims());
            if !crop.is_extractable() {
                debug!(
                    "commit skipped: crop ({}, {}) {}x{} is not extractable",
                    crop.x, crop.y, crop.width, crop.height
                );
                return Ok(CommitOutcome::Skipped);
            }
            if inner.state == SessionState::Committing {
                return Err(CommitError::Busy);
            }
            inner.state = SessionState::Committing;
            (image, crop)
        };

        let guard = CommitGuard::new(&self.inner);
        match self.extract_pair(&image, &crop).await {
            Ok(pair) => {
                info!(
                    "committed {} ({}) and {} ({})",
                    pair.left.filename, pair.left.handle, pair.right.filename, pair.right.handle
                );
                guard.finish(SessionState::Ready(pair.clone()));
                Ok(CommitOutcome::Committed(pair))
            }
            Err(e) => {
                warn!("commit failed: {e}");
                guard.finish(SessionState::Errored(e.to_string()));
                Err(e)
            }
        }
    }

    /// Commit the left half of the image at full height.
    pub async fn halve(&self) -> Result<CommitOutcome, CommitError> {
        match self.image() {
            Some(image) => self.commit(&presets::halve(image.dims())).await,
            None => Ok(CommitOutcome::Skipped),
        }
    }

    /// Commit a square of half the image width.
    pub async fn square(&self) -> Result<CommitOutcome, CommitError> {
        match self.image() {
            Some(image) => self.commit(&presets::square(image.dims())).await,
            None => Ok(CommitOutcome::Skipped),
        }
    }

    async fn extract_pair(
        &self,
        image: &SourceImage,
        crop: &CropRegion,
    ) -> Result<ArtifactPair, CommitError> {
        let names = &self.config.filenames;

        let left_params = self.config.extract_params(0.0, &names.left);
        let left = extract(&self.backend, image, crop, &left_params)
            .await
            .map_err(|source| CommitError::Extract {
                half: Half::Left,
                source,
            })?;

        let right_params = self.config.extract_params(crop.width, &names.right);
        let right = extract(&self.backend, image, crop, &right_params)
            .await
            .map_err(|source| CommitError::Extract {
                half: Half::Right,
                source,
            })?;

        Ok(ArtifactPair { left, right })
    }
}
