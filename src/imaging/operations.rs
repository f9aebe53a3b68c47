//! Region extraction: geometry + pixel copy + encode.
//!
//! [`extract`] produces one [`ExtractedArtifact`] from a source image, a crop
//! and an [`ExtractParams`]. The steps are:
//!
//! 1. Resolve geometry with the requested horizontal offset.
//! 2. Acquire an off-screen buffer from the backend, retrying a bounded
//!    number of times with exponential backoff while no context is
//!    available.
//! 3. Copy the sample rectangle into the buffer (see [`render`](super::render)).
//! 4. Encode under a timeout. An encoder that never answers is an error,
//!    not a hang; an encoder that answers with nothing is an error too.
//!
//! The encode step runs once. There is no retry.

use super::backend::{BackendError, RasterBackend};
use super::params::{ContextRetry, ExtractParams};
use super::render::draw_region;
use crate::artifact::ExtractedArtifact;
use crate::geometry::{CropRegion, resolve};
use crate::source::SourceImage;
use image::RgbaImage;
use log::{debug, warn};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("encoder produced no data for {filename}")]
    EmptyEncode { filename: String },
    #[error("rendering context unavailable after {attempts} attempt(s)")]
    ContextUnavailable { attempts: u32 },
    #[error("encoding {filename} did not finish within {after:?}")]
    EncodeTimeout { filename: String, after: Duration },
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Result type for extraction.
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Acquire a buffer, sleeping between attempts while no context is available.
async fn acquire_with_retry(
    backend: &impl RasterBackend,
    width: u32,
    height: u32,
    retry: ContextRetry,
) -> Result<RgbaImage> {
    let attempts = retry.attempts.max(1);
    for attempt in 0..attempts {
        match backend.acquire_canvas(width, height) {
            Ok(canvas) => return Ok(canvas),
            Err(BackendError::ContextUnavailable { .. }) if attempt + 1 < attempts => {
                let delay = retry.backoff(attempt);
                warn!(
                    "no rendering context for {}x{} (attempt {}/{}), retrying in {:?}",
                    width,
                    height,
                    attempt + 1,
                    attempts,
                    delay
                );
                tokio::time::sleep(delay).await;
            }
            Err(BackendError::ContextUnavailable { .. }) => break,
            Err(e) => return Err(e.into()),
        }
    }
    Err(ExtractError::ContextUnavailable { attempts })
}

/// Extract one half of a crop as an encoded JPEG artifact.
pub async fn extract(
    backend: &impl RasterBackend,
    image: &SourceImage,
    crop: &CropRegion,
    params: &ExtractParams,
) -> Result<ExtractedArtifact> {
    let geometry = resolve(image.dims(), crop, params.pixel_ratio, params.offset);
    debug!(
        "{}: sample ({:.1}, {:.1}) {:.1}x{:.1} → buffer {}x{}",
        params.filename,
        geometry.sample.x,
        geometry.sample.y,
        geometry.sample.width,
        geometry.sample.height,
        geometry.out_width,
        geometry.out_height
    );

    let mut canvas = acquire_with_retry(
        backend,
        geometry.out_width,
        geometry.out_height,
        params.context_retry,
    )
    .await?;

    if draw_region(image.pixels(), &geometry.sample, &mut canvas).is_none() {
        debug!("{}: sample lies outside the source image", params.filename);
    }

    let bytes = tokio::time::timeout(
        params.encode_timeout,
        backend.encode_jpeg(canvas, params.quality),
    )
    .await
    .map_err(|_| ExtractError::EncodeTimeout {
        filename: params.filename.clone(),
        after: params.encode_timeout,
    })??;

    if bytes.is_empty() {
        return Err(ExtractError::EmptyEncode {
            filename: params.filename.clone(),
        });
    }

    Ok(ExtractedArtifact::new(
        params.filename.clone(),
        bytes,
        geometry.out_width,
        geometry.out_height,
    ))
}
