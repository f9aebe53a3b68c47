//! Pure Rust raster backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Off-screen buffer | `image::RgbaImage` (transparent black) |
//! | Alpha flattening | `DynamicImage::to_rgb8` (transparent → black, like a JPEG canvas export) |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` on the tokio blocking pool |

use super::backend::{BackendError, RasterBackend};
use super::params::Quality;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbaImage};
use log::debug;
use std::future::Future;

/// Largest buffer browsers hand out a 2D context for (16384²).
pub const DEFAULT_MAX_CANVAS_PIXELS: u64 = 16_384 * 16_384;

/// Raster backend using the `image` crate.
///
/// Buffers larger than `max_canvas_pixels` are refused with
/// [`BackendError::ContextUnavailable`]. A zero-area buffer is handed out
/// but encodes to zero bytes.
pub struct RustBackend {
    max_canvas_pixels: u64,
}

impl RustBackend {
    pub fn new() -> Self {
        Self {
            max_canvas_pixels: DEFAULT_MAX_CANVAS_PIXELS,
        }
    }

    pub fn with_max_canvas_pixels(max_canvas_pixels: u64) -> Self {
        Self { max_canvas_pixels }
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Flatten alpha and encode as baseline JPEG.
fn encode_jpeg_blocking(canvas: RgbaImage, quality: Quality) -> Result<Vec<u8>, BackendError> {
    let (width, height) = canvas.dimensions();
    if width == 0 || height == 0 {
        return Ok(Vec::new());
    }
    let rgb = DynamicImage::ImageRgba8(canvas).to_rgb8();

    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality.as_u8()).write_image(
        rgb.as_raw(),
        width,
        height,
        ExtendedColorType::Rgb8,
    )?;
    debug!(
        "encoded {}x{} buffer at quality {} → {} bytes",
        width,
        height,
        quality.value(),
        bytes.len()
    );
    Ok(bytes)
}

impl RasterBackend for RustBackend {
    fn acquire_canvas(&self, width: u32, height: u32) -> Result<RgbaImage, BackendError> {
        if width as u64 * height as u64 > self.max_canvas_pixels {
            return Err(BackendError::ContextUnavailable { width, height });
        }
        Ok(RgbaImage::new(width, height))
    }

    fn encode_jpeg(
        &self,
        canvas: RgbaImage,
        quality: Quality,
    ) -> impl Future<Output = Result<Vec<u8>, BackendError>> + Send {
        async move {
            tokio::task::spawn_blocking(move || encode_jpeg_blocking(canvas, quality))
                .await
                .map_err(|e| BackendError::ProcessingFailed(format!("encoder task failed: {e}")))?
        }
    }
}
