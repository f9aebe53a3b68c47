//! Crop geometry: displayed coordinates → natural-resolution pixels.
//!
//! All functions here are pure and testable without any I/O or images.
//!
//! A crop rectangle arrives in *displayed* coordinates, the size the image
//! is rendered at while the user drags a selection. Extraction happens
//! against the *natural* (decoded) pixels, so every coordinate is scaled by
//! `natural / displayed` on its own axis. The output buffer is additionally
//! multiplied by the device pixel ratio so high-density displays get a
//! buffer with one pixel per physical display pixel.
//!
//! ```text
//! scale_x    = natural_width  / displayed_width
//! scale_y    = natural_height / displayed_height
//! out_width  = width  * pixel_ratio * scale_x      (truncated)
//! out_height = height * pixel_ratio * scale_y      (truncated)
//! sample     = ((x + offset) * scale_x, y * scale_y, width * scale_x, height * scale_y)
//! ```
//!
//! The horizontal `offset` is what turns one crop rectangle into two
//! images: offset `0` samples the selection itself, offset `width` samples
//! the equally-sized region directly to its right.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("displayed size must be positive, got {width}x{height}")]
    ZeroDisplayed { width: f64, height: f64 },
    #[error("natural size must be positive, got {width}x{height}")]
    ZeroNatural { width: u32, height: u32 },
}

/// Displayed and natural dimensions of a source image.
///
/// Both pairs are strictly positive; that is checked once here so the
/// resolver never divides by zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceDims {
    displayed_width: f64,
    displayed_height: f64,
    natural_width: u32,
    natural_height: u32,
}

impl SourceDims {
    pub fn new(displayed: (f64, f64), natural: (u32, u32)) -> Result<Self, GeometryError> {
        let (displayed_width, displayed_height) = displayed;
        let (natural_width, natural_height) = natural;

        if natural_width == 0 || natural_height == 0 {
            return Err(GeometryError::ZeroNatural {
                width: natural_width,
                height: natural_height,
            });
        }
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(displayed_width) || !positive(displayed_height) {
            return Err(GeometryError::ZeroDisplayed {
                width: displayed_width,
                height: displayed_height,
            });
        }

        Ok(Self {
            displayed_width,
            displayed_height,
            natural_width,
            natural_height,
        })
    }

    /// Dimensions of an image displayed at its natural size.
    pub fn natural(width: u32, height: u32) -> Result<Self, GeometryError> {
        Self::new((width as f64, height as f64), (width, height))
    }

    pub fn displayed_width(&self) -> f64 {
        self.displayed_width
    }

    pub fn displayed_height(&self) -> f64 {
        self.displayed_height
    }

    pub fn natural_width(&self) -> u32 {
        self.natural_width
    }

    pub fn natural_height(&self) -> u32 {
        self.natural_height
    }

    pub fn scale_x(&self) -> f64 {
        self.natural_width as f64 / self.displayed_width
    }

    pub fn scale_y(&self) -> f64 {
        self.natural_height as f64 / self.displayed_height
    }
}

/// Unit a crop rectangle is expressed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropUnit {
    /// Displayed pixels.
    #[default]
    Px,
    /// Percent (0–100) of the displayed size.
    Percent,
}

/// A crop rectangle as reported by the selector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRegion {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub unit: CropUnit,
    /// Width / height lock enforced by the selector while dragging.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect: Option<f64>,
}

impl CropRegion {
    /// A free (unlocked) crop in displayed pixels.
    pub fn px(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            unit: CropUnit::Px,
            aspect: None,
        }
    }

    /// A free crop in percent of the displayed size.
    pub fn percent(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            unit: CropUnit::Percent,
            ..Self::px(x, y, width, height)
        }
    }

    pub fn with_aspect(self, aspect: f64) -> Self {
        Self {
            aspect: Some(aspect),
            ..self
        }
    }

    /// Whether the region has an area worth extracting and a usable origin.
    pub fn is_extractable(&self) -> bool {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        self.x.is_finite() && self.y.is_finite() && positive(self.width) && positive(self.height)
    }

    /// Convert to displayed pixels. Pixel crops are returned unchanged.
    pub fn to_pixels(&self, dims: &SourceDims) -> Self {
        match self.unit {
            CropUnit::Px => *self,
            CropUnit::Percent => {
                let dw = dims.displayed_width() / 100.0;
                let dh = dims.displayed_height() / 100.0;
                Self {
                    x: self.x * dw,
                    y: self.y * dh,
                    width: self.width * dw,
                    height: self.height * dh,
                    unit: CropUnit::Px,
                    aspect: self.aspect,
                }
            }
        }
    }
}

/// Source-pixel rectangle to sample from, in natural-resolution pixels.
///
/// Kept fractional; the renderer decides how to snap it to the pixel grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl SampleRect {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// Everything the extractor needs to know about one half.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedGeometry {
    pub scale_x: f64,
    pub scale_y: f64,
    /// Off-screen buffer width in pixels.
    pub out_width: u32,
    /// Off-screen buffer height in pixels.
    pub out_height: u32,
    pub sample: SampleRect,
}

/// Normalize a device pixel ratio: anything unusable means "unknown" → 1.
pub fn effective_pixel_ratio(pixel_ratio: f64) -> f64 {
    if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
        pixel_ratio
    } else {
        1.0
    }
}

/// Truncate a buffer dimension the way a canvas size assignment does.
///
/// Negative and NaN values become 0; huge values saturate.
fn to_buffer_len(value: f64) -> u32 {
    value.trunc() as u32
}

/// Resolve a crop into buffer dimensions and a sample rectangle.
///
/// `offset` is a horizontal shift in displayed units, applied before scaling.
///
/// # Examples
/// ```
/// # use split_crop::geometry::{CropRegion, SourceDims, resolve};
/// // Displayed at half size: every coordinate doubles.
/// let dims = SourceDims::new((500.0, 250.0), (1000, 500)).unwrap();
/// let crop = CropRegion::px(10.0, 20.0, 100.0, 50.0);
///
/// let left = resolve(&dims, &crop, 1.0, 0.0);
/// assert_eq!((left.out_width, left.out_height), (200, 100));
/// assert_eq!(left.sample.x, 20.0);
///
/// let right = resolve(&dims, &crop, 1.0, crop.width);
/// assert_eq!(right.sample.x, 220.0);
/// ```
pub fn resolve(
    dims: &SourceDims,
    crop: &CropRegion,
    pixel_ratio: f64,
    offset: f64,
) -> ResolvedGeometry {
    let crop = crop.to_pixels(dims);
    let ratio = effective_pixel_ratio(pixel_ratio);
    let scale_x = dims.scale_x();
    let scale_y = dims.scale_y();

    ResolvedGeometry {
        scale_x,
        scale_y,
        out_width: to_buffer_len(crop.width * ratio * scale_x),
        out_height: to_buffer_len(crop.height * ratio * scale_y),
        sample: SampleRect {
            x: (crop.x + offset) * scale_x,
            y: crop.y * scale_y,
            width: crop.width * scale_x,
            height: crop.height * scale_y,
        },
    }
}
