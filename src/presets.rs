//! Ready-made crop shapes.
//!
//! Both presets anchor at the top-left corner and are half the displayed
//! width wide, so the right half of the split is exactly the other half of
//! the image:
//!
//! ```text
//! halve:  ┌────────┬────────┐     square: ┌────────┬────────┐
//!         │  left  │ right  │             │  left  │ right  │
//!         │        │        │             └────────┴────────┘
//!         └────────┴────────┘
//! ```

use crate::geometry::{CropRegion, SourceDims};

/// Initial selector width, in displayed pixels.
pub const INITIAL_CROP_WIDTH: f64 = 1080.0;

/// Left half of the image at full height, no aspect lock.
pub fn halve(dims: &SourceDims) -> CropRegion {
    CropRegion::px(
        0.0,
        0.0,
        dims.displayed_width() / 2.0,
        dims.displayed_height(),
    )
}

/// Square of half the image width, locked to 1:1.
pub fn square(dims: &SourceDims) -> CropRegion {
    let side = dims.displayed_width() / 2.0;
    CropRegion::px(0.0, 0.0, side, side).with_aspect(1.0)
}

/// The selection shown before the user drags anything: a 1:1 square
/// [`INITIAL_CROP_WIDTH`] wide, shrunk to fit the image.
pub fn initial(dims: &SourceDims) -> CropRegion {
    let side = INITIAL_CROP_WIDTH
        .min(dims.displayed_width())
        .min(dims.displayed_height());
    CropRegion::px(0.0, 0.0, side, side).with_aspect(1.0)
}
