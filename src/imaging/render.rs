//! Pixel copy from a source image into an off-screen buffer.
//!
//! Semantics follow a canvas `drawImage(src, sx, sy, sw, sh, 0, 0, W, H)`:
//! the sample rectangle is stretched to fill the whole buffer. When the
//! sample runs past the source edge it is clipped, the destination is
//! clipped by the same proportion, and the uncovered part of the buffer is
//! left as it was (transparent black for a fresh buffer).
//!
//! That last rule matters for the right half of a split: a crop wider than
//! half the image produces a right half whose tail lies outside the image.

use crate::geometry::SampleRect;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, RgbaImage};

/// Integer rectangle actually written into the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawnRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Snap a fractional span `[start, end)` to whole pixels inside `0..limit`.
///
/// Returns `(start, len)` with `len >= 1`, or `None` when `limit` is 0.
fn snap_span(start: f64, end: f64, limit: u32) -> Option<(u32, u32)> {
    if limit == 0 {
        return None;
    }
    let first = (start.round().max(0.0) as u32).min(limit - 1);
    let last = (end.round().max(0.0) as u32).clamp(first + 1, limit);
    Some((first, last - first))
}

/// Copy `sample` from `source` into `canvas`, scaled to fill it.
///
/// Resampling uses Lanczos3 whenever the snapped source and destination
/// sizes differ. Returns the destination rectangle that received pixels,
/// or `None` when nothing overlaps.
pub fn draw_region(
    source: &DynamicImage,
    sample: &SampleRect,
    canvas: &mut RgbaImage,
) -> Option<DrawnRect> {
    let (canvas_w, canvas_h) = canvas.dimensions();
    let positive = |v: f64| v.is_finite() && v > 0.0;
    if canvas_w == 0 || canvas_h == 0 || !positive(sample.width) || !positive(sample.height) {
        return None;
    }

    let (natural_w, natural_h) = source.dimensions();
    let clip_x0 = sample.x.max(0.0);
    let clip_y0 = sample.y.max(0.0);
    let clip_x1 = sample.right().min(natural_w as f64);
    let clip_y1 = sample.bottom().min(natural_h as f64);
    if clip_x1 <= clip_x0 || clip_y1 <= clip_y0 {
        return None;
    }

    // Source → destination scale along each axis
    let fx = canvas_w as f64 / sample.width;
    let fy = canvas_h as f64 / sample.height;

    let (src_x, src_w) = snap_span(clip_x0, clip_x1, natural_w)?;
    let (src_y, src_h) = snap_span(clip_y0, clip_y1, natural_h)?;
    let (dst_x, dst_w) = snap_span((clip_x0 - sample.x) * fx, (clip_x1 - sample.x) * fx, canvas_w)?;
    let (dst_y, dst_h) = snap_span((clip_y0 - sample.y) * fy, (clip_y1 - sample.y) * fy, canvas_h)?;

    let region = source.crop_imm(src_x, src_y, src_w, src_h).to_rgba8();
    let scaled = if (src_w, src_h) == (dst_w, dst_h) {
        region
    } else {
        imageops::resize(&region, dst_w, dst_h, FilterType::Lanczos3)
    };
    imageops::replace(canvas, &scaled, dst_x as i64, dst_y as i64);

    Some(DrawnRect {
        x: dst_x,
        y: dst_y,
        width: dst_w,
        height: dst_h,
    })
}
