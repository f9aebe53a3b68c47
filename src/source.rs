//! The decoded image a crop session works on.
//!
//! A [`SourceImage`] pairs decoded pixels with the size they are displayed
//! at. It is created once per selected file and never mutated; selecting a
//! new file replaces it wholesale. Pixels sit behind an `Arc` so the session
//! can hand a copy to an in-flight commit without cloning the raster.
//!
//! Decoding honours the EXIF Orientation tag, so natural dimensions and
//! every crop coordinate refer to the upright image, as a viewer shows it.

use crate::geometry::{GeometryError, SourceDims};
use image::{DynamicImage, GenericImageView, ImageDecoder, ImageReader};
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

#[derive(Debug, Clone)]
pub struct SourceImage {
    pixels: Arc<DynamicImage>,
    dims: SourceDims,
}

impl SourceImage {
    /// Wrap decoded pixels, displayed at their natural size.
    pub fn from_image(pixels: DynamicImage) -> Result<Self, SourceError> {
        let (width, height) = pixels.dimensions();
        let dims = SourceDims::natural(width, height)?;
        Ok(Self {
            pixels: Arc::new(pixels),
            dims,
        })
    }

    /// Decode an in-memory file (any format the `image` crate reads).
    pub fn decode(bytes: &[u8]) -> Result<Self, SourceError> {
        let mut decoder = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()?
            .into_decoder()?;
        let orientation = decoder.orientation()?;
        let mut pixels = DynamicImage::from_decoder(decoder)?;
        pixels.apply_orientation(orientation);
        Self::from_image(pixels)
    }

    /// Read a file fully into memory, then decode it.
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let bytes = std::fs::read(path)?;
        Self::decode(&bytes)
    }

    /// Same pixels, displayed at `width`×`height`.
    pub fn with_displayed_size(self, width: f64, height: f64) -> Result<Self, SourceError> {
        let dims = SourceDims::new(
            (width, height),
            (self.dims.natural_width(), self.dims.natural_height()),
        )?;
        Ok(Self { dims, ..self })
    }

    pub fn dims(&self) -> &SourceDims {
        &self.dims
    }

    pub fn pixels(&self) -> &DynamicImage {
        &self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::jpeg::JpegEncoder;
    use image::{ImageFormat, Rgb, RgbImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::new(width, height));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    /// JPEG with an APP1 Exif segment carrying only an Orientation tag.
    fn jpeg_with_orientation(img: &RgbImage, orientation: u8) -> Vec<u8> {
        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, 95)
            .encode_image(img)
            .unwrap();

        let mut exif = b"Exif\0\0MM\0\x2a\0\0\0\x08".to_vec();
        exif.extend_from_slice(&[0, 1]); // one IFD entry
        exif.extend_from_slice(&[0x01, 0x12, 0, 3, 0, 0, 0, 1, 0, orientation, 0, 0]);
        exif.extend_from_slice(&[0, 0, 0, 0]); // no next IFD

        let len = (exif.len() + 2) as u16;
        let mut segment = vec![0xFF, 0xE1];
        segment.extend_from_slice(&len.to_be_bytes());
        segment.extend_from_slice(&exif);

        // right after SOI
        jpeg.splice(2..2, segment);
        jpeg
    }

    #[test]
    fn decode_applies_exif_orientation() {
        // stored 40x20, left half red; orientation 6 shows it rotated 90° clockwise
        let stored = RgbImage::from_fn(40, 20, |x, _| {
            if x < 20 {
                Rgb([220, 30, 30])
            } else {
                Rgb([30, 30, 220])
            }
        });

        let source = SourceImage::decode(&jpeg_with_orientation(&stored, 6)).unwrap();

        assert_eq!(source.dims().natural_width(), 20);
        assert_eq!(source.dims().natural_height(), 40);
        let top = source.pixels().get_pixel(10, 5);
        let bottom = source.pixels().get_pixel(10, 35);
        assert!(top[0] > 150 && top[2] < 100, "top should be red, got {top:?}");
        assert!(bottom[2] > 150 && bottom[0] < 100, "bottom should be blue, got {bottom:?}");
    }

    #[test]
    fn decode_without_orientation_keeps_stored_layout() {
        let stored = RgbImage::from_pixel(40, 20, Rgb([90, 90, 90]));
        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, 95)
            .encode_image(&stored)
            .unwrap();

        let source = SourceImage::decode(&jpeg).unwrap();

        assert_eq!(source.pixels().dimensions(), (40, 20));
    }

    #[test]
    fn decode_uses_natural_size_for_display() {
        let source = SourceImage::decode(&png_bytes(30, 20)).unwrap();
        assert_eq!(source.dims().natural_width(), 30);
        assert_eq!(source.dims().displayed_width(), 30.0);
        assert_eq!(source.dims().scale_x(), 1.0);
    }

    #[test]
    fn displayed_size_changes_scale_only() {
        let source = SourceImage::decode(&png_bytes(30, 20))
            .unwrap()
            .with_displayed_size(15.0, 5.0)
            .unwrap();
        assert_eq!(source.dims().scale_x(), 2.0);
        assert_eq!(source.dims().scale_y(), 4.0);
        assert_eq!(source.pixels().dimensions(), (30, 20));
    }

    #[test]
    fn zero_displayed_size_is_rejected() {
        let result = SourceImage::decode(&png_bytes(30, 20))
            .unwrap()
            .with_displayed_size(0.0, 5.0);
        assert!(matches!(result, Err(SourceError::Geometry(_))));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let result = SourceImage::decode(b"definitely not an image");
        assert!(matches!(result, Err(SourceError::Decode(_))));
    }

    #[test]
    fn open_reads_file_from_disk() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("photo.png");
        std::fs::write(&path, png_bytes(8, 4)).unwrap();

        let source = SourceImage::open(&path).unwrap();
        assert_eq!(source.pixels().dimensions(), (8, 4));
    }

    #[test]
    fn open_missing_file_is_io_error() {
        let result = SourceImage::open(Path::new("/nonexistent/photo.png"));
        assert!(matches!(result, Err(SourceError::Io(_))));
    }
}
