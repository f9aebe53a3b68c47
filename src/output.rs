//! CLI output formatting.
//!
//! # Output Format
//!
//! ```text
//! Source: photos/pair.jpg
//!     2000x1000 px (displayed at 1000x500)
//! Crop: 0,0 500x500 px, aspect 1:1
//! left  → out/left.png
//!     1000x1000, 412034 bytes, blob:3f1c0a9e5d2b7c44
//! right → out/right.png
//!     1000x1000, 398112 bytes, blob:9a0e44c1b27d3f10
//! ```
//!
//! Each piece has a `format_*` function (returns `Vec<String>`) for
//! testability and the CLI prints the lines. Format functions are pure.

use crate::artifact::{ArtifactPair, ExtractedArtifact};
use crate::delivery::SavedPair;
use crate::geometry::{CropRegion, CropUnit, SourceDims};
use std::path::Path;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Trim a trailing `.0` from whole numbers.
fn number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value:.2}")
    }
}

pub fn format_source(path: &Path, dims: &SourceDims) -> Vec<String> {
    let mut lines = vec![format!("Source: {}", path.display())];
    let natural = format!("{}x{} px", dims.natural_width(), dims.natural_height());
    if dims.scale_x() == 1.0 && dims.scale_y() == 1.0 {
        lines.push(format!("{}{}", indent(1), natural));
    } else {
        lines.push(format!(
            "{}{} (displayed at {}x{})",
            indent(1),
            natural,
            number(dims.displayed_width()),
            number(dims.displayed_height())
        ));
    }
    lines
}

pub fn format_crop(crop: &CropRegion) -> String {
    let unit = match crop.unit {
        CropUnit::Px => "px",
        CropUnit::Percent => "%",
    };
    let mut line = format!(
        "Crop: {},{} {}x{} {}",
        number(crop.x),
        number(crop.y),
        number(crop.width),
        number(crop.height),
        unit
    );
    if let Some(aspect) = crop.aspect {
        if aspect == 1.0 {
            line.push_str(", aspect 1:1");
        } else {
            line.push_str(&format!(", aspect {}", number(aspect)));
        }
    }
    line
}

fn artifact_lines(label: &str, path: &Path, artifact: &ExtractedArtifact) -> Vec<String> {
    vec![
        format!("{label} → {}", path.display()),
        format!(
            "{}{}x{}, {} bytes, {}",
            indent(1),
            artifact.width,
            artifact.height,
            artifact.len(),
            artifact.handle
        ),
    ]
}

pub fn format_saved_pair(pair: &ArtifactPair, saved: &SavedPair) -> Vec<String> {
    let mut lines = artifact_lines("left ", &saved.left, &pair.left);
    lines.extend(artifact_lines("right", &saved.right, &pair.right));
    lines
}

pub fn format_skipped() -> Vec<String> {
    vec!["Nothing to export: the crop is empty or not a valid rectangle.".to_string()]
}

pub fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}
