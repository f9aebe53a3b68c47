//! Image extraction in pure Rust, no system libraries.
//!
//! | Step | Crate / function |
//! |---|---|
//! | **Buffer** | `image::RgbaImage` |
//! | **Copy/scale** | `crop_imm` + `imageops::resize` (Lanczos3) + `imageops::replace` |
//! | **Encode** | `image::codecs::jpeg::JpegEncoder` on `tokio::task::spawn_blocking` |
//! | **Bounds** | `tokio::time::timeout` (encode), `tokio::time::sleep` backoff (context) |
//!
//! The module is split into:
//! - **Parameters**: what to extract ([`ExtractParams`], [`Quality`], [`ContextRetry`])
//! - **Render**: pure pixel copy into a buffer
//! - **Backend**: [`RasterBackend`] trait + [`RustBackend`]
//! - **Operations**: [`extract`], combining geometry, render and backend

pub mod backend;
pub mod operations;
mod params;
pub mod render;
pub mod rust_backend;

pub use backend::{BackendError, RasterBackend};
pub use operations::{ExtractError, extract};
pub use params::{ContextRetry, ExtractParams, Quality};
pub use rust_backend::RustBackend;
