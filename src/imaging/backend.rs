//! Raster backend trait and shared error type.
//!
//! The [`RasterBackend`] trait defines the two platform operations an
//! extraction needs: acquire an off-screen buffer, and encode a filled buffer
//! to JPEG. Everything between those two steps (geometry, pixel copy) is pure
//! and lives outside the backend.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use the recording `MockBackend` in this module's tests.

use super::params::Quality;
use image::RgbaImage;
use std::future::Future;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("no rendering context available for a {width}x{height} buffer")]
    ContextUnavailable { width: u32, height: u32 },
    #[error("JPEG encode failed: {0}")]
    Encode(#[from] image::ImageError),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Trait for raster backends.
///
/// `acquire_canvas` is synchronous and may report
/// [`BackendError::ContextUnavailable`], which callers are allowed to retry.
/// `encode_jpeg` is the single asynchronous step; it consumes the buffer and
/// resolves once with the encoded bytes. An empty byte vector means the
/// encoder produced nothing.
pub trait RasterBackend: Sync {
    /// Allocate a transparent `width`×`height` buffer.
    fn acquire_canvas(&self, width: u32, height: u32) -> Result<RgbaImage, BackendError>;

    /// Encode a buffer to JPEG.
    fn encode_jpeg(
        &self,
        canvas: RgbaImage,
        quality: Quality,
    ) -> impl Future<Output = Result<Vec<u8>, BackendError>> + Send;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    /// How the mock answers one `encode_jpeg` call.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum EncodeBehavior {
        /// Resolve with a small byte string naming the buffer size.
        Succeed,
        /// Resolve with zero bytes.
        Empty,
        /// Never resolve.
        Stall,
        /// Resolve successfully after a (tokio) delay.
        Delay(Duration),
        /// Resolve with a processing error.
        Fail,
    }

    /// Mock backend that records operations and scripts encoder behavior.
    /// Uses Mutex (not RefCell) so it is Sync like real backends.
    #[derive(Default)]
    pub struct MockBackend {
        /// Number of upcoming `acquire_canvas` calls that report no context.
        pub unavailable_for: Mutex<u32>,
        /// Behaviors consumed front-first; `Succeed` once exhausted.
        pub encode_behaviors: Mutex<VecDeque<EncodeBehavior>>,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Acquire { width: u32, height: u32 },
        Encode { width: u32, height: u32, quality: u32 },
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_encodes(behaviors: Vec<EncodeBehavior>) -> Self {
            Self {
                encode_behaviors: Mutex::new(behaviors.into()),
                ..Self::default()
            }
        }

        pub fn with_unavailable_context(failures: u32) -> Self {
            Self {
                unavailable_for: Mutex::new(failures),
                ..Self::default()
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        pub fn acquire_count(&self) -> usize {
            self.get_operations()
                .iter()
                .filter(|op| matches!(op, RecordedOp::Acquire { .. }))
                .count()
        }

        pub fn encode_count(&self) -> usize {
            self.get_operations()
                .iter()
                .filter(|op| matches!(op, RecordedOp::Encode { .. }))
                .count()
        }
    }

    /// Bytes the mock "encodes" a buffer to. Distinct per buffer size.
    pub fn mock_bytes(width: u32, height: u32) -> Vec<u8> {
        format!("jpeg:{width}x{height}").into_bytes()
    }

    impl RasterBackend for MockBackend {
        fn acquire_canvas(&self, width: u32, height: u32) -> Result<RgbaImage, BackendError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Acquire { width, height });

            let mut remaining = self.unavailable_for.lock().unwrap();
            if *remaining > 0 {
                *remaining -= 1;
                return Err(BackendError::ContextUnavailable { width, height });
            }
            Ok(RgbaImage::new(width, height))
        }

        fn encode_jpeg(
            &self,
            canvas: RgbaImage,
            quality: Quality,
        ) -> impl Future<Output = Result<Vec<u8>, BackendError>> + Send {
            let (width, height) = canvas.dimensions();
            self.operations.lock().unwrap().push(RecordedOp::Encode {
                width,
                height,
                quality: quality.value(),
            });
            let behavior = self
                .encode_behaviors
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(EncodeBehavior::Succeed);

            async move {
                match behavior {
                    EncodeBehavior::Succeed => Ok(mock_bytes(width, height)),
                    EncodeBehavior::Empty => Ok(Vec::new()),
                    EncodeBehavior::Stall => std::future::pending().await,
                    EncodeBehavior::Delay(delay) => {
                        tokio::time::sleep(delay).await;
                        Ok(mock_bytes(width, height))
                    }
                    EncodeBehavior::Fail => Err(BackendError::ProcessingFailed(
                        "mock encoder failure".to_string(),
                    )),
                }
            }
        }
    }

    #[test]
    fn mock_records_acquire() {
        let backend = MockBackend::new();

        let canvas = backend.acquire_canvas(40, 30).unwrap();
        assert_eq!(canvas.dimensions(), (40, 30));

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(
            &ops[0],
            RecordedOp::Acquire {
                width: 40,
                height: 30
            }
        ));
    }

    #[test]
    fn mock_reports_unavailable_context_then_recovers() {
        let backend = MockBackend::with_unavailable_context(2);

        assert!(matches!(
            backend.acquire_canvas(4, 4),
            Err(BackendError::ContextUnavailable { .. })
        ));
        assert!(backend.acquire_canvas(4, 4).is_err());
        assert!(backend.acquire_canvas(4, 4).is_ok());
        assert_eq!(backend.acquire_count(), 3);
    }

    #[tokio::test]
    async fn mock_encodes_scripted_behaviors_in_order() {
        let backend = MockBackend::with_encodes(vec![EncodeBehavior::Empty, EncodeBehavior::Fail]);

        let first = backend
            .encode_jpeg(RgbaImage::new(2, 2), Quality::new(90))
            .await
            .unwrap();
        assert!(first.is_empty());

        let second = backend
            .encode_jpeg(RgbaImage::new(2, 2), Quality::new(90))
            .await;
        assert!(matches!(second, Err(BackendError::ProcessingFailed(_))));

        let third = backend
            .encode_jpeg(RgbaImage::new(3, 2), Quality::new(90))
            .await
            .unwrap();
        assert_eq!(third, mock_bytes(3, 2));

        assert!(matches!(
            &backend.get_operations()[0],
            RecordedOp::Encode { quality: 90, .. }
        ));
    }
}
