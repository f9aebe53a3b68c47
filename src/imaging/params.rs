//! Parameter types for extraction.
//!
//! These structs describe *what* to extract, not *how*. They are the
//! interface between the [`session`](crate::session) (which decides which
//! halves to produce) and [`operations`](super::operations) (which drives the
//! [`backend`](super::backend)). Keeping them separate lets tests swap in a
//! mock backend without touching orchestration logic.
//!
//! ## Types
//!
//! - [`Quality`]: JPEG encoding quality (1–100, default 100). Clamped on construction.
//! - [`ContextRetry`]: how long to wait for an off-screen buffer before giving up.
//! - [`ExtractParams`]: everything needed for one half: offset, filename, pixel ratio, limits.

use std::time::Duration;

/// Quality setting for JPEG encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }

    /// Quality as the encoder's byte-sized parameter.
    pub fn as_u8(self) -> u8 {
        self.0.clamp(1, 100) as u8
    }
}

impl Default for Quality {
    /// Maximum quality.
    fn default() -> Self {
        Self(100)
    }
}

/// Bounded retry for acquiring an off-screen buffer.
///
/// Attempt `n` (0-based) is followed by a sleep of `initial_backoff * 2^n`
/// before the next one. No sleep after the last attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextRetry {
    pub attempts: u32,
    pub initial_backoff: Duration,
}

impl ContextRetry {
    /// Fail on the first unavailable context.
    pub fn immediate() -> Self {
        Self {
            attempts: 1,
            initial_backoff: Duration::ZERO,
        }
    }

    /// Delay before retry number `attempt + 1`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.initial_backoff
            .saturating_mul(2u32.saturating_pow(attempt.min(16)))
    }
}

impl Default for ContextRetry {
    fn default() -> Self {
        Self {
            attempts: 3,
            initial_backoff: Duration::from_millis(10),
        }
    }
}

/// Parameters for extracting one half of a crop.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractParams {
    /// Horizontal shift in displayed units, applied before scaling.
    pub offset: f64,
    /// Suggested download filename attached to the artifact.
    pub filename: String,
    pub pixel_ratio: f64,
    pub quality: Quality,
    /// Upper bound on the asynchronous encode step.
    pub encode_timeout: Duration,
    pub context_retry: ContextRetry,
}

impl ExtractParams {
    pub fn new(offset: f64, filename: impl Into<String>) -> Self {
        Self {
            offset,
            filename: filename.into(),
            pixel_ratio: 1.0,
            quality: Quality::default(),
            encode_timeout: Duration::from_secs(30),
            context_retry: ContextRetry::default(),
        }
    }
}
