//! # split-crop
//!
//! Crop a region out of an image and export it together with the
//! equally-sized region directly to its right, as two JPEG files. Typical
//! use: cut a wide photo into two side-by-side halves for a two-image post.
//!
//! # Architecture: Resolve → Extract → Commit
//!
//! ```text
//! 1. Resolve   crop (displayed px)  →  buffer size + sample rect (natural px)
//! 2. Extract   sample rect          →  off-screen buffer  →  JPEG bytes
//! 3. Commit    crop                 →  extract(offset 0), then extract(offset width)
//! ```
//!
//! The crop rectangle comes from whatever draws the selection UI; this crate
//! never computes drag geometry. It only needs the final rectangle, in the
//! coordinates of the image *as displayed*, plus the displayed size so it
//! can scale back to the decoded pixels.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`geometry`] | Displayed → natural coordinate math, crop regions |
//! | [`imaging`] | Buffer acquisition, pixel copy, JPEG encoding, [`imaging::extract`] |
//! | [`session`] | Two-half commit state machine |
//! | [`presets`] | "Halve" and "square" crop shapes |
//! | [`source`] | Decoded source image with its displayed size |
//! | [`artifact`] | Encoded outputs and their content-addressed handles |
//! | [`delivery`] | Writing artifacts to disk |
//! | [`config`] | `split-crop.toml` loading and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## The Offset Trick
//!
//! Both halves come from the *same* crop rectangle. The right half is the
//! left half shifted by exactly one crop width, so the two outputs always
//! have identical dimensions and line up seamlessly when placed side by
//! side. A crop wider than half the image yields a right half that runs
//! off the edge; that part is black.
//!
//! ## Bounded Waits
//!
//! Encoding is asynchronous and runs once. An encoder that never answers
//! would otherwise hang the session forever, so every encode runs under a
//! timeout, and buffer acquisition retries a fixed number of times with
//! backoff instead of spinning.
//!
//! ## One State, Not Flags
//!
//! A session is exactly one of `Idle`, `Committing`, `Ready(pair)` or
//! `Errored(message)`. "Loading and errored at once" or "errored but still
//! showing an old left half" cannot be represented.

pub mod artifact;
pub mod config;
pub mod delivery;
pub mod geometry;
pub mod imaging;
pub mod output;
pub mod presets;
pub mod session;
pub mod source;

pub use artifact::{ArtifactHandle, ArtifactPair, ExtractedArtifact};
pub use config::ExportConfig;
pub use geometry::{CropRegion, CropUnit, SourceDims};
pub use session::{CommitError, CommitOutcome, Session, SessionState};
pub use source::SourceImage;
