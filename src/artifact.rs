//! Encoded outputs of an extraction.
//!
//! An [`ExtractedArtifact`] is immutable once built. Its bytes are shared
//! through an `Arc<[u8]>`, so handing a pair to the caller is cheap and the
//! memory is released when the last holder (usually the session, on the next
//! commit) drops it.
//!
//! ## Handles
//!
//! Every artifact carries an [`ArtifactHandle`]: `blob:` followed by the
//! first 16 hex digits of the SHA-256 of its bytes. Two artifacts with the
//! same handle hold the same encoded image, which makes "did the newer
//! commit really replace the older pair?" a simple comparison.

use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;

/// Content-addressed identifier for encoded bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactHandle(String);

impl ArtifactHandle {
    pub fn for_bytes(bytes: &[u8]) -> Self {
        let digest = format!("{:x}", Sha256::digest(bytes));
        Self(format!("blob:{}", &digest[..16]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One encoded half, tagged with its suggested filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedArtifact {
    pub filename: String,
    pub handle: ArtifactHandle,
    /// Encoded buffer dimensions.
    pub width: u32,
    pub height: u32,
    bytes: Arc<[u8]>,
}

impl ExtractedArtifact {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>, width: u32, height: u32) -> Self {
        let handle = ArtifactHandle::for_bytes(&bytes);
        Self {
            filename: filename.into(),
            handle,
            width,
            height,
            bytes: bytes.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// The two halves produced by one commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPair {
    pub left: ExtractedArtifact,
    pub right: ExtractedArtifact,
}
