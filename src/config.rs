//! Export configuration.
//!
//! Handles loading and validating an optional `split-crop.toml`.
//! Every key has a default, so a config file only needs the values it
//! changes. Without a file the stock defaults apply unchanged.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! pixel_ratio = 1.0          # Device pixel ratio applied to output buffers
//!
//! [encoding]
//! quality = 100              # JPEG quality (1-100)
//! timeout_ms = 30000         # Give up on an encode after this long
//!
//! [context]
//! attempts = 3               # Tries to get an off-screen buffer
//! initial_backoff_ms = 10    # First retry delay, doubled each time
//!
//! [filenames]
//! left = "left.png"          # Suggested name for the crop itself
//! right = "right.png"        # Suggested name for the region to its right
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{ContextRetry, ExtractParams, Quality};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Export configuration loaded from TOML.
///
/// All fields have defaults. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Device pixel ratio. Output buffers are this many times larger than
    /// the natural-resolution crop.
    pub pixel_ratio: f64,
    pub encoding: EncodingConfig,
    pub context: ContextConfig,
    pub filenames: FilenameConfig,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            pixel_ratio: 1.0,
            encoding: EncodingConfig::default(),
            context: ContextConfig::default(),
            filenames: FilenameConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncodingConfig {
    pub quality: u32,
    pub timeout_ms: u64,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            quality: 100,
            timeout_ms: 30_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContextConfig {
    pub attempts: u32,
    pub initial_backoff_ms: u64,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            initial_backoff_ms: 10,
        }
    }
}

/// Suggested filenames for the two halves.
///
/// The defaults end in `.png` although the bytes are JPEG; that is how the
/// files have always been named for download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilenameConfig {
    pub left: String,
    pub right: String,
}

impl Default for FilenameConfig {
    fn default() -> Self {
        Self {
            left: "left.png".to_string(),
            right: "right.png".to_string(),
        }
    }
}

impl ExportConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.pixel_ratio.is_finite() && self.pixel_ratio > 0.0) {
            return Err(ConfigError::Validation(
                "pixel_ratio must be a positive number".into(),
            ));
        }
        if !(1..=100).contains(&self.encoding.quality) {
            return Err(ConfigError::Validation(
                "encoding.quality must be 1-100".into(),
            ));
        }
        if self.encoding.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "encoding.timeout_ms must be non-zero".into(),
            ));
        }
        if self.context.attempts == 0 {
            return Err(ConfigError::Validation(
                "context.attempts must be at least 1".into(),
            ));
        }
        for (key, name) in [
            ("filenames.left", &self.filenames.left),
            ("filenames.right", &self.filenames.right),
        ] {
            if name.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
        }
        if self.filenames.left == self.filenames.right {
            return Err(ConfigError::Validation(
                "filenames.left and filenames.right must differ".into(),
            ));
        }
        Ok(())
    }

    pub fn quality(&self) -> Quality {
        Quality::new(self.encoding.quality)
    }

    pub fn encode_timeout(&self) -> Duration {
        Duration::from_millis(self.encoding.timeout_ms)
    }

    pub fn context_retry(&self) -> ContextRetry {
        ContextRetry {
            attempts: self.context.attempts,
            initial_backoff: Duration::from_millis(self.context.initial_backoff_ms),
        }
    }

    /// Extraction parameters for one half.
    pub fn extract_params(&self, offset: f64, filename: &str) -> ExtractParams {
        ExtractParams {
            offset,
            filename: filename.to_string(),
            pixel_ratio: self.pixel_ratio,
            quality: self.quality(),
            encode_timeout: self.encode_timeout(),
            context_retry: self.context_retry(),
        }
    }
}

// =============================================================================
// Config loading and validation
// =============================================================================

/// Parse config text and validate it. Missing keys take their defaults.
pub fn parse_config(content: &str) -> Result<ExportConfig, ConfigError> {
    let config: ExportConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Load config from a TOML file.
///
/// The file must exist. Unknown keys and out-of-range values are errors.
pub fn load_config(path: &Path) -> Result<ExportConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Load config from `path` if given, otherwise return the defaults.
pub fn load_config_or_default(path: Option<&Path>) -> Result<ExportConfig, ConfigError> {
    match path {
        Some(p) => load_config(p),
        None => Ok(ExportConfig::default()),
    }
}

/// Returns a fully-commented stock config file with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# split-crop configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# Device pixel ratio. Output images are this many times larger than the
# natural-resolution crop (2.0 for a typical high-density display).
pixel_ratio = 1.0

# ---------------------------------------------------------------------------
# JPEG encoding
# ---------------------------------------------------------------------------
[encoding]
# JPEG quality (1 = worst, 100 = best).
quality = 100

# Abort an encode that takes longer than this many milliseconds.
timeout_ms = 30000

# ---------------------------------------------------------------------------
# Off-screen buffer acquisition
# ---------------------------------------------------------------------------
[context]
# How many times to try getting a buffer before failing the extraction.
attempts = 3

# Delay before the first retry; doubled after every further failure.
initial_backoff_ms = 10

# ---------------------------------------------------------------------------
# Output filenames
# ---------------------------------------------------------------------------
[filenames]
# Suggested filename for the selected region.
left = "left.png"

# Suggested filename for the equally-sized region to its right.
right = "right.png"
"##
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = ExportConfig::default();
        assert_eq!(config.pixel_ratio, 1.0);
        assert_eq!(config.encoding.quality, 100);
        assert_eq!(config.encoding.timeout_ms, 30_000);
        assert_eq!(config.context.attempts, 3);
        assert_eq!(config.filenames.left, "left.png");
        assert_eq!(config.filenames.right, "right.png");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_partial_config() {
        let config = parse_config(
            r#"
            pixel_ratio = 2.0
            [encoding]
            quality = 85
            "#,
        )
        .unwrap();

        assert_eq!(config.pixel_ratio, 2.0);
        assert_eq!(config.encoding.quality, 85);
        // untouched keys keep their defaults
        assert_eq!(config.encoding.timeout_ms, 30_000);
        assert_eq!(config.context, ContextConfig::default());
        assert_eq!(config.filenames, FilenameConfig::default());
    }

    #[test]
    fn empty_file_is_default_config() {
        assert_eq!(parse_config("").unwrap(), ExportConfig::default());
    }

    #[test]
    fn unknown_key_rejected() {
        assert!(matches!(
            parse_config("[encoding]\nqualty = 80\n"),
            Err(ConfigError::Toml(_))
        ));
        assert!(matches!(
            parse_config("pixel_ration = 2.0\n"),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn validation_rejects_out_of_range_values() {
        let bad = [
            "pixel_ratio = 0.0",
            "[encoding]\nquality = 0",
            "[encoding]\nquality = 101",
            "[encoding]\ntimeout_ms = 0",
            "[context]\nattempts = 0",
            "[filenames]\nleft = \"  \"",
            "[filenames]\nleft = \"same.jpg\"\nright = \"same.jpg\"",
        ];
        for snippet in bad {
            assert!(
                matches!(parse_config(snippet), Err(ConfigError::Validation(_))),
                "expected validation error for {snippet:?}"
            );
        }
    }

    #[test]
    fn extract_params_carry_config() {
        let config = ExportConfig {
            pixel_ratio: 2.0,
            encoding: EncodingConfig {
                quality: 90,
                timeout_ms: 500,
            },
            context: ContextConfig {
                attempts: 5,
                initial_backoff_ms: 1,
            },
            ..ExportConfig::default()
        };

        let params = config.extract_params(40.0, "right.png");
        assert_eq!(params.offset, 40.0);
        assert_eq!(params.filename, "right.png");
        assert_eq!(params.pixel_ratio, 2.0);
        assert_eq!(params.quality.value(), 90);
        assert_eq!(params.encode_timeout, Duration::from_millis(500));
        assert_eq!(params.context_retry.attempts, 5);
        assert_eq!(params.context_retry.initial_backoff, Duration::from_millis(1));
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("split-crop.toml");
        fs::write(&path, "[filenames]\nleft = \"a.jpg\"\nright = \"b.jpg\"\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.filenames.left, "a.jpg");
        assert_eq!(config.filenames.right, "b.jpg");
    }

    #[test]
    fn load_config_missing_file_is_io_error() {
        let result = load_config(Path::new("/nonexistent/split-crop.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("split-crop.toml");
        fs::write(&path, "this is not [valid toml").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_or_default_without_path() {
        assert_eq!(load_config_or_default(None).unwrap(), ExportConfig::default());
    }

    // =========================================================================
    // stock_config_toml tests
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: ExportConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, ExportConfig::default());
    }

    #[test]
    fn stock_config_toml_contains_all_sections() {
        let content = stock_config_toml();
        assert!(content.contains("[encoding]"));
        assert!(content.contains("[context]"));
        assert!(content.contains("[filenames]"));
    }
}
