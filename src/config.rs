//! Verifier configuration.
//!
//! Only decoder resource limits are configurable. The asset list is fixed by
//! the binary and passed to the verifier explicitly.
//!
//! ## Config File
//!
//! Pass a TOML file with `--config <FILE>`. All options are optional;
//! defaults shown below:
//!
//! ```toml
//! [limits]
//! # max_width = 16384     # Reject images wider than this (omit for no cap)
//! # max_height = 16384    # Reject images taller than this (omit for no cap)
//! max_alloc_mb = 512      # Decoder allocation cap per image, in MiB (0 = no cap)
//! ```
//!
//! Config files are sparse: stock defaults are serialized to TOML and the
//! user file is merged on top. Unknown keys are rejected to catch typos early.

use crate::decoder::DecodeLimits;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
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

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VerifyConfig {
    /// Decoder resource limits.
    pub limits: LimitsConfig,
}

impl VerifyConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.max_width == Some(0) {
            return Err(ConfigError::Validation(
                "limits.max_width must be non-zero".into(),
            ));
        }
        if self.limits.max_height == Some(0) {
            return Err(ConfigError::Validation(
                "limits.max_height must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// Decoder resource limits. `None` disables a cap.
///
/// The allocation cap is on by default, so it is switched off with
/// `max_alloc_mb = 0` rather than by omitting the key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    pub max_alloc_mb: Option<u64>,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_width: None,
            max_height: None,
            max_alloc_mb: Some(512),
        }
    }
}

impl LimitsConfig {
    pub fn to_decode_limits(&self) -> DecodeLimits {
        DecodeLimits {
            max_width: self.max_width,
            max_height: self.max_height,
            max_alloc: self
                .max_alloc_mb
                .filter(|&mb| mb != 0)
                .map(|mb| mb.saturating_mul(1024 * 1024)),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// Base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(VerifyConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<VerifyConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: VerifyConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from an explicit file, or stock defaults when `path`
/// is `None`. A named file that does not exist is an error.
pub fn load_config(path: Option<&Path>) -> Result<VerifyConfig, ConfigError> {
    let overlay = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            Some(toml::from_str::<toml::Value>(&content)?)
        }
        None => None,
    };
    resolve_config(overlay)
}

/// Returns a fully-commented stock config file.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# imgverify configuration
# =======================
# All options are optional. Uncomment and edit what you need.

[limits]
# Reject images wider or taller than this many pixels.
# Omit for no cap.
# max_width = 16384
# max_height = 16384

# Maximum memory the decoder may allocate for a single image, in MiB.
# Set to 0 for no cap.
max_alloc_mb = 512
"##
}
