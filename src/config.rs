//! Reformer configuration module.
//!
//! Handles loading, validating, and merging `reformer.toml`. Every switch
//! that decides whether and how URLs are rewritten lives in one explicit
//! [`ReformerConfig`], passed to the [`Reformer`](crate::rewrite::Reformer)
//! at construction.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! site_host = "https://cdn.example.com"  # Rewrite URL hosts to this (omit = keep hosts)
//! uploads_base_url = "https://example.com/wp-content/uploads"
//! disable_conversion = false             # Turn the whole rewriter off
//! skip_ids = []                          # Attachment ids left untouched
//! excluded_actions = ["query-attachments"]  # Request actions that bypass rewriting
//! skip_srcs = []                         # Substrings of <img src> left untouched
//!
//! [sizes]
//! touch_icons = true                     # Register the square touch-icon sizes
//!
//! [sizes.thumbnail]
//! width = 150
//! height = 150
//! crop = true                            # false, true, or ["left", "top"]
//!
//! [[sizes.additional]]
//! name = "hero"
//! width = 1600
//! height = 0                             # 0 = unconstrained
//! crop = ["center", "top"]
//!
//! [processing]
//! max_processes = 4                      # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse: override just the values you want. Unknown keys
//! are rejected to catch typos early.

use crate::sizing::CropSpec;
use crate::types::SizeSpec;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up inside the config directory.
pub const CONFIG_FILE_NAME: &str = "reformer.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Rewriter configuration loaded from `reformer.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReformerConfig {
    /// Scheme and host URLs are rewritten to. `None` keeps hosts as they are.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_host: Option<String>,
    /// Public base URL of the uploads directory. Only URLs under it are
    /// rewritten in content.
    pub uploads_base_url: String,
    /// Disable the rewriter entirely.
    pub disable_conversion: bool,
    /// Attachment ids whose URLs and metadata are left alone.
    pub skip_ids: BTreeSet<u64>,
    /// Request actions for which the rewriter stays inactive.
    pub excluded_actions: BTreeSet<String>,
    /// `<img src>` values containing any of these substrings are skipped.
    pub skip_srcs: Vec<String>,
    /// Registered image sizes.
    pub sizes: SizesConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Default for ReformerConfig {
    fn default() -> Self {
        Self {
            site_host: None,
            uploads_base_url: "https://example.com/wp-content/uploads".to_string(),
            disable_conversion: false,
            skip_ids: BTreeSet::new(),
            excluded_actions: BTreeSet::from(["query-attachments".to_string()]),
            skip_srcs: Vec::new(),
            sizes: SizesConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl ReformerConfig {
    /// Configured target host, treating an empty string as unset.
    pub fn target_host(&self) -> Option<&str> {
        self.site_host.as_deref().filter(|h| !h.trim().is_empty())
    }

    /// Validate config values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.uploads_base_url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "uploads_base_url must not be empty".into(),
            ));
        }
        if let Some(host) = self.target_host() {
            let parsed = url::Url::parse(host).map_err(|e| {
                ConfigError::Validation(format!("site_host '{host}' is not a valid URL: {e}"))
            })?;
            if parsed.host_str().is_none() {
                return Err(ConfigError::Validation(format!(
                    "site_host '{host}' has no host"
                )));
            }
        }

        let mut seen = HashSet::new();
        for spec in &self.sizes.additional {
            if spec.name.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "sizes.additional entries need a name".into(),
                ));
            }
            if !seen.insert(spec.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "sizes.additional has duplicate name '{}'",
                    spec.name
                )));
            }
        }
        Ok(())
    }
}

/// Registered size settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SizesConfig {
    /// Register the square touch-icon virtual sizes.
    pub touch_icons: bool,
    pub thumbnail: StockSize,
    pub medium: StockSize,
    pub medium_large: StockSize,
    pub large: StockSize,
    /// Extra named sizes, registered before the stock ones.
    pub additional: Vec<SizeSpec>,
}

impl Default for SizesConfig {
    fn default() -> Self {
        Self {
            touch_icons: true,
            thumbnail: StockSize::new(150, 150, CropSpec::Enabled),
            medium: StockSize::new(300, 300, CropSpec::Disabled),
            medium_large: StockSize::new(768, 0, CropSpec::Disabled),
            large: StockSize::new(1024, 1024, CropSpec::Disabled),
            additional: Vec::new(),
        }
    }
}

/// Dimensions of one stock size. 0 = unconstrained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StockSize {
    pub width: u32,
    pub height: u32,
    pub crop: CropSpec,
}

impl StockSize {
    pub fn new(width: u32, height: u32, crop: CropSpec) -> Self {
        Self {
            width,
            height,
            crop,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel workers for batch commands.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged on top of.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(ReformerConfig::default()).expect("default config must serialize")
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

/// Load `reformer.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ReformerConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ReformerConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `reformer.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(dir: &Path) -> Result<ReformerConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(dir)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `reformer.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Image Reformer Configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# Scheme and host that image URLs are rewritten to before they reach the
# transformation backend. Leave commented out to keep URLs on their own host.
# site_host = "https://cdn.example.com"

# Public base URL of the uploads directory. Only <img> tags pointing below
# this URL are rewritten when scanning content.
uploads_base_url = "https://example.com/wp-content/uploads"

# Turn the rewriter off without removing it.
disable_conversion = false

# Attachment ids whose URLs and metadata are never touched.
skip_ids = []

# Request actions for which rewriting is bypassed (the media library grid
# needs the real files).
excluded_actions = ["query-attachments"]

# <img src> values containing any of these substrings are left alone.
skip_srcs = []

# ---------------------------------------------------------------------------
# Registered sizes
# ---------------------------------------------------------------------------
# Crop is false (fit inside the box), true (center crop), or an anchor pair
# such as ["left", "top"]. A 0 axis is unconstrained. Stock sizes with an
# unconstrained axis are not registered.
[sizes]
# Register square touch-icon sizes (512, 270, 192, 180, 152, 120, 76, 32).
touch_icons = true

# Extra named sizes, registered before the stock ones.
additional = []
# [[sizes.additional]]
# name = "hero"
# width = 1600
# height = 0
# crop = ["center", "top"]

[sizes.thumbnail]
width = 150
height = 150
crop = true

[sizes.medium]
width = 300
height = 300
crop = false

[sizes.medium_large]
width = 768
height = 0
crop = false

[sizes.large]
width = 1024
height = 1024
crop = false

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers for batch commands (catalog).
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
