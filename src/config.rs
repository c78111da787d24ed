//! Kernel configuration.
//!
//! Defaults match the hosted viewer. `from_env` overlays:
//! - `TAG_GRAPH_BATCH_SIZE`: entries parsed between cooperative yields
//! - `TAG_GRAPH_PALETTE`: comma-separated pack colours

use serde::{Deserialize, Serialize};

use crate::canonical::canonical_hash_hex;

/// Default number of tag entries parsed per extraction batch.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Colours assigned to uploaded packs, cycling by upload order.
pub const DEFAULT_PALETTE: [&str; 8] = [
    "#3b82f6", "#10b981", "#f59e0b", "#ef4444", "#8b5cf6", "#ec4899", "#14b8a6", "#f97316",
];

/// Pack metadata entry inside an overlay archive.
pub const DEFAULT_METADATA_ENTRY: &str = "pack.mcmeta";

/// Version descriptor entry inside a base content archive.
pub const DEFAULT_VERSION_ENTRY: &str = "version.json";

/// Error type for configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Environment variable holds an unusable value.
    #[error("Invalid value for {var}: {value}")]
    InvalidEnv {
        /// Variable name.
        var: &'static str,
        /// Offending value.
        value: String,
    },
    /// Batch size must be at least one.
    #[error("batch_size must be greater than zero")]
    ZeroBatchSize,
    /// Palette must have at least one colour.
    #[error("palette must not be empty")]
    EmptyPalette,
}

/// Kernel configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Entries parsed between cooperative yields during extraction.
    pub batch_size: usize,
    /// Upload colour palette.
    pub palette: Vec<String>,
    /// Overlay pack metadata entry path.
    pub metadata_entry: String,
    /// Base archive version descriptor entry path.
    pub version_entry: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
            metadata_entry: DEFAULT_METADATA_ENTRY.to_string(),
            version_entry: DEFAULT_VERSION_ENTRY.to_string(),
        }
    }
}

impl GraphConfig {
    /// Defaults overlaid with `TAG_GRAPH_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Defaults overlaid with values from `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = lookup("TAG_GRAPH_BATCH_SIZE") {
            config.batch_size = raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: "TAG_GRAPH_BATCH_SIZE",
                value: raw.clone(),
            })?;
        }

        if let Some(raw) = lookup("TAG_GRAPH_PALETTE") {
            config.palette = raw
                .split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect();
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject unusable settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        if self.palette.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        Ok(())
    }

    /// Fingerprint of the configuration (xxh64 of canonical JSON).
    pub fn params_hash(&self) -> String {
        canonical_hash_hex(self)
    }
}
