//! # Config Module
//!
//! Settings shared by the watch and bulk entry points.
//!
//! Values come from, in increasing priority: built-in defaults, a TOML file,
//! then command-line flags. The file is looked up at `--config <path>` or, if
//! that is absent, at `<config dir>/photo-ingest/config.toml`.
//!
//! ```toml
//! destination = "/srv/photos/organized"
//! quarantine = "/srv/photos/quarantine"
//! extensions = ["jpg", "jpeg", "png", "webp"]
//! max_name_probes = 10000
//!
//! [debounce]
//! settle_ms = 1000
//! poll_ms = 250
//! max_wait_ms = 30000
//! ```

use crate::core::placement::DEFAULT_MAX_NAME_PROBES;
use crate::core::scanner::{ImageFilter, DEFAULT_EXTENSIONS};
use crate::core::watcher::WatcherConfig;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Write-settle timings, in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebounceSettings {
    pub settle_ms: u64,
    pub poll_ms: u64,
    pub max_wait_ms: u64,
}

impl Default for DebounceSettings {
    fn default() -> Self {
        Self {
            settle_ms: 1000,
            poll_ms: 250,
            max_wait_ms: 30_000,
        }
    }
}

/// Ingestion settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Root of the `YYYY/MM/DD` tree
    pub destination: PathBuf,
    /// Where duplicates go
    pub quarantine: PathBuf,
    /// Accepted file extensions (case-insensitive, no dot needed)
    pub extensions: Vec<String>,
    pub debounce: DebounceSettings,
    /// Cap on `_<n>` suffixes tried when a name is taken
    pub max_name_probes: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            destination: PathBuf::from("OrganizedPhotos"),
            quarantine: PathBuf::from("Quarantine"),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            debounce: DebounceSettings::default(),
            max_name_probes: DEFAULT_MAX_NAME_PROBES,
        }
    }
}

impl IngestConfig {
    /// Per-user config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("photo-ingest").join(DEFAULT_CONFIG_FILE))
    }

    /// Parse a TOML config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: IngestConfig = toml::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load an explicit file, or the per-user file if it exists, or defaults
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match Self::default_path() {
            Some(path) if path.is_file() => {
                tracing::debug!(path = %path.display(), "loading config");
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.extensions.is_empty() {
            return Err(ConfigError::Invalid(
                "extensions must list at least one file type".into(),
            ));
        }
        if self.debounce.poll_ms == 0 {
            return Err(ConfigError::Invalid("debounce.poll_ms must be positive".into()));
        }
        if self.destination == self.quarantine {
            return Err(ConfigError::Invalid(
                "destination and quarantine must be different directories".into(),
            ));
        }
        Ok(())
    }

    /// Watcher settings derived from the debounce section
    pub fn watcher_config(&self) -> WatcherConfig {
        WatcherConfig {
            settle: Duration::from_millis(self.debounce.settle_ms),
            poll_interval: Duration::from_millis(self.debounce.poll_ms),
            max_wait: Duration::from_millis(self.debounce.max_wait_ms),
            recursive: false,
        }
    }

    /// Extension filter derived from `extensions`
    pub fn filter(&self) -> ImageFilter {
        ImageFilter::new().with_extensions(&self.extensions)
    }
}
