//! Library configuration.
//!
//! Layered the usual way: built-in defaults, then an optional config
//! file, then `QUILL_*` environment overrides.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings for a document library instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Directory scanned for documents.
    pub library_dir: PathBuf,
    /// JSON array of known tool names; the built-in list when absent.
    pub tool_registry_path: Option<PathBuf>,
    /// Cache prune threshold, seconds.
    pub cache_max_age_secs: u64,
    /// Leading bytes read per file by the discovery probe.
    pub discovery_probe_bytes: usize,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            library_dir: PathBuf::from("agents"),
            tool_registry_path: None,
            cache_max_age_secs: 3600,
            discovery_probe_bytes: 300,
        }
    }
}

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from defaults, an optional file, and environment.
    pub fn load(config_file: Option<&Path>) -> Result<LibraryConfig, ConfigError> {
        let mut builder = Config::builder()
            .set_default("library_dir", "agents")?
            .set_default("cache_max_age_secs", 3600i64)?
            .set_default("discovery_probe_bytes", 300i64)?;
        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path.to_path_buf()));
        }
        builder = builder.add_source(Environment::with_prefix("QUILL").try_parsing(true));
        builder.build()?.try_deserialize()
    }

    /// Create default configuration.
    pub fn default() -> LibraryConfig {
        LibraryConfig::default()
    }
}
