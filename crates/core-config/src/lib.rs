//! Construction-time configuration for the game-state engine.
//!
//! Scope: parse an optional `scribe.toml` (or an explicit override path)
//! carrying `database_path` and, for tests only, `chunk_seed`. Unknown
//! fields are ignored so future keys can land without breaking existing
//! config files.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::info;

/// Raw, on-disk shape of `scribe.toml`.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    /// Path to the SQLite database file. Absent means "run in-memory",
    /// which is how the test suite exercises the store without touching disk.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
    /// Seed for the randomized-chunking test harness. Never read by the
    /// core itself; present so a single config file can drive both the
    /// engine and its test harness.
    #[serde(default)]
    pub chunk_seed: Option<u64>,
}

/// Fully resolved engine configuration.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Original file contents, kept for diagnostics.
    pub raw: Option<String>,
    pub database_path: Option<PathBuf>,
    pub chunk_seed: Option<u64>,
}

impl EngineConfig {
    pub fn database_path(&self) -> Option<&PathBuf> {
        self.database_path.as_ref()
    }
}

/// Best-effort config path following platform conventions.
pub fn discover() -> PathBuf {
    let local = PathBuf::from("scribe.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("scribe").join("scribe.toml");
    }
    PathBuf::from("scribe.toml")
}

/// Load configuration from `path`, or from [`discover`] when `path` is `None`.
/// A missing or unparsable file yields defaults rather than an error: this
/// engine must start even without a config file present.
pub fn load_from(path: Option<PathBuf>) -> Result<EngineConfig> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        return Ok(EngineConfig::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            info!(target: "config", path = %path.display(), "config_loaded");
            Ok(EngineConfig {
                raw: Some(content),
                database_path: file.database_path,
                chunk_seed: file.chunk_seed,
            })
        }
        Err(e) => {
            tracing::warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed_using_defaults");
            Ok(EngineConfig::default())
        }
    }
}
