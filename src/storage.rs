//! Storage layer for scrumboard
//!
//! All state lives under one data directory.
//!
//! # Directory Structure
//!
//! ```text
//! <data dir>/
//!   scrumboard.toml             # Configuration (optional)
//!   projects/
//!     <project id>.json         # Full project snapshot
//!     <project id>.lock         # Writer lock for that snapshot
//! ```
//!
//! The data directory is `--data-dir`, else `$SCRUMBOARD_DIR`, else the
//! platform data directory.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Serialize};

use crate::config::{Config, CONFIG_FILE};
use crate::error::{Error, Result};
use crate::lock;

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "SCRUMBOARD_DIR";

/// Name of the projects directory
pub const PROJECTS_DIR: &str = "projects";

const SNAPSHOT_EXT: &str = "json";
const LOCK_EXT: &str = "lock";

/// Storage manager for scrumboard state
#[derive(Debug, Clone)]
pub struct Storage {
    data_dir: PathBuf,
}

impl Storage {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Resolve the data directory from an explicit flag, the environment,
    /// or the platform default.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(dir) = explicit {
            return Ok(Self::new(dir));
        }
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|value| !value.is_empty()) {
            return Ok(Self::new(PathBuf::from(dir)));
        }
        default_data_dir().map(Self::new)
    }

    // =========================================================================
    // Path accessors
    // =========================================================================

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn projects_dir(&self) -> PathBuf {
        self.data_dir.join(PROJECTS_DIR)
    }

    pub fn project_file(&self, project_id: &str) -> PathBuf {
        self.projects_dir()
            .join(format!("{project_id}.{SNAPSHOT_EXT}"))
    }

    pub fn project_lock_file(&self, project_id: &str) -> PathBuf {
        self.projects_dir().join(format!("{project_id}.{LOCK_EXT}"))
    }

    pub fn config_file(&self) -> PathBuf {
        self.data_dir.join(CONFIG_FILE)
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Create the directory layout. Returns true if the config file was
    /// written (an existing one is left alone).
    pub fn init(&self) -> Result<bool> {
        fs::create_dir_all(self.projects_dir())?;
        let config_file = self.config_file();
        if config_file.exists() {
            return Ok(false);
        }
        Config::default().save(&config_file)?;
        Ok(true)
    }

    pub fn is_initialized(&self) -> bool {
        self.projects_dir().is_dir()
    }

    pub fn load_config(&self) -> Result<Config> {
        Config::load_from_dir(&self.data_dir)
    }

    /// Ids of every stored snapshot, unordered
    pub fn snapshot_ids(&self) -> Result<Vec<String>> {
        let dir = self.projects_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut ids = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(SNAPSHOT_EXT) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                ids.push(stem.to_string());
            }
        }
        Ok(ids)
    }

    // =========================================================================
    // File I/O helpers
    // =========================================================================

    /// Write JSON data atomically (pretty-printed)
    pub fn write_json<T: Serialize>(&self, path: &Path, data: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(data)?;
        self.write_atomic(path, json.as_bytes())
    }

    pub fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let content = fs::read_to_string(path)?;
        let data: T = serde_json::from_str(&content)?;
        Ok(data)
    }

    pub fn write_atomic(&self, path: &Path, data: &[u8]) -> Result<()> {
        lock::write_atomic(path, data)
    }
}

/// Platform data directory, e.g. `~/.local/share/scrumboard` on Linux
pub fn default_data_dir() -> Result<PathBuf> {
    ProjectDirs::from("", "", "scrumboard")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| {
            Error::InvalidConfig(format!(
                "cannot determine a data directory; pass --data-dir or set {DATA_DIR_ENV}"
            ))
        })
}
