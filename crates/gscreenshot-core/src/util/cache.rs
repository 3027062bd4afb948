//! Persistent cache of user choices between runs
//!
//! The cache is a single JSON object stored at `$XDG_CACHE_HOME/gscreenshot`
//! when that variable is set, or `~/.gscreenshot` otherwise. A missing or
//! corrupt file is never fatal: it yields defaults and a warning. Keys this
//! crate does not know about are kept on write, so other front ends can
//! store their own settings alongside.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::{
    error::{CaptureError, CaptureResult},
    model::Region,
};

/// Values the capture pipeline reads and writes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheData {
    /// Directory the last screenshot was saved to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_save_dir:  Option<PathBuf>,
    /// Extension of the last saved screenshot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_save_type: Option<String>,
    /// Last selected region as `[left, top, right, bottom]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_region:    Option<[i32; 4]>,
    /// Keys written by other tools
    #[serde(flatten)]
    pub extra:          Map<String, Value>,
}

impl CacheData {
    pub fn last_region(&self) -> Option<Region> {
        self.last_region
            .map(|[left, top, right, bottom]| Region::new(left, top, right, bottom))
            .filter(|r| !r.is_empty())
    }

    pub fn set_last_region(&mut self, region: Region) {
        self.last_region = Some([region.left, region.top, region.right, region.bottom]);
    }
}

/// JSON cache file at a fixed path
#[derive(Debug, Clone)]
pub struct CacheStore {
    path: PathBuf,
}

impl CacheStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store at the default location, if one can be determined
    pub fn default_location() -> Option<Self> {
        Self::default_path_with_env(|key| std::env::var(key).ok(), dirs::home_dir()).map(Self::new)
    }

    /// Default cache path for a given environment and home directory
    pub fn default_path_with_env<F>(env_provider: F, home: Option<PathBuf>) -> Option<PathBuf>
    where
        F: Fn(&str) -> Option<String>,
    {
        match env_provider("XDG_CACHE_HOME").filter(|v| !v.is_empty()) {
            Some(cache_home) => Some(PathBuf::from(cache_home).join("gscreenshot")),
            None => home.map(|h| h.join(".gscreenshot")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the cache, falling back to defaults on any problem
    pub fn load(&self) -> CacheData {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No cache at {}", self.path.display());
                return CacheData::default();
            }
            Err(e) => {
                warn!("Failed to read cache {}: {}", self.path.display(), e);
                return CacheData::default();
            }
        };

        serde_json::from_str(&text).unwrap_or_else(|e| {
            warn!("Ignoring corrupt cache {}: {}", self.path.display(), e);
            CacheData::default()
        })
    }

    /// Writes the cache, creating the parent directory if needed
    pub fn save(&self, data: &CacheData) -> CaptureResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(CaptureError::IoError)?;
            }
        }

        let text = serde_json::to_string_pretty(data).map_err(|e| {
            CaptureError::IoError(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })?;
        fs::write(&self.path, text).map_err(CaptureError::IoError)
    }

    /// Loads, applies `f`, and saves
    pub fn update(&self, f: impl FnOnce(&mut CacheData)) -> CaptureResult<()> {
        let mut data = self.load();
        f(&mut data);
        self.save(&data)
    }
}
