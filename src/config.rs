//! Client configuration: backend location, download folder, placeholder thumbnail

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Names a JSON config file to read at startup
pub const CONFIG_ENV: &str = "BULK_DL_CONFIG";
/// Overrides `backend_url`
pub const BACKEND_URL_ENV: &str = "BULK_DL_BACKEND_URL";
/// Overrides `download_dir`
pub const DOWNLOAD_DIR_ENV: &str = "BULK_DL_DOWNLOAD_DIR";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the extraction backend (default: "http://127.0.0.1:5000")
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Where saved files land (default: "./downloads")
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Image shown for videos without a thumbnail
    #[serde(default = "default_placeholder_thumbnail")]
    pub placeholder_thumbnail: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            download_dir: default_download_dir(),
            placeholder_thumbnail: default_placeholder_thumbnail(),
        }
    }
}

fn default_backend_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("./downloads")
}

fn default_placeholder_thumbnail() -> String {
    "https://via.placeholder.com/120x68?text=No+Thumb".to_string()
}

impl Config {
    /// Load from the file named by `BULK_DL_CONFIG` (if any), then apply env overrides.
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        config.apply_overrides(
            std::env::var(BACKEND_URL_ENV).ok(),
            std::env::var_os(DOWNLOAD_DIR_ENV).map(PathBuf::from),
        );
        info!(backend = %config.backend_url, dir = %config.download_dir.display(), "configuration loaded");
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "reading config file");
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| Error::Config(format!("invalid config: {e}")))
    }

    fn apply_overrides(&mut self, backend_url: Option<String>, download_dir: Option<PathBuf>) {
        if let Some(url) = backend_url.filter(|u| !u.trim().is_empty()) {
            self.backend_url = url.trim().to_string();
        }
        if let Some(dir) = download_dir {
            self.download_dir = dir;
        }
    }
}
