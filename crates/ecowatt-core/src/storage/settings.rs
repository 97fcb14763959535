//! Persistent tool settings.
//!
//! A small JSON file holding the backend URL and view defaults. A missing
//! file means defaults; command-line flags override whatever is stored.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::client::api::{normalize_base_url, DEFAULT_BASE_URL};
use crate::client::CloudClient;
use crate::error::{CoreError, PageError, StorageError, ValidationError};
use crate::pagination::DEFAULT_PAGE_SIZE;

pub const SETTINGS_FILE: &str = "settings.json";

/// Per-request timeout when none is configured.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub base_url: String,
    pub page_size: u64,
    pub timeout_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl Settings {
    /// `<config dir>/settings.json`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        super::default_config_dir().map(|dir| dir.join(SETTINGS_FILE))
    }

    /// Load settings from `path`, falling back to defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self, StorageError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let settings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<(), StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StorageError::DirectoryAccess(format!("{}: {}", parent.display(), e))
            })?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check every field and normalise the base URL.
    pub fn validated(mut self) -> Result<Self, CoreError> {
        self.base_url = normalize_base_url(&self.base_url)?;
        if self.page_size == 0 {
            return Err(PageError::ZeroPageSize.into());
        }
        if self.timeout_ms == 0 {
            return Err(ValidationError::InvalidInterval(self.timeout_ms.to_string()).into());
        }
        Ok(self)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn client(&self) -> Result<CloudClient, CoreError> {
        Ok(CloudClient::new(&self.base_url, self.timeout())?)
    }
}
