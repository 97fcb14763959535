//! Named snapshots of the device configuration.
//!
//! One JSON file per snapshot in a flat directory. Restoring a snapshot is
//! the config panel's job; this module only reads and writes files.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use tokio::fs;

use crate::error::StorageError;
use crate::types::DeviceConfig;

const NAME_PATTERN: &str = r"^[a-zA-Z0-9_-]+$";

const MAX_NAME_LENGTH: usize = 64;

fn name_regex() -> Result<&'static Regex, StorageError> {
    static RE: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(NAME_PATTERN))
        .as_ref()
        .map_err(|e| StorageError::InvalidName(e.to_string()))
}

/// Listing entry for a stored snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupInfo {
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigBackup {
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
    pub config: DeviceConfig,
}

pub struct ConfigBackupStorage {
    dir: PathBuf,
}

impl ConfigBackupStorage {
    /// Open (creating if needed) the snapshot directory.
    pub fn new(dir: PathBuf) -> Result<Self, StorageError> {
        std::fs::create_dir_all(&dir)
            .map_err(|e| StorageError::DirectoryAccess(format!("{}: {}", dir.display(), e)))?;
        Ok(Self { dir })
    }

    /// `<data dir>/backups`.
    pub fn default_dir() -> Option<PathBuf> {
        super::default_data_dir().map(|dir| dir.join("backups"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn validate_name(name: &str) -> Result<(), StorageError> {
        if name.is_empty() {
            return Err(StorageError::InvalidName("Name cannot be empty".to_string()));
        }
        if name.len() > MAX_NAME_LENGTH {
            return Err(StorageError::InvalidName(format!(
                "Name exceeds maximum length of {} characters",
                MAX_NAME_LENGTH
            )));
        }
        if !name_regex()?.is_match(name) {
            return Err(StorageError::InvalidName(format!(
                "Name '{}' contains invalid characters. Only alphanumeric, dash, and underscore allowed.",
                name
            )));
        }
        Ok(())
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }

    async fn timestamps(path: &Path) -> Result<(String, String), StorageError> {
        let metadata = fs::metadata(path).await?;
        let to_rfc3339 =
            |t: std::time::SystemTime| chrono::DateTime::<chrono::Utc>::from(t).to_rfc3339();
        let created_at = metadata.created().map(to_rfc3339).unwrap_or_default();
        let updated_at = metadata.modified().map(to_rfc3339).unwrap_or_default();
        Ok((created_at, updated_at))
    }

    /// All snapshots, sorted by name. Files with foreign names are skipped.
    pub async fn list(&self) -> Result<Vec<BackupInfo>, StorageError> {
        let mut backups = Vec::new();
        let mut entries = fs::read_dir(&self.dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let name = match path.file_stem().and_then(|s| s.to_str()) {
                Some(n) => n.to_string(),
                None => continue,
            };
            if Self::validate_name(&name).is_err() {
                continue;
            }

            let (created_at, updated_at) = Self::timestamps(&path).await?;
            backups.push(BackupInfo {
                name,
                created_at,
                updated_at,
            });
        }

        backups.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(backups)
    }

    pub async fn read(&self, name: &str) -> Result<Option<ConfigBackup>, StorageError> {
        Self::validate_name(name)?;
        let path = self.path_for(name);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path).await?;
        let config: DeviceConfig = serde_json::from_str(&content)?;
        let (created_at, updated_at) = Self::timestamps(&path).await?;

        Ok(Some(ConfigBackup {
            name: name.to_string(),
            created_at,
            updated_at,
            config,
        }))
    }

    /// Write a snapshot, replacing any existing one with the same name.
    pub async fn save(&self, name: &str, config: &DeviceConfig) -> Result<(), StorageError> {
        Self::validate_name(name)?;
        let content = serde_json::to_string_pretty(config)?;
        fs::write(self.path_for(name), content).await?;
        tracing::debug!(name, "config backup saved");
        Ok(())
    }

    pub async fn delete(&self, name: &str) -> Result<(), StorageError> {
        Self::validate_name(name)?;
        let path = self.path_for(name);
        if !path.exists() {
            return Err(StorageError::NotFound(name.to_string()));
        }
        fs::remove_file(&path).await?;
        Ok(())
    }
}
