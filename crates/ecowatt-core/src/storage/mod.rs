//! Local storage: tool settings and device config backups.

pub mod backup;
pub mod settings;

pub use backup::{BackupInfo, ConfigBackup, ConfigBackupStorage};
pub use settings::Settings;

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "ecowatt", "ecowatt-cloud")
}

/// Get the default data directory for EcoWatt tools.
///
/// Uses the `directories` crate to find the appropriate platform-specific
/// data directory.
pub fn default_data_dir() -> Option<std::path::PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
}

/// Platform-specific configuration directory.
pub fn default_config_dir() -> Option<std::path::PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
}
