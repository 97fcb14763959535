//! Firmware transfer panel.

use std::path::Path;

use crate::client::firmware::FirmwareUpload;
use crate::client::{CloudClient, TransferProgressHandler};
use crate::error::CoreError;
use crate::types::{FirmwareImage, DEFAULT_FIRMWARE_VERSION};

use super::{banner, StatusMessage};

pub struct FirmwarePanel {
    client: CloudClient,
    current_version: String,
    message: Option<StatusMessage>,
}

impl FirmwarePanel {
    /// Read the current version from the device config.
    ///
    /// If that fails the panel still opens, assuming the default version.
    pub async fn open(client: CloudClient) -> Self {
        let current_version = match client.config().await {
            Ok(config) => config.version,
            Err(e) => {
                tracing::debug!(error = %e, "could not read firmware version from config");
                DEFAULT_FIRMWARE_VERSION.to_string()
            }
        };
        Self::with_version(client, current_version)
    }

    pub fn with_version(client: CloudClient, current_version: String) -> Self {
        Self {
            client,
            current_version,
            message: None,
        }
    }

    pub fn current_version(&self) -> &str {
        &self.current_version
    }

    pub fn message(&self) -> Option<&StatusMessage> {
        self.message.as_ref()
    }

    /// Upload an image; the backend's reported version becomes current.
    pub async fn upload<P: TransferProgressHandler>(
        &mut self,
        upload: FirmwareUpload,
        progress: &P,
    ) -> Result<String, CoreError> {
        let result = self.client.upload_firmware(upload, progress).await;
        self.message = Some(banner(&result, "upload firmware", |v| {
            format!("Firmware uploaded successfully (v{})", v)
        }));
        let version = result?;
        self.current_version = version.clone();
        Ok(version)
    }

    /// Download the current image.
    pub async fn download(&mut self) -> Result<FirmwareImage, CoreError> {
        let result = self.client.download_firmware().await.map_err(CoreError::from);
        self.message = Some(banner(&result, "download firmware", |_| {
            "Firmware downloaded successfully".to_string()
        }));
        let image = result?;
        if let Some(tag) = &image.tag {
            self.current_version = tag.version.clone();
        }
        Ok(image)
    }

    /// Download the current image and write it into `dir` (or to `path` if
    /// it names a file). Returns where it was written.
    pub async fn download_to(&mut self, target: &Path) -> Result<std::path::PathBuf, CoreError> {
        let image = self.download().await?;
        let path = if target.is_dir() {
            target.join(image.file_name(&self.current_version))
        } else {
            target.to_path_buf()
        };

        tokio::fs::write(&path, &image.data).await?;
        tracing::info!(path = %path.display(), bytes = image.data.len(), "firmware saved");
        Ok(path)
    }
}
