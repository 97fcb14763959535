//! Firmware image transfer.

use bytes::Bytes;
use reqwest::multipart;

use super::CloudClient;
use crate::error::{ApiError, CoreError, ValidationError};
use crate::protocol::endpoints;
use crate::protocol::response::{
    error_message, FirmwareVersionResponse, UploadResponse, CONFIG_VERSION_HEADER,
};
use crate::types::{validate_version, ConfigVersionTag, FirmwareImage, FirmwareLevel, FirmwareVersion};

/// Trait for receiving transfer progress updates.
///
/// The CLI drives an `indicatif` spinner from these callbacks.
pub trait TransferProgressHandler: Send + Sync {
    fn on_start(&self, total_bytes: u64);
    fn on_complete(&self, total_bytes: u64);
    fn on_error(&self, error: &str);
}

/// No-op progress handler for when progress tracking isn't needed.
pub struct NoopProgress;

impl TransferProgressHandler for NoopProgress {
    fn on_start(&self, _total_bytes: u64) {}
    fn on_complete(&self, _total_bytes: u64) {}
    fn on_error(&self, _error: &str) {}
}

/// A firmware image ready to be uploaded.
#[derive(Debug, Clone)]
pub struct FirmwareUpload {
    pub data: Bytes,
    pub file_name: String,
    pub level: FirmwareLevel,
    /// Explicit version for the image. When absent the backend assigns one.
    pub version: Option<String>,
}

impl FirmwareUpload {
    pub fn new(data: impl Into<Bytes>, file_name: &str, level: FirmwareLevel) -> Self {
        Self {
            data: data.into(),
            file_name: file_name.to_string(),
            level,
            version: None,
        }
    }

    pub fn with_version(mut self, version: &str) -> Result<Self, ValidationError> {
        validate_version(version)?;
        self.version = Some(version.to_string());
        Ok(self)
    }
}

impl CloudClient {
    /// Upload a firmware image via multipart POST. Returns the version the
    /// backend recorded for it.
    pub async fn upload_firmware<P: TransferProgressHandler>(
        &self,
        upload: FirmwareUpload,
        progress: &P,
    ) -> Result<String, CoreError> {
        let total_bytes = upload.data.len() as u64;
        progress.on_start(total_bytes);

        match self.send_firmware(upload).await {
            Ok(version) => {
                progress.on_complete(total_bytes);
                Ok(version)
            }
            Err(e) => {
                progress.on_error(&e.to_string());
                Err(e)
            }
        }
    }

    async fn send_firmware(&self, upload: FirmwareUpload) -> Result<String, CoreError> {
        let part = multipart::Part::stream(upload.data)
            .file_name(upload.file_name.clone())
            .mime_str("application/octet-stream")
            .map_err(ApiError::Request)?;

        let mut form = multipart::Form::new()
            .part("file", part)
            .text("level", upload.level.as_u8().to_string());
        if let Some(version) = &upload.version {
            form = form.text("version", version.clone());
        }

        let url = self.url(endpoints::FIRMWARE);
        tracing::debug!(method = "POST", %url, file = %upload.file_name, "firmware upload");

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ApiError::NotReachable {
                url: url.clone(),
                source: e,
            })?;

        let resp: UploadResponse = self.handle_response(endpoints::FIRMWARE, response).await?;
        resp.envelope
            .ensure_success(endpoints::FIRMWARE, "Failed to upload firmware")?;

        let version = resp
            .version
            .or(upload.version)
            .ok_or_else(|| ApiError::InvalidResponse {
                endpoint: endpoints::FIRMWARE.to_string(),
                message: "Upload succeeded but no version was returned".to_string(),
            })?;

        tracing::info!(%version, level = upload.level.as_u8(), "firmware uploaded");
        Ok(version)
    }

    /// Download the current firmware binary.
    pub async fn download_firmware(&self) -> Result<FirmwareImage, ApiError> {
        let url = self.url(endpoints::FIRMWARE);
        tracing::debug!(method = "GET", %url, "firmware download");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::NotReachable {
                url: url.clone(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Http {
                url,
                status: status.as_u16(),
                message: error_message(&body).unwrap_or_else(|| "Failed to download firmware".to_string()),
            });
        }

        let tag = response
            .headers()
            .get(CONFIG_VERSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(ConfigVersionTag::parse);

        let data = response.bytes().await.map_err(ApiError::Request)?;
        Ok(FirmwareImage { data, tag })
    }

    /// Version metadata of the current image, without downloading it.
    pub async fn firmware_version(&self) -> Result<FirmwareVersion, ApiError> {
        let url = self.url(endpoints::FIRMWARE_VERSION);
        tracing::debug!(method = "GET", %url, "request");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::NotReachable {
                url: url.clone(),
                source: e,
            })?;

        let resp: FirmwareVersionResponse = self
            .handle_response(endpoints::FIRMWARE_VERSION, response)
            .await?;
        // `status` is optional here, as on the count endpoint.
        if resp.envelope.status.is_some() {
            resp.envelope
                .ensure_success(endpoints::FIRMWARE_VERSION, "No firmware version available")?;
        }

        match (resp.version, resp.level) {
            (Some(version), Some(level)) => Ok(FirmwareVersion {
                version,
                level,
                version_string: resp.version_string,
            }),
            _ => Err(ApiError::InvalidResponse {
                endpoint: endpoints::FIRMWARE_VERSION.to_string(),
                message: "Missing version or level".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_with_version_validates() {
        let upload = FirmwareUpload::new(vec![0u8; 4], "fw.bin", FirmwareLevel::Standard);
        assert!(upload.version.is_none());
        assert!(upload.clone().with_version("1.2.3").is_ok());
        assert!(upload.with_version("1.2").is_err());
    }
}
