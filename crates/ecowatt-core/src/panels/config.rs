//! Device configuration panel.
//!
//! Holds the backend's config plus a local draft the operator edits. Only
//! `reg_read` and `interval` are ever saved; the version belongs to the
//! firmware flow.

use crate::client::CloudClient;
use crate::error::{CoreError, ValidationError};
use crate::types::{ConfigUpdate, DeviceConfig, REGISTER_COUNT};

use super::{banner, StatusMessage};

pub struct ConfigPanel {
    client: CloudClient,
    saved: DeviceConfig,
    draft: DeviceConfig,
    message: Option<StatusMessage>,
}

impl ConfigPanel {
    /// Fetch the current configuration and start a draft from it.
    pub async fn open(client: CloudClient) -> Result<Self, CoreError> {
        let config = client.config().await.map_err(|e| {
            tracing::error!(error = %e, "failed to fetch configuration");
            CoreError::from(e)
        })?;
        Ok(Self::with_config(client, config))
    }

    /// Start from an already known configuration.
    pub fn with_config(client: CloudClient, config: DeviceConfig) -> Self {
        Self {
            client,
            draft: config.clone(),
            saved: config,
            message: None,
        }
    }

    pub fn saved(&self) -> &DeviceConfig {
        &self.saved
    }

    pub fn draft(&self) -> &DeviceConfig {
        &self.draft
    }

    pub fn message(&self) -> Option<&StatusMessage> {
        self.message.as_ref()
    }

    pub fn is_dirty(&self) -> bool {
        self.draft.reg_read != self.saved.reg_read || self.draft.interval != self.saved.interval
    }

    /// Flip a register's read flag.
    pub fn toggle_register(&mut self, index: usize) -> Result<bool, ValidationError> {
        let flag = self.flag_mut(index)?;
        *flag = if *flag == 1 { 0 } else { 1 };
        Ok(*flag == 1)
    }

    pub fn set_register(&mut self, index: usize, enabled: bool) -> Result<(), ValidationError> {
        *self.flag_mut(index)? = u8::from(enabled);
        Ok(())
    }

    pub fn set_interval(&mut self, interval_ms: u64) -> Result<(), ValidationError> {
        if interval_ms == 0 {
            return Err(ValidationError::InvalidInterval(interval_ms.to_string()));
        }
        self.draft.interval = interval_ms;
        Ok(())
    }

    /// Replace the draft's flags and interval, e.g. from a local backup.
    pub fn load_update(&mut self, update: &ConfigUpdate) -> Result<(), ValidationError> {
        if let Some(bad) = update.reg_read.iter().find(|f| **f > 1) {
            return Err(ValidationError::InvalidFlag(*bad));
        }
        self.set_interval(update.interval)?;
        self.draft.reg_read = update.reg_read;
        Ok(())
    }

    /// Discard local edits.
    pub fn reset(&mut self) {
        self.draft = self.saved.clone();
    }

    /// Push the draft to the backend.
    pub async fn save(&mut self) -> Result<(), CoreError> {
        let update = self.draft.update();
        let result = self
            .client
            .update_config(&update)
            .await
            .map_err(CoreError::from);
        self.message = Some(banner(&result, "save config", |_| {
            "Configuration updated successfully".to_string()
        }));
        result?;

        tracing::info!(interval = update.interval, registers = ?self.draft.enabled_registers(), "configuration saved");
        self.saved.reg_read = update.reg_read;
        self.saved.interval = update.interval;
        Ok(())
    }

    fn flag_mut(&mut self, index: usize) -> Result<&mut u8, ValidationError> {
        if index >= REGISTER_COUNT {
            return Err(ValidationError::RegisterOutOfRange(index.to_string()));
        }
        Ok(&mut self.draft.reg_read[index])
    }
}
