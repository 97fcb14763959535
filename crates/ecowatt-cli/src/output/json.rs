//! JSON-formatted output for CLI.

use std::path::Path;

use serde::Serialize;
use serde_json::{json, Value};

use ecowatt_core::panels::monitor::PageView;
use ecowatt_core::panels::StatusMessage;
use ecowatt_core::protocol::query::RangeQuery;
use ecowatt_core::storage::{BackupInfo, Settings};
use ecowatt_core::types::{Command, DeviceConfig, FirmwareVersion, RegisterSnapshot};

use super::OutputFormatter;

pub struct JsonOutput;

impl JsonOutput {
    pub fn new() -> Self {
        Self
    }

    fn to_json<T: Serialize>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for JsonOutput {
    fn format_registers(&self, snapshot: &RegisterSnapshot) -> String {
        Self::to_json(&json!({
            "registers": snapshot.slots(),
            "populated": snapshot.populated()
        }))
    }

    fn format_page(&self, view: &PageView, message: Option<&StatusMessage>) -> String {
        let mut output = serde_json::to_value(view).unwrap_or(json!({}));
        if let (Some(message), Value::Object(map)) = (message, &mut output) {
            map.insert("message".to_string(), json!(message.text));
        }
        Self::to_json(&output)
    }

    fn format_count(&self, query: &RangeQuery, count: u64) -> String {
        Self::to_json(&json!({
            "query": query,
            "count": count
        }))
    }

    fn format_config(&self, config: &DeviceConfig) -> String {
        Self::to_json(&json!({
            "config": config,
            "enabled_registers": config.enabled_registers()
        }))
    }

    fn format_backups(&self, backups: &[BackupInfo]) -> String {
        Self::to_json(&json!({
            "backups": backups,
            "count": backups.len()
        }))
    }

    fn format_commands(&self, commands: &[Command]) -> String {
        Self::to_json(&json!({
            "commands": commands,
            "count": commands.len()
        }))
    }

    fn format_firmware_version(&self, version: &FirmwareVersion) -> String {
        Self::to_json(version)
    }

    fn format_transfer(&self, message: &StatusMessage, version: &str, path: Option<&Path>) -> String {
        Self::to_json(&json!({
            "status": message.kind,
            "message": message.text,
            "version": version,
            "path": path.map(|p| p.display().to_string())
        }))
    }

    fn format_settings(&self, settings: &Settings, path: Option<&Path>) -> String {
        Self::to_json(&json!({
            "settings": settings,
            "path": path.map(|p| p.display().to_string())
        }))
    }

    fn format_message(&self, message: &StatusMessage) -> String {
        Self::to_json(&json!({
            "status": message.kind,
            "message": message.text
        }))
    }
}
