//! Output formatting for CLI results.

pub mod json;
pub mod table;

use std::path::Path;

pub use json::JsonOutput;
pub use table::TableOutput;

use ecowatt_core::panels::monitor::PageView;
use ecowatt_core::panels::StatusMessage;
use ecowatt_core::protocol::query::RangeQuery;
use ecowatt_core::storage::{BackupInfo, Settings};
use ecowatt_core::types::{Command, DeviceConfig, FirmwareVersion, RegisterSnapshot};

/// Output formatter trait
pub trait OutputFormatter {
    /// Format the ten register slots
    fn format_registers(&self, snapshot: &RegisterSnapshot) -> String;

    /// Format one page of records with the banner of the fetch that loaded it
    fn format_page(&self, view: &PageView, message: Option<&StatusMessage>) -> String;

    /// Format a record count for a filter
    fn format_count(&self, query: &RangeQuery, count: u64) -> String;

    /// Format the device configuration
    fn format_config(&self, config: &DeviceConfig) -> String;

    /// Format the list of local backups
    fn format_backups(&self, backups: &[BackupInfo]) -> String;

    /// Format the command queue
    fn format_commands(&self, commands: &[Command]) -> String;

    /// Format firmware version metadata
    fn format_firmware_version(&self, version: &FirmwareVersion) -> String;

    /// Format the outcome of an upload or download
    fn format_transfer(&self, message: &StatusMessage, version: &str, path: Option<&Path>) -> String;

    /// Format effective settings and where they are stored
    fn format_settings(&self, settings: &Settings, path: Option<&Path>) -> String;

    /// Format a status banner
    fn format_message(&self, message: &StatusMessage) -> String;
}

/// Get the appropriate formatter based on JSON flag
pub fn get_formatter(json: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonOutput::new())
    } else {
        Box::new(TableOutput::new())
    }
}
