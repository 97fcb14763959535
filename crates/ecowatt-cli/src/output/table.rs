//! Table-formatted output for CLI.

use std::path::Path;

use colored::*;
use comfy_table::{Cell, Color, ContentArrangement, Table};

use ecowatt_core::panels::monitor::PageView;
use ecowatt_core::panels::{MessageKind, QueryMode, StatusMessage};
use ecowatt_core::protocol::query::RangeQuery;
use ecowatt_core::storage::{BackupInfo, Settings};
use ecowatt_core::types::{
    display_timestamp, format_number, Command, DeviceConfig, FirmwareLevel, FirmwareVersion,
    RegisterSnapshot, TIMESTAMP_FORMAT,
};

use super::OutputFormatter;

pub struct TableOutput;

impl TableOutput {
    pub fn new() -> Self {
        Self
    }

    fn new_table() -> Table {
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table
    }

    /// Backup times are stored in UTC; show them in local time.
    fn local_time(rfc3339: &str) -> String {
        chrono::DateTime::parse_from_rfc3339(rfc3339)
            .map(|t| {
                t.with_timezone(&chrono::Local)
                    .format("%Y-%m-%d %H:%M")
                    .to_string()
            })
            .unwrap_or_else(|_| "-".to_string())
    }

    fn describe_query(query: &RangeQuery) -> String {
        let mut parts = Vec::new();
        match (query.start_id, query.end_id) {
            (Some(s), Some(e)) => parts.push(format!("ids {}..={}", s, e)),
            (Some(s), None) => parts.push(format!("ids >= {}", s)),
            (None, Some(e)) => parts.push(format!("ids <= {}", e)),
            (None, None) => {}
        }
        if let Some(t) = query.start_time {
            parts.push(format!("from {}", t.format(TIMESTAMP_FORMAT)));
        }
        if let Some(t) = query.end_time {
            parts.push(format!("until {}", t.format(TIMESTAMP_FORMAT)));
        }
        if parts.is_empty() {
            "all records".to_string()
        } else {
            parts.join(", ")
        }
    }
}

impl Default for TableOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for TableOutput {
    fn format_registers(&self, snapshot: &RegisterSnapshot) -> String {
        let mut table = Self::new_table();
        table.set_header(vec!["Register", "Value", "Last Updated"]);

        for slot in snapshot.slots() {
            let value = match slot.value {
                Some(v) => Cell::new(format_number(v)),
                None => Cell::new("-").fg(Color::DarkGrey),
            };
            let updated = slot
                .timestamp
                .as_deref()
                .map(display_timestamp)
                .unwrap_or_else(|| "-".to_string());
            table.add_row(vec![Cell::new(slot.index), value, Cell::new(updated)]);
        }

        format!(
            "{}\n\n{} of {} registers reporting",
            table,
            snapshot.populated(),
            snapshot.slots().len()
        )
    }

    fn format_page(&self, view: &PageView, message: Option<&StatusMessage>) -> String {
        let mut lines = Vec::new();

        if view.records.is_empty() {
            lines.push("No records found.".to_string());
        } else {
            let mut table = Self::new_table();
            table.set_header(vec!["ID", "Timestamp", "Data"]);
            for record in &view.records {
                table.add_row(vec![
                    Cell::new(record.id),
                    Cell::new(display_timestamp(&record.timestamp)),
                    Cell::new(record.data.to_string()),
                ]);
            }
            lines.push(table.to_string());
        }

        let position = match &view.mode {
            QueryMode::Latest => format!(
                "Batch {} of {} ({} records, newest first)",
                view.page, view.total_pages, view.total_count
            ),
            QueryMode::Range(query) => format!(
                "Page {} of {} ({} records matching {})",
                view.page,
                view.total_pages,
                view.total_count,
                Self::describe_query(query)
            ),
        };
        lines.push(String::new());
        lines.push(position);

        if let Some(message) = message {
            lines.push(self.format_message(message));
        }

        lines.join("\n")
    }

    fn format_count(&self, query: &RangeQuery, count: u64) -> String {
        format!("{} records ({})", count, Self::describe_query(query))
    }

    fn format_config(&self, config: &DeviceConfig) -> String {
        let mut table = Self::new_table();
        table.set_header(vec!["Register", "Read"]);
        for (index, flag) in config.reg_read.iter().enumerate() {
            let cell = if *flag == 1 {
                Cell::new("Yes").fg(Color::Green)
            } else {
                Cell::new("No").fg(Color::DarkGrey)
            };
            table.add_row(vec![Cell::new(index), cell]);
        }

        format!(
            "Interval:  {} ms\nVersion:   {}\n\n{}",
            config.interval, config.version, table
        )
    }

    fn format_backups(&self, backups: &[BackupInfo]) -> String {
        if backups.is_empty() {
            return "No backups saved.".to_string();
        }

        let mut table = Self::new_table();
        table.set_header(vec!["Name", "Created", "Updated"]);
        for backup in backups {
            table.add_row(vec![
                Cell::new(&backup.name),
                Cell::new(Self::local_time(&backup.created_at)),
                Cell::new(Self::local_time(&backup.updated_at)),
            ]);
        }

        format!("{}\n\n{} backup(s)", table, backups.len())
    }

    fn format_commands(&self, commands: &[Command]) -> String {
        if commands.is_empty() {
            return "Command queue is empty.".to_string();
        }

        let mut table = Self::new_table();
        table.set_header(vec!["#", "Action", "Register", "Value"]);
        for (i, command) in commands.iter().enumerate() {
            table.add_row(vec![
                Cell::new(i + 1),
                Cell::new(&command.action),
                Cell::new(command.target_register),
                Cell::new(format_number(command.value)),
            ]);
        }

        format!("{}\n\n{} command(s) queued", table, commands.len())
    }

    fn format_firmware_version(&self, version: &FirmwareVersion) -> String {
        let level = FirmwareLevel::try_from(version.level)
            .map(|l| l.display_name().to_string())
            .unwrap_or_else(|_| format!("Level {}", version.level));

        let mut lines = vec![
            format!("Version:  {}", version.version.as_str().bold()),
            format!("Level:    {}", level),
        ];
        if let Some(tag) = &version.version_string {
            lines.push(format!("Tag:      {}", tag));
        }
        lines.join("\n")
    }

    fn format_transfer(&self, message: &StatusMessage, version: &str, path: Option<&Path>) -> String {
        let mut lines = vec![self.format_message(message)];
        lines.push(format!("  Version:  {}", version));
        if let Some(path) = path {
            lines.push(format!("  Saved to: {}", path.display()));
        }
        lines.join("\n")
    }

    fn format_settings(&self, settings: &Settings, path: Option<&Path>) -> String {
        let location = path
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(no settings file)".to_string());
        [
            format!("Base URL:   {}", settings.base_url),
            format!("Page size:  {}", settings.page_size),
            format!("Timeout:    {} ms", settings.timeout_ms),
            format!("File:       {}", location),
        ]
        .join("\n")
    }

    fn format_message(&self, message: &StatusMessage) -> String {
        let status = match message.kind {
            MessageKind::Success => "[OK]".green(),
            MessageKind::Error => "[FAIL]".red(),
        };
        format!("{} {}", status, message.text)
    }
}
