//! Presentation state for the dashboard panels.
//!
//! Each panel owns the state a view needs (form fields, query mode, current
//! page) and exposes one async method per user action. A failed action
//! leaves the panel's data untouched and records an error banner; nothing is
//! retried.

pub mod commands;
pub mod config;
pub mod firmware;
pub mod monitor;

pub use commands::CommandQueue;
pub use config::ConfigPanel;
pub use firmware::FirmwarePanel;
pub use monitor::{DataMonitor, QueryMode};

use serde::Serialize;

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Success,
    Error,
}

/// The single success/error banner shown after an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusMessage {
    pub kind: MessageKind,
    pub text: String,
}

impl StatusMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Error,
            text: text.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == MessageKind::Error
    }
}

/// Convert an action's outcome into its banner, logging failures once.
pub(crate) fn banner<T>(
    result: &Result<T, CoreError>,
    action: &str,
    success: impl FnOnce(&T) -> String,
) -> StatusMessage {
    match result {
        Ok(value) => StatusMessage::success(success(value)),
        Err(e) => error_banner(e, action),
    }
}

pub(crate) fn error_banner(err: &CoreError, action: &str) -> StatusMessage {
    if err.is_client_side() {
        tracing::warn!(action, error = %err, "rejected");
    } else {
        tracing::error!(action, error = %err, "failed");
    }
    StatusMessage::error(err.to_string())
}
