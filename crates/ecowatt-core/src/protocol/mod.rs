//! Protocol layer for the cloud REST API.
//!
//! This module builds request bodies and query strings, validates operator
//! input before it is sent, and interprets the `{status, ...}` envelopes the
//! backend answers with.

pub mod commands;
pub mod query;
pub mod response;

/// REST endpoints, relative to the backend base URL.
pub mod endpoints {
    pub const CONFIG: &str = "/config";
    pub const DATA: &str = "/data";
    pub const DATA_COUNT: &str = "/data/count";
    pub const COMMANDS: &str = "/commands";
    pub const FIRMWARE: &str = "/firmware";
    pub const FIRMWARE_VERSION: &str = "/firmware/version";
}
