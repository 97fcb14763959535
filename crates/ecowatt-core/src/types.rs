//! Domain types shared by the client, the panels and the CLI.
//!
//! These mirror the JSON documents served by the EcoWatt Cloud backend.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::ValidationError;

/// Number of device registers exposed by the backend.
pub const REGISTER_COUNT: usize = 10;

/// Wire format for timestamps sent as query parameters.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Action tag for register write commands.
pub const WRITE_REGISTER_ACTION: &str = "write_register";

/// Version assumed when the backend does not report one.
pub const DEFAULT_FIRMWARE_VERSION: &str = "1.0.0";

// ==================== Registers ====================

/// A row of the latest-values response (`GET /data` without filters).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterReading {
    #[serde(default)]
    pub register: Option<i64>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Most recent value of a single register.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RegisterSlot {
    pub index: usize,
    pub value: Option<f64>,
    pub timestamp: Option<String>,
}

impl RegisterSlot {
    pub fn is_populated(&self) -> bool {
        self.value.is_some()
    }
}

/// Fixed array of register slots, rebuilt in full on every fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisterSnapshot {
    slots: [RegisterSlot; REGISTER_COUNT],
}

impl RegisterSnapshot {
    /// Snapshot with every slot empty.
    pub fn empty() -> Self {
        Self {
            slots: std::array::from_fn(|index| RegisterSlot {
                index,
                ..RegisterSlot::default()
            }),
        }
    }

    /// Place each reading in the slot named by its register index.
    ///
    /// Readings without an index, or with an index outside `0..10`, are dropped.
    pub fn from_readings(readings: &[RegisterReading]) -> Self {
        let mut snapshot = Self::empty();
        for reading in readings {
            let Some(index) = reading.register else {
                continue;
            };
            if !(0..REGISTER_COUNT as i64).contains(&index) {
                continue;
            }
            let slot = &mut snapshot.slots[index as usize];
            slot.value = reading.value;
            slot.timestamp = reading.timestamp.clone();
        }
        snapshot
    }

    pub fn slots(&self) -> &[RegisterSlot] {
        &self.slots
    }

    pub fn get(&self, index: usize) -> Option<&RegisterSlot> {
        self.slots.get(index)
    }

    pub fn populated(&self) -> usize {
        self.slots.iter().filter(|s| s.is_populated()).count()
    }
}

impl Default for RegisterSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

// ==================== Records ====================

/// Payload of a stored record: one sample per register, or a single scalar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordData {
    Samples(Vec<f64>),
    Scalar(f64),
}

impl fmt::Display for RecordData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordData::Samples(values) => {
                let parts: Vec<String> = values.iter().map(|v| format_number(*v)).collect();
                write!(f, "{}", parts.join(", "))
            }
            RecordData::Scalar(v) => write!(f, "{}", format_number(*v)),
        }
    }
}

/// One stored historical sample. Ids are positive and strictly increasing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: u64,
    pub timestamp: String,
    pub data: RecordData,
}

// ==================== Configuration ====================

/// Device polling configuration as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub reg_read: [u8; REGISTER_COUNT],
    pub interval: u64,
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_version() -> String {
    DEFAULT_FIRMWARE_VERSION.to_string()
}

impl DeviceConfig {
    /// Indices of registers the device polls.
    pub fn enabled_registers(&self) -> Vec<usize> {
        self.reg_read
            .iter()
            .enumerate()
            .filter(|(_, flag)| **flag == 1)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn update(&self) -> ConfigUpdate {
        ConfigUpdate {
            reg_read: self.reg_read,
            interval: self.interval,
        }
    }
}

/// Body of `POST /config`. The version is owned by the firmware upload flow
/// and is never part of a config update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigUpdate {
    pub reg_read: [u8; REGISTER_COUNT],
    pub interval: u64,
}

// ==================== Commands ====================

/// A queued register write, awaiting delivery to the device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub action: String,
    pub target_register: u8,
    #[serde(serialize_with = "serialize_number")]
    pub value: f64,
}

// ==================== Firmware ====================

/// Update-severity classification attached to an uploaded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum FirmwareLevel {
    Minor = 1,
    Standard = 2,
    Major = 3,
}

impl FirmwareLevel {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn display_name(self) -> &'static str {
        match self {
            FirmwareLevel::Minor => "Level 1 - Minor Update",
            FirmwareLevel::Standard => "Level 2 - Standard Update",
            FirmwareLevel::Major => "Level 3 - Major Update",
        }
    }
}

impl TryFrom<u8> for FirmwareLevel {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(FirmwareLevel::Minor),
            2 => Ok(FirmwareLevel::Standard),
            3 => Ok(FirmwareLevel::Major),
            other => Err(ValidationError::InvalidLevel(other.to_string())),
        }
    }
}

impl From<FirmwareLevel> for u8 {
    fn from(level: FirmwareLevel) -> Self {
        level.as_u8()
    }
}

/// Response of `GET /firmware/version`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirmwareVersion {
    pub version: String,
    pub level: u8,
    #[serde(default)]
    pub version_string: Option<String>,
}

/// Version tag carried in the `X-Config-Version` header of a download,
/// formatted as `<version>_<level>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigVersionTag {
    pub version: String,
    pub level: u8,
}

impl ConfigVersionTag {
    pub fn parse(raw: &str) -> Option<Self> {
        let (version, level) = raw.trim().rsplit_once('_')?;
        let level = level.parse().ok()?;
        validate_version(version).ok()?;
        Some(Self {
            version: version.to_string(),
            level,
        })
    }
}

/// A downloaded firmware binary with whatever metadata the backend sent.
#[derive(Debug, Clone)]
pub struct FirmwareImage {
    pub data: bytes::Bytes,
    pub tag: Option<ConfigVersionTag>,
}

impl FirmwareImage {
    /// File name to store the image under.
    pub fn file_name(&self, fallback_version: &str) -> String {
        let version = self
            .tag
            .as_ref()
            .map(|t| t.version.as_str())
            .unwrap_or(fallback_version);
        format!("firmware-{}.bin", version)
    }
}

// ==================== Helpers ====================

const VERSION_PATTERN: &str = r"^[0-9]+\.[0-9]+\.[0-9]+$";

fn version_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(VERSION_PATTERN)).as_ref().ok()
}

/// Check a `MAJOR.MINOR.PATCH` version string.
pub fn validate_version(version: &str) -> Result<(), ValidationError> {
    match version_regex() {
        Some(re) if re.is_match(version) => Ok(()),
        _ => Err(ValidationError::InvalidVersion(version.to_string())),
    }
}

/// Parse an operator-supplied timestamp (`YYYY-MM-DDTHH:MM[:SS]`, `T` or space).
pub fn parse_timestamp(input: &str) -> Result<NaiveDateTime, ValidationError> {
    const FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];

    let input = input.trim();
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .ok_or_else(|| ValidationError::InvalidTimestamp(input.to_string()))
}

/// Render a backend timestamp for display, keeping the raw text if it does
/// not parse.
pub fn display_timestamp(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.naive_local().format("%Y-%m-%d %H:%M:%S").to_string();
    }
    match parse_timestamp(raw) {
        Ok(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Print integral values without a trailing `.0`.
pub fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

/// Write integral values as JSON integers so the device sees `42`, not `42.0`.
fn serialize_number<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}
