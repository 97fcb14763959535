//! Response envelopes and parsing utilities.
//!
//! Most endpoints answer `{"status": "success" | "error", "message"?: ..., ...}`.
//! A reply whose status is anything but `"success"` is a rejection even when
//! the HTTP status is 2xx.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::ApiError;
use crate::types::{Command, DeviceConfig};

pub const STATUS_SUCCESS: &str = "success";

/// Header carrying `<version>_<level>` on firmware downloads.
pub const CONFIG_VERSION_HEADER: &str = "X-Config-Version";

/// Common `{status, message}` part of every reply.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusEnvelope {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl StatusEnvelope {
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some(STATUS_SUCCESS)
    }

    /// Fail unless the backend reported success. `fallback` is used when the
    /// reply carries no message of its own.
    pub fn ensure_success(&self, endpoint: &str, fallback: &str) -> Result<(), ApiError> {
        if self.is_success() {
            return Ok(());
        }
        Err(ApiError::Rejected {
            endpoint: endpoint.to_string(),
            message: self
                .message
                .clone()
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| fallback.to_string()),
        })
    }
}

/// `GET /config`
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigResponse {
    #[serde(flatten)]
    pub envelope: StatusEnvelope,
    #[serde(default)]
    pub config: Option<DeviceConfig>,
}

/// `GET /data`, either register rows or records depending on the query.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound = "T: DeserializeOwned")]
pub struct DataResponse<T> {
    #[serde(flatten)]
    pub envelope: StatusEnvelope,
    #[serde(default)]
    pub data: Vec<T>,
    #[serde(default)]
    pub count: Option<u64>,
}

/// `GET /data/count`. Older backends omit `status`; a missing count means 0.
#[derive(Debug, Clone, Deserialize)]
pub struct CountResponse {
    #[serde(flatten)]
    pub envelope: StatusEnvelope,
    #[serde(default)]
    pub count: Option<u64>,
}

impl CountResponse {
    pub fn into_count(self, endpoint: &str) -> Result<u64, ApiError> {
        if self.envelope.status.is_some() {
            self.envelope
                .ensure_success(endpoint, "Failed to fetch record count")?;
        }
        Ok(self.count.unwrap_or(0))
    }
}

/// `GET /commands`, wrapped in `{commands: [...]}` or as a bare array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CommandsResponse {
    Wrapped { commands: Vec<serde_json::Value> },
    Bare(Vec<serde_json::Value>),
}

impl CommandsResponse {
    /// The queued commands. The backend stores whatever a client posted, so
    /// entries that do not decode as a [`Command`] are skipped.
    pub fn into_commands(self) -> Vec<Command> {
        let entries = match self {
            CommandsResponse::Wrapped { commands } => commands,
            CommandsResponse::Bare(commands) => commands,
        };
        entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match serde_json::from_value(entry) {
                Ok(command) => Some(command),
                Err(e) => {
                    tracing::warn!(index, error = %e, "skipping malformed queue entry");
                    None
                }
            })
            .collect()
    }
}

/// `POST /firmware`
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    #[serde(flatten)]
    pub envelope: StatusEnvelope,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub update_level: Option<u8>,
}

/// `GET /firmware/version`
#[derive(Debug, Clone, Deserialize)]
pub struct FirmwareVersionResponse {
    #[serde(flatten)]
    pub envelope: StatusEnvelope,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub level: Option<u8>,
    #[serde(default)]
    pub version_string: Option<String>,
}

/// Parse a JSON body, reporting failures against the endpoint.
pub fn parse_body<T: DeserializeOwned>(endpoint: &str, body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::InvalidResponse {
        endpoint: endpoint.to_string(),
        message: format!("Failed to parse JSON: {}", e),
    })
}

/// Pull a human readable message out of an error body.
///
/// Looks for `message`, then `error`; falls back to the trimmed body text.
pub fn error_message(body: &str) -> Option<String> {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(msg) = json
            .get("message")
            .or_else(|| json.get("error"))
            .and_then(|m| m.as_str())
        {
            return Some(msg.to_string());
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed.starts_with('<') {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Record, RegisterReading};

    #[test]
    fn test_envelope_success() {
        let env: StatusEnvelope = parse_body("/config", r#"{"status": "success"}"#).unwrap();
        assert!(env.is_success());
        assert!(env.ensure_success("/config", "failed").is_ok());
    }

    #[test]
    fn test_envelope_rejection_uses_server_message() {
        let env: StatusEnvelope =
            parse_body("/commands", r#"{"status": "error", "message": "Invalid command format"}"#)
                .unwrap();
        let err = env.ensure_success("/commands", "Failed to queue command").unwrap_err();
        assert!(err.to_string().contains("Invalid command format"));
    }

    #[test]
    fn test_envelope_rejection_fallback() {
        let env = StatusEnvelope::default();
        let err = env.ensure_success("/config", "Failed to update configuration").unwrap_err();
        assert!(err.to_string().contains("Failed to update configuration"));
    }

    #[test]
    fn test_config_response() {
        let body = r#"{"status": "success", "config": {"reg_read": [1,1,1,1,1,1,1,1,1,1], "interval": 1000, "version": "1.0.0"}}"#;
        let resp: ConfigResponse = parse_body("/config", body).unwrap();
        assert!(resp.envelope.is_success());
        assert_eq!(resp.config.unwrap().interval, 1000);
    }

    #[test]
    fn test_data_response_registers_and_records() {
        let regs: DataResponse<RegisterReading> = parse_body(
            "/data",
            r#"{"status": "success", "data": [{"register": 0, "value": 230, "timestamp": "t"}, {"register": 1, "value": null, "timestamp": null}]}"#,
        )
        .unwrap();
        assert_eq!(regs.data.len(), 2);

        let recs: DataResponse<Record> = parse_body(
            "/data",
            r#"{"status": "success", "count": 1, "data": [{"id": 5, "timestamp": "t", "data": [1,2]}]}"#,
        )
        .unwrap();
        assert_eq!(recs.count, Some(1));
        assert_eq!(recs.data[0].id, 5);
    }

    #[test]
    fn test_count_response_variants() {
        let bare: CountResponse = parse_body("/data/count", r#"{"count": 45}"#).unwrap();
        assert_eq!(bare.into_count("/data/count").unwrap(), 45);

        let missing: CountResponse = parse_body("/data/count", r#"{}"#).unwrap();
        assert_eq!(missing.into_count("/data/count").unwrap(), 0);

        let failed: CountResponse =
            parse_body("/data/count", r#"{"status": "error", "message": "db locked"}"#).unwrap();
        assert!(failed.into_count("/data/count").is_err());
    }

    #[test]
    fn test_commands_response_shapes() {
        let wrapped: CommandsResponse = parse_body(
            "/commands",
            r#"{"commands": [{"action": "write_register", "target_register": 2, "value": 5}]}"#,
        )
        .unwrap();
        assert_eq!(wrapped.into_commands().len(), 1);

        let bare: CommandsResponse = parse_body("/commands", r#"[]"#).unwrap();
        assert!(bare.into_commands().is_empty());
    }

    #[test]
    fn test_commands_response_skips_malformed_entries() {
        let body = r#"{"commands": [
            {"action": "write_register", "target_register": "4", "value": 1},
            {"action": "write_register", "target_register": 300, "value": 1},
            {"action": "write_register", "target_register": 7, "value": 2.5},
            {"action": "write_register"}
        ]}"#;
        let resp: CommandsResponse = parse_body("/commands", body).unwrap();
        let commands = resp.into_commands();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].target_register, 7);
        assert_eq!(commands[0].value, 2.5);
    }

    #[test]
    fn test_parse_body_invalid() {
        let result: Result<StatusEnvelope, _> = parse_body("/config", "<html>oops</html>");
        assert!(matches!(result, Err(ApiError::InvalidResponse { .. })));
    }

    #[test]
    fn test_error_message() {
        assert_eq!(
            error_message(r#"{"status": "error", "message": "Invalid ID range"}"#),
            Some("Invalid ID range".to_string())
        );
        assert_eq!(
            error_message(r#"{"error": "not found"}"#),
            Some("not found".to_string())
        );
        assert_eq!(error_message("  plain text  "), Some("plain text".to_string()));
        assert_eq!(error_message("<html></html>"), None);
        assert_eq!(error_message(""), None);
    }
}
