//! Error types for EcoWatt core.

use thiserror::Error;

/// Core error type for shared operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Page(#[from] PageError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors talking to the cloud backend.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Backend not reachable at {url}: {source}")]
    NotReachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP {status} from {url}: {message}")]
    Http {
        url: String,
        status: u16,
        message: String,
    },

    /// The backend answered, but with a `status` other than `"success"`.
    #[error("Request to {endpoint} was rejected: {message}")]
    Rejected { endpoint: String, message: String },

    #[error("Invalid response from {endpoint}: {message}")]
    InvalidResponse { endpoint: String, message: String },
}

/// Client-side input validation failures. These block the request from
/// being sent at all.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Register must be an integer between 0 and 9, got {0}")]
    RegisterOutOfRange(String),

    #[error("Value must be a valid number, got {0}")]
    InvalidValue(String),

    #[error("Interval must be a positive number of milliseconds, got {0}")]
    InvalidInterval(String),

    #[error("Firmware level must be 1, 2 or 3, got {0}")]
    InvalidLevel(String),

    #[error("Invalid version '{0}', expected MAJOR.MINOR.PATCH (e.g. 1.0.0)")]
    InvalidVersion(String),

    #[error("Invalid timestamp '{0}', expected YYYY-MM-DDTHH:MM[:SS]")]
    InvalidTimestamp(String),

    #[error("Start id {start} is greater than end id {end}")]
    InvertedIdRange { start: u64, end: u64 },

    #[error("Start time {start} is after end time {end}")]
    InvertedTimeRange { start: String, end: String },

    #[error("Register flags must be 0 or 1, got {0}")]
    InvalidFlag(u8),
}

/// Pagination contract violations and navigation limits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    #[error("Batch and page numbers start at 1")]
    ZeroPage,

    #[error("Page size must be positive")]
    ZeroPageSize,

    #[error("No more pages: batch {batch} is beyond the {total} stored records")]
    BeyondHistory { batch: u64, total: u64 },

    #[error("Already showing the newest records")]
    AlreadyNewest,

    #[error("Already on the first page")]
    AlreadyFirst,

    #[error("No query has been run yet")]
    NoActiveQuery,
}

/// Local storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to access storage directory: {0}")]
    DirectoryAccess(String),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CoreError {
    /// True when the failure happened before any byte reached the backend.
    pub fn is_client_side(&self) -> bool {
        matches!(self, CoreError::Validation(_) | CoreError::Page(_))
    }
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::RegisterOutOfRange("10".to_string());
        assert_eq!(
            format!("{}", err),
            "Register must be an integer between 0 and 9, got 10"
        );
    }

    #[test]
    fn test_core_error_from_page_error() {
        let err: CoreError = PageError::BeyondHistory { batch: 4, total: 45 }.into();
        assert!(format!("{}", err).contains("No more pages"));
        assert!(err.is_client_side());
    }

    #[test]
    fn test_rejected_is_not_client_side() {
        let err: CoreError = ApiError::Rejected {
            endpoint: "/config".to_string(),
            message: "bad".to_string(),
        }
        .into();
        assert!(!err.is_client_side());
    }
}
