//! Error types for the EcoWatt CLI.
//!
//! CliError wraps CoreError from the shared library and adds CLI-specific variants.

use ecowatt_core::error::{ApiError, CoreError, PageError, StorageError, ValidationError};
use thiserror::Error;

/// Exit codes for the CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const NETWORK_ERROR: i32 = 2;
    pub const API_ERROR: i32 = 3;
    pub const INVALID_ARGS: i32 = 4;
}

/// Main error type for the CLI
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Core(#[from] CoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Core(e) => match e {
                CoreError::Api(api) => match api {
                    ApiError::NotReachable { .. } | ApiError::Request(_) => {
                        exit_codes::NETWORK_ERROR
                    }
                    ApiError::InvalidUrl(_) => exit_codes::INVALID_ARGS,
                    ApiError::Http { .. }
                    | ApiError::Rejected { .. }
                    | ApiError::InvalidResponse { .. } => exit_codes::API_ERROR,
                },
                CoreError::Validation(_) | CoreError::Page(_) => exit_codes::INVALID_ARGS,
                CoreError::Storage(StorageError::InvalidName(_)) => exit_codes::INVALID_ARGS,
                CoreError::Storage(_) => exit_codes::GENERAL_ERROR,
                CoreError::Io(_) => exit_codes::GENERAL_ERROR,
            },
            CliError::Io(_) => exit_codes::GENERAL_ERROR,
            CliError::InvalidArgument(_) => exit_codes::INVALID_ARGS,
        }
    }
}

// Conversions from core error subtypes to CliError
impl From<ApiError> for CliError {
    fn from(e: ApiError) -> Self {
        CliError::Core(CoreError::Api(e))
    }
}

impl From<ValidationError> for CliError {
    fn from(e: ValidationError) -> Self {
        CliError::Core(CoreError::Validation(e))
    }
}

impl From<PageError> for CliError {
    fn from(e: PageError) -> Self {
        CliError::Core(CoreError::Page(e))
    }
}

impl From<StorageError> for CliError {
    fn from(e: StorageError) -> Self {
        CliError::Core(CoreError::Storage(e))
    }
}
