//! EcoWatt Cloud core library.
//!
//! Typed access to the EcoWatt cloud backend: register readings, historical
//! records with id-window pagination, device polling configuration, the
//! write command queue and firmware images. The `panels` module keeps the
//! per-view state a front end needs; `storage` holds local settings and
//! config backups.

pub mod client;
pub mod error;
pub mod pagination;
pub mod panels;
pub mod protocol;
pub mod storage;
pub mod types;

pub use client::CloudClient;
pub use error::{ApiError, CoreError, PageError, Result, StorageError, ValidationError};
