//! Backend communication layer.
//!
//! Provides the JSON REST client and firmware transfer over HTTP.

pub mod api;
pub mod firmware;

pub use api::CloudClient;
pub use firmware::{NoopProgress, TransferProgressHandler};
