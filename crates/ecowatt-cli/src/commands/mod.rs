//! Command implementations.
//!
//! Every subcommand builds the panel it drives, runs one action on it and
//! prints the outcome once.

pub mod config;
pub mod data;
pub mod firmware;
pub mod queue;
pub mod settings;

pub use config::run_config;
pub use data::{run_count, run_query, run_records, run_registers};
pub use firmware::run_firmware;
pub use queue::run_queue;
pub use settings::run_settings;

use std::path::PathBuf;

use ecowatt_core::storage::Settings;
use ecowatt_core::CloudClient;

use crate::cli::Cli;
use crate::error::CliError;
use crate::output::{get_formatter, OutputFormatter};

/// Values given on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub timeout_ms: Option<u64>,
    pub page_size: Option<u64>,
}

impl Overrides {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            base_url: cli.base_url.clone(),
            timeout_ms: cli.timeout,
            page_size: cli.page_size,
        }
    }

    /// Layer the overrides on top of `settings`.
    pub fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(url) = &self.base_url {
            settings.base_url = url.clone();
        }
        if let Some(timeout) = self.timeout_ms {
            settings.timeout_ms = timeout;
        }
        if let Some(size) = self.page_size {
            settings.page_size = size;
        }
        settings
    }
}

/// Resolved settings plus output options shared by every command.
pub struct Context {
    pub settings: Settings,
    pub settings_path: Option<PathBuf>,
    pub overrides: Overrides,
    pub json: bool,
    pub quiet: bool,
}

impl Context {
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let settings_path = cli.settings.clone().or_else(Settings::default_path);
        let stored = match &settings_path {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };
        let overrides = Overrides::from_cli(cli);
        let settings = overrides.apply(stored).validated()?;

        tracing::debug!(
            base_url = %settings.base_url,
            page_size = settings.page_size,
            timeout_ms = settings.timeout_ms,
            "settings resolved"
        );

        Ok(Self {
            settings,
            settings_path,
            overrides,
            json: cli.json,
            quiet: cli.quiet,
        })
    }

    pub fn client(&self) -> Result<CloudClient, CliError> {
        Ok(self.settings.client()?)
    }

    pub fn formatter(&self) -> Box<dyn OutputFormatter> {
        get_formatter(self.json)
    }

    /// Spinners and other terminal decoration are skipped for JSON and quiet runs.
    pub fn interactive(&self) -> bool {
        !self.json && !self.quiet
    }
}
