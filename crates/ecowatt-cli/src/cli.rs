//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// EcoWatt CLI - Command-line dashboard for EcoWatt Cloud device administration
#[derive(Parser, Debug)]
#[command(name = "ecowatt")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Backend base URL (overrides the settings file)
    #[arg(long, global = true, env = "ECOWATT_BASE_URL")]
    pub base_url: Option<String>,

    /// Request timeout in milliseconds
    #[arg(long, global = true, env = "ECOWATT_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Records per page
    #[arg(long, global = true)]
    pub page_size: Option<u64>,

    /// Settings file to use instead of the platform default
    #[arg(long, global = true, env = "ECOWATT_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Latest value of every register
    Registers,

    /// Newest records, in batches of one page
    Records(RecordsArgs),

    /// Records filtered by id and/or time range
    Query(QueryArgs),

    /// Number of records matching a filter
    Count(FilterArgs),

    /// Device polling configuration
    Config(ConfigArgs),

    /// Register write command queue
    Queue(QueueArgs),

    /// Firmware images
    Firmware(FirmwareArgs),

    /// Local tool settings
    Settings(SettingsArgs),
}

// ==================== Data ====================

#[derive(Args, Debug)]
pub struct RecordsArgs {
    /// Batch number, 1 being the newest records
    #[arg(short, long, default_value = "1")]
    pub batch: u64,

    /// Also show the register snapshot
    #[arg(long)]
    pub registers: bool,
}

#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// First record id (inclusive)
    #[arg(long)]
    pub start_id: Option<u64>,

    /// Last record id (inclusive)
    #[arg(long)]
    pub end_id: Option<u64>,

    /// Earliest timestamp, YYYY-MM-DDTHH:MM[:SS]
    #[arg(long)]
    pub start_time: Option<String>,

    /// Latest timestamp, YYYY-MM-DDTHH:MM[:SS]
    #[arg(long)]
    pub end_time: Option<String>,
}

#[derive(Args, Debug)]
pub struct QueryArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Page of the results to show
    #[arg(short, long, default_value = "1")]
    pub page: u64,
}

// ==================== Config ====================

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Directory holding local config backups
    #[arg(long, global = true, env = "ECOWATT_BACKUP_DIR")]
    pub backup_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the device configuration
    Show,

    /// Edit register flags and polling interval, then save
    Set(ConfigSetArgs),

    /// Save the current device configuration as a local backup
    Backup(BackupNameArgs),

    /// Push a local backup to the device configuration
    Restore(BackupNameArgs),

    /// List local backups
    Backups,

    /// Delete a local backup
    DeleteBackup(BackupNameArgs),
}

#[derive(Args, Debug, Default)]
pub struct ConfigSetArgs {
    /// Polling interval in milliseconds
    #[arg(long)]
    pub interval: Option<u64>,

    /// Registers to start reading (comma-separated indices)
    #[arg(long, value_delimiter = ',')]
    pub enable: Vec<usize>,

    /// Registers to stop reading (comma-separated indices)
    #[arg(long, value_delimiter = ',')]
    pub disable: Vec<usize>,

    /// Registers to flip (comma-separated indices)
    #[arg(long, value_delimiter = ',')]
    pub toggle: Vec<usize>,
}

impl ConfigSetArgs {
    pub fn is_empty(&self) -> bool {
        self.interval.is_none()
            && self.enable.is_empty()
            && self.disable.is_empty()
            && self.toggle.is_empty()
    }
}

#[derive(Args, Debug)]
pub struct BackupNameArgs {
    /// Backup name (letters, digits, '-' and '_')
    pub name: String,
}

// ==================== Queue ====================

#[derive(Args, Debug)]
pub struct QueueArgs {
    #[command(subcommand)]
    pub command: QueueCommands,
}

#[derive(Subcommand, Debug)]
pub enum QueueCommands {
    /// Show queued commands
    List,

    /// Queue a register write
    Add(QueueAddArgs),
}

#[derive(Args, Debug)]
pub struct QueueAddArgs {
    /// Target register (0-9)
    #[arg(short, long)]
    pub register: String,

    /// Value to write
    #[arg(long, allow_hyphen_values = true)]
    pub value: String,
}

// ==================== Firmware ====================

#[derive(Args, Debug)]
pub struct FirmwareArgs {
    #[command(subcommand)]
    pub command: FirmwareCommands,
}

#[derive(Subcommand, Debug)]
pub enum FirmwareCommands {
    /// Show the version of the current image
    Version,

    /// Upload a new image
    Upload(FirmwareUploadArgs),

    /// Download the current image
    Download(FirmwareDownloadArgs),
}

#[derive(Args, Debug)]
pub struct FirmwareUploadArgs {
    /// Firmware binary
    pub file: PathBuf,

    /// Update level: 1 minor, 2 standard, 3 major
    #[arg(short, long, default_value = "2")]
    pub level: u8,

    /// Version of the image (MAJOR.MINOR.PATCH)
    #[arg(id = "fw_version", long = "fw-version")]
    pub version: Option<String>,
}

#[derive(Args, Debug)]
pub struct FirmwareDownloadArgs {
    /// File or directory to write the image to
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,
}

// ==================== Settings ====================

#[derive(Args, Debug)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub command: SettingsCommands,
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// Show the effective settings
    Show,

    /// Persist --base-url, --timeout and --page-size to the settings file
    Set,

    /// Print the settings file location
    Path,
}
