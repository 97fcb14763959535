//! Firmware image commands.

use std::path::Path;
use std::time::Duration;

use indicatif::{HumanBytes, ProgressBar, ProgressStyle};

use ecowatt_core::client::firmware::FirmwareUpload;
use ecowatt_core::client::{NoopProgress, TransferProgressHandler};
use ecowatt_core::panels::FirmwarePanel;
use ecowatt_core::types::FirmwareLevel;

use super::Context;
use crate::cli::{FirmwareArgs, FirmwareCommands, FirmwareDownloadArgs, FirmwareUploadArgs};
use crate::error::CliError;

/// CLI progress handler using an indicatif spinner
struct SpinnerProgress {
    bar: ProgressBar,
}

impl SpinnerProgress {
    fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed}] {msg}") {
            bar.set_style(style);
        }
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }
}

impl TransferProgressHandler for SpinnerProgress {
    fn on_start(&self, total_bytes: u64) {
        self.bar
            .set_message(format!("Uploading {}...", HumanBytes(total_bytes)));
    }

    fn on_complete(&self, total_bytes: u64) {
        self.bar
            .finish_with_message(format!("Uploaded {}", HumanBytes(total_bytes)));
    }

    fn on_error(&self, error: &str) {
        self.bar.abandon_with_message(format!("Upload failed: {}", error));
    }
}

/// Run the firmware command
pub async fn run_firmware(args: FirmwareArgs, ctx: &Context) -> Result<(), CliError> {
    match args.command {
        FirmwareCommands::Version => {
            let version = ctx.client()?.firmware_version().await?;
            println!("{}", ctx.formatter().format_firmware_version(&version));
            Ok(())
        }
        FirmwareCommands::Upload(upload) => run_upload(upload, ctx).await,
        FirmwareCommands::Download(download) => run_download(download, ctx).await,
    }
}

async fn read_upload(args: &FirmwareUploadArgs) -> Result<FirmwareUpload, CliError> {
    let level = FirmwareLevel::try_from(args.level)?;
    if !args.file.is_file() {
        return Err(CliError::InvalidArgument(format!(
            "Firmware file not found: {}",
            args.file.display()
        )));
    }

    let data = tokio::fs::read(&args.file).await?;
    let file_name = args
        .file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("firmware.bin")
        .to_string();

    let upload = FirmwareUpload::new(data, &file_name, level);
    match &args.version {
        Some(version) => Ok(upload.with_version(version)?),
        None => Ok(upload),
    }
}

async fn run_upload(args: FirmwareUploadArgs, ctx: &Context) -> Result<(), CliError> {
    let upload = read_upload(&args).await?;
    let mut panel = FirmwarePanel::open(ctx.client()?).await;
    tracing::debug!(current = panel.current_version(), level = upload.level.as_u8(), "uploading firmware");

    if ctx.interactive() {
        panel.upload(upload, &SpinnerProgress::new()).await?;
    } else {
        panel.upload(upload, &NoopProgress).await?;
    }

    if let Some(message) = panel.message() {
        println!(
            "{}",
            ctx.formatter()
                .format_transfer(message, panel.current_version(), None)
        );
    }
    Ok(())
}

async fn run_download(args: FirmwareDownloadArgs, ctx: &Context) -> Result<(), CliError> {
    let mut panel = FirmwarePanel::open(ctx.client()?).await;
    let path = panel.download_to(Path::new(&args.output)).await?;

    if let Some(message) = panel.message() {
        println!(
            "{}",
            ctx.formatter()
                .format_transfer(message, panel.current_version(), Some(&path))
        );
    }
    Ok(())
}
