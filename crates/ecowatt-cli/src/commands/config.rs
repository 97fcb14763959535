//! Device configuration commands and local backups.

use std::path::PathBuf;

use ecowatt_core::error::StorageError;
use ecowatt_core::panels::{ConfigPanel, StatusMessage};
use ecowatt_core::storage::ConfigBackupStorage;

use super::Context;
use crate::cli::{ConfigArgs, ConfigCommands, ConfigSetArgs};
use crate::error::CliError;

/// Run the config command
pub async fn run_config(args: ConfigArgs, ctx: &Context) -> Result<(), CliError> {
    match args.command {
        ConfigCommands::Show => run_show(ctx).await,
        ConfigCommands::Set(set) => run_set(set, ctx).await,
        ConfigCommands::Backup(b) => run_backup(&b.name, args.backup_dir, ctx).await,
        ConfigCommands::Restore(b) => run_restore(&b.name, args.backup_dir, ctx).await,
        ConfigCommands::Backups => run_backups(args.backup_dir, ctx).await,
        ConfigCommands::DeleteBackup(b) => run_delete_backup(&b.name, args.backup_dir, ctx).await,
    }
}

fn backup_storage(dir: Option<PathBuf>) -> Result<ConfigBackupStorage, CliError> {
    let dir = dir.or_else(ConfigBackupStorage::default_dir).ok_or_else(|| {
        StorageError::DirectoryAccess("no data directory on this platform".to_string())
    })?;
    Ok(ConfigBackupStorage::new(dir)?)
}

async fn run_show(ctx: &Context) -> Result<(), CliError> {
    let panel = ConfigPanel::open(ctx.client()?).await?;
    println!("{}", ctx.formatter().format_config(panel.saved()));
    Ok(())
}

/// Apply the requested edits to the panel's draft.
fn apply_edits(panel: &mut ConfigPanel, set: &ConfigSetArgs) -> Result<(), CliError> {
    for &index in &set.enable {
        panel.set_register(index, true)?;
    }
    for &index in &set.disable {
        panel.set_register(index, false)?;
    }
    for &index in &set.toggle {
        panel.toggle_register(index)?;
    }
    if let Some(interval) = set.interval {
        panel.set_interval(interval)?;
    }
    Ok(())
}

async fn run_set(set: ConfigSetArgs, ctx: &Context) -> Result<(), CliError> {
    if set.is_empty() {
        return Err(CliError::InvalidArgument(
            "Nothing to change. Use --interval, --enable, --disable or --toggle".to_string(),
        ));
    }

    let mut panel = ConfigPanel::open(ctx.client()?).await?;
    apply_edits(&mut panel, &set)?;

    let formatter = ctx.formatter();
    if !panel.is_dirty() {
        println!(
            "{}",
            formatter.format_message(&StatusMessage::success("Configuration already up to date"))
        );
        return Ok(());
    }

    panel.save().await?;
    if let Some(message) = panel.message() {
        println!("{}", formatter.format_message(message));
    }
    if !ctx.json {
        println!("{}", formatter.format_config(panel.saved()));
    }
    Ok(())
}

async fn run_backup(name: &str, dir: Option<PathBuf>, ctx: &Context) -> Result<(), CliError> {
    let storage = backup_storage(dir)?;
    ConfigBackupStorage::validate_name(name)?;

    let panel = ConfigPanel::open(ctx.client()?).await?;
    storage.save(name, panel.saved()).await?;

    let message = StatusMessage::success(format!("Saved backup '{}'", name));
    println!("{}", ctx.formatter().format_message(&message));
    Ok(())
}

async fn run_restore(name: &str, dir: Option<PathBuf>, ctx: &Context) -> Result<(), CliError> {
    let storage = backup_storage(dir)?;
    let backup = storage
        .read(name)
        .await?
        .ok_or_else(|| StorageError::NotFound(name.to_string()))?;

    let mut panel = ConfigPanel::open(ctx.client()?).await?;
    panel.load_update(&backup.config.update())?;
    panel.save().await?;

    tracing::info!(name, "backup restored");
    let message = StatusMessage::success(format!("Restored backup '{}'", name));
    println!("{}", ctx.formatter().format_message(&message));
    Ok(())
}

async fn run_backups(dir: Option<PathBuf>, ctx: &Context) -> Result<(), CliError> {
    let storage = backup_storage(dir)?;
    let backups = storage.list().await?;
    println!("{}", ctx.formatter().format_backups(&backups));
    Ok(())
}

async fn run_delete_backup(name: &str, dir: Option<PathBuf>, ctx: &Context) -> Result<(), CliError> {
    let storage = backup_storage(dir)?;
    storage.delete(name).await?;
    let message = StatusMessage::success(format!("Deleted backup '{}'", name));
    println!("{}", ctx.formatter().format_message(&message));
    Ok(())
}
