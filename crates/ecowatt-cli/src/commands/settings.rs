//! Local settings commands.

use ecowatt_core::panels::StatusMessage;
use ecowatt_core::storage::Settings;

use super::Context;
use crate::cli::{SettingsArgs, SettingsCommands};
use crate::error::CliError;

/// Run the settings command
pub async fn run_settings(args: SettingsArgs, ctx: &Context) -> Result<(), CliError> {
    let formatter = ctx.formatter();
    match args.command {
        SettingsCommands::Show => {
            println!(
                "{}",
                formatter.format_settings(&ctx.settings, ctx.settings_path.as_deref())
            );
        }
        SettingsCommands::Path => match &ctx.settings_path {
            Some(path) => println!("{}", path.display()),
            None => {
                return Err(CliError::InvalidArgument(
                    "No settings location on this platform; pass --settings".to_string(),
                ))
            }
        },
        SettingsCommands::Set => {
            let path = ctx.settings_path.as_deref().ok_or_else(|| {
                CliError::InvalidArgument(
                    "No settings location on this platform; pass --settings".to_string(),
                )
            })?;

            // Start from what is stored so unrelated fields keep their values.
            let stored = Settings::load(path)?;
            let updated = ctx.overrides.apply(stored).validated()?;
            updated.save(path)?;
            tracing::info!(path = %path.display(), "settings saved");

            let message = StatusMessage::success(format!("Settings saved to {}", path.display()));
            println!("{}", formatter.format_message(&message));
            if !ctx.json {
                println!("{}", formatter.format_settings(&updated, Some(path)));
            }
        }
    }
    Ok(())
}
