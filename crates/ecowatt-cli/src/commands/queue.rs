//! Command queue commands.

use ecowatt_core::panels::CommandQueue;
use ecowatt_core::protocol::commands::CommandDraft;

use super::Context;
use crate::cli::{QueueAddArgs, QueueArgs, QueueCommands};
use crate::error::CliError;

/// Run the queue command
pub async fn run_queue(args: QueueArgs, ctx: &Context) -> Result<(), CliError> {
    let mut queue = CommandQueue::new(ctx.client()?);
    match args.command {
        QueueCommands::List => {
            let commands = queue.refresh().await?;
            println!("{}", ctx.formatter().format_commands(commands));
        }
        QueueCommands::Add(add) => run_add(&mut queue, add, ctx).await?,
    }
    Ok(())
}

async fn run_add(queue: &mut CommandQueue, add: QueueAddArgs, ctx: &Context) -> Result<(), CliError> {
    queue.draft = CommandDraft::new(add.register, add.value);
    queue.submit_draft().await?;

    let formatter = ctx.formatter();
    if let Some(message) = queue.message() {
        println!("{}", formatter.format_message(message));
    }
    if !ctx.json {
        println!("{}", formatter.format_commands(queue.commands()));
    }
    Ok(())
}
