//! Command queue panel.
//!
//! The queue is append-only from this side: commands are enqueued and the
//! whole list is re-read, never edited or removed.

use crate::client::CloudClient;
use crate::error::CoreError;
use crate::protocol::commands::CommandDraft;
use crate::types::Command;

use super::{banner, error_banner, StatusMessage};

pub struct CommandQueue {
    client: CloudClient,
    commands: Vec<Command>,
    pub draft: CommandDraft,
    message: Option<StatusMessage>,
}

impl CommandQueue {
    pub fn new(client: CloudClient) -> Self {
        Self {
            client,
            commands: Vec::new(),
            draft: CommandDraft::default(),
            message: None,
        }
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn message(&self) -> Option<&StatusMessage> {
        self.message.as_ref()
    }

    /// Re-read the full queue from the backend.
    pub async fn refresh(&mut self) -> Result<&[Command], CoreError> {
        let result = self.client.commands().await.map_err(CoreError::from);
        self.message = Some(banner(&result, "fetch commands", |c| {
            format!("Fetched {} commands", c.len())
        }));
        self.commands = result?;
        Ok(&self.commands)
    }

    /// Validate the draft, queue it, then refresh the list.
    ///
    /// An invalid draft never reaches the backend. On success the draft is
    /// cleared.
    pub async fn submit_draft(&mut self) -> Result<Command, CoreError> {
        let command = match self.draft.build() {
            Ok(command) => command,
            Err(e) => {
                let err = CoreError::from(e);
                self.message = Some(error_banner(&err, "queue command"));
                return Err(err);
            }
        };

        self.enqueue(&command).await?;
        self.draft.clear();
        Ok(command)
    }

    /// Queue an already validated command, then refresh the list.
    pub async fn enqueue(&mut self, command: &Command) -> Result<(), CoreError> {
        let result = self
            .client
            .enqueue_command(command)
            .await
            .map_err(CoreError::from);
        self.message = Some(banner(&result, "queue command", |_| "Command queued".to_string()));
        result?;

        tracing::info!(
            register = command.target_register,
            value = command.value,
            "command queued"
        );

        // The queue is re-read so the list shows what the backend holds. A
        // failed re-read is not a failed enqueue.
        match self.client.commands().await {
            Ok(commands) => self.commands = commands,
            Err(e) => tracing::warn!(error = %e, "could not re-read command queue"),
        }
        Ok(())
    }
}
