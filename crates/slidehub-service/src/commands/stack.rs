//! Linear undo/redo stack.
//!
//! The stack is a process-wide singleton owned by the control thread.
//! Workers report results through events; they never push commands.
//! Mutating methods take `&mut self`, and the facade hands out access
//! through a try-lock that rejects concurrent mutation instead of
//! queueing it.

use tracing::info;

use slidehub_core::result::AppResult;
use slidehub_core::types::CommandOutcome;

use super::Command;

/// Strictly linear undo/redo history; no branching.
#[derive(Debug, Default)]
pub struct UndoStack {
    undo: Vec<Box<dyn Command>>,
    redo: Vec<Box<dyn Command>>,
}

impl UndoStack {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a command and push it onto the history.
    ///
    /// Applying a new command after undoing others discards the undone
    /// redo branch.
    pub async fn execute(&mut self, mut command: Box<dyn Command>) -> AppResult<CommandOutcome> {
        let outcome = command.apply().await?;
        info!(command = %command.label(), ?outcome, "Command applied");
        self.redo.clear();
        self.undo.push(command);
        Ok(outcome)
    }

    /// Revert the most recent command. Returns its label, or `None`
    /// with nothing to undo.
    pub async fn undo(&mut self) -> AppResult<Option<String>> {
        let Some(mut command) = self.undo.pop() else {
            return Ok(None);
        };

        match command.revert().await {
            Ok(()) => {
                let label = command.label();
                info!(command = %label, "Command reverted");
                self.redo.push(command);
                Ok(Some(label))
            }
            Err(e) => {
                // A failed revert leaves the command on the undo side
                // so the user can retry.
                self.undo.push(command);
                Err(e)
            }
        }
    }

    /// Re-apply the most recently undone command. Returns its label and
    /// outcome, or `None` with nothing to redo.
    pub async fn redo(&mut self) -> AppResult<Option<(String, CommandOutcome)>> {
        let Some(mut command) = self.redo.pop() else {
            return Ok(None);
        };

        match command.apply().await {
            Ok(outcome) => {
                let label = command.label();
                info!(command = %label, "Command re-applied");
                self.undo.push(command);
                Ok(Some((label, outcome)))
            }
            Err(e) => {
                self.redo.push(command);
                Err(e)
            }
        }
    }

    /// Whether there is anything to undo.
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Whether there is anything to redo.
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Drop the whole history.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
