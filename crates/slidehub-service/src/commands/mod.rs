//! The command/undo engine.
//!
//! Every mutating user action (rename, delete, tag, merge, reorder) is
//! wrapped in a [`Command`] and sequenced on one linear
//! [`stack::UndoStack`]. Commands are self-contained: they capture
//! old/new names, prior keyword edges, and previous orderings before
//! mutating, so `revert` never re-queries mutable external state.

pub mod delete;
pub mod keyword;
pub mod rename;
pub mod reorder;
pub mod stack;

use async_trait::async_trait;

use slidehub_core::result::AppResult;
use slidehub_core::types::CommandOutcome;

pub use delete::{DeleteFileCommand, DeleteProjectCommand};
pub use keyword::{
    AssignKeywordCommand, MergeKeywordsCommand, RecolorKeywordCommand, RenameKeywordCommand,
    UnassignKeywordCommand,
};
pub use rename::{RenameFileCommand, RenameProjectCommand};
pub use reorder::MoveAssemblySlideCommand;

/// One reversible user action.
#[async_trait]
pub trait Command: Send + std::fmt::Debug {
    /// Short human-readable description, e.g. `rename project`.
    fn label(&self) -> String;

    /// Perform the action. The returned outcome reports whether revert
    /// can restore everything or only the database rows.
    async fn apply(&mut self) -> AppResult<CommandOutcome>;

    /// Undo the action's database effects. Filesystem deletions stay
    /// deleted; that asymmetry was reported by `apply`.
    async fn revert(&mut self) -> AppResult<()>;
}
