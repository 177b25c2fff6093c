//! Rename commands touching both the filesystem and a database row.
//!
//! The folder (or file) is renamed first and the database row updated
//! second; if the database update fails, the filesystem rename is
//! rolled back before the error propagates.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::warn;
use uuid::Uuid;

use slidehub_core::config::DatabaseConfig;
use slidehub_core::error::AppError;
use slidehub_core::result::AppResult;
use slidehub_core::types::CommandOutcome;
use slidehub_database::connection::DatabasePool;
use slidehub_database::repositories::{FileRepository, ProjectRepository};

use super::Command;

/// Rename a directory or file, rolling the rename back when the
/// follow-up database update fails.
async fn rename_with_rollback<F>(from: &Path, to: &Path, update: F) -> AppResult<()>
where
    F: std::future::Future<Output = AppResult<()>>,
{
    tokio::fs::rename(from, to).await.map_err(|e| {
        AppError::with_source(
            slidehub_core::error::ErrorKind::Storage,
            format!("Failed to rename {} to {}", from.display(), to.display()),
            e,
        )
    })?;

    if let Err(db_err) = update.await {
        if let Err(fs_err) = tokio::fs::rename(to, from).await {
            warn!(
                error = %fs_err,
                from = %to.display(),
                to = %from.display(),
                "Could not roll back filesystem rename after database failure"
            );
        }
        return Err(db_err);
    }
    Ok(())
}

/// Rename a project: its root folder on disk and its database row.
///
/// The database file lives inside the folder being renamed, so the row
/// update runs on a short-lived pool opened at the folder's new
/// location; the command never holds a pool whose path could go stale.
#[derive(Debug)]
pub struct RenameProjectCommand {
    db_config: DatabaseConfig,
    project_id: Uuid,
    old_name: String,
    new_name: String,
    old_root: PathBuf,
    new_root: PathBuf,
}

impl RenameProjectCommand {
    /// Capture everything needed to apply and revert the rename.
    pub fn new(
        db_config: DatabaseConfig,
        project_id: Uuid,
        old_name: String,
        new_name: String,
        old_root: PathBuf,
        new_root: PathBuf,
    ) -> Self {
        Self {
            db_config,
            project_id,
            old_name,
            new_name,
            old_root,
            new_root,
        }
    }

    /// Update the project row through a pool opened at `root`.
    async fn update_row(&self, root: &Path, name: &str) -> AppResult<()> {
        let db = DatabasePool::open(root, &self.db_config).await?;
        let result = ProjectRepository::new(db.pool().clone())
            .rename(self.project_id, name, &root.to_string_lossy())
            .await;
        db.close().await;
        result
    }
}

#[async_trait]
impl Command for RenameProjectCommand {
    fn label(&self) -> String {
        format!("rename project '{}' to '{}'", self.old_name, self.new_name)
    }

    async fn apply(&mut self) -> AppResult<CommandOutcome> {
        let update = self.update_row(&self.new_root, &self.new_name);
        rename_with_rollback(&self.old_root, &self.new_root, update).await?;
        Ok(CommandOutcome::FullyReversible)
    }

    async fn revert(&mut self) -> AppResult<()> {
        let update = self.update_row(&self.old_root, &self.old_name);
        rename_with_rollback(&self.new_root, &self.old_root, update).await
    }
}

/// Rename an imported file's stored copy and its database row.
#[derive(Debug)]
pub struct RenameFileCommand {
    repo: FileRepository,
    file_id: Uuid,
    project_root: PathBuf,
    old_stored: String,
    new_stored: String,
}

impl RenameFileCommand {
    /// Capture everything needed to apply and revert the rename.
    /// `old_stored` and `new_stored` are project-relative paths.
    pub fn new(
        pool: SqlitePool,
        file_id: Uuid,
        project_root: PathBuf,
        old_stored: String,
        new_stored: String,
    ) -> Self {
        Self {
            repo: FileRepository::new(pool),
            file_id,
            project_root,
            old_stored,
            new_stored,
        }
    }
}

#[async_trait]
impl Command for RenameFileCommand {
    fn label(&self) -> String {
        format!("rename file '{}' to '{}'", self.old_stored, self.new_stored)
    }

    async fn apply(&mut self) -> AppResult<CommandOutcome> {
        let from = self.project_root.join(&self.old_stored);
        let to = self.project_root.join(&self.new_stored);
        let update = self.repo.rename_stored(self.file_id, &self.new_stored);
        rename_with_rollback(&from, &to, update).await?;
        Ok(CommandOutcome::FullyReversible)
    }

    async fn revert(&mut self) -> AppResult<()> {
        let from = self.project_root.join(&self.new_stored);
        let to = self.project_root.join(&self.old_stored);
        let update = self.repo.rename_stored(self.file_id, &self.old_stored);
        rename_with_rollback(&from, &to, update).await
    }
}
