//! Delete commands with explicit filesystem irreversibility.
//!
//! Deleting a file or project removes content from disk as a step that
//! cannot be undone. `apply` reports that through
//! [`CommandOutcome::PartiallyReversible`]; `revert` restores the
//! captured database rows and nothing else.

use std::path::PathBuf;

use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::warn;
use uuid::Uuid;

use slidehub_core::config::DatabaseConfig;
use slidehub_core::error::AppError;
use slidehub_core::result::AppResult;
use slidehub_core::types::CommandOutcome;
use slidehub_database::connection::DatabasePool;
use slidehub_database::migration;
use slidehub_database::repositories::{FileRepository, ProjectRepository};
use slidehub_entity::snapshot::{FileSnapshot, ProjectSnapshot};

use super::Command;

const FILE_DELETE_REASON: &str = "imported file and rendered assets were removed from disk";
const PROJECT_DELETE_REASON: &str =
    "project folder was removed from disk; imported files and rendered assets are not restored";

/// Delete one imported file: database rows, stored copy, and rendered
/// assets.
#[derive(Debug)]
pub struct DeleteFileCommand {
    repo: FileRepository,
    file_id: Uuid,
    project_root: PathBuf,
    snapshot: Option<FileSnapshot>,
}

impl DeleteFileCommand {
    /// Create the command; rows are captured at apply time, before any
    /// mutation.
    pub fn new(pool: SqlitePool, file_id: Uuid, project_root: PathBuf) -> Self {
        Self {
            repo: FileRepository::new(pool),
            file_id,
            project_root,
            snapshot: None,
        }
    }
}

#[async_trait]
impl Command for DeleteFileCommand {
    fn label(&self) -> String {
        format!("delete file {}", self.file_id)
    }

    async fn apply(&mut self) -> AppResult<CommandOutcome> {
        let snapshot = self.repo.snapshot(self.file_id).await?;
        let stored = self.project_root.join(&snapshot.file.stored_path);
        let assets = self.project_root.join(format!("assets/{}", self.file_id));
        self.snapshot = Some(snapshot);

        self.repo.delete(self.file_id).await?;

        if let Err(e) = tokio::fs::remove_file(&stored).await {
            warn!(path = %stored.display(), error = %e, "Could not remove stored file");
        }
        if let Err(e) = tokio::fs::remove_dir_all(&assets).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %assets.display(), error = %e, "Could not remove asset tree");
            }
        }

        Ok(CommandOutcome::partial(FILE_DELETE_REASON))
    }

    async fn revert(&mut self) -> AppResult<()> {
        let snapshot = self
            .snapshot
            .as_ref()
            .ok_or_else(|| AppError::internal("Delete command reverted before apply"))?;
        self.repo.restore(snapshot).await
    }
}

/// Delete a whole project: every database row and the project root
/// folder, including its database file.
///
/// The command opens a short-lived pool of its own so it stays
/// re-appliable after an undo recreates the database file. Revert
/// recreates the folder, reinitializes the database, and restores the
/// captured rows; the imported files and rendered assets stay deleted.
#[derive(Debug)]
pub struct DeleteProjectCommand {
    db_config: DatabaseConfig,
    project_id: Uuid,
    root: PathBuf,
    snapshot: Option<ProjectSnapshot>,
}

impl DeleteProjectCommand {
    /// Create the command; rows are captured at apply time, before any
    /// mutation. The caller closes its own pool on this project before
    /// executing.
    pub fn new(db_config: DatabaseConfig, project_id: Uuid, root: PathBuf) -> Self {
        Self {
            db_config,
            project_id,
            root,
            snapshot: None,
        }
    }
}

#[async_trait]
impl Command for DeleteProjectCommand {
    fn label(&self) -> String {
        format!("delete project {}", self.project_id)
    }

    async fn apply(&mut self) -> AppResult<CommandOutcome> {
        let db = DatabasePool::open(&self.root, &self.db_config).await?;
        let repo = ProjectRepository::new(db.pool().clone());

        // Cascade the rows out first, then drop the folder. The folder
        // removal takes the database file with it, so the pool must be
        // fully closed before the unlink.
        let result = async {
            let snapshot = repo.snapshot(self.project_id).await?;
            self.snapshot = Some(snapshot);
            repo.delete(self.project_id).await
        }
        .await;
        db.close().await;
        result?;

        tokio::fs::remove_dir_all(&self.root).await.map_err(|e| {
            AppError::with_source(
                slidehub_core::error::ErrorKind::Storage,
                format!("Failed to remove project folder {}", self.root.display()),
                e,
            )
        })?;

        Ok(CommandOutcome::partial(PROJECT_DELETE_REASON))
    }

    async fn revert(&mut self) -> AppResult<()> {
        let snapshot = self
            .snapshot
            .as_ref()
            .ok_or_else(|| AppError::internal("Delete command reverted before apply"))?;

        tokio::fs::create_dir_all(&self.root).await?;
        let db = DatabasePool::open(&self.root, &self.db_config).await?;
        migration::run_migrations(db.pool()).await?;

        let repo = ProjectRepository::new(db.pool().clone());
        let result = repo.restore(snapshot).await;
        db.close().await;
        result
    }
}
