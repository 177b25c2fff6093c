//! Process-wide library handle.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::{Mutex, broadcast};
use tracing::info;

use slidehub_cache::ThumbnailCache;
use slidehub_core::config::AppConfig;
use slidehub_core::error::AppError;
use slidehub_core::events::TaskEvent;
use slidehub_core::result::AppResult;
use slidehub_core::traits::automation::DocumentAutomation;
use slidehub_database::connection::DatabasePool;
use slidehub_database::migration;
use slidehub_database::repositories::ProjectRepository;
use slidehub_service::commands::stack::UndoStack;
use slidehub_service::ProjectService;

use crate::session::ProjectSession;

/// The process-wide core: configuration, automation adapter, thumbnail
/// cache, task event channel, and the single undo/redo stack.
///
/// All of these are explicitly constructed here and injected into
/// sessions and commands, so tests can substitute fakes.
#[derive(Debug)]
pub struct Library {
    config: AppConfig,
    automation: Arc<dyn DocumentAutomation>,
    cache: Arc<ThumbnailCache>,
    events: broadcast::Sender<TaskEvent>,
    undo: Arc<Mutex<UndoStack>>,
}

impl Library {
    /// Create the library with the given automation adapter.
    pub fn new(config: AppConfig, automation: Arc<dyn DocumentAutomation>) -> Self {
        let (events, _) = broadcast::channel(config.worker.event_capacity.max(1));
        let cache = Arc::new(ThumbnailCache::new(&config.cache));

        Self {
            config,
            automation,
            cache,
            events,
            undo: Arc::new(Mutex::new(UndoStack::new())),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The process-wide thumbnail cache.
    pub fn cache(&self) -> Arc<ThumbnailCache> {
        Arc::clone(&self.cache)
    }

    /// Subscribe to progress/completion/error events from background
    /// tasks, keyed by task id.
    pub fn subscribe(&self) -> broadcast::Receiver<TaskEvent> {
        self.events.subscribe()
    }

    /// Create a new project: its root folder on disk, its database
    /// file, and its project row. Returns an open session.
    pub async fn create_project(&self, name: &str) -> AppResult<ProjectSession> {
        ProjectService::validate_name(name)?;

        let folder = ProjectService::sanitize_name(name);
        let root = Path::new(&self.config.library.projects_dir).join(folder);
        if root.exists() {
            return Err(AppError::conflict(format!(
                "Project folder {} already exists",
                root.display()
            )));
        }
        tokio::fs::create_dir_all(&root).await?;

        let db = DatabasePool::open(&root, &self.config.database).await?;
        migration::run_migrations(db.pool()).await?;

        let project = ProjectService::new(db.pool().clone())
            .create(name, &root.to_string_lossy())
            .await?;
        info!(project = %project.name, root = %root.display(), "Created project");

        Ok(self.session(project, root, db))
    }

    /// Open an existing project from its root folder.
    pub async fn open_project(&self, root: &Path) -> AppResult<ProjectSession> {
        let db = DatabasePool::open(root, &self.config.database).await?;
        migration::run_migrations(db.pool()).await?;

        let project = ProjectRepository::new(db.pool().clone())
            .list()
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                AppError::not_found(format!(
                    "No project record found in {}",
                    root.display()
                ))
            })?;
        info!(project = %project.name, root = %root.display(), "Opened project");

        Ok(self.session(project, root.to_path_buf(), db))
    }

    /// Close a project session: shut its pool down and invalidate the
    /// thumbnail cache.
    pub async fn close_project(&self, session: ProjectSession) {
        session.shutdown().await;
        self.cache.invalidate_all().await;
    }

    /// Revert the most recent command. Returns its label, or `None`
    /// with nothing to undo.
    ///
    /// Rejected with a conflict error when another mutation holds the
    /// stack; the stack is only ever driven from the control context.
    pub async fn undo(&self) -> AppResult<Option<String>> {
        let mut stack = self.try_lock_undo()?;
        stack.undo().await
    }

    /// Re-apply the most recently undone command.
    pub async fn redo(&self) -> AppResult<Option<(String, slidehub_core::types::CommandOutcome)>> {
        let mut stack = self.try_lock_undo()?;
        stack.redo().await
    }

    /// Whether there is anything to undo.
    pub async fn can_undo(&self) -> bool {
        self.undo.lock().await.can_undo()
    }

    /// Whether there is anything to redo.
    pub async fn can_redo(&self) -> bool {
        self.undo.lock().await.can_redo()
    }

    fn try_lock_undo(&self) -> AppResult<tokio::sync::MutexGuard<'_, UndoStack>> {
        self.undo.try_lock().map_err(|_| {
            AppError::conflict("Undo stack is busy; commands are issued one at a time")
        })
    }

    fn session(
        &self,
        project: slidehub_entity::Project,
        root: std::path::PathBuf,
        db: DatabasePool,
    ) -> ProjectSession {
        ProjectSession::new(
            project,
            root,
            db,
            Arc::clone(&self.automation),
            Arc::clone(&self.cache),
            self.events.clone(),
            Arc::clone(&self.undo),
            self.config.clone(),
        )
    }
}
