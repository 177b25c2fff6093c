//! One open project: pool, services, pipelines, and undoable
//! operations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use sqlx::SqlitePool;
use tokio::sync::{Mutex, broadcast};
use uuid::Uuid;

use slidehub_cache::{DecodedThumb, ThumbnailCache};
use slidehub_core::config::AppConfig;
use slidehub_core::error::AppError;
use slidehub_core::events::TaskEvent;
use slidehub_core::result::AppResult;
use slidehub_core::traits::automation::DocumentAutomation;
use slidehub_core::types::{CommandOutcome, TaskId};
use slidehub_database::connection::DatabasePool;
use slidehub_database::repositories::{ElementRepository, FileRepository, SlideRepository};
use slidehub_entity::keyword::{Keyword, KeywordCategory};
use slidehub_entity::{Assembly, AssemblySlide, Element, LibraryFile, Project, Slide};
use slidehub_service::commands::stack::UndoStack;
use slidehub_service::commands::{
    AssignKeywordCommand, Command, DeleteFileCommand, DeleteProjectCommand,
    MergeKeywordsCommand, MoveAssemblySlideCommand, RecolorKeywordCommand, RenameFileCommand,
    RenameKeywordCommand, RenameProjectCommand, UnassignKeywordCommand,
};
use slidehub_service::{
    AssemblyService, KeywordService, MergeSuggestion, ProjectService, SearchService, TagTarget,
};
use slidehub_worker::{ConversionPipeline, ExportHandle, ExportTask};

/// One open project and everything operating on it.
#[derive(Debug)]
pub struct ProjectSession {
    project: Project,
    root: PathBuf,
    db: DatabasePool,
    config: AppConfig,
    automation: Arc<dyn DocumentAutomation>,
    cache: Arc<ThumbnailCache>,
    pipeline: ConversionPipeline,
    exporter: ExportTask,
    projects: ProjectService,
    keywords: KeywordService,
    assemblies: AssemblyService,
    search: SearchService,
    files: FileRepository,
    slides: SlideRepository,
    elements: ElementRepository,
    events: broadcast::Sender<TaskEvent>,
    undo: Arc<Mutex<UndoStack>>,
}

impl ProjectSession {
    /// Wire a session from the injected process-wide pieces.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        project: Project,
        root: PathBuf,
        db: DatabasePool,
        automation: Arc<dyn DocumentAutomation>,
        cache: Arc<ThumbnailCache>,
        events: broadcast::Sender<TaskEvent>,
        undo: Arc<Mutex<UndoStack>>,
        config: AppConfig,
    ) -> Self {
        let pool = db.pool().clone();
        let pipeline = ConversionPipeline::new(
            pool.clone(),
            Arc::clone(&automation),
            events.clone(),
            config.worker.clone(),
            root.clone(),
            config.library.thumbnail_height,
        );
        let exporter = ExportTask::new(
            pool.clone(),
            Arc::clone(&automation),
            events.clone(),
            root.clone(),
        );

        Self {
            project,
            root,
            db,
            config,
            automation,
            cache,
            pipeline,
            exporter,
            projects: ProjectService::new(pool.clone()),
            keywords: KeywordService::new(pool.clone()),
            assemblies: AssemblyService::new(pool.clone()),
            search: SearchService::new(pool.clone()),
            files: FileRepository::new(pool.clone()),
            slides: SlideRepository::new(pool.clone()),
            elements: ElementRepository::new(pool),
            events,
            undo,
        }
    }

    /// The open project row as of the last refresh.
    pub fn project(&self) -> &Project {
        &self.project
    }

    /// The project root folder.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The underlying pool (tests and diagnostics).
    pub fn pool(&self) -> &SqlitePool {
        self.db.pool()
    }

    /// Re-read the project row after an undo/redo that may have renamed
    /// or moved it, rewiring the pool if the root folder changed.
    pub async fn refresh(&mut self) -> AppResult<()> {
        let project = self.projects.get(self.project.id).await?;
        self.rewire(project).await
    }

    /// Close this session's pool.
    pub(crate) async fn shutdown(&self) {
        self.db.close().await;
    }

    // ── Files and conversion ─────────────────────────────────────

    /// Import a presentation: copy it under the project root with a
    /// sanitized name and insert a Pending record. Conversion is
    /// triggered separately.
    pub async fn import_file(&self, source: &Path) -> AppResult<LibraryFile> {
        let name = source
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| AppError::validation("Import path has no file name"))?;
        let sanitized = ProjectService::sanitize_name(name);

        tokio::fs::create_dir_all(self.root.join("imports")).await?;
        let stored_rel = self.unique_import_path(&sanitized);
        tokio::fs::copy(source, self.root.join(&stored_rel)).await?;

        self.files
            .insert(
                self.project.id,
                &source.to_string_lossy(),
                &stored_rel,
            )
            .await
    }

    /// Convert every Pending or Failed file of the project. Returns the
    /// task id; progress arrives on the library event channel. Failed
    /// files are retried by calling this again.
    pub async fn convert(&self) -> AppResult<TaskId> {
        self.pipeline.convert_project(&self.project).await
    }

    /// List the project's files.
    pub async fn files(&self) -> AppResult<Vec<LibraryFile>> {
        self.files.list_by_project(self.project.id).await
    }

    /// Find one file.
    pub async fn file(&self, file_id: Uuid) -> AppResult<LibraryFile> {
        self.files
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))
    }

    /// List a file's slides in ascending index order.
    pub async fn slides_of(&self, file_id: Uuid) -> AppResult<Vec<Slide>> {
        self.slides.list_by_file(file_id).await
    }

    /// Find one slide.
    pub async fn slide(&self, slide_id: Uuid) -> AppResult<Slide> {
        self.slides
            .find_by_id(slide_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Slide {slide_id} not found")))
    }

    /// List a slide's elements.
    pub async fn elements_of(&self, slide_id: Uuid) -> AppResult<Vec<Element>> {
        self.elements.list_by_slide(slide_id).await
    }

    /// Update a slide's opaque annotation fields.
    pub async fn annotate_slide(
        &self,
        slide_id: Uuid,
        topic: Option<&str>,
        slide_kind: Option<&str>,
        insight: Option<&str>,
    ) -> AppResult<()> {
        self.slides
            .update_annotations(slide_id, topic, slide_kind, insight)
            .await
    }

    /// The decoded thumbnail for a slide, served from the bounded
    /// cache.
    pub async fn thumbnail(&self, slide_id: Uuid) -> AppResult<Arc<DecodedThumb>> {
        let slide = self.slide(slide_id).await?;
        self.cache.get(slide.id, &self.root, &slide.thumb_path).await
    }

    // ── Search ───────────────────────────────────────────────────

    /// Case-insensitive substring search over the project's keywords.
    pub async fn search_keywords(
        &self,
        term: &str,
        category: Option<KeywordCategory>,
    ) -> AppResult<Vec<Keyword>> {
        self.search
            .keywords(term, category, Some(self.project.id))
            .await
    }

    /// Case-insensitive substring search over slide title/body/notes.
    pub async fn search_slides(&self, term: &str) -> AppResult<Vec<Slide>> {
        self.search.slides(term, Some(self.project.id)).await
    }

    // ── Keywords ─────────────────────────────────────────────────

    /// List the project's keywords.
    pub async fn keywords(&self) -> AppResult<Vec<Keyword>> {
        self.keywords.list(self.project.id).await
    }

    /// The keywords assigned to a slide.
    pub async fn keywords_for_slide(&self, slide_id: Uuid) -> AppResult<Vec<Keyword>> {
        self.keywords.keywords_for_slide(slide_id).await
    }

    /// The slides a keyword is assigned to.
    pub async fn slides_for_keyword(&self, keyword_id: Uuid) -> AppResult<Vec<Uuid>> {
        self.keywords.slides_for_keyword(keyword_id).await
    }

    /// Propose near-duplicate keyword pairs above the similarity
    /// threshold for user confirmation.
    pub async fn suggest_merges(&self, threshold: f64) -> AppResult<Vec<MergeSuggestion>> {
        self.keywords.suggest_merges(self.project.id, threshold).await
    }

    /// Assign a keyword (created on first use) to a slide or element.
    /// Undoable; assigning an already-present keyword is a no-op.
    pub async fn assign_keyword(
        &self,
        target: TagTarget,
        text: &str,
        category: KeywordCategory,
    ) -> AppResult<CommandOutcome> {
        self.execute(Box::new(AssignKeywordCommand::new(
            self.pool().clone(),
            self.project.id,
            target,
            text.to_string(),
            category,
        )))
        .await
    }

    /// Remove a keyword association. Undoable.
    pub async fn unassign_keyword(
        &self,
        target: TagTarget,
        keyword_id: Uuid,
    ) -> AppResult<CommandOutcome> {
        self.execute(Box::new(UnassignKeywordCommand::new(
            self.pool().clone(),
            target,
            keyword_id,
        )))
        .await
    }

    /// Rename a keyword across the whole label set. Undoable.
    pub async fn rename_keyword(
        &self,
        keyword_id: Uuid,
        new_text: &str,
    ) -> AppResult<CommandOutcome> {
        self.execute(Box::new(RenameKeywordCommand::new(
            self.pool().clone(),
            keyword_id,
            new_text.to_string(),
        )))
        .await
    }

    /// Change a keyword's display color. Undoable.
    pub async fn recolor_keyword(
        &self,
        keyword_id: Uuid,
        color: &str,
    ) -> AppResult<CommandOutcome> {
        self.execute(Box::new(RecolorKeywordCommand::new(
            self.pool().clone(),
            keyword_id,
            color.to_string(),
        )))
        .await
    }

    /// Merge source keywords into a destination. Undoable; partial
    /// merges are never observable.
    pub async fn merge_keywords(
        &self,
        source_ids: Vec<Uuid>,
        dest_id: Uuid,
    ) -> AppResult<CommandOutcome> {
        self.execute(Box::new(MergeKeywordsCommand::new(
            self.pool().clone(),
            source_ids,
            dest_id,
        )))
        .await
    }

    // ── Renames and deletes ──────────────────────────────────────

    /// Rename the project: folder on disk and database row. Undoable;
    /// the folder rename is rolled back if the row update fails.
    pub async fn rename_project(&mut self, new_name: &str) -> AppResult<CommandOutcome> {
        ProjectService::validate_name(new_name)?;

        let new_root = self
            .root
            .parent()
            .map(|p| p.join(ProjectService::sanitize_name(new_name)))
            .ok_or_else(|| AppError::storage("Project root has no parent folder"))?;
        if new_root.exists() {
            return Err(AppError::conflict(format!(
                "Project folder {} already exists",
                new_root.display()
            )));
        }

        let outcome = self
            .execute(Box::new(RenameProjectCommand::new(
                self.config.database.clone(),
                self.project.id,
                self.project.name.clone(),
                new_name.to_string(),
                self.root.clone(),
                new_root.clone(),
            )))
            .await?;

        let mut project = self.project.clone();
        project.name = new_name.to_string();
        project.root_path = new_root.to_string_lossy().into_owned();
        self.rewire(project).await?;
        Ok(outcome)
    }

    /// Rename an imported file's stored copy. Undoable.
    pub async fn rename_file(&self, file_id: Uuid, new_name: &str) -> AppResult<CommandOutcome> {
        ProjectService::validate_name(new_name)?;
        let file = self.file(file_id).await?;

        let new_stored = format!("imports/{}", ProjectService::sanitize_name(new_name));
        if self.root.join(&new_stored).exists() {
            return Err(AppError::conflict(format!(
                "A file named {new_stored} already exists"
            )));
        }

        self.execute(Box::new(RenameFileCommand::new(
            self.pool().clone(),
            file_id,
            self.root.clone(),
            file.stored_path,
            new_stored,
        )))
        .await
    }

    /// Delete an imported file: rows, stored copy, and rendered assets.
    /// Undo restores the rows only; the outcome names the filesystem
    /// side effect.
    pub async fn delete_file(&self, file_id: Uuid) -> AppResult<CommandOutcome> {
        self.execute(Box::new(DeleteFileCommand::new(
            self.pool().clone(),
            file_id,
            self.root.clone(),
        )))
        .await
    }

    /// Delete the whole project, consuming the session. Undo restores
    /// the database rows into a fresh database file; imported files and
    /// assets stay deleted.
    pub async fn delete_project(self) -> AppResult<CommandOutcome> {
        // This session's pool holds the database file that is about to
        // be unlinked with the folder.
        self.db.close().await;
        let outcome = self
            .execute(Box::new(DeleteProjectCommand::new(
                self.config.database.clone(),
                self.project.id,
                self.root.clone(),
            )))
            .await?;
        self.cache.invalidate_all().await;
        Ok(outcome)
    }

    // ── Assemblies and export ────────────────────────────────────

    /// Create a named assembly.
    pub async fn create_assembly(&self, name: &str) -> AppResult<Assembly> {
        self.assemblies.create(self.project.id, name).await
    }

    /// List the project's assemblies.
    pub async fn assemblies(&self) -> AppResult<Vec<Assembly>> {
        self.assemblies.list(self.project.id).await
    }

    /// The ordered slide references of an assembly.
    pub async fn assembly_slides(&self, assembly_id: Uuid) -> AppResult<Vec<AssemblySlide>> {
        self.assemblies.slides(assembly_id).await
    }

    /// Append a slide to an assembly; persisted immediately.
    pub async fn append_to_assembly(&self, assembly_id: Uuid, slide_id: Uuid) -> AppResult<()> {
        self.assemblies.append(assembly_id, slide_id).await
    }

    /// Remove a slide from an assembly; persisted immediately.
    pub async fn remove_from_assembly(
        &self,
        assembly_id: Uuid,
        slide_id: Uuid,
    ) -> AppResult<()> {
        self.assemblies.remove(assembly_id, slide_id).await
    }

    /// Remove every slide from an assembly; persisted immediately.
    pub async fn clear_assembly(&self, assembly_id: Uuid) -> AppResult<()> {
        self.assemblies.clear(assembly_id).await
    }

    /// Move a slide within an assembly's ordering. Undoable; persisted
    /// immediately.
    pub async fn move_assembly_slide(
        &self,
        assembly_id: Uuid,
        from_index: usize,
        to_index: usize,
    ) -> AppResult<CommandOutcome> {
        self.execute(Box::new(MoveAssemblySlideCommand::new(
            self.pool().clone(),
            assembly_id,
            from_index,
            to_index,
        )))
        .await
    }

    /// Export an assembly to `out_path` as a cancellable background
    /// task. One progress event is emitted per slide placed.
    pub async fn export(&self, assembly_id: Uuid, out_path: PathBuf) -> AppResult<ExportHandle> {
        let assembly = self.assemblies.get(assembly_id).await?;
        Ok(self.exporter.start(assembly, out_path))
    }

    /// Open an exported document in the configured viewer.
    pub async fn open_in_viewer(&self, path: &Path) -> AppResult<()> {
        let handle = self.automation.open(path).await?;
        self.automation.open_in_viewer(&handle).await?;
        self.automation.close(handle).await
    }

    // ── Internals ────────────────────────────────────────────────

    async fn execute(&self, command: Box<dyn Command>) -> AppResult<CommandOutcome> {
        let mut stack = self.undo.try_lock().map_err(|_| {
            AppError::conflict("Undo stack is busy; commands are issued one at a time")
        })?;
        stack.execute(command).await
    }

    /// Rewire the session onto a (possibly moved) project row. A root
    /// change reopens the pool at the new location, since the database
    /// file moved with the folder.
    async fn rewire(&mut self, project: Project) -> AppResult<()> {
        let root = PathBuf::from(&project.root_path);
        if root == self.root {
            self.project = project;
            return Ok(());
        }

        let db = DatabasePool::open(&root, &self.config.database).await?;
        self.db.close().await;
        *self = Self::new(
            project,
            root,
            db,
            Arc::clone(&self.automation),
            Arc::clone(&self.cache),
            self.events.clone(),
            Arc::clone(&self.undo),
            self.config.clone(),
        );
        Ok(())
    }

    fn unique_import_path(&self, sanitized: &str) -> String {
        let candidate = format!("imports/{sanitized}");
        if !self.root.join(&candidate).exists() {
            return candidate;
        }

        let (stem, ext) = match sanitized.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem.to_string(), Some(ext.to_string())),
            _ => (sanitized.to_string(), None),
        };

        for n in 1..u32::MAX {
            let name = match &ext {
                Some(ext) => format!("imports/{stem} ({n}).{ext}"),
                None => format!("imports/{stem} ({n})"),
            };
            if !self.root.join(&name).exists() {
                return name;
            }
        }
        candidate
    }
}
