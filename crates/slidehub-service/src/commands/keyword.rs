//! Keyword commands: assign, unassign, rename, recolor, merge.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use slidehub_core::error::AppError;
use slidehub_core::result::AppResult;
use slidehub_core::types::CommandOutcome;
use slidehub_database::repositories::KeywordRepository;
use slidehub_entity::keyword::KeywordCategory;
use slidehub_entity::snapshot::KeywordSnapshot;

use super::Command;
use crate::keyword::TagTarget;
use crate::project::ProjectService;

/// Assign a keyword to a slide or element, creating the keyword on
/// first use.
///
/// Assigning an already-present keyword is a no-op, not an error;
/// revert removes only what apply actually added.
#[derive(Debug)]
pub struct AssignKeywordCommand {
    repo: KeywordRepository,
    project_id: Uuid,
    target: TagTarget,
    text: String,
    category: KeywordCategory,
    keyword_id: Option<Uuid>,
    created: bool,
    edge_added: bool,
}

impl AssignKeywordCommand {
    /// Create the command.
    pub fn new(
        pool: SqlitePool,
        project_id: Uuid,
        target: TagTarget,
        text: String,
        category: KeywordCategory,
    ) -> Self {
        Self {
            repo: KeywordRepository::new(pool),
            project_id,
            target,
            text,
            category,
            keyword_id: None,
            created: false,
            edge_added: false,
        }
    }
}

#[async_trait]
impl Command for AssignKeywordCommand {
    fn label(&self) -> String {
        format!("assign keyword '{}'", self.text)
    }

    async fn apply(&mut self) -> AppResult<CommandOutcome> {
        ProjectService::validate_name(&self.text)?;

        let keyword = match self.repo.find_by_text(self.project_id, &self.text).await? {
            Some(existing) => existing,
            None => {
                let created = self
                    .repo
                    .create(
                        self.project_id,
                        &self.text,
                        self.category,
                        self.category.default_color(),
                    )
                    .await?;
                self.created = true;
                created
            }
        };
        self.keyword_id = Some(keyword.id);

        self.edge_added = match self.target {
            TagTarget::Slide(slide_id) => self.repo.assign_slide(slide_id, keyword.id).await?,
            TagTarget::Element(element_id) => {
                self.repo.assign_element(element_id, keyword.id).await?
            }
        };

        Ok(CommandOutcome::FullyReversible)
    }

    async fn revert(&mut self) -> AppResult<()> {
        let keyword_id = self
            .keyword_id
            .ok_or_else(|| AppError::internal("Assign command reverted before apply"))?;

        if self.edge_added {
            match self.target {
                TagTarget::Slide(slide_id) => {
                    self.repo.unassign_slide(slide_id, keyword_id).await?;
                }
                TagTarget::Element(element_id) => {
                    self.repo.unassign_element(element_id, keyword_id).await?;
                }
            }
        }
        if self.created {
            self.repo.delete(keyword_id).await?;
        }
        Ok(())
    }
}

/// Remove a keyword association edge.
#[derive(Debug)]
pub struct UnassignKeywordCommand {
    repo: KeywordRepository,
    target: TagTarget,
    keyword_id: Uuid,
    removed: bool,
}

impl UnassignKeywordCommand {
    /// Create the command.
    pub fn new(pool: SqlitePool, target: TagTarget, keyword_id: Uuid) -> Self {
        Self {
            repo: KeywordRepository::new(pool),
            target,
            keyword_id,
            removed: false,
        }
    }
}

#[async_trait]
impl Command for UnassignKeywordCommand {
    fn label(&self) -> String {
        format!("unassign keyword {}", self.keyword_id)
    }

    async fn apply(&mut self) -> AppResult<CommandOutcome> {
        self.removed = match self.target {
            TagTarget::Slide(slide_id) => {
                self.repo.unassign_slide(slide_id, self.keyword_id).await?
            }
            TagTarget::Element(element_id) => {
                self.repo
                    .unassign_element(element_id, self.keyword_id)
                    .await?
            }
        };
        Ok(CommandOutcome::FullyReversible)
    }

    async fn revert(&mut self) -> AppResult<()> {
        if self.removed {
            match self.target {
                TagTarget::Slide(slide_id) => {
                    self.repo.assign_slide(slide_id, self.keyword_id).await?;
                }
                TagTarget::Element(element_id) => {
                    self.repo.assign_element(element_id, self.keyword_id).await?;
                }
            }
        }
        Ok(())
    }
}

/// Rename a keyword across the whole label set.
#[derive(Debug)]
pub struct RenameKeywordCommand {
    repo: KeywordRepository,
    keyword_id: Uuid,
    new_text: String,
    old_text: Option<String>,
}

impl RenameKeywordCommand {
    /// Create the command.
    pub fn new(pool: SqlitePool, keyword_id: Uuid, new_text: String) -> Self {
        Self {
            repo: KeywordRepository::new(pool),
            keyword_id,
            new_text,
            old_text: None,
        }
    }
}

#[async_trait]
impl Command for RenameKeywordCommand {
    fn label(&self) -> String {
        format!("rename keyword to '{}'", self.new_text)
    }

    async fn apply(&mut self) -> AppResult<CommandOutcome> {
        ProjectService::validate_name(&self.new_text)?;

        let current = self
            .repo
            .find_by_id(self.keyword_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Keyword {} not found", self.keyword_id)))?;
        self.old_text = Some(current.text);

        self.repo.rename(self.keyword_id, &self.new_text).await?;
        Ok(CommandOutcome::FullyReversible)
    }

    async fn revert(&mut self) -> AppResult<()> {
        let old_text = self
            .old_text
            .as_ref()
            .ok_or_else(|| AppError::internal("Rename command reverted before apply"))?;
        self.repo.rename(self.keyword_id, old_text).await
    }
}

/// Change a keyword's display color.
#[derive(Debug)]
pub struct RecolorKeywordCommand {
    repo: KeywordRepository,
    keyword_id: Uuid,
    new_color: String,
    old_color: Option<String>,
}

impl RecolorKeywordCommand {
    /// Create the command.
    pub fn new(pool: SqlitePool, keyword_id: Uuid, new_color: String) -> Self {
        Self {
            repo: KeywordRepository::new(pool),
            keyword_id,
            new_color,
            old_color: None,
        }
    }
}

#[async_trait]
impl Command for RecolorKeywordCommand {
    fn label(&self) -> String {
        format!("recolor keyword {}", self.keyword_id)
    }

    async fn apply(&mut self) -> AppResult<CommandOutcome> {
        let current = self
            .repo
            .find_by_id(self.keyword_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Keyword {} not found", self.keyword_id)))?;
        self.old_color = Some(current.color);

        self.repo.recolor(self.keyword_id, &self.new_color).await?;
        Ok(CommandOutcome::FullyReversible)
    }

    async fn revert(&mut self) -> AppResult<()> {
        let old_color = self
            .old_color
            .as_ref()
            .ok_or_else(|| AppError::internal("Recolor command reverted before apply"))?;
        self.repo.recolor(self.keyword_id, old_color).await
    }
}

/// Merge source keywords into a destination keyword.
#[derive(Debug)]
pub struct MergeKeywordsCommand {
    repo: KeywordRepository,
    source_ids: Vec<Uuid>,
    dest_id: Uuid,
    dest_snapshot: Option<KeywordSnapshot>,
    source_snapshots: Vec<KeywordSnapshot>,
}

impl MergeKeywordsCommand {
    /// Create the command.
    pub fn new(pool: SqlitePool, source_ids: Vec<Uuid>, dest_id: Uuid) -> Self {
        Self {
            repo: KeywordRepository::new(pool),
            source_ids,
            dest_id,
            dest_snapshot: None,
            source_snapshots: Vec::new(),
        }
    }
}

#[async_trait]
impl Command for MergeKeywordsCommand {
    fn label(&self) -> String {
        format!(
            "merge {} keywords into {}",
            self.source_ids.len(),
            self.dest_id
        )
    }

    async fn apply(&mut self) -> AppResult<CommandOutcome> {
        if self.source_ids.iter().any(|id| *id == self.dest_id) {
            return Err(AppError::validation(
                "Merge destination cannot be one of the sources",
            ));
        }

        self.dest_snapshot = Some(self.repo.snapshot(self.dest_id).await?);
        self.source_snapshots.clear();
        for source_id in &self.source_ids {
            self.source_snapshots
                .push(self.repo.snapshot(*source_id).await?);
        }

        self.repo.merge(&self.source_ids, self.dest_id).await?;
        Ok(CommandOutcome::FullyReversible)
    }

    async fn revert(&mut self) -> AppResult<()> {
        let dest = self
            .dest_snapshot
            .as_ref()
            .ok_or_else(|| AppError::internal("Merge command reverted before apply"))?;
        self.repo.restore_merge(dest, &self.source_snapshots).await
    }
}
