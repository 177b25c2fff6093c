//! Assembly reorder command.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use slidehub_core::error::AppError;
use slidehub_core::result::AppResult;
use slidehub_core::types::CommandOutcome;
use slidehub_database::repositories::AssemblyRepository;

use super::Command;

/// Move a slide within an assembly's ordering.
///
/// Captures the complete previous ordering so revert rewrites it
/// verbatim instead of computing an inverse move.
#[derive(Debug)]
pub struct MoveAssemblySlideCommand {
    repo: AssemblyRepository,
    assembly_id: Uuid,
    from_index: usize,
    to_index: usize,
    previous_order: Option<Vec<Uuid>>,
}

impl MoveAssemblySlideCommand {
    /// Create the command.
    pub fn new(pool: SqlitePool, assembly_id: Uuid, from_index: usize, to_index: usize) -> Self {
        Self {
            repo: AssemblyRepository::new(pool),
            assembly_id,
            from_index,
            to_index,
            previous_order: None,
        }
    }
}

#[async_trait]
impl Command for MoveAssemblySlideCommand {
    fn label(&self) -> String {
        format!(
            "move assembly slide {} -> {}",
            self.from_index, self.to_index
        )
    }

    async fn apply(&mut self) -> AppResult<CommandOutcome> {
        self.previous_order = Some(self.repo.ordered_slide_ids(self.assembly_id).await?);
        self.repo
            .move_slide(self.assembly_id, self.from_index, self.to_index)
            .await?;
        Ok(CommandOutcome::FullyReversible)
    }

    async fn revert(&mut self) -> AppResult<()> {
        let previous = self
            .previous_order
            .as_ref()
            .ok_or_else(|| AppError::internal("Reorder command reverted before apply"))?;
        self.repo.set_order(self.assembly_id, previous).await
    }
}
