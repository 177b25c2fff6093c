//! Assembly service: named ordered slide lists.
//!
//! Every mutation is persisted immediately by the repository; reorder
//! goes through the command layer so it lands on the undo stack.

use sqlx::SqlitePool;
use uuid::Uuid;

use slidehub_core::error::AppError;
use slidehub_core::result::AppResult;
use slidehub_database::repositories::AssemblyRepository;
use slidehub_entity::assembly::{Assembly, AssemblySlide};

use crate::project::ProjectService;

/// Handles assembly CRUD and ordering.
#[derive(Debug, Clone)]
pub struct AssemblyService {
    repo: AssemblyRepository,
}

impl AssemblyService {
    /// Create a new assembly service.
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            repo: AssemblyRepository::new(pool),
        }
    }

    /// Create a named assembly in a project.
    pub async fn create(&self, project_id: Uuid, name: &str) -> AppResult<Assembly> {
        ProjectService::validate_name(name)?;
        self.repo.create(project_id, name).await
    }

    /// Find an assembly by ID.
    pub async fn get(&self, id: Uuid) -> AppResult<Assembly> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Assembly {id} not found")))
    }

    /// List the assemblies of a project.
    pub async fn list(&self, project_id: Uuid) -> AppResult<Vec<Assembly>> {
        self.repo.list_by_project(project_id).await
    }

    /// Rename an assembly.
    pub async fn rename(&self, id: Uuid, name: &str) -> AppResult<()> {
        ProjectService::validate_name(name)?;
        self.repo.rename(id, name).await
    }

    /// Delete an assembly.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.repo.delete(id).await
    }

    /// The ordered slide references of an assembly.
    pub async fn slides(&self, id: Uuid) -> AppResult<Vec<AssemblySlide>> {
        self.repo.list_slides(id).await
    }

    /// Append a slide at the end of an assembly.
    pub async fn append(&self, id: Uuid, slide_id: Uuid) -> AppResult<()> {
        self.repo.append(id, slide_id).await
    }

    /// Remove a slide from an assembly.
    pub async fn remove(&self, id: Uuid, slide_id: Uuid) -> AppResult<()> {
        self.repo.remove(id, slide_id).await
    }

    /// Remove every slide from an assembly.
    pub async fn clear(&self, id: Uuid) -> AppResult<()> {
        self.repo.clear(id).await
    }
}
