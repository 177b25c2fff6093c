//! Assembly repository implementation.
//!
//! Every ordering mutation is persisted immediately inside its own
//! transaction; there is no pending or uncommitted ordering state.

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use slidehub_core::error::AppError;
use slidehub_core::result::AppResult;
use slidehub_entity::assembly::{Assembly, AssemblySlide};

use super::db_err;

/// One slide resolved for export: its id, the stored path of its origin
/// file, and its 1-based index within that file.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ExportSlide {
    /// The referenced slide.
    pub slide_id: Uuid,
    /// Stored path of the origin presentation.
    pub stored_path: String,
    /// 1-based slide index within the origin presentation.
    pub idx: i64,
}

/// Repository for assembly CRUD and ordering operations.
#[derive(Debug, Clone)]
pub struct AssemblyRepository {
    pool: SqlitePool,
}

impl AssemblyRepository {
    /// Create a new assembly repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new assembly.
    pub async fn create(&self, project_id: Uuid, name: &str) -> AppResult<Assembly> {
        let assembly = Assembly {
            id: Uuid::new_v4(),
            project_id,
            name: name.to_string(),
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO assemblies (id, project_id, name, created_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(assembly.id)
        .bind(assembly.project_id)
        .bind(&assembly.name)
        .bind(assembly.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| db_err("Failed to create assembly", "", e))?;

        Ok(assembly)
    }

    /// Find an assembly by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Assembly>> {
        sqlx::query_as::<_, Assembly>("SELECT * FROM assemblies WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_err("Failed to find assembly", "", e))
    }

    /// List the assemblies of a project.
    pub async fn list_by_project(&self, project_id: Uuid) -> AppResult<Vec<Assembly>> {
        sqlx::query_as::<_, Assembly>(
            "SELECT * FROM assemblies WHERE project_id = ?1 ORDER BY name ASC",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("Failed to list assemblies", "", e))
    }

    /// Update an assembly's name.
    pub async fn rename(&self, id: Uuid, name: &str) -> AppResult<()> {
        let result = sqlx::query("UPDATE assemblies SET name = ?2 WHERE id = ?1")
            .bind(id)
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| db_err("Failed to rename assembly", "", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Assembly {id} not found")));
        }
        Ok(())
    }

    /// Delete an assembly; its ordering rows cascade.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM assemblies WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_err("Failed to delete assembly", "", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Assembly {id} not found")));
        }
        Ok(())
    }

    /// List the ordering rows of an assembly by position.
    pub async fn list_slides(&self, assembly_id: Uuid) -> AppResult<Vec<AssemblySlide>> {
        sqlx::query_as::<_, AssemblySlide>(
            "SELECT * FROM assembly_slides WHERE assembly_id = ?1 ORDER BY position ASC",
        )
        .bind(assembly_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("Failed to list assembly slides", "", e))
    }

    /// The ordered slide ids of an assembly.
    pub async fn ordered_slide_ids(&self, assembly_id: Uuid) -> AppResult<Vec<Uuid>> {
        Ok(self
            .list_slides(assembly_id)
            .await?
            .into_iter()
            .map(|row| row.slide_id)
            .collect())
    }

    /// Append a slide at the end of an assembly.
    ///
    /// The next position is `MAX(position) + 1`, not the row count:
    /// cascaded slide deletions leave gaps in the position range, and a
    /// count-based append would land on a position already in use.
    pub async fn append(&self, assembly_id: Uuid, slide_id: Uuid) -> AppResult<()> {
        let next_position: i64 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM assembly_slides WHERE assembly_id = ?1",
        )
        .bind(assembly_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_err("Failed to find next assembly position", "", e))?;

        sqlx::query(
            "INSERT INTO assembly_slides (assembly_id, slide_id, position) VALUES (?1, ?2, ?3)",
        )
        .bind(assembly_id)
        .bind(slide_id)
        .bind(next_position)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            db_err(
                "Failed to append assembly slide",
                "slide already present in assembly",
                e,
            )
        })?;

        Ok(())
    }

    /// Remove a slide from an assembly and compact the remaining
    /// positions.
    pub async fn remove(&self, assembly_id: Uuid, slide_id: Uuid) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_err("Failed to begin remove", "", e))?;

        let position: Option<i64> = sqlx::query_scalar(
            "SELECT position FROM assembly_slides WHERE assembly_id = ?1 AND slide_id = ?2",
        )
        .bind(assembly_id)
        .bind(slide_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| db_err("Failed to find assembly slide", "", e))?;

        let Some(position) = position else {
            return Err(AppError::not_found(format!(
                "Slide {slide_id} not present in assembly {assembly_id}"
            )));
        };

        sqlx::query("DELETE FROM assembly_slides WHERE assembly_id = ?1 AND slide_id = ?2")
            .bind(assembly_id)
            .bind(slide_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_err("Failed to remove assembly slide", "", e))?;

        sqlx::query(
            "UPDATE assembly_slides SET position = position - 1 \
             WHERE assembly_id = ?1 AND position > ?2",
        )
        .bind(assembly_id)
        .bind(position)
        .execute(&mut *tx)
        .await
        .map_err(|e| db_err("Failed to compact assembly positions", "", e))?;

        tx.commit()
            .await
            .map_err(|e| db_err("Failed to commit remove", "", e))
    }

    /// Move the slide at `from_index` to `to_index`.
    pub async fn move_slide(
        &self,
        assembly_id: Uuid,
        from_index: usize,
        to_index: usize,
    ) -> AppResult<()> {
        let mut ids = self.ordered_slide_ids(assembly_id).await?;
        if from_index >= ids.len() || to_index >= ids.len() {
            return Err(AppError::validation(format!(
                "Move indices ({from_index}, {to_index}) out of range for assembly of {} slides",
                ids.len()
            )));
        }

        let id = ids.remove(from_index);
        ids.insert(to_index, id);
        self.set_order(assembly_id, &ids).await
    }

    /// Rewrite the full ordering of an assembly in one transaction.
    pub async fn set_order(&self, assembly_id: Uuid, ordered: &[Uuid]) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_err("Failed to begin reorder", "", e))?;

        // Delete-then-reinsert keeps position values unique while rows
        // move past each other.
        sqlx::query("DELETE FROM assembly_slides WHERE assembly_id = ?1")
            .bind(assembly_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_err("Failed to reorder assembly", "", e))?;

        for (position, slide_id) in ordered.iter().enumerate() {
            sqlx::query(
                "INSERT INTO assembly_slides (assembly_id, slide_id, position) VALUES (?1, ?2, ?3)",
            )
            .bind(assembly_id)
            .bind(slide_id)
            .bind(position as i64)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_err("Failed to reorder assembly", "", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| db_err("Failed to commit reorder", "", e))
    }

    /// Remove every slide from an assembly.
    pub async fn clear(&self, assembly_id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM assembly_slides WHERE assembly_id = ?1")
            .bind(assembly_id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_err("Failed to clear assembly", "", e))?;
        Ok(())
    }

    /// Resolve the ordered slide list to origin files and in-file
    /// indices for export.
    pub async fn resolve_for_export(&self, assembly_id: Uuid) -> AppResult<Vec<ExportSlide>> {
        sqlx::query_as::<_, ExportSlide>(
            "SELECT a.slide_id AS slide_id, f.stored_path AS stored_path, s.idx AS idx \
             FROM assembly_slides a \
             JOIN slides s ON s.id = a.slide_id \
             JOIN files f ON f.id = s.file_id \
             WHERE a.assembly_id = ?1 ORDER BY a.position ASC",
        )
        .bind(assembly_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("Failed to resolve assembly for export", "", e))
    }
}
