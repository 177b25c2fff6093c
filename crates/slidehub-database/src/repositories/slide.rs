//! Slide repository implementation.

use sqlx::SqlitePool;
use uuid::Uuid;

use slidehub_core::error::AppError;
use slidehub_core::result::AppResult;
use slidehub_entity::slide::Slide;

use super::db_err;

/// Repository for slide queries and annotation updates.
///
/// Slide rows are written only by the conversion pipeline (through its
/// task-scoped connection); this repository serves reads and the opaque
/// annotation fields.
#[derive(Debug, Clone)]
pub struct SlideRepository {
    pool: SqlitePool,
}

impl SlideRepository {
    /// Create a new slide repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a slide by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Slide>> {
        sqlx::query_as::<_, Slide>("SELECT * FROM slides WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_err("Failed to find slide", "", e))
    }

    /// List the slides of a file in ascending index order.
    pub async fn list_by_file(&self, file_id: Uuid) -> AppResult<Vec<Slide>> {
        sqlx::query_as::<_, Slide>("SELECT * FROM slides WHERE file_id = ?1 ORDER BY idx ASC")
            .bind(file_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_err("Failed to list slides", "", e))
    }

    /// Resolve a slide to its origin file's stored path and in-file index.
    pub async fn find_origin(&self, id: Uuid) -> AppResult<Option<(String, i64)>> {
        sqlx::query_as(
            "SELECT f.stored_path, s.idx FROM slides s \
             JOIN files f ON f.id = s.file_id WHERE s.id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("Failed to resolve slide origin", "", e))
    }

    /// Update the opaque annotation fields of a slide.
    pub async fn update_annotations(
        &self,
        id: Uuid,
        topic: Option<&str>,
        slide_kind: Option<&str>,
        insight: Option<&str>,
    ) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE slides SET topic = ?2, slide_kind = ?3, insight = ?4 WHERE id = ?1",
        )
        .bind(id)
        .bind(topic)
        .bind(slide_kind)
        .bind(insight)
        .execute(&self.pool)
        .await
        .map_err(|e| db_err("Failed to update slide annotations", "", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Slide {id} not found")));
        }
        Ok(())
    }
}
