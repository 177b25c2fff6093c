//! Element repository implementation.

use sqlx::SqlitePool;
use uuid::Uuid;

use slidehub_core::result::AppResult;
use slidehub_entity::element::Element;

use super::db_err;

/// Repository for element queries.
#[derive(Debug, Clone)]
pub struct ElementRepository {
    pool: SqlitePool,
}

impl ElementRepository {
    /// Create a new element repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find an element by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Element>> {
        sqlx::query_as::<_, Element>("SELECT * FROM elements WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_err("Failed to find element", "", e))
    }

    /// List the elements of a slide.
    pub async fn list_by_slide(&self, slide_id: Uuid) -> AppResult<Vec<Element>> {
        sqlx::query_as::<_, Element>("SELECT * FROM elements WHERE slide_id = ?1")
            .bind(slide_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_err("Failed to list elements", "", e))
    }
}
