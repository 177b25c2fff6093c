//! Keyword repository implementation.

use sqlx::SqlitePool;
use uuid::Uuid;

use slidehub_core::error::AppError;
use slidehub_core::result::AppResult;
use slidehub_entity::keyword::{Keyword, KeywordCategory};
use slidehub_entity::snapshot::KeywordSnapshot;

use super::db_err;

/// Repository for keyword CRUD, association edges, and merges.
#[derive(Debug, Clone)]
pub struct KeywordRepository {
    pool: SqlitePool,
}

impl KeywordRepository {
    /// Create a new keyword repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new keyword.
    pub async fn create(
        &self,
        project_id: Uuid,
        text: &str,
        category: KeywordCategory,
        color: &str,
    ) -> AppResult<Keyword> {
        let keyword = Keyword {
            id: Uuid::new_v4(),
            project_id,
            text: text.to_string(),
            category,
            color: color.to_string(),
        };

        sqlx::query(
            "INSERT INTO keywords (id, project_id, text, category, color) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(keyword.id)
        .bind(keyword.project_id)
        .bind(&keyword.text)
        .bind(keyword.category)
        .bind(&keyword.color)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            db_err(
                "Failed to create keyword",
                "(project_id, text) must be unique",
                e,
            )
        })?;

        Ok(keyword)
    }

    /// Find a keyword by project and exact text.
    pub async fn find_by_text(&self, project_id: Uuid, text: &str) -> AppResult<Option<Keyword>> {
        sqlx::query_as::<_, Keyword>(
            "SELECT * FROM keywords WHERE project_id = ?1 AND text = ?2",
        )
        .bind(project_id)
        .bind(text)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("Failed to find keyword", "", e))
    }

    /// Find a keyword by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Keyword>> {
        sqlx::query_as::<_, Keyword>("SELECT * FROM keywords WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_err("Failed to find keyword", "", e))
    }

    /// List all keywords of a project.
    pub async fn list_by_project(&self, project_id: Uuid) -> AppResult<Vec<Keyword>> {
        sqlx::query_as::<_, Keyword>(
            "SELECT * FROM keywords WHERE project_id = ?1 ORDER BY text ASC",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("Failed to list keywords", "", e))
    }

    /// Update a keyword's text.
    pub async fn rename(&self, id: Uuid, text: &str) -> AppResult<()> {
        let result = sqlx::query("UPDATE keywords SET text = ?2 WHERE id = ?1")
            .bind(id)
            .bind(text)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                db_err(
                    "Failed to rename keyword",
                    "(project_id, text) must be unique",
                    e,
                )
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Keyword {id} not found")));
        }
        Ok(())
    }

    /// Update a keyword's display color.
    pub async fn recolor(&self, id: Uuid, color: &str) -> AppResult<()> {
        let result = sqlx::query("UPDATE keywords SET color = ?2 WHERE id = ?1")
            .bind(id)
            .bind(color)
            .execute(&self.pool)
            .await
            .map_err(|e| db_err("Failed to recolor keyword", "", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Keyword {id} not found")));
        }
        Ok(())
    }

    /// Delete a keyword; association edges cascade.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM keywords WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_err("Failed to delete keyword", "", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Keyword {id} not found")));
        }
        Ok(())
    }

    /// Associate a keyword with a slide. Returns `false` when the edge
    /// already existed (assignment is idempotent, not an error).
    pub async fn assign_slide(&self, slide_id: Uuid, keyword_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO slide_keywords (slide_id, keyword_id) VALUES (?1, ?2)",
        )
        .bind(slide_id)
        .bind(keyword_id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_err("Failed to assign keyword to slide", "", e))?;

        Ok(result.rows_affected() > 0)
    }

    /// Associate a keyword with an element. Returns `false` when the edge
    /// already existed.
    pub async fn assign_element(&self, element_id: Uuid, keyword_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO element_keywords (element_id, keyword_id) VALUES (?1, ?2)",
        )
        .bind(element_id)
        .bind(keyword_id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_err("Failed to assign keyword to element", "", e))?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove a keyword/slide association edge.
    pub async fn unassign_slide(&self, slide_id: Uuid, keyword_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "DELETE FROM slide_keywords WHERE slide_id = ?1 AND keyword_id = ?2",
        )
        .bind(slide_id)
        .bind(keyword_id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_err("Failed to unassign keyword from slide", "", e))?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove a keyword/element association edge.
    pub async fn unassign_element(&self, element_id: Uuid, keyword_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "DELETE FROM element_keywords WHERE element_id = ?1 AND keyword_id = ?2",
        )
        .bind(element_id)
        .bind(keyword_id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_err("Failed to unassign keyword from element", "", e))?;

        Ok(result.rows_affected() > 0)
    }

    /// List the keywords assigned to a slide.
    pub async fn keywords_for_slide(&self, slide_id: Uuid) -> AppResult<Vec<Keyword>> {
        sqlx::query_as::<_, Keyword>(
            "SELECT k.* FROM keywords k \
             JOIN slide_keywords sk ON sk.keyword_id = k.id \
             WHERE sk.slide_id = ?1 ORDER BY k.text ASC",
        )
        .bind(slide_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("Failed to list slide keywords", "", e))
    }

    /// List the slides a keyword is assigned to.
    pub async fn slides_for_keyword(&self, keyword_id: Uuid) -> AppResult<Vec<Uuid>> {
        let rows: Vec<(Uuid,)> =
            sqlx::query_as("SELECT slide_id FROM slide_keywords WHERE keyword_id = ?1")
                .bind(keyword_id)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| db_err("Failed to list keyword slides", "", e))?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// List the elements a keyword is assigned to.
    pub async fn elements_for_keyword(&self, keyword_id: Uuid) -> AppResult<Vec<Uuid>> {
        let rows: Vec<(Uuid,)> =
            sqlx::query_as("SELECT element_id FROM element_keywords WHERE keyword_id = ?1")
                .bind(keyword_id)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| db_err("Failed to list keyword elements", "", e))?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Capture a keyword and its association edges.
    pub async fn snapshot(&self, id: Uuid) -> AppResult<KeywordSnapshot> {
        let keyword = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Keyword {id} not found")))?;
        let slide_ids = self.slides_for_keyword(id).await?;
        let element_ids = self.elements_for_keyword(id).await?;
        Ok(KeywordSnapshot {
            keyword,
            slide_ids,
            element_ids,
        })
    }

    /// Merge source keywords into a destination keyword.
    ///
    /// Every association edge of each source is re-pointed to the
    /// destination exactly once, then the now-orphaned sources are
    /// deleted. Runs in one transaction so a partial merge is never
    /// observable.
    pub async fn merge(&self, source_ids: &[Uuid], dest_id: Uuid) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_err("Failed to begin merge", "", e))?;

        for source_id in source_ids {
            if *source_id == dest_id {
                continue;
            }

            // Re-point edges; edges that would duplicate an existing
            // destination edge are dropped instead.
            sqlx::query(
                "UPDATE OR IGNORE slide_keywords SET keyword_id = ?2 WHERE keyword_id = ?1",
            )
            .bind(source_id)
            .bind(dest_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_err("Failed to merge slide keywords", "", e))?;

            sqlx::query("DELETE FROM slide_keywords WHERE keyword_id = ?1")
                .bind(source_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| db_err("Failed to merge slide keywords", "", e))?;

            sqlx::query(
                "UPDATE OR IGNORE element_keywords SET keyword_id = ?2 WHERE keyword_id = ?1",
            )
            .bind(source_id)
            .bind(dest_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_err("Failed to merge element keywords", "", e))?;

            sqlx::query("DELETE FROM element_keywords WHERE keyword_id = ?1")
                .bind(source_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| db_err("Failed to merge element keywords", "", e))?;

            sqlx::query("DELETE FROM keywords WHERE id = ?1")
                .bind(source_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| db_err("Failed to delete merged keyword", "", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| db_err("Failed to commit merge", "", e))
    }

    /// Restore the pre-merge state from captured snapshots.
    ///
    /// The destination's edges are reset to its captured pre-merge set
    /// and every source keyword is re-inserted with its own edges.
    pub async fn restore_merge(
        &self,
        dest: &KeywordSnapshot,
        sources: &[KeywordSnapshot],
    ) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_err("Failed to begin merge restore", "", e))?;

        sqlx::query("DELETE FROM slide_keywords WHERE keyword_id = ?1")
            .bind(dest.keyword.id)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_err("Failed to reset destination edges", "", e))?;
        sqlx::query("DELETE FROM element_keywords WHERE keyword_id = ?1")
            .bind(dest.keyword.id)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_err("Failed to reset destination edges", "", e))?;

        for snapshot in std::iter::once(dest).chain(sources.iter()) {
            if snapshot.keyword.id != dest.keyword.id {
                sqlx::query(
                    "INSERT INTO keywords (id, project_id, text, category, color) \
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                )
                .bind(snapshot.keyword.id)
                .bind(snapshot.keyword.project_id)
                .bind(&snapshot.keyword.text)
                .bind(snapshot.keyword.category)
                .bind(&snapshot.keyword.color)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    db_err(
                        "Failed to restore merged keyword",
                        "(project_id, text) must be unique",
                        e,
                    )
                })?;
            }

            for slide_id in &snapshot.slide_ids {
                sqlx::query("INSERT INTO slide_keywords (slide_id, keyword_id) VALUES (?1, ?2)")
                    .bind(slide_id)
                    .bind(snapshot.keyword.id)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| db_err("Failed to restore slide keyword", "", e))?;
            }
            for element_id in &snapshot.element_ids {
                sqlx::query(
                    "INSERT INTO element_keywords (element_id, keyword_id) VALUES (?1, ?2)",
                )
                .bind(element_id)
                .bind(snapshot.keyword.id)
                .execute(&mut *tx)
                .await
                .map_err(|e| db_err("Failed to restore element keyword", "", e))?;
            }
        }

        tx.commit()
            .await
            .map_err(|e| db_err("Failed to commit merge restore", "", e))
    }
}
