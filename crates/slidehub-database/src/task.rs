//! Connection-scoped store for background tasks.
//!
//! Each conversion task checks one connection out of the per-project
//! pool and holds it for its whole duration, so concurrent file
//! conversions never interleave transactions on a shared handle.

use chrono::Utc;
use sqlx::pool::PoolConnection;
use sqlx::{Connection, Sqlite, SqlitePool};
use uuid::Uuid;

use slidehub_core::error::AppError;
use slidehub_core::result::AppResult;
use slidehub_entity::element::NewElement;
use slidehub_entity::file::ConversionStatus;
use slidehub_entity::slide::NewSlide;

use crate::repositories::db_err;

/// A dedicated database connection owned by one background task.
#[derive(Debug)]
pub struct TaskConnection {
    conn: PoolConnection<Sqlite>,
}

impl TaskConnection {
    /// Check a connection out of the pool for the lifetime of a task.
    pub async fn acquire(pool: &SqlitePool) -> AppResult<Self> {
        let conn = pool
            .acquire()
            .await
            .map_err(|e| db_err("Failed to acquire task connection", "", e))?;
        Ok(Self { conn })
    }

    /// Transition a file to InProgress and clear any stale failure
    /// reason.
    pub async fn mark_in_progress(&mut self, file_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE files SET status = ?2, failure_reason = NULL WHERE id = ?1",
        )
        .bind(file_id)
        .bind(ConversionStatus::InProgress)
        .execute(&mut *self.conn)
        .await
        .map_err(|e| db_err("Failed to mark file in progress", "", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("File {file_id} not found")));
        }
        Ok(())
    }

    /// Record the declared slide count once the document has been
    /// opened.
    pub async fn set_slide_count(&mut self, file_id: Uuid, count: i64) -> AppResult<()> {
        sqlx::query("UPDATE files SET slide_count = ?2 WHERE id = ?1")
            .bind(file_id)
            .bind(count)
            .execute(&mut *self.conn)
            .await
            .map_err(|e| db_err("Failed to set slide count", "", e))?;
        Ok(())
    }

    /// Drop every prior slide of a file before reconversion. Elements
    /// and association edges cascade.
    pub async fn clear_slides(&mut self, file_id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM slides WHERE file_id = ?1")
            .bind(file_id)
            .execute(&mut *self.conn)
            .await
            .map_err(|e| db_err("Failed to clear slides", "", e))?;
        Ok(())
    }

    /// Persist one slide with its elements in a single transaction.
    ///
    /// Returns the new slide id. The FTS index is updated by trigger
    /// inside the same transaction, so index and primary data never
    /// diverge.
    pub async fn insert_slide(
        &mut self,
        file_id: Uuid,
        slide: &NewSlide,
        elements: &[NewElement],
    ) -> AppResult<Uuid> {
        let slide_id = Uuid::new_v4();

        let mut tx = self
            .conn
            .begin()
            .await
            .map_err(|e| db_err("Failed to begin slide insert", "", e))?;

        sqlx::query(
            "INSERT INTO slides (id, file_id, idx, title, body, notes, image_path, thumb_path) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(slide_id)
        .bind(file_id)
        .bind(slide.idx)
        .bind(&slide.title)
        .bind(&slide.body)
        .bind(&slide.notes)
        .bind(&slide.image_path)
        .bind(&slide.thumb_path)
        .execute(&mut *tx)
        .await
        .map_err(|e| db_err("Failed to insert slide", "(file_id, idx) must be unique", e))?;

        for element in elements {
            sqlx::query(
                "INSERT INTO elements (id, slide_id, kind, x, y, w, h, text) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )
            .bind(Uuid::new_v4())
            .bind(slide_id)
            .bind(&element.kind)
            .bind(element.x)
            .bind(element.y)
            .bind(element.w)
            .bind(element.h)
            .bind(&element.text)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_err("Failed to insert element", "", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| db_err("Failed to commit slide insert", "", e))?;

        Ok(slide_id)
    }

    /// Transition a file to Completed and stamp the conversion time.
    pub async fn mark_completed(&mut self, file_id: Uuid) -> AppResult<()> {
        sqlx::query(
            "UPDATE files SET status = ?2, failure_reason = NULL, converted_at = ?3 WHERE id = ?1",
        )
        .bind(file_id)
        .bind(ConversionStatus::Completed)
        .bind(Utc::now())
        .execute(&mut *self.conn)
        .await
        .map_err(|e| db_err("Failed to mark file completed", "", e))?;
        Ok(())
    }

    /// Transition a file to Failed with the recorded reason.
    pub async fn mark_failed(&mut self, file_id: Uuid, reason: &str) -> AppResult<()> {
        sqlx::query("UPDATE files SET status = ?2, failure_reason = ?3 WHERE id = ?1")
            .bind(file_id)
            .bind(ConversionStatus::Failed)
            .bind(reason)
            .execute(&mut *self.conn)
            .await
            .map_err(|e| db_err("Failed to mark file failed", "", e))?;
        Ok(())
    }
}
