//! Imported file repository implementation.

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use slidehub_core::error::AppError;
use slidehub_core::result::AppResult;
use slidehub_entity::assembly::AssemblySlide;
use slidehub_entity::element::Element;
use slidehub_entity::file::{ConversionStatus, LibraryFile};
use slidehub_entity::slide::Slide;
use slidehub_entity::snapshot::FileSnapshot;

use super::db_err;

/// Repository for imported file CRUD and status queries.
#[derive(Debug, Clone)]
pub struct FileRepository {
    pool: SqlitePool,
}

impl FileRepository {
    /// Create a new file repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a newly imported file with status Pending.
    pub async fn insert(
        &self,
        project_id: Uuid,
        original_path: &str,
        stored_path: &str,
    ) -> AppResult<LibraryFile> {
        let file = LibraryFile {
            id: Uuid::new_v4(),
            project_id,
            original_path: original_path.to_string(),
            stored_path: stored_path.to_string(),
            slide_count: 0,
            status: ConversionStatus::Pending,
            failure_reason: None,
            imported_at: Utc::now(),
            converted_at: None,
        };

        sqlx::query(
            "INSERT INTO files (id, project_id, original_path, stored_path, slide_count, \
             status, failure_reason, imported_at, converted_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(file.id)
        .bind(file.project_id)
        .bind(&file.original_path)
        .bind(&file.stored_path)
        .bind(file.slide_count)
        .bind(file.status)
        .bind(&file.failure_reason)
        .bind(file.imported_at)
        .bind(file.converted_at)
        .execute(&self.pool)
        .await
        .map_err(|e| db_err("Failed to insert file", "", e))?;

        Ok(file)
    }

    /// Find a file by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<LibraryFile>> {
        sqlx::query_as::<_, LibraryFile>("SELECT * FROM files WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_err("Failed to find file", "", e))
    }

    /// List all files of a project, oldest first.
    pub async fn list_by_project(&self, project_id: Uuid) -> AppResult<Vec<LibraryFile>> {
        sqlx::query_as::<_, LibraryFile>(
            "SELECT * FROM files WHERE project_id = ?1 ORDER BY imported_at ASC",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("Failed to list files", "", e))
    }

    /// List files of a project matching any of the given statuses.
    pub async fn find_by_status(
        &self,
        project_id: Uuid,
        statuses: &[ConversionStatus],
    ) -> AppResult<Vec<LibraryFile>> {
        if statuses.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT * FROM files WHERE project_id = ");
        qb.push_bind(project_id);
        qb.push(" AND status IN (");
        let mut separated = qb.separated(", ");
        for status in statuses {
            separated.push_bind(*status);
        }
        qb.push(") ORDER BY imported_at ASC");

        qb.build_query_as::<LibraryFile>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_err("Failed to query files by status", "", e))
    }

    /// Update a file's stored path after a rename on disk.
    pub async fn rename_stored(&self, id: Uuid, stored_path: &str) -> AppResult<()> {
        let result = sqlx::query("UPDATE files SET stored_path = ?2 WHERE id = ?1")
            .bind(id)
            .bind(stored_path)
            .execute(&self.pool)
            .await
            .map_err(|e| db_err("Failed to rename file", "", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("File {id} not found")));
        }
        Ok(())
    }

    /// Delete a file; slides, elements, and association edges cascade.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM files WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_err("Failed to delete file", "", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("File {id} not found")));
        }
        Ok(())
    }

    /// Capture a file and everything it owns.
    pub async fn snapshot(&self, id: Uuid) -> AppResult<FileSnapshot> {
        let file = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {id} not found")))?;

        let slides = sqlx::query_as::<_, Slide>(
            "SELECT * FROM slides WHERE file_id = ?1 ORDER BY idx ASC",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("Failed to snapshot slides", "", e))?;

        let elements = sqlx::query_as::<_, Element>(
            "SELECT e.* FROM elements e JOIN slides s ON s.id = e.slide_id WHERE s.file_id = ?1",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("Failed to snapshot elements", "", e))?;

        let slide_edges: Vec<(Uuid, Uuid)> = sqlx::query_as(
            "SELECT sk.slide_id, sk.keyword_id FROM slide_keywords sk \
             JOIN slides s ON s.id = sk.slide_id WHERE s.file_id = ?1",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("Failed to snapshot slide keywords", "", e))?;

        let element_edges: Vec<(Uuid, Uuid)> = sqlx::query_as(
            "SELECT ek.element_id, ek.keyword_id FROM element_keywords ek \
             JOIN elements e ON e.id = ek.element_id \
             JOIN slides s ON s.id = e.slide_id WHERE s.file_id = ?1",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("Failed to snapshot element keywords", "", e))?;

        // Ordering rows cascade away with the slides, so they must be
        // captured here to survive a delete/undo round trip.
        let assembly_slides = sqlx::query_as::<_, AssemblySlide>(
            "SELECT a.* FROM assembly_slides a \
             JOIN slides s ON s.id = a.slide_id WHERE s.file_id = ?1",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("Failed to snapshot assembly ordering", "", e))?;

        Ok(FileSnapshot {
            file,
            slides,
            elements,
            slide_edges,
            element_edges,
            assembly_slides,
        })
    }

    /// Re-insert a captured file tree in one transaction.
    pub async fn restore(&self, snapshot: &FileSnapshot) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_err("Failed to begin restore", "", e))?;

        Self::restore_in_tx(&mut tx, snapshot).await?;

        tx.commit()
            .await
            .map_err(|e| db_err("Failed to commit restore", "", e))
    }

    /// Re-insert a captured file tree within an existing transaction.
    pub(crate) async fn restore_in_tx(
        tx: &mut Transaction<'_, Sqlite>,
        snapshot: &FileSnapshot,
    ) -> AppResult<()> {
        let file = &snapshot.file;
        sqlx::query(
            "INSERT INTO files (id, project_id, original_path, stored_path, slide_count, \
             status, failure_reason, imported_at, converted_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(file.id)
        .bind(file.project_id)
        .bind(&file.original_path)
        .bind(&file.stored_path)
        .bind(file.slide_count)
        .bind(file.status)
        .bind(&file.failure_reason)
        .bind(file.imported_at)
        .bind(file.converted_at)
        .execute(&mut **tx)
        .await
        .map_err(|e| db_err("Failed to restore file", "", e))?;

        for slide in &snapshot.slides {
            sqlx::query(
                "INSERT INTO slides (id, file_id, idx, title, body, notes, image_path, \
                 thumb_path, topic, slide_kind, insight) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            )
            .bind(slide.id)
            .bind(slide.file_id)
            .bind(slide.idx)
            .bind(&slide.title)
            .bind(&slide.body)
            .bind(&slide.notes)
            .bind(&slide.image_path)
            .bind(&slide.thumb_path)
            .bind(&slide.topic)
            .bind(&slide.slide_kind)
            .bind(&slide.insight)
            .execute(&mut **tx)
            .await
            .map_err(|e| db_err("Failed to restore slide", "(file_id, idx) must be unique", e))?;
        }

        for element in &snapshot.elements {
            sqlx::query(
                "INSERT INTO elements (id, slide_id, kind, x, y, w, h, text) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )
            .bind(element.id)
            .bind(element.slide_id)
            .bind(&element.kind)
            .bind(element.x)
            .bind(element.y)
            .bind(element.w)
            .bind(element.h)
            .bind(&element.text)
            .execute(&mut **tx)
            .await
            .map_err(|e| db_err("Failed to restore element", "", e))?;
        }

        for (slide_id, keyword_id) in &snapshot.slide_edges {
            sqlx::query("INSERT INTO slide_keywords (slide_id, keyword_id) VALUES (?1, ?2)")
                .bind(slide_id)
                .bind(keyword_id)
                .execute(&mut **tx)
                .await
                .map_err(|e| db_err("Failed to restore slide keyword", "", e))?;
        }

        for (element_id, keyword_id) in &snapshot.element_edges {
            sqlx::query("INSERT INTO element_keywords (element_id, keyword_id) VALUES (?1, ?2)")
                .bind(element_id)
                .bind(keyword_id)
                .execute(&mut **tx)
                .await
                .map_err(|e| db_err("Failed to restore element keyword", "", e))?;
        }

        for row in &snapshot.assembly_slides {
            sqlx::query(
                "INSERT INTO assembly_slides (assembly_id, slide_id, position) VALUES (?1, ?2, ?3)",
            )
            .bind(row.assembly_id)
            .bind(row.slide_id)
            .bind(row.position)
            .execute(&mut **tx)
            .await
            .map_err(|e| db_err("Failed to restore assembly ordering", "", e))?;
        }

        Ok(())
    }
}
