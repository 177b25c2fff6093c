//! Project repository implementation.

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use slidehub_core::error::AppError;
use slidehub_core::result::AppResult;
use slidehub_entity::assembly::{Assembly, AssemblySlide};
use slidehub_entity::keyword::Keyword;
use slidehub_entity::project::Project;
use slidehub_entity::snapshot::ProjectSnapshot;

use super::{db_err, file::FileRepository};

/// Repository for project CRUD and snapshot/restore operations.
#[derive(Debug, Clone)]
pub struct ProjectRepository {
    pool: SqlitePool,
}

impl ProjectRepository {
    /// Create a new project repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new project row.
    pub async fn create(&self, name: &str, root_path: &str) -> AppResult<Project> {
        let project = Project {
            id: Uuid::new_v4(),
            name: name.to_string(),
            root_path: root_path.to_string(),
            created_at: Utc::now(),
        };

        sqlx::query("INSERT INTO projects (id, name, root_path, created_at) VALUES (?1, ?2, ?3, ?4)")
            .bind(project.id)
            .bind(&project.name)
            .bind(&project.root_path)
            .bind(project.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| db_err("Failed to create project", "project name must be unique", e))?;

        Ok(project)
    }

    /// Find a project by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Project>> {
        sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_err("Failed to find project", "", e))
    }

    /// List all projects in this database.
    pub async fn list(&self) -> AppResult<Vec<Project>> {
        sqlx::query_as::<_, Project>("SELECT * FROM projects ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_err("Failed to list projects", "", e))
    }

    /// Update a project's name and root path.
    pub async fn rename(&self, id: Uuid, name: &str, root_path: &str) -> AppResult<()> {
        let result = sqlx::query("UPDATE projects SET name = ?2, root_path = ?3 WHERE id = ?1")
            .bind(id)
            .bind(name)
            .bind(root_path)
            .execute(&self.pool)
            .await
            .map_err(|e| db_err("Failed to rename project", "project name must be unique", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Project {id} not found")));
        }
        Ok(())
    }

    /// Delete a project; every descendant row cascades with it.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM projects WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_err("Failed to delete project", "", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Project {id} not found")));
        }
        Ok(())
    }

    /// Capture every row owned by a project.
    pub async fn snapshot(&self, id: Uuid) -> AppResult<ProjectSnapshot> {
        let project = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Project {id} not found")))?;

        let file_repo = FileRepository::new(self.pool.clone());
        let files = file_repo.list_by_project(id).await?;
        let mut file_snapshots = Vec::with_capacity(files.len());
        for file in &files {
            file_snapshots.push(file_repo.snapshot(file.id).await?);
        }

        let keywords =
            sqlx::query_as::<_, Keyword>("SELECT * FROM keywords WHERE project_id = ?1")
                .bind(id)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| db_err("Failed to snapshot keywords", "", e))?;

        let assemblies =
            sqlx::query_as::<_, Assembly>("SELECT * FROM assemblies WHERE project_id = ?1")
                .bind(id)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| db_err("Failed to snapshot assemblies", "", e))?;

        let assembly_slides = sqlx::query_as::<_, AssemblySlide>(
            "SELECT s.* FROM assembly_slides s \
             JOIN assemblies a ON a.id = s.assembly_id WHERE a.project_id = ?1",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("Failed to snapshot assembly ordering", "", e))?;

        Ok(ProjectSnapshot {
            project,
            files: file_snapshots,
            keywords,
            assemblies,
            assembly_slides,
        })
    }

    /// Re-insert a previously captured project tree in one transaction.
    pub async fn restore(&self, snapshot: &ProjectSnapshot) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_err("Failed to begin restore", "", e))?;

        sqlx::query("INSERT INTO projects (id, name, root_path, created_at) VALUES (?1, ?2, ?3, ?4)")
            .bind(snapshot.project.id)
            .bind(&snapshot.project.name)
            .bind(&snapshot.project.root_path)
            .bind(snapshot.project.created_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_err("Failed to restore project", "project name must be unique", e))?;

        for keyword in &snapshot.keywords {
            sqlx::query(
                "INSERT INTO keywords (id, project_id, text, category, color) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(keyword.id)
            .bind(keyword.project_id)
            .bind(&keyword.text)
            .bind(keyword.category)
            .bind(&keyword.color)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_err("Failed to restore keyword", "(project_id, text) must be unique", e))?;
        }

        // Assemblies go in before the files: each file snapshot
        // re-inserts the ordering rows referencing its own slides.
        for assembly in &snapshot.assemblies {
            sqlx::query(
                "INSERT INTO assemblies (id, project_id, name, created_at) VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(assembly.id)
            .bind(assembly.project_id)
            .bind(&assembly.name)
            .bind(assembly.created_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_err("Failed to restore assembly", "", e))?;
        }

        for file in &snapshot.files {
            FileRepository::restore_in_tx(&mut tx, file).await?;
        }

        // The file snapshots already re-inserted ordering rows for
        // their slides; OR IGNORE makes this pass cover only leftovers.
        for row in &snapshot.assembly_slides {
            sqlx::query(
                "INSERT OR IGNORE INTO assembly_slides (assembly_id, slide_id, position) \
                 VALUES (?1, ?2, ?3)",
            )
            .bind(row.assembly_id)
            .bind(row.slide_id)
            .bind(row.position)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_err("Failed to restore assembly ordering", "", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| db_err("Failed to commit restore", "", e))
    }
}
