//! Project service: validation and CRUD over the project repository.

use sqlx::SqlitePool;

use slidehub_core::error::AppError;
use slidehub_core::result::AppResult;
use slidehub_database::repositories::ProjectRepository;
use slidehub_entity::project::Project;
use uuid::Uuid;

/// Handles project record CRUD with input validation.
///
/// Validation failures are rejected synchronously and never reach
/// storage.
#[derive(Debug, Clone)]
pub struct ProjectService {
    repo: ProjectRepository,
}

impl ProjectService {
    /// Create a new project service.
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            repo: ProjectRepository::new(pool),
        }
    }

    /// Validate a project or file display name.
    pub fn validate_name(name: &str) -> AppResult<()> {
        if name.trim().is_empty() {
            return Err(AppError::validation("Name must not be empty"));
        }
        Ok(())
    }

    /// Reduce a user-supplied name to a safe folder/file name.
    ///
    /// Path separators and characters rejected by common filesystems
    /// are replaced; surrounding whitespace is trimmed.
    pub fn sanitize_name(name: &str) -> String {
        let cleaned: String = name
            .trim()
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
                c if c.is_control() => '_',
                c => c,
            })
            .collect();

        if cleaned.is_empty() {
            "untitled".to_string()
        } else {
            cleaned
        }
    }

    /// Insert a project record.
    pub async fn create(&self, name: &str, root_path: &str) -> AppResult<Project> {
        Self::validate_name(name)?;
        self.repo.create(name, root_path).await
    }

    /// Find a project by ID.
    pub async fn get(&self, id: Uuid) -> AppResult<Project> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Project {id} not found")))
    }

    /// List all projects in this database.
    pub async fn list(&self) -> AppResult<Vec<Project>> {
        self.repo.list().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_blank_names() {
        assert!(ProjectService::validate_name("Q4 Review").is_ok());
        assert!(ProjectService::validate_name("").is_err());
        assert!(ProjectService::validate_name("   ").is_err());
    }

    #[test]
    fn test_sanitize_replaces_separators() {
        assert_eq!(
            ProjectService::sanitize_name("Q4/earnings: draft?"),
            "Q4_earnings_ draft_"
        );
        assert_eq!(ProjectService::sanitize_name("  "), "untitled");
    }
}
