//! Search service over the secondary text index.

use sqlx::SqlitePool;
use uuid::Uuid;

use slidehub_core::result::AppResult;
use slidehub_database::search::TextSearch;
use slidehub_entity::keyword::{Keyword, KeywordCategory};
use slidehub_entity::slide::Slide;

/// Case-insensitive substring search over keywords and slide text.
#[derive(Debug, Clone)]
pub struct SearchService {
    search: TextSearch,
}

impl SearchService {
    /// Create a new search service.
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            search: TextSearch::new(pool),
        }
    }

    /// Search keywords, optionally scoped to a category and/or project.
    pub async fn keywords(
        &self,
        term: &str,
        category: Option<KeywordCategory>,
        project_id: Option<Uuid>,
    ) -> AppResult<Vec<Keyword>> {
        self.search.search_keywords(term, category, project_id).await
    }

    /// Search slide title/body/notes text, optionally scoped to a
    /// project.
    pub async fn slides(&self, term: &str, project_id: Option<Uuid>) -> AppResult<Vec<Slide>> {
        self.search.search_slides(term, project_id).await
    }
}
