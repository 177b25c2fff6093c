//! Full-text search over keywords and slide text.
//!
//! The indexed path queries the FTS5 trigram tables, which give
//! case-insensitive substring matching for terms of at least three
//! characters. Shorter terms, and any query the index rejects, take a
//! linear `LIKE` scan with the same case-insensitive substring
//! semantics; callers observe identical results from either path.

use sqlx::SqlitePool;
use tracing::warn;
use uuid::Uuid;

use slidehub_core::result::AppResult;
use slidehub_entity::keyword::{Keyword, KeywordCategory};
use slidehub_entity::slide::Slide;

use crate::repositories::db_err;

/// Minimum term length the trigram index can serve.
const MIN_INDEXED_LEN: usize = 3;

/// Search access to the secondary text index with linear-scan fallback.
#[derive(Debug, Clone)]
pub struct TextSearch {
    pool: SqlitePool,
}

impl TextSearch {
    /// Create a new search handle.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Search keywords by substring, optionally scoped to a category
    /// and/or project.
    pub async fn search_keywords(
        &self,
        term: &str,
        category: Option<KeywordCategory>,
        project_id: Option<Uuid>,
    ) -> AppResult<Vec<Keyword>> {
        if term.chars().count() < MIN_INDEXED_LEN {
            return self.scan_keywords(term, category, project_id).await;
        }

        match self.fts_keywords(term, category, project_id).await {
            Ok(results) => Ok(results),
            Err(e) => {
                warn!(error = %e, term, "Keyword index unavailable, falling back to linear scan");
                self.scan_keywords(term, category, project_id).await
            }
        }
    }

    /// Search slide title/body/notes text by substring, optionally
    /// scoped to a project.
    pub async fn search_slides(
        &self,
        term: &str,
        project_id: Option<Uuid>,
    ) -> AppResult<Vec<Slide>> {
        if term.chars().count() < MIN_INDEXED_LEN {
            return self.scan_slides(term, project_id).await;
        }

        match self.fts_slides(term, project_id).await {
            Ok(results) => Ok(results),
            Err(e) => {
                warn!(error = %e, term, "Slide index unavailable, falling back to linear scan");
                self.scan_slides(term, project_id).await
            }
        }
    }

    async fn fts_keywords(
        &self,
        term: &str,
        category: Option<KeywordCategory>,
        project_id: Option<Uuid>,
    ) -> AppResult<Vec<Keyword>> {
        sqlx::query_as::<_, Keyword>(
            "SELECT k.* FROM keywords k \
             WHERE k.rowid IN (SELECT rowid FROM keyword_fts WHERE keyword_fts MATCH ?1) \
               AND (?2 IS NULL OR k.category = ?2) \
               AND (?3 IS NULL OR k.project_id = ?3) \
             ORDER BY k.text ASC",
        )
        .bind(fts_phrase(term))
        .bind(category)
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("Keyword index query failed", "", e))
    }

    async fn scan_keywords(
        &self,
        term: &str,
        category: Option<KeywordCategory>,
        project_id: Option<Uuid>,
    ) -> AppResult<Vec<Keyword>> {
        sqlx::query_as::<_, Keyword>(
            "SELECT k.* FROM keywords k \
             WHERE lower(k.text) LIKE ?1 ESCAPE '\\' \
               AND (?2 IS NULL OR k.category = ?2) \
               AND (?3 IS NULL OR k.project_id = ?3) \
             ORDER BY k.text ASC",
        )
        .bind(like_pattern(term))
        .bind(category)
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("Keyword scan failed", "", e))
    }

    async fn fts_slides(&self, term: &str, project_id: Option<Uuid>) -> AppResult<Vec<Slide>> {
        sqlx::query_as::<_, Slide>(
            "SELECT s.* FROM slides s \
             JOIN files f ON f.id = s.file_id \
             WHERE s.rowid IN (SELECT rowid FROM slide_fts WHERE slide_fts MATCH ?1) \
               AND (?2 IS NULL OR f.project_id = ?2) \
             ORDER BY f.imported_at ASC, s.idx ASC",
        )
        .bind(fts_phrase(term))
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("Slide index query failed", "", e))
    }

    async fn scan_slides(&self, term: &str, project_id: Option<Uuid>) -> AppResult<Vec<Slide>> {
        sqlx::query_as::<_, Slide>(
            "SELECT s.* FROM slides s \
             JOIN files f ON f.id = s.file_id \
             WHERE (lower(coalesce(s.title, '')) LIKE ?1 ESCAPE '\\' \
                 OR lower(coalesce(s.body, '')) LIKE ?1 ESCAPE '\\' \
                 OR lower(coalesce(s.notes, '')) LIKE ?1 ESCAPE '\\') \
               AND (?2 IS NULL OR f.project_id = ?2) \
             ORDER BY f.imported_at ASC, s.idx ASC",
        )
        .bind(like_pattern(term))
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("Slide scan failed", "", e))
    }
}

/// Quote a term as an FTS5 string so it is matched as one phrase.
fn fts_phrase(term: &str) -> String {
    format!("\"{}\"", term.replace('"', "\"\""))
}

/// Build a `LIKE` pattern matching the term as a case-insensitive
/// substring, escaping the wildcard metacharacters.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}
