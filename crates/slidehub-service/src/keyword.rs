//! Keyword service: graph queries and merge suggestions.
//!
//! Mutations (assign, rename, recolor, merge) go through the command
//! layer so they land on the undo stack; this service carries the read
//! side and the stateless merge suggestion pass.

use sqlx::SqlitePool;
use uuid::Uuid;

use slidehub_core::result::AppResult;
use slidehub_database::repositories::KeywordRepository;
use slidehub_entity::keyword::Keyword;

/// What a keyword is being attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum TagTarget {
    /// A slide.
    Slide(Uuid),
    /// A shape within a slide.
    Element(Uuid),
}

/// One proposed near-duplicate keyword pair.
///
/// Suggestions are proposals for user confirmation; nothing is merged
/// automatically.
#[derive(Debug, Clone)]
pub struct MergeSuggestion {
    /// One keyword of the pair.
    pub a: Keyword,
    /// The other keyword of the pair.
    pub b: Keyword,
    /// Jaro-Winkler similarity in `[0, 1]`.
    pub similarity: f64,
}

/// Read-side keyword operations and merge suggestion.
#[derive(Debug, Clone)]
pub struct KeywordService {
    repo: KeywordRepository,
}

impl KeywordService {
    /// Create a new keyword service.
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            repo: KeywordRepository::new(pool),
        }
    }

    /// List all keywords of a project.
    pub async fn list(&self, project_id: Uuid) -> AppResult<Vec<Keyword>> {
        self.repo.list_by_project(project_id).await
    }

    /// List the keywords assigned to a slide.
    pub async fn keywords_for_slide(&self, slide_id: Uuid) -> AppResult<Vec<Keyword>> {
        self.repo.keywords_for_slide(slide_id).await
    }

    /// List the slides a keyword is assigned to.
    pub async fn slides_for_keyword(&self, keyword_id: Uuid) -> AppResult<Vec<Uuid>> {
        self.repo.slides_for_keyword(keyword_id).await
    }

    /// Propose near-duplicate keyword pairs above the similarity
    /// threshold.
    ///
    /// A stateless pass over the project's current keyword set; pairs
    /// are returned most-similar first.
    pub async fn suggest_merges(
        &self,
        project_id: Uuid,
        threshold: f64,
    ) -> AppResult<Vec<MergeSuggestion>> {
        let keywords = self.repo.list_by_project(project_id).await?;
        Ok(suggest_merges(&keywords, threshold))
    }
}

/// Pairwise similarity pass over a keyword set.
pub fn suggest_merges(keywords: &[Keyword], threshold: f64) -> Vec<MergeSuggestion> {
    let mut suggestions = Vec::new();

    for (i, a) in keywords.iter().enumerate() {
        for b in &keywords[i + 1..] {
            let similarity =
                strsim::jaro_winkler(&a.text.to_lowercase(), &b.text.to_lowercase());
            if similarity >= threshold {
                suggestions.push(MergeSuggestion {
                    a: a.clone(),
                    b: b.clone(),
                    similarity,
                });
            }
        }
    }

    suggestions.sort_by(|x, y| {
        y.similarity
            .partial_cmp(&x.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use slidehub_entity::keyword::KeywordCategory;

    fn keyword(text: &str) -> Keyword {
        Keyword {
            id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            text: text.to_string(),
            category: KeywordCategory::Topic,
            color: "#4C7DD0".to_string(),
        }
    }

    #[test]
    fn test_near_duplicates_are_suggested() {
        let keywords = vec![
            keyword("Quarterly Review"),
            keyword("quarterly review"),
            keyword("Quartely Review"),
            keyword("Marketing"),
        ];

        let suggestions = suggest_merges(&keywords, 0.9);
        assert!(suggestions.len() >= 2);
        // Case-only difference scores highest.
        assert_eq!(suggestions[0].a.text, "Quarterly Review");
        assert_eq!(suggestions[0].b.text, "quarterly review");
        assert!((suggestions[0].similarity - 1.0).abs() < f64::EPSILON);

        // Unrelated keywords are never paired.
        assert!(
            suggestions
                .iter()
                .all(|s| s.a.text != "Marketing" && s.b.text != "Marketing")
        );
    }

    #[test]
    fn test_threshold_filters_pairs() {
        let keywords = vec![keyword("Sales"), keyword("Sails")];
        assert_eq!(suggest_merges(&keywords, 0.99).len(), 0);
        assert_eq!(suggest_merges(&keywords, 0.80).len(), 1);
    }
}
