//! Keyword entity model and category enumeration.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// Category of a keyword label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum KeywordCategory {
    /// Subject-matter label.
    Topic,
    /// Title-derived label.
    Title,
    /// Person or entity name.
    Name,
}

impl KeywordCategory {
    /// Default display color for keywords of this category.
    pub fn default_color(&self) -> &'static str {
        match self {
            Self::Topic => "#4C7DD0",
            Self::Title => "#3FA47A",
            Self::Name => "#C06AD0",
        }
    }

    /// Return the category as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Topic => "topic",
            Self::Title => "title",
            Self::Name => "name",
        }
    }
}

impl fmt::Display for KeywordCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A categorized text label attachable to slides and elements.
///
/// `(project_id, text)` is unique.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Keyword {
    /// Unique keyword identifier.
    pub id: Uuid,
    /// The owning project.
    pub project_id: Uuid,
    /// Label text.
    pub text: String,
    /// Label category.
    pub category: KeywordCategory,
    /// Display color as a hex string.
    pub color: String,
}
