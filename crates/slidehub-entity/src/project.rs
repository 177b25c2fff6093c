//! Project entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The root container for imported files, keywords, and assemblies.
///
/// Each project owns a root folder on disk holding its database file and
/// generated asset tree.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Project {
    /// Unique project identifier.
    pub id: Uuid,
    /// Project name (unique).
    pub name: String,
    /// Absolute path of the project root folder.
    pub root_path: String,
    /// When the project was created.
    pub created_at: DateTime<Utc>,
}
