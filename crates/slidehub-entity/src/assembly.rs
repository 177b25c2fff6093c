//! Assembly entity models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A named, ordered list of slide references scoped to a project.
///
/// Referenced slides may come from any file in the project. Ordering is
/// persisted immediately on every mutation; there is no pending state.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Assembly {
    /// Unique assembly identifier.
    pub id: Uuid,
    /// The owning project.
    pub project_id: Uuid,
    /// Assembly name.
    pub name: String,
    /// When the assembly was created.
    pub created_at: DateTime<Utc>,
}

/// One ordered slide reference within an assembly.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AssemblySlide {
    /// The owning assembly.
    pub assembly_id: Uuid,
    /// The referenced slide.
    pub slide_id: Uuid,
    /// 0-based position within the assembly.
    pub position: i64,
}
