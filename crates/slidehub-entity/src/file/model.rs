//! Imported presentation file entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::ConversionStatus;

/// One imported presentation file and its conversion state.
///
/// The file's slides are only trustworthy when `status` is
/// [`ConversionStatus::Completed`].
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LibraryFile {
    /// Unique file identifier.
    pub id: Uuid,
    /// The owning project.
    pub project_id: Uuid,
    /// Where the file was imported from.
    pub original_path: String,
    /// Sanitized copy inside the project root folder.
    pub stored_path: String,
    /// Declared slide count (0 until the document has been opened).
    pub slide_count: i64,
    /// Current conversion state.
    pub status: ConversionStatus,
    /// Why the last conversion failed, if it did.
    pub failure_reason: Option<String>,
    /// When the file was imported.
    pub imported_at: DateTime<Utc>,
    /// When conversion last completed.
    pub converted_at: Option<DateTime<Utc>>,
}

impl LibraryFile {
    /// The file name portion of the stored path.
    pub fn file_name(&self) -> &str {
        std::path::Path::new(&self.stored_path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.stored_path)
    }
}
