//! Slide entity model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One slide within an imported file.
///
/// `(file_id, idx)` is unique; `idx` is 1-based. The annotation fields
/// (`topic`, `slide_kind`, `insight`) are opaque text set by a layer
/// above this core, never computed here.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Slide {
    /// Unique slide identifier.
    pub id: Uuid,
    /// The owning file.
    pub file_id: Uuid,
    /// 1-based index within the file.
    pub idx: i64,
    /// Extracted title text.
    pub title: Option<String>,
    /// Extracted body text.
    pub body: Option<String>,
    /// Extracted speaker notes.
    pub notes: Option<String>,
    /// Project-relative path of the full-resolution rendered image.
    pub image_path: String,
    /// Project-relative path of the thumbnail image.
    pub thumb_path: String,
    /// Opaque topic annotation.
    pub topic: Option<String>,
    /// Opaque slide-type annotation.
    pub slide_kind: Option<String>,
    /// Opaque insight annotation.
    pub insight: Option<String>,
}

/// Data produced by the conversion pipeline for one slide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSlide {
    /// 1-based index within the file.
    pub idx: i64,
    /// Extracted title text.
    pub title: Option<String>,
    /// Extracted body text.
    pub body: Option<String>,
    /// Extracted speaker notes.
    pub notes: Option<String>,
    /// Project-relative path of the full-resolution rendered image.
    pub image_path: String,
    /// Project-relative path of the thumbnail image.
    pub thumb_path: String,
}
