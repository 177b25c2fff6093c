//! Element (shape) entity model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One shape within a slide.
///
/// Elements are deleted and regenerated wholesale whenever their slide is
/// reconverted; they are never partially patched.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Element {
    /// Unique element identifier.
    pub id: Uuid,
    /// The owning slide.
    pub slide_id: Uuid,
    /// Shape type tag as reported by the automation host.
    pub kind: String,
    /// Bounding box left offset, document-native units.
    pub x: f64,
    /// Bounding box top offset, document-native units.
    pub y: f64,
    /// Bounding box width, document-native units.
    pub w: f64,
    /// Bounding box height, document-native units.
    pub h: f64,
    /// Text content of the shape, if any.
    pub text: Option<String>,
}

/// Data produced by the conversion pipeline for one element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewElement {
    /// Shape type tag.
    pub kind: String,
    /// Bounding box left offset.
    pub x: f64,
    /// Bounding box top offset.
    pub y: f64,
    /// Bounding box width.
    pub w: f64,
    /// Bounding box height.
    pub h: f64,
    /// Text content of the shape, if any.
    pub text: Option<String>,
}
