//! Document automation trait for the external rendering/extraction host.
//!
//! The conversion pipeline and export task consume the office automation
//! host exclusively through this trait. The [`DocumentAutomation`] trait is
//! defined here in `slidehub-core` and implemented in `slidehub-automation`
//! (a child-process adapter for production and a scripted in-memory fake
//! for tests).

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::result::AppResult;

/// Opaque handle to a document opened by the automation host.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DocumentHandle {
    /// Host-assigned token identifying the open document.
    pub token: String,
    /// The path the document was opened from or assembled to.
    pub source: PathBuf,
}

/// Text extracted from one slide.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SlideText {
    /// Slide title text, if any.
    pub title: Option<String>,
    /// Slide body text, if any.
    pub body: Option<String>,
    /// Speaker notes, if any.
    pub notes: Option<String>,
}

/// Bounding box of a shape in document-native units.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BoundingBox {
    /// Left offset.
    pub x: f64,
    /// Top offset.
    pub y: f64,
    /// Width.
    pub w: f64,
    /// Height.
    pub h: f64,
}

/// One shape listed from a slide.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ShapeInfo {
    /// Shape type tag as reported by the host (e.g., "text_box", "picture").
    pub kind: String,
    /// Shape bounds in document-native units.
    pub bbox: BoundingBox,
    /// Text content of the shape, if any.
    pub text: Option<String>,
}

/// Reference to one slide inside a stored presentation, used to drive
/// assembly of a new output document.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SlideRef {
    /// Stored path of the origin presentation.
    pub source_path: PathBuf,
    /// 1-based slide index within the origin presentation.
    pub index: u32,
}

/// Trait for the external document automation host.
///
/// Every method may fail with an [`crate::error::ErrorKind::Automation`]
/// error when the host application is not installed or unreachable;
/// callers surface these as retryable failures and must not let them
/// take down the worker pool. Interaction with one open document is
/// single-threaded: a handle is used by exactly one task at a time.
#[async_trait]
pub trait DocumentAutomation: Send + Sync + std::fmt::Debug + 'static {
    /// Open a presentation file.
    async fn open(&self, path: &Path) -> AppResult<DocumentHandle>;

    /// Number of slides in an open document.
    async fn slide_count(&self, handle: &DocumentHandle) -> AppResult<u32>;

    /// Render one slide to a full-resolution image at `out_path`.
    async fn export_slide_image(
        &self,
        handle: &DocumentHandle,
        index: u32,
        out_path: &Path,
    ) -> AppResult<()>;

    /// Extract title, body, and speaker-note text from one slide.
    async fn extract_text(&self, handle: &DocumentHandle, index: u32) -> AppResult<SlideText>;

    /// List the shapes of one slide with type and bounding box.
    async fn extract_shapes(
        &self,
        handle: &DocumentHandle,
        index: u32,
    ) -> AppResult<Vec<ShapeInfo>>;

    /// Assemble a new document from the given ordered slide references.
    async fn assemble(&self, ordered: &[SlideRef]) -> AppResult<DocumentHandle>;

    /// Save an assembled document to `out_path`.
    async fn save(&self, handle: &DocumentHandle, out_path: &Path) -> AppResult<()>;

    /// Open a document in the host viewer application.
    async fn open_in_viewer(&self, handle: &DocumentHandle) -> AppResult<()>;

    /// Release an open document handle.
    async fn close(&self, handle: DocumentHandle) -> AppResult<()>;
}
