//! Scripted in-memory automation fake for tests.
//!
//! Serves documents registered up front, writes real PNG thumbnails so
//! the cache and pipeline exercise their decode paths, and supports
//! failure injection: whole-host unavailability and per-slide text
//! extraction failures.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use uuid::Uuid;

use slidehub_core::error::AppError;
use slidehub_core::result::AppResult;
use slidehub_core::traits::automation::{
    BoundingBox, DocumentAutomation, DocumentHandle, ShapeInfo, SlideRef, SlideText,
};

/// One scripted slide.
#[derive(Debug, Clone, Default)]
pub struct FakeSlide {
    /// Text returned by `extract_text`.
    pub text: SlideText,
    /// Shapes returned by `extract_shapes`.
    pub shapes: Vec<ShapeInfo>,
}

impl FakeSlide {
    /// Create a slide with the given title.
    pub fn titled(title: &str) -> Self {
        Self {
            text: SlideText {
                title: Some(title.to_string()),
                ..SlideText::default()
            },
            shapes: Vec::new(),
        }
    }

    /// Set the body text.
    pub fn with_body(mut self, body: &str) -> Self {
        self.text.body = Some(body.to_string());
        self
    }

    /// Set the speaker notes.
    pub fn with_notes(mut self, notes: &str) -> Self {
        self.text.notes = Some(notes.to_string());
        self
    }

    /// Add a shape.
    pub fn with_shape(mut self, kind: &str, x: f64, y: f64, w: f64, h: f64) -> Self {
        self.shapes.push(ShapeInfo {
            kind: kind.to_string(),
            bbox: BoundingBox { x, y, w, h },
            text: None,
        });
        self
    }
}

/// In-memory fake automation host.
#[derive(Debug, Default)]
pub struct FakeAutomation {
    documents: Mutex<HashMap<PathBuf, Vec<FakeSlide>>>,
    unavailable: AtomicBool,
    text_failures: Mutex<HashSet<(PathBuf, u32)>>,
    assembled: Mutex<Vec<Vec<SlideRef>>>,
    viewed: Mutex<Vec<PathBuf>>,
}

impl FakeAutomation {
    /// Create an empty fake host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document the fake can open.
    pub fn add_document(&self, path: impl Into<PathBuf>, slides: Vec<FakeSlide>) {
        self.documents
            .lock()
            .expect("fake lock")
            .insert(path.into(), slides);
    }

    /// Toggle whole-host unavailability: every call fails retryably.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make `extract_text` fail for one slide of one document.
    pub fn fail_text_for(&self, path: impl Into<PathBuf>, index: u32) {
        self.text_failures
            .lock()
            .expect("fake lock")
            .insert((path.into(), index));
    }

    /// The slide reference lists passed to `assemble`, in call order.
    pub fn assembled(&self) -> Vec<Vec<SlideRef>> {
        self.assembled.lock().expect("fake lock").clone()
    }

    /// The documents opened in the viewer, in call order.
    pub fn viewed(&self) -> Vec<PathBuf> {
        self.viewed.lock().expect("fake lock").clone()
    }

    fn check_available(&self) -> AppResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::automation("Automation host unreachable"));
        }
        Ok(())
    }

    fn slides_for(&self, path: &Path) -> AppResult<Vec<FakeSlide>> {
        self.documents
            .lock()
            .expect("fake lock")
            .get(path)
            .cloned()
            .ok_or_else(|| {
                AppError::automation(format!("Document unreadable: {}", path.display()))
            })
    }

    fn slide_at(&self, path: &Path, index: u32) -> AppResult<FakeSlide> {
        let slides = self.slides_for(path)?;
        slides
            .get((index as usize).saturating_sub(1))
            .cloned()
            .ok_or_else(|| {
                AppError::automation(format!(
                    "Slide {index} out of range for {}",
                    path.display()
                ))
            })
    }
}

#[async_trait]
impl DocumentAutomation for FakeAutomation {
    async fn open(&self, path: &Path) -> AppResult<DocumentHandle> {
        self.check_available()?;
        self.slides_for(path)?;
        Ok(DocumentHandle {
            token: Uuid::new_v4().to_string(),
            source: path.to_path_buf(),
        })
    }

    async fn slide_count(&self, handle: &DocumentHandle) -> AppResult<u32> {
        self.check_available()?;
        Ok(self.slides_for(&handle.source)?.len() as u32)
    }

    async fn export_slide_image(
        &self,
        handle: &DocumentHandle,
        index: u32,
        out_path: &Path,
    ) -> AppResult<()> {
        self.check_available()?;
        self.slide_at(&handle.source, index)?;

        if let Some(parent) = out_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        // A real (tiny) image so thumbnail scaling and cache decoding
        // run against actual pixel data.
        let shade = (index % 255) as u8;
        let img = image::RgbaImage::from_pixel(64, 36, image::Rgba([shade, 120, 200, 255]));
        img.save(out_path)
            .map_err(|e| AppError::automation(format!("Failed to write fake image: {e}")))?;
        Ok(())
    }

    async fn extract_text(&self, handle: &DocumentHandle, index: u32) -> AppResult<SlideText> {
        self.check_available()?;
        let key = (handle.source.clone(), index);
        if self.text_failures.lock().expect("fake lock").contains(&key) {
            return Err(AppError::automation(format!(
                "Text extraction failed for slide {index}"
            )));
        }
        Ok(self.slide_at(&handle.source, index)?.text)
    }

    async fn extract_shapes(
        &self,
        handle: &DocumentHandle,
        index: u32,
    ) -> AppResult<Vec<ShapeInfo>> {
        self.check_available()?;
        Ok(self.slide_at(&handle.source, index)?.shapes)
    }

    async fn assemble(&self, ordered: &[SlideRef]) -> AppResult<DocumentHandle> {
        self.check_available()?;
        self.assembled
            .lock()
            .expect("fake lock")
            .push(ordered.to_vec());
        Ok(DocumentHandle {
            token: format!("assembled-{}", Uuid::new_v4()),
            source: PathBuf::new(),
        })
    }

    async fn save(&self, _handle: &DocumentHandle, out_path: &Path) -> AppResult<()> {
        self.check_available()?;
        let last = self
            .assembled
            .lock()
            .expect("fake lock")
            .last()
            .cloned()
            .unwrap_or_default();
        if let Some(parent) = out_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(out_path, serde_json::to_vec(&last)?).await?;
        Ok(())
    }

    async fn open_in_viewer(&self, handle: &DocumentHandle) -> AppResult<()> {
        self.check_available()?;
        self.viewed
            .lock()
            .expect("fake lock")
            .push(handle.source.clone());
        Ok(())
    }

    async fn close(&self, _handle: DocumentHandle) -> AppResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unavailable_host_is_retryable() {
        let fake = FakeAutomation::new();
        fake.add_document("deck.pptx", vec![FakeSlide::titled("One")]);
        fake.set_unavailable(true);

        let err = fake.open(Path::new("deck.pptx")).await.expect_err("fail");
        assert!(err.is_retryable());

        fake.set_unavailable(false);
        assert!(fake.open(Path::new("deck.pptx")).await.is_ok());
    }

    #[tokio::test]
    async fn test_scripted_slides_round_trip() {
        let fake = FakeAutomation::new();
        fake.add_document(
            "deck.pptx",
            vec![
                FakeSlide::titled("Intro").with_body("welcome").with_shape(
                    "text_box", 10.0, 20.0, 300.0, 80.0,
                ),
                FakeSlide::titled("Close"),
            ],
        );

        let handle = fake.open(Path::new("deck.pptx")).await.expect("open");
        assert_eq!(fake.slide_count(&handle).await.expect("count"), 2);

        let text = fake.extract_text(&handle, 1).await.expect("text");
        assert_eq!(text.title.as_deref(), Some("Intro"));

        let shapes = fake.extract_shapes(&handle, 1).await.expect("shapes");
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].kind, "text_box");
    }
}
