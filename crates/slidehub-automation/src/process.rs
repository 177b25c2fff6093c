//! Child-process automation adapter.
//!
//! Drives a headless converter executable with timeout management and
//! output capturing. Each trait method maps to one converter
//! invocation; a missing executable surfaces as a retryable automation
//! error so a misconfigured host never takes down the worker pool.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;
use uuid::Uuid;

use slidehub_core::config::AutomationConfig;
use slidehub_core::error::{AppError, ErrorKind};
use slidehub_core::result::AppResult;
use slidehub_core::traits::automation::{
    BoundingBox, DocumentAutomation, DocumentHandle, ShapeInfo, SlideRef, SlideText,
};

/// Document info reported by the converter.
#[derive(Debug, Deserialize)]
struct DocInfo {
    slides: u32,
}

/// Slide text reported by the converter.
#[derive(Debug, Deserialize)]
struct TextOut {
    title: Option<String>,
    body: Option<String>,
    notes: Option<String>,
}

/// One shape reported by the converter.
#[derive(Debug, Deserialize)]
struct ShapeOut {
    kind: String,
    x: f64,
    y: f64,
    w: f64,
    h: f64,
    text: Option<String>,
}

/// Production adapter driving the converter executable.
#[derive(Debug, Clone)]
pub struct ProcessAutomation {
    config: AutomationConfig,
}

impl ProcessAutomation {
    /// Create an adapter from configuration.
    pub fn new(config: AutomationConfig) -> Self {
        Self { config }
    }

    /// Run one converter invocation and return its stdout.
    async fn run(&self, args: &[&str]) -> AppResult<String> {
        debug!(command = %self.config.command, ?args, "Invoking converter");

        let child = Command::new(&self.config.command)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    AppError::automation(format!(
                        "Converter '{}' not installed or not on PATH",
                        self.config.command
                    ))
                } else {
                    AppError::with_source(ErrorKind::Automation, "Failed to spawn converter", e)
                }
            })?;

        let timeout = Duration::from_secs(self.config.timeout_seconds);
        let output = tokio::time::timeout(timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                AppError::automation(format!(
                    "Converter timed out after {} seconds",
                    self.config.timeout_seconds
                ))
            })?
            .map_err(|e| {
                AppError::with_source(ErrorKind::Automation, "Failed to wait for converter", e)
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::automation(format!(
                "Converter exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Run an invocation and parse its stdout as JSON.
    async fn run_json<T: serde::de::DeserializeOwned>(&self, args: &[&str]) -> AppResult<T> {
        let stdout = self.run(args).await?;
        serde_json::from_str(&stdout).map_err(|e| {
            AppError::with_source(
                ErrorKind::Automation,
                "Converter returned malformed output",
                e,
            )
        })
    }
}

#[async_trait]
impl DocumentAutomation for ProcessAutomation {
    async fn open(&self, path: &Path) -> AppResult<DocumentHandle> {
        let path_str = path.to_string_lossy();
        // Probe the document up front so unreadable files fail at open
        // rather than midway through a conversion.
        let _: DocInfo = self.run_json(&["info", "--json", &path_str]).await?;

        Ok(DocumentHandle {
            token: Uuid::new_v4().to_string(),
            source: path.to_path_buf(),
        })
    }

    async fn slide_count(&self, handle: &DocumentHandle) -> AppResult<u32> {
        let source = handle.source.to_string_lossy();
        let info: DocInfo = self.run_json(&["info", "--json", &source]).await?;
        Ok(info.slides)
    }

    async fn export_slide_image(
        &self,
        handle: &DocumentHandle,
        index: u32,
        out_path: &Path,
    ) -> AppResult<()> {
        let source = handle.source.to_string_lossy();
        let index_arg = index.to_string();
        let out = out_path.to_string_lossy();
        self.run(&["render", &source, "--slide", &index_arg, "--out", &out])
            .await?;

        if !out_path.exists() {
            return Err(AppError::automation(format!(
                "Converter reported success but wrote no image at {}",
                out_path.display()
            )));
        }
        Ok(())
    }

    async fn extract_text(&self, handle: &DocumentHandle, index: u32) -> AppResult<SlideText> {
        let source = handle.source.to_string_lossy();
        let index_arg = index.to_string();
        let text: TextOut = self
            .run_json(&["text", "--json", &source, "--slide", &index_arg])
            .await?;

        Ok(SlideText {
            title: text.title,
            body: text.body,
            notes: text.notes,
        })
    }

    async fn extract_shapes(
        &self,
        handle: &DocumentHandle,
        index: u32,
    ) -> AppResult<Vec<ShapeInfo>> {
        let source = handle.source.to_string_lossy();
        let index_arg = index.to_string();
        let shapes: Vec<ShapeOut> = self
            .run_json(&["shapes", "--json", &source, "--slide", &index_arg])
            .await?;

        Ok(shapes
            .into_iter()
            .map(|s| ShapeInfo {
                kind: s.kind,
                bbox: BoundingBox {
                    x: s.x,
                    y: s.y,
                    w: s.w,
                    h: s.h,
                },
                text: s.text,
            })
            .collect())
    }

    async fn assemble(&self, ordered: &[SlideRef]) -> AppResult<DocumentHandle> {
        let manifest_path =
            std::env::temp_dir().join(format!("slidehub-assemble-{}.json", Uuid::new_v4()));
        let manifest = serde_json::to_vec(ordered)?;
        tokio::fs::write(&manifest_path, manifest).await?;

        Ok(DocumentHandle {
            token: Uuid::new_v4().to_string(),
            source: manifest_path,
        })
    }

    async fn save(&self, handle: &DocumentHandle, out_path: &Path) -> AppResult<()> {
        let manifest = handle.source.to_string_lossy();
        let out = out_path.to_string_lossy();
        self.run(&["assemble", "--manifest", &manifest, "--out", &out])
            .await?;

        if !out_path.exists() {
            return Err(AppError::automation(format!(
                "Converter reported success but wrote no document at {}",
                out_path.display()
            )));
        }
        Ok(())
    }

    async fn open_in_viewer(&self, handle: &DocumentHandle) -> AppResult<()> {
        let viewer = self.config.viewer_command.as_deref().ok_or_else(|| {
            AppError::configuration("No viewer command configured")
        })?;

        Command::new(viewer)
            .arg(&handle.source)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Automation, "Failed to launch viewer", e)
            })?;
        Ok(())
    }

    async fn close(&self, handle: DocumentHandle) -> AppResult<()> {
        // The converter is stateless per invocation; assembled manifests
        // are the only artifacts to clean up.
        if handle
            .source
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("slidehub-assemble-"))
        {
            let _ = tokio::fs::remove_file(&handle.source).await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_converter_is_retryable() {
        let adapter = ProcessAutomation::new(AutomationConfig {
            command: "slidehub-test-no-such-binary".to_string(),
            timeout_seconds: 5,
            viewer_command: None,
        });

        let err = adapter
            .open(Path::new("deck.pptx"))
            .await
            .expect_err("should fail");
        assert_eq!(err.kind, ErrorKind::Automation);
        assert!(err.is_retryable());
    }
}
