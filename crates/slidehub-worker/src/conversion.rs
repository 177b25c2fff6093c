//! Conversion pipeline — turns imported files into slide and element
//! records with rendered images.
//!
//! Triggered explicitly per project. Eligible files (Pending or Failed)
//! convert concurrently under a semaphore; each file task holds its own
//! database connection, persists slides in ascending index order, and
//! reports into one aggregated progress stream. A file-level error
//! marks only that file Failed and leaves the other in-flight files
//! untouched; conversion is not cancellable mid-file.

use std::path::PathBuf;
use std::sync::Arc;

use sqlx::SqlitePool;
use tokio::sync::{Semaphore, broadcast};
use tokio::task::JoinSet;
use tracing::{debug, error, info};
use uuid::Uuid;

use slidehub_core::config::WorkerConfig;
use slidehub_core::error::{AppError, ErrorKind};
use slidehub_core::events::{ConversionEvent, TaskEvent};
use slidehub_core::result::AppResult;
use slidehub_core::traits::automation::{DocumentAutomation, SlideText};
use slidehub_core::types::TaskId;
use slidehub_database::repositories::FileRepository;
use slidehub_database::task::TaskConnection;
use slidehub_entity::element::NewElement;
use slidehub_entity::file::{ConversionStatus, LibraryFile};
use slidehub_entity::project::Project;
use slidehub_entity::slide::NewSlide;

use crate::progress::ProgressLedger;

/// Background conversion pipeline for one open project.
#[derive(Debug, Clone)]
pub struct ConversionPipeline {
    pool: SqlitePool,
    automation: Arc<dyn DocumentAutomation>,
    events: broadcast::Sender<TaskEvent>,
    config: WorkerConfig,
    project_root: PathBuf,
    thumbnail_height: u32,
}

impl ConversionPipeline {
    /// Create a pipeline bound to one project's pool and root folder.
    pub fn new(
        pool: SqlitePool,
        automation: Arc<dyn DocumentAutomation>,
        events: broadcast::Sender<TaskEvent>,
        config: WorkerConfig,
        project_root: PathBuf,
        thumbnail_height: u32,
    ) -> Self {
        Self {
            pool,
            automation,
            events,
            config,
            project_root,
            thumbnail_height,
        }
    }

    /// Convert every Pending or Failed file of the project.
    ///
    /// Returns immediately with the task id; progress and completion
    /// arrive on the event channel.
    pub async fn convert_project(&self, project: &Project) -> AppResult<TaskId> {
        let files = FileRepository::new(self.pool.clone())
            .find_by_status(
                project.id,
                &[ConversionStatus::Pending, ConversionStatus::Failed],
            )
            .await?;

        let task_id = TaskId::new();
        info!(%task_id, project = %project.name, files = files.len(), "Starting conversion");

        let ledger = Arc::new(ProgressLedger::new());
        for file in &files {
            ledger.register(file.id, file.slide_count.max(0) as u64);
        }

        let pipeline = self.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let semaphore = Arc::new(Semaphore::new(pipeline.config.concurrency.max(1)));
            let mut set: JoinSet<bool> = JoinSet::new();

            for file in files {
                let pipeline = pipeline.clone();
                let ledger = Arc::clone(&ledger);
                let semaphore = Arc::clone(&semaphore);
                set.spawn(async move {
                    let Ok(_permit) = semaphore.acquire_owned().await else {
                        return false;
                    };
                    pipeline.convert_file(task_id, &ledger, file).await
                });
            }

            let mut completed = 0u64;
            let mut failed = 0u64;
            while let Some(result) = set.join_next().await {
                match result {
                    Ok(true) => completed += 1,
                    Ok(false) => failed += 1,
                    Err(e) => {
                        error!(%task_id, error = %e, "Conversion task panicked");
                        failed += 1;
                    }
                }
            }

            let _ = events.send(TaskEvent::conversion(
                task_id,
                ConversionEvent::Finished { completed, failed },
            ));
            info!(%task_id, completed, failed, "Conversion finished");
        });

        Ok(task_id)
    }

    /// Convert one file to completion or failure. Returns whether the
    /// file completed.
    async fn convert_file(
        &self,
        task_id: TaskId,
        ledger: &ProgressLedger,
        file: LibraryFile,
    ) -> bool {
        let mut conn = match TaskConnection::acquire(&self.pool).await {
            Ok(conn) => conn,
            Err(e) => {
                error!(file_id = %file.id, error = %e, "Could not acquire task connection");
                return false;
            }
        };

        if let Err(e) = conn.mark_in_progress(file.id).await {
            error!(file_id = %file.id, error = %e, "Could not mark file in progress");
            return false;
        }
        let _ = self.events.send(TaskEvent::conversion(
            task_id,
            ConversionEvent::FileStarted { file_id: file.id },
        ));

        match self
            .convert_slides(task_id, ledger, &mut conn, &file)
            .await
        {
            Ok(slide_count) => {
                if let Err(e) = conn.mark_completed(file.id).await {
                    error!(file_id = %file.id, error = %e, "Could not mark file completed");
                    return false;
                }
                let _ = self.events.send(TaskEvent::conversion(
                    task_id,
                    ConversionEvent::FileCompleted {
                        file_id: file.id,
                        slide_count,
                    },
                ));
                true
            }
            Err(e) => {
                error!(file_id = %file.id, error = %e, "Conversion failed");
                if let Err(mark_err) = conn.mark_failed(file.id, &e.message).await {
                    error!(file_id = %file.id, error = %mark_err, "Could not record failure");
                }
                let _ = self.events.send(TaskEvent::conversion(
                    task_id,
                    ConversionEvent::FileFailed {
                        file_id: file.id,
                        reason: e.message.clone(),
                        retryable: e.is_retryable(),
                    },
                ));
                false
            }
        }
    }

    /// Replace a file's slides from the automation host, in ascending
    /// index order.
    async fn convert_slides(
        &self,
        task_id: TaskId,
        ledger: &ProgressLedger,
        conn: &mut TaskConnection,
        file: &LibraryFile,
    ) -> AppResult<u64> {
        let source = self.project_root.join(&file.stored_path);
        let handle = self.automation.open(&source).await?;
        let count = self.automation.slide_count(&handle).await?;

        conn.set_slide_count(file.id, count as i64).await?;
        ledger.set_total(file.id, count as u64);

        // Prior slides (and their elements and keyword edges) go
        // wholesale before reinsertion; a file is only trustworthy
        // again once it reaches Completed.
        conn.clear_slides(file.id).await?;

        for index in 1..=count {
            let (image_rel, thumb_rel) = asset_paths(file.id, index);
            let image_abs = self.project_root.join(&image_rel);

            self.automation
                .export_slide_image(&handle, index, &image_abs)
                .await?;
            write_thumbnail(
                image_abs.clone(),
                self.project_root.join(&thumb_rel),
                self.thumbnail_height,
            )
            .await?;

            // A single slide failing text or shape extraction degrades
            // those fields to empty instead of failing the file.
            let text = match self.automation.extract_text(&handle, index).await {
                Ok(text) => text,
                Err(e) => {
                    debug!(file_id = %file.id, index, error = %e, "Text extraction degraded");
                    SlideText::default()
                }
            };
            let shapes = match self.automation.extract_shapes(&handle, index).await {
                Ok(shapes) => shapes,
                Err(e) => {
                    debug!(file_id = %file.id, index, error = %e, "Shape extraction degraded");
                    Vec::new()
                }
            };

            let slide = NewSlide {
                idx: index as i64,
                title: text.title,
                body: text.body,
                notes: text.notes,
                image_path: image_rel,
                thumb_path: thumb_rel,
            };
            let elements: Vec<NewElement> = shapes
                .into_iter()
                .map(|shape| NewElement {
                    kind: shape.kind,
                    x: shape.bbox.x,
                    y: shape.bbox.y,
                    w: shape.bbox.w,
                    h: shape.bbox.h,
                    text: shape.text,
                })
                .collect();

            conn.insert_slide(file.id, &slide, &elements).await?;

            ledger.record_slide(file.id);
            let (slides_done, slides_total) = ledger.totals();
            let _ = self.events.send(TaskEvent::conversion(
                task_id,
                ConversionEvent::Progress {
                    slides_done,
                    slides_total,
                },
            ));
        }

        let _ = self.automation.close(handle).await;
        Ok(count as u64)
    }
}

/// Scale a rendered slide image down to a fixed-height thumbnail.
async fn write_thumbnail(src: PathBuf, dst: PathBuf, height: u32) -> AppResult<()> {
    tokio::task::spawn_blocking(move || -> AppResult<()> {
        let img = image::open(&src).map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to read rendered image {}", src.display()),
                e,
            )
        })?;

        let height = height.max(1);
        let scale = height as f32 / img.height().max(1) as f32;
        let width = ((img.width() as f32 * scale).round() as u32).max(1);
        let thumb = img.resize_exact(width, height, image::imageops::FilterType::Triangle);

        if let Some(parent) = dst.parent() {
            std::fs::create_dir_all(parent)?;
        }
        thumb.save(&dst).map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write thumbnail {}", dst.display()),
                e,
            )
        })
    })
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Internal, "Thumbnail task panicked", e))?
}

/// Project-relative asset paths for one slide, exposed for callers that
/// need to locate artifacts without a database round trip.
pub fn asset_paths(file_id: Uuid, index: u32) -> (String, String) {
    (
        format!("assets/{file_id}/image_{index}.png"),
        format!("assets/{file_id}/thumb_{index}.png"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_paths_layout() {
        let file_id = Uuid::new_v4();
        let (image, thumb) = asset_paths(file_id, 3);
        assert_eq!(image, format!("assets/{file_id}/image_3.png"));
        assert_eq!(thumb, format!("assets/{file_id}/thumb_3.png"));
    }
}
