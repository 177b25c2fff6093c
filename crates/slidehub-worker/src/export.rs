//! Export task — assembles an output document from an assembly's
//! ordered slide list.
//!
//! Runs in the background, reports one progress event per slide placed,
//! and supports cooperative cancellation checked between slides. The
//! caller never blocks on export work.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use sqlx::SqlitePool;
use tokio::sync::{broadcast, watch};
use tracing::{error, info};

use slidehub_core::error::AppError;
use slidehub_core::events::{ExportEvent, TaskEvent};
use slidehub_core::result::AppResult;
use slidehub_core::traits::automation::{DocumentAutomation, SlideRef};
use slidehub_core::types::TaskId;
use slidehub_database::repositories::AssemblyRepository;
use slidehub_entity::assembly::Assembly;

/// Handle to a running export task.
#[derive(Debug)]
pub struct ExportHandle {
    task_id: TaskId,
    cancel: watch::Sender<bool>,
}

impl ExportHandle {
    /// The task id export events are keyed by.
    pub fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Request cooperative cancellation; the task observes the signal
    /// between slides.
    pub fn cancel(&self) {
        let _ = self.cancel.send(true);
    }
}

/// Background export runner for one open project.
#[derive(Debug, Clone)]
pub struct ExportTask {
    pool: SqlitePool,
    automation: Arc<dyn DocumentAutomation>,
    events: broadcast::Sender<TaskEvent>,
    project_root: PathBuf,
}

impl ExportTask {
    /// Create an export runner bound to one project's pool and root
    /// folder.
    pub fn new(
        pool: SqlitePool,
        automation: Arc<dyn DocumentAutomation>,
        events: broadcast::Sender<TaskEvent>,
        project_root: PathBuf,
    ) -> Self {
        Self {
            pool,
            automation,
            events,
            project_root,
        }
    }

    /// Start exporting an assembly to `out_path`.
    ///
    /// Returns immediately with a handle carrying the task id and the
    /// cancellation signal.
    pub fn start(&self, assembly: Assembly, out_path: PathBuf) -> ExportHandle {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let task_id = TaskId::new();
        info!(%task_id, assembly = %assembly.name, out = %out_path.display(), "Starting export");

        let runner = self.clone();
        tokio::spawn(async move {
            match runner.run(task_id, &assembly, &out_path, cancel_rx).await {
                Ok(Some(written)) => {
                    let _ = runner.events.send(TaskEvent::export(
                        task_id,
                        ExportEvent::Completed {
                            output_path: written,
                        },
                    ));
                }
                Ok(None) => {
                    info!(%task_id, "Export cancelled");
                    let _ = runner
                        .events
                        .send(TaskEvent::export(task_id, ExportEvent::Cancelled));
                }
                Err(e) => {
                    error!(%task_id, error = %e, "Export failed");
                    let _ = runner.events.send(TaskEvent::export(
                        task_id,
                        ExportEvent::Failed {
                            assembly_id: assembly.id,
                            reason: e.message.clone(),
                            retryable: e.is_retryable(),
                        },
                    ));
                }
            }
        });

        ExportHandle {
            task_id,
            cancel: cancel_tx,
        }
    }

    /// Drive one export to completion. `Ok(None)` means the
    /// cancellation signal was observed.
    async fn run(
        &self,
        task_id: TaskId,
        assembly: &Assembly,
        out_path: &Path,
        cancel: watch::Receiver<bool>,
    ) -> AppResult<Option<PathBuf>> {
        let rows = AssemblyRepository::new(self.pool.clone())
            .resolve_for_export(assembly.id)
            .await?;

        if rows.is_empty() {
            return Err(AppError::validation(format!(
                "Assembly '{}' has no slides to export",
                assembly.name
            )));
        }

        let total = rows.len() as u64;
        let mut ordered = Vec::with_capacity(rows.len());
        for (position, row) in rows.iter().enumerate() {
            if *cancel.borrow() {
                return Ok(None);
            }

            ordered.push(SlideRef {
                source_path: self.project_root.join(&row.stored_path),
                index: row.idx as u32,
            });
            let _ = self.events.send(TaskEvent::export(
                task_id,
                ExportEvent::SlidePlaced {
                    slide_id: row.slide_id,
                    position: position as u64 + 1,
                    total,
                },
            ));
        }

        if *cancel.borrow() {
            return Ok(None);
        }

        let out = unique_output_path(out_path);
        let handle = self.automation.assemble(&ordered).await?;
        self.automation.save(&handle, &out).await?;
        let _ = self.automation.close(handle).await;

        Ok(Some(out))
    }
}

/// Avoid clobbering an existing output document by numbering the file
/// name.
fn unique_output_path(requested: &Path) -> PathBuf {
    if !requested.exists() {
        return requested.to_path_buf();
    }

    let stem = requested
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("export");
    let extension = requested.extension().and_then(|e| e.to_str());

    for n in 1..u32::MAX {
        let name = match extension {
            Some(ext) => format!("{stem} ({n}).{ext}"),
            None => format!("{stem} ({n})"),
        };
        let candidate = requested.with_file_name(name);
        if !candidate.exists() {
            return candidate;
        }
    }
    requested.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_output_path_numbers_collisions() {
        let dir = std::env::temp_dir().join(format!("slidehub-export-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).expect("mkdir");
        let requested = dir.join("deck.pptx");

        assert_eq!(unique_output_path(&requested), requested);

        std::fs::write(&requested, b"x").expect("write");
        assert_eq!(unique_output_path(&requested), dir.join("deck (1).pptx"));

        std::fs::write(dir.join("deck (1).pptx"), b"x").expect("write");
        assert_eq!(unique_output_path(&requested), dir.join("deck (2).pptx"));

        std::fs::remove_dir_all(&dir).expect("cleanup");
    }
}
