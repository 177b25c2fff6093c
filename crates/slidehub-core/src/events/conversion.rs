//! Events emitted by the conversion pipeline.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Progress, completion, and failure events for one conversion task.
///
/// Progress is aggregated across every file converting under the task:
/// `slides_done` / `slides_total` counts slides over all in-flight files,
/// not per-file percentages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConversionEvent {
    /// A file moved to in-progress.
    FileStarted {
        /// The file being converted.
        file_id: Uuid,
    },
    /// Aggregated slide progress across all files in the task.
    Progress {
        /// Slides persisted so far, over every file in the task.
        slides_done: u64,
        /// Declared slide total over every file in the task.
        slides_total: u64,
    },
    /// One file finished converting.
    FileCompleted {
        /// The completed file.
        file_id: Uuid,
        /// Number of slides persisted for it.
        slide_count: u64,
    },
    /// One file failed; the rest of the task is unaffected.
    FileFailed {
        /// The failed file.
        file_id: Uuid,
        /// Why conversion failed.
        reason: String,
        /// Whether re-triggering conversion may succeed.
        retryable: bool,
    },
    /// Every file in the task reached a terminal state.
    Finished {
        /// Files that completed.
        completed: u64,
        /// Files that failed.
        failed: u64,
    },
}
