//! Events emitted by assembly export tasks.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Progress and terminal events for one export task.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExportEvent {
    /// One slide was placed into the output document.
    SlidePlaced {
        /// The slide just placed.
        slide_id: Uuid,
        /// 1-based position within the output.
        position: u64,
        /// Total slides in the assembly.
        total: u64,
    },
    /// The output document was written.
    Completed {
        /// Where the document was saved.
        output_path: PathBuf,
    },
    /// The task observed its cancellation signal between slides.
    Cancelled,
    /// The export failed.
    Failed {
        /// The assembly being exported.
        assembly_id: Uuid,
        /// Why export failed.
        reason: String,
        /// Whether re-triggering export may succeed.
        retryable: bool,
    },
}
