//! Task events emitted by background conversion and export work.
//!
//! Events are published on one broadcast channel, keyed by task id, and
//! consumed by whatever caller layer sits above the core (UI process,
//! API bridge, tests).

pub mod conversion;
pub mod export;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use conversion::ConversionEvent;
pub use export::ExportEvent;

use crate::types::TaskId;

/// Wrapper for all task events with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// The background task this event belongs to.
    pub task_id: TaskId,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The event payload.
    pub payload: TaskEventPayload,
}

/// Union of all task event types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "task", content = "event")]
pub enum TaskEventPayload {
    /// A conversion pipeline event.
    Conversion(ConversionEvent),
    /// An export task event.
    Export(ExportEvent),
}

impl TaskEvent {
    /// Create a new task event stamped with the current time.
    pub fn new(task_id: TaskId, payload: TaskEventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            task_id,
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Shorthand for a conversion event.
    pub fn conversion(task_id: TaskId, event: ConversionEvent) -> Self {
        Self::new(task_id, TaskEventPayload::Conversion(event))
    }

    /// Shorthand for an export event.
    pub fn export(task_id: TaskId, event: ExportEvent) -> Self {
        Self::new(task_id, TaskEventPayload::Export(event))
    }
}
