//! Conversion status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of one file in the conversion pipeline.
///
/// Transitions are Pending → InProgress → {Completed, Failed}; a Failed
/// file becomes eligible again when conversion is re-triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ConversionStatus {
    /// Imported but not yet converted.
    Pending,
    /// Currently being converted by a worker task.
    InProgress,
    /// Converted successfully; slides and elements are trustworthy.
    Completed,
    /// Conversion failed; see the file's failure reason.
    Failed,
}

impl ConversionStatus {
    /// Check if the file is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Check if the file is picked up by a conversion run.
    pub fn is_eligible(&self) -> bool {
        matches!(self, Self::Pending | Self::Failed)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "inprogress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ConversionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
