//! Background worker configuration.

use serde::{Deserialize, Serialize};

/// Conversion and export worker pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Number of files converted concurrently.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Capacity of the task event broadcast channel.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            event_capacity: default_event_capacity(),
        }
    }
}

fn default_concurrency() -> usize {
    4
}

fn default_event_capacity() -> usize {
    256
}
