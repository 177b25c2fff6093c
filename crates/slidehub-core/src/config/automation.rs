//! Document automation host configuration.

use serde::{Deserialize, Serialize};

/// Settings for the external document automation adapter.
///
/// The production adapter drives a headless converter executable as a
/// child process; these settings name the executable and bound its
/// runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomationConfig {
    /// Converter executable name or path.
    #[serde(default = "default_command")]
    pub command: String,
    /// Timeout in seconds for a single converter invocation.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Optional viewer executable for opening exported documents.
    #[serde(default)]
    pub viewer_command: Option<String>,
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            timeout_seconds: default_timeout(),
            viewer_command: None,
        }
    }
}

fn default_command() -> String {
    "slidectl".to_string()
}

fn default_timeout() -> u64 {
    120
}
