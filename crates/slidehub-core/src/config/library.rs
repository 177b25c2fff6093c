//! Library layout configuration.

use serde::{Deserialize, Serialize};

/// Settings for where project folders live and how assets are rendered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Directory under which project root folders are created.
    #[serde(default = "default_projects_dir")]
    pub projects_dir: String,
    /// Fixed thumbnail height in pixels; width scales proportionally.
    #[serde(default = "default_thumbnail_height")]
    pub thumbnail_height: u32,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            projects_dir: default_projects_dir(),
            thumbnail_height: default_thumbnail_height(),
        }
    }
}

fn default_projects_dir() -> String {
    "data/projects".to_string()
}

fn default_thumbnail_height() -> u32 {
    180
}
