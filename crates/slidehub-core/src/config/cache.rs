//! Thumbnail cache configuration.

use serde::{Deserialize, Serialize};

/// In-memory thumbnail cache configuration.
///
/// The cache is bounded by total decoded byte size, not entry count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum total size of decoded thumbnails in bytes.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_max_bytes(),
        }
    }
}

fn default_max_bytes() -> u64 {
    64 * 1024 * 1024
}
