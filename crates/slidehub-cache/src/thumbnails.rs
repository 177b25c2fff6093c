//! In-memory thumbnail cache implementation using the moka crate.
//!
//! The cache maps slide id to the decoded thumbnail image. Eviction is
//! least-recently-used weighted by decoded byte size, so the bound is a
//! byte budget rather than an entry count. The cache never writes back
//! to disk; it is invalidated wholesale when the owning project closes.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use moka::future::Cache;
use tracing::debug;
use uuid::Uuid;

use slidehub_core::config::CacheConfig;
use slidehub_core::error::{AppError, ErrorKind};
use slidehub_core::result::AppResult;

/// One decoded thumbnail held in the cache.
#[derive(Debug, Clone)]
pub struct DecodedThumb {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Raw RGBA pixel data.
    pub data: Vec<u8>,
}

impl DecodedThumb {
    /// Decoded size in bytes.
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }
}

/// Cache statistics for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cached thumbnails.
    pub entries: u64,
    /// Total decoded bytes currently held.
    pub bytes: u64,
}

/// Process-wide thumbnail cache.
///
/// Constructed once and injected into whatever needs it, so tests can
/// substitute their own instance.
#[derive(Debug, Clone)]
pub struct ThumbnailCache {
    cache: Cache<Uuid, Arc<DecodedThumb>>,
}

impl ThumbnailCache {
    /// Create a cache bounded by the configured byte budget.
    pub fn new(config: &CacheConfig) -> Self {
        let cache = Cache::builder()
            .weigher(|_key: &Uuid, value: &Arc<DecodedThumb>| -> u32 {
                value.byte_len().min(u32::MAX as usize) as u32
            })
            .max_capacity(config.max_bytes)
            .build();

        Self { cache }
    }

    /// Get the decoded thumbnail for a slide, loading it from disk on a
    /// miss.
    ///
    /// `thumb_path` is the slide's stored project-relative thumbnail
    /// path and is resolved against the owning project's root folder.
    /// Concurrent misses for the same slide coalesce into one load.
    pub async fn get(
        &self,
        slide_id: Uuid,
        project_root: &Path,
        thumb_path: &str,
    ) -> AppResult<Arc<DecodedThumb>> {
        let full_path = project_root.join(thumb_path);
        self.cache
            .try_get_with(slide_id, load_thumb(full_path))
            .await
            .map_err(|e: Arc<AppError>| (*e).clone())
    }

    /// Drop every cached thumbnail. Called when the owning project
    /// closes.
    pub async fn invalidate_all(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
        debug!("Thumbnail cache invalidated");
    }

    /// Current entry count and byte usage.
    pub async fn stats(&self) -> CacheStats {
        self.cache.run_pending_tasks().await;
        CacheStats {
            entries: self.cache.entry_count(),
            bytes: self.cache.weighted_size(),
        }
    }
}

/// Read and decode one thumbnail file.
async fn load_thumb(path: PathBuf) -> AppResult<Arc<DecodedThumb>> {
    let bytes = tokio::fs::read(&path).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Cache,
            format!("Failed to read thumbnail {}", path.display()),
            e,
        )
    })?;

    let thumb = tokio::task::spawn_blocking(move || -> AppResult<DecodedThumb> {
        let img = image::load_from_memory(&bytes).map_err(|e| {
            AppError::with_source(ErrorKind::Cache, "Failed to decode thumbnail", e)
        })?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(DecodedThumb {
            width,
            height,
            data: rgba.into_raw(),
        })
    })
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Internal, "Thumbnail decode task panicked", e))??;

    debug!(path = %path.display(), thumb.width, thumb.height, "Decoded thumbnail");
    Ok(Arc::new(thumb))
}
