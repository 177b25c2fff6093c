//! # slidehub-cache
//!
//! Bounded in-memory cache of decoded slide thumbnails, keyed by slide
//! id and bounded by total decoded byte size.

pub mod thumbnails;

pub use thumbnails::{CacheStats, DecodedThumb, ThumbnailCache};
