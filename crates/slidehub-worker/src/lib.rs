//! # slidehub-worker
//!
//! Background work for SlideHub: the conversion pipeline that turns
//! imported files into slide and element records with rendered images,
//! and the cancellable export task that assembles an output document
//! from an ordered slide list. Both report progress on one broadcast
//! channel keyed by task id, and each task owns a dedicated database
//! connection for its whole duration.

pub mod conversion;
pub mod export;
pub mod progress;

pub use conversion::ConversionPipeline;
pub use export::{ExportHandle, ExportTask};
pub use progress::ProgressLedger;
