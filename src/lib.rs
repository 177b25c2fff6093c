//! # slidehub
//!
//! Library facade for the SlideHub core: turns imported presentation
//! files into a searchable, taggable collection of slide and shape
//! records, with undoable mutations, a bounded thumbnail cache, and
//! background conversion/export reporting on one event channel.
//!
//! The facade wires the crates together behind two handles:
//! [`Library`] (process-wide services: cache, undo stack, event
//! channel, automation adapter) and [`ProjectSession`] (one open
//! project: its database pool, services, and background pipelines).

mod library;
mod session;

pub use library::Library;
pub use session::ProjectSession;

pub use slidehub_core::config::AppConfig;
pub use slidehub_core::error::{AppError, ErrorKind};
pub use slidehub_core::events::{ConversionEvent, ExportEvent, TaskEvent, TaskEventPayload};
pub use slidehub_core::result::AppResult;
pub use slidehub_core::traits::automation::DocumentAutomation;
pub use slidehub_core::types::{CommandOutcome, TaskId};
pub use slidehub_entity::{
    Assembly, AssemblySlide, ConversionStatus, Element, Keyword, KeywordCategory, LibraryFile,
    Project, Slide,
};
pub use slidehub_service::{MergeSuggestion, TagTarget};
pub use slidehub_worker::ExportHandle;

use tracing_subscriber::{EnvFilter, fmt};

/// Initialize tracing/logging from configuration.
pub fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}
