//! Repository implementations for all SlideHub entities.

pub mod assembly;
pub mod element;
pub mod file;
pub mod keyword;
pub mod project;
pub mod slide;

pub use assembly::AssemblyRepository;
pub use element::ElementRepository;
pub use file::FileRepository;
pub use keyword::KeywordRepository;
pub use project::ProjectRepository;
pub use slide::SlideRepository;

use slidehub_core::error::AppError;

/// Map a sqlx error to the unified error type, naming the violated
/// invariant when the database reports a constraint violation.
pub(crate) fn db_err(context: &str, invariant: &str, e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(ref db) = e {
        if db.is_unique_violation() {
            return AppError::conflict(format!("{context}: {invariant}"));
        }
    }
    AppError::with_source(
        slidehub_core::error::ErrorKind::Database,
        format!("{context} (transaction rolled back)"),
        e,
    )
}
