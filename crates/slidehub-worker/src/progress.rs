//! Aggregated progress accounting for concurrent file conversions.

use dashmap::DashMap;
use uuid::Uuid;

/// Per-file slide counters aggregated into one overall figure.
///
/// Every file in a conversion task registers with its declared slide
/// count; totals are summed across all files, so two files at 5/10 and
/// 2/10 report 7/20, never two independent percentages. Tolerates
/// interleaved completion across files.
#[derive(Debug, Default)]
pub struct ProgressLedger {
    files: DashMap<Uuid, FileProgress>,
}

#[derive(Debug, Clone, Copy, Default)]
struct FileProgress {
    done: u64,
    total: u64,
}

impl ProgressLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file with its declared slide count.
    pub fn register(&self, file_id: Uuid, declared_total: u64) {
        self.files.insert(
            file_id,
            FileProgress {
                done: 0,
                total: declared_total,
            },
        );
    }

    /// Update a file's slide total once the document has been opened.
    pub fn set_total(&self, file_id: Uuid, total: u64) {
        self.files.entry(file_id).or_default().total = total;
    }

    /// Record one persisted slide for a file.
    pub fn record_slide(&self, file_id: Uuid) {
        self.files.entry(file_id).or_default().done += 1;
    }

    /// Aggregated `(slides_done, slides_total)` over every registered
    /// file.
    pub fn totals(&self) -> (u64, u64) {
        self.files.iter().fold((0, 0), |(done, total), entry| {
            (done + entry.done, total + entry.total)
        })
    }
}
