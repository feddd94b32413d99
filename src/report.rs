//! Import results: counts, timings, and the items that were skipped.
//!
//! A batch import over a real wiki is rarely all-or-nothing — a handful of
//! images will be missing from disk, a few titles will collide. The report
//! keeps the full picture: aggregate [`ImportStats`] for dashboards and exit
//! codes, plus one [`ItemFailure`] per skipped item so a re-run can be
//! targeted. Everything serialises to JSON for the CLI's `--json` mode.

use crate::error::ItemError;
use serde::{Deserialize, Serialize};

/// Complete result of one import run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    /// Aggregate counters and timing.
    pub stats: ImportStats,
    /// One entry per item that was skipped with an error.
    pub failures: Vec<ItemFailure>,
}

/// Aggregate counters for an import run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportStats {
    /// Rows fetched from the wiki database.
    pub total_records: usize,
    /// Content pages converted and written.
    pub pages_imported: usize,
    /// Images copied into the media directory.
    pub images_imported: usize,
    /// Rows excluded by the item selection (not errors).
    pub items_excluded: usize,
    /// Rows skipped with a per-item error.
    pub items_skipped: usize,
    /// Wall-clock duration of the whole run.
    pub duration_ms: u64,
}

/// A single skipped item and why it was skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemFailure {
    /// MediaWiki title of the row.
    pub title: String,
    /// The skippable error that stopped it.
    pub error: ItemError,
}

impl ImportReport {
    /// Total items actually imported.
    pub fn imported(&self) -> usize {
        self.stats.pages_imported + self.stats.images_imported
    }

    /// True when nothing was skipped.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}
