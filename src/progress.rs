//! Progress-callback trait for per-item import events.
//!
//! Inject an [`Arc<dyn ImportProgressCallback>`] via
//! [`crate::config::ImportConfigBuilder::progress_callback`] to receive
//! real-time events as the importer walks the wiki.
//!
//! # Why callbacks instead of a channel?
//!
//! The callback is the least-invasive integration point: callers can forward
//! events to a terminal progress bar, a log file, or a GUI without the
//! library knowing anything about how the host application communicates. The
//! trait is `Send + Sync` so a callback can be shared freely even though the
//! importer itself runs items strictly one at a time.

use std::sync::Arc;

/// Called by the importer as it processes each page or image row.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait ImportProgressCallback: Send + Sync {
    /// Called once after the database has been read, before any item is
    /// processed.
    ///
    /// # Arguments
    /// * `total_items` — number of rows fetched from the wiki database
    fn on_import_start(&self, total_items: usize) {
        let _ = total_items;
    }

    /// Called just before an item is dispatched.
    fn on_item_start(&self, title: &str) {
        let _ = title;
    }

    /// Called when a page has been written or an image copied.
    fn on_item_imported(&self, title: &str) {
        let _ = title;
    }

    /// Called when an item is skipped, with a human-readable reason.
    ///
    /// Selection-excluded rows and per-item errors both arrive here; the
    /// importer never aborts the batch for either.
    fn on_item_skipped(&self, title: &str, reason: &str) {
        let _ = (title, reason);
    }

    /// Called once after every row has been attempted.
    ///
    /// # Arguments
    /// * `imported` — pages written plus images copied
    /// * `skipped`  — rows that were excluded or failed
    fn on_import_complete(&self, imported: usize, skipped: usize) {
        let _ = (imported, skipped);
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
pub struct NoopProgressCallback;

impl ImportProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ImportConfig`].
pub type ProgressCallback = Arc<dyn ImportProgressCallback>;
