//! Error types for the mw2doku library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Mw2DokuError`] — **Fatal**: the import cannot proceed at all
//!   (LocalSettings.php missing, unsupported database backend, broken
//!   DokuWiki tree). Returned as `Err(Mw2DokuError)` from [`crate::import`].
//!
//! * [`ItemError`] — **Non-fatal**: a single page or image failed (source
//!   file missing, destination already present, unknown namespace) while the
//!   rest of the wiki imports fine. Stored inside
//!   [`crate::report::ItemFailure`] so callers can inspect partial success
//!   rather than losing the whole batch to one bad row.
//!
//! The separation lets callers decide their own tolerance: abort on the first
//! skipped item, log and continue, or collect everything for a post-run
//! report. The syntax converter itself has no error surface at all —
//! malformed markup passes through unconverted.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the mw2doku library.
///
/// Per-item failures use [`ItemError`] and are stored in
/// [`crate::report::ImportReport`] rather than propagated here.
#[derive(Debug, Error)]
pub enum Mw2DokuError {
    // ── Settings errors ───────────────────────────────────────────────────
    /// No LocalSettings.php at the expected location.
    #[error("LocalSettings.php not found at '{path}'\nPoint --mediawiki-dir at the root of the MediaWiki installation.")]
    SettingsNotFound { path: PathBuf },

    /// The settings file exists but could not be read.
    #[error("Failed to read settings file '{path}': {source}")]
    SettingsUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file was read but yielded no `$variable = value;` assignments.
    #[error("Could not scrape any settings from '{path}'\nThe file does not look like a MediaWiki LocalSettings.php.")]
    SettingsUnparseable { path: PathBuf },

    /// A required `$wg*` variable is absent from the settings file.
    #[error("MediaWiki setting ${key} is not defined in LocalSettings.php")]
    MissingSetting { key: String },

    // ── Database errors ───────────────────────────────────────────────────
    /// Only the SQLite backend can be read without a database server.
    #[error("Unsupported MediaWiki database type '{db_type}'\nOnly the SQLite backend can be read directly.\nEither convert the wiki to $wgDBtype = 'sqlite' or pass --db with a SQLite copy of the database.")]
    UnsupportedDatabase { db_type: String },

    /// The SQLite database file could not be opened.
    #[error("Cannot open MediaWiki database '{path}': {detail}\nCheck $wgSQLiteDataDir and $wgDBname, or pass --db explicitly.")]
    DatabaseUnavailable { path: PathBuf, detail: String },

    /// A query against the MediaWiki schema failed.
    #[error("Query against the MediaWiki database failed: {detail}\nIs the table prefix correct? Set $wgDBprefix or pass --prefix.")]
    QueryFailed { detail: String },

    // ── DokuWiki errors ───────────────────────────────────────────────────
    /// The import target is not a DokuWiki data tree.
    #[error("'{path}' does not look like a DokuWiki installation: missing {missing}\nPoint --dokuwiki-dir at the directory that contains data/pages and data/media.")]
    DokuWikiLayoutInvalid { path: PathBuf, missing: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Batch outcome ─────────────────────────────────────────────────────
    /// Every attempted item was skipped; nothing was imported.
    #[error("All {total} items failed to import.\nFirst error: {first_error}")]
    AllItemsFailed { total: usize, first_error: String },
}

/// A non-fatal error for a single page or image.
///
/// Recorded in [`crate::report::ImportReport`] when an item is
/// skipped. The overall import continues unless ALL items fail.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum ItemError {
    /// The page title cleans to an empty DokuWiki id (punctuation-only title).
    #[error("page '{title}': title cleans to an empty DokuWiki page id")]
    EmptyPageId { title: String },

    /// The destination page already exists and overwriting is disabled.
    #[error("page '{title}': already exists at '{path}'")]
    PageExists { title: String, path: PathBuf },

    /// Writing the converted page failed.
    #[error("page '{title}': write failed: {detail}")]
    PageWriteFailed { title: String, detail: String },

    /// The image is not present under the hashed upload directory.
    #[error("image '{title}': not found in MediaWiki upload directory ('{path}')")]
    MediaMissing { title: String, path: PathBuf },

    /// The destination media file already exists and overwriting is disabled.
    #[error("image '{title}': destination '{path}' already exists")]
    MediaExists { title: String, path: PathBuf },

    /// Copying the image failed.
    #[error("image '{title}': copy failed: {detail}")]
    MediaCopyFailed { title: String, detail: String },

    /// The row's namespace id is neither a page nor an image.
    #[error("'{title}': unknown namespace {namespace}")]
    UnknownNamespace { title: String, namespace: i64 },
}

impl ItemError {
    /// True for skips that mean the content is already in place.
    ///
    /// A re-run over an already-imported wiki skips every item this way;
    /// that outcome must not be confused with a run where nothing worked.
    pub fn is_already_present(&self) -> bool {
        matches!(
            self,
            ItemError::PageExists { .. } | ItemError::MediaExists { .. }
        )
    }
}
