//! Page sink: write converted pages into a DokuWiki data tree.
//!
//! DokuWiki has no database — a page *is* a text file named after its
//! cleaned id under `data/pages/`, media *is* a file under `data/media/`.
//! That makes the sink plain filesystem code, but two disciplines carry over
//! from DokuWiki itself:
//!
//! * ids are cleaned the way `cleanID()` would (lowercase, separators
//!   collapsed to `_`) so the wiki finds the pages it is given;
//! * writes are atomic (temp file + rename) so an interrupted import never
//!   leaves a half-written page for the wiki to serve.

use crate::error::{ItemError, Mw2DokuError};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A validated DokuWiki installation root.
#[derive(Debug)]
pub struct DokuWikiTree {
    root: PathBuf,
}

impl DokuWikiTree {
    /// Validate that `root` looks like a DokuWiki installation.
    ///
    /// Checks for the two directories the import writes into; anything else
    /// about the installation is none of our business.
    pub fn open(root: &Path) -> Result<Self, Mw2DokuError> {
        for required in ["data/pages", "data/media"] {
            if !root.join(required).is_dir() {
                return Err(Mw2DokuError::DokuWikiLayoutInvalid {
                    path: root.to_path_buf(),
                    missing: required.to_string(),
                });
            }
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// Where a page with this id lives.
    pub fn page_path(&self, id: &str) -> PathBuf {
        self.root.join("data/pages").join(format!("{id}.txt"))
    }

    /// Where a media file with this id lives, inside a media namespace.
    pub fn media_path(&self, namespace: &str, id: &str) -> PathBuf {
        self.root.join("data/media").join(namespace).join(id)
    }

    /// Write one converted page, prepending a title heading.
    ///
    /// Returns the destination path, which for a dry run is the path that
    /// *would* have been written.
    pub fn save_page(
        &self,
        title: &str,
        converted: &str,
        overwrite: bool,
        dry_run: bool,
    ) -> Result<PathBuf, ItemError> {
        let id = clean_id(title);
        if id.is_empty() {
            return Err(ItemError::EmptyPageId {
                title: title.to_string(),
            });
        }

        let path = self.page_path(&id);
        if path.exists() && !overwrite {
            return Err(ItemError::PageExists {
                title: title.to_string(),
                path,
            });
        }

        if dry_run {
            info!("dry-run: would write page {}", path.display());
            return Ok(path);
        }

        let mut body = format!(
            "====== {} ======\n\n{}",
            title.replace('_', " "),
            converted
        );
        if !body.ends_with('\n') {
            body.push('\n');
        }

        // Atomic write: temp file in the same directory, then rename.
        let tmp = path.with_extension("txt.tmp");
        let write_err = |e: std::io::Error| ItemError::PageWriteFailed {
            title: title.to_string(),
            detail: e.to_string(),
        };
        std::fs::write(&tmp, &body).map_err(write_err)?;
        std::fs::rename(&tmp, &path).map_err(write_err)?;

        debug!("Wrote page {}", path.display());
        Ok(path)
    }
}

/// Reduce a MediaWiki title to a DokuWiki page id.
///
/// Lowercases, keeps alphanumerics plus `.` and `-`, and collapses every
/// other character run (spaces, underscores, punctuation, `:`) into a single
/// `_`. Namespacing via `:` is deliberately not preserved: all imported
/// pages land flat in `data/pages/`.
pub fn clean_id(title: &str) -> String {
    let mut id = String::with_capacity(title.len());
    for ch in title.trim().chars() {
        if ch.is_alphanumeric() {
            for lower in ch.to_lowercase() {
                id.push(lower);
            }
        } else if ch == '.' || ch == '-' {
            id.push(ch);
        } else if !id.is_empty() && !id.ends_with('_') {
            id.push('_');
        }
    }
    id.trim_end_matches('_').to_string()
}
