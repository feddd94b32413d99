//! Configuration types for a MediaWiki-to-DokuWiki import run.
//!
//! All import behaviour is controlled through [`ImportConfig`], built via its
//! [`ImportConfigBuilder`]. Keeping every knob in one struct makes it trivial
//! to share a config between the CLI and library callers and to log exactly
//! what a run was asked to do.
//!
//! # Design choice: builder over constructor
//! Only the two installation roots are genuinely required; everything else
//! has a sensible default. The builder lets callers set only what they care
//! about instead of threading ten positional arguments around.

use crate::error::Mw2DokuError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Configuration for one import run.
///
/// Built via [`ImportConfig::builder()`].
///
/// # Example
/// ```rust
/// use mw2doku::{ImportConfig, ItemSelection};
///
/// let config = ImportConfig::builder("/var/www/mediawiki", "/var/www/dokuwiki")
///     .items(ItemSelection::PagesOnly)
///     .dry_run(true)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ImportConfig {
    /// Root of the MediaWiki installation (contains LocalSettings.php,
    /// `images/` and, for the SQLite backend, `data/`).
    pub mediawiki_dir: PathBuf,

    /// Root of the DokuWiki installation (contains `data/pages` and
    /// `data/media`).
    pub dokuwiki_dir: PathBuf,

    /// Which namespaces to import. Default: everything.
    pub items: ItemSelection,

    /// DokuWiki media namespace images land in (`data/media/<ns>/…` and the
    /// `{{<ns>:…}}` links the converter emits assume the same). Default: "wiki".
    pub media_namespace: String,

    /// Table prefix override. If None, the scraped `$wgDBprefix` is used
    /// (empty when that is absent too).
    pub table_prefix: Option<String>,

    /// Explicit path to the SQLite database file. If None, the path is
    /// resolved from `$wgSQLiteDataDir` / `$wgDBname`.
    pub db_path: Option<PathBuf>,

    /// Replace pages that already exist in DokuWiki. Default: false.
    ///
    /// The conservative default protects an installation that already has
    /// content: a re-run import reports `PageExists` skips instead of
    /// clobbering edits made since the last run.
    pub overwrite_pages: bool,

    /// Replace media files that already exist. Default: false.
    pub overwrite_media: bool,

    /// Resolve and convert everything but write nothing. Default: false.
    pub dry_run: bool,

    /// Optional per-item progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl fmt::Debug for ImportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImportConfig")
            .field("mediawiki_dir", &self.mediawiki_dir)
            .field("dokuwiki_dir", &self.dokuwiki_dir)
            .field("items", &self.items)
            .field("media_namespace", &self.media_namespace)
            .field("table_prefix", &self.table_prefix)
            .field("db_path", &self.db_path)
            .field("overwrite_pages", &self.overwrite_pages)
            .field("overwrite_media", &self.overwrite_media)
            .field("dry_run", &self.dry_run)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn callback>"),
            )
            .finish()
    }
}

impl ImportConfig {
    /// Create a new builder rooted at the two installations.
    pub fn builder(
        mediawiki_dir: impl Into<PathBuf>,
        dokuwiki_dir: impl Into<PathBuf>,
    ) -> ImportConfigBuilder {
        ImportConfigBuilder {
            config: ImportConfig {
                mediawiki_dir: mediawiki_dir.into(),
                dokuwiki_dir: dokuwiki_dir.into(),
                items: ItemSelection::default(),
                media_namespace: "wiki".to_string(),
                table_prefix: None,
                db_path: None,
                overwrite_pages: false,
                overwrite_media: false,
                dry_run: false,
                progress_callback: None,
            },
        }
    }
}

/// Builder for [`ImportConfig`].
#[derive(Debug)]
pub struct ImportConfigBuilder {
    config: ImportConfig,
}

impl ImportConfigBuilder {
    pub fn items(mut self, items: ItemSelection) -> Self {
        self.config.items = items;
        self
    }

    pub fn media_namespace(mut self, ns: impl Into<String>) -> Self {
        self.config.media_namespace = ns.into();
        self
    }

    pub fn table_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.table_prefix = Some(prefix.into());
        self
    }

    pub fn db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.db_path = Some(path.into());
        self
    }

    pub fn overwrite_pages(mut self, v: bool) -> Self {
        self.config.overwrite_pages = v;
        self
    }

    pub fn overwrite_media(mut self, v: bool) -> Self {
        self.config.overwrite_media = v;
        self
    }

    pub fn dry_run(mut self, v: bool) -> Self {
        self.config.dry_run = v;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ImportConfig, Mw2DokuError> {
        let c = &self.config;

        if c.media_namespace.is_empty()
            || !c
                .media_namespace
                .chars()
                .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_' || ch == '-')
        {
            return Err(Mw2DokuError::InvalidConfig(format!(
                "media namespace '{}' must be non-empty lowercase [a-z0-9_-]",
                c.media_namespace
            )));
        }

        if let Some(prefix) = &c.table_prefix {
            if !prefix
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
            {
                return Err(Mw2DokuError::InvalidConfig(format!(
                    "table prefix '{prefix}' may only contain [A-Za-z0-9_]"
                )));
            }
        }

        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Which MediaWiki namespaces an import run touches.
///
/// The image pass needs filesystem access to the MediaWiki upload directory;
/// `PagesOnly` lets a wiki be imported from just its database file when the
/// uploads are not available (or are migrated separately).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ItemSelection {
    /// Import pages and images (default).
    #[default]
    All,
    /// Import only content pages (namespace 0).
    PagesOnly,
    /// Import only images/files (namespace 6).
    ImagesOnly,
}

impl ItemSelection {
    pub fn includes_pages(&self) -> bool {
        matches!(self, ItemSelection::All | ItemSelection::PagesOnly)
    }

    pub fn includes_images(&self) -> bool {
        matches!(self, ItemSelection::All | ItemSelection::ImagesOnly)
    }
}
