//! # mw2doku
//!
//! Import a MediaWiki wiki into DokuWiki: convert page markup, carry the
//! pages over, copy the uploaded images.
//!
//! ## Why this crate?
//!
//! The two wikis disagree about almost every markup construct — headings
//! count `=` marks in opposite directions, links double their brackets,
//! italics collide with literal `//` in URLs — and MediaWiki keeps its
//! content three database joins deep while DokuWiki wants plain text files.
//! This crate does the whole migration in one pass: a deterministic,
//! order-sensitive syntax converter at the core, with thin filesystem and
//! SQLite glue around it.
//!
//! ## Pipeline Overview
//!
//! ```text
//! MediaWiki installation
//!  │
//!  ├─ 1. Settings  scrape LocalSettings.php ($wgDBname, prefix, paths)
//!  ├─ 2. Source    page ⋈ revision ⋈ text rows from the SQLite database
//!  ├─ 3. Dispatch  namespace 0 → page, 6 → image, other → skip
//!  ├─ 4. Syntax    9-pass markup rewrite (headings, lists, links, code…)
//!  ├─ 5. Sink      data/pages/<id>.txt, atomic writes
//!  └─ 6. Media     images/<h1>/<h2>/<name> → data/media/wiki/<id>
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mw2doku::{import, ImportConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ImportConfig::builder("/var/www/mediawiki", "/var/www/dokuwiki")
//!         .dry_run(true)
//!         .build()?;
//!     let report = import(&config)?;
//!     println!(
//!         "{} pages, {} images, {} skipped",
//!         report.stats.pages_imported,
//!         report.stats.images_imported,
//!         report.stats.items_skipped,
//!     );
//!     Ok(())
//! }
//! ```
//!
//! Converting markup without touching any installation:
//!
//! ```rust
//! use mw2doku::convert_wikitext;
//!
//! assert_eq!(convert_wikitext("''Italic''"), "//Italic//");
//! assert_eq!(convert_wikitext("== Title =="), "====== Title ======");
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `mw2doku` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! mw2doku = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod import;
pub mod pipeline;
pub mod progress;
pub mod report;
pub mod settings;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ImportConfig, ImportConfigBuilder, ItemSelection};
pub use error::{ItemError, Mw2DokuError};
pub use import::import;
pub use pipeline::media::hashed_upload_path;
pub use pipeline::sink::{clean_id, DokuWikiTree};
pub use pipeline::source::{Namespace, PageRecord, SqlitePageSource};
pub use pipeline::syntax::convert_wikitext;
pub use progress::{ImportProgressCallback, NoopProgressCallback, ProgressCallback};
pub use report::{ImportReport, ImportStats, ItemFailure};
pub use settings::MediaWikiSettings;
