//! The full import: walk the wiki database, convert pages, copy media.
//!
//! ## Failure discipline
//!
//! Everything up to the first row is fatal — a missing LocalSettings.php or
//! an unreadable database means the run cannot mean anything. From the first
//! row on, nothing is: each page or image either imports or is recorded as a
//! skipped item in the report, and the batch carries on. The one exception
//! is a run where *every* attempted item failed, which almost always means a
//! misconfiguration (wrong upload directory, read-only target) and is
//! surfaced as [`Mw2DokuError::AllItemsFailed`] rather than an innocuous
//! "0 imported" report.

use crate::config::ImportConfig;
use crate::error::{ItemError, Mw2DokuError};
use crate::pipeline::sink::DokuWikiTree;
use crate::pipeline::source::{Namespace, SqlitePageSource};
use crate::pipeline::{media, syntax};
use crate::report::{ImportReport, ImportStats, ItemFailure};
use crate::settings::MediaWikiSettings;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Import a MediaWiki installation into a DokuWiki installation.
///
/// This is the primary entry point for the library.
///
/// # Returns
/// `Ok(ImportReport)` on success, even if some items were skipped
/// (check `report.failures`).
///
/// # Errors
/// Returns `Err(Mw2DokuError)` only for fatal errors:
/// - LocalSettings.php missing or unusable
/// - database missing, unreadable, or not the SQLite backend
/// - target directory is not a DokuWiki installation
/// - every attempted item failed
pub fn import(config: &ImportConfig) -> Result<ImportReport, Mw2DokuError> {
    let total_start = Instant::now();
    info!(
        "Starting import: {} -> {}",
        config.mediawiki_dir.display(),
        config.dokuwiki_dir.display()
    );

    // ── Step 1: Validate the DokuWiki tree ───────────────────────────────
    let tree = DokuWikiTree::open(&config.dokuwiki_dir)?;

    // ── Step 2: Scrape LocalSettings.php ─────────────────────────────────
    let settings = MediaWikiSettings::from_file(config.mediawiki_dir.join("LocalSettings.php"))?;
    if let Ok(site) = settings.get("wgSitename") {
        info!("Importing wiki '{}'", site);
    }

    // ── Step 3: Open the wiki database ───────────────────────────────────
    let source = SqlitePageSource::from_settings(
        &settings,
        &config.mediawiki_dir,
        config.db_path.as_deref(),
        config.table_prefix.as_deref(),
    )?;

    // ── Step 4: Fetch rows ───────────────────────────────────────────────
    let records = source.pages()?;
    debug!("Fetched {} rows", records.len());
    if let Some(cb) = &config.progress_callback {
        cb.on_import_start(records.len());
    }

    // ── Step 5: Resolve the upload directory ─────────────────────────────
    let images_dir = upload_dir(&settings, &config.mediawiki_dir);
    debug!("Upload directory: {}", images_dir.display());

    // ── Step 6: Dispatch rows ────────────────────────────────────────────
    let mut stats = ImportStats {
        total_records: records.len(),
        ..ImportStats::default()
    };
    let mut failures: Vec<ItemFailure> = Vec::new();

    for record in &records {
        let namespace = Namespace::from_id(record.namespace);

        let included = match namespace {
            Namespace::Page => config.items.includes_pages(),
            Namespace::Image => config.items.includes_images(),
            // Unknown namespaces are never silently excluded; they surface
            // as skipped items below so the report shows what was in the DB.
            Namespace::Unknown(_) => true,
        };
        if !included {
            stats.items_excluded += 1;
            continue;
        }

        if let Some(cb) = &config.progress_callback {
            cb.on_item_start(&record.title);
        }

        let outcome = match namespace {
            Namespace::Page => tree
                .save_page(
                    &record.title,
                    &syntax::convert_wikitext(&record.text),
                    config.overwrite_pages,
                    config.dry_run,
                )
                .map(|path| {
                    stats.pages_imported += 1;
                    path
                }),
            Namespace::Image => media::copy_media(
                &tree,
                &images_dir,
                &record.title,
                &config.media_namespace,
                config.overwrite_media,
                config.dry_run,
            )
            .map(|path| {
                stats.images_imported += 1;
                path
            }),
            Namespace::Unknown(id) => Err(ItemError::UnknownNamespace {
                title: record.title.clone(),
                namespace: id,
            }),
        };

        match outcome {
            Ok(path) => {
                debug!("Imported '{}' -> {}", record.title, path.display());
                if let Some(cb) = &config.progress_callback {
                    cb.on_item_imported(&record.title);
                }
            }
            Err(error) => {
                warn!("Skipping '{}': {}", record.title, error);
                if let Some(cb) = &config.progress_callback {
                    cb.on_item_skipped(&record.title, &error.to_string());
                }
                stats.items_skipped += 1;
                failures.push(ItemFailure {
                    title: record.title.clone(),
                    error,
                });
            }
        }
    }

    // ── Step 7: Assemble the report ──────────────────────────────────────
    let imported = stats.pages_imported + stats.images_imported;
    let attempted = stats.total_records - stats.items_excluded;

    // A run where nothing imported and nothing was already in place means a
    // broken setup, not a quiet success. A re-run over an already-imported
    // wiki also imports nothing, but its skips are all exists-skips and must
    // stay non-fatal.
    if attempted > 0
        && imported == 0
        && !failures.is_empty()
        && failures.iter().all(|f| !f.error.is_already_present())
    {
        return Err(Mw2DokuError::AllItemsFailed {
            total: attempted,
            first_error: failures[0].error.to_string(),
        });
    }

    stats.duration_ms = total_start.elapsed().as_millis() as u64;
    info!(
        "Import complete: {} pages, {} images, {} skipped, {}ms",
        stats.pages_imported, stats.images_imported, stats.items_skipped, stats.duration_ms
    );

    if let Some(cb) = &config.progress_callback {
        cb.on_import_complete(imported, stats.items_skipped);
    }

    Ok(ImportReport { stats, failures })
}

/// The MediaWiki upload directory.
///
/// `$wgUploadDirectory` is honoured when it is a usable literal path; the
/// stock `"$IP/images"` interpolates and falls back to the conventional
/// `<mediawiki>/images`.
fn upload_dir(settings: &MediaWikiSettings, mediawiki_dir: &Path) -> PathBuf {
    match settings.get_path_like("wgUploadDirectory") {
        Some(dir) => PathBuf::from(dir),
        None => mediawiki_dir.join("images"),
    }
}
