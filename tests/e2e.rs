//! End-to-end integration tests for mw2doku.
//!
//! Each test builds a miniature MediaWiki installation in a temp dir — a
//! scraped-shape LocalSettings.php, a SQLite database with the
//! page/revision/text schema, and a hashed images tree — plus an empty
//! DokuWiki data tree, then drives a real import across the two.

use mw2doku::{
    hashed_upload_path, import, ImportConfig, ImportProgressCallback, ItemError, ItemSelection,
    Mw2DokuError,
};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ── Fixture helpers ──────────────────────────────────────────────────────────

const LOCAL_SETTINGS: &str = r#"<?php
$wgSitename = "Fixture Wiki";
$wgDBtype = "sqlite";
$wgDBname = "fixturewiki";
$wgDBprefix = "";
$wgUploadDirectory = "$IP/images";
"#;

const MAIN_PAGE_WIKITEXT: &str = "== Welcome ==\n''Hello'' '''world'''\n* one\n* two";

const SYNTAX_GUIDE_WIKITEXT: &str =
    "see [http://example.org docs]\n<pre>raw //text//</pre>";

struct Fixture {
    _dir: tempfile::TempDir,
    mediawiki: PathBuf,
    dokuwiki: PathBuf,
}

/// A page row: (id, title, namespace, body).
type Row<'a> = (i64, &'a str, i64, &'a str);

fn default_rows() -> Vec<Row<'static>> {
    vec![
        (1, "Main_Page", 0, MAIN_PAGE_WIKITEXT),
        (2, "Syntax_Guide", 0, SYNTAX_GUIDE_WIKITEXT),
        (3, "Logo.png", 6, "image description page"),
        (4, "Ghost.png", 6, "image description page"),
        (5, "Style_talk", 1, "talk page body"),
    ]
}

fn build_fixture(rows: &[Row<'_>]) -> Fixture {
    let dir = tempfile::tempdir().expect("create temp dir");
    let mediawiki = dir.path().join("mediawiki");
    let dokuwiki = dir.path().join("dokuwiki");

    std::fs::create_dir_all(mediawiki.join("data")).unwrap();
    std::fs::create_dir_all(dokuwiki.join("data/pages")).unwrap();
    std::fs::create_dir_all(dokuwiki.join("data/media")).unwrap();
    std::fs::write(mediawiki.join("LocalSettings.php"), LOCAL_SETTINGS).unwrap();

    write_database(&mediawiki.join("data/fixturewiki.sqlite"), rows);

    // Logo.png exists on disk under the hashed upload path; Ghost.png is a DB
    // row with no file behind it.
    if rows.iter().any(|r| r.1 == "Logo.png") {
        let src = hashed_upload_path(&mediawiki.join("images"), "Logo.png");
        std::fs::create_dir_all(src.parent().unwrap()).unwrap();
        std::fs::write(&src, b"\x89PNG-fixture-bytes").unwrap();
    }

    Fixture {
        _dir: dir,
        mediawiki,
        dokuwiki,
    }
}

fn write_database(path: &Path, rows: &[Row<'_>]) {
    let conn = Connection::open(path).expect("create fixture db");
    conn.execute_batch(
        "CREATE TABLE page (
             page_id INTEGER PRIMARY KEY,
             page_title TEXT NOT NULL,
             page_namespace INTEGER NOT NULL,
             page_latest INTEGER NOT NULL
         );
         CREATE TABLE revision (rev_id INTEGER PRIMARY KEY, rev_text_id INTEGER NOT NULL);
         CREATE TABLE text (old_id INTEGER PRIMARY KEY, old_text BLOB);",
    )
    .unwrap();

    for (id, title, namespace, body) in rows {
        conn.execute(
            "INSERT INTO page (page_id, page_title, page_namespace, page_latest) \
             VALUES (?1, ?2, ?3, ?1)",
            params![id, title, namespace],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO revision (rev_id, rev_text_id) VALUES (?1, ?1)",
            params![id],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO text (old_id, old_text) VALUES (?1, ?2)",
            params![id, body.as_bytes()],
        )
        .unwrap();
    }
}

fn config_for(fixture: &Fixture) -> ImportConfig {
    ImportConfig::builder(&fixture.mediawiki, &fixture.dokuwiki)
        .build()
        .expect("valid config")
}

// ── Full import ──────────────────────────────────────────────────────────────

#[test]
fn full_import_converts_pages_and_copies_images() {
    let fixture = build_fixture(&default_rows());

    let report = import(&config_for(&fixture)).expect("import should succeed");

    assert_eq!(report.stats.total_records, 5);
    assert_eq!(report.stats.pages_imported, 2);
    assert_eq!(report.stats.images_imported, 1);
    assert_eq!(report.stats.items_excluded, 0);
    assert_eq!(report.stats.items_skipped, 2, "Ghost.png and Style_talk");
    assert_eq!(report.failures.len(), 2);

    // The converted page landed under its cleaned id with a title heading.
    let page = std::fs::read_to_string(fixture.dokuwiki.join("data/pages/main_page.txt"))
        .expect("main_page.txt should exist");
    assert_eq!(
        page,
        "====== Main Page ======\n\n====== Welcome ======\n//Hello// **world**\n  * one\n  * two\n"
    );

    // The image arrived byte-for-byte in the media namespace.
    let logo = std::fs::read(fixture.dokuwiki.join("data/media/wiki/logo.png"))
        .expect("logo.png should be copied");
    assert_eq!(logo, b"\x89PNG-fixture-bytes");
}

#[test]
fn code_blocks_and_links_survive_the_full_path() {
    let fixture = build_fixture(&default_rows());
    import(&config_for(&fixture)).expect("import should succeed");

    let page =
        std::fs::read_to_string(fixture.dokuwiki.join("data/pages/syntax_guide.txt")).unwrap();
    assert!(
        page.contains("see [[http://example.org|docs]]"),
        "bracketed URL link should be converted, got:\n{page}"
    );
    assert!(
        page.contains("<code>raw //text//</code>"),
        "pre contents must be byte-identical inside code tags, got:\n{page}"
    );
}

#[test]
fn skipped_items_are_reported_with_reasons() {
    let fixture = build_fixture(&default_rows());
    let report = import(&config_for(&fixture)).unwrap();

    let ghost = report
        .failures
        .iter()
        .find(|f| f.title == "Ghost.png")
        .expect("Ghost.png should be reported");
    assert!(matches!(ghost.error, ItemError::MediaMissing { .. }));

    let talk = report
        .failures
        .iter()
        .find(|f| f.title == "Style_talk")
        .expect("Style_talk should be reported");
    assert!(matches!(
        talk.error,
        ItemError::UnknownNamespace { namespace: 1, .. }
    ));
}

// ── Re-runs and overwrite semantics ──────────────────────────────────────────

#[test]
fn reimport_skips_existing_content_without_failing() {
    let fixture = build_fixture(&default_rows());
    import(&config_for(&fixture)).unwrap();

    // Second run: everything already present is skipped, not clobbered, and
    // the run is not treated as "all failed".
    let report = import(&config_for(&fixture)).expect("re-run should not be fatal");
    assert_eq!(report.stats.pages_imported, 0);
    assert_eq!(report.stats.images_imported, 0);
    assert!(report
        .failures
        .iter()
        .any(|f| matches!(f.error, ItemError::PageExists { .. })));
    assert!(report
        .failures
        .iter()
        .any(|f| matches!(f.error, ItemError::MediaExists { .. })));
}

#[test]
fn overwrite_pages_replaces_existing_files() {
    let fixture = build_fixture(&default_rows());
    import(&config_for(&fixture)).unwrap();

    let page_path = fixture.dokuwiki.join("data/pages/main_page.txt");
    std::fs::write(&page_path, "locally edited").unwrap();

    let config = ImportConfig::builder(&fixture.mediawiki, &fixture.dokuwiki)
        .overwrite_pages(true)
        .build()
        .unwrap();
    let report = import(&config).unwrap();

    assert_eq!(report.stats.pages_imported, 2);
    let page = std::fs::read_to_string(&page_path).unwrap();
    assert!(page.contains("====== Welcome ======"));
}

#[test]
fn dry_run_reports_but_writes_nothing() {
    let fixture = build_fixture(&default_rows());

    let config = ImportConfig::builder(&fixture.mediawiki, &fixture.dokuwiki)
        .dry_run(true)
        .build()
        .unwrap();
    let report = import(&config).unwrap();

    assert_eq!(report.stats.pages_imported, 2);
    assert_eq!(report.stats.images_imported, 1);
    assert!(!fixture.dokuwiki.join("data/pages/main_page.txt").exists());
    assert!(!fixture.dokuwiki.join("data/media/wiki/logo.png").exists());
}

// ── Selection ────────────────────────────────────────────────────────────────

#[test]
fn pages_only_selection_excludes_images() {
    let fixture = build_fixture(&default_rows());

    let config = ImportConfig::builder(&fixture.mediawiki, &fixture.dokuwiki)
        .items(ItemSelection::PagesOnly)
        .build()
        .unwrap();
    let report = import(&config).unwrap();

    assert_eq!(report.stats.pages_imported, 2);
    assert_eq!(report.stats.images_imported, 0);
    assert_eq!(report.stats.items_excluded, 2, "both image rows excluded");
    assert!(!fixture.dokuwiki.join("data/media/wiki/logo.png").exists());
}

#[test]
fn images_only_selection_excludes_pages() {
    let fixture = build_fixture(&default_rows());

    let config = ImportConfig::builder(&fixture.mediawiki, &fixture.dokuwiki)
        .items(ItemSelection::ImagesOnly)
        .build()
        .unwrap();
    let report = import(&config).unwrap();

    assert_eq!(report.stats.pages_imported, 0);
    assert_eq!(report.stats.images_imported, 1);
    assert_eq!(report.stats.items_excluded, 2, "both page rows excluded");
    assert!(!fixture.dokuwiki.join("data/pages/main_page.txt").exists());
}

// ── Fatal paths ──────────────────────────────────────────────────────────────

#[test]
fn missing_localsettings_is_fatal() {
    let fixture = build_fixture(&default_rows());
    std::fs::remove_file(fixture.mediawiki.join("LocalSettings.php")).unwrap();

    let err = import(&config_for(&fixture)).unwrap_err();
    assert!(matches!(err, Mw2DokuError::SettingsNotFound { .. }));
}

#[test]
fn non_sqlite_backend_is_fatal() {
    let fixture = build_fixture(&default_rows());
    std::fs::write(
        fixture.mediawiki.join("LocalSettings.php"),
        "$wgDBtype = \"mysql\";\n$wgDBname = \"wiki\";\n",
    )
    .unwrap();

    let err = import(&config_for(&fixture)).unwrap_err();
    assert!(matches!(err, Mw2DokuError::UnsupportedDatabase { .. }));
}

#[test]
fn missing_database_file_is_fatal() {
    let fixture = build_fixture(&default_rows());
    std::fs::remove_file(fixture.mediawiki.join("data/fixturewiki.sqlite")).unwrap();

    let err = import(&config_for(&fixture)).unwrap_err();
    assert!(matches!(err, Mw2DokuError::DatabaseUnavailable { .. }));
}

#[test]
fn invalid_dokuwiki_tree_is_fatal() {
    let fixture = build_fixture(&default_rows());
    std::fs::remove_dir_all(fixture.dokuwiki.join("data/pages")).unwrap();

    let err = import(&config_for(&fixture)).unwrap_err();
    assert!(matches!(err, Mw2DokuError::DokuWikiLayoutInvalid { .. }));
}

#[test]
fn run_where_every_item_fails_is_fatal() {
    // A single image row whose file does not exist: nothing can import.
    let fixture = build_fixture(&[(1, "Ghost.png", 6, "description")]);

    let err = import(&config_for(&fixture)).unwrap_err();
    match err {
        Mw2DokuError::AllItemsFailed { total, first_error } => {
            assert_eq!(total, 1);
            assert!(first_error.contains("Ghost.png"));
        }
        other => panic!("expected AllItemsFailed, got {other:?}"),
    }
}

#[test]
fn empty_wiki_imports_nothing() {
    let fixture = build_fixture(&[]);
    let report = import(&config_for(&fixture)).expect("empty wiki is fine");
    assert_eq!(report.stats.total_records, 0);
    assert!(report.is_complete());
}

// ── Report and callbacks ─────────────────────────────────────────────────────

#[test]
fn report_serialises_to_json() {
    let fixture = build_fixture(&default_rows());
    let report = import(&config_for(&fixture)).unwrap();

    let json = serde_json::to_string_pretty(&report).expect("report must serialise");
    let back: mw2doku::ImportReport = serde_json::from_str(&json).expect("and deserialise");
    assert_eq!(back.stats.pages_imported, report.stats.pages_imported);
    assert_eq!(back.failures.len(), report.failures.len());
}

#[test]
fn progress_callbacks_fire_per_item() {
    struct Counting {
        total: AtomicUsize,
        starts: AtomicUsize,
        imports: AtomicUsize,
        skips: AtomicUsize,
        done: AtomicUsize,
    }

    impl ImportProgressCallback for Counting {
        fn on_import_start(&self, total_items: usize) {
            self.total.store(total_items, Ordering::SeqCst);
        }
        fn on_item_start(&self, _title: &str) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }
        fn on_item_imported(&self, _title: &str) {
            self.imports.fetch_add(1, Ordering::SeqCst);
        }
        fn on_item_skipped(&self, _title: &str, _reason: &str) {
            self.skips.fetch_add(1, Ordering::SeqCst);
        }
        fn on_import_complete(&self, imported: usize, _skipped: usize) {
            self.done.store(imported, Ordering::SeqCst);
        }
    }

    let counting = Arc::new(Counting {
        total: AtomicUsize::new(0),
        starts: AtomicUsize::new(0),
        imports: AtomicUsize::new(0),
        skips: AtomicUsize::new(0),
        done: AtomicUsize::new(0),
    });

    let fixture = build_fixture(&default_rows());
    let config = ImportConfig::builder(&fixture.mediawiki, &fixture.dokuwiki)
        .progress_callback(Arc::clone(&counting) as Arc<dyn ImportProgressCallback>)
        .build()
        .unwrap();

    import(&config).unwrap();

    assert_eq!(counting.total.load(Ordering::SeqCst), 5);
    assert_eq!(counting.starts.load(Ordering::SeqCst), 5);
    assert_eq!(counting.imports.load(Ordering::SeqCst), 3);
    assert_eq!(counting.skips.load(Ordering::SeqCst), 2);
    assert_eq!(counting.done.load(Ordering::SeqCst), 3);
}

// ── Database overrides ───────────────────────────────────────────────────────

#[test]
fn explicit_db_path_overrides_settings_resolution() {
    let fixture = build_fixture(&default_rows());

    // Move the database somewhere the settings resolution would never look.
    let moved = fixture.mediawiki.join("elsewhere.sqlite");
    std::fs::rename(fixture.mediawiki.join("data/fixturewiki.sqlite"), &moved).unwrap();

    let config = ImportConfig::builder(&fixture.mediawiki, &fixture.dokuwiki)
        .db_path(&moved)
        .build()
        .unwrap();
    let report = import(&config).unwrap();
    assert_eq!(report.stats.pages_imported, 2);
}
