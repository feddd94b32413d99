//! Page source: read `(title, namespace, text)` rows from the wiki database.
//!
//! ## Why SQLite only?
//!
//! MediaWiki stores page bodies three joins deep (`page` → `revision` →
//! `text`), behind whichever backend `$wgDBtype` names. The SQLite backend is
//! the one that needs no running server: the whole wiki is a single file
//! under `$wgSQLiteDataDir`, which is also the natural interchange format for
//! a one-shot migration — dump the server database to SQLite, point the
//! importer at the file. Other backends fail fast with a hint rather than
//! dragging a MySQL client library into every install.
//!
//! The connection is opened read-only: an importer has no business writing
//! to the wiki it is migrating away from.

use crate::error::Mw2DokuError;
use crate::settings::MediaWikiSettings;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// One row of the wiki: a page title, its namespace id, and the latest
/// revision's body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRecord {
    pub title: String,
    pub namespace: i64,
    pub text: String,
}

/// MediaWiki namespace of a row, dispatched once per record.
///
/// Only the two namespaces the importer handles get their own variant;
/// everything else (talk pages, templates, user pages, …) is `Unknown` and
/// skipped with its id preserved for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Namespace {
    /// Content pages, namespace id 0.
    Page,
    /// Images/files, namespace id 6.
    Image,
    /// Any other namespace id.
    Unknown(i64),
}

impl Namespace {
    /// Namespace id of content pages in MediaWiki.
    pub const MAIN_ID: i64 = 0;
    /// Namespace id of files in MediaWiki.
    pub const FILE_ID: i64 = 6;

    pub fn from_id(id: i64) -> Self {
        match id {
            Self::MAIN_ID => Namespace::Page,
            Self::FILE_ID => Namespace::Image,
            other => Namespace::Unknown(other),
        }
    }
}

/// Read-only handle on a MediaWiki SQLite database.
#[derive(Debug)]
pub struct SqlitePageSource {
    conn: Connection,
    prefix: String,
}

impl SqlitePageSource {
    /// Open a database file read-only with the given table prefix.
    pub fn open(db_path: &Path, prefix: &str) -> Result<Self, Mw2DokuError> {
        validate_prefix(prefix)?;

        let conn = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| Mw2DokuError::DatabaseUnavailable {
            path: db_path.to_path_buf(),
            detail: e.to_string(),
        })?;

        debug!("Opened MediaWiki database {}", db_path.display());

        Ok(Self {
            conn,
            prefix: prefix.to_string(),
        })
    }

    /// Open the database described by a scraped `LocalSettings.php`.
    ///
    /// `db_override` (from `--db`) wins over settings resolution;
    /// `prefix_override` wins over `$wgDBprefix`.
    pub fn from_settings(
        settings: &MediaWikiSettings,
        mediawiki_dir: &Path,
        db_override: Option<&Path>,
        prefix_override: Option<&str>,
    ) -> Result<Self, Mw2DokuError> {
        let db_path = match db_override {
            Some(p) => p.to_path_buf(),
            None => resolve_db_path(settings, mediawiki_dir)?,
        };

        let prefix = match prefix_override {
            Some(p) => p.to_string(),
            None => settings.get_or("wgDBprefix", "").to_string(),
        };

        Self::open(&db_path, &prefix)
    }

    /// Number of rows in the `page` table, for progress reporting.
    pub fn page_count(&self) -> Result<usize, Mw2DokuError> {
        let sql = format!("SELECT COUNT(*) FROM {}page", self.prefix);
        let count: i64 = self
            .conn
            .query_row(&sql, [], |row| row.get(0))
            .map_err(query_err)?;
        Ok(count as usize)
    }

    /// Fetch every page row with its latest revision body, ordered by title.
    ///
    /// Titles and bodies are stored as BLOBs by MediaWiki's schema; both are
    /// decoded as UTF-8, lossily, so one page with a broken encoding cannot
    /// poison the run.
    pub fn pages(&self) -> Result<Vec<PageRecord>, Mw2DokuError> {
        let sql = format!(
            "SELECT     p.page_title, p.page_namespace, t.old_text \
             FROM       {prefix}page p \
             INNER JOIN {prefix}revision r ON p.page_latest = r.rev_id \
             INNER JOIN {prefix}text t ON r.rev_text_id = t.old_id \
             ORDER BY   p.page_title",
            prefix = self.prefix
        );

        let mut stmt = self.conn.prepare(&sql).map_err(query_err)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(PageRecord {
                    title: text_value(row.get_ref(0)?),
                    namespace: row.get(1)?,
                    text: text_value(row.get_ref(2)?),
                })
            })
            .map_err(query_err)?;

        rows.collect::<Result<Vec<_>, _>>().map_err(query_err)
    }
}

/// Locate the SQLite database file from scraped settings.
///
/// `$wgSQLiteDataDir` is honoured when it is a usable literal path; the
/// installer default (`"$IP/data"`) interpolates and falls back to the
/// conventional `<mediawiki>/data`. The file itself is `<wgDBname>.sqlite`.
pub fn resolve_db_path(
    settings: &MediaWikiSettings,
    mediawiki_dir: &Path,
) -> Result<PathBuf, Mw2DokuError> {
    let db_type = settings.get("wgDBtype")?;
    if db_type != "sqlite" {
        return Err(Mw2DokuError::UnsupportedDatabase {
            db_type: db_type.to_string(),
        });
    }

    let data_dir = settings
        .get_path_like("wgSQLiteDataDir")
        .map(PathBuf::from)
        .unwrap_or_else(|| mediawiki_dir.join("data"));

    let name = settings.get("wgDBname")?;
    Ok(data_dir.join(format!("{name}.sqlite")))
}

fn validate_prefix(prefix: &str) -> Result<(), Mw2DokuError> {
    // The prefix is interpolated into SQL; restrict it to identifier chars.
    if prefix
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        Ok(())
    } else {
        Err(Mw2DokuError::InvalidConfig(format!(
            "table prefix '{prefix}' may only contain [A-Za-z0-9_]"
        )))
    }
}

fn query_err(e: rusqlite::Error) -> Mw2DokuError {
    Mw2DokuError::QueryFailed {
        detail: e.to_string(),
    }
}

/// Decode a column that may arrive as TEXT or BLOB.
fn text_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            String::from_utf8_lossy(bytes).into_owned()
        }
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Null => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::params;

    fn fixture(prefix: &str) -> SqlitePageSource {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(&format!(
            "CREATE TABLE {p}page (
                 page_id INTEGER PRIMARY KEY,
                 page_title TEXT NOT NULL,
                 page_namespace INTEGER NOT NULL,
                 page_latest INTEGER NOT NULL
             );
             CREATE TABLE {p}revision (
                 rev_id INTEGER PRIMARY KEY,
                 rev_text_id INTEGER NOT NULL
             );
             CREATE TABLE {p}text (
                 old_id INTEGER PRIMARY KEY,
                 old_text BLOB
             );",
            p = prefix
        ))
        .unwrap();

        SqlitePageSource {
            conn,
            prefix: prefix.to_string(),
        }
    }

    fn insert_page(
        source: &SqlitePageSource,
        id: i64,
        title: &str,
        namespace: i64,
        text: &[u8],
    ) {
        let p = &source.prefix;
        source
            .conn
            .execute(
                &format!(
                    "INSERT INTO {p}page (page_id, page_title, page_namespace, page_latest) \
                     VALUES (?1, ?2, ?3, ?1)"
                ),
                params![id, title, namespace],
            )
            .unwrap();
        source
            .conn
            .execute(
                &format!("INSERT INTO {p}revision (rev_id, rev_text_id) VALUES (?1, ?1)"),
                params![id],
            )
            .unwrap();
        source
            .conn
            .execute(
                &format!("INSERT INTO {p}text (old_id, old_text) VALUES (?1, ?2)"),
                params![id, text],
            )
            .unwrap();
    }

    #[test]
    fn fetches_rows_ordered_by_title() {
        let source = fixture("");
        insert_page(&source, 1, "Zebra", 0, b"last");
        insert_page(&source, 2, "Aardvark", 0, b"first");

        let pages = source.pages().unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].title, "Aardvark");
        assert_eq!(pages[1].title, "Zebra");
        assert_eq!(pages[0].text, "first");
    }

    #[test]
    fn decodes_blob_bodies() {
        let source = fixture("");
        insert_page(&source, 1, "Main_Page", 0, "== Heading ==\n''text''".as_bytes());

        let pages = source.pages().unwrap();
        assert_eq!(pages[0].text, "== Heading ==\n''text''");
    }

    #[test]
    fn honours_table_prefix() {
        let source = fixture("mw_");
        insert_page(&source, 1, "Prefixed", 0, b"body");

        assert_eq!(source.page_count().unwrap(), 1);
        assert_eq!(source.pages().unwrap()[0].title, "Prefixed");
    }

    #[test]
    fn rejects_hostile_prefix() {
        let err = validate_prefix("x; DROP TABLE page;--").unwrap_err();
        assert!(matches!(err, Mw2DokuError::InvalidConfig(_)));
    }

    #[test]
    fn namespace_dispatch() {
        assert_eq!(Namespace::from_id(0), Namespace::Page);
        assert_eq!(Namespace::from_id(6), Namespace::Image);
        assert_eq!(Namespace::from_id(1), Namespace::Unknown(1));
        assert_eq!(Namespace::from_id(-2), Namespace::Unknown(-2));
    }

    #[test]
    fn missing_database_file_is_unavailable() {
        let err = SqlitePageSource::open(Path::new("/no/such/wiki.sqlite"), "").unwrap_err();
        assert!(matches!(err, Mw2DokuError::DatabaseUnavailable { .. }));
    }

    #[test]
    fn resolve_db_path_requires_sqlite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("LocalSettings.php");
        std::fs::write(&path, "$wgDBtype = \"mysql\";\n$wgDBname = \"wiki\";\n").unwrap();
        let settings = MediaWikiSettings::from_file(&path).unwrap();

        let err = resolve_db_path(&settings, dir.path()).unwrap_err();
        assert!(matches!(err, Mw2DokuError::UnsupportedDatabase { .. }));
    }

    #[test]
    fn resolve_db_path_defaults_to_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("LocalSettings.php");
        std::fs::write(
            &path,
            "$wgDBtype = \"sqlite\";\n$wgDBname = \"wiki\";\n$wgSQLiteDataDir = \"$IP/data\";\n",
        )
        .unwrap();
        let settings = MediaWikiSettings::from_file(&path).unwrap();

        let resolved = resolve_db_path(&settings, dir.path()).unwrap();
        assert_eq!(resolved, dir.path().join("data").join("wiki.sqlite"));
    }
}
